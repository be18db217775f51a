//! Template evaluation engine.
//!
//! The evaluator walks a parsed [`Template`] depth-first, left to right.
//! Text is copied, lists are concatenated, and every substitution first
//! evaluates its arguments, then asks the host for the parameter's value
//! and applies its [`Operator`](crate::Operator).
//!
//! Two modes share one walker:
//!
//! - **standard** ([`evaluate`]): a [`Resolver`] maps names to values.
//! - **advanced** ([`evaluate_advanced`]): an [`Interceptor`] sees each
//!   substitution with its evaluated arguments and may replace its output
//!   outright.

use tracing::trace;

use crate::ast::node::{Node, Variable};
use crate::ast::template::Template;
use crate::error::{EvalError, EvalErrorKind};
use crate::parser::DEFAULT_MAX_DEPTH;

mod advanced;
mod context;

pub use advanced::{Intercept, Interceptor, NodeInfo};
pub use context::{EnvResolver, MapResolver, Resolver};

use advanced::Resolving;

/// Evaluate a template, resolving parameters through `resolver`.
///
/// ```rust
/// use envsubst::{evaluate, parse, MapResolver};
///
/// let template = parse("${x#foo}/${x%bar}").unwrap();
/// let mut vars = MapResolver::new();
/// vars.set("x", "foobar");
/// assert_eq!(evaluate(&template, &mut vars).unwrap(), "bar/foo");
/// ```
pub fn evaluate<R: Resolver + ?Sized>(
    template: &Template,
    resolver: &mut R,
) -> Result<String, EvalError> {
    evaluate_with_options(template, resolver, EvalOptions::default())
}

pub fn evaluate_with_options<R: Resolver + ?Sized>(
    template: &Template,
    resolver: &mut R,
    options: EvalOptions,
) -> Result<String, EvalError> {
    evaluate_advanced_with_options(template, &mut Resolving(resolver), options)
}

/// Evaluate a template, letting `interceptor` decide the output of every
/// substitution.
///
/// Arguments are evaluated in this same mode before the interceptor sees
/// them, so nested substitutions are intercepted too.
pub fn evaluate_advanced<I: Interceptor + ?Sized>(
    template: &Template,
    interceptor: &mut I,
) -> Result<String, EvalError> {
    evaluate_advanced_with_options(template, interceptor, EvalOptions::default())
}

pub fn evaluate_advanced_with_options<I: Interceptor + ?Sized>(
    template: &Template,
    interceptor: &mut I,
    options: EvalOptions,
) -> Result<String, EvalError> {
    let mut evaluator = Evaluator::new(interceptor, options);
    let mut output = String::new();
    evaluator.eval_node(template.root(), &mut output)?;
    Ok(output)
}

// ── Evaluation options ──────────────────────────────────────────────────

/// Resource limits for evaluation.
///
/// Create with [`EvalOptions::new()`] and chain builder methods:
///
/// ```rust
/// use envsubst::EvalOptions;
///
/// let opts = EvalOptions::new().max_depth(8).max_node_evaluations(10_000);
/// assert_eq!(opts.max_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Maximum nesting of substitutions inside substitution arguments
    /// before the evaluator returns a
    /// [`RecursionLimit`](EvalErrorKind::RecursionLimit) error.
    pub max_depth: usize,

    /// Maximum number of AST node evaluations before the evaluator
    /// returns a [`ResourceLimit`](EvalErrorKind::ResourceLimit) error.
    /// `None` means unlimited.
    pub max_node_evaluations: Option<u64>,
}

impl EvalOptions {
    /// Create a new `EvalOptions` with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Set the maximum number of AST node evaluations.
    pub fn max_node_evaluations(mut self, limit: u64) -> Self {
        self.max_node_evaluations = Some(limit);
        self
    }
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_node_evaluations: None,
        }
    }
}

// ── Walker ──────────────────────────────────────────────────────────────

struct Evaluator<'h, H: ?Sized> {
    host: &'h mut H,
    options: EvalOptions,
    node_count: u64,
    depth: usize,
}

impl<'h, H: Interceptor + ?Sized> Evaluator<'h, H> {
    fn new(host: &'h mut H, options: EvalOptions) -> Self {
        Self {
            host,
            options,
            node_count: 0,
            depth: 0,
        }
    }

    /// Check the node budget. Called once per node evaluation.
    fn check_limits(&mut self) -> Result<(), EvalError> {
        self.node_count += 1;

        if let Some(max) = self.options.max_node_evaluations {
            if self.node_count > max {
                return Err(EvalError::new(
                    EvalErrorKind::ResourceLimit,
                    format!("evaluation exceeded maximum of {max} node evaluations"),
                ));
            }
        }

        Ok(())
    }

    fn eval_node(&mut self, node: &Node, output: &mut String) -> Result<(), EvalError> {
        self.check_limits()?;

        match node {
            Node::Text(text) => output.push_str(text),
            Node::List(nodes) => {
                for child in nodes {
                    self.eval_node(child, output)?;
                }
            }
            Node::Variable(var) => self.eval_variable(var, output)?,
        }

        Ok(())
    }

    fn eval_variable(&mut self, var: &Variable, output: &mut String) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(EvalError::new(
                EvalErrorKind::RecursionLimit,
                format!(
                    "substitutions nested deeper than {} levels",
                    self.options.max_depth
                ),
            )
            .with_span(var.span));
        }

        let mut args = Vec::with_capacity(var.args.len());
        for arg in &var.args {
            let mut buf = String::new();
            self.eval_node(arg, &mut buf)?;
            args.push(buf);
        }
        self.depth -= 1;

        let info = NodeInfo::new(var, args);
        trace!(
            param = %var.param,
            operator = var.operator.symbol(),
            "evaluating substitution"
        );

        let value = match self
            .host
            .intercept(&var.param, &info)
            .map_err(|e| e.or_span(var.span))?
        {
            Intercept::Emit(text) => {
                output.push_str(&text);
                return Ok(());
            }
            Intercept::Resolve(value) => value,
        };

        let args = info.into_args();
        let result = var
            .operator
            .apply(value.as_deref(), &args)
            .map_err(|e| EvalError::from_operator(&var.param, e).with_span(var.span))?;

        if var.operator.assigns(value.as_deref()) {
            self.host
                .assign(&var.param, &result)
                .map_err(|e| e.or_span(var.span))?;
        }

        output.push_str(&result);
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

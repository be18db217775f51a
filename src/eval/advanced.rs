//! Interceptor-driven evaluation.
//!
//! An [`Interceptor`] is consulted for every substitution once its
//! arguments are evaluated. It either takes the occurrence over entirely
//! ([`Intercept::Emit`]) or supplies the parameter's value and lets the
//! operator run as usual ([`Intercept::Resolve`]).

use crate::ast::node::Variable;
use crate::error::EvalError;
use crate::operator::OperatorError;

use super::context::Resolver;

/// What an [`Interceptor`] decided for one substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    /// Write this text in place of the substitution. The operator is not
    /// applied.
    Emit(String),
    /// Use this as the parameter's value (`None` = unset) and apply the
    /// operator to it.
    Resolve(Option<String>),
}

/// Per-substitution hook for [`evaluate_advanced`](crate::evaluate_advanced).
///
/// Any closure `FnMut(&str, &NodeInfo<'_>) -> Result<Intercept, EvalError>`
/// is an interceptor. Leaving selected substitutions untouched:
///
/// ```rust
/// use envsubst::{render_advanced, Intercept};
///
/// let out = render_advanced("${HOST:-localhost}:${PORT:-80}", |name, info| {
///     Ok(match name {
///         "PORT" => Intercept::Resolve(Some("8080".to_string())),
///         _ => Intercept::Emit(info.orig().to_string()),
///     })
/// })
/// .unwrap();
/// assert_eq!(out, "${HOST:-localhost}:8080");
/// ```
pub trait Interceptor {
    fn intercept(&mut self, name: &str, node: &NodeInfo<'_>) -> Result<Intercept, EvalError>;

    /// Persist a default computed by `=` or `:=` after
    /// [`Intercept::Resolve`]. Discarded by default.
    fn assign(&mut self, name: &str, value: &str) -> Result<(), EvalError> {
        let _ = (name, value);
        Ok(())
    }
}

impl<F> Interceptor for F
where
    F: FnMut(&str, &NodeInfo<'_>) -> Result<Intercept, EvalError>,
{
    fn intercept(&mut self, name: &str, node: &NodeInfo<'_>) -> Result<Intercept, EvalError> {
        self(name, node)
    }
}

/// Runs a [`Resolver`] as an interceptor that always continues, which is
/// exactly standard evaluation.
pub(crate) struct Resolving<'r, R: ?Sized>(pub(crate) &'r mut R);

impl<R: Resolver + ?Sized> Interceptor for Resolving<'_, R> {
    fn intercept(&mut self, name: &str, _node: &NodeInfo<'_>) -> Result<Intercept, EvalError> {
        self.0.resolve(name).map(Intercept::Resolve)
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), EvalError> {
        self.0.assign(name, value)
    }
}

/// A substitution as seen by an [`Interceptor`]: the node together with
/// its already-evaluated arguments.
///
/// Built fresh for every visit and dropped once the interceptor returns.
#[derive(Debug, Clone)]
pub struct NodeInfo<'a> {
    variable: &'a Variable,
    args: Vec<String>,
}

impl<'a> NodeInfo<'a> {
    pub(crate) fn new(variable: &'a Variable, args: Vec<String>) -> Self {
        Self { variable, args }
    }

    pub fn param(&self) -> &str {
        &self.variable.param
    }

    /// The operator symbol, e.g. `:-`. Empty for a plain reference.
    pub fn operator(&self) -> &'static str {
        self.variable.operator.symbol()
    }

    /// Evaluated arguments, in source order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The original markup, before evaluation. Emitting it leaves the
    /// substitution as written.
    pub fn orig(&self) -> &'a str {
        self.variable.raw()
    }

    pub fn variable(&self) -> &'a Variable {
        self.variable
    }

    /// What the operator would produce for `value`.
    pub fn apply(&self, value: Option<&str>) -> Result<String, OperatorError> {
        self.variable.operator.apply(value, &self.args)
    }

    pub(crate) fn into_args(self) -> Vec<String> {
        self.args
    }
}

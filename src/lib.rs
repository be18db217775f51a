//! # envsubst
//!
//! Shell-style parameter expansion as an embeddable library. Templates
//! contain `$name` and `${name...}` substitutions that are evaluated
//! against caller-supplied values:
//!
//! ```text
//! $name  ${name}  ${#name}  ${name:-default}  ${name#prefix}  ${name//from/to}
//! ```
//!
//! The crate is split into two layers:
//!
//! - **The language** (parsing, AST, operators, evaluation) lives here and
//!   knows nothing about where values come from.
//! - **The host** implements [`Resolver`] to supply values, or
//!   [`Interceptor`] to take over individual substitutions.
//!
//! Patterns are literal substrings, not globs. Word splitting, arithmetic,
//! command substitution and arrays are not supported.
//!
//! ## Quick start
//!
//! ```rust
//! use envsubst::{render, MapResolver};
//!
//! let mut vars = MapResolver::new();
//! vars.set("name", "Alice");
//!
//! let output = render("Hello, ${name}! Port ${port:-8080}.", &mut vars).unwrap();
//! assert_eq!(output, "Hello, Alice! Port 8080.");
//! ```
//!
//! ## Parsed templates
//!
//! For repeated evaluation, parse once with [`Template::parse`] and call
//! [`Template::evaluate`] against different resolvers:
//!
//! ```rust
//! use envsubst::{MapResolver, Template};
//!
//! let template = Template::parse("${file%.txt}.md").unwrap();
//!
//! let mut vars = MapResolver::new();
//! vars.set("file", "notes.txt");
//! assert_eq!(template.evaluate(&mut vars).unwrap(), "notes.md");
//!
//! vars.set("file", "todo.txt");
//! assert_eq!(template.evaluate(&mut vars).unwrap(), "todo.md");
//! ```
//!
//! ## Required values
//!
//! `${name:?message}` aborts evaluation when `name` is unset or empty:
//!
//! ```rust
//! use envsubst::{render, EvalErrorKind, MapResolver, RenderError};
//!
//! let err = render("${DATABASE_URL:?must be set}", &mut MapResolver::new()).unwrap_err();
//! match err {
//!     RenderError::Eval(e) => {
//!         assert_eq!(e.kind, EvalErrorKind::ParameterRequired);
//!         assert_eq!(e.message, "DATABASE_URL: must be set");
//!     }
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod operator;
mod parser;

pub use ast::node::{Node, Variable};
pub use ast::span::Span;
pub use ast::template::Template;
pub use error::{EvalError, EvalErrorKind, ParseError};
pub use eval::{
    EnvResolver, EvalOptions, Intercept, Interceptor, MapResolver, NodeInfo, Resolver, evaluate,
    evaluate_advanced, evaluate_advanced_with_options, evaluate_with_options,
};
pub use operator::{Operator, OperatorError};
pub use parser::{DEFAULT_MAX_DEPTH, ParseOptions, parse, parse_with_options};

use thiserror::Error;

/// Parse source text and evaluate it in a single step.
///
/// For repeated evaluation of the same source, prefer [`Template`] to
/// avoid re-parsing.
pub fn render<R: Resolver + ?Sized>(source: &str, resolver: &mut R) -> Result<String, RenderError> {
    let template = parser::parse(source)?;
    Ok(evaluate(&template, resolver)?)
}

/// Parse source text and evaluate it with custom options.
pub fn render_with_options<R: Resolver + ?Sized>(
    source: &str,
    resolver: &mut R,
    options: EvalOptions,
) -> Result<String, RenderError> {
    let template = parser::parse(source)?;
    Ok(evaluate_with_options(&template, resolver, options)?)
}

/// Parse source text and evaluate it with an interceptor closure.
///
/// The closure receives each parameter name with its [`NodeInfo`] and
/// returns [`Intercept::Emit`] to replace the substitution's output or
/// [`Intercept::Resolve`] to supply a value for the operator.
pub fn render_advanced<F>(source: &str, mut mapping: F) -> Result<String, RenderError>
where
    F: FnMut(&str, &NodeInfo<'_>) -> Result<Intercept, EvalError>,
{
    let template = parser::parse(source)?;
    Ok(evaluate_advanced(&template, &mut mapping)?)
}

/// Parse source text and evaluate it against the process environment.
///
/// Defaults assigned with `=` or `:=` are visible to later references in
/// the same call but are not exported to the environment.
///
/// ```rust
/// let out = envsubst::render_env("${ENVSUBST_DOC_UNSET_VAR:-fallback}").unwrap();
/// assert_eq!(out, "fallback");
/// ```
pub fn render_env(source: &str) -> Result<String, RenderError> {
    render(source, &mut EnvResolver::new())
}

/// Combined error type returned by the `render*` functions.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The source is not a valid template.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation was aborted.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

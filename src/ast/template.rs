use std::fmt;
use std::str::FromStr;

use super::node::Node;
use crate::error::{EvalError, ParseError};
use crate::eval::{self, EvalOptions, Interceptor, Resolver};
use crate::parser;

/// A parsed template: the immutable root [`Node`] together with the source
/// it was parsed from.
///
/// Parse once, evaluate as often as needed. Evaluation never mutates the
/// template, so one template can serve many resolvers.
///
/// ```rust
/// use envsubst::{MapResolver, Template};
///
/// let template = Template::parse("port ${PORT:-8080}").unwrap();
///
/// let mut vars = MapResolver::new();
/// assert_eq!(template.evaluate(&mut vars).unwrap(), "port 8080");
///
/// vars.set("PORT", "9000");
/// assert_eq!(template.evaluate(&mut vars).unwrap(), "port 9000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: Node,
    source: String,
}

impl Template {
    pub(crate) fn new(root: Node, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    /// Parse source text into a template.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        parser::parse(source)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate with a plain name-to-value resolver.
    pub fn evaluate<R: Resolver + ?Sized>(&self, resolver: &mut R) -> Result<String, EvalError> {
        eval::evaluate(self, resolver)
    }

    pub fn evaluate_with_options<R: Resolver + ?Sized>(
        &self,
        resolver: &mut R,
        options: EvalOptions,
    ) -> Result<String, EvalError> {
        eval::evaluate_with_options(self, resolver, options)
    }

    /// Evaluate with an interceptor that may take over individual
    /// substitutions. See [`Interceptor`].
    pub fn evaluate_advanced<I: Interceptor + ?Sized>(
        &self,
        interceptor: &mut I,
    ) -> Result<String, EvalError> {
        eval::evaluate_advanced(self, interceptor)
    }

    pub fn evaluate_advanced_with_options<I: Interceptor + ?Sized>(
        &self,
        interceptor: &mut I,
        options: EvalOptions,
    ) -> Result<String, EvalError> {
        eval::evaluate_advanced_with_options(self, interceptor, options)
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parser::parse(source)
    }
}

/// Displays the original source text.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

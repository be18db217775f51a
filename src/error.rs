//! Error types for parsing and evaluation.
//!
//! [`ParseError`] is produced while parsing and carries the source span of
//! the offending input for diagnostic formatting. [`EvalError`] is produced
//! during evaluation and can originate from an operator (`${x:?msg}`), the
//! evaluator's limits, or the host's resolver or interceptor.

use crate::ast::span::Span;
use crate::operator::OperatorError;
use std::sync::Arc;
use thiserror::Error;

// ── Parse errors ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {}", .span.start)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with source context for display
    pub fn format_with_source(&self, source: &str, name: Option<&str>) -> String {
        let (line, col) = offset_to_line_col(source, self.span.start);
        let source_line = source.lines().nth(line.saturating_sub(1)).unwrap_or("");

        let location = if let Some(name) = name {
            format!(" --> {name}:{line}:{col}")
        } else {
            format!(" --> {line}:{col}")
        };

        let pointer = " ".repeat(col.saturating_sub(1)) + &"^".repeat(self.span.len().max(1));

        let mut output = format!(
            "Error: {}\n{location}\n  |\n{line:>3} | {source_line}\n    | {pointer}",
            self.message
        );

        if let Some(hint) = &self.hint {
            output.push_str(&format!("\n  = hint: {hint}"));
        }

        output
    }
}

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

// ── Eval errors ─────────────────────────────────────────────────────────

/// An error that aborts template evaluation.
///
/// Carries a structured [`EvalErrorKind`], a human-readable message, the
/// [`Span`] of the substitution being evaluated when known, and an
/// optional underlying cause.
///
/// # Error chaining
///
/// A [`Resolver`](crate::Resolver) backed by I/O can keep the original
/// error around with [`with_source`](EvalError::with_source):
///
/// ```rust
/// use envsubst::EvalError;
///
/// fn example() -> Result<(), EvalError> {
///     let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "vault unreachable");
///     Err(EvalError::host_error("failed to fetch secret").with_source(io_err))
/// }
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Option<Span>,
    pub message: String,
    /// The underlying error that caused this evaluation error, if any.
    ///
    /// Wrapped in `Arc` so that `EvalError` remains `Clone`.
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach an underlying error cause to this evaluation error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub(crate) fn or_span(self, span: Span) -> Self {
        if self.span.is_none() {
            self.with_span(span)
        } else {
            self
        }
    }

    /// `${name:?message}` on an unset or empty parameter.
    pub fn parameter_required(name: &str, message: &str) -> Self {
        let message = if message.is_empty() {
            "parameter null or not set"
        } else {
            message
        };
        Self::new(EvalErrorKind::ParameterRequired, format!("{name}: {message}"))
    }

    /// Wrap an operator failure for the substitution of `name`.
    pub fn from_operator(name: &str, err: OperatorError) -> Self {
        match err {
            OperatorError::Required(message) => Self::parameter_required(name, &message),
            other => Self::new(EvalErrorKind::InvalidArgument, format!("{name}: {other}"))
                .with_source(other),
        }
    }

    pub fn host_error(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::HostError, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// `${name:?}` found the parameter unset or empty.
    ParameterRequired,
    /// An operator argument could not be used, e.g. a non-numeric
    /// substring offset.
    InvalidArgument,
    /// Raised by the host's resolver or interceptor.
    HostError,
    /// Substitutions nested deeper than the configured maximum.
    RecursionLimit,
    /// The evaluation exceeded the configured node budget.
    ResourceLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_source() {
        let err = ParseError::new(Span::new(8, 9), "unexpected character")
            .with_hint("close the substitution with `}`");
        let formatted = err.format_with_source("line one\n${x", Some("app.env"));
        assert!(formatted.starts_with("Error: unexpected character"));
        assert!(formatted.contains(" --> app.env:1:9"));
        assert!(formatted.contains("= hint: close the substitution with `}`"));
    }

    #[test]
    fn test_offset_to_line_col() {
        assert_eq!(offset_to_line_col("ab\ncd", 0), (1, 1));
        assert_eq!(offset_to_line_col("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn test_parameter_required_message() {
        let err = EvalError::parameter_required("HOME", "missing");
        assert_eq!(err.kind, EvalErrorKind::ParameterRequired);
        assert_eq!(err.to_string(), "HOME: missing");

        let err = EvalError::parameter_required("HOME", "");
        assert_eq!(err.to_string(), "HOME: parameter null or not set");
    }

    #[test]
    fn test_from_operator_keeps_source() {
        let err = EvalError::from_operator("x", OperatorError::NegativeLength(-3));
        assert_eq!(err.kind, EvalErrorKind::InvalidArgument);
        assert!(err.source.is_some());
        assert_eq!(err.to_string(), "x: substring length -3 ends before the offset");
    }
}

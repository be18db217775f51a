//! Template parser, built on [pest](https://pest.rs/).
//!
//! The grammar is defined in `subst.pest`. This module converts pest's
//! parse tree into the AST defined in [`crate::ast`], validating every
//! operator against the [operator table](crate::operator) as it goes.
//!
//! Use [`parse`] to convert source text into a [`Template`], which can
//! then be evaluated via [`crate::evaluate`].

use pest::Parser;
use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;
use tracing::trace;

use crate::ast::node::{Node, Variable};
use crate::ast::span::Span;
use crate::ast::template::Template;
use crate::error::ParseError;
use crate::operator::Operator;

#[derive(Parser)]
#[grammar = "parser/subst.pest"]
struct SubstParser;

/// Maximum `${` nesting accepted by [`parse`] and allowed by
/// [`EvalOptions`](crate::EvalOptions) by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser configuration.
///
/// ```rust
/// use envsubst::{parse_with_options, ParseOptions};
///
/// let deep = "${a:-${b:-${c}}}";
/// assert!(parse_with_options(deep, ParseOptions::new().max_depth(2)).is_err());
/// assert!(parse_with_options(deep, ParseOptions::new().max_depth(3)).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// How deeply `${...}` expressions may nest before parsing fails.
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse source text into a [`Template`].
///
/// Fails with a [`ParseError`] pointing at the offending position if the
/// source contains an unterminated or malformed `${...}` expression.
pub fn parse(source: &str) -> Result<Template, ParseError> {
    parse_with_options(source, ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<Template, ParseError> {
    check_nesting(source, options.max_depth)?;

    let pairs = SubstParser::parse(Rule::template, source).map_err(|e| convert_error(e, source))?;

    let mut nodes = Vec::new();

    // SubstParser::parse returns a top-level `template` pair whose
    // children are the actual segments.
    for pair in pairs {
        if pair.as_rule() == Rule::template {
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::text => nodes.push(Node::Text(inner.as_str().to_string())),
                    Rule::bare | Rule::braced => nodes.push(build_substitution(inner)?),
                    _ => {}
                }
            }
        }
    }

    let root = Node::from_siblings(nodes);
    trace!(source_len = source.len(), "parsed template");
    Ok(Template::new(root, source))
}

/// Reject input nested deeper than `max_depth` before the grammar
/// recurses into it.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut chars = source.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '$' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::new(
                        Span::new(i, i + 2),
                        format!("substitutions nested deeper than {max_depth} levels"),
                    ));
                }
            }
            '}' if depth > 0 => depth -= 1,
            '\\' if depth > 0 => {
                if matches!(chars.peek(), Some((_, '\\' | '}'))) {
                    chars.next();
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn convert_error(e: pest::error::Error<Rule>, source: &str) -> ParseError {
    let span = match e.location {
        InputLocation::Pos(p) => Span::new(p, p + 1),
        InputLocation::Span((s, e)) => Span::new(s, e),
    };

    let message = match &e.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            let mut expected: Vec<&str> = positives.iter().map(describe_rule).collect();
            expected.sort_unstable();
            expected.dedup();
            match expected.as_slice() {
                [] => "invalid substitution".to_string(),
                [only] => format!("invalid substitution: expected {only}"),
                [init @ .., last] => {
                    format!("invalid substitution: expected {} or {last}", init.join(", "))
                }
            }
        }
        ErrorVariant::CustomError { message } => message.clone(),
    };

    let err = ParseError::new(span, message);
    if span.start >= source.len() {
        err.with_hint("unterminated substitution: every `${` needs a closing `}`")
    } else {
        err
    }
}

fn describe_rule(rule: &Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::name | Rule::length | Rule::expansion => "parameter name",
        Rule::case_op
        | Rule::default_op
        | Rule::default_sym
        | Rule::substring
        | Rule::remove
        | Rule::remove_sym
        | Rule::replace
        | Rule::replace_sym => "operator",
        Rule::bare | Rule::braced => "substitution",
        Rule::text => "text",
        _ => "argument",
    }
}

fn pair_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, span: Span) -> Result<Pair<'i, Rule>, ParseError> {
    pairs
        .next()
        .ok_or_else(|| ParseError::new(span, "malformed substitution"))
}

// -- Node building -------------------------------------------------------

fn build_substitution(pair: Pair<Rule>) -> Result<Node, ParseError> {
    let span = pair_span(&pair);
    let raw = pair.as_str().to_string();
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let head = next_pair(&mut inner, span)?;

    let (param, symbol, args) = match (rule, head.as_rule()) {
        (Rule::bare, _) => (head.as_str(), "", Vec::new()),
        (_, Rule::length) => {
            let name = next_pair(&mut head.into_inner(), span)?;
            (name.as_str(), "#", Vec::new())
        }
        _ => {
            let mut parts = head.into_inner();
            let name = next_pair(&mut parts, span)?.as_str();
            match parts.next() {
                None => (name, "", Vec::new()),
                Some(op) => {
                    let (symbol, args) = build_operation(op, span)?;
                    (name, symbol, args)
                }
            }
        }
    };

    let operator = Operator::lookup(symbol, args.len()).ok_or_else(|| {
        ParseError::new(
            span,
            format!(
                "operator `{symbol}` does not take {} argument(s)",
                args.len()
            ),
        )
    })?;

    Ok(Node::Variable(Variable {
        param: param.to_string(),
        operator,
        args,
        raw,
        span,
    }))
}

/// Split an operation into its symbol and parsed arguments.
fn build_operation<'i>(
    op: Pair<'i, Rule>,
    span: Span,
) -> Result<(&'i str, Vec<Node>), ParseError> {
    match op.as_rule() {
        Rule::case_op => Ok((op.as_str(), Vec::new())),
        // `:` is a literal in the grammar, so every child is an argument.
        Rule::substring => Ok((":", build_arguments(op.into_inner())?)),
        _ => {
            let mut parts = op.into_inner();
            let symbol = next_pair(&mut parts, span)?.as_str();
            Ok((symbol, build_arguments(parts)?))
        }
    }
}

fn build_arguments(pairs: Pairs<Rule>) -> Result<Vec<Node>, ParseError> {
    pairs.map(build_argument).collect()
}

/// Build one argument: literal runs become `Text`, nested substitutions
/// become `Variable`s, and mixed content becomes a `List`.
fn build_argument(pair: Pair<Rule>) -> Result<Node, ParseError> {
    let mut nodes = Vec::new();
    let mut text = String::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::brace_escape | Rule::colon_escape | Rule::slash_escape => {
                text.push_str(&part.as_str()[1..]);
            }
            Rule::bare | Rule::braced => {
                if !text.is_empty() {
                    nodes.push(Node::Text(std::mem::take(&mut text)));
                }
                nodes.push(build_substitution(part)?);
            }
            // chunks and lone backslashes
            _ => text.push_str(part.as_str()),
        }
    }

    if !text.is_empty() || nodes.is_empty() {
        nodes.push(Node::Text(text));
    }

    Ok(Node::from_siblings(nodes))
}

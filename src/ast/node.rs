use super::span::Span;
use crate::operator::Operator;

/// One node of a parsed template.
///
/// The tree is built once by the parser and never mutated afterwards.
/// A [`Node::List`] always holds at least two children; the parser
/// collapses empty and single-element sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal output. Escapes inside arguments are already resolved.
    Text(String),

    /// A `$name` or `${name...}` substitution site.
    Variable(Variable),

    /// Sibling nodes whose outputs are concatenated,
    /// e.g. `"hello "`, `${name}`, `"!"`.
    List(Vec<Node>),
}

impl Node {
    /// Build a node from a sequence of siblings, enforcing the list shape:
    /// nothing becomes empty text, a single node stands alone.
    pub fn from_siblings(mut nodes: Vec<Node>) -> Node {
        match nodes.len() {
            0 => Node::Text(String::new()),
            1 => nodes.remove(0),
            _ => Node::List(nodes),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Node::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// Every substitution in this subtree, outermost first, left to right.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        collect_variables(self, &mut out);
        out
    }
}

fn collect_variables<'a>(node: &'a Node, out: &mut Vec<&'a Variable>) {
    match node {
        Node::Text(_) => {}
        Node::Variable(var) => {
            out.push(var);
            for arg in &var.args {
                collect_variables(arg, out);
            }
        }
        Node::List(nodes) => {
            for child in nodes {
                collect_variables(child, out);
            }
        }
    }
}

/// A single substitution: `$param`, `${param}`, `${#param}` or
/// `${param<op>arg...}`.
///
/// Each entry of `args` is one argument. An argument mixing literal text
/// and nested substitutions is a [`Node::List`].
#[derive(Debug, Clone, Eq)]
pub struct Variable {
    pub param: String,
    pub operator: Operator,
    pub args: Vec<Node>,
    /// The exact source text this substitution was parsed from.
    pub raw: String,
    pub span: Span,
}

impl Variable {
    /// The original, un-evaluated markup, e.g. `${name:-fallback}`.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

// Positions are not part of a variable's identity: the same markup parsed
// at a different offset is the same substitution.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.param == other.param
            && self.operator == other.operator
            && self.args == other.args
            && self.raw == other.raw
    }
}

//! Abstract syntax tree types.
//!
//! A [`Template`] owns a single root [`Node`]. Nodes are literal
//! [`Node::Text`], substitution sites ([`Node::Variable`]) and sibling
//! sequences ([`Node::List`]). Substitution arguments are themselves nodes,
//! so `${a:-${b}}` nests a variable inside a variable.

pub mod node;
pub mod span;
pub mod template;

// Convenience re-exports
pub use node::{Node, Variable};
pub use span::Span;
pub use template::Template;

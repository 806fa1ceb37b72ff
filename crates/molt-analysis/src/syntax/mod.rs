//! The syntactic layer: parsing and lowering.
//!
//! Each source file is parsed once with oxc, run through semantic analysis
//! for reference resolution, and lowered to an owned [`tree::SyntaxTree`].
//! The oxc arena is dropped at the end of lowering; nothing downstream holds
//! borrowed AST nodes.

mod lower;
mod tree;

pub use lower::{lower_source, Lowered};
pub use tree::{
    FunctionNode, LitProp, LocalTarget, Node, NodeId, NodeKind, PatternProp, SyntaxTree, TagName,
};

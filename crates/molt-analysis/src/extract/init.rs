//! Initialization-context classification.
//!
//! Writes that happen while state is being seeded are not runtime writes.
//! A node is in an init context when any enclosing syntax is an
//! `initializeState` JSX attribute, an `initializeState` object property, or
//! a function whose own name starts with `initialize`.

use crate::libs::{INIT_ATTR, INIT_FN_PREFIX};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Walk parents from `node` looking for an init marker.
pub fn in_init_context(tree: &SyntaxTree, node: NodeId) -> bool {
    let mut previous = node;
    for ancestor in tree.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::JsxAttr { name, .. } if name == INIT_ATTR => return true,
            NodeKind::ObjectLit { props } => {
                // Only counts when we arrived through the property's value.
                let from = tree.span(previous);
                if props
                    .iter()
                    .any(|p| p.value == from && p.key.as_deref() == Some(INIT_ATTR))
                {
                    return true;
                }
            }
            NodeKind::Function(_) => {
                if let Some(name) = tree.function_name(ancestor) {
                    if name.starts_with(INIT_FN_PREFIX) {
                        return true;
                    }
                }
            }
            _ => {}
        }
        previous = ancestor;
    }
    false
}

//! Jotai imperative store handle detection.
//!
//! A handle is a variable initialized by `createStore()`. Later,
//! `handle.get(...)` and `handle.set(...)` are recognized exactly when the
//! base identifier matches a recorded handle key.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::project::{FileId, Project};
use crate::resolve::SymbolResolver;
use crate::syntax::{NodeId, NodeKind};

use super::BindingKey;

/// The set of known store-handle identifiers, under canonical and fallback
/// keys.
#[derive(Debug, Default)]
pub struct HandleSet {
    keys: FxHashSet<BindingKey>,
}

impl HandleSet {
    /// Is this reference identifier a known store handle?
    pub fn contains(
        &self,
        resolver: &SymbolResolver,
        file: FileId,
        reference: NodeId,
        name: &str,
    ) -> bool {
        if let Some(key) = resolver.symbol_key(file, reference) {
            if self.keys.contains(&BindingKey::Symbol(key)) {
                return true;
            }
        }
        self.keys.contains(&BindingKey::Fallback {
            file,
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Single pass over variable declarations looking for `createStore()` calls.
pub fn detect_handles(project: &Project, resolver: &SymbolResolver) -> HandleSet {
    let mut handles = HandleSet::default();

    for (file, module) in project.modules() {
        let tree = &module.tree;
        for node in tree.ids() {
            let NodeKind::VarDecl {
                pattern,
                init: Some(init),
                ..
            } = tree.kind(node)
            else {
                continue;
            };
            let Some(call) = tree.child_at(node, *init) else {
                continue;
            };
            let is_create_store = resolver
                .callee_of(file, call)
                .and_then(|callee| resolver.factory_of(file, callee))
                .map(|f| f.is_create_store())
                .unwrap_or(false);
            if !is_create_store {
                continue;
            }
            let Some(ident) = tree.child_at(node, *pattern) else {
                continue;
            };
            if let Some(key) = resolver.key_of_decl(file, ident) {
                let name = key.name.clone();
                handles.keys.insert(BindingKey::Symbol(key));
                handles.keys.insert(BindingKey::Fallback { file, name });
            }
        }
    }

    trace!(handles = handles.len(), "store handles detected");
    handles
}

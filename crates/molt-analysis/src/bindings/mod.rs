//! Scratch binding maps built per pipeline run: setter bindings, one-hop
//! forwarded bindings, and imperative store handles.

mod forward;
mod handles;
mod setters;

pub use forward::forward_bindings;
pub use handles::{detect_handles, HandleSet};
pub use setters::{resolve_setter_bindings, SetterResolver};

use rustc_hash::FxHashMap;

use molt_graph::StateId;

use crate::project::FileId;
use crate::resolve::{SymbolKey, SymbolResolver};
use crate::syntax::NodeId;

/// Key under which a binding is recorded.
///
/// Bindings are written twice where possible - under the canonical symbol
/// key and under a file-scoped name fallback - and lookups consult both. The
/// fallback keeps bindings usable when symbol resolution fails (type-only
/// positions, unresolvable aliases); name matching within one file is sound
/// for typical component code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    Symbol(SymbolKey),
    Fallback { file: FileId, name: String },
}

/// Map from local identifiers known to mutate a state to that state's id.
#[derive(Debug, Default)]
pub struct SetterBindings {
    map: FxHashMap<BindingKey, StateId>,
}

impl SetterBindings {
    /// Record a binding for a declaring identifier, under both key forms.
    pub fn bind_decl(
        &mut self,
        resolver: &SymbolResolver,
        file: FileId,
        decl: NodeId,
        state: &StateId,
    ) {
        if let Some(key) = resolver.key_of_decl(file, decl) {
            let name = key.name.clone();
            self.map.insert(BindingKey::Symbol(key), state.clone());
            self.map
                .insert(BindingKey::Fallback { file, name }, state.clone());
        }
    }

    /// Look up the state a reference identifier is bound to, trying the
    /// canonical key first and the file-scoped name fallback second.
    pub fn lookup(
        &self,
        resolver: &SymbolResolver,
        file: FileId,
        reference: NodeId,
        name: &str,
    ) -> Option<&StateId> {
        if let Some(key) = resolver.symbol_key(file, reference) {
            if let Some(state) = self.map.get(&BindingKey::Symbol(key)) {
                return Some(state);
            }
        }
        self.map.get(&BindingKey::Fallback {
            file,
            name: name.to_string(),
        })
    }

    /// Merge another binding map into this one. Existing entries win.
    pub fn absorb(&mut self, other: SetterBindings) {
        for (key, state) in other.map {
            self.map.entry(key).or_insert(state);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

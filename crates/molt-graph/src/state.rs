//! State symbol records.
//!
//! A state symbol is a declared atom, selector, family, or derived atom
//! recognized by its originating factory call. Symbols are produced once per
//! analysis by the symbol index and referenced everywhere else by id.

use serde::{Deserialize, Serialize};

use crate::span::Location;

/// Stable identifier of a state symbol: `filePath::name`.
pub type StateId = String;

/// Build a state id from its declaration file and name.
pub fn state_id(file: &str, name: &str) -> StateId {
    format!("{file}::{name}")
}

/// Which reactive-state library a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Store {
    /// Legacy store (Recoil).
    Recoil,
    /// Target store (Jotai).
    Jotai,
}

/// Classification of a state symbol by its factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateKind {
    /// `atom({...})` (Recoil) or `atom(value)` (Jotai).
    Atom,
    /// Recoil `selector({...})`.
    Selector,
    /// Recoil `atomFamily({...})` or Jotai `atomFamily(fn)`.
    AtomFamily,
    /// Recoil `selectorFamily({...})`.
    SelectorFamily,
    /// Jotai `atom(readFn)`.
    DerivedAtom,
    /// Jotai `atomWithDefault(fn)`.
    AtomWithDefault,
}

/// A declared state symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSymbol {
    /// Stable id: `filePath::name`.
    pub id: StateId,
    /// Declared variable name.
    pub name: String,
    /// Owning store.
    pub store: Store,
    /// Factory classification.
    pub kind: StateKind,
    /// Declaration site.
    pub location: Location,
    /// Whether the declaring statement is part of the module's public surface.
    pub exported: bool,
    /// Recoil atom whose `default` is not a selector or selector family,
    /// directly or by reference. Only such atoms are subject to the
    /// read-only-atom rule.
    pub is_plain_recoil_atom: bool,
}

impl StateSymbol {
    /// Sort key used by the symbol index: (file, line, name).
    pub fn index_key(&self) -> (&str, u32, &str) {
        (&self.location.file, self.location.line, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_format() {
        assert_eq!(state_id("src/state.ts", "counter"), "src/state.ts::counter");
    }

    #[test]
    fn test_index_key_ordering() {
        let a = StateSymbol {
            id: state_id("a.ts", "x"),
            name: "x".into(),
            store: Store::Recoil,
            kind: StateKind::Atom,
            location: Location::new("a.ts", 3, 0),
            exported: false,
            is_plain_recoil_atom: true,
        };
        let b = StateSymbol {
            id: state_id("a.ts", "y"),
            name: "y".into(),
            store: Store::Jotai,
            kind: StateKind::DerivedAtom,
            location: Location::new("a.ts", 3, 10),
            exported: true,
            is_plain_recoil_atom: false,
        };
        assert!(a.index_key() < b.index_key());
    }
}

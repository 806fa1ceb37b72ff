//! The recognized library surface.
//!
//! Everything the analyzer knows about Recoil, Jotai, and React is
//! name-based, keyed by the module specifier and the *imported* name (local
//! aliases are followed through the import map before these tables are
//! consulted). These identities are the analyzer's contract with the
//! analyzed codebase.

use molt_graph::{StateKind, Store};

/// A library whose exports the analyzer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lib {
    Recoil,
    Jotai,
    JotaiUtils,
    React,
}

/// Classify a module specifier.
pub fn lib_of_module(module: &str) -> Option<Lib> {
    match module {
        "recoil" => Some(Lib::Recoil),
        "jotai" => Some(Lib::Jotai),
        "jotai/utils" => Some(Lib::JotaiUtils),
        "react" => Some(Lib::React),
        _ => None,
    }
}

/// A resolved factory or hook identity: library plus imported name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryRef {
    pub lib: Lib,
    pub name: String,
}

impl FactoryRef {
    pub fn is(&self, lib: Lib, name: &str) -> bool {
        self.lib == lib && self.name == name
    }

    /// State factory classification. Jotai's `atom` needs the call shape
    /// (function-ness of the first argument) to finish classification, so it
    /// is reported here as `Atom` and refined by the symbol index.
    pub fn state_factory(&self) -> Option<(Store, StateKind)> {
        match (self.lib, self.name.as_str()) {
            (Lib::Recoil, "atom") => Some((Store::Recoil, StateKind::Atom)),
            (Lib::Recoil, "selector") => Some((Store::Recoil, StateKind::Selector)),
            (Lib::Recoil, "atomFamily") => Some((Store::Recoil, StateKind::AtomFamily)),
            (Lib::Recoil, "selectorFamily") => Some((Store::Recoil, StateKind::SelectorFamily)),
            (Lib::Jotai, "atom") => Some((Store::Jotai, StateKind::Atom)),
            (Lib::JotaiUtils, "atomFamily") => Some((Store::Jotai, StateKind::AtomFamily)),
            (Lib::JotaiUtils, "atomWithDefault") => Some((Store::Jotai, StateKind::AtomWithDefault)),
            _ => None,
        }
    }

    /// Hooks whose call site is a runtime read of their first argument.
    /// Returns the `via` tag.
    pub fn read_hook_via(&self) -> Option<&'static str> {
        match (self.lib, self.name.as_str()) {
            (Lib::Recoil, "useRecoilValue") => Some("recoil:useRecoilValue"),
            (Lib::Recoil, "useRecoilValueLoadable") => Some("recoil:useRecoilValueLoadable"),
            (Lib::Recoil, "useRecoilState") => Some("recoil:useRecoilState"),
            (Lib::Recoil, "useRecoilStateLoadable") => Some("recoil:useRecoilStateLoadable"),
            (Lib::Jotai, "useAtomValue") => Some("jotai:useAtomValue"),
            (Lib::Jotai, "useAtom") => Some("jotai:useAtom"),
            _ => None,
        }
    }

    /// Hooks returning a single setter for their first argument.
    pub fn is_setter_factory(&self) -> bool {
        matches!(
            (self.lib, self.name.as_str()),
            (Lib::Recoil, "useSetRecoilState")
                | (Lib::Recoil, "useResetRecoilState")
                | (Lib::Jotai, "useSetAtom")
        )
    }

    /// Hooks returning a `[value, setter]` tuple for their first argument.
    pub fn is_tuple_factory(&self) -> bool {
        matches!(
            (self.lib, self.name.as_str()),
            (Lib::Recoil, "useRecoilState")
                | (Lib::Recoil, "useRecoilStateLoadable")
                | (Lib::Jotai, "useAtom")
        )
    }

    pub fn is_recoil_callback(&self) -> bool {
        self.is(Lib::Recoil, "useRecoilCallback")
    }

    pub fn is_jotai_callback(&self) -> bool {
        self.is(Lib::JotaiUtils, "useAtomCallback")
    }

    /// React's `useCallback`, the generic memo wrapper that may sit between
    /// a callback factory and its function argument.
    pub fn is_memo_wrap(&self) -> bool {
        self.is(Lib::React, "useCallback")
    }

    pub fn is_create_store(&self) -> bool {
        self.is(Lib::Jotai, "createStore")
    }

    /// Any identity listed in the contract. Calls to these are never treated
    /// as wrapper hooks.
    pub fn is_known(&self) -> bool {
        self.state_factory().is_some()
            || self.read_hook_via().is_some()
            || self.is_setter_factory()
            || self.is_recoil_callback()
            || self.is_jotai_callback()
            || self.is_memo_wrap()
            || self.is_create_store()
    }
}

/// Recoil snapshot methods that read state.
pub const SNAPSHOT_READ_METHODS: &[&str] = &["get", "getPromise", "getLoadable"];

/// JSX attribute prefix marking event handlers (`onClick`, `onChange`, ...).
pub const EVENT_ATTR_PREFIX: &str = "on";

/// Names that mark an initialization context.
pub const INIT_ATTR: &str = "initializeState";
pub const INIT_FN_PREFIX: &str = "initialize";

//! Symbol index tests: state recognition, kind classification, plain-atom
//! detection.

use molt_graph::{StateKind, Store};

use crate::index::SymbolIndex;
use crate::resolve::SymbolResolver;

use super::test_helpers::project;

const STATE_ZOO: &str = r#"
import { atom, selector, atomFamily, selectorFamily } from "recoil";
import { atom as jAtom, createStore } from "jotai";
import { atomFamily as jAtomFamily, atomWithDefault } from "jotai/utils";

export const counterState = atom({ key: "counter", default: 0 });
export const doubledState = selector({
  key: "doubled",
  get: ({ get }) => get(counterState) * 2,
});
export const rowState = atomFamily({ key: "row", default: "" });
export const rowQuery = selectorFamily({
  key: "rowQuery",
  get: (id) => ({ get }) => get(rowState(id)),
});
export const themeAtom = jAtom("light");
export const upperTheme = jAtom((get) => get(themeAtom).toUpperCase());
export const cellAtom = jAtomFamily((id) => jAtom(id));
export const widthAtom = atomWithDefault((get) => get(themeAtom).length);
export const appStore = createStore();
"#;

fn zoo_index() -> (crate::project::Project, SymbolIndex) {
    let project = project(&[("src/state.ts", STATE_ZOO)]);
    let resolver = SymbolResolver::new(&project);
    let index = SymbolIndex::build(&project, &resolver);
    (project, index)
}

#[test]
fn test_recognizes_all_factories() {
    let (_project, index) = zoo_index();
    let kinds: Vec<(&str, Store, StateKind)> = index
        .states
        .iter()
        .map(|s| (s.name.as_str(), s.store, s.kind))
        .collect();

    assert!(kinds.contains(&("counterState", Store::Recoil, StateKind::Atom)));
    assert!(kinds.contains(&("doubledState", Store::Recoil, StateKind::Selector)));
    assert!(kinds.contains(&("rowState", Store::Recoil, StateKind::AtomFamily)));
    assert!(kinds.contains(&("rowQuery", Store::Recoil, StateKind::SelectorFamily)));
    assert!(kinds.contains(&("themeAtom", Store::Jotai, StateKind::Atom)));
    assert!(kinds.contains(&("upperTheme", Store::Jotai, StateKind::DerivedAtom)));
    assert!(kinds.contains(&("cellAtom", Store::Jotai, StateKind::AtomFamily)));
    assert!(kinds.contains(&("widthAtom", Store::Jotai, StateKind::AtomWithDefault)));

    // `createStore()` is a handle, not a state.
    assert_eq!(index.states.len(), 8);
    assert!(index.states.iter().all(|s| s.name != "appStore"));
}

#[test]
fn test_states_are_exported_and_located() {
    let (_project, index) = zoo_index();
    for state in &index.states {
        assert!(state.exported, "{} should be exported", state.name);
        assert_eq!(state.location.file, "src/state.ts");
        assert!(state.location.line > 1);
        assert_eq!(state.id, format!("src/state.ts::{}", state.name));
    }
}

#[test]
fn test_index_sorted_by_file_line_name() {
    let (_project, index) = zoo_index();
    for pair in index.states.windows(2) {
        assert!(pair[0].index_key() <= pair[1].index_key());
    }
}

#[test]
fn test_plain_atom_classification() {
    let (_project, index) = zoo_index();
    let plain = |name: &str| {
        index
            .states
            .iter()
            .find(|s| s.name == name)
            .expect("state exists")
            .is_plain_recoil_atom
    };
    // Literal default: plain. Selectors and every Jotai symbol: never plain.
    assert!(plain("counterState"));
    assert!(!plain("doubledState"));
    assert!(!plain("themeAtom"));
    assert!(!plain("upperTheme"));
}

#[test]
fn test_atom_with_selector_default_is_not_plain() {
    let sources = [(
        "src/seeded.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const derivedSel = selector({ key: "derivedSel", get: ({ get }) => get(baseState) });
export const seededState = atom({ key: "seeded", default: derivedSel });
export const inlineState = atom({
  key: "inline",
  default: selector({ key: "inlineSel", get: ({ get }) => get(baseState) }),
});
"#,
    )];
    let project = project(&sources);
    let resolver = SymbolResolver::new(&project);
    let index = SymbolIndex::build(&project, &resolver);

    let plain = |name: &str| {
        index
            .states
            .iter()
            .find(|s| s.name == name)
            .unwrap()
            .is_plain_recoil_atom
    };
    assert!(plain("baseState"));
    assert!(!plain("seededState"), "selector reference default");
    assert!(!plain("inlineState"), "inline selector default");
}

#[test]
fn test_selector_default_reference_across_files() {
    let sources = [
        (
            "src/sel.ts",
            r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const remoteSel = selector({ key: "remote", get: ({ get }) => get(baseState) });
"#,
        ),
        (
            "src/atom.ts",
            r#"
import { atom } from "recoil";
import { remoteSel } from "./sel";
export const importedDefault = atom({ key: "imported", default: remoteSel });
"#,
        ),
    ];
    let project = project(&sources);
    let resolver = SymbolResolver::new(&project);
    let index = SymbolIndex::build(&project, &resolver);

    let state = index
        .states
        .iter()
        .find(|s| s.name == "importedDefault")
        .unwrap();
    assert!(!state.is_plain_recoil_atom);
}

#[test]
fn test_namespace_import_factory() {
    let sources = [(
        "src/ns.ts",
        r#"
import * as Recoil from "recoil";
export const nsState = Recoil.atom({ key: "ns", default: 0 });
"#,
    )];
    let project = project(&sources);
    let resolver = SymbolResolver::new(&project);
    let index = SymbolIndex::build(&project, &resolver);

    assert_eq!(index.states.len(), 1);
    assert_eq!(index.states[0].name, "nsState");
    assert_eq!(index.states[0].store, Store::Recoil);
    assert_eq!(index.states[0].kind, StateKind::Atom);
}

#[test]
fn test_unexported_state_recognized() {
    let sources = [(
        "src/local.ts",
        r#"
import { atom } from "recoil";
const privateState = atom({ key: "private", default: 0 });
export const visible = atom({ key: "visible", default: privateState });
"#,
    )];
    let project = project(&sources);
    let resolver = SymbolResolver::new(&project);
    let index = SymbolIndex::build(&project, &resolver);

    let private = index.states.iter().find(|s| s.name == "privateState").unwrap();
    assert!(!private.exported);
    // An atom default is not a selector: still plain.
    let visible = index.states.iter().find(|s| s.name == "visible").unwrap();
    assert!(visible.is_plain_recoil_atom);
}

//! Event and dependency extractor tests.

use molt_graph::{ActorKind, EventKind, Phase};

use super::test_helpers::{analyze_core, analyze_extended};

#[test]
fn test_direct_read_hooks_both_stores() {
    let report = analyze_extended(&[(
        "src/app.tsx",
        r#"
import { atom, useRecoilValue, useRecoilValueLoadable } from "recoil";
import { atom as jAtom, useAtomValue, useAtom } from "jotai";
export const aState = atom({ key: "a", default: 0 });
export const bAtom = jAtom(0);
export function App() {
  const a = useRecoilValue(aState);
  const al = useRecoilValueLoadable(aState);
  const b = useAtomValue(bAtom);
  const [bb, setBb] = useAtom(bAtom);
  return a;
}
"#,
    )]);

    let vias: Vec<&str> = report
        .usage_events
        .iter()
        .filter(|e| e.kind == EventKind::Read)
        .map(|e| e.via.as_str())
        .collect();
    assert!(vias.contains(&"recoil:useRecoilValue"));
    assert!(vias.contains(&"recoil:useRecoilValueLoadable"));
    assert!(vias.contains(&"jotai:useAtomValue"));
    assert!(vias.contains(&"jotai:useAtom"));

    for event in report.usage_events.iter().filter(|e| e.kind == EventKind::Read) {
        assert_eq!(event.phase, Phase::Runtime);
        assert_eq!(event.actor_kind, ActorKind::Function);
        assert_eq!(event.actor_name, "App");
    }
}

#[test]
fn test_unknown_hook_argument_skipped_silently() {
    let report = analyze_extended(&[(
        "src/app.tsx",
        r#"
import { useRecoilValue } from "recoil";
export function App(props) {
  return useRecoilValue(props.someState);
}
"#,
    )]);
    assert!(report.usage_events.is_empty());
}

#[test]
fn test_setter_reference_in_jsx_event_attribute() {
    let report = analyze_extended(&[(
        "src/app.tsx",
        r#"
import { atom, useSetRecoilState } from "recoil";
export const openState = atom({ key: "open", default: false });
export function Menu() {
  const setOpen = useSetRecoilState(openState);
  return <button onClick={setOpen} />;
}
"#,
    )]);

    let reference = report
        .usage_events
        .iter()
        .find(|e| e.via == "setter-reference")
        .expect("setter reference event");
    assert_eq!(reference.kind, EventKind::RuntimeWrite);
    assert_eq!(reference.state_id, "src/app.tsx::openState");
}

#[test]
fn test_init_write_classification() {
    let report = analyze_extended(&[(
        "src/init.tsx",
        r#"
import { atom, useRecoilValue } from "recoil";
export const counterState = atom({ key: "counter", default: 0 });
function initializeCounter(set) {
  set(counterState, 1);
}
export function Root() {
  const value = useRecoilValue(counterState);
  return <Host initializeState={({ set }) => initializeCounter(set)} />;
}
"#,
    )]);

    let init = report
        .usage_events
        .iter()
        .find(|e| e.kind == EventKind::InitWrite)
        .expect("init write");
    assert_eq!(init.state_id, "src/init.tsx::counterState");
    assert_eq!(init.via, "init:set");
    assert!(report
        .usage_events
        .iter()
        .all(|e| e.kind != EventKind::RuntimeWrite));
}

#[test]
fn test_init_attribute_arrow_body_is_init_context() {
    let report = analyze_extended(&[(
        "src/init.tsx",
        r#"
import { atom } from "recoil";
export const modeState = atom({ key: "mode", default: "dark" });
export function Root() {
  return <Host initializeState={({ set }) => set(modeState, "light")} />;
}
"#,
    )]);

    let init = report
        .usage_events
        .iter()
        .find(|e| e.kind == EventKind::InitWrite)
        .expect("attribute-scoped init write");
    assert_eq!(init.via, "init:set");
}

#[test]
fn test_recoil_callback_snapshot_reads_and_writes() {
    let report = analyze_extended(&[(
        "src/cb.tsx",
        r#"
import { atom, useRecoilCallback } from "recoil";
export const itemsState = atom({ key: "items", default: [] });
export function Toolbar() {
  const refresh = useRecoilCallback(({ set, snapshot }) => async () => {
    const current = await snapshot.getPromise(itemsState);
    set(itemsState, current);
  });
  return null;
}
"#,
    )]);

    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::Read && e.via == "callback:snapshot.getPromise"));
    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::RuntimeWrite && e.via == "callback:set"));
}

#[test]
fn test_recoil_callback_context_identifier_and_memo_wrap() {
    let report = analyze_extended(&[(
        "src/cb.tsx",
        r#"
import { atom, useRecoilCallback } from "recoil";
import { useCallback } from "react";
export const itemsState = atom({ key: "items", default: [] });
export function Toolbar() {
  const clear = useRecoilCallback(useCallback((ctx) => () => {
    ctx.set(itemsState, []);
    ctx.snapshot.getLoadable(itemsState);
  }, []));
  return null;
}
"#,
    )]);

    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::RuntimeWrite && e.via == "callback:set"));
    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::Read && e.via == "callback:snapshot.getLoadable"));
}

#[test]
fn test_recoil_callback_destructured_snapshot_method() {
    let report = analyze_extended(&[(
        "src/cb.tsx",
        r#"
import { atom, useRecoilCallback } from "recoil";
export const userState = atom({ key: "user", default: null });
export function Profile() {
  const load = useRecoilCallback(({ snapshot: { getLoadable } }) => () => {
    return getLoadable(userState);
  });
  return null;
}
"#,
    )]);

    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::Read && e.via == "callback:snapshot.getLoadable"));
}

#[test]
fn test_jotai_callback_get_and_set() {
    let report = analyze_extended(&[(
        "src/jcb.tsx",
        r#"
import { atom } from "jotai";
import { useAtomCallback } from "jotai/utils";
import { useCallback } from "react";
export const themeAtom = atom("light");
export function useThemeActions() {
  return useAtomCallback(useCallback((get, update) => {
    const theme = get(themeAtom);
    update(themeAtom, theme);
  }, []));
}
"#,
    )]);

    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::Read && e.via == "callback:get"));
    // Second parameter renamed: still the write function.
    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::RuntimeWrite && e.via == "callback:set"));
}

#[test]
fn test_callbacks_gated_by_profile() {
    let sources = [(
        "src/cb.tsx",
        r#"
import { atom, useRecoilCallback } from "recoil";
export const itemsState = atom({ key: "items", default: [] });
export function Toolbar() {
  const refresh = useRecoilCallback(({ snapshot }) => () => {
    return snapshot.getPromise(itemsState);
  });
  return null;
}
"#,
    )];

    let extended = analyze_extended(&sources);
    assert!(extended
        .usage_events
        .iter()
        .any(|e| e.via == "callback:snapshot.getPromise"));

    let core = analyze_core(&sources);
    assert!(core
        .usage_events
        .iter()
        .all(|e| !e.via.starts_with("callback:")));
}

#[test]
fn test_imperative_handle_write() {
    let report = analyze_extended(&[(
        "src/store.ts",
        r#"
import { atom, createStore } from "jotai";
export const flagAtom = atom(false);
export const appStore = createStore();
export function enable() {
  appStore.set(flagAtom, true);
}
"#,
    )]);

    let write = report
        .usage_events
        .iter()
        .find(|e| e.kind == EventKind::RuntimeWrite)
        .expect("handle write");
    assert_eq!(write.via, "jotai:store.set");
    assert_eq!(write.state_id, "src/store.ts::flagAtom");
    assert_eq!(write.actor_name, "enable");
}

#[test]
fn test_handle_writes_gated_by_profile() {
    let report = analyze_core(&[(
        "src/store.ts",
        r#"
import { atom, createStore } from "jotai";
export const flagAtom = atom(false);
export const appStore = createStore();
export function enable() {
  appStore.set(flagAtom, true);
}
"#,
    )]);

    assert!(report
        .usage_events
        .iter()
        .all(|e| e.via != "jotai:store.set"));
}

#[test]
fn test_selector_dependency_with_destructured_get() {
    let report = analyze_core(&[(
        "src/sel.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const doubledState = selector({
  key: "doubled",
  get: ({ get }) => get(baseState) * 2,
});
"#,
    )]);

    assert_eq!(report.dependency_edges.len(), 1);
    let edge = &report.dependency_edges[0];
    assert_eq!(edge.from_state_id, "src/sel.ts::doubledState");
    assert_eq!(edge.to_state_id, "src/sel.ts::baseState");
    assert_eq!(edge.via, "recoil:get");

    // Every edge pairs with a dependency-phase read at the same location.
    let read = report
        .usage_events
        .iter()
        .find(|e| e.phase == Phase::Dependency)
        .expect("dependency read");
    assert_eq!(read.kind, EventKind::Read);
    assert_eq!(read.state_id, edge.to_state_id);
    assert_eq!(read.actor_kind, ActorKind::State);
    assert_eq!(read.actor_state_id.as_deref(), Some("src/sel.ts::doubledState"));
    assert_eq!(read.location, edge.location);
    assert_eq!(read.via, edge.via);
}

#[test]
fn test_selector_method_shorthand_with_named_context() {
    let report = analyze_core(&[(
        "src/sel.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const viaCtx = selector({
  key: "viaCtx",
  get(ctx) {
    return ctx.get(baseState);
  },
});
"#,
    )]);

    assert_eq!(report.dependency_edges.len(), 1);
    assert_eq!(report.dependency_edges[0].via, "recoil:get");
}

#[test]
fn test_selector_family_curried_get() {
    let report = analyze_core(&[(
        "src/fam.ts",
        r#"
import { atomFamily, selectorFamily } from "recoil";
export const rowState = atomFamily({ key: "row", default: "" });
export const rowQuery = selectorFamily({
  key: "rowQuery",
  get: (id) => ({ get }) => get(rowState(id)),
});
"#,
    )]);

    let edge = report
        .dependency_edges
        .iter()
        .find(|e| e.from_state_id == "src/fam.ts::rowQuery")
        .expect("family edge");
    assert_eq!(edge.to_state_id, "src/fam.ts::rowState");
}

#[test]
fn test_selector_inner_helper_function() {
    let report = analyze_core(&[(
        "src/helper.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const withHelper = selector({
  key: "withHelper",
  get: ({ get }) => {
    function pick() {
      return get(baseState);
    }
    return pick();
  },
});
"#,
    )]);

    assert!(report
        .dependency_edges
        .iter()
        .any(|e| e.from_state_id == "src/helper.ts::withHelper"
            && e.to_state_id == "src/helper.ts::baseState"));
}

#[test]
fn test_atom_with_selector_default_owns_reads() {
    let report = analyze_core(&[(
        "src/seed.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const seedSel = selector({ key: "seedSel", get: ({ get }) => get(baseState) });
export const seededState = atom({ key: "seeded", default: seedSel });
"#,
    )]);

    // The selector owns its own edge; the atom owns a second edge at the
    // same call site.
    assert!(report
        .dependency_edges
        .iter()
        .any(|e| e.from_state_id == "src/seed.ts::seedSel"));
    assert!(report
        .dependency_edges
        .iter()
        .any(|e| e.from_state_id == "src/seed.ts::seededState"
            && e.to_state_id == "src/seed.ts::baseState"));
}

#[test]
fn test_jotai_derived_and_atom_with_default() {
    let report = analyze_core(&[(
        "src/jotai.ts",
        r#"
import { atom } from "jotai";
import { atomWithDefault } from "jotai/utils";
export const themeAtom = atom("light");
export const upperTheme = atom((get) => get(themeAtom).toUpperCase());
export const widthAtom = atomWithDefault((get) => get(themeAtom).length);
"#,
    )]);

    assert!(report
        .dependency_edges
        .iter()
        .any(|e| e.from_state_id == "src/jotai.ts::upperTheme" && e.via == "jotai:get"));
    assert!(report
        .dependency_edges
        .iter()
        .any(|e| e.from_state_id == "src/jotai.ts::widthAtom" && e.via == "jotai:get"));
}

#[test]
fn test_jotai_family_returning_derived_atoms() {
    let report = analyze_core(&[(
        "src/fam.ts",
        r#"
import { atom } from "jotai";
import { atomFamily } from "jotai/utils";
export const unitAtom = atom("px");
export const sizeFamily = atomFamily((id) => atom((get) => get(unitAtom) + id));
"#,
    )]);

    let edge = report
        .dependency_edges
        .iter()
        .find(|e| e.from_state_id == "src/fam.ts::sizeFamily")
        .expect("family-derived edge");
    assert_eq!(edge.to_state_id, "src/fam.ts::unitAtom");
    assert_eq!(edge.via, "jotai:get");
}

#[test]
fn test_cross_store_selector_read_via_context_get() {
    let report = analyze_core(&[
        (
            "src/shared.ts",
            r#"
import { atom } from "jotai";
export const sharedAtomB = atom(0);
"#,
        ),
        (
            "src/illegal.ts",
            r#"
import { selector } from "recoil";
import { sharedAtomB } from "./shared";
export const illegalSel = selector({
  key: "illegalSel",
  get: ({ get }) => get(sharedAtomB),
});
"#,
        ),
    ]);

    let edge = &report.dependency_edges[0];
    assert_eq!(edge.from_state_id, "src/illegal.ts::illegalSel");
    assert_eq!(edge.to_state_id, "src/shared.ts::sharedAtomB");
    assert_eq!(edge.via, "recoil:get");
}

#[test]
fn test_cross_store_selector_read_via_handle() {
    let report = analyze_extended(&[(
        "src/illegal.ts",
        r#"
import { selector } from "recoil";
import { atom, createStore } from "jotai";
export const sharedAtomB = atom(0);
const handle = createStore();
export const illegalSel2 = selector({
  key: "illegalSel2",
  get() {
    return handle.get(sharedAtomB);
  },
});
"#,
    )]);

    let edge = report
        .dependency_edges
        .iter()
        .find(|e| e.via == "jotai:handle.get")
        .expect("handle dependency edge");
    assert_eq!(edge.from_state_id, "src/illegal.ts::illegalSel2");
    assert_eq!(edge.to_state_id, "src/illegal.ts::sharedAtomB");
}

#[test]
fn test_events_and_edges_are_deduplicated_and_ordered() {
    let report = analyze_extended(&[(
        "src/app.tsx",
        r#"
import { atom, useRecoilValue, useSetRecoilState } from "recoil";
export const aState = atom({ key: "a", default: 0 });
export const bState = atom({ key: "b", default: 0 });
export function App() {
  const a = useRecoilValue(aState);
  const b = useRecoilValue(bState);
  const setA = useSetRecoilState(aState);
  const onClick = () => setA(a + b);
  return null;
}
"#,
    )]);

    let mut identities = std::collections::HashSet::new();
    for event in &report.usage_events {
        assert!(identities.insert(format!("{:?}", event.identity())));
    }
    for pair in report.usage_events.windows(2) {
        assert!(pair[0].order_key() <= pair[1].order_key());
    }
    for pair in report.dependency_edges.windows(2) {
        assert!(pair[0].order_key() <= pair[1].order_key());
    }
}

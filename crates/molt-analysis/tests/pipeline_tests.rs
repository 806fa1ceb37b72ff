//! End-to-end pipeline tests: full scenarios, determinism, and the rule
//! evaluators consuming real extraction output.

use molt_analysis::{analyze, CapabilityProfile, Project, SourceSpec};
use molt_graph::{evaluate_all, impact_of, EventKind, RuleId};

fn run(sources: &[(&str, &str)], profile: CapabilityProfile) -> molt_graph::AuditReport {
    let project = Project::from_sources(
        sources
            .iter()
            .map(|(p, s)| SourceSpec::new(*p, *s))
            .collect(),
    )
    .expect("valid project");
    analyze(&project, &profile)
}

#[test]
fn test_cross_store_dependency_fires_r001() {
    let report = run(
        &[
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
        ],
        CapabilityProfile::core(),
    );

    let violations = evaluate_all(&report);
    let r001: Vec<_> = violations
        .iter()
        .filter(|v| v.rule == RuleId::R001)
        .collect();
    assert_eq!(r001.len(), 1);
    assert_eq!(r001[0].state_id, "src/illegal.ts::illegalSel");
}

#[test]
fn test_handle_read_in_selector_fires_r001() {
    let report = run(
        &[(
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
        )],
        CapabilityProfile::extended(),
    );

    assert!(evaluate_all(&report)
        .iter()
        .any(|v| v.rule == RuleId::R001 && v.state_id == "src/illegal.ts::illegalSel2"));
}

#[test]
fn test_jotai_reading_recoil_fires_r002() {
    let report = run(
        &[(
            "src/mixed.ts",
            r#"
import { atom } from "recoil";
import { atom as jAtom } from "jotai";
export const legacyState = atom({ key: "legacy", default: 0 });
export const mirrorAtom = jAtom((get) => get(legacyState));
"#,
        )],
        CapabilityProfile::core(),
    );

    assert!(evaluate_all(&report)
        .iter()
        .any(|v| v.rule == RuleId::R002 && v.state_id == "src/mixed.ts::mirrorAtom"));
}

#[test]
fn test_read_only_plain_atom_round_trip() {
    // Init writes do not count as runtime writes: R004 fires.
    let sources = [(
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
    )];
    let report = run(&sources, CapabilityProfile::extended());

    assert!(report
        .usage_events
        .iter()
        .any(|e| e.kind == EventKind::InitWrite));
    assert!(report
        .usage_events
        .iter()
        .all(|e| e.kind != EventKind::RuntimeWrite));
    assert!(evaluate_all(&report)
        .iter()
        .any(|v| v.rule == RuleId::R004 && v.state_id == "src/init.tsx::counterState"));

    // A runtime write anywhere silences the rule.
    let written = [(
        "src/init.tsx",
        r#"
import { atom, useRecoilValue, useSetRecoilState } from "recoil";
export const counterState = atom({ key: "counter", default: 0 });
export function Root() {
  const value = useRecoilValue(counterState);
  const setCounter = useSetRecoilState(counterState);
  const bump = () => setCounter(value + 1);
  return null;
}
"#,
    )];
    let report = run(&written, CapabilityProfile::extended());
    assert!(evaluate_all(&report)
        .iter()
        .all(|v| v.rule != RuleId::R004));
}

#[test]
fn test_orphan_state_fires_r003() {
    let report = run(
        &[(
            "src/stale.ts",
            r#"
import { atom, useRecoilValue } from "recoil";
export const usedState = atom({ key: "used", default: 0 });
export const staleState = atom({ key: "stale", default: 0 });
export function App() {
  return useRecoilValue(usedState);
}
"#,
        )],
        CapabilityProfile::core(),
    );

    let orphans: Vec<_> = evaluate_all(&report)
        .into_iter()
        .filter(|v| v.rule == RuleId::R003)
        .collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].state_id, "src/stale.ts::staleState");
}

#[test]
fn test_impact_query_over_extracted_graph() {
    let report = run(
        &[(
            "src/chain.ts",
            r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const midSel = selector({ key: "mid", get: ({ get }) => get(baseState) });
export const topSel = selector({ key: "top", get: ({ get }) => get(midSel) });
"#,
        )],
        CapabilityProfile::core(),
    );

    let impact = impact_of(&report, "src/chain.ts::baseState").expect("known state");
    let affected: Vec<(&str, usize)> = impact
        .affected
        .iter()
        .map(|a| (a.state_id.as_str(), a.depth))
        .collect();
    assert_eq!(
        affected,
        vec![("src/chain.ts::midSel", 1), ("src/chain.ts::topSel", 2)]
    );
}

#[test]
fn test_determinism_under_source_order() {
    let a = (
        "src/state.ts",
        r#"
import { atom, selector } from "recoil";
export const baseState = atom({ key: "base", default: 1 });
export const doubled = selector({ key: "doubled", get: ({ get }) => get(baseState) * 2 });
"#,
    );
    let b = (
        "src/app.tsx",
        r#"
import { useRecoilValue, useSetRecoilState } from "recoil";
import { baseState, doubled } from "./state";
export function App() {
  const value = useRecoilValue(doubled);
  const setBase = useSetRecoilState(baseState);
  const onClick = () => setBase(value);
  return <button onClick={setBase} />;
}
"#,
    );

    let first = run(&[a, b], CapabilityProfile::extended());
    let second = run(&[b, a], CapabilityProfile::extended());

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json, "presentation order must not matter");

    // Re-running the analysis on the same project is idempotent.
    let third = run(&[a, b], CapabilityProfile::extended());
    assert_eq!(first_json, serde_json::to_string(&third).unwrap());
}

#[test]
fn test_event_integrity_invariants() {
    let report = run(
        &[
            (
                "src/state.ts",
                r#"
import { atom, selector } from "recoil";
import { atom as jAtom } from "jotai";
export const aState = atom({ key: "a", default: 0 });
export const bAtom = jAtom(0);
export const mixedSel = selector({ key: "mixed", get: ({ get }) => get(aState) + get(bAtom) });
"#,
            ),
            (
                "src/app.tsx",
                r#"
import { useRecoilValue, useSetRecoilState } from "recoil";
import { aState, mixedSel } from "./state";
export function App() {
  const v = useRecoilValue(mixedSel);
  const setA = useSetRecoilState(aState);
  const bump = () => setA(v);
  return null;
}
"#,
            ),
        ],
        CapabilityProfile::extended(),
    );

    // Every event's state exists in the index.
    for event in &report.usage_events {
        assert!(
            report.state(&event.state_id).is_some(),
            "event references unknown state {}",
            event.state_id
        );
    }

    // Every dependency-phase event has a matching edge.
    for event in report
        .usage_events
        .iter()
        .filter(|e| e.phase == molt_graph::Phase::Dependency)
    {
        assert_eq!(event.kind, EventKind::Read);
        assert_eq!(event.actor_kind, molt_graph::ActorKind::State);
        let owner = event.actor_state_id.as_deref().expect("dependency actor");
        assert!(report.dependency_edges.iter().any(|edge| {
            edge.from_state_id == owner
                && edge.to_state_id == event.state_id
                && edge.location == event.location
                && edge.via == event.via
        }));
    }

    // And the reverse: every edge has its paired read.
    for edge in &report.dependency_edges {
        assert!(report.usage_events.iter().any(|e| {
            e.phase == molt_graph::Phase::Dependency
                && e.state_id == edge.to_state_id
                && e.actor_state_id.as_deref() == Some(edge.from_state_id.as_str())
                && e.location == edge.location
        }));
    }
}

#[test]
fn test_empty_project_yields_empty_report() {
    let report = run(&[], CapabilityProfile::extended());
    assert!(report.states.is_empty());
    assert!(report.usage_events.is_empty());
    assert!(report.dependency_edges.is_empty());
}

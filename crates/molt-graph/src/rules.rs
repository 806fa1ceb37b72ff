//! Migration-safety rules.
//!
//! Each rule is a pure reduction over the audit report: count events or
//! edges, compare, emit violations. Rules never look at source text.

use serde::{Deserialize, Serialize};

use crate::event::{EventKind, Phase};
use crate::report::AuditReport;
use crate::span::Location;
use crate::state::{StateId, Store};

/// Identifiers of the built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Recoil-owned state depends on Jotai state.
    R001,
    /// Jotai-owned state depends on Recoil state.
    R002,
    /// State with no usage events and no incident dependency edges.
    R003,
    /// Plain Recoil atom with runtime reads and zero runtime writes.
    R004,
}

impl RuleId {
    /// Short human-readable rule name.
    pub fn name(&self) -> &'static str {
        match self {
            RuleId::R001 => "recoil-reads-jotai",
            RuleId::R002 => "jotai-reads-recoil",
            RuleId::R003 => "orphan-state",
            RuleId::R004 => "read-only-plain-atom",
        }
    }
}

/// A single rule violation, anchored to the offending state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: RuleId,
    pub state_id: StateId,
    pub location: Location,
    pub message: String,
}

/// Evaluate all four rules over a report.
///
/// Output is sorted by (rule, stateId, location) so repeated runs are
/// byte-identical.
pub fn evaluate_all(report: &AuditReport) -> Vec<Violation> {
    let mut violations = Vec::new();
    violations.extend(cross_store_reads(report, Store::Recoil, RuleId::R001));
    violations.extend(cross_store_reads(report, Store::Jotai, RuleId::R002));
    violations.extend(orphan_states(report));
    violations.extend(read_only_plain_atoms(report));
    violations.sort_by(|a, b| {
        (a.rule, &a.state_id, &a.location).cmp(&(b.rule, &b.state_id, &b.location))
    });
    violations
}

/// R001 / R002: a dependency edge crossing the store boundary.
///
/// `owner_store` selects the direction: edges whose reading side belongs to
/// `owner_store` and whose target belongs to the other store violate.
fn cross_store_reads(report: &AuditReport, owner_store: Store, rule: RuleId) -> Vec<Violation> {
    let mut out = Vec::new();
    for edge in &report.dependency_edges {
        let Some(from) = report.state(&edge.from_state_id) else {
            continue;
        };
        let Some(to) = report.state(&edge.to_state_id) else {
            continue;
        };
        if from.store == owner_store && to.store != owner_store {
            out.push(Violation {
                rule,
                state_id: from.id.clone(),
                location: edge.location.clone(),
                message: format!(
                    "{} `{}` reads {} state `{}` ({})",
                    store_label(from.store),
                    from.name,
                    store_label(to.store),
                    to.name,
                    edge.via
                ),
            });
        }
    }
    out
}

/// R003: states nothing reads, writes, or depends on.
fn orphan_states(report: &AuditReport) -> Vec<Violation> {
    report
        .states
        .iter()
        .filter(|state| {
            report.events_for(&state.id).next().is_none()
                && report.edges_from(&state.id).next().is_none()
                && report.edges_to(&state.id).next().is_none()
        })
        .map(|state| Violation {
            rule: RuleId::R003,
            state_id: state.id.clone(),
            location: state.location.clone(),
            message: format!("state `{}` has no usages and no dependents", state.name),
        })
        .collect()
}

/// R004: plain Recoil atoms with at least one runtime read and no runtime
/// writes. Init writes are ignored: an atom that is only seeded during
/// initialization and then read is mechanically migratable.
fn read_only_plain_atoms(report: &AuditReport) -> Vec<Violation> {
    report
        .states
        .iter()
        .filter(|state| state.is_plain_recoil_atom)
        .filter(|state| {
            let mut runtime_reads = 0usize;
            let mut runtime_writes = 0usize;
            for event in report.events_for(&state.id) {
                if event.phase != Phase::Runtime {
                    continue;
                }
                match event.kind {
                    EventKind::Read => runtime_reads += 1,
                    EventKind::RuntimeWrite => runtime_writes += 1,
                    EventKind::InitWrite => {}
                }
            }
            runtime_reads > 0 && runtime_writes == 0
        })
        .map(|state| Violation {
            rule: RuleId::R004,
            state_id: state.id.clone(),
            location: state.location.clone(),
            message: format!(
                "plain atom `{}` is read at runtime but never written; migrate it",
                state.name
            ),
        })
        .collect()
}

fn store_label(store: Store) -> &'static str {
    match store {
        Store::Recoil => "recoil",
        Store::Jotai => "jotai",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::DependencyEdge;
    use crate::event::{ActorKind, UsageEvent};
    use crate::state::{state_id, StateKind, StateSymbol};

    fn symbol(file: &str, name: &str, store: Store, kind: StateKind, plain: bool) -> StateSymbol {
        StateSymbol {
            id: state_id(file, name),
            name: name.into(),
            store,
            kind,
            location: Location::new(file, 1, 0),
            exported: true,
            is_plain_recoil_atom: plain,
        }
    }

    fn read_event(state: &str, phase: Phase) -> UsageEvent {
        UsageEvent {
            kind: EventKind::Read,
            phase,
            state_id: state.into(),
            actor_kind: ActorKind::Function,
            actor_name: "App".into(),
            actor_state_id: None,
            location: Location::new("src/app.tsx", 5, 2),
            via: "recoil:useRecoilValue".into(),
        }
    }

    fn write_event(state: &str, kind: EventKind) -> UsageEvent {
        UsageEvent {
            kind,
            phase: Phase::Runtime,
            state_id: state.into(),
            actor_kind: ActorKind::Function,
            actor_name: "App".into(),
            actor_state_id: None,
            location: Location::new("src/app.tsx", 9, 2),
            via: "setter-call".into(),
        }
    }

    #[test]
    fn test_r001_fires_on_recoil_to_jotai_edge() {
        let sel = symbol("s.ts", "illegalSel", Store::Recoil, StateKind::Selector, false);
        let shared = symbol("s.ts", "sharedAtomB", Store::Jotai, StateKind::Atom, false);
        let report = AuditReport {
            dependency_edges: vec![DependencyEdge {
                from_state_id: sel.id.clone(),
                to_state_id: shared.id.clone(),
                location: Location::new("s.ts", 4, 30),
                via: "recoil:get".into(),
            }],
            usage_events: Vec::new(),
            states: vec![sel, shared],
        };

        let violations = evaluate_all(&report);
        let r001: Vec<_> = violations.iter().filter(|v| v.rule == RuleId::R001).collect();
        assert_eq!(r001.len(), 1);
        assert_eq!(r001[0].state_id, "s.ts::illegalSel");
        // The same edge must not also fire the reverse rule.
        assert!(violations.iter().all(|v| v.rule != RuleId::R002));
    }

    #[test]
    fn test_r003_ignores_states_with_any_incident_edge() {
        let sel = symbol("s.ts", "sel", Store::Recoil, StateKind::Selector, false);
        let base = symbol("s.ts", "base", Store::Recoil, StateKind::Atom, true);
        let orphan = symbol("s.ts", "stale", Store::Recoil, StateKind::Atom, true);
        let report = AuditReport {
            dependency_edges: vec![DependencyEdge {
                from_state_id: sel.id.clone(),
                to_state_id: base.id.clone(),
                location: Location::new("s.ts", 2, 10),
                via: "recoil:get".into(),
            }],
            usage_events: Vec::new(),
            states: vec![sel, base, orphan],
        };

        let orphans: Vec<_> = evaluate_all(&report)
            .into_iter()
            .filter(|v| v.rule == RuleId::R003)
            .collect();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].state_id, "s.ts::stale");
    }

    #[test]
    fn test_r004_ignores_init_writes() {
        let counter = symbol("s.ts", "counter", Store::Recoil, StateKind::Atom, true);
        let id = counter.id.clone();
        let mut report = AuditReport {
            states: vec![counter],
            usage_events: vec![
                read_event(&id, Phase::Runtime),
                write_event(&id, EventKind::InitWrite),
            ],
            dependency_edges: Vec::new(),
        };

        let fired = evaluate_all(&report)
            .iter()
            .any(|v| v.rule == RuleId::R004 && v.state_id == id);
        assert!(fired, "init writes must not mask a read-only atom");

        // A single runtime write silences the rule.
        report
            .usage_events
            .push(write_event(&id, EventKind::RuntimeWrite));
        let fired = evaluate_all(&report).iter().any(|v| v.rule == RuleId::R004);
        assert!(!fired);
    }

    #[test]
    fn test_r004_skips_non_plain_atoms() {
        let derived = symbol("s.ts", "derived", Store::Recoil, StateKind::Atom, false);
        let id = derived.id.clone();
        let report = AuditReport {
            states: vec![derived],
            usage_events: vec![read_event(&id, Phase::Runtime)],
            dependency_edges: Vec::new(),
        };
        assert!(evaluate_all(&report).iter().all(|v| v.rule != RuleId::R004));
    }
}

//! Reverse-impact queries over the dependency graph.
//!
//! Answers "if I touch state X, who is affected?" by walking dependency
//! edges backwards: an edge `from -> to` means `from` reads `to`, so a
//! change to `to` ripples into `from` and, transitively, into everything
//! that reads `from`.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::event::Phase;
use crate::report::AuditReport;
use crate::state::StateId;

/// One affected state, with its distance from the query target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    pub state_id: StateId,
    /// Number of dependency hops from the target (direct readers are 1).
    pub depth: usize,
}

/// Result of a reverse-impact query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// The state the query started from.
    pub target: StateId,
    /// Affected states ordered by (depth, stateId).
    pub affected: Vec<ImpactEntry>,
    /// Names of functions with runtime events against the target or any
    /// affected state, sorted and deduplicated.
    pub affected_actors: Vec<String>,
}

/// Compute the reverse impact of touching `target`.
///
/// BFS over reversed dependency edges. Expansion is layer by layer with
/// sorted frontiers, so the output is deterministic regardless of edge
/// insertion order. Returns `None` if `target` is not a known state.
pub fn impact_of(report: &AuditReport, target: &str) -> Option<ImpactReport> {
    report.state(target)?;

    // to -> sorted readers
    let mut readers: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for edge in &report.dependency_edges {
        readers
            .entry(edge.to_state_id.as_str())
            .or_default()
            .push(edge.from_state_id.as_str());
    }
    for list in readers.values_mut() {
        list.sort_unstable();
        list.dedup();
    }

    let mut affected = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    seen.insert(target);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((target, 0));

    while let Some((current, depth)) = queue.pop_front() {
        let Some(direct) = readers.get(current) else {
            continue;
        };
        for &reader in direct {
            if seen.insert(reader) {
                affected.push(ImpactEntry {
                    state_id: reader.to_string(),
                    depth: depth + 1,
                });
                queue.push_back((reader, depth + 1));
            }
        }
    }

    affected.sort_by(|a, b| (a.depth, &a.state_id).cmp(&(b.depth, &b.state_id)));

    let mut affected_actors: Vec<String> = report
        .usage_events
        .iter()
        .filter(|e| e.phase == Phase::Runtime)
        .filter(|e| {
            e.state_id == target || affected.iter().any(|a| a.state_id == e.state_id)
        })
        .filter(|e| e.actor_kind == crate::event::ActorKind::Function)
        .map(|e| e.actor_name.clone())
        .collect();
    affected_actors.sort_unstable();
    affected_actors.dedup();

    Some(ImpactReport {
        target: target.to_string(),
        affected,
        affected_actors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::DependencyEdge;
    use crate::span::Location;
    use crate::state::{state_id, StateKind, StateSymbol, Store};

    fn symbol(name: &str, kind: StateKind) -> StateSymbol {
        StateSymbol {
            id: state_id("s.ts", name),
            name: name.into(),
            store: Store::Recoil,
            kind,
            location: Location::new("s.ts", 1, 0),
            exported: true,
            is_plain_recoil_atom: kind == StateKind::Atom,
        }
    }

    fn edge(from: &str, to: &str, line: u32) -> DependencyEdge {
        DependencyEdge {
            from_state_id: state_id("s.ts", from),
            to_state_id: state_id("s.ts", to),
            location: Location::new("s.ts", line, 0),
            via: "recoil:get".into(),
        }
    }

    #[test]
    fn test_transitive_impact_depths() {
        // c reads b, b reads a: touching a affects b (1) and c (2).
        let report = AuditReport {
            states: vec![
                symbol("a", StateKind::Atom),
                symbol("b", StateKind::Selector),
                symbol("c", StateKind::Selector),
            ],
            usage_events: Vec::new(),
            dependency_edges: vec![edge("b", "a", 2), edge("c", "b", 3)],
        };

        let impact = impact_of(&report, "s.ts::a").unwrap();
        assert_eq!(
            impact.affected,
            vec![
                ImpactEntry { state_id: "s.ts::b".into(), depth: 1 },
                ImpactEntry { state_id: "s.ts::c".into(), depth: 2 },
            ]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let report = AuditReport {
            states: vec![symbol("a", StateKind::Selector), symbol("b", StateKind::Selector)],
            usage_events: Vec::new(),
            dependency_edges: vec![edge("a", "b", 2), edge("b", "a", 3)],
        };
        let impact = impact_of(&report, "s.ts::a").unwrap();
        assert_eq!(impact.affected.len(), 1);
        assert_eq!(impact.affected[0].state_id, "s.ts::b");
    }

    #[test]
    fn test_unknown_target() {
        assert!(impact_of(&AuditReport::default(), "nope::x").is_none());
    }
}

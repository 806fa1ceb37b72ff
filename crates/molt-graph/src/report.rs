//! The audit report: the analyzer's complete output for one project.

use serde::{Deserialize, Serialize};

use crate::edge::DependencyEdge;
use crate::event::UsageEvent;
use crate::state::{StateId, StateSymbol};

/// Everything one analysis run produced, in canonical order.
///
/// Rule evaluators and impact queries are pure functions over this record;
/// serializing it twice for the same project yields byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// All recognized state symbols, sorted by (file, line, name).
    pub states: Vec<StateSymbol>,
    /// Deduplicated usage events, sorted by (file, line, column, kind, stateId).
    pub usage_events: Vec<UsageEvent>,
    /// Deduplicated dependency edges, sorted by (file, line, column, from, to).
    pub dependency_edges: Vec<DependencyEdge>,
}

impl AuditReport {
    /// Look up a state by id.
    pub fn state(&self, id: &str) -> Option<&StateSymbol> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Events touching one state, in canonical order.
    pub fn events_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a UsageEvent> + 'a {
        self.usage_events.iter().filter(move |e| e.state_id == id)
    }

    /// Edges whose reading side is `id`.
    pub fn edges_from<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.dependency_edges
            .iter()
            .filter(move |e| e.from_state_id == id)
    }

    /// Edges whose read target is `id`.
    pub fn edges_to<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.dependency_edges
            .iter()
            .filter(move |e| e.to_state_id == id)
    }

    /// Ids of all states, in index order.
    pub fn state_ids(&self) -> impl Iterator<Item = &StateId> {
        self.states.iter().map(|s| &s.id)
    }
}

//! Dependency edge records.

use serde::{Deserialize, Serialize};

use crate::span::Location;
use crate::state::StateId;

/// A directed state-to-state dependency: `from` reads `to` during its
/// compute step.
///
/// Every edge is paired with a dependency-phase read event at the same
/// location with the same `via`; the extractor produces the two together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub from_state_id: StateId,
    pub to_state_id: StateId,
    pub location: Location,
    /// `recoil:get`, `jotai:get`, or `jotai:handle.get` for cross-store
    /// imperative reads.
    pub via: String,
}

impl DependencyEdge {
    /// Identity tuple used for deduplication.
    pub fn identity(&self) -> (&str, &str, &str, u32, u32, &str) {
        (
            &self.from_state_id,
            &self.to_state_id,
            &self.location.file,
            self.location.line,
            self.location.column,
            &self.via,
        )
    }

    /// Canonical output ordering: (file, line, column, from, to).
    pub fn order_key(&self) -> (&str, u32, u32, &str, &str) {
        (
            &self.location.file,
            self.location.line,
            self.location.column,
            &self.from_state_id,
            &self.to_state_id,
        )
    }
}

//! Usage event records.
//!
//! A usage event is a single observed interaction with a state symbol: a
//! read, a runtime write, or an initialization write. Events are immutable
//! once produced; the pipeline deduplicates them by their full identity tuple
//! and orders them under a canonical total order.

use serde::{Deserialize, Serialize};

use crate::span::Location;
use crate::state::StateId;

/// What kind of interaction the event records.
///
/// Variant order is meaningful: it is the tie-break used by the canonical
/// event ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The state's value is read.
    Read,
    /// The state is written during normal execution.
    RuntimeWrite,
    /// The state is written from an initialization context.
    InitWrite,
}

/// Whether the event happened at runtime or as part of a selector/derived
/// compute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Runtime,
    Dependency,
}

/// Who performed the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    /// Another state symbol (dependency reads).
    State,
    /// A named function or component.
    Function,
    /// No identifiable actor (module top level, anonymous scope).
    Unknown,
}

/// A single usage event against a state symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub kind: EventKind,
    pub phase: Phase,
    /// The state being read or written.
    pub state_id: StateId,
    pub actor_kind: ActorKind,
    pub actor_name: String,
    /// Present only for dependency reads: the state doing the reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_state_id: Option<StateId>,
    pub location: Location,
    /// Short tag identifying the detection shape, e.g. `recoil:useRecoilValue`
    /// or `setter-call`. Init-classified writes carry an `init:` prefix.
    pub via: String,
}

impl UsageEvent {
    /// Full identity tuple used for deduplication.
    ///
    /// Two events that agree on every component are the same observation and
    /// only one survives dedup.
    pub fn identity(
        &self,
    ) -> (
        EventKind,
        Phase,
        &str,
        ActorKind,
        &str,
        &str,
        u32,
        u32,
        &str,
    ) {
        (
            self.kind,
            self.phase,
            &self.state_id,
            self.actor_kind,
            &self.actor_name,
            &self.location.file,
            self.location.line,
            self.location.column,
            &self.via,
        )
    }

    /// Canonical output ordering: (file, line, column, kind, stateId).
    pub fn order_key(&self) -> (&str, u32, u32, EventKind, &str) {
        (
            &self.location.file,
            self.location.line,
            self.location.column,
            self.kind,
            &self.state_id,
        )
    }

    /// True for writes of either classification.
    pub fn is_write(&self) -> bool {
        matches!(self.kind, EventKind::RuntimeWrite | EventKind::InitWrite)
    }
}

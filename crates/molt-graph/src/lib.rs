//! # molt-graph
//!
//! Pure data model for dual-store state audits.
//!
//! This crate holds the records the analysis engine produces - state
//! symbols, usage events, dependency edges - plus the consumers that stay
//! pure reductions over them: the migration-safety rules and the
//! reverse-impact query. There is no I/O and no parsing here; everything is
//! deterministic given the same `AuditReport`.
//!
//! ## Overview
//!
//! ```text
//!   AuditReport
//!   ├── states: Vec<StateSymbol>        (who exists)
//!   ├── usage_events: Vec<UsageEvent>   (who touches whom, when)
//!   └── dependency_edges: Vec<DependencyEdge>  (state -> state reads)
//!          │
//!          ├──> rules::evaluate_all     (R001..R004 violations)
//!          └──> impact::impact_of       (reverse BFS: who is affected)
//! ```
//!
//! The engine that fills an `AuditReport` lives in `molt-analysis`.

pub mod edge;
pub mod event;
pub mod impact;
pub mod report;
pub mod rules;
pub mod span;
pub mod state;

pub use edge::DependencyEdge;
pub use event::{ActorKind, EventKind, Phase, UsageEvent};
pub use impact::{impact_of, ImpactEntry, ImpactReport};
pub use report::AuditReport;
pub use rules::{evaluate_all, RuleId, Violation};
pub use span::Location;
pub use state::{state_id, StateId, StateKind, StateSymbol, Store};

//! # molt-analysis
//!
//! The event-extraction engine for dual-store migration audits.
//!
//! Given a set of typed front-end sources mid-migration from Recoil to
//! Jotai, this crate finds every state symbol, every usage event against
//! those symbols, and every state-to-state dependency edge, and returns them
//! as a deterministic [`molt_graph::AuditReport`].
//!
//! ## Architecture
//!
//! ```text
//!   Project (lowered sources, import maps)
//!      │
//!      ▼
//!   SymbolIndex ──────────────┐
//!      │                      │
//!      ▼                      ▼
//!   SetterBindings ──► OneHopForwarding     HandleSet
//!      │                      │                │
//!      └──────────┬───────────┴────────────────┘
//!                 ▼
//!          Event extractors + dependency extractor
//!                 │
//!                 ▼
//!          dedup + canonical order ──► AuditReport
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use molt_analysis::{analyze, CapabilityProfile, Project, SourceSpec};
//!
//! # fn main() -> Result<(), molt_analysis::AnalysisError> {
//! let project = Project::from_sources(vec![
//!     SourceSpec::new("src/state.ts", r#"
//!         import { atom } from "recoil";
//!         export const counterState = atom({ key: "counter", default: 0 });
//!     "#),
//!     SourceSpec::new("src/app.tsx", r#"
//!         import { useRecoilValue } from "recoil";
//!         import { counterState } from "./state";
//!         export function App() { return useRecoilValue(counterState); }
//!     "#),
//! ])?;
//!
//! let report = analyze(&project, &CapabilityProfile::extended());
//! assert_eq!(report.states.len(), 1);
//! assert_eq!(report.usage_events.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Analysis is a pure function: no I/O, no global state, no caches that
//! outlive one [`analyze`] call.

pub mod bindings;
mod error;
pub mod extract;
pub mod index;
pub mod libs;
pub mod pipeline;
pub mod project;
pub mod resolve;
pub mod syntax;

pub use error::{AnalysisError, Result};
pub use index::SymbolIndex;
pub use pipeline::{analyze, CapabilityProfile};
pub use project::{Project, SourceSpec};
pub use resolve::{SymbolKey, SymbolResolver};

#[cfg(test)]
mod tests;

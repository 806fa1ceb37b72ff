//! The analysis pipeline: capability-gated binding computation, extractor
//! composition, deduplication, and canonical ordering.

use rustc_hash::FxHashSet;
use tracing::debug;

use molt_graph::{ActorKind, AuditReport, EventKind, Phase};

use crate::bindings::{detect_handles, forward_bindings, resolve_setter_bindings, HandleSet};
use crate::extract::{
    DependencyExtractor, DirectHookExtractor, Extraction, Extractor, HandleWriteExtractor,
    JotaiCallbackExtractor, PipelineContext, RecoilCallbackExtractor, SetterEventExtractor,
};
use crate::index::SymbolIndex;
use crate::project::Project;
use crate::resolve::SymbolResolver;

/// The four switches gating the expensive analyses.
///
/// The rule evaluators and the impact query run unchanged against whichever
/// event set a profile produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProfile {
    /// Analyze `useRecoilCallback` / `useAtomCallback` bodies.
    pub callbacks: bool,
    /// Resolve custom wrapper hooks when binding setters.
    pub wrappers: bool,
    /// Extend setter bindings by one forwarding hop.
    pub forwarding: bool,
    /// Detect imperative store handles and their writes.
    pub handle_api: bool,
}

impl CapabilityProfile {
    /// Everything off: direct hooks, setter sites, and dependencies only.
    pub fn core() -> Self {
        Self {
            callbacks: false,
            wrappers: false,
            forwarding: false,
            handle_api: false,
        }
    }

    /// Everything on.
    pub fn extended() -> Self {
        Self {
            callbacks: true,
            wrappers: true,
            forwarding: true,
            handle_api: true,
        }
    }
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self::extended()
    }
}

/// Run the full analysis over a loaded project.
///
/// Pure and deterministic: the same project yields byte-identical output,
/// regardless of the presentation order its sources were loaded in (the
/// project sorts them). All scratch state - bindings, handles, wrapper
/// caches - lives and dies inside this call.
pub fn analyze(project: &Project, profile: &CapabilityProfile) -> AuditReport {
    let resolver = SymbolResolver::new(project);

    // Phase 1: the symbol index and capability-gated bindings.
    let index = SymbolIndex::build(project, &resolver);
    debug!(states = index.states.len(), "symbol index built");

    let handles = if profile.handle_api {
        detect_handles(project, &resolver)
    } else {
        HandleSet::default()
    };

    let mut bindings = resolve_setter_bindings(project, &resolver, &index, profile.wrappers);
    if profile.forwarding {
        let forwarded = forward_bindings(project, &resolver, &bindings);
        bindings.absorb(forwarded);
    }
    debug!(bindings = bindings.len(), handles = handles.len(), "bindings resolved");

    // Phase 2: the pipeline context.
    let cx = PipelineContext {
        project,
        resolver,
        index: &index,
        bindings: &bindings,
        handles: &handles,
        profile,
    };

    // Phase 3: the gated extractor list.
    let mut extractors: Vec<Box<dyn Extractor>> =
        vec![Box::new(DirectHookExtractor), Box::new(SetterEventExtractor)];
    if profile.callbacks {
        extractors.push(Box::new(RecoilCallbackExtractor));
        extractors.push(Box::new(JotaiCallbackExtractor));
    }
    if profile.handle_api {
        extractors.push(Box::new(HandleWriteExtractor));
    }
    extractors.push(Box::new(DependencyExtractor));

    let mut extraction = Extraction::default();
    for extractor in &extractors {
        let partial = extractor.run(&cx);
        debug!(
            extractor = extractor.name(),
            events = partial.events.len(),
            edges = partial.edges.len(),
            "extractor finished"
        );
        extraction.absorb(partial);
    }

    // Phase 4: dedup by identity tuple, then the canonical total order.
    let Extraction {
        mut events,
        mut edges,
    } = extraction;

    let mut seen_events: FxHashSet<EventIdentity> = FxHashSet::default();
    events.retain(|e| {
        seen_events.insert((
            e.kind,
            e.phase,
            e.state_id.clone(),
            e.actor_kind,
            e.actor_name.clone(),
            e.location.file.clone(),
            e.location.line,
            e.location.column,
            e.via.clone(),
        ))
    });
    events.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

    let mut seen_edges: FxHashSet<EdgeIdentity> = FxHashSet::default();
    edges.retain(|e| {
        seen_edges.insert((
            e.from_state_id.clone(),
            e.to_state_id.clone(),
            e.location.file.clone(),
            e.location.line,
            e.location.column,
            e.via.clone(),
        ))
    });
    edges.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

    debug!(events = events.len(), edges = edges.len(), "analysis complete");

    AuditReport {
        states: index.states.clone(),
        usage_events: events,
        dependency_edges: edges,
    }
}

type EventIdentity = (
    EventKind,
    Phase,
    String,
    ActorKind,
    String,
    String,
    u32,
    u32,
    String,
);

type EdgeIdentity = (String, String, String, u32, u32, String);

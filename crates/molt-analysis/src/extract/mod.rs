//! Usage-event and dependency extraction.
//!
//! Extractors share a single shape: given the pipeline context (project,
//! index, bindings, handles, profile), return events and edges. Variants
//! compose by concatenation; capability gating is a list filter in the
//! pipeline.

mod callbacks;
mod deps;
mod handles;
mod hooks;
mod init;
mod setters;

pub use callbacks::{JotaiCallbackExtractor, RecoilCallbackExtractor};
pub use deps::DependencyExtractor;
pub use handles::HandleWriteExtractor;
pub use hooks::DirectHookExtractor;
pub use init::in_init_context;
pub use setters::SetterEventExtractor;

use molt_graph::{ActorKind, DependencyEdge, Location, StateId, UsageEvent};

use crate::bindings::{HandleSet, SetterBindings};
use crate::index::SymbolIndex;
use crate::pipeline::CapabilityProfile;
use crate::project::{FileId, Project};
use crate::resolve::SymbolResolver;
use crate::syntax::{NodeId, NodeKind};

/// What one extractor produced.
#[derive(Debug, Default)]
pub struct Extraction {
    pub events: Vec<UsageEvent>,
    pub edges: Vec<DependencyEdge>,
}

impl Extraction {
    pub fn absorb(&mut self, other: Extraction) {
        self.events.extend(other.events);
        self.edges.extend(other.edges);
    }
}

/// Everything an extractor may consult.
pub struct PipelineContext<'a> {
    pub project: &'a Project,
    pub resolver: SymbolResolver<'a>,
    pub index: &'a SymbolIndex,
    /// Setter bindings, forwarded entries merged in.
    pub bindings: &'a SetterBindings,
    pub handles: &'a HandleSet,
    pub profile: &'a CapabilityProfile,
}

impl<'a> PipelineContext<'a> {
    /// Location of a byte offset in a file.
    pub fn location(&self, file: FileId, offset: u32) -> Location {
        let module = self.project.module(file);
        let (line, column) = module.line_column(offset);
        Location::new(&module.path, line, column)
    }

    /// The nearest enclosing named function of a node, as an event actor.
    pub fn actor_of(&self, file: FileId, node: NodeId) -> (ActorKind, String) {
        let tree = &self.project.module(file).tree;
        let mut current = node;
        while let Some(func) = tree.enclosing_function(current) {
            if let Some(name) = tree.function_name(func) {
                return (ActorKind::Function, name);
            }
            current = func;
        }
        (ActorKind::Unknown, "<module>".to_string())
    }

    /// Resolve a call's positional argument to a known state.
    pub fn state_of_arg(&self, file: FileId, call: NodeId, i: usize) -> Option<StateId> {
        let arg = self.resolver.arg_of(file, call, i)?;
        self.index
            .state_of_expr(&self.resolver, file, arg)
            .cloned()
    }

    /// Split a call's callee into a member access `(object, property)`.
    pub fn callee_member(&self, file: FileId, call: NodeId) -> Option<(NodeId, String)> {
        let callee = self.resolver.callee_of(file, call)?;
        let tree = &self.project.module(file).tree;
        let NodeKind::Member { object, property } = tree.kind(callee) else {
            return None;
        };
        let object = tree.child_at(callee, *object)?;
        Some((object, property.clone()))
    }

    /// A call's callee as a bare reference name.
    pub fn callee_reference(&self, file: FileId, call: NodeId) -> Option<(NodeId, String)> {
        let callee = self.resolver.callee_of(file, call)?;
        let tree = &self.project.module(file).tree;
        let NodeKind::Reference { name, .. } = tree.kind(callee) else {
            return None;
        };
        Some((callee, name.clone()))
    }
}

/// Name bound by a function parameter at `position`, when it is a plain
/// identifier.
pub(crate) fn param_ident(
    tree: &crate::syntax::SyntaxTree,
    func: NodeId,
    position: usize,
) -> Option<String> {
    let NodeKind::Function(f) = tree.kind(func) else {
        return None;
    };
    let span = *f.params.get(position)?;
    let param = tree.child_at(func, span)?;
    tree.decl_name(param).map(str::to_string)
}

/// One extractor variant.
pub trait Extractor {
    /// Human-readable name, used in trace output.
    fn name(&self) -> &'static str;

    fn run(&self, cx: &PipelineContext) -> Extraction;
}

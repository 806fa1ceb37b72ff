//! Dependency extraction: state-to-state edges from selector and derived
//! atom read functions.
//!
//! Four owner shapes produce edges: Recoil selectors and selector families,
//! Recoil atoms whose `default` is a selector (directly or by reference),
//! Jotai derived atoms and atoms-with-default, and Jotai atom families whose
//! factory returns derived atoms. Every edge is paired with a
//! dependency-phase read event at the same location with the same `via`.

use molt_graph::{ActorKind, DependencyEdge, EventKind, Phase, StateKind, StateSymbol, Store, UsageEvent};

use rustc_hash::FxHashSet;

use crate::libs::Lib;
use crate::project::FileId;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::{param_ident, Extraction, Extractor, PipelineContext};

pub struct DependencyExtractor;

impl Extractor for DependencyExtractor {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for state in &cx.index.states {
            let Some((file, call)) = cx.index.init_call(&state.id) else {
                continue;
            };
            match (state.store, state.kind) {
                (Store::Recoil, StateKind::Selector | StateKind::SelectorFamily) => {
                    self.extract_recoil_options(cx, state, file, call, &mut out);
                }
                (Store::Recoil, StateKind::Atom) if !state.is_plain_recoil_atom => {
                    self.extract_recoil_atom_default(cx, state, file, call, &mut out);
                }
                (Store::Jotai, StateKind::DerivedAtom | StateKind::AtomWithDefault) => {
                    if let Some(read_fn) = self.function_arg(cx, file, call) {
                        self.extract_jotai_read_fn(cx, state, file, read_fn, &mut out);
                    }
                }
                (Store::Jotai, StateKind::AtomFamily) => {
                    self.extract_jotai_family(cx, state, file, call, &mut out);
                }
                _ => {}
            }
        }

        out
    }
}

/// Names bound for reading inside one selector scope.
#[derive(Debug, Default, Clone)]
struct ReadBinding {
    /// Named context parameter (`(ctx) => ctx.get(...)`).
    ctx_name: Option<String>,
    /// Locals destructured from the context's `get`.
    get_names: FxHashSet<String>,
}

impl ReadBinding {
    fn is_empty(&self) -> bool {
        self.ctx_name.is_none() && self.get_names.is_empty()
    }

    fn from_scope(tree: &SyntaxTree, func: NodeId) -> Self {
        let mut binding = Self::default();
        let NodeKind::Function(f) = tree.kind(func) else {
            return binding;
        };
        let Some(param_span) = f.params.first() else {
            return binding;
        };
        let Some(param) = tree.child_at(func, *param_span) else {
            return binding;
        };
        match tree.kind(param) {
            NodeKind::DeclIdent { name } => binding.ctx_name = Some(name.clone()),
            NodeKind::ObjectPattern { props } => {
                for prop in props {
                    if prop.key.as_deref() != Some("get") {
                        continue;
                    }
                    if let Some(value) = tree.child_at(param, prop.value) {
                        if let NodeKind::DeclIdent { name } = tree.kind(value) {
                            binding.get_names.insert(name.clone());
                        }
                    }
                }
            }
            _ => {}
        }
        binding
    }
}

impl DependencyExtractor {
    /// The `get` function of a Recoil `selector({...})` options object:
    /// method shorthand or a property whose value is function-like.
    fn recoil_get_fn(
        &self,
        cx: &PipelineContext,
        file: FileId,
        options_call: NodeId,
    ) -> Option<NodeId> {
        let options = cx.resolver.arg_of(file, options_call, 0)?;
        let tree = &cx.project.module(file).tree;
        let NodeKind::ObjectLit { props } = tree.kind(options) else {
            return None;
        };
        let get = props.iter().find(|p| p.key.as_deref() == Some("get"))?;
        let value = tree.child_at(options, get.value)?;
        matches!(tree.kind(value), NodeKind::Function(_)).then_some(value)
    }

    /// Case 1: Recoil selector / selector family.
    fn extract_recoil_options(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        options_call: NodeId,
        out: &mut Extraction,
    ) {
        let Some(root) = self.recoil_get_fn(cx, file, options_call) else {
            return;
        };
        let tree = &cx.project.module(file).tree;

        // The root read scope, every nested function declaration (inner
        // helpers), and a returned function (curried selector-family `get`).
        let mut scopes = vec![root];
        for id in tree.descendants(root, true) {
            if let NodeKind::Function(f) = tree.kind(id) {
                if f.declaration {
                    scopes.push(id);
                }
            }
        }
        for ret in tree.returns_of(root) {
            if matches!(tree.kind(ret), NodeKind::Function(_)) {
                scopes.push(ret);
            }
        }

        let root_binding = ReadBinding::from_scope(tree, root);
        for scope in scopes {
            let mut binding = ReadBinding::from_scope(tree, scope);
            if binding.is_empty() {
                // Helpers without their own context parameter read through
                // the closure.
                binding = root_binding.clone();
            }
            for call in tree.calls_in(scope, true) {
                self.extract_scope_call(cx, owner, file, tree, &binding, call, out);
            }
        }
    }

    fn extract_scope_call(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        tree: &SyntaxTree,
        binding: &ReadBinding,
        call: NodeId,
        out: &mut Extraction,
    ) {
        if let Some((_, name)) = cx.callee_reference(file, call) {
            if binding.get_names.contains(&name) {
                self.emit(cx, owner, file, call, "recoil:get", out);
            }
            return;
        }
        let Some((object, property)) = cx.callee_member(file, call) else {
            return;
        };
        if property != "get" {
            return;
        }
        let NodeKind::Reference { name, .. } = tree.kind(object) else {
            return;
        };
        if binding.ctx_name.as_deref() == Some(name.as_str()) {
            self.emit(cx, owner, file, call, "recoil:get", out);
        } else if cx.handles.contains(&cx.resolver, file, object, name) {
            // Cross-store imperative read inside a selector body.
            self.emit(cx, owner, file, call, "jotai:handle.get", out);
        }
    }

    /// Case 2: Recoil atom whose `default` is a selector call or reference.
    fn extract_recoil_atom_default(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        options_call: NodeId,
        out: &mut Extraction,
    ) {
        let Some(options) = cx.resolver.arg_of(file, options_call, 0) else {
            return;
        };
        let tree = &cx.project.module(file).tree;
        let NodeKind::ObjectLit { props } = tree.kind(options) else {
            return;
        };
        let Some(default) = props.iter().find(|p| p.key.as_deref() == Some("default")) else {
            return;
        };
        let Some(value) = tree.child_at(options, default.value) else {
            return;
        };
        match tree.kind(value) {
            // Inline `default: selector({...})`.
            NodeKind::Call { .. } => {
                let is_selector = cx
                    .resolver
                    .callee_of(file, value)
                    .and_then(|callee| cx.resolver.factory_of(file, callee))
                    .map(|f| f.is(Lib::Recoil, "selector") || f.is(Lib::Recoil, "selectorFamily"))
                    .unwrap_or(false);
                if is_selector {
                    self.extract_recoil_options(cx, owner, file, value, out);
                }
            }
            // `default: someSelector` - the atom owns the referenced
            // selector's reads.
            NodeKind::Reference { .. } => {
                let Some(target) = cx.index.state_of_expr(&cx.resolver, file, value) else {
                    return;
                };
                let Some(target_state) = cx.index.state(target) else {
                    return;
                };
                if target_state.store != Store::Recoil
                    || !matches!(
                        target_state.kind,
                        StateKind::Selector | StateKind::SelectorFamily
                    )
                {
                    return;
                }
                if let Some((sel_file, sel_call)) = cx.index.init_call(&target_state.id) {
                    self.extract_recoil_options(cx, owner, sel_file, sel_call, out);
                }
            }
            _ => {}
        }
    }

    /// Case 3: Jotai derived atom / atom-with-default read function.
    fn extract_jotai_read_fn(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        read_fn: NodeId,
        out: &mut Extraction,
    ) {
        let tree = &cx.project.module(file).tree;
        let get_name = param_ident(tree, read_fn, 0).unwrap_or_else(|| "get".to_string());
        for call in tree.calls_in(read_fn, true) {
            let Some((_, name)) = cx.callee_reference(file, call) else {
                continue;
            };
            if name == get_name {
                self.emit(cx, owner, file, call, "jotai:get", out);
            }
        }
    }

    /// Case 4: Jotai atom family whose factory returns derived atoms.
    fn extract_jotai_family(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        family_call: NodeId,
        out: &mut Extraction,
    ) {
        let Some(factory_fn) = self.function_arg(cx, file, family_call) else {
            return;
        };
        let tree = &cx.project.module(file).tree;
        for ret in tree.returns_of(factory_fn) {
            if !matches!(tree.kind(ret), NodeKind::Call { .. }) {
                continue;
            }
            let Some(factory) = cx
                .resolver
                .callee_of(file, ret)
                .and_then(|callee| cx.resolver.factory_of(file, callee))
            else {
                continue;
            };
            let derived = factory.is(Lib::Jotai, "atom") || factory.is(Lib::JotaiUtils, "atomWithDefault");
            if !derived {
                continue;
            }
            if let Some(read_fn) = self.function_arg(cx, file, ret) {
                self.extract_jotai_read_fn(cx, owner, file, read_fn, out);
            }
        }
    }

    /// First argument of a call when it is a function literal.
    fn function_arg(&self, cx: &PipelineContext, file: FileId, call: NodeId) -> Option<NodeId> {
        let arg = cx.resolver.arg_of(file, call, 0)?;
        let tree = &cx.project.module(file).tree;
        matches!(tree.kind(arg), NodeKind::Function(_)).then_some(arg)
    }

    /// Emit the edge and its paired dependency read event.
    fn emit(
        &self,
        cx: &PipelineContext,
        owner: &StateSymbol,
        file: FileId,
        call: NodeId,
        via: &str,
        out: &mut Extraction,
    ) {
        let Some(target) = cx.state_of_arg(file, call, 0) else {
            return;
        };
        let tree = &cx.project.module(file).tree;
        let location = cx.location(file, tree.span(call).start);
        out.edges.push(DependencyEdge {
            from_state_id: owner.id.clone(),
            to_state_id: target.clone(),
            location: location.clone(),
            via: via.to_string(),
        });
        out.events.push(UsageEvent {
            kind: EventKind::Read,
            phase: Phase::Dependency,
            state_id: target,
            actor_kind: ActorKind::State,
            actor_name: owner.name.clone(),
            actor_state_id: Some(owner.id.clone()),
            location,
            via: via.to_string(),
        });
    }
}

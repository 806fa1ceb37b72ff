//! Callback-body extraction.
//!
//! Recoil's `useRecoilCallback` hands its callback a context object whose
//! members mutate and snapshot-read state; Jotai's `useAtomCallback` hands
//! its callback positional `get`/`set` functions. Both shapes may sit behind
//! one React `useCallback` memo wrapper. Recognition of the context members
//! is string-based because the frameworks' contracts are string-based; the
//! risk of collisions is contained by only honoring names destructured from
//! the callback's first parameters.

use rustc_hash::{FxHashMap, FxHashSet};

use molt_graph::{EventKind, Phase, UsageEvent};

use crate::libs::SNAPSHOT_READ_METHODS;
use crate::project::FileId;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::{in_init_context, param_ident, Extraction, Extractor, PipelineContext};

/// Resolve a callback factory's function argument, unwrapping one optional
/// `useCallback` memo indirection.
fn callback_fn(cx: &PipelineContext, file: FileId, call: NodeId) -> Option<NodeId> {
    let arg = cx.resolver.arg_of(file, call, 0)?;
    let tree = &cx.project.module(file).tree;
    match tree.kind(arg) {
        NodeKind::Function(_) => Some(arg),
        NodeKind::Call { .. } => {
            let factory = cx
                .resolver
                .callee_of(file, arg)
                .and_then(|callee| cx.resolver.factory_of(file, callee))?;
            if !factory.is_memo_wrap() {
                return None;
            }
            let inner = cx.resolver.arg_of(file, arg, 0)?;
            matches!(tree.kind(inner), NodeKind::Function(_)).then_some(inner)
        }
        _ => None,
    }
}

/// Names destructured from a Recoil callback's context parameter.
#[derive(Debug, Default)]
struct ContextBinding {
    /// Plain-identifier context parameter name.
    ctx_name: Option<String>,
    set_names: FxHashSet<String>,
    reset_names: FxHashSet<String>,
    /// Locals holding the snapshot object itself.
    snapshot_names: FxHashSet<String>,
    /// Locals holding a destructured snapshot read method, by method name.
    snapshot_methods: FxHashMap<String, String>,
}

impl ContextBinding {
    fn from_callback(tree: &SyntaxTree, func: NodeId) -> Self {
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
                    let Some(key) = prop.key.as_deref() else {
                        continue;
                    };
                    let Some(value) = tree.child_at(param, prop.value) else {
                        continue;
                    };
                    match (key, tree.kind(value)) {
                        ("set", NodeKind::DeclIdent { name }) => {
                            binding.set_names.insert(name.clone());
                        }
                        ("reset", NodeKind::DeclIdent { name }) => {
                            binding.reset_names.insert(name.clone());
                        }
                        ("snapshot", NodeKind::DeclIdent { name }) => {
                            binding.snapshot_names.insert(name.clone());
                        }
                        // `({ snapshot: { getPromise } })`
                        ("snapshot", NodeKind::ObjectPattern { props: inner }) => {
                            for method_prop in inner {
                                let Some(method) = method_prop.key.as_deref() else {
                                    continue;
                                };
                                if !SNAPSHOT_READ_METHODS.contains(&method) {
                                    continue;
                                }
                                if let Some(local) = tree.child_at(value, method_prop.value) {
                                    if let NodeKind::DeclIdent { name } = tree.kind(local) {
                                        binding
                                            .snapshot_methods
                                            .insert(name.clone(), method.to_string());
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        binding
    }
}

/// Extracts reads and writes from `useRecoilCallback` bodies.
pub struct RecoilCallbackExtractor;

impl Extractor for RecoilCallbackExtractor {
    fn name(&self) -> &'static str {
        "recoil-callbacks"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for (file, module) in cx.project.modules() {
            let tree = &module.tree;
            for call in tree.calls() {
                let is_factory = cx
                    .resolver
                    .callee_of(file, call)
                    .and_then(|callee| cx.resolver.factory_of(file, callee))
                    .map(|f| f.is_recoil_callback())
                    .unwrap_or(false);
                if !is_factory {
                    continue;
                }
                let Some(cb) = callback_fn(cx, file, call) else {
                    continue;
                };
                let binding = ContextBinding::from_callback(tree, cb);
                for inner in tree.calls_in(cb, true) {
                    self.extract_body_call(cx, file, tree, &binding, inner, &mut out);
                }
            }
        }

        out
    }
}

impl RecoilCallbackExtractor {
    fn extract_body_call(
        &self,
        cx: &PipelineContext,
        file: FileId,
        tree: &SyntaxTree,
        binding: &ContextBinding,
        call: NodeId,
        out: &mut Extraction,
    ) {
        if let Some((_, name)) = cx.callee_reference(file, call) {
            if let Some(method) = binding.snapshot_methods.get(&name) {
                self.emit_read(cx, file, tree, call, method, out);
            } else if binding.set_names.contains(&name) {
                self.emit_write(cx, file, tree, call, "set", out);
            } else if binding.reset_names.contains(&name) {
                self.emit_write(cx, file, tree, call, "reset", out);
            }
            return;
        }
        let Some((object, property)) = cx.callee_member(file, call) else {
            return;
        };
        match tree.kind(object) {
            // `snapshot.getPromise(...)` or `ctx.set(...)`
            NodeKind::Reference { name, .. } => {
                if binding.snapshot_names.contains(name)
                    && SNAPSHOT_READ_METHODS.contains(&property.as_str())
                {
                    self.emit_read(cx, file, tree, call, &property, out);
                } else if binding.ctx_name.as_deref() == Some(name.as_str())
                    && (property == "set" || property == "reset")
                {
                    self.emit_write(cx, file, tree, call, &property, out);
                }
            }
            // `ctx.snapshot.getLoadable(...)`
            NodeKind::Member {
                object: inner_span,
                property: inner_property,
            } => {
                if inner_property != "snapshot"
                    || !SNAPSHOT_READ_METHODS.contains(&property.as_str())
                {
                    return;
                }
                let Some(base) = tree.child_at(object, *inner_span) else {
                    return;
                };
                if let NodeKind::Reference { name, .. } = tree.kind(base) {
                    if binding.ctx_name.as_deref() == Some(name.as_str()) {
                        self.emit_read(cx, file, tree, call, &property, out);
                    }
                }
            }
            _ => {}
        }
    }

    fn emit_read(
        &self,
        cx: &PipelineContext,
        file: FileId,
        tree: &SyntaxTree,
        call: NodeId,
        method: &str,
        out: &mut Extraction,
    ) {
        let Some(state) = cx.state_of_arg(file, call, 0) else {
            return;
        };
        let (actor_kind, actor_name) = cx.actor_of(file, call);
        out.events.push(UsageEvent {
            kind: EventKind::Read,
            phase: Phase::Runtime,
            state_id: state,
            actor_kind,
            actor_name,
            actor_state_id: None,
            location: cx.location(file, tree.span(call).start),
            via: format!("callback:snapshot.{method}"),
        });
    }

    fn emit_write(
        &self,
        cx: &PipelineContext,
        file: FileId,
        tree: &SyntaxTree,
        call: NodeId,
        mutation: &str,
        out: &mut Extraction,
    ) {
        let Some(state) = cx.state_of_arg(file, call, 0) else {
            return;
        };
        let init = in_init_context(tree, call);
        let (actor_kind, actor_name) = cx.actor_of(file, call);
        out.events.push(UsageEvent {
            kind: if init {
                EventKind::InitWrite
            } else {
                EventKind::RuntimeWrite
            },
            phase: Phase::Runtime,
            state_id: state,
            actor_kind,
            actor_name,
            actor_state_id: None,
            location: cx.location(file, tree.span(call).start),
            via: if init {
                format!("init:callback:{mutation}")
            } else {
                format!("callback:{mutation}")
            },
        });
    }
}

/// Extracts reads and writes from `useAtomCallback` bodies.
///
/// The callback's first two parameters are the read and write functions;
/// they default to `get`/`set` when destructured away or unnamed. Writes on
/// this surface are always runtime writes.
pub struct JotaiCallbackExtractor;

impl Extractor for JotaiCallbackExtractor {
    fn name(&self) -> &'static str {
        "jotai-callbacks"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for (file, module) in cx.project.modules() {
            let tree = &module.tree;
            for call in tree.calls() {
                let is_factory = cx
                    .resolver
                    .callee_of(file, call)
                    .and_then(|callee| cx.resolver.factory_of(file, callee))
                    .map(|f| f.is_jotai_callback())
                    .unwrap_or(false);
                if !is_factory {
                    continue;
                }
                let Some(cb) = callback_fn(cx, file, call) else {
                    continue;
                };
                let get_name =
                    param_ident(tree, cb, 0).unwrap_or_else(|| "get".to_string());
                let set_name =
                    param_ident(tree, cb, 1).unwrap_or_else(|| "set".to_string());

                for inner in tree.calls_in(cb, true) {
                    let Some((_, name)) = cx.callee_reference(file, inner) else {
                        continue;
                    };
                    let (kind, via) = if name == get_name {
                        (EventKind::Read, "callback:get")
                    } else if name == set_name {
                        (EventKind::RuntimeWrite, "callback:set")
                    } else {
                        continue;
                    };
                    let Some(state) = cx.state_of_arg(file, inner, 0) else {
                        continue;
                    };
                    let (actor_kind, actor_name) = cx.actor_of(file, inner);
                    out.events.push(UsageEvent {
                        kind,
                        phase: Phase::Runtime,
                        state_id: state,
                        actor_kind,
                        actor_name,
                        actor_state_id: None,
                        location: cx.location(file, tree.span(inner).start),
                        via: via.to_string(),
                    });
                }
            }
        }

        out
    }
}

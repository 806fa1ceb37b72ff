//! Setter-site extraction: calls through bound setters, setter references in
//! JSX event attributes, and literal `set`/`reset` mutation calls.

use molt_graph::{EventKind, Phase, UsageEvent};

use crate::syntax::NodeKind;

use super::{in_init_context, Extraction, Extractor, PipelineContext};

/// Emits write events for every observable mutation site:
///
/// - a call whose callee is an identifier in the setter binding map;
/// - an identifier in the setter binding map appearing as the sole
///   expression of an `on*` JSX attribute (`onClick={setX}`);
/// - any call whose callee is literally `set` or `reset` and whose first
///   argument resolves to a known state - the context-style mutation shape
///   used by initialization functions.
///
/// Classification is init vs. runtime by the syntactic context of the site.
pub struct SetterEventExtractor;

impl Extractor for SetterEventExtractor {
    fn name(&self) -> &'static str {
        "setter-sites"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for (file, module) in cx.project.modules() {
            let tree = &module.tree;
            for node in tree.ids() {
                match tree.kind(node) {
                    NodeKind::Call { .. } => {
                        self.extract_setter_call(cx, file, node, &mut out);
                        self.extract_mutation_call(cx, file, node, &mut out);
                    }
                    NodeKind::JsxAttr {
                        name,
                        value: Some(value),
                    } => {
                        if !name.starts_with(crate::libs::EVENT_ATTR_PREFIX) {
                            continue;
                        }
                        let Some(value_node) = tree.child_at(node, *value) else {
                            continue;
                        };
                        let NodeKind::Reference { name: ref_name, .. } = tree.kind(value_node)
                        else {
                            continue;
                        };
                        let Some(state) =
                            cx.bindings.lookup(&cx.resolver, file, value_node, ref_name)
                        else {
                            continue;
                        };
                        let state = state.clone();
                        let init = in_init_context(tree, node);
                        let (actor_kind, actor_name) = cx.actor_of(file, node);
                        out.events.push(UsageEvent {
                            kind: write_kind(init),
                            phase: Phase::Runtime,
                            state_id: state,
                            actor_kind,
                            actor_name,
                            actor_state_id: None,
                            location: cx.location(file, tree.span(value_node).start),
                            via: if init {
                                "init:setter-reference".to_string()
                            } else {
                                "setter-reference".to_string()
                            },
                        });
                    }
                    _ => {}
                }
            }
        }

        out
    }
}

impl SetterEventExtractor {
    /// `setX(v)` where `setX` is a bound setter.
    fn extract_setter_call(
        &self,
        cx: &PipelineContext,
        file: usize,
        call: crate::syntax::NodeId,
        out: &mut Extraction,
    ) {
        let Some((callee, name)) = cx.callee_reference(file, call) else {
            return;
        };
        let Some(state) = cx.bindings.lookup(&cx.resolver, file, callee, &name) else {
            return;
        };
        let state = state.clone();
        let tree = &cx.project.module(file).tree;
        let init = in_init_context(tree, call);
        let (actor_kind, actor_name) = cx.actor_of(file, call);
        out.events.push(UsageEvent {
            kind: write_kind(init),
            phase: Phase::Runtime,
            state_id: state,
            actor_kind,
            actor_name,
            actor_state_id: None,
            location: cx.location(file, tree.span(call).start),
            via: if init {
                "init:setter-call".to_string()
            } else {
                "setter-call".to_string()
            },
        });
    }

    /// `set(state, v)` / `reset(state)` with a literal callee name, the shape
    /// context-destructured mutators take inside initialization functions.
    /// Recognition is name-based on purpose; the first argument must resolve
    /// to a known state.
    fn extract_mutation_call(
        &self,
        cx: &PipelineContext,
        file: usize,
        call: crate::syntax::NodeId,
        out: &mut Extraction,
    ) {
        let mutation = match cx.callee_reference(file, call) {
            Some((_, name)) if name == "set" || name == "reset" => name,
            _ => match cx.callee_member(file, call) {
                Some((object, property)) if property == "set" || property == "reset" => {
                    // `handle.set(...)` belongs to the imperative-handle
                    // extractor.
                    let tree = &cx.project.module(file).tree;
                    if let NodeKind::Reference { name, .. } = tree.kind(object) {
                        if cx.handles.contains(&cx.resolver, file, object, name) {
                            return;
                        }
                    }
                    property
                }
                _ => return,
            },
        };
        let Some(state) = cx.state_of_arg(file, call, 0) else {
            return;
        };
        let tree = &cx.project.module(file).tree;
        let init = in_init_context(tree, call);
        let via = match (mutation.as_str(), init) {
            ("set", false) => "set-call",
            ("set", true) => "init:set",
            (_, false) => "reset-call",
            (_, true) => "init:reset",
        };
        let (actor_kind, actor_name) = cx.actor_of(file, call);
        out.events.push(UsageEvent {
            kind: write_kind(init),
            phase: Phase::Runtime,
            state_id: state,
            actor_kind,
            actor_name,
            actor_state_id: None,
            location: cx.location(file, tree.span(call).start),
            via: via.to_string(),
        });
    }
}

fn write_kind(init: bool) -> EventKind {
    if init {
        EventKind::InitWrite
    } else {
        EventKind::RuntimeWrite
    }
}

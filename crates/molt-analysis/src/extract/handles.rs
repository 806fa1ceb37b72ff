//! Imperative store-handle writes: `store.set(someAtom, value)`.
//!
//! Handle *reads* are not extracted here: outside selector bodies they are
//! not state usage the audit tracks, and inside selector bodies the
//! dependency extractor emits them as dependency reads.

use molt_graph::{EventKind, Phase, UsageEvent};

use crate::syntax::NodeKind;

use super::{in_init_context, Extraction, Extractor, PipelineContext};

pub struct HandleWriteExtractor;

impl Extractor for HandleWriteExtractor {
    fn name(&self) -> &'static str {
        "handle-writes"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for (file, module) in cx.project.modules() {
            let tree = &module.tree;
            for call in tree.calls() {
                let Some((object, property)) = cx.callee_member(file, call) else {
                    continue;
                };
                if property != "set" {
                    continue;
                }
                let NodeKind::Reference { name, .. } = tree.kind(object) else {
                    continue;
                };
                if !cx.handles.contains(&cx.resolver, file, object, name) {
                    continue;
                }
                let Some(state) = cx.state_of_arg(file, call, 0) else {
                    continue;
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
                        "init:jotai:store.set".to_string()
                    } else {
                        "jotai:store.set".to_string()
                    },
                });
            }
        }

        out
    }
}

//! Direct read-hook extraction: `useRecoilValue(state)` and friends.

use molt_graph::{EventKind, Phase, UsageEvent};

use super::{Extraction, Extractor, PipelineContext};

/// Emits a runtime read for every call to a known read hook whose first
/// argument resolves to a known state. Unresolvable arguments are skipped
/// silently - partial and generic code is a normal input.
pub struct DirectHookExtractor;

impl Extractor for DirectHookExtractor {
    fn name(&self) -> &'static str {
        "direct-hooks"
    }

    fn run(&self, cx: &PipelineContext) -> Extraction {
        let mut out = Extraction::default();

        for (file, module) in cx.project.modules() {
            let tree = &module.tree;
            for call in tree.calls() {
                let Some(callee) = cx.resolver.callee_of(file, call) else {
                    continue;
                };
                let Some(factory) = cx.resolver.factory_of(file, callee) else {
                    continue;
                };
                let Some(via) = factory.read_hook_via() else {
                    continue;
                };
                let Some(state) = cx.state_of_arg(file, call, 0) else {
                    continue;
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
                    via: via.to_string(),
                });
            }
        }

        out
    }
}

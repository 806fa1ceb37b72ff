//! Setter binding resolution.
//!
//! Direct mode recognizes variable declarations initialized by the known
//! setter and tuple hook factories. Wrapper-aware mode additionally resolves
//! custom hooks that return setters of other hooks - recursively, with
//! memoization and a cycle guard - including hooks that compose inner tuples
//! into a returned object.

use rustc_hash::{FxHashMap, FxHashSet};

use molt_graph::StateId;
use tracing::trace;

use crate::index::SymbolIndex;
use crate::project::{FileId, Project};
use crate::resolve::SymbolResolver;
use crate::syntax::{NodeId, NodeKind};

use super::SetterBindings;

/// What a call expression yields, from a binding point of view.
#[derive(Debug, Clone)]
pub(crate) enum CallBinding {
    /// A single setter of the state.
    Setter(StateId),
    /// A `[value, setter]` tuple of the state.
    Tuple(StateId),
    /// An object whose listed properties are setters.
    Object(FxHashMap<String, StateId>),
}

/// Resolve setter bindings across the whole project.
///
/// With `wrappers` off, only direct factory calls bind. With it on, calls to
/// resolvable non-factory functions are analyzed as wrapper hooks.
pub fn resolve_setter_bindings(
    project: &Project,
    resolver: &SymbolResolver,
    index: &SymbolIndex,
    wrappers: bool,
) -> SetterBindings {
    let mut setter_resolver = SetterResolver {
        project,
        resolver,
        index,
        wrappers,
        cache: FxHashMap::default(),
        in_flight: FxHashSet::default(),
    };

    let mut bindings = SetterBindings::default();
    for (file, module) in project.modules() {
        let tree = &module.tree;
        for node in tree.ids() {
            let NodeKind::VarDecl {
                pattern,
                init: Some(init),
                ..
            } = tree.kind(node)
            else {
                continue;
            };
            let Some(call) = tree.child_at(node, *init) else {
                continue;
            };
            if !matches!(tree.kind(call), NodeKind::Call { .. }) {
                continue;
            }
            let Some(binding) = setter_resolver.classify_call(file, call) else {
                continue;
            };
            let Some(pattern_node) = tree.child_at(node, *pattern) else {
                continue;
            };
            setter_resolver.bind_pattern(&mut bindings, file, pattern_node, &binding);
        }
    }
    trace!(bindings = bindings.len(), wrappers, "setter bindings resolved");
    bindings
}

/// Wrapper-hook analysis state for one pipeline run.
pub struct SetterResolver<'a> {
    project: &'a Project,
    resolver: &'a SymbolResolver<'a>,
    index: &'a SymbolIndex,
    wrappers: bool,
    /// Memoized wrapper results, negatives included.
    cache: FxHashMap<(FileId, u32), Option<CallBinding>>,
    /// Functions currently being analyzed; re-entry is a cycle and yields no
    /// binding for that path.
    in_flight: FxHashSet<(FileId, u32)>,
}

impl<'a> SetterResolver<'a> {
    /// Classify a call expression as a setter-producing call, directly or
    /// through wrapper hooks.
    pub(crate) fn classify_call(&mut self, file: FileId, call: NodeId) -> Option<CallBinding> {
        let callee = self.resolver.callee_of(file, call)?;
        if let Some(factory) = self.resolver.factory_of(file, callee) {
            if factory.is_setter_factory() || factory.is_tuple_factory() {
                let arg = self.resolver.arg_of(file, call, 0)?;
                let state = self.index.state_of_expr(self.resolver, file, arg)?.clone();
                return Some(if factory.is_setter_factory() {
                    CallBinding::Setter(state)
                } else {
                    CallBinding::Tuple(state)
                });
            }
            if factory.is_known() {
                return None;
            }
        }
        if !self.wrappers {
            return None;
        }
        let targets = self.resolver.functions_of(file, callee);
        targets
            .into_iter()
            .find_map(|(fn_file, fn_node)| self.analyze_wrapper(fn_file, fn_node))
    }

    /// Analyze a candidate wrapper hook body.
    fn analyze_wrapper(&mut self, file: FileId, func: NodeId) -> Option<CallBinding> {
        let tree = &self.project.module(file).tree;
        let key = (file, tree.span(func).start);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        if !self.in_flight.insert(key) {
            // Cyclic wrapper reference: under-approximate, never loop.
            return None;
        }

        let result = self.analyze_wrapper_body(file, func);

        self.in_flight.remove(&key);
        self.cache.insert(key, result.clone());
        result
    }

    fn analyze_wrapper_body(&mut self, file: FileId, func: NodeId) -> Option<CallBinding> {
        let tree = &self.project.module(file).tree;

        // Local bindings established inside the wrapper.
        let mut value_bindings: FxHashMap<String, CallBinding> = FxHashMap::default();
        let mut setter_names: FxHashMap<String, StateId> = FxHashMap::default();

        for decl in tree.var_decls_in(func) {
            let NodeKind::VarDecl {
                pattern,
                init: Some(init),
                ..
            } = tree.kind(decl)
            else {
                continue;
            };
            let Some(call) = tree.child_at(decl, *init) else {
                continue;
            };
            if !matches!(tree.kind(call), NodeKind::Call { .. }) {
                continue;
            }
            let Some(binding) = self.classify_call(file, call) else {
                continue;
            };
            let tree = &self.project.module(file).tree;
            let Some(pattern_node) = tree.child_at(decl, *pattern) else {
                continue;
            };
            self.register_local(
                tree,
                pattern_node,
                &binding,
                &mut value_bindings,
                &mut setter_names,
            );
        }

        // Return expressions, in source order; first resolvable one wins.
        let tree = &self.project.module(file).tree;
        for ret in tree.returns_of(func) {
            match tree.kind(ret) {
                NodeKind::Call { .. } => {
                    if let Some(binding) = self.classify_call(file, ret) {
                        return Some(binding);
                    }
                }
                NodeKind::Reference { name, .. } => {
                    if let Some(binding) = value_bindings.get(name) {
                        return Some(binding.clone());
                    }
                }
                NodeKind::ObjectLit { props } => {
                    let tree = &self.project.module(file).tree;
                    let mut object = FxHashMap::default();
                    for prop in props {
                        let Some(key) = &prop.key else { continue };
                        let Some(value) = tree.child_at(ret, prop.value) else {
                            continue;
                        };
                        // Only bare identifiers (shorthand included) naming a
                        // known local setter are carried.
                        let NodeKind::Reference { name, .. } = tree.kind(value) else {
                            continue;
                        };
                        if let Some(state) = setter_names.get(name) {
                            object.insert(key.clone(), state.clone());
                        }
                    }
                    return Some(CallBinding::Object(object));
                }
                _ => {}
            }
        }
        None
    }

    /// Record what a wrapper-internal declaration binds locally.
    fn register_local(
        &self,
        tree: &crate::syntax::SyntaxTree,
        pattern: NodeId,
        binding: &CallBinding,
        value_bindings: &mut FxHashMap<String, CallBinding>,
        setter_names: &mut FxHashMap<String, StateId>,
    ) {
        match (tree.kind(pattern), binding) {
            (NodeKind::DeclIdent { name }, _) => {
                value_bindings.insert(name.clone(), binding.clone());
                if let CallBinding::Setter(state) = binding {
                    setter_names.insert(name.clone(), state.clone());
                }
            }
            (NodeKind::ArrayPattern { elements }, CallBinding::Tuple(state)) => {
                if let Some(Some(span)) = elements.get(1) {
                    if let Some(elem) = tree.child_at(pattern, *span) {
                        if let NodeKind::DeclIdent { name } = tree.kind(elem) {
                            setter_names.insert(name.clone(), state.clone());
                            value_bindings.insert(name.clone(), CallBinding::Setter(state.clone()));
                        }
                    }
                }
            }
            (NodeKind::ObjectPattern { props }, CallBinding::Object(map)) => {
                for prop in props {
                    let Some(key) = &prop.key else { continue };
                    let Some(state) = map.get(key) else { continue };
                    if let Some(value) = tree.child_at(pattern, prop.value) {
                        if let NodeKind::DeclIdent { name } = tree.kind(value) {
                            setter_names.insert(name.clone(), state.clone());
                            value_bindings.insert(name.clone(), CallBinding::Setter(state.clone()));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Bind a consuming declaration's pattern against a call binding.
    pub(crate) fn bind_pattern(
        &self,
        bindings: &mut SetterBindings,
        file: FileId,
        pattern: NodeId,
        binding: &CallBinding,
    ) {
        let tree = &self.project.module(file).tree;
        match (tree.kind(pattern), binding) {
            (NodeKind::DeclIdent { .. }, CallBinding::Setter(state)) => {
                bindings.bind_decl(self.resolver, file, pattern, state);
            }
            (NodeKind::ArrayPattern { elements }, CallBinding::Tuple(state)) => {
                if let Some(Some(span)) = elements.get(1) {
                    if let Some(elem) = tree.child_at(pattern, *span) {
                        for decl in tree.pattern_decls(elem) {
                            bindings.bind_decl(self.resolver, file, decl, state);
                        }
                    }
                }
            }
            (NodeKind::ObjectPattern { props }, CallBinding::Object(map)) => {
                for prop in props {
                    let Some(key) = &prop.key else { continue };
                    let Some(state) = map.get(key) else { continue };
                    if let Some(value) = tree.child_at(pattern, prop.value) {
                        for decl in tree.pattern_decls(value) {
                            bindings.bind_decl(self.resolver, file, decl, state);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

//! The symbol index: one pass over the project collecting every state
//! symbol, plus the lookups downstream components resolve against.

use rustc_hash::FxHashMap;

use molt_graph::{state_id, Location, StateId, StateKind, StateSymbol, Store};

use crate::libs::Lib;
use crate::project::{FileId, Project};
use crate::resolve::SymbolResolver;
use crate::syntax::{NodeId, NodeKind};

/// All state symbols of a project and their declaration-site lookups.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// Sorted by (file, line, name).
    pub states: Vec<StateSymbol>,
    by_id: FxHashMap<StateId, usize>,
    /// Declaration site (file, identifier offset) -> state id. Answers
    /// "is this identifier a state symbol?" after reference resolution.
    by_decl: FxHashMap<(FileId, u32), StateId>,
    /// The factory call expression that created each state.
    init_call: FxHashMap<StateId, (FileId, NodeId)>,
    /// The declaring identifier of each state.
    decl_ident: FxHashMap<StateId, (FileId, NodeId)>,
}

impl SymbolIndex {
    /// Scan the project for state symbols.
    pub fn build(project: &Project, resolver: &SymbolResolver) -> Self {
        let mut index = Self::default();

        for (file, module) in project.modules() {
            let tree = &module.tree;
            for node in tree.ids() {
                let NodeKind::VarDecl {
                    pattern,
                    init: Some(init),
                    exported,
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
                let Some(callee) = resolver.callee_of(file, call) else {
                    continue;
                };
                let Some(factory) = resolver.factory_of(file, callee) else {
                    continue;
                };
                let Some((store, mut kind)) = factory.state_factory() else {
                    continue;
                };
                // Jotai's `atom` is a derived atom exactly when its first
                // argument is function-like.
                if store == Store::Jotai && kind == StateKind::Atom {
                    let derived = resolver
                        .arg_of(file, call, 0)
                        .map(|arg| !resolver.functions_of(file, arg).is_empty())
                        .unwrap_or(false);
                    if derived {
                        kind = StateKind::DerivedAtom;
                    }
                }

                // Only simple `const name = factory(...)` declarations name
                // a state.
                let Some(ident) = tree.child_at(node, *pattern) else {
                    continue;
                };
                let Some(name) = tree.decl_name(ident) else {
                    continue;
                };

                let offset = tree.span(ident).start;
                let (line, column) = module.line_column(offset);
                let id = state_id(&module.path, name);
                let exported = *exported || module.exports.exports_local(name);

                index.by_decl.insert((file, offset), id.clone());
                index.init_call.insert(id.clone(), (file, call));
                index.decl_ident.insert(id.clone(), (file, ident));
                index.states.push(StateSymbol {
                    id,
                    name: name.to_string(),
                    store,
                    kind,
                    location: Location::new(&module.path, line, column),
                    exported,
                    is_plain_recoil_atom: false,
                });
            }
        }

        // Second pass: plain-atom classification needs the full declaration
        // map, since a default can reference a selector in another file.
        let plain: Vec<bool> = index
            .states
            .iter()
            .map(|s| index.is_plain_recoil_atom(project, resolver, s))
            .collect();
        for (state, plain) in index.states.iter_mut().zip(plain) {
            state.is_plain_recoil_atom = plain;
        }

        index.states.sort_by(|a, b| a.index_key().cmp(&b.index_key()));
        index.by_id = index
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        index
    }

    fn is_plain_recoil_atom(
        &self,
        project: &Project,
        resolver: &SymbolResolver,
        state: &StateSymbol,
    ) -> bool {
        if state.store != Store::Recoil || state.kind != StateKind::Atom {
            return false;
        }
        let Some(&(file, call)) = self.init_call.get(&state.id) else {
            return false;
        };
        let tree = &project.module(file).tree;
        let Some(options) = resolver.arg_of(file, call, 0) else {
            return true;
        };
        let NodeKind::ObjectLit { props } = tree.kind(options) else {
            return true;
        };
        let Some(default) = props
            .iter()
            .find(|p| p.key.as_deref() == Some("default"))
        else {
            return true;
        };
        let Some(value) = tree.child_at(options, default.value) else {
            return true;
        };
        match tree.kind(value) {
            NodeKind::Call { .. } => {
                let selector_call = resolver
                    .callee_of(file, value)
                    .and_then(|callee| resolver.factory_of(file, callee))
                    .map(|f| f.is(Lib::Recoil, "selector") || f.is(Lib::Recoil, "selectorFamily"))
                    .unwrap_or(false);
                !selector_call
            }
            NodeKind::Reference { .. } => {
                let selector_ref = self
                    .state_of_expr(resolver, file, value)
                    .and_then(|id| self.state(id))
                    .map(|s| {
                        s.store == Store::Recoil
                            && matches!(s.kind, StateKind::Selector | StateKind::SelectorFamily)
                    })
                    .unwrap_or(false);
                !selector_ref
            }
            _ => true,
        }
    }

    /// Look up a state by id.
    pub fn state(&self, id: &str) -> Option<&StateSymbol> {
        self.by_id.get(id).map(|&i| &self.states[i])
    }

    /// State declared at a (file, identifier offset) site.
    pub fn state_at_decl(&self, file: FileId, offset: u32) -> Option<&StateId> {
        self.by_decl.get(&(file, offset))
    }

    /// The factory call that created a state.
    pub fn init_call(&self, id: &str) -> Option<(FileId, NodeId)> {
        self.init_call.get(id).copied()
    }

    /// The declaring identifier of a state.
    pub fn declaration(&self, id: &str) -> Option<(FileId, NodeId)> {
        self.decl_ident.get(id).copied()
    }

    /// Resolve an expression to a known state: a bare reference to a state
    /// symbol, or a call to a family (a family instance counts as the family
    /// itself).
    pub fn state_of_expr(
        &self,
        resolver: &SymbolResolver,
        file: FileId,
        node: NodeId,
    ) -> Option<&StateId> {
        let project_node = resolver.resolve_reference(file, node);
        if let Some((decl_file, decl)) = project_node {
            let offset = resolver.key_of_decl(decl_file, decl)?.offset;
            return self.state_at_decl(decl_file, offset);
        }
        // Family instance: `useRecoilValue(rowState(3))`.
        let callee = resolver.callee_of(file, node)?;
        let (decl_file, decl) = resolver.resolve_reference(file, callee)?;
        let offset = resolver.key_of_decl(decl_file, decl)?.offset;
        self.state_at_decl(decl_file, offset)
    }
}

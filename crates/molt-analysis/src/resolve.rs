//! Cross-file symbol resolution.
//!
//! Per-file reference resolution happens during lowering (oxc semantic
//! pass); this module stitches files together: following import bindings to
//! their declaring module, unwrapping aliased re-exports to the ultimate
//! declaration, resolving expressions to function-like declaration bodies,
//! and computing canonical symbol keys.
//!
//! Everything here fails soft: an unresolvable symbol is `None`, a function
//! resolution that goes nowhere is an empty list. Callers fall back to
//! name-based keys.

use rustc_hash::FxHashSet;

use crate::libs::{lib_of_module, FactoryRef};
use crate::project::{ExportTarget, FileId, ImportEntry, Project};
use crate::syntax::{NodeId, NodeKind};

/// Canonical symbol key: declaration file + declaration start + symbol name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolKey {
    pub file: FileId,
    pub offset: u32,
    pub name: String,
}

/// Stateless resolver over a project.
#[derive(Clone, Copy)]
pub struct SymbolResolver<'a> {
    project: &'a Project,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// Resolve a `Reference` node to its declaring `DeclIdent`, following
    /// imports and re-exports across files.
    pub fn resolve_reference(&self, file: FileId, node: NodeId) -> Option<(FileId, NodeId)> {
        let module = self.project.module(file);
        let NodeKind::Reference { name, target } = module.tree.kind(node) else {
            return None;
        };
        match target {
            Some(t) if !t.is_import => {
                let decl = module.tree.decl_at_offset(t.decl_offset)?;
                Some((file, decl))
            }
            Some(_) => {
                let mut visited = FxHashSet::default();
                self.follow_import(file, name, &mut visited)
            }
            None => None,
        }
    }

    /// Canonical symbol key for a reference, if it resolves.
    pub fn symbol_key(&self, file: FileId, node: NodeId) -> Option<SymbolKey> {
        let (decl_file, decl) = self.resolve_reference(file, node)?;
        let tree = &self.project.module(decl_file).tree;
        Some(SymbolKey {
            file: decl_file,
            offset: tree.span(decl).start,
            name: tree.decl_name(decl)?.to_string(),
        })
    }

    /// Symbol key of a declaring identifier itself.
    pub fn key_of_decl(&self, file: FileId, decl: NodeId) -> Option<SymbolKey> {
        let tree = &self.project.module(file).tree;
        Some(SymbolKey {
            file,
            offset: tree.span(decl).start,
            name: tree.decl_name(decl)?.to_string(),
        })
    }

    fn follow_import(
        &self,
        file: FileId,
        local: &str,
        visited: &mut FxHashSet<(FileId, String)>,
    ) -> Option<(FileId, NodeId)> {
        let entry = self.project.module(file).imports.get(local)?;
        match entry {
            ImportEntry::Named { module, imported } => {
                let target = self.project.resolve_specifier(file, module)?;
                self.resolve_export(target, imported, visited)
            }
            // Namespace members are resolved at the use site, not here.
            ImportEntry::Namespace { .. } => None,
        }
    }

    fn resolve_export(
        &self,
        file: FileId,
        exported: &str,
        visited: &mut FxHashSet<(FileId, String)>,
    ) -> Option<(FileId, NodeId)> {
        if !visited.insert((file, exported.to_string())) {
            return None;
        }
        let module = self.project.module(file);
        match module.exports.get(exported) {
            Some(ExportTarget::Local { local }) => {
                if module.imports.get(local).is_some() {
                    // `import { x } from "..."; export { x };`
                    return self.follow_import(file, local, visited);
                }
                let offset = *module.module_scope_decls.get(local)?;
                let decl = module.tree.decl_at_offset(offset)?;
                Some((file, decl))
            }
            Some(ExportTarget::ReExport { module, imported }) => {
                let target = self.project.resolve_specifier(file, module)?;
                self.resolve_export(target, imported, visited)
            }
            None => module
                .exports
                .stars()
                .iter()
                .filter_map(|star| self.project.resolve_specifier(file, star))
                .find_map(|target| self.resolve_export(target, exported, visited)),
        }
    }

    /// Resolve an expression node to the function-like declaration bodies it
    /// refers to: the function itself, or the declarations of the named
    /// function it references (through aliases and imports).
    pub fn functions_of(&self, file: FileId, node: NodeId) -> Vec<(FileId, NodeId)> {
        let tree = &self.project.module(file).tree;
        match tree.kind(node) {
            NodeKind::Function(_) => vec![(file, node)],
            NodeKind::Reference { .. } => {
                let Some((decl_file, decl)) = self.resolve_reference(file, node) else {
                    return Vec::new();
                };
                let mut visited = FxHashSet::default();
                self.decl_functions(decl_file, decl, &mut visited)
            }
            _ => Vec::new(),
        }
    }

    /// Function-like declarations behind a declaring identifier.
    pub fn functions_of_decl(&self, file: FileId, decl: NodeId) -> Vec<(FileId, NodeId)> {
        let mut visited = FxHashSet::default();
        self.decl_functions(file, decl, &mut visited)
    }

    /// Function-like declarations behind an imported local name.
    pub fn functions_of_import(&self, file: FileId, local: &str) -> Vec<(FileId, NodeId)> {
        let mut visited = FxHashSet::default();
        match self.follow_import(file, local, &mut visited) {
            Some((decl_file, decl)) => self.functions_of_decl(decl_file, decl),
            None => Vec::new(),
        }
    }

    fn decl_functions(
        &self,
        file: FileId,
        decl: NodeId,
        visited: &mut FxHashSet<(FileId, NodeId)>,
    ) -> Vec<(FileId, NodeId)> {
        if !visited.insert((file, decl)) {
            return Vec::new();
        }
        let tree = &self.project.module(file).tree;
        let Some(parent) = tree.parent(decl) else {
            return Vec::new();
        };
        match tree.kind(parent) {
            // Function declaration: the DeclIdent is the function's own name.
            NodeKind::Function(_) => vec![(file, parent)],
            NodeKind::VarDecl {
                init: Some(init), ..
            } => {
                let Some(value) = tree.child_at(parent, *init) else {
                    return Vec::new();
                };
                match tree.kind(value) {
                    NodeKind::Function(_) => vec![(file, value)],
                    NodeKind::Reference { .. } => {
                        let Some((alias_file, alias_decl)) = self.resolve_reference(file, value)
                        else {
                            return Vec::new();
                        };
                        self.decl_functions(alias_file, alias_decl, visited)
                    }
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    /// Identify a call's callee as a library factory or hook, following
    /// import aliasing and namespace imports.
    pub fn factory_of(&self, file: FileId, callee: NodeId) -> Option<FactoryRef> {
        let module = self.project.module(file);
        let tree = &module.tree;
        match tree.kind(callee) {
            NodeKind::Reference { name, .. } => match module.imports.get(name)? {
                ImportEntry::Named {
                    module: spec,
                    imported,
                } => Some(FactoryRef {
                    lib: lib_of_module(spec)?,
                    name: imported.clone(),
                }),
                ImportEntry::Namespace { .. } => None,
            },
            NodeKind::Member { object, property } => {
                let obj = tree.child_at(callee, *object)?;
                let NodeKind::Reference { name, .. } = tree.kind(obj) else {
                    return None;
                };
                let ImportEntry::Namespace { module: spec } = module.imports.get(name)? else {
                    return None;
                };
                Some(FactoryRef {
                    lib: lib_of_module(spec)?,
                    name: property.clone(),
                })
            }
            _ => None,
        }
    }

    /// The callee of a call node, when it was materialized.
    pub fn callee_of(&self, file: FileId, call: NodeId) -> Option<NodeId> {
        let tree = &self.project.module(file).tree;
        let NodeKind::Call { callee, .. } = tree.kind(call) else {
            return None;
        };
        tree.child_at(call, *callee)
    }

    /// Positional argument `i` of a call node.
    pub fn arg_of(&self, file: FileId, call: NodeId, i: usize) -> Option<NodeId> {
        let tree = &self.project.module(file).tree;
        let NodeKind::Call { args, .. } = tree.kind(call) else {
            return None;
        };
        tree.child_at(call, *args.get(i)?)
    }
}

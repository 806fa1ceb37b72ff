//! One-hop forwarding of setter bindings.
//!
//! Extends the base bindings by exactly one call step: a bound identifier
//! passed as a function argument binds the corresponding parameter of the
//! resolved targets; a bound identifier passed as a JSX prop binds the
//! matching destructured prop of the resolved component. Forwarding sources
//! are only base bindings, never already-forwarded ones - a deliberate wall
//! against silent multi-hop expansion.

use tracing::trace;

use crate::project::{FileId, Project};
use crate::resolve::SymbolResolver;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::SetterBindings;

/// Compute the forwarded bindings reachable in one hop from `base`.
pub fn forward_bindings(
    project: &Project,
    resolver: &SymbolResolver,
    base: &SetterBindings,
) -> SetterBindings {
    let mut forwarded = SetterBindings::default();

    for (file, module) in project.modules() {
        let tree = &module.tree;
        for node in tree.ids() {
            match tree.kind(node) {
                NodeKind::Call { args, .. } => {
                    forward_call(project, resolver, base, &mut forwarded, file, node, args);
                }
                NodeKind::JsxAttr {
                    name,
                    value: Some(value),
                } => {
                    forward_jsx_prop(
                        project, resolver, base, &mut forwarded, file, tree, node, name, *value,
                    );
                }
                _ => {}
            }
        }
    }

    trace!(bindings = forwarded.len(), "one-hop forwarding complete");
    forwarded
}

/// Function-argument forwarding: `render(setCount)` binds `render`'s first
/// parameter wherever `render` resolves.
fn forward_call(
    project: &Project,
    resolver: &SymbolResolver,
    base: &SetterBindings,
    forwarded: &mut SetterBindings,
    file: FileId,
    call: NodeId,
    args: &[molt::oxc::Span],
) {
    let tree = &project.module(file).tree;
    for (position, arg_span) in args.iter().enumerate() {
        let Some(arg) = tree.child_at(call, *arg_span) else {
            continue;
        };
        let NodeKind::Reference { name, .. } = tree.kind(arg) else {
            continue;
        };
        let Some(state) = base.lookup(resolver, file, arg, name) else {
            continue;
        };
        let state = state.clone();

        let Some(callee) = resolver.callee_of(file, call) else {
            continue;
        };
        for (target_file, target_fn) in resolver.functions_of(file, callee) {
            let target_tree = &project.module(target_file).tree;
            let NodeKind::Function(f) = target_tree.kind(target_fn) else {
                continue;
            };
            let Some(param_span) = f.params.get(position) else {
                continue;
            };
            let Some(param) = target_tree.child_at(target_fn, *param_span) else {
                continue;
            };
            for decl in target_tree.pattern_decls(param) {
                forwarded.bind_decl(resolver, target_file, decl, &state);
            }
        }
    }
}

/// JSX prop forwarding: `<Switch onChecked={setEnabled} />` binds the
/// `onChecked` prop inside `Switch`.
#[allow(clippy::too_many_arguments)]
fn forward_jsx_prop(
    project: &Project,
    resolver: &SymbolResolver,
    base: &SetterBindings,
    forwarded: &mut SetterBindings,
    file: FileId,
    tree: &SyntaxTree,
    attr: NodeId,
    attr_name: &str,
    value: molt::oxc::Span,
) {
    let Some(value_node) = tree.child_at(attr, value) else {
        return;
    };
    let NodeKind::Reference { name, .. } = tree.kind(value_node) else {
        return;
    };
    let Some(state) = base.lookup(resolver, file, value_node, name) else {
        return;
    };
    let state = state.clone();

    // The enclosing element's tag names the component.
    let Some(element) = tree
        .ancestors(attr)
        .find(|a| matches!(tree.kind(*a), NodeKind::JsxElement { .. }))
    else {
        return;
    };
    let NodeKind::JsxElement { tag: Some(tag) } = tree.kind(element) else {
        return;
    };
    let Some(target) = tag.target else { return };

    // Resolve the tag like a reference to a function-like declaration.
    let targets = if target.is_import {
        resolver.functions_of_import(file, &tag.name)
    } else {
        let module_tree = &project.module(file).tree;
        match module_tree.decl_at_offset(target.decl_offset) {
            Some(decl) => resolver.functions_of_decl(file, decl),
            None => Vec::new(),
        }
    };

    for (target_file, target_fn) in targets {
        let target_tree = &project.module(target_file).tree;
        let NodeKind::Function(f) = target_tree.kind(target_fn) else {
            continue;
        };
        let Some(props_span) = f.params.first() else {
            continue;
        };
        let Some(props) = target_tree.child_at(target_fn, *props_span) else {
            continue;
        };
        match target_tree.kind(props) {
            // `function Switch({ onChecked }) { ... }`
            NodeKind::ObjectPattern { props: pattern_props } => {
                for prop in pattern_props {
                    if prop.key.as_deref() != Some(attr_name) {
                        continue;
                    }
                    if let Some(value) = target_tree.child_at(props, prop.value) {
                        for decl in target_tree.pattern_decls(value) {
                            forwarded.bind_decl(resolver, target_file, decl, &state);
                        }
                    }
                }
            }
            // `function Switch(props) { const { onChecked } = props; ... }`
            NodeKind::DeclIdent { name: props_name } => {
                bind_props_destructuring(
                    resolver, forwarded, target_file, target_tree, target_fn, props_name,
                    attr_name, &state,
                );
            }
            _ => {}
        }
    }
}

/// Bind destructurings of an identifier props parameter inside the target's
/// own scope.
#[allow(clippy::too_many_arguments)]
fn bind_props_destructuring(
    resolver: &SymbolResolver,
    forwarded: &mut SetterBindings,
    file: FileId,
    tree: &SyntaxTree,
    func: NodeId,
    props_name: &str,
    attr_name: &str,
    state: &molt_graph::StateId,
) {
    for decl in tree.var_decls_in(func) {
        let NodeKind::VarDecl {
            pattern,
            init: Some(init),
            ..
        } = tree.kind(decl)
        else {
            continue;
        };
        let Some(init_node) = tree.child_at(decl, *init) else {
            continue;
        };
        let NodeKind::Reference { name, .. } = tree.kind(init_node) else {
            continue;
        };
        if name != props_name {
            continue;
        }
        let Some(pattern_node) = tree.child_at(decl, *pattern) else {
            continue;
        };
        let NodeKind::ObjectPattern { props } = tree.kind(pattern_node) else {
            continue;
        };
        for prop in props {
            if prop.key.as_deref() != Some(attr_name) {
                continue;
            }
            if let Some(value) = tree.child_at(pattern_node, prop.value) {
                for bound in tree.pattern_decls(value) {
                    forwarded.bind_decl(resolver, file, bound, state);
                }
            }
        }
    }
}

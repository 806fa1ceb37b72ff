//! Lowering from the oxc AST to the owned syntax tree.
//!
//! Parsing is done inline here to keep the arena allocator's lifetime inside
//! one function. The visitor keeps a parent stack; every materialized node is
//! appended under the top of the stack, so constructs we do not model simply
//! contribute their interesting descendants to the nearest modeled ancestor.

use molt::oxc::{
    ast, walk, Allocator, GetSpan, Parser, ScopeFlags, Scoping, SemanticBuilder, SourceType, Span,
    SymbolFlags, Visit,
};

use crate::project::{ExportTable, ExportTarget, ImportEntry, ImportMap};

use super::tree::{
    FunctionNode, LitProp, LocalTarget, NodeId, NodeKind, PatternProp, SyntaxTree, TagName,
};
use rustc_hash::FxHashMap;

/// Everything lowering extracts from one file.
pub struct Lowered {
    pub tree: SyntaxTree,
    pub imports: ImportMap,
    pub exports: ExportTable,
    /// Module-scope declaration names and their identifier offsets, used to
    /// resolve incoming imports and re-exports.
    pub module_scope_decls: FxHashMap<String, u32>,
}

impl Lowered {
    fn empty() -> Self {
        Self {
            tree: SyntaxTree::new(),
            imports: ImportMap::default(),
            exports: ExportTable::default(),
            module_scope_decls: FxHashMap::default(),
        }
    }
}

/// Parse and lower one source file.
///
/// Files that fail to parse degrade to an empty module so the rest of the
/// project can still be analyzed.
pub fn lower_source(path: &str, source: &str) -> Lowered {
    let source_type = SourceType::from_path(path)
        .unwrap_or_default()
        .with_typescript(true)
        .with_jsx(true);

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Lowered::empty();
    }

    // Semantic analysis populates reference ids on the AST, which lowering
    // uses to attach declaration targets to identifier references.
    let semantic = SemanticBuilder::new().build(&parsed.program).semantic;

    let mut lower = Lower {
        scoping: semantic.scoping(),
        tree: SyntaxTree::new(),
        stack: vec![NodeId(0)],
        imports: ImportMap::default(),
        exports: ExportTable::default(),
        module_scope_decls: FxHashMap::default(),
        export_depth: 0,
        function_depth: 0,
    };
    lower.visit_program(&parsed.program);

    Lowered {
        tree: lower.tree,
        imports: lower.imports,
        exports: lower.exports,
        module_scope_decls: lower.module_scope_decls,
    }
}

struct Lower<'s> {
    scoping: &'s Scoping,
    tree: SyntaxTree,
    stack: Vec<NodeId>,
    imports: ImportMap,
    exports: ExportTable,
    module_scope_decls: FxHashMap<String, u32>,
    export_depth: u32,
    function_depth: u32,
}

impl<'s> Lower<'s> {
    fn parent(&self) -> NodeId {
        *self.stack.last().expect("parent stack never empty")
    }

    fn enter(&mut self, kind: NodeKind, span: Span) {
        let id = self.tree.push(kind, span, self.parent());
        self.stack.push(id);
    }

    fn exit(&mut self) {
        self.stack.pop();
    }

    fn leaf(&mut self, kind: NodeKind, span: Span) {
        self.tree.push(kind, span, self.parent());
    }

    fn target_of(&self, it: &ast::IdentifierReference) -> Option<LocalTarget> {
        let reference_id = it.reference_id.get()?;
        let symbol_id = self.scoping.get_reference(reference_id).symbol_id()?;
        Some(LocalTarget {
            decl_offset: self.scoping.symbol_span(symbol_id).start,
            is_import: self
                .scoping
                .symbol_flags(symbol_id)
                .contains(SymbolFlags::Import),
        })
    }
}

/// Span of a binding pattern with default initializers peeled, so the span
/// matches the node lowering will create for it.
fn pattern_span(pat: &ast::BindingPattern) -> Span {
    match &pat.kind {
        ast::BindingPatternKind::BindingIdentifier(b) => b.span,
        ast::BindingPatternKind::ObjectPattern(o) => o.span,
        ast::BindingPatternKind::ArrayPattern(a) => a.span,
        ast::BindingPatternKind::AssignmentPattern(a) => pattern_span(&a.left),
    }
}

/// Statically-known name of a property key, if any.
fn property_key_name(key: &ast::PropertyKey) -> Option<String> {
    match key {
        ast::PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        ast::PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn export_name(name: &ast::ModuleExportName) -> String {
    match name {
        ast::ModuleExportName::IdentifierName(n) => n.name.to_string(),
        ast::ModuleExportName::IdentifierReference(r) => r.name.to_string(),
        ast::ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

impl<'s, 'ast> Visit<'ast> for Lower<'s> {
    fn visit_import_declaration(&mut self, it: &ast::ImportDeclaration<'ast>) {
        let module = it.source.value.to_string();
        if let Some(specifiers) = &it.specifiers {
            for spec in specifiers {
                match spec {
                    ast::ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        self.imports.insert(
                            s.local.name.to_string(),
                            ImportEntry::Named {
                                module: module.clone(),
                                imported: export_name(&s.imported),
                            },
                        );
                    }
                    ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                        self.imports.insert(
                            s.local.name.to_string(),
                            ImportEntry::Named {
                                module: module.clone(),
                                imported: "default".to_string(),
                            },
                        );
                    }
                    ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        self.imports.insert(
                            s.local.name.to_string(),
                            ImportEntry::Namespace {
                                module: module.clone(),
                            },
                        );
                    }
                }
            }
        }
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ast::ExportNamedDeclaration<'ast>) {
        if let Some(source) = &it.source {
            for spec in &it.specifiers {
                self.exports.insert(
                    export_name(&spec.exported),
                    ExportTarget::ReExport {
                        module: source.value.to_string(),
                        imported: export_name(&spec.local),
                    },
                );
            }
            return;
        }
        for spec in &it.specifiers {
            self.exports.insert(
                export_name(&spec.exported),
                ExportTarget::Local {
                    local: export_name(&spec.local),
                },
            );
        }
        self.export_depth += 1;
        walk::walk_export_named_declaration(self, it);
        self.export_depth -= 1;
    }

    fn visit_export_all_declaration(&mut self, it: &ast::ExportAllDeclaration<'ast>) {
        if it.exported.is_none() {
            self.exports.add_star(it.source.value.to_string());
        }
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_export_default_declaration(&mut self, it: &ast::ExportDefaultDeclaration<'ast>) {
        self.export_depth += 1;
        walk::walk_export_default_declaration(self, it);
        self.export_depth -= 1;
    }

    fn visit_variable_declarator(&mut self, it: &ast::VariableDeclarator<'ast>) {
        let exported = self.export_depth > 0 && self.function_depth == 0;
        let kind = NodeKind::VarDecl {
            pattern: pattern_span(&it.id),
            init: it
                .init
                .as_ref()
                .map(|init| init.get_inner_expression().span()),
            exported,
        };
        let pattern_span = pattern_span(&it.id);
        self.enter(kind, it.span);
        walk::walk_variable_declarator(self, it);
        if exported {
            // `export const x = ...` has no specifier list; register the
            // declared names directly. Only the pattern's bindings count -
            // the initializer may declare its own locals.
            let decl = self.parent();
            let names: Vec<String> = self
                .tree
                .child_at(decl, pattern_span)
                .map(|pat| {
                    self.tree
                        .pattern_decls(pat)
                        .into_iter()
                        .filter_map(|ident| self.tree.decl_name(ident).map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            for name in names {
                self.exports.insert(
                    name.clone(),
                    ExportTarget::Local { local: name },
                );
            }
        }
        self.exit();
    }

    fn visit_function(&mut self, it: &ast::Function<'ast>, _flags: ScopeFlags) {
        let name = it.id.as_ref().map(|id| id.name.to_string());
        if let Some(name) = &name {
            if self.function_depth == 0 {
                if let Some(id) = &it.id {
                    self.module_scope_decls.insert(name.clone(), id.span.start);
                }
                if self.export_depth > 0 {
                    self.exports.insert(
                        name.clone(),
                        ExportTarget::Local {
                            local: name.clone(),
                        },
                    );
                }
            }
        }
        let kind = NodeKind::Function(FunctionNode {
            name,
            params: it.params.items.iter().map(|p| pattern_span(&p.pattern)).collect(),
            body_expr: None,
            declaration: it.is_declaration(),
        });
        self.enter(kind, it.span);
        self.function_depth += 1;
        walk::walk_function(self, it, _flags);
        self.function_depth -= 1;
        self.exit();
    }

    fn visit_arrow_function_expression(&mut self, it: &ast::ArrowFunctionExpression<'ast>) {
        let body_expr = if it.expression {
            it.body.statements.first().and_then(|stmt| match stmt {
                ast::Statement::ExpressionStatement(es) => {
                    Some(es.expression.get_inner_expression().span())
                }
                _ => None,
            })
        } else {
            None
        };
        let kind = NodeKind::Function(FunctionNode {
            name: None,
            params: it.params.items.iter().map(|p| pattern_span(&p.pattern)).collect(),
            body_expr,
            declaration: false,
        });
        self.enter(kind, it.span);
        self.function_depth += 1;
        walk::walk_arrow_function_expression(self, it);
        self.function_depth -= 1;
        self.exit();
    }

    fn visit_return_statement(&mut self, it: &ast::ReturnStatement<'ast>) {
        let arg = it
            .argument
            .as_ref()
            .map(|a| a.get_inner_expression().span());
        self.enter(NodeKind::Return { arg }, it.span);
        walk::walk_return_statement(self, it);
        self.exit();
    }

    fn visit_binding_identifier(&mut self, it: &ast::BindingIdentifier<'ast>) {
        if self.function_depth == 0 {
            self.module_scope_decls
                .insert(it.name.to_string(), it.span.start);
        }
        self.leaf(
            NodeKind::DeclIdent {
                name: it.name.to_string(),
            },
            it.span,
        );
        walk::walk_binding_identifier(self, it);
    }

    fn visit_identifier_reference(&mut self, it: &ast::IdentifierReference<'ast>) {
        let target = self.target_of(it);
        self.leaf(
            NodeKind::Reference {
                name: it.name.to_string(),
                target,
            },
            it.span,
        );
        walk::walk_identifier_reference(self, it);
    }

    fn visit_object_pattern(&mut self, it: &ast::ObjectPattern<'ast>) {
        let props = it
            .properties
            .iter()
            .map(|p| PatternProp {
                key: property_key_name(&p.key),
                value: pattern_span(&p.value),
            })
            .collect();
        self.enter(NodeKind::ObjectPattern { props }, it.span);
        walk::walk_object_pattern(self, it);
        self.exit();
    }

    fn visit_array_pattern(&mut self, it: &ast::ArrayPattern<'ast>) {
        let elements = it
            .elements
            .iter()
            .map(|e| e.as_ref().map(pattern_span))
            .collect();
        self.enter(NodeKind::ArrayPattern { elements }, it.span);
        walk::walk_array_pattern(self, it);
        self.exit();
    }

    fn visit_call_expression(&mut self, it: &ast::CallExpression<'ast>) {
        let args = it
            .arguments
            .iter()
            .map(|arg| match arg.as_expression() {
                Some(expr) => expr.get_inner_expression().span(),
                None => arg.span(),
            })
            .collect();
        let kind = NodeKind::Call {
            callee: it.callee.get_inner_expression().span(),
            args,
        };
        self.enter(kind, it.span);
        walk::walk_call_expression(self, it);
        self.exit();
    }

    fn visit_static_member_expression(&mut self, it: &ast::StaticMemberExpression<'ast>) {
        let kind = NodeKind::Member {
            object: it.object.get_inner_expression().span(),
            property: it.property.name.to_string(),
        };
        self.enter(kind, it.span);
        walk::walk_static_member_expression(self, it);
        self.exit();
    }

    fn visit_object_expression(&mut self, it: &ast::ObjectExpression<'ast>) {
        let props = it
            .properties
            .iter()
            .filter_map(|p| match p {
                ast::ObjectPropertyKind::ObjectProperty(op) => Some(LitProp {
                    key: property_key_name(&op.key),
                    value: op.value.get_inner_expression().span(),
                    shorthand: op.shorthand,
                    method: op.method,
                }),
                ast::ObjectPropertyKind::SpreadProperty(_) => None,
            })
            .collect();
        self.enter(NodeKind::ObjectLit { props }, it.span);
        walk::walk_object_expression(self, it);
        self.exit();
    }

    fn visit_jsx_element(&mut self, it: &ast::JSXElement<'ast>) {
        let tag = match &it.opening_element.name {
            ast::JSXElementName::Identifier(id) => Some(TagName {
                name: id.name.to_string(),
                target: None,
            }),
            ast::JSXElementName::IdentifierReference(r) => Some(TagName {
                name: r.name.to_string(),
                target: self.target_of(r),
            }),
            _ => None,
        };
        self.enter(NodeKind::JsxElement { tag }, it.span);
        walk::walk_jsx_element(self, it);
        self.exit();
    }

    fn visit_jsx_attribute(&mut self, it: &ast::JSXAttribute<'ast>) {
        let name = match &it.name {
            ast::JSXAttributeName::Identifier(id) => id.name.to_string(),
            // Namespaced attributes never carry state; an empty name matches
            // nothing downstream.
            ast::JSXAttributeName::NamespacedName(_) => String::new(),
        };
        let value = it.value.as_ref().and_then(|v| match v {
            ast::JSXAttributeValue::ExpressionContainer(c) => match &c.expression {
                ast::JSXExpression::EmptyExpression(_) => None,
                expr => Some(expr.span()),
            },
            _ => None,
        });
        self.enter(NodeKind::JsxAttr { name, value }, it.span);
        walk::walk_jsx_attribute(self, it);
        self.exit();
    }
}

//! Owned, flat syntax tree.
//!
//! The lowering pass (see `lower`) reduces each parsed file to this
//! id-indexed arena so the rest of the engine never touches borrowed oxc AST
//! nodes. Only the node kinds the analysis asks questions about are
//! materialized; everything else is skipped during lowering, and its
//! interesting descendants attach to the nearest materialized ancestor.
//!
//! Structured relationships (a call's callee vs. its arguments, a
//! declarator's pattern vs. its initializer) are recorded as source spans and
//! recovered with [`SyntaxTree::child_at`], which matches a direct child by
//! exact span. A slot whose expression was not materialized simply fails to
//! resolve, which callers treat as a soft miss.

use molt::oxc::Span;
use rustc_hash::FxHashMap;

/// Index of a node in its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Reference target resolved by oxc's per-file semantic pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTarget {
    /// Start offset of the declaring identifier within the same file.
    pub decl_offset: u32,
    /// The declaration is an import binding; follow the import map instead
    /// of the local declaration index.
    pub is_import: bool,
}

/// Destructured property of an object binding pattern.
#[derive(Debug, Clone)]
pub struct PatternProp {
    /// Property name, when statically known.
    pub key: Option<String>,
    /// Span of the bound value pattern (default initializers peeled).
    pub value: Span,
}

/// Property of an object literal.
#[derive(Debug, Clone)]
pub struct LitProp {
    pub key: Option<String>,
    pub value: Span,
    pub shorthand: bool,
    /// Method shorthand (`get() { ... }`).
    pub method: bool,
}

/// JSX tag of an element.
#[derive(Debug, Clone)]
pub struct TagName {
    pub name: String,
    /// Resolution of the tag identifier, for component tags.
    pub target: Option<LocalTarget>,
}

/// Function-like node payload (declaration, expression, or arrow).
#[derive(Debug, Clone)]
pub struct FunctionNode {
    /// Own name, for function declarations.
    pub name: Option<String>,
    /// Parameter pattern spans, in order (defaults peeled).
    pub params: Vec<Span>,
    /// Expression body span for `x => expr` arrows.
    pub body_expr: Option<Span>,
    /// Came from a `function` declaration statement.
    pub declaration: bool,
}

/// The node kinds the analysis cares about.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// File root.
    Module,
    /// One `VariableDeclarator`.
    VarDecl {
        pattern: Span,
        init: Option<Span>,
        exported: bool,
    },
    Function(FunctionNode),
    Return {
        arg: Option<Span>,
    },
    /// A binding identifier: the declaring occurrence of a name.
    DeclIdent {
        name: String,
    },
    ObjectPattern {
        props: Vec<PatternProp>,
    },
    ArrayPattern {
        elements: Vec<Option<Span>>,
    },
    /// A reference identifier: a use of a name.
    Reference {
        name: String,
        target: Option<LocalTarget>,
    },
    Call {
        callee: Span,
        args: Vec<Span>,
    },
    /// Static member access `object.property`.
    Member {
        object: Span,
        property: String,
    },
    ObjectLit {
        props: Vec<LitProp>,
    },
    JsxElement {
        tag: Option<TagName>,
    },
    JsxAttr {
        name: String,
        value: Option<Span>,
    },
}

/// A materialized node.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Flat per-file syntax tree.
#[derive(Debug, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    /// Declaring-identifier start offset -> its `DeclIdent` node.
    decl_by_offset: FxHashMap<u32, NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        let mut tree = Self::default();
        tree.nodes.push(Node {
            kind: NodeKind::Module,
            span: Span::new(0, 0),
            parent: None,
            children: Vec::new(),
        });
        tree
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a node under `parent`.
    pub(crate) fn push(&mut self, kind: NodeKind, span: Span, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let NodeKind::DeclIdent { .. } = kind {
            self.decl_by_offset.insert(span.start, id);
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0 as usize].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0 as usize].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0 as usize].parent
    }

    /// All node ids in creation (source) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// All calls in the file, in source order.
    pub fn calls(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids()
            .filter(|id| matches!(self.kind(*id), NodeKind::Call { .. }))
    }

    /// The `DeclIdent` declared at `offset`, if that identifier was lowered.
    pub fn decl_at_offset(&self, offset: u32) -> Option<NodeId> {
        self.decl_by_offset.get(&offset).copied()
    }

    /// Direct child whose span is exactly `span`. Used to resolve structured
    /// slots (call arguments, declarator initializers, attribute values).
    pub fn child_at(&self, parent: NodeId, span: Span) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.span(c) == span)
    }

    /// Walk from `id` up to the root, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.parent(id);
            Some(id)
        })
    }

    /// All `DeclIdent` names bound by a pattern node (identifier, array
    /// pattern, object pattern - nested).
    pub fn pattern_decls(&self, pattern: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_decls(pattern, &mut out);
        out
    }

    fn collect_decls(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let NodeKind::DeclIdent { .. } = self.kind(id) {
            out.push(id);
        }
        for &child in &self.node(id).children {
            self.collect_decls(child, out);
        }
    }

    /// Name of a `DeclIdent` node.
    pub fn decl_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::DeclIdent { name } => Some(name),
            _ => None,
        }
    }

    /// Descendants of `scope` in source order. When `enter_functions` is
    /// false, nested `Function` subtrees are not descended into (the scope
    /// node itself is always entered).
    pub fn descendants(&self, scope: NodeId, enter_functions: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(scope, scope, enter_functions, &mut out);
        out
    }

    fn walk(&self, root: NodeId, id: NodeId, enter_functions: bool, out: &mut Vec<NodeId>) {
        if id != root {
            if !enter_functions && matches!(self.kind(id), NodeKind::Function(_)) {
                out.push(id);
                return;
            }
            out.push(id);
        }
        for &child in &self.node(id).children {
            self.walk(root, child, enter_functions, out);
        }
    }

    /// Call nodes inside `scope`.
    pub fn calls_in(&self, scope: NodeId, enter_functions: bool) -> Vec<NodeId> {
        self.descendants(scope, enter_functions)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), NodeKind::Call { .. }))
            .collect()
    }

    /// Variable declarators belonging to `scope`'s own body (nested functions
    /// excluded).
    pub fn var_decls_in(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope, false)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), NodeKind::VarDecl { .. }))
            .collect()
    }

    /// The nearest enclosing function of `id`, if any.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| matches!(self.kind(*a), NodeKind::Function(_)))
    }

    /// Identifiable name of a function node: its own declared name, the name
    /// of the variable it initializes, or the key of the object property it
    /// is the value of.
    pub fn function_name(&self, func: NodeId) -> Option<String> {
        let NodeKind::Function(f) = self.kind(func) else {
            return None;
        };
        if let Some(name) = &f.name {
            return Some(name.clone());
        }
        let parent = self.parent(func)?;
        match self.kind(parent) {
            NodeKind::VarDecl { pattern, .. } => {
                let pat = self.child_at(parent, *pattern)?;
                self.decl_name(pat).map(str::to_string)
            }
            NodeKind::ObjectLit { props } => {
                let span = self.span(func);
                props
                    .iter()
                    .find(|p| p.value == span)
                    .and_then(|p| p.key.clone())
            }
            _ => None,
        }
    }

    /// Return expressions of a function: the expression body of an arrow, or
    /// the arguments of `return` statements in the function's own scope.
    pub fn returns_of(&self, func: NodeId) -> Vec<NodeId> {
        let NodeKind::Function(f) = self.kind(func) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(body) = f.body_expr {
            if let Some(expr) = self.child_at(func, body) {
                out.push(expr);
            }
        }
        for id in self.descendants(func, false) {
            if let NodeKind::Return { arg: Some(arg) } = self.kind(id) {
                if let Some(expr) = self.child_at(id, *arg) {
                    out.push(expr);
                }
            }
        }
        out
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

//! Syntax-node abstraction consumed by the extractors.
//!
//! The extractors do not walk a parser's native AST directly. Instead the
//! parser collaborator (see `parsers::js`) lowers each source file into this
//! small tree, which exposes exactly what extraction needs: node kind, line
//! and column, literal values, the children required for depth-1 lookups,
//! and the comment attached to each node.

/// A single lowered syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    line: u32,
    column: Option<u32>,
    comment: Option<String>,
}

/// The node kinds extraction can distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// String literal with its decoded value.
    Str(String),
    /// Literal `null`.
    Null,
    /// Array or object literal. Object properties become keyed entries.
    Array(Vec<ArrayEntry>),
    /// Function or method call. `name` is the last callee segment
    /// (`t.trans(...)` has name `trans`).
    Call {
        name: String,
        receiver: Option<Box<Node>>,
        args: Vec<Node>,
    },
    /// A node wrapping a single expression (expression statement,
    /// parenthesized expression, return value).
    Expr(Box<Node>),
    /// A node wrapping a value (variable initializer, property value).
    Value(Box<Node>),
    /// Anything else. `construct` names the source construct for error
    /// messages; `children` are still visited in order.
    Other {
        construct: String,
        children: Vec<Node>,
    },
}

/// One entry of an array or object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayEntry {
    /// Key node for keyed entries (object properties). Plain array
    /// elements have no key.
    pub key: Option<Node>,
    pub value: Node,
    /// Comment attached to the entry as a whole, as opposed to its key or
    /// value nodes.
    pub comment: Option<String>,
}

impl ArrayEntry {
    pub fn new(key: Option<Node>, value: Node) -> Self {
        Self {
            key,
            value,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl Node {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            line,
            column: None,
            comment: None,
        }
    }

    pub fn string(value: impl Into<String>, line: u32) -> Self {
        Self::new(NodeKind::Str(value.into()), line)
    }

    pub fn null(line: u32) -> Self {
        Self::new(NodeKind::Null, line)
    }

    pub fn array(entries: Vec<ArrayEntry>, line: u32) -> Self {
        Self::new(NodeKind::Array(entries), line)
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>, line: u32) -> Self {
        Self::new(
            NodeKind::Call {
                name: name.into(),
                receiver: None,
                args,
            },
            line,
        )
    }

    pub fn expr(inner: Node, line: u32) -> Self {
        Self::new(NodeKind::Expr(Box::new(inner)), line)
    }

    pub fn value(inner: Node, line: u32) -> Self {
        Self::new(NodeKind::Value(Box::new(inner)), line)
    }

    pub fn other(construct: impl Into<String>, children: Vec<Node>, line: u32) -> Self {
        Self::new(
            NodeKind::Other {
                construct: construct.into(),
                children,
            },
            line,
        )
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_receiver(mut self, node: Node) -> Self {
        if let NodeKind::Call { receiver, .. } = &mut self.kind {
            *receiver = Some(Box::new(node));
        }
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<u32> {
        self.column
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Literal string value, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    /// Human-readable name of the construct, used in extraction errors.
    pub fn construct_name(&self) -> &str {
        match &self.kind {
            NodeKind::Str(_) => "string literal",
            NodeKind::Null => "null literal",
            NodeKind::Array(_) => "array literal",
            NodeKind::Call { .. } => "call expression",
            NodeKind::Expr(_) => "expression",
            NodeKind::Value(_) => "value",
            NodeKind::Other { construct, .. } => construct,
        }
    }
}

/// Preorder traversal over a node and everything under it.
pub fn walk<'a>(node: &'a Node, visit: &mut impl FnMut(&'a Node)) {
    visit(node);
    match node.kind() {
        NodeKind::Str(_) | NodeKind::Null => {}
        NodeKind::Array(entries) => {
            for entry in entries {
                if let Some(key) = &entry.key {
                    walk(key, visit);
                }
                walk(&entry.value, visit);
            }
        }
        NodeKind::Call { receiver, args, .. } => {
            if let Some(receiver) = receiver {
                walk(receiver, visit);
            }
            for arg in args {
                walk(arg, visit);
            }
        }
        NodeKind::Expr(inner) | NodeKind::Value(inner) => walk(inner, visit),
        NodeKind::Other { children, .. } => {
            for child in children {
                walk(child, visit);
            }
        }
    }
}

/// Flatten a file's root nodes into preorder, the order extraction sees them.
pub fn flatten(roots: &[Node]) -> Vec<&Node> {
    let mut flat = Vec::new();
    for root in roots {
        walk(root, &mut |node| flat.push(node));
    }
    flat
}

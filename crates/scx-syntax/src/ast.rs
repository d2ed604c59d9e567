//! Flattened abstract syntax tree.
//!
//! The tree is stored in pre-order in a single append-only vector. An
//! expression node is followed immediately by its children, back to back,
//! and records its own subtree size (the jump span) so that a whole subtree
//! can be skipped in O(1) without visiting it:
//!
//! ```text
//! (+ 1 (* 2 3))
//!
//! id  node                       span
//! 0   Expr  ident=+  args=2      5
//! 1   Atom  Int  "1"             1
//! 2   Expr  ident=*  args=2      3
//! 3   Atom  Int  "2"             1
//! 4   Atom  Int  "3"             1
//! ```
//!
//! Nodes are never mutated after the parser finishes a form. Literal text is
//! not decoded here; atoms only remember where their token starts.

use crate::span::SrcPos;
use std::fmt;
use std::ops::Index;

/// Bytes an expression node is charged in the arena (tag, span, ident,
/// argument count).
pub const EXPR_NODE_BYTES: usize = 7;

/// Bytes an atom node is charged in the arena (tag, offset).
pub const ATOM_NODE_BYTES: usize = 3;

/// Index of a node in an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from a vector index, if it fits.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(NodeId)
    }

    /// Returns the vector index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the id `count` nodes further on.
    #[must_use]
    pub const fn offset(self, count: u32) -> Self {
        NodeId(self.0 + count)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    /// Identifier reference
    Ident,
    /// Integer literal
    Int,
    /// Decimal literal
    Real,
    /// `#t` / `#f`
    Bool,
    /// String literal
    Str,
}

/// A node of the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// `( ident arg* )`
    Expr {
        /// Offset of the operator identifier
        ident: SrcPos,
        /// Number of direct children
        arg_count: u16,
        /// Number of nodes in the subtree, this node included
        span: u32,
    },

    /// A literal or identifier reference.
    Atom {
        /// Literal kind
        kind: AtomKind,
        /// Offset of the token
        pos: SrcPos,
    },
}

impl Node {
    /// Number of nodes in the subtree rooted here.
    #[must_use]
    pub const fn span(&self) -> u32 {
        match self {
            Node::Expr { span, .. } => *span,
            Node::Atom { .. } => 1,
        }
    }

    /// Bytes this node is charged in the arena.
    #[must_use]
    pub const fn encoded_bytes(&self) -> usize {
        match self {
            Node::Expr { .. } => EXPR_NODE_BYTES,
            Node::Atom { .. } => ATOM_NODE_BYTES,
        }
    }

    /// Source offset of the node (operator for expressions).
    #[must_use]
    pub const fn pos(&self) -> SrcPos {
        match self {
            Node::Expr { ident, .. } => *ident,
            Node::Atom { pos, .. } => *pos,
        }
    }
}

/// Append-only node storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<Node>,
    bytes: usize,
}

impl Ast {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total encoded size of all nodes.
    #[must_use]
    pub fn encoded_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the node with the given id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn push(&mut self, node: Node) -> Option<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        self.bytes += node.encoded_bytes();
        self.nodes.push(node);
        Some(id)
    }

    pub(crate) fn finish_expr(&mut self, id: NodeId, count: u16) {
        let span = self.nodes.len() - id.index();
        if let Some(Node::Expr { arg_count, span: jump, .. }) = self.nodes.get_mut(id.index()) {
            *arg_count = count;
            *jump = span as u32;
        }
    }

    /// Drops every node from index `len` on, undoing a partial parse.
    pub fn truncate(&mut self, len: usize) {
        for node in self.nodes.drain(len.min(self.nodes.len())..) {
            self.bytes -= node.encoded_bytes();
        }
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.bytes = 0;
    }

    /// Id of the node following the subtree rooted at `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        id.offset(self[id].span())
    }

    /// Iterates over the direct children of `id` (empty for atoms).
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let remaining = match self[id] {
            Node::Expr { arg_count, .. } => arg_count,
            Node::Atom { .. } => 0,
        };
        Children { ast: self, next: id.offset(1), remaining }
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// Iterator over the direct children of an expression, skipping each
/// child's subtree by its jump span.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    ast: &'a Ast,
    next: NodeId,
    remaining: u16,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next;
        self.next = self.ast.next_sibling(id);
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}

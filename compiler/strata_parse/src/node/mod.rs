//! The concrete syntax tree.
//!
//! All nodes of one parse live in a single arena addressed by [`NodeId`].
//! The driver grows the arena through the crate-private builder; once the
//! parse is sealed the arena is frozen inside a [`Cst`] and only read
//! through the [`NodeRef`] view.
//!
//! # Invariants
//!
//! - Concatenating the text of all reachable leaves in document order
//!   reproduces the original input, hidden tokens included.
//! - A token is represented by at most one leaf.
//! - A node carries at most one syntax error.

mod builder;
mod view;

pub(crate) use builder::{Compressed, NodeModelBuilder};
pub use view::{Descendants, NodeRef};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use strata_diagnostic::{Diagnostic, ErrorCode};
use strata_ir::{ElementId, Span, TokenIndex, TokenType};

use crate::error::InvariantViolation;
use crate::invariant::InvariantChecker;
use crate::semantic::SemanticId;

/// Index of a node in its tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A syntax error attached to a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SyntaxErrorMessage {
    message: String,
    issue_code: Option<ErrorCode>,
}

impl SyntaxErrorMessage {
    pub fn new(message: impl Into<String>, issue_code: Option<ErrorCode>) -> Self {
        SyntaxErrorMessage {
            message: message.into(),
            issue_code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issue_code(&self) -> Option<ErrorCode> {
        self.issue_code
    }

    /// Fold `other` into this message. The first issue code wins.
    pub(crate) fn merge(&mut self, other: SyntaxErrorMessage) {
        self.message.push_str("; ");
        self.message.push_str(&other.message);
        if self.issue_code.is_none() {
            self.issue_code = other.issue_code;
        }
    }
}

impl fmt::Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue_code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Composite {
    pub(crate) children: Vec<NodeId>,
    /// Lookahead count when the node was opened.
    pub(crate) lookahead: u32,
    /// Leaves whose tokens were inspected to decide on this node.
    pub(crate) lookahead_leaves: SmallVec<[NodeId; 2]>,
    /// Position reported for a composite without leaves.
    pub(crate) anchor: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct Leaf {
    pub(crate) token: TokenIndex,
    pub(crate) kind: TokenType,
    pub(crate) span: Span,
    pub(crate) hidden: bool,
    pub(crate) feature: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Composite(Composite),
    Leaf(Leaf),
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    /// Grammar elements this node represents, outermost first. Holds more
    /// than one element only after compression.
    pub(crate) grammar: SmallVec<[ElementId; 1]>,
    pub(crate) semantic: Option<SemanticId>,
    pub(crate) error: Option<SyntaxErrorMessage>,
}

impl NodeData {
    pub(crate) fn composite(&self) -> Option<&Composite> {
        match &self.kind {
            NodeKind::Composite(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn composite_mut(&mut self) -> Option<&mut Composite> {
        match &mut self.kind {
            NodeKind::Composite(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            NodeKind::Leaf(l) => Some(l),
            NodeKind::Composite(_) => None,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        self.composite().map_or(&[], |c| c.children.as_slice())
    }
}

/// Flat storage for all nodes of one tree. The root is always the first node.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<NodeData>,
}

impl NodeArena {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn with_root() -> Self {
        NodeArena {
            nodes: vec![NodeData {
                parent: None,
                kind: NodeKind::Composite(Composite {
                    children: Vec::new(),
                    lookahead: 0,
                    lookahead_leaves: SmallVec::new(),
                    anchor: 0,
                }),
                grammar: SmallVec::new(),
                semantic: None,
                error: None,
            }],
        }
    }

    pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
        let raw = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("syntax tree exceeds u32::MAX nodes"));
        self.nodes.push(data);
        NodeId(raw)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Number of allocated nodes, including nodes detached by compression.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// A sealed concrete syntax tree together with the text it covers.
#[derive(Clone, Debug)]
pub struct Cst {
    arena: NodeArena,
    source: String,
    semantic_nodes: FxHashMap<SemanticId, NodeId>,
}

impl Cst {
    pub(crate) fn new(
        arena: NodeArena,
        source: String,
        semantic_nodes: FxHashMap<SemanticId, NodeId>,
    ) -> Self {
        Cst {
            arena,
            source,
            semantic_nodes,
        }
    }

    /// The root node. Its text is the complete input.
    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeArena::ROOT)
    }

    /// # Panics
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.arena.len(), "{id:?} is not part of this tree");
        NodeRef::new(&self.arena, &self.source, id)
    }

    /// The complete original input.
    pub fn text(&self) -> &str {
        &self.source
    }

    /// Primary node of a semantic element.
    pub fn node_for(&self, element: SemanticId) -> Option<NodeRef<'_>> {
        self.semantic_nodes.get(&element).map(|id| self.node(*id))
    }

    /// All reachable leaves in document order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.root().descendants().filter(NodeRef::is_leaf)
    }

    /// Nodes carrying a syntax error, in document order.
    pub fn syntax_errors(&self) -> impl Iterator<Item = (NodeRef<'_>, &SyntaxErrorMessage)> {
        self.root()
            .descendants()
            .filter_map(|node| node.syntax_error().map(|error| (node, error)))
    }

    /// Convert every attached syntax error into a diagnostic.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.syntax_errors()
            .map(|(node, error)| {
                let code = error.issue_code().unwrap_or(ErrorCode::E1001);
                Diagnostic::syntax_error(code, error.message(), node.span())
            })
            .collect()
    }

    /// Re-run the structural checks. Never mutates the tree.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        InvariantChecker::new().check(self)
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub(crate) fn semantic_nodes(&self) -> &FxHashMap<SemanticId, NodeId> {
        &self.semantic_nodes
    }
}

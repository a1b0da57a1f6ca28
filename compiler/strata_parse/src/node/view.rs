//! Read-only node adapter.

use std::fmt;
use strata_ir::{ElementId, Span, TokenIndex, TokenType};

use super::{NodeArena, NodeData, NodeId, NodeKind, SyntaxErrorMessage};
use crate::semantic::SemanticId;

/// A node of a syntax tree together with the tree it belongs to.
///
/// This is the only shape in which nodes leave the crate. Offsets and text
/// are derived from the leaves below a composite, so views are always
/// consistent with the tree they were taken from.
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    source: &'a str,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(arena: &'a NodeArena, source: &'a str, id: NodeId) -> Self {
        NodeRef { arena, source, id }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    fn data(&self) -> &'a NodeData {
        self.arena.get(self.id)
    }

    fn at(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef::new(self.arena, self.source, id)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.data().kind, NodeKind::Leaf(_))
    }

    pub fn is_composite(&self) -> bool {
        !self.is_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.id == NodeArena::ROOT
    }

    /// True for leaves of hidden-channel tokens.
    pub fn is_hidden(&self) -> bool {
        self.data().leaf().is_some_and(|l| l.hidden)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        let source = self.source;
        self.data()
            .children()
            .iter()
            .map(move |id| NodeRef::new(arena, source, *id))
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.children().next_back()
    }

    /// This node and everything below it, in document order.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            arena: self.arena,
            source: self.source,
            stack: vec![self.id],
        }
    }

    /// Leaves below this node, in document order. A leaf yields itself.
    pub fn leaves(&self) -> impl Iterator<Item = NodeRef<'a>> {
        self.descendants().filter(NodeRef::is_leaf)
    }

    pub fn first_leaf(&self) -> Option<NodeRef<'a>> {
        self.leaves().next()
    }

    pub fn last_leaf(&self) -> Option<NodeRef<'a>> {
        if self.is_leaf() {
            return Some(*self);
        }
        self.children().rev().find_map(|child| child.last_leaf())
    }

    /// Byte range covered by this node.
    ///
    /// A composite without leaves is a zero-width span at the position it
    /// was opened.
    pub fn span(&self) -> Span {
        match &self.data().kind {
            NodeKind::Leaf(leaf) => leaf.span,
            NodeKind::Composite(composite) => match (self.first_leaf(), self.last_leaf()) {
                (Some(first), Some(last)) => first.span().cover(last.span()),
                _ => Span::point(composite.anchor),
            },
        }
    }

    pub fn offset(&self) -> u32 {
        self.span().start
    }

    pub fn length(&self) -> u32 {
        self.span().len()
    }

    pub fn end_offset(&self) -> u32 {
        self.span().end
    }

    /// Source text covered by this node, hidden tokens included.
    pub fn text(&self) -> &'a str {
        self.span().slice(self.source).unwrap_or("")
    }

    /// Outermost grammar element of this node.
    pub fn grammar_element(&self) -> Option<ElementId> {
        self.data().grammar.first().copied()
    }

    /// Every grammar element merged into this node, outermost first.
    pub fn grammar_elements(&self) -> &'a [ElementId] {
        &self.data().grammar
    }

    /// The semantic element directly associated with this node.
    pub fn semantic_element(&self) -> Option<SemanticId> {
        self.data().semantic
    }

    /// The semantic element of this node or its nearest ancestor.
    pub fn enclosing_semantic_element(&self) -> Option<SemanticId> {
        let mut node = Some(*self);
        while let Some(current) = node {
            if let Some(element) = current.semantic_element() {
                return Some(element);
            }
            node = current.parent();
        }
        None
    }

    pub fn syntax_error(&self) -> Option<&'a SyntaxErrorMessage> {
        self.data().error.as_ref()
    }

    /// Feature the leaf's token was assigned to.
    pub fn feature(&self) -> Option<&'a str> {
        self.data().leaf().and_then(|l| l.feature.as_deref())
    }

    pub fn token_index(&self) -> Option<TokenIndex> {
        self.data().leaf().map(|l| l.token)
    }

    pub fn token_type(&self) -> Option<TokenType> {
        self.data().leaf().map(|l| l.kind)
    }

    /// Lookahead count recorded when the composite was opened.
    pub fn lookahead(&self) -> u32 {
        self.data().composite().map_or(0, |c| c.lookahead)
    }

    /// Leaves whose tokens were inspected to decide on this node.
    pub fn lookahead_leaves(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        let source = self.source;
        self.data()
            .composite()
            .map_or(&[][..], |c| c.lookahead_leaves.as_slice())
            .iter()
            .map(move |id| NodeRef::new(arena, source, *id))
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_leaf() {
            "Leaf"
        } else if self.is_root() {
            "Root"
        } else {
            "Composite"
        };
        write!(f, "{kind}({:?} {:?})", self.span(), self.text())
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    arena: &'a NodeArena,
    source: &'a str,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.arena.get(id).children().iter().rev().copied());
        Some(NodeRef::new(self.arena, self.source, id))
    }
}

//! Construction of the node arena during a parse.

use smallvec::{smallvec, SmallVec};
use strata_ir::ElementId;
use tracing::debug;

use super::{Composite, Leaf, NodeArena, NodeData, NodeId, NodeKind, SyntaxErrorMessage};
use crate::semantic::SemanticId;

/// A child merged into its parent by [`NodeModelBuilder::compress`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Compressed {
    pub absorbed: NodeId,
    /// Element the absorbed child was bound to, now bound to the parent.
    pub semantic: Option<SemanticId>,
}

/// Grows a [`NodeArena`] in document order.
///
/// The builder does not track the current node; the driver passes parents
/// explicitly so that every operation is a pure arena update.
#[derive(Debug)]
pub(crate) struct NodeModelBuilder {
    arena: NodeArena,
}

impl NodeModelBuilder {
    pub(crate) fn new() -> Self {
        NodeModelBuilder {
            arena: NodeArena::with_root(),
        }
    }

    #[inline]
    pub(crate) fn root(&self) -> NodeId {
        NodeArena::ROOT
    }

    #[inline]
    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub(crate) fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub(crate) fn new_composite(
        &mut self,
        grammar: Option<ElementId>,
        lookahead: u32,
        anchor: u32,
        parent: NodeId,
    ) -> NodeId {
        let id = self.arena.push(NodeData {
            parent: Some(parent),
            kind: NodeKind::Composite(Composite {
                children: Vec::new(),
                lookahead,
                lookahead_leaves: SmallVec::new(),
                anchor,
            }),
            grammar: grammar.into_iter().collect(),
            semantic: None,
            error: None,
        });
        self.append_child(parent, id);
        id
    }

    pub(crate) fn new_leaf(
        &mut self,
        leaf: Leaf,
        grammar: Option<ElementId>,
        error: Option<SyntaxErrorMessage>,
        parent: NodeId,
    ) -> NodeId {
        let id = self.arena.push(NodeData {
            parent: Some(parent),
            kind: NodeKind::Leaf(leaf),
            grammar: grammar.into_iter().collect(),
            semantic: None,
            error,
        });
        self.append_child(parent, id);
        id
    }

    /// Open a composite that takes the place of `existing` in its parent
    /// and adopts it as its only child.
    pub(crate) fn new_composite_as_parent_of(
        &mut self,
        grammar: ElementId,
        lookahead: u32,
        existing: NodeId,
    ) -> NodeId {
        let parent = self.arena.get(existing).parent;
        let anchor = self.arena.get(existing).composite().map_or(0, |c| c.anchor);
        let id = self.arena.push(NodeData {
            parent,
            kind: NodeKind::Composite(Composite {
                children: vec![existing],
                lookahead,
                lookahead_leaves: SmallVec::new(),
                anchor,
            }),
            grammar: smallvec![grammar],
            semantic: None,
            error: None,
        });
        if let Some(parent) = parent {
            if let Some(composite) = self.arena.get_mut(parent).composite_mut() {
                for child in &mut composite.children {
                    if *child == existing {
                        *child = id;
                    }
                }
            }
        }
        self.arena.get_mut(existing).parent = Some(id);
        id
    }

    /// Attach an error to `node`, folding it into an existing one.
    pub(crate) fn set_syntax_error(&mut self, node: NodeId, error: SyntaxErrorMessage) {
        let slot = &mut self.arena.get_mut(node).error;
        match slot {
            Some(existing) => existing.merge(error),
            None => *slot = Some(error),
        }
    }

    /// Associate `element` with `node`.
    ///
    /// Returns `false` if the node already belongs to a different element.
    pub(crate) fn associate(&mut self, node: NodeId, element: SemanticId) -> bool {
        let data = self.arena.get_mut(node);
        match data.semantic {
            Some(existing) => existing == element,
            None => {
                data.semantic = Some(element);
                true
            }
        }
    }

    #[inline]
    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).parent
    }

    pub(crate) fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).children().last().copied()
    }

    /// The last leaf below `node`, searching nested composites.
    pub(crate) fn last_leaf(&self, node: NodeId) -> Option<NodeId> {
        let data = self.arena.get(node);
        if data.leaf().is_some() {
            return Some(node);
        }
        data.children()
            .iter()
            .rev()
            .find_map(|child| self.last_leaf(*child))
    }

    pub(crate) fn lookahead(&self, node: NodeId) -> u32 {
        self.arena.get(node).composite().map_or(0, |c| c.lookahead)
    }

    pub(crate) fn add_lookahead_leaf(&mut self, composite: NodeId, leaf: NodeId) {
        if let Some(c) = self.arena.get_mut(composite).composite_mut() {
            if !c.lookahead_leaves.contains(&leaf) {
                c.lookahead_leaves.push(leaf);
            }
        }
    }

    /// Move the lookahead leaves of `source` to `target`.
    pub(crate) fn move_lookahead_leaves(&mut self, source: NodeId, target: NodeId) {
        let moved = self
            .arena
            .get_mut(source)
            .composite_mut()
            .map(|c| std::mem::take(&mut c.lookahead_leaves))
            .unwrap_or_default();
        for leaf in moved {
            self.add_lookahead_leaf(target, leaf);
        }
    }

    /// Merge a sole composite child into `node`.
    ///
    /// The child must be error free, and the two nodes must not be bound to
    /// different semantic elements. The merged node represents both grammar
    /// elements, outer first. The absorbed child is left detached from the
    /// tree.
    pub(crate) fn compress(&mut self, node: NodeId) -> Option<Compressed> {
        let child = match self.arena.get(node).children() {
            [only] => *only,
            _ => return None,
        };
        let child_data = self.arena.get(child);
        if child_data.composite().is_none() || child_data.error.is_some() {
            return None;
        }
        if let (Some(outer), Some(inner)) = (self.arena.get(node).semantic, child_data.semantic) {
            if outer != inner {
                return None;
            }
        }

        let absorbed = self.arena.get_mut(child);
        absorbed.parent = None;
        let grammar = std::mem::take(&mut absorbed.grammar);
        let semantic = absorbed.semantic.take();
        let (children, leaves) = absorbed
            .composite_mut()
            .map(|c| {
                (
                    std::mem::take(&mut c.children),
                    std::mem::take(&mut c.lookahead_leaves),
                )
            })
            .unwrap_or_default();

        for grandchild in &children {
            self.arena.get_mut(*grandchild).parent = Some(node);
        }
        let outer = self.arena.get_mut(node);
        outer.grammar.extend(grammar);
        outer.semantic = outer.semantic.or(semantic);
        if let Some(composite) = outer.composite_mut() {
            composite.children = children;
        }
        for leaf in leaves {
            self.add_lookahead_leaf(node, leaf);
        }
        debug!(?node, ?child, "compressed single-child composite");
        Some(Compressed {
            absorbed: child,
            semantic,
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(composite) = self.arena.get_mut(parent).composite_mut() {
            composite.children.push(child);
        }
    }
}

//! Structural checks run on a sealed tree.

use crate::error::InvariantViolation;
use crate::node::{Cst, NodeArena, NodeId};

/// Validates the tree invariants the parser relies on.
///
/// The checks are read-only: a tree that fails them is reported, never
/// repaired.
#[derive(Debug, Default)]
pub(crate) struct InvariantChecker {
    visited: Vec<bool>,
    offset: u32,
    previous_token: Option<u32>,
}

impl InvariantChecker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn check(mut self, cst: &Cst) -> Result<(), InvariantViolation> {
        let arena = cst.arena();
        if let Some(parent) = arena.get(NodeArena::ROOT).parent {
            return Err(InvariantViolation::RootHasParent { parent });
        }
        self.visited = vec![false; arena.len()];
        self.walk(arena)?;

        let length = u32::try_from(cst.text().len()).unwrap_or(u32::MAX);
        if self.offset != length {
            return Err(InvariantViolation::IncompleteCoverage {
                covered: self.offset,
                length,
            });
        }
        for node in cst.semantic_nodes().values() {
            if !self.visited.get(node.index()).copied().unwrap_or(false) {
                return Err(InvariantViolation::DetachedSemanticNode { node: *node });
            }
        }
        Ok(())
    }

    fn walk(&mut self, arena: &NodeArena) -> Result<(), InvariantViolation> {
        let mut stack = vec![NodeArena::ROOT];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut self.visited[id.index()], true) {
                return Err(InvariantViolation::DuplicateNode { node: id });
            }
            let data = arena.get(id);
            if let Some(leaf) = data.leaf() {
                if leaf.span.start != self.offset {
                    return Err(InvariantViolation::Gap {
                        node: id,
                        expected: self.offset,
                        found: leaf.span.start,
                    });
                }
                self.offset = leaf.span.end;
                let token = leaf.token.raw();
                if let Some(previous) = self.previous_token.filter(|p| *p >= token) {
                    return Err(InvariantViolation::TokenOrder {
                        node: id,
                        previous,
                        found: token,
                    });
                }
                self.previous_token = Some(token);
            }
            for child in data.children().iter().rev() {
                check_parent(arena, *child, id)?;
                stack.push(*child);
            }
        }
        Ok(())
    }
}

fn check_parent(arena: &NodeArena, child: NodeId, parent: NodeId) -> Result<(), InvariantViolation> {
    let found = arena.get(child).parent;
    if found == Some(parent) {
        Ok(())
    } else {
        Err(InvariantViolation::BrokenParent {
            node: child,
            expected: parent,
            found,
        })
    }
}

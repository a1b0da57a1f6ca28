//! Attribution of lookahead tokens to the composites whose decisions they
//! informed.
//!
//! When a rule is entered, every token the recognizer inspected to get
//! there is handed to the rule's composite. Tokens that already have a leaf
//! are attached right away. The others are parked in a deferred record and
//! attached the moment their leaf is created.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strata_ir::{Token, TokenIndex};

use crate::node::{NodeId, NodeModelBuilder};

#[derive(Debug, Default)]
pub(crate) struct LookaheadTracker {
    /// Tokens without a leaf yet, and the composites waiting for them.
    deferred: FxHashMap<TokenIndex, SmallVec<[NodeId; 3]>>,
    /// Leaf created for each token, indexed by stream position.
    token_leaves: Vec<Option<NodeId>>,
}

impl LookaheadTracker {
    pub(crate) fn new(token_count: usize) -> Self {
        LookaheadTracker {
            deferred: FxHashMap::default(),
            token_leaves: vec![None; token_count],
        }
    }

    /// Hand the recorded lookahead `tokens` to `current`.
    pub(crate) fn set_current_lookahead(
        &mut self,
        current: NodeId,
        tokens: &[Token],
        builder: &mut NodeModelBuilder,
    ) {
        for index in tokens.iter().filter_map(|t| t.index) {
            match self.leaf_of(index) {
                Some(leaf) => builder.add_lookahead_leaf(current, leaf),
                None => {
                    let waiting = self.deferred.entry(index).or_default();
                    if !waiting.contains(&current) {
                        waiting.push(current);
                    }
                }
            }
        }
    }

    /// Record the leaf created for `index` and resolve composites waiting on it.
    pub(crate) fn token_consumed(
        &mut self,
        index: TokenIndex,
        leaf: NodeId,
        builder: &mut NodeModelBuilder,
    ) {
        if let Some(slot) = self.token_leaves.get_mut(index.as_usize()) {
            *slot = Some(leaf);
        }
        if let Some(waiting) = self.deferred.remove(&index) {
            for composite in waiting {
                builder.add_lookahead_leaf(composite, leaf);
            }
        }
    }

    /// Transfer lookahead ownership from `source` to `target`, both the
    /// resolved leaves and the composites' places in deferred records.
    pub(crate) fn move_lookahead(
        &mut self,
        source: NodeId,
        target: NodeId,
        builder: &mut NodeModelBuilder,
    ) {
        builder.move_lookahead_leaves(source, target);
        for waiting in self.deferred.values_mut() {
            let had_source = waiting.contains(&source);
            waiting.retain(|n| *n != source);
            if had_source && !waiting.contains(&target) {
                waiting.push(target);
            }
        }
    }

    /// Number of deferred records that were never resolved.
    pub(crate) fn unresolved(&self) -> usize {
        self.deferred.len()
    }

    fn leaf_of(&self, index: TokenIndex) -> Option<NodeId> {
        self.token_leaves.get(index.as_usize()).copied().flatten()
    }
}

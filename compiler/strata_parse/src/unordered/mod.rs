//! Bookkeeping for unordered groups.
//!
//! An unordered group `(a & b & c)` accepts its members in any order, each
//! at most once. Recognizers drive the helper from their selection loop:
//! `enter` the group, `select` a member before parsing it, and check
//! `can_leave` once no member matches anymore.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strata_ir::{ElementId, Grammar, GrammarElement};
use tracing::trace;

/// Selection state of unordered groups during one parse.
pub trait UnorderedGroupHelper {
    /// Start a new activation of `group`. Activations nest.
    fn enter(&mut self, group: ElementId);

    /// End the innermost activation of `group`.
    fn leave(&mut self, group: ElementId);

    /// Mark member `index` of `group` as taken.
    fn select(&mut self, group: ElementId, index: usize);

    /// The selected member has been parsed.
    fn return_from_selection(&mut self, group: ElementId);

    /// Whether member `index` is still available.
    fn can_select(&self, group: ElementId, index: usize) -> bool;

    /// Whether every mandatory member has been selected.
    fn can_leave(&self, group: ElementId) -> bool;
}

/// Members of one activation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct MemberSet {
    words: SmallVec<[u64; 1]>,
}

impl MemberSet {
    fn insert(&mut self, index: usize) {
        let word = index / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % 64);
    }

    fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| w & (1 << (index % 64)) != 0)
    }
}

#[derive(Clone, Debug)]
struct GroupState {
    size: usize,
    mandatory: MemberSet,
    /// One entry per active activation, innermost last.
    activations: Vec<MemberSet>,
}

/// The default [`UnorderedGroupHelper`], prepared from a grammar.
#[derive(Clone, Debug, Default)]
pub struct UnorderedGroupState {
    groups: FxHashMap<ElementId, GroupState>,
}

impl UnorderedGroupState {
    /// Collect every unordered group of `grammar` and its mandatory members.
    pub fn for_grammar(grammar: &Grammar) -> Self {
        let mut groups = FxHashMap::default();
        for raw in 0..grammar.len() {
            let Ok(raw) = u32::try_from(raw) else { break };
            let id = ElementId::from_raw(raw);
            if let GrammarElement::UnorderedGroup { elements } = grammar.element(id) {
                let mut mandatory = MemberSet::default();
                for (index, member) in elements.iter().enumerate() {
                    if !grammar.cardinality(*member).is_optional() {
                        mandatory.insert(index);
                    }
                }
                groups.insert(
                    id,
                    GroupState {
                        size: elements.len(),
                        mandatory,
                        activations: Vec::new(),
                    },
                );
            }
        }
        UnorderedGroupState { groups }
    }

    fn active(&self, group: ElementId) -> Option<&MemberSet> {
        self.groups.get(&group)?.activations.last()
    }
}

impl UnorderedGroupHelper for UnorderedGroupState {
    fn enter(&mut self, group: ElementId) {
        if let Some(state) = self.groups.get_mut(&group) {
            state.activations.push(MemberSet::default());
            trace!(?group, depth = state.activations.len(), "enter unordered group");
        }
    }

    fn leave(&mut self, group: ElementId) {
        if let Some(state) = self.groups.get_mut(&group) {
            state.activations.pop();
        }
    }

    fn select(&mut self, group: ElementId, index: usize) {
        if let Some(state) = self.groups.get_mut(&group) {
            if let Some(selected) = state.activations.last_mut() {
                selected.insert(index);
            }
        }
    }

    fn return_from_selection(&mut self, group: ElementId) {
        trace!(?group, "return from unordered group selection");
    }

    fn can_select(&self, group: ElementId, index: usize) -> bool {
        let in_range = self.groups.get(&group).is_some_and(|s| index < s.size);
        in_range && self.active(group).is_some_and(|s| !s.contains(index))
    }

    fn can_leave(&self, group: ElementId) -> bool {
        let Some(state) = self.groups.get(&group) else {
            return true;
        };
        let Some(selected) = state.activations.last() else {
            return true;
        };
        (0..state.size).all(|i| !state.mandatory.contains(i) || selected.contains(i))
    }
}

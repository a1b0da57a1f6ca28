//! Follow sets for single-token recovery and rule resynchronization.
//!
//! Generated recognizers know the follow set of every match statically.
//! Follow sets may contain [`TokenType::EOR`], meaning "whatever may follow
//! the enclosing rule"; the follow stack resolves that marker at runtime.

use smallvec::SmallVec;
use std::fmt;
use strata_ir::TokenType;

/// A set of token types using a growable bitset.
///
/// Two inline words cover token types below 128 without allocating.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenSet {
    words: SmallVec<[u64; 2]>,
}

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub fn new() -> Self {
        TokenSet::default()
    }

    /// Create a set from a list of token types.
    pub fn of(kinds: &[TokenType]) -> Self {
        let mut set = TokenSet::new();
        for kind in kinds {
            set.insert(*kind);
        }
        set
    }

    /// Add a token type (builder pattern).
    #[must_use]
    pub fn with(mut self, kind: TokenType) -> Self {
        self.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: TokenType) {
        let (word, bit) = Self::locate(kind);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= bit;
    }

    pub fn remove(&mut self, kind: TokenType) {
        let (word, bit) = Self::locate(kind);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !bit;
        }
    }

    #[inline]
    pub fn contains(&self, kind: TokenType) -> bool {
        let (word, bit) = Self::locate(kind);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    pub fn union_with(&mut self, other: &TokenSet) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= *o;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Member token types in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.words.iter().enumerate().flat_map(|(word, bits)| {
            (0..64u16).filter_map(move |bit| {
                if bits & (1u64 << bit) == 0 {
                    return None;
                }
                u16::try_from(word * 64)
                    .ok()
                    .map(|base| TokenType(base + bit))
            })
        })
    }

    #[inline]
    fn locate(kind: TokenType) -> (usize, u64) {
        let raw = usize::from(kind.raw());
        (raw / 64, 1u64 << (raw % 64))
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Union the follow sets from the top of the stack down, continuing only
/// while each set contains the end-of-rule marker.
///
/// If every set on the stack allows the rule to end, end of input may
/// follow as well.
pub(crate) fn context_sensitive_follow(stack: &[TokenSet]) -> TokenSet {
    let mut follow = TokenSet::new();
    let mut exhausted = true;
    for set in stack.iter().rev() {
        follow.union_with(set);
        if !set.contains(TokenType::EOR) {
            exhausted = false;
            break;
        }
    }
    follow.remove(TokenType::EOR);
    if exhausted {
        follow.insert(TokenType::EOF);
    }
    follow
}

/// Union of every follow set on the stack: the resynchronization set.
pub(crate) fn error_recovery_set(stack: &[TokenSet]) -> TokenSet {
    let mut set = TokenSet::new();
    for follow in stack {
        set.union_with(follow);
    }
    set.remove(TokenType::EOR);
    set
}

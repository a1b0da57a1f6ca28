//! Byte ranges over the character stream a token list was lexed from.

use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// A byte offset that does not fit the 32-bit offsets spans use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("offset {offset} of {input_len}-byte range exceeds the 4 GiB input limit")]
pub struct SpanError {
    pub offset: usize,
    pub input_len: usize,
}

/// Half-open byte range `start..end` into the input.
///
/// Synthetic tokens and empty composites use zero-width spans.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    #[inline]
    pub const fn point(offset: u32) -> Self {
        Span::new(offset, offset)
    }

    /// Convert a lexer's `usize` range.
    pub fn try_from_range(range: Range<usize>) -> Result<Self, SpanError> {
        let narrow = |offset: usize| {
            u32::try_from(offset).map_err(|_| SpanError {
                offset,
                input_len: range.end,
            })
        };
        Ok(Span::new(narrow(range.start)?, narrow(range.end)?))
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies inside the range. Zero-width spans contain
    /// nothing.
    #[inline]
    pub const fn contains(self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The text this span covers in `source`, if it lies inside it on
    /// character boundaries.
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

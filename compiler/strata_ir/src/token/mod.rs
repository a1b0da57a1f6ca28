//! Token types for the token source feeding the parser.
//!
//! The parser runtime never lexes. A [`TokenSource`] produces immutable
//! [`Token`]s: a type tag, a channel, a byte span and a stream index. Token
//! text is always sliced out of the original input, which keeps tokens
//! `Copy` and lets the tree reproduce the input byte-for-byte.

mod list;

pub use list::{TokenList, TokenSource};

use std::fmt;

use super::Span;

/// Token type tag as assigned by the lexer.
///
/// A handful of values are reserved by the runtime; generated lexers
/// number their token types from [`TokenType::MIN_USER`] upwards.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TokenType(pub u16);

impl TokenType {
    /// A character sequence the lexer could not tokenize.
    pub const INVALID: TokenType = TokenType(0);
    /// End of input. Never part of a token list; synthesized by the cursor.
    pub const EOF: TokenType = TokenType(1);
    /// End-of-rule marker used inside follow sets.
    pub const EOR: TokenType = TokenType(2);
    /// First token type available to lexers.
    pub const MIN_USER: u16 = 4;

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_eof(self) -> bool {
        self.0 == Self::EOF.0
    }

    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TokenType::INVALID => write!(f, "INVALID"),
            TokenType::EOF => write!(f, "EOF"),
            TokenType::EOR => write!(f, "EOR"),
            TokenType(raw) => write!(f, "T{raw}"),
        }
    }
}

/// Channel a token was emitted on.
///
/// Hidden tokens (whitespace, comments) are invisible to grammar rules but
/// still end up as leaves in the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    #[default]
    Default,
    Hidden,
}

/// Position of a token in its source stream. Doubles as token identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TokenIndex(u32);

impl TokenIndex {
    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenIndex(index)
    }

    /// Create from a `usize` stream position.
    ///
    /// # Panics
    /// Panics if the position exceeds `u32::MAX`.
    #[inline]
    pub fn from_usize(index: usize) -> Self {
        let raw = u32::try_from(index)
            .unwrap_or_else(|_| panic!("token index {index} exceeds u32::MAX"));
        TokenIndex(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// An immutable unit produced by the token source.
///
/// `index` is `None` only for synthesized tokens: the end-of-input token and
/// placeholders inserted by missing-token recovery. Synthesized tokens never
/// become leaves.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenType,
    pub channel: Channel,
    pub span: Span,
    pub index: Option<TokenIndex>,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenType, channel: Channel, span: Span, index: TokenIndex) -> Self {
        Token {
            kind,
            channel,
            span,
            index: Some(index),
        }
    }

    /// The end-of-input token, positioned at `offset`.
    pub fn eof(offset: u32) -> Self {
        Token {
            kind: TokenType::EOF,
            channel: Channel::Default,
            span: Span::point(offset),
            index: None,
        }
    }

    /// A zero-width placeholder of the given type, positioned at `offset`.
    pub fn synthetic(kind: TokenType, offset: u32) -> Self {
        Token {
            kind,
            channel: Channel::Default,
            span: Span::point(offset),
            index: None,
        }
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.index.is_none()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)?;
        if self.is_hidden() {
            write!(f, " (hidden)")?;
        }
        Ok(())
    }
}

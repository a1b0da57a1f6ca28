//! The token source seam and its vector-backed implementation.

use rustc_hash::FxHashMap;

use super::{Channel, Token, TokenIndex, TokenType};
use crate::Span;

/// A stream of tokens supporting random access by index.
///
/// This is the boundary to the lexer. Implementations must return tokens
/// in document order, with spans that tile the source text exactly
/// (hidden tokens included), and must not include an end-of-input token.
pub trait TokenSource {
    /// Number of real tokens in the stream.
    fn token_count(&self) -> usize;

    /// Token at stream position `index`, if any.
    fn token(&self, index: usize) -> Option<&Token>;

    /// The complete original input.
    fn source_text(&self) -> &str;

    /// Lexer diagnostic for an [`TokenType::INVALID`] token.
    fn lexer_error(&self, _index: TokenIndex) -> Option<&str> {
        None
    }

    /// Text covered by `token`. Synthesized tokens have no text.
    fn text_of(&self, token: &Token) -> &str {
        token.span.slice(self.source_text()).unwrap_or("")
    }
}

/// Tokens of one input, in document order, with the input they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    source: String,
    tokens: Vec<Token>,
    lexer_errors: FxHashMap<TokenIndex, String>,
}

impl TokenList {
    /// Create an empty list over `source`.
    pub fn new(source: impl Into<String>) -> Self {
        TokenList {
            source: source.into(),
            tokens: Vec::new(),
            lexer_errors: FxHashMap::default(),
        }
    }

    /// Append a token and return its index.
    pub fn push(&mut self, kind: TokenType, channel: Channel, span: Span) -> TokenIndex {
        let index = TokenIndex::from_usize(self.tokens.len());
        debug_assert!(
            self.tokens.last().map_or(0, |t| t.span.end) == span.start,
            "tokens must tile the source: expected start {}, got {}",
            self.tokens.last().map_or(0, |t| t.span.end),
            span.start
        );
        self.tokens.push(Token::new(kind, channel, span, index));
        index
    }

    /// Append an invalid token carrying the lexer's message.
    pub fn push_invalid(&mut self, span: Span, message: impl Into<String>) -> TokenIndex {
        let index = self.push(TokenType::INVALID, Channel::Default, span);
        self.lexer_errors.insert(index, message.into());
        index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

impl TokenSource for TokenList {
    fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    fn source_text(&self) -> &str {
        &self.source
    }

    fn lexer_error(&self, index: TokenIndex) -> Option<&str> {
        self.lexer_errors.get(&index).map(String::as_str)
    }
}

//! Token cursor for navigating the token stream.
//!
//! The cursor only ever rests on default-channel tokens; hidden tokens are
//! stepped over by [`TokenCursor::consume`] and picked up later when leaves
//! are created. Every lookahead request (`la`/`lt` with a positive offset)
//! is recorded so that the driver can attribute speculative decisions to
//! tree nodes.

use strata_ir::{Token, TokenSource, TokenType};
use tracing::trace;

/// Cursor over a [`TokenSource`] with lookahead recording.
pub struct TokenCursor<'a> {
    tokens: &'a dyn TokenSource,
    /// Index of `LT(1)`, or `token_count()` at end of input.
    pos: usize,
    /// Tokens inspected for decisions since the last reset, in request order.
    lookahead: Vec<Token>,
    eof: Token,
}

impl<'a> TokenCursor<'a> {
    /// Create a cursor positioned on the first visible token.
    pub fn new(tokens: &'a dyn TokenSource) -> Self {
        let end = u32::try_from(tokens.source_text().len()).unwrap_or(u32::MAX);
        let mut cursor = TokenCursor {
            tokens,
            pos: 0,
            lookahead: Vec::new(),
            eof: Token::eof(end),
        };
        cursor.pos = cursor.next_visible(0);
        cursor
    }

    /// Number of real tokens. The synthesized end-of-input token is not counted.
    #[inline]
    pub fn size(&self) -> usize {
        self.tokens.token_count()
    }

    /// Stream index of `LT(1)`.
    #[inline]
    pub fn index(&self) -> usize {
        self.pos
    }

    /// Token at stream index `index`, hidden or not.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a Token> {
        self.tokens.token(index)
    }

    pub fn source(&self) -> &'a dyn TokenSource {
        self.tokens
    }

    /// Type of `LT(i)`, recording the inspected token as lookahead.
    pub fn la(&mut self, i: isize) -> TokenType {
        self.lt(i).kind
    }

    /// `LT(i)`, recording the inspected token as lookahead.
    ///
    /// `LT(-1)` is the last visible token before the cursor. `LT(0)` is
    /// undefined and yields end of input.
    pub fn lt(&mut self, i: isize) -> Token {
        let token = self.peek(i);
        if i > 0 {
            self.record(token);
        }
        token
    }

    /// Like [`TokenCursor::lt`] but without recording.
    pub fn peek(&self, i: isize) -> Token {
        if i == 0 {
            return self.eof;
        }
        if i < 0 {
            return self.look_back(i.unsigned_abs()).unwrap_or(self.eof);
        }
        let mut index = self.pos;
        for _ in 1..i {
            if index >= self.size() {
                break;
            }
            index = self.next_visible(index + 1);
        }
        self.get(index).copied().unwrap_or(self.eof)
    }

    /// The last visible token before the cursor, if any.
    pub fn previous_visible(&self) -> Option<Token> {
        self.look_back(1)
    }

    /// Move past `LT(1)` and any hidden tokens after it.
    pub fn consume(&mut self) {
        if self.pos >= self.size() {
            return;
        }
        trace!(index = self.pos, kind = ?self.tokens.token(self.pos).map(|t| t.kind), "consume");
        self.pos = self.next_visible(self.pos + 1);
    }

    /// Move to the end of the stream.
    pub fn consume_all(&mut self) {
        self.pos = self.size();
    }

    /// Tokens recorded as lookahead since the last reset.
    pub fn lookahead_tokens(&self) -> &[Token] {
        &self.lookahead
    }

    /// Number of tokens recorded as lookahead since the last reset.
    #[inline]
    pub fn current_lookahead(&self) -> usize {
        self.lookahead.len()
    }

    pub fn reset_lookahead(&mut self) {
        self.lookahead.clear();
    }

    pub fn remove_last_lookahead_token(&mut self) {
        self.lookahead.pop();
    }

    fn record(&mut self, token: Token) {
        // End of input never becomes a leaf, so it is never lookahead.
        if token.is_synthetic() {
            return;
        }
        if !self.lookahead.iter().any(|t| t.index == token.index) {
            self.lookahead.push(token);
        }
    }

    fn next_visible(&self, from: usize) -> usize {
        let mut index = from;
        while let Some(token) = self.tokens.token(index) {
            if !token.is_hidden() {
                return index;
            }
            index += 1;
        }
        self.size()
    }

    fn look_back(&self, n: usize) -> Option<Token> {
        let mut seen = 0;
        let mut index = self.pos.min(self.size());
        while index > 0 {
            index -= 1;
            let token = self.tokens.token(index)?;
            if !token.is_hidden() {
                seen += 1;
                if seen == n {
                    return Some(*token);
                }
            }
        }
        None
    }
}

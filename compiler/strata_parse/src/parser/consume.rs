//! Turning tokens into leaves.
//!
//! Every token of the stream ends up in exactly one leaf. Matched tokens
//! get their leaf from the recognizer; hidden and skipped tokens in front
//! of them are interleaved on the way, and whatever is left after the entry
//! rule is swept up when the parse is sealed.

use strata_diagnostic::ErrorCode;
use strata_ir::{ElementId, Token, TokenIndex};
use tracing::trace;

use super::Parser;
use crate::node::{Leaf, NodeId, SyntaxErrorMessage};

impl Parser<'_> {
    /// Create the leaf for a matched token.
    ///
    /// Hidden and skipped tokens since the last leaf are added first.
    /// Synthetic tokens inserted by recovery and tokens that already have a
    /// leaf are ignored.
    pub fn new_leaf_node(&mut self, token: Token, element: ElementId) {
        let Some(token_index) = token.index else {
            return;
        };
        let index = token_index.as_usize();
        if self.last_consumed_index.is_some_and(|last| index <= last) {
            return;
        }
        let start = self.next_unconsumed();
        for between in start..index {
            self.append_token(between);
        }
        let feature = self.grammar().feature_name(element).map(str::to_owned);
        let leaf = self.create_leaf(&token, token_index, Some(element), feature);
        self.last_consumed_index = Some(index);
        self.last_consumed_node = Some(leaf);
    }

    /// Add leaves for tokens consumed without a match, up to and including
    /// the last visible token before the cursor.
    pub fn append_skipped_tokens(&mut self) {
        let Some(previous) = self.cursor.previous_visible() else {
            return;
        };
        let Some(end) = previous.index.map(|i| i.as_usize()) else {
            return;
        };
        let start = self.next_unconsumed();
        for index in start..=end {
            self.append_token(index);
        }
        if start <= end {
            self.last_consumed_index = Some(end);
        }
    }

    /// Add leaves for the hidden tokens after the last visible token.
    pub fn append_trailing_hidden_tokens(&mut self) {
        let Some(previous) = self.cursor.previous_visible().and_then(|t| t.index) else {
            return;
        };
        let start = self.next_unconsumed().max(previous.as_usize() + 1);
        for index in start..self.cursor.size() {
            self.append_token(index);
            self.last_consumed_index = Some(index);
        }
    }

    /// Add leaves for every remaining token and attach a still pending
    /// error to the end of the current composite.
    pub fn append_all_tokens(&mut self) {
        let start = self.next_unconsumed();
        for index in start..self.cursor.size() {
            self.append_token(index);
            self.last_consumed_index = Some(index);
        }
        self.cursor.consume_all();
        if let Some(error) = self.pending_error.take() {
            let target = self.nodes.last_leaf(self.current).unwrap_or(self.current);
            self.nodes.set_syntax_error(target, error);
        }
    }

    fn next_unconsumed(&self) -> usize {
        self.last_consumed_index.map_or(0, |last| last + 1)
    }

    /// Leaf for a token the recognizer did not match.
    fn append_token(&mut self, index: usize) {
        let Some(token) = self.cursor.get(index).copied() else {
            return;
        };
        if let Some(token_index) = token.index {
            self.create_leaf(&token, token_index, None, None);
        }
    }

    fn create_leaf(
        &mut self,
        token: &Token,
        index: TokenIndex,
        element: Option<ElementId>,
        feature: Option<String>,
    ) -> NodeId {
        let hidden = token.is_hidden();
        let mut error = if hidden {
            None
        } else {
            self.pending_error.take()
        };
        if token.kind.is_invalid() {
            let lexer = SyntaxErrorMessage::new(
                self.cursor.source().lexer_error(index).unwrap_or("invalid token"),
                Some(ErrorCode::E0001),
            );
            error = Some(match error {
                Some(mut syntax) => {
                    syntax.merge(lexer);
                    syntax
                }
                None => lexer,
            });
        }
        let element = element.or_else(|| {
            let rule = self.recognizer.config.lexer_rule(token.kind)?;
            self.grammar().rule(rule)
        });

        let leaf = Leaf {
            token: index,
            kind: token.kind,
            span: token.span,
            hidden,
            feature,
        };
        let id = self.nodes.new_leaf(leaf, element, error, self.current);
        trace!(index = index.raw(), kind = ?token.kind, hidden, "leaf");
        self.lookahead.token_consumed(index, id, &mut self.nodes);
        id
    }
}

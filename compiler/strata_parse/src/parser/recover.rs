//! Token matching and error recovery.
//!
//! A failed match first tries single-token deletion (the next token is the
//! expected one) and then single-token insertion (the current token may
//! follow the missing one). Only when neither applies does the match fail;
//! rules that catch the failure resynchronize on the follow stack.

use strata_ir::{ElementId, Token, TokenType};
use tracing::debug;

use super::Parser;
use crate::error::{
    ParseError, ParserErrorContext, RecognitionError, RecognitionErrorKind,
    UnorderedGroupErrorContext,
};
use crate::node::SyntaxErrorMessage;
use crate::recovery::{context_sensitive_follow, error_recovery_set, TokenSet};

impl Parser<'_> {
    /// Match `LT(1)` against `expected`, recovering from a single extra or
    /// missing token.
    ///
    /// Returns the matched token, or a synthetic token if the expected one
    /// was missing. The matched token itself is not recorded as lookahead.
    pub fn match_token(
        &mut self,
        expected: TokenType,
        follow: &TokenSet,
    ) -> Result<Token, RecognitionError> {
        let before = self.cursor.current_lookahead();
        let result = self.match_or_recover(expected, follow);
        if self.cursor.current_lookahead() > before {
            self.cursor.remove_last_lookahead_token();
        }
        result
    }

    fn match_or_recover(
        &mut self,
        expected: TokenType,
        follow: &TokenSet,
    ) -> Result<Token, RecognitionError> {
        let token = self.cursor.lt(1);
        if token.kind == expected {
            self.cursor.consume();
            self.error_recovery = false;
            return Ok(token);
        }

        if self.cursor.peek(2).kind == expected {
            let error = RecognitionError::new(
                RecognitionErrorKind::UnwantedToken { expecting: expected },
                token,
                self.cursor.index(),
            );
            debug!(offset = token.span.start, ?expected, "deleting extraneous token");
            self.cursor.consume();
            self.report_error(&error);
            let matched = self.cursor.peek(1);
            self.cursor.consume();
            return Ok(matched);
        }

        if self.is_missing_token(follow) {
            let inserted = Token::synthetic(expected, token.span.start);
            let error = RecognitionError::new(
                RecognitionErrorKind::MissingToken {
                    expecting: expected,
                    inserted,
                },
                token,
                self.cursor.index(),
            );
            debug!(offset = token.span.start, ?expected, "inserting missing token");
            self.report_error(&error);
            return Ok(inserted);
        }

        Err(RecognitionError::new(
            RecognitionErrorKind::MismatchedToken { expecting: expected },
            token,
            self.cursor.index(),
        ))
    }

    /// Whether `LT(1)` could follow the token that is missing.
    fn is_missing_token(&self, follow: &TokenSet) -> bool {
        let mut follow = follow.clone();
        if follow.contains(TokenType::EOR) {
            follow.union_with(&context_sensitive_follow(&self.follow));
            if !self.follow.is_empty() {
                follow.remove(TokenType::EOR);
            }
        }
        follow.contains(self.cursor.peek(1).kind) || follow.contains(TokenType::EOR)
    }

    /// Record `error` unless the parser is already recovering.
    ///
    /// The first error since the last successful match wins; it waits in
    /// the pending slot until the next visible leaf is created.
    pub fn report_error(&mut self, error: &RecognitionError) {
        if self.error_recovery {
            return;
        }
        self.error_recovery = true;
        if self.pending_error.is_none() {
            self.pending_error = Some(self.error_message(error));
        }
    }

    /// Resynchronize after `error`: skip tokens until one in the follow
    /// stack appears.
    pub fn recover(&mut self, error: &RecognitionError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(self.error_message(error));
        }
        if self.last_error_index == Some(self.cursor.index()) {
            self.cursor.consume();
        }
        self.last_error_index = Some(self.cursor.index());
        let resync = error_recovery_set(&self.follow);
        let start = self.cursor.index();
        loop {
            let kind = self.cursor.peek(1).kind;
            if kind.is_eof() || resync.contains(kind) {
                break;
            }
            self.cursor.consume();
        }
        debug!(
            from = start,
            to = self.cursor.index(),
            "resynchronized after {}",
            error
        );
    }

    /// The catch path of a rule: recover from a recognition error and add
    /// the skipped tokens to the tree. Other errors pass through.
    ///
    /// Returns `Ok(None)` if the rule failed and was recovered.
    pub fn catch_rule<T>(&mut self, result: Result<T, ParseError>) -> Result<Option<T>, ParseError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ParseError::Recognition(error)) => {
                self.recover(&error);
                self.append_skipped_tokens();
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    pub fn push_follow(&mut self, follow: TokenSet) {
        self.follow.push(follow);
    }

    pub fn pop_follow(&mut self) {
        self.follow.pop();
    }

    /// No alternative of `decision` matches `LT(1)`.
    #[cold]
    pub fn no_viable_alternative(&self, decision: u32) -> RecognitionError {
        self.error_at_cursor(RecognitionErrorKind::NoViableAlt { decision })
    }

    /// The `(...)+` loop of `decision` matched nothing.
    #[cold]
    pub fn early_exit(&self, decision: u32) -> RecognitionError {
        self.error_at_cursor(RecognitionErrorKind::EarlyExit { decision })
    }

    #[cold]
    pub fn failed_predicate(&self, rule: &str, predicate: &str) -> RecognitionError {
        self.error_at_cursor(RecognitionErrorKind::FailedPredicate {
            rule: rule.to_owned(),
            predicate: predicate.to_owned(),
            group: None,
        })
    }

    /// The unordered `group` of `rule` cannot be left: mandatory members
    /// are missing.
    ///
    /// The error is reported right away, while the group is still active,
    /// so that the message can list the missing members.
    #[cold]
    pub fn unordered_group_failure(&mut self, rule: ElementId, group: ElementId) -> RecognitionError {
        let grammar = self.grammar();
        let error = self.error_at_cursor(RecognitionErrorKind::FailedPredicate {
            rule: grammar.rule_name(rule).unwrap_or_default().to_owned(),
            predicate: format!("canLeave({})", grammar.describe(group)),
            group: Some(group),
        });
        self.report_error(&error);
        error
    }

    fn error_at_cursor(&self, kind: RecognitionErrorKind) -> RecognitionError {
        RecognitionError::new(kind, self.cursor.peek(1), self.cursor.index())
    }

    fn error_message(&self, error: &RecognitionError) -> SyntaxErrorMessage {
        let recognizer = self.recognizer;
        let context = ParserErrorContext::new(
            error,
            self.view(self.current),
            &recognizer.config,
            self.cursor.source(),
        );
        match error.kind {
            RecognitionErrorKind::FailedPredicate {
                group: Some(group), ..
            } => {
                let grammar = &recognizer.grammar;
                let missing = grammar
                    .group_members(group)
                    .iter()
                    .enumerate()
                    .filter(|(index, member)| {
                        !grammar.cardinality(**member).is_optional()
                            && self.unordered.can_select(group, *index)
                    })
                    .map(|(_, member)| *member)
                    .collect();
                let context = UnorderedGroupErrorContext::new(context, group, missing, grammar);
                recognizer.provider.unordered_group_error(&context)
            }
            _ => recognizer.provider.parser_error(&context),
        }
    }
}

//! Rendering of syntax error messages.

use strata_diagnostic::ErrorCode;

use super::{
    ParserErrorContext, RecognitionErrorKind, UnorderedGroupErrorContext,
    ValueConverterErrorContext,
};
use crate::node::SyntaxErrorMessage;

/// Turns error contexts into the messages attached to the tree.
///
/// Every method has a default, so a provider only overrides the cases it
/// wants to phrase differently.
pub trait SyntaxErrorMessageProvider {
    fn parser_error(&self, context: &ParserErrorContext<'_>) -> SyntaxErrorMessage {
        let code = match context.recognition_error().kind {
            RecognitionErrorKind::MismatchedToken { .. } => ErrorCode::E1001,
            RecognitionErrorKind::UnwantedToken { .. } => ErrorCode::E1002,
            RecognitionErrorKind::MissingToken { .. } => ErrorCode::E1003,
            RecognitionErrorKind::NoViableAlt { .. } => ErrorCode::E1004,
            RecognitionErrorKind::EarlyExit { .. } => ErrorCode::E1006,
            RecognitionErrorKind::FailedPredicate { .. } => ErrorCode::E1007,
        };
        SyntaxErrorMessage::new(context.default_message(), Some(code))
    }

    fn unordered_group_error(&self, context: &UnorderedGroupErrorContext<'_>) -> SyntaxErrorMessage {
        SyntaxErrorMessage::new(context.default_message(), Some(ErrorCode::E1005))
    }

    fn value_conversion_error(
        &self,
        context: &ValueConverterErrorContext<'_>,
    ) -> SyntaxErrorMessage {
        SyntaxErrorMessage::new(context.default_message(), Some(ErrorCode::E2001))
    }
}

/// Uses the default message of every context.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultMessageProvider;

impl SyntaxErrorMessageProvider for DefaultMessageProvider {}

//! Parser integration runtime.
//!
//! Turns a token stream into a concrete syntax tree that covers every
//! character of the input, including hidden tokens and tokens skipped
//! during error recovery, while driving a [`SemanticFactory`] to build the
//! semantic model. Recognition errors are recovered and attached to tree
//! nodes instead of aborting the parse.
//!
//! The pieces:
//! - [`Recognizer`] / [`Parser`]: the parse driver rule procedures call into
//! - [`Cst`] / [`NodeRef`]: the finished tree and its read-only view
//! - [`TokenCursor`] / [`TokenSet`]: token access and follow sets
//! - [`SyntaxErrorMessageProvider`]: customizable error messages

mod config;
mod cursor;
mod error;
mod invariant;
mod lookahead;
mod node;
mod parser;
mod recovery;
pub mod semantic;
mod unordered;

pub use config::ParserConfig;
pub use cursor::TokenCursor;
pub use error::{
    DefaultMessageProvider, InvariantViolation, ParseError, ParserErrorContext, RecognitionError,
    RecognitionErrorKind, SyntaxErrorMessageProvider, UnorderedGroupErrorContext,
    ValueConverterErrorContext,
};
pub use node::{Cst, Descendants, NodeId, NodeRef, SyntaxErrorMessage};
pub use parser::{
    normalize_entry_rule_name, ParseResult, ParseStats, Parser, Recognizer, RuleProcedure,
    RuleResult, RuleTable,
};
pub use recovery::TokenSet;
pub use semantic::{SemanticFactory, SemanticId, SemanticValue, ValueConversionError};
pub use unordered::{UnorderedGroupHelper, UnorderedGroupState};

#[cfg(test)]
mod tests;

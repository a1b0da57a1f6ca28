//! Errors raised while parsing.
//!
//! Recoverable syntax and conversion errors never surface here: they are
//! attached to tree nodes as [`SyntaxErrorMessage`](crate::SyntaxErrorMessage)s.
//! [`ParseError`] is reserved for failures that end the parse.

mod context;
mod message;

pub use context::{ParserErrorContext, UnorderedGroupErrorContext, ValueConverterErrorContext};
pub use message::{DefaultMessageProvider, SyntaxErrorMessageProvider};

use std::fmt;
use strata_ir::{ElementId, Token, TokenType};
use thiserror::Error;

use crate::node::NodeId;
use crate::semantic::ValueConversionError;

/// A failure that aborts the parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No recovery heuristic applied.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("unknown entry rule `{0}`")]
    UnknownRule(String),

    /// Two registered rules share an entry rule name.
    #[error("entry rule `{0}` is already registered")]
    DuplicateRule(String),

    /// The semantic factory reported an unrecoverable failure.
    #[error("internal error during value conversion: {0}")]
    Internal(#[source] ValueConversionError),

    #[error("reassignment of semantic element on node {node:?}")]
    Reassignment { node: NodeId },

    #[error("syntax tree is malformed: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// A recognition failure at `token`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at offset {}", .token.span.start)]
pub struct RecognitionError {
    pub kind: RecognitionErrorKind,
    /// The offending token. Synthetic for end of input.
    pub token: Token,
    /// Stream index of the cursor when the error was raised.
    pub index: usize,
}

impl RecognitionError {
    #[cold]
    pub fn new(kind: RecognitionErrorKind, token: Token, index: usize) -> Self {
        RecognitionError { kind, token, index }
    }

    /// The token type the recognizer was looking for, if there was one.
    pub fn expecting(&self) -> Option<TokenType> {
        match self.kind {
            RecognitionErrorKind::MismatchedToken { expecting }
            | RecognitionErrorKind::UnwantedToken { expecting }
            | RecognitionErrorKind::MissingToken { expecting, .. } => Some(expecting),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    MismatchedToken {
        expecting: TokenType,
    },
    /// `LT(1)` was extra; `LT(2)` is what the recognizer wanted.
    UnwantedToken {
        expecting: TokenType,
    },
    /// The expected token was absent and `inserted` stands in for it.
    MissingToken {
        expecting: TokenType,
        inserted: Token,
    },
    NoViableAlt {
        decision: u32,
    },
    /// A `(...)+` loop matched nothing.
    EarlyExit {
        decision: u32,
    },
    FailedPredicate {
        rule: String,
        predicate: String,
        /// Unordered group whose selection predicate failed.
        group: Option<ElementId>,
    },
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionErrorKind::MismatchedToken { expecting } => {
                write!(f, "mismatched token, expecting {expecting:?}")
            }
            RecognitionErrorKind::UnwantedToken { expecting } => {
                write!(f, "unwanted token, expecting {expecting:?}")
            }
            RecognitionErrorKind::MissingToken { expecting, .. } => {
                write!(f, "missing token {expecting:?}")
            }
            RecognitionErrorKind::NoViableAlt { decision } => {
                write!(f, "no viable alternative (decision {decision})")
            }
            RecognitionErrorKind::EarlyExit { decision } => {
                write!(f, "loop matched nothing (decision {decision})")
            }
            RecognitionErrorKind::FailedPredicate { rule, predicate, .. } => {
                write!(f, "rule {rule} failed predicate {{{predicate}}}?")
            }
        }
    }
}

/// A structural defect found in a sealed tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root node has parent {parent:?}")]
    RootHasParent { parent: NodeId },

    #[error("node {node:?} has parent {found:?}, expected {expected:?}")]
    BrokenParent {
        node: NodeId,
        expected: NodeId,
        found: Option<NodeId>,
    },

    #[error("node {node:?} is reachable more than once")]
    DuplicateNode { node: NodeId },

    #[error("leaf {node:?} starts at {found}, expected {expected}")]
    Gap {
        node: NodeId,
        expected: u32,
        found: u32,
    },

    #[error("leaf {node:?} has token {found} after token {previous}")]
    TokenOrder {
        node: NodeId,
        previous: u32,
        found: u32,
    },

    #[error("leaves cover {covered} of {length} bytes")]
    IncompleteCoverage { covered: u32, length: u32 },

    #[error("semantic element bound to detached node {node:?}")]
    DetachedSemanticNode { node: NodeId },
}

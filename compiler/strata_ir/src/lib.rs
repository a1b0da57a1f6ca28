//! Strata IR - shared data types for the parser runtime
//!
//! This crate contains the inputs the runtime consumes:
//! - Spans over the original character stream
//! - Tokens, token types and the [`TokenSource`] seam to the lexer
//! - The static grammar description the parser refers to
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: grammar elements live in one arena and are
//!   addressed by `ElementId(u32)`
//! - **Never copy text**: tokens carry spans; text is sliced from the input

pub mod grammar;
mod span;
mod token;

pub use grammar::{
    AssignOp, Cardinality, ElementId, Grammar, GrammarBuilder, GrammarElement, RuleKind,
};
pub use span::{Span, SpanError};
pub use token::{Channel, Token, TokenIndex, TokenList, TokenSource, TokenType};

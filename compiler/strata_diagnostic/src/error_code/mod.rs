//! Issue codes for all parser diagnostics.
//!
//! Each code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating where the problem was detected.

use std::fmt;

/// Issue codes attached to syntax errors.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Syntax errors found by the recognizer
/// - E2xxx: Errors found while building semantic elements
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Character sequence the lexer could not tokenize
    E0001,

    // Syntax Errors (E1xxx)
    /// Mismatched input
    E1001,
    /// Extraneous input
    E1002,
    /// Missing token
    E1003,
    /// No viable alternative
    E1004,
    /// Unordered group is missing mandatory members
    E1005,
    /// Required loop did not match at least once
    E1006,
    /// Semantic predicate failed
    E1007,

    // Semantic Errors (E2xxx)
    /// Token text could not be converted to a value
    E2001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E2001,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
        }
    }

    /// One-line description for explain output.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "invalid token",
            ErrorCode::E1001 => "mismatched input",
            ErrorCode::E1002 => "extraneous input",
            ErrorCode::E1003 => "missing token",
            ErrorCode::E1004 => "no viable alternative",
            ErrorCode::E1005 => "incomplete unordered group",
            ErrorCode::E1006 => "required element missing",
            ErrorCode::E1007 => "failed predicate",
            ErrorCode::E2001 => "value conversion failed",
        }
    }

    /// Check if this is a lexer error (E0xxx range).
    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a syntax error (E1xxx range).
    pub fn is_syntax_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this was produced while building semantic elements (E2xxx range).
    pub fn is_semantic_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Parse an issue code string (e.g., "E1001") back to an `ErrorCode`.
    pub fn from_code_str(s: &str) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|code| code.as_str() == s)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Diagnostic system for syntax error reporting.
//!
//! Every syntax error the parser attaches to a tree node carries an
//! [`ErrorCode`] for searchability. Finished trees convert their errors
//! into [`Diagnostic`]s, which an emitter renders with line and column
//! information computed from the original input.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;

//! The narrow interface through which the parser builds semantic elements.
//!
//! The parser never inspects feature values. It hands raw token text or
//! element handles to a [`SemanticFactory`], which converts and stores them
//! and may reject a value with a [`ValueConversionError`].

mod convert;
mod model;

pub use convert::{
    DecimalConverter, FractionConverter, IdConverter, IntConverter, StringConverter,
    ValueConverter, ValueConverterRegistry,
};
pub use model::{DynamicModel, ModelElement, Value};

use std::fmt;
use thiserror::Error;

use crate::node::{NodeId, NodeRef};

/// Handle of a semantic element created by a [`SemanticFactory`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SemanticId(u32);

impl SemanticId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SemanticId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SemanticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SemanticId({})", self.0)
    }
}

/// A value handed to a feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SemanticValue {
    /// Another semantic element, produced by a called rule.
    Element(SemanticId),
    /// Unconverted text of a terminal or datatype rule.
    Text(String),
    /// The presence flag of a `?=` assignment.
    Bool(bool),
}

/// Rejection of a value by a [`SemanticFactory`].
///
/// Recoverable by default: the parser turns it into a syntax error on the
/// offending node and keeps going. An error built with
/// [`ValueConversionError::internal`] aborts the parse instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValueConversionError {
    message: String,
    node: Option<NodeId>,
    internal: bool,
}

impl ValueConversionError {
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        ValueConversionError {
            message: message.into(),
            node: None,
            internal: false,
        }
    }

    /// A failure that cannot be reported as a syntax error.
    #[cold]
    pub fn internal(message: impl Into<String>) -> Self {
        ValueConversionError {
            internal: true,
            ..Self::new(message)
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach `node` unless a node is already set.
    #[must_use]
    pub fn or_node(mut self, node: NodeId) -> Self {
        self.node = self.node.or(Some(node));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Node the error belongs to, if the factory knew it.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

/// Creates and mutates semantic elements on behalf of the parser.
///
/// `rule_name` names the rule whose text produced a `Text` value; factories
/// use it to pick a value converter. `node` is the tree node the value was
/// read from, for error attribution.
pub trait SemanticFactory {
    fn create(&mut self, classifier: &str) -> Result<SemanticId, ValueConversionError>;

    /// Assign a single-valued feature.
    fn set(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeRef<'_>,
    ) -> Result<(), ValueConversionError>;

    /// Append to a multi-valued feature.
    fn add(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeRef<'_>,
    ) -> Result<(), ValueConversionError>;
}

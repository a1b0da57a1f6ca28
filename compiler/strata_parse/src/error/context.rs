//! What a message provider gets to see when an error is reported.

use std::borrow::Cow;
use strata_ir::{ElementId, Grammar, Token, TokenSource, TokenType};

use super::{RecognitionError, RecognitionErrorKind};
use crate::config::ParserConfig;
use crate::node::NodeRef;
use crate::semantic::{SemanticId, ValueConversionError};

/// A recognition error together with the parser state it occurred in.
#[derive(Clone, Copy)]
pub struct ParserErrorContext<'a> {
    error: &'a RecognitionError,
    node: NodeRef<'a>,
    config: &'a ParserConfig,
    tokens: &'a dyn TokenSource,
}

impl<'a> ParserErrorContext<'a> {
    pub(crate) fn new(
        error: &'a RecognitionError,
        node: NodeRef<'a>,
        config: &'a ParserConfig,
        tokens: &'a dyn TokenSource,
    ) -> Self {
        ParserErrorContext {
            error,
            node,
            config,
            tokens,
        }
    }

    pub fn recognition_error(&self) -> &'a RecognitionError {
        self.error
    }

    /// The composite that was open when the error occurred.
    pub fn current_node(&self) -> NodeRef<'a> {
        self.node
    }

    /// The semantic element under construction, if any.
    pub fn current_context(&self) -> Option<SemanticId> {
        self.node.enclosing_semantic_element()
    }

    /// Readable name of a token type.
    pub fn token_name(&self, kind: TokenType) -> Cow<'a, str> {
        self.config.token_name(kind)
    }

    /// A token as shown in messages: its quoted text with line breaks and
    /// tabs escaped.
    pub fn token_display(&self, token: &Token) -> String {
        let text: Cow<'_, str> = if token.kind.is_eof() {
            Cow::Borrowed("<EOF>")
        } else if token.is_synthetic() {
            Cow::Owned(format!("<missing {}>", self.token_name(token.kind)))
        } else {
            Cow::Borrowed(self.tokens.text_of(token))
        };
        let escaped = text
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        format!("'{escaped}'")
    }

    /// The message used when the provider has nothing better to say.
    pub fn default_message(&self) -> String {
        let found = self.token_display(&self.error.token);
        match &self.error.kind {
            RecognitionErrorKind::UnwantedToken { expecting } => {
                format!("extraneous input {found} expecting {}", self.token_name(*expecting))
            }
            RecognitionErrorKind::MissingToken { expecting, .. } => {
                format!("missing {} at {found}", self.token_name(*expecting))
            }
            RecognitionErrorKind::MismatchedToken { expecting } => {
                format!("mismatched input {found} expecting {}", self.token_name(*expecting))
            }
            RecognitionErrorKind::NoViableAlt { .. } => {
                format!("no viable alternative at input {found}")
            }
            RecognitionErrorKind::EarlyExit { .. } => {
                format!("required (...)+ loop did not match anything at input {found}")
            }
            RecognitionErrorKind::FailedPredicate {
                rule, predicate, ..
            } => format!("rule {rule} failed predicate: {{{predicate}}}?"),
        }
    }
}

/// A failed unordered-group predicate and the members still missing.
#[derive(Clone)]
pub struct UnorderedGroupErrorContext<'a> {
    parser: ParserErrorContext<'a>,
    group: ElementId,
    missing: Vec<ElementId>,
    grammar: &'a Grammar,
}

impl<'a> UnorderedGroupErrorContext<'a> {
    pub(crate) fn new(
        parser: ParserErrorContext<'a>,
        group: ElementId,
        missing: Vec<ElementId>,
        grammar: &'a Grammar,
    ) -> Self {
        UnorderedGroupErrorContext {
            parser,
            group,
            missing,
            grammar,
        }
    }

    pub fn parser_context(&self) -> &ParserErrorContext<'a> {
        &self.parser
    }

    pub fn group(&self) -> ElementId {
        self.group
    }

    /// Non-optional members that could still have been selected.
    pub fn missing_mandatory_elements(&self) -> &[ElementId] {
        &self.missing
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn default_message(&self) -> String {
        if self.missing.is_empty() {
            return self.parser.default_message();
        }
        let missing: Vec<String> = self
            .missing
            .iter()
            .map(|e| self.grammar.describe(*e))
            .collect();
        format!(
            "unordered group {} is incomplete, missing {}",
            self.grammar.describe(self.group),
            missing.join(", ")
        )
    }
}

/// A value a semantic factory refused to convert.
#[derive(Clone, Copy)]
pub struct ValueConverterErrorContext<'a> {
    error: &'a ValueConversionError,
    node: NodeRef<'a>,
}

impl<'a> ValueConverterErrorContext<'a> {
    pub(crate) fn new(error: &'a ValueConversionError, node: NodeRef<'a>) -> Self {
        ValueConverterErrorContext { error, node }
    }

    pub fn value_conversion_error(&self) -> &'a ValueConversionError {
        self.error
    }

    /// The composite that was open when the value was converted.
    pub fn current_node(&self) -> NodeRef<'a> {
        self.node
    }

    pub fn current_context(&self) -> Option<SemanticId> {
        self.node.enclosing_semantic_element()
    }

    pub fn default_message(&self) -> String {
        match self.error.message() {
            "" => "value conversion failed".to_owned(),
            message => message.to_owned(),
        }
    }
}

//! The parse driver.
//!
//! A [`Recognizer`] bundles a grammar, its rule procedures and the parser
//! configuration. Each parse gets a fresh [`Parser`] session that owns all
//! mutable state (node builder, lookahead tracker, follow stack, pending
//! error) and is consumed by [`Parser::parse`].
//!
//! Rule procedures are written in the shape of generated recognizer code:
//! they call back into the session on every composite boundary, token match
//! and semantic action.

mod consume;
mod recover;
mod rules;
mod semantic;

pub use rules::{normalize_entry_rule_name, RuleTable};

use rustc_hash::FxHashMap;
use strata_ir::{ElementId, Grammar, TokenSource, TokenType};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::cursor::TokenCursor;
use crate::error::{DefaultMessageProvider, ParseError, SyntaxErrorMessageProvider};
use crate::lookahead::LookaheadTracker;
use crate::node::{Cst, NodeId, NodeModelBuilder, NodeRef, SyntaxErrorMessage};
use crate::recovery::TokenSet;
use crate::semantic::{SemanticFactory, SemanticId};
use crate::unordered::{UnorderedGroupHelper, UnorderedGroupState};

/// Outcome of a rule procedure: the semantic element it produced, if any.
pub type RuleResult = Result<Option<SemanticId>, ParseError>;

/// A rule procedure.
pub type RuleProcedure = fn(&mut Parser<'_>) -> RuleResult;

/// A grammar together with its rule procedures. Built once, shared by
/// every parse.
pub struct Recognizer {
    grammar: Grammar,
    rules: RuleTable,
    config: ParserConfig,
    provider: Box<dyn SyntaxErrorMessageProvider + Send + Sync>,
}

impl Recognizer {
    pub fn new(grammar: Grammar, rules: RuleTable) -> Self {
        Recognizer {
            grammar,
            rules,
            config: ParserConfig::default(),
            provider: Box::new(DefaultMessageProvider),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_message_provider(
        mut self,
        provider: impl SyntaxErrorMessageProvider + Send + Sync + 'static,
    ) -> Self {
        self.provider = Box::new(provider);
        self
    }

    #[inline]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[inline]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Start a parse session over `tokens`, building elements with `factory`.
    pub fn parser<'a>(
        &'a self,
        tokens: &'a dyn TokenSource,
        factory: &'a mut dyn SemanticFactory,
    ) -> Parser<'a> {
        let nodes = NodeModelBuilder::new();
        Parser {
            recognizer: self,
            cursor: TokenCursor::new(tokens),
            factory,
            current: nodes.root(),
            nodes,
            lookahead: LookaheadTracker::new(tokens.token_count()),
            follow: Vec::new(),
            last_consumed_index: None,
            last_consumed_node: None,
            pending_error: None,
            error_recovery: false,
            last_error_index: None,
            semantic_nodes: FxHashMap::default(),
            unordered: Box::new(UnorderedGroupState::for_grammar(&self.grammar)),
        }
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("grammar", &self.grammar.name())
            .field("rules", &self.rules)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A single-use parse session.
pub struct Parser<'a> {
    recognizer: &'a Recognizer,
    cursor: TokenCursor<'a>,
    factory: &'a mut dyn SemanticFactory,
    nodes: NodeModelBuilder,
    lookahead: LookaheadTracker,
    /// Follow sets of the active rule invocations, innermost last.
    follow: Vec<TokenSet>,
    /// The open composite leaves are appended to.
    current: NodeId,
    /// Stream index of the last token that received a leaf.
    last_consumed_index: Option<usize>,
    /// Most recently finished node, for assignments bound to it.
    last_consumed_node: Option<NodeId>,
    /// The error waiting for the next visible leaf.
    pending_error: Option<SyntaxErrorMessage>,
    error_recovery: bool,
    last_error_index: Option<usize>,
    /// Primary node of every semantic element.
    semantic_nodes: FxHashMap<SemanticId, NodeId>,
    unordered: Box<dyn UnorderedGroupHelper + 'a>,
}

impl<'a> Parser<'a> {
    /// Replace the default unordered-group helper.
    #[must_use]
    pub fn with_unordered_group_helper(mut self, helper: impl UnorderedGroupHelper + 'a) -> Self {
        self.unordered = Box::new(helper);
        self
    }

    /// Parse the whole input starting at entry rule `entry`.
    ///
    /// `entry` may be a bare rule name (`Model`), a rule method name
    /// (`ruleModel`) or an entry rule name (`entryRuleModel`).
    #[tracing::instrument(level = "debug", skip_all, fields(entry = entry))]
    pub fn parse(self, entry: &str) -> Result<ParseResult, ParseError> {
        let (rule, procedure) = self
            .recognizer
            .rules
            .lookup(entry)
            .ok_or_else(|| ParseError::UnknownRule(entry.to_owned()))?;
        self.parse_with(rule, procedure)
    }

    /// Parse the whole input with an explicit entry procedure for `rule`.
    pub fn parse_with<F>(mut self, rule: ElementId, procedure: F) -> Result<ParseResult, ParseError>
    where
        F: FnOnce(&mut Parser<'a>) -> RuleResult,
    {
        self.new_composite_node(rule);
        self.push_follow(TokenSet::of(&[TokenType::EOF]));
        let semantic_root = procedure(&mut self)?;
        self.pop_follow();

        let eof = self
            .match_token(TokenType::EOF, &TokenSet::new())
            .map_err(ParseError::from);
        self.catch_rule(eof)?;

        self.append_skipped_tokens();
        self.append_trailing_hidden_tokens();
        self.append_all_tokens();
        self.seal(semantic_root)
    }

    fn seal(self, semantic_root: Option<SemanticId>) -> Result<ParseResult, ParseError> {
        let unresolved = self.lookahead.unresolved();
        if unresolved > 0 {
            warn!(unresolved, "deferred lookahead left unresolved");
        }
        let tokens = self.cursor.size();
        let source = self.cursor.source().source_text().to_owned();
        let cst = Cst::new(self.nodes.into_arena(), source, self.semantic_nodes);
        if self.recognizer.config.check_invariants {
            cst.check_invariants()?;
        }
        let stats = ParseStats::collect(&cst, tokens, unresolved);
        debug!(?stats, "parse finished");
        Ok(ParseResult {
            semantic_root,
            cst,
            legacy: self.current,
            stats,
        })
    }

    /// The grammar being parsed.
    #[inline]
    pub fn grammar(&self) -> &'a Grammar {
        &self.recognizer.grammar
    }

    /// The unordered-group helper of this session.
    pub fn unordered_groups(&mut self) -> &mut dyn UnorderedGroupHelper {
        &mut *self.unordered
    }

    /// View of a node of the tree under construction.
    fn view(&self, node: NodeId) -> NodeRef<'_> {
        NodeRef::new(self.nodes.arena(), self.cursor.source().source_text(), node)
    }
}

/// The result of a completed parse.
#[derive(Debug)]
pub struct ParseResult {
    semantic_root: Option<SemanticId>,
    cst: Cst,
    legacy: NodeId,
    stats: ParseStats,
}

impl ParseResult {
    /// Element produced by the entry rule.
    pub fn semantic_root(&self) -> Option<SemanticId> {
        self.semantic_root
    }

    /// Root of the tree. Its text is the full input.
    pub fn root_node(&self) -> NodeRef<'_> {
        self.cst.root()
    }

    /// The entry rule's node, the shape older consumers expect.
    pub fn legacy_node(&self) -> NodeRef<'_> {
        self.cst.node(self.legacy)
    }

    pub fn cst(&self) -> &Cst {
        &self.cst
    }

    pub fn into_cst(self) -> Cst {
        self.cst
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.stats.syntax_errors > 0
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }
}

/// Counts describing a finished tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub tokens: usize,
    pub leaves: usize,
    pub hidden_leaves: usize,
    /// Reachable composites, the root included.
    pub composites: usize,
    pub syntax_errors: usize,
    /// Deferred lookahead records left at seal time. Zero for every
    /// completed parse.
    pub unresolved_lookahead: usize,
}

impl ParseStats {
    fn collect(cst: &Cst, tokens: usize, unresolved_lookahead: usize) -> Self {
        let mut stats = ParseStats {
            tokens,
            unresolved_lookahead,
            ..ParseStats::default()
        };
        for node in cst.root().descendants() {
            if node.is_leaf() {
                stats.leaves += 1;
                stats.hidden_leaves += usize::from(node.is_hidden());
            } else {
                stats.composites += 1;
            }
            stats.syntax_errors += usize::from(node.syntax_error().is_some());
        }
        stats
    }
}

//! Per-recognizer configuration.

use rustc_hash::FxHashMap;
use std::borrow::Cow;
use strata_ir::TokenType;

/// Prefix marking a token type as produced by a lexical rule.
const LEXER_RULE_PREFIX: &str = "RULE_";

/// Settings shared by every parse of one recognizer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParserConfig {
    /// Readable token names, used in messages.
    token_names: FxHashMap<TokenType, String>,
    /// Lexical rule producing each token type, used to label hidden leaves.
    lexer_rules: FxHashMap<TokenType, String>,
    /// Merge single-child composite chains when a rule returns.
    pub compress_nodes: bool,
    /// Validate the sealed tree before returning it.
    pub check_invariants: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            token_names: FxHashMap::default(),
            lexer_rules: FxHashMap::default(),
            compress_nodes: true,
            check_invariants: true,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the lexer's token type map.
    ///
    /// Names starting with `RULE_` denote lexical rules (`RULE_WS` comes
    /// from rule `WS`). Every name doubles as the readable token name.
    #[must_use]
    pub fn with_token_type_map<'a>(
        mut self,
        map: impl IntoIterator<Item = (TokenType, &'a str)>,
    ) -> Self {
        for (kind, name) in map {
            if let Some(rule) = name.strip_prefix(LEXER_RULE_PREFIX) {
                self.lexer_rules.insert(kind, rule.to_owned());
            }
            self.token_names.insert(kind, name.to_owned());
        }
        self
    }

    #[must_use]
    pub fn with_compress_nodes(mut self, compress: bool) -> Self {
        self.compress_nodes = compress;
        self
    }

    #[must_use]
    pub fn with_check_invariants(mut self, check: bool) -> Self {
        self.check_invariants = check;
        self
    }

    /// Readable name of a token type.
    pub fn token_name(&self, kind: TokenType) -> Cow<'_, str> {
        match self.token_names.get(&kind) {
            Some(name) => Cow::Borrowed(name),
            None if kind == TokenType::EOF => Cow::Borrowed("EOF"),
            None => Cow::Owned(format!("{kind:?}")),
        }
    }

    /// Lexical rule that produces `kind`, if known.
    pub fn lexer_rule(&self, kind: TokenType) -> Option<&str> {
        self.lexer_rules.get(&kind).map(String::as_str)
    }
}

//! Explicit dispatch table from entry rule names to rule procedures.

use rustc_hash::FxHashMap;
use std::borrow::Cow;
use strata_ir::{ElementId, Grammar};

use super::RuleProcedure;
use crate::error::ParseError;

const ENTRY_PREFIX: &str = "entryRule";

/// Rule procedures of a recognizer, keyed by entry rule name.
#[derive(Clone, Default)]
pub struct RuleTable {
    entries: FxHashMap<String, (ElementId, RuleProcedure)>,
    first: Option<String>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `procedure` as the entry point of grammar rule `rule`.
    ///
    /// The first registered rule is the default entry rule. Registering a
    /// second rule under the same entry rule name fails.
    pub fn register(
        &mut self,
        grammar: &Grammar,
        rule: &str,
        procedure: RuleProcedure,
    ) -> Result<(), ParseError> {
        let id = grammar
            .rule(rule)
            .ok_or_else(|| ParseError::UnknownRule(rule.to_owned()))?;
        let key = normalize_entry_rule_name(rule).into_owned();
        if self.entries.contains_key(&key) {
            return Err(ParseError::DuplicateRule(key));
        }
        if self.first.is_none() {
            self.first = Some(key.clone());
        }
        self.entries.insert(key, (id, procedure));
        Ok(())
    }

    /// Builder-style [`RuleTable::register`].
    pub fn with_rule(
        mut self,
        grammar: &Grammar,
        rule: &str,
        procedure: RuleProcedure,
    ) -> Result<Self, ParseError> {
        self.register(grammar, rule, procedure)?;
        Ok(self)
    }

    /// Entry rule name of the first registered rule.
    pub fn first_rule_name(&self) -> Option<&str> {
        self.first.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the procedure for `name` in any accepted spelling.
    pub(crate) fn lookup(&self, name: &str) -> Option<(ElementId, RuleProcedure)> {
        self.entries
            .get(normalize_entry_rule_name(name).as_ref())
            .copied()
    }
}

impl std::fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("RuleTable")
            .field("entries", &names)
            .field("first", &self.first)
            .finish()
    }
}

/// Bring a rule name into entry rule form.
///
/// `Model`, `ruleModel` and `entryRuleModel` all become `entryRuleModel`.
pub fn normalize_entry_rule_name(name: &str) -> Cow<'_, str> {
    if name.starts_with(ENTRY_PREFIX) {
        return Cow::Borrowed(name);
    }
    match name.strip_prefix('r') {
        Some(rest) if rest.starts_with("ule") => Cow::Owned(format!("entryR{rest}")),
        _ => Cow::Owned(format!("{ENTRY_PREFIX}{name}")),
    }
}

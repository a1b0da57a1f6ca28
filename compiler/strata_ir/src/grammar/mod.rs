//! Static grammar description.
//!
//! The parser runtime references grammar elements but never mutates them.
//! Elements live in a flat arena addressed by [`ElementId`]; each element
//! knows its container so that the runtime can walk from a terminal
//! (keyword, rule call) up to the assignment that names its feature.
//!
//! Behaviour is driven by matching on [`GrammarElement`], never by
//! inspecting a type hierarchy.

mod builder;

pub use builder::GrammarBuilder;

use rustc_hash::FxHashMap;
use std::fmt;

/// Index of an element in its [`Grammar`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ElementId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// How often an element may occur.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Cardinality {
    /// Exactly once.
    #[default]
    One,
    /// `?`
    Optional,
    /// `*`
    Many,
    /// `+`
    OneOrMore,
}

impl Cardinality {
    /// True if the element may be absent.
    #[inline]
    pub const fn is_optional(self) -> bool {
        matches!(self, Cardinality::Optional | Cardinality::Many)
    }
}

/// Kind of rule.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RuleKind {
    /// Produces semantic elements.
    Parser,
    /// Parser rule returning a value (converted from its text).
    Datatype,
    /// Lexical rule; its tokens carry the rule name for value conversion.
    Terminal,
    /// Maps keywords to enum literals.
    Enum,
}

/// Assignment operator of an assignment or assigned action.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    /// `=`: single-valued feature.
    Set,
    /// `+=`: multi-valued feature.
    Add,
    /// `?=`: boolean feature set when present.
    Flag,
}

impl AssignOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Flag => "?=",
        }
    }
}

/// One node of the static grammar.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum GrammarElement {
    Rule {
        name: String,
        kind: RuleKind,
        /// Classifier of the semantic elements the rule creates.
        classifier: Option<String>,
        body: Option<ElementId>,
    },
    Keyword {
        value: String,
    },
    RuleCall {
        rule: String,
    },
    Assignment {
        feature: String,
        operator: AssignOp,
        terminal: Option<ElementId>,
    },
    /// `{Type}` or `{Type.feature=current}`.
    Action {
        classifier: String,
        feature: Option<String>,
        operator: Option<AssignOp>,
    },
    Alternatives {
        elements: Vec<ElementId>,
    },
    Group {
        elements: Vec<ElementId>,
    },
    /// Members may appear in any order, each at most once.
    UnorderedGroup {
        elements: Vec<ElementId>,
    },
    CrossReference {
        classifier: String,
        terminal: Option<ElementId>,
    },
}

impl GrammarElement {
    /// Short kind name, for logs and messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            GrammarElement::Rule { .. } => "rule",
            GrammarElement::Keyword { .. } => "keyword",
            GrammarElement::RuleCall { .. } => "rule call",
            GrammarElement::Assignment { .. } => "assignment",
            GrammarElement::Action { .. } => "action",
            GrammarElement::Alternatives { .. } => "alternatives",
            GrammarElement::Group { .. } => "group",
            GrammarElement::UnorderedGroup { .. } => "unordered group",
            GrammarElement::CrossReference { .. } => "cross reference",
        }
    }
}

#[derive(Clone, Debug)]
struct ElementData {
    element: GrammarElement,
    container: Option<ElementId>,
    cardinality: Cardinality,
}

/// A complete, immutable grammar.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    elements: Vec<ElementData>,
    rules: FxHashMap<String, ElementId>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of elements in the arena.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// # Panics
    /// Panics if `id` does not belong to this grammar.
    #[inline]
    pub fn element(&self, id: ElementId) -> &GrammarElement {
        &self.elements[id.index()].element
    }

    #[inline]
    pub fn container(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.index()].container
    }

    #[inline]
    pub fn cardinality(&self, id: ElementId) -> Cardinality {
        self.elements[id.index()].cardinality
    }

    /// Look up a rule by name.
    pub fn rule(&self, name: &str) -> Option<ElementId> {
        self.rules.get(name).copied()
    }

    /// Iterate over all rules, in no particular order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.rules.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Name of the rule `id`, if it is one.
    pub fn rule_name(&self, id: ElementId) -> Option<&str> {
        match self.element(id) {
            GrammarElement::Rule { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Classifier created by rule `id`. Falls back to the rule name.
    pub fn rule_classifier(&self, id: ElementId) -> Option<&str> {
        match self.element(id) {
            GrammarElement::Rule {
                classifier, name, ..
            } => Some(classifier.as_deref().unwrap_or(name)),
            _ => None,
        }
    }

    /// The rule that (transitively) contains `id`.
    pub fn containing_rule(&self, id: ElementId) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(element) = current {
            if matches!(self.element(element), GrammarElement::Rule { .. }) {
                return Some(element);
            }
            current = self.container(element);
        }
        None
    }

    /// Rule referenced by a rule call, if it exists.
    pub fn called_rule(&self, id: ElementId) -> Option<ElementId> {
        match self.element(id) {
            GrammarElement::RuleCall { rule } => self.rule(rule),
            _ => None,
        }
    }

    /// Feature a terminal element assigns to.
    ///
    /// Walks up through rule calls, keywords, cross references and
    /// alternatives until an assignment is reached. Any other container
    /// means the element is unassigned.
    pub fn feature_name(&self, id: ElementId) -> Option<&str> {
        let mut current = id;
        loop {
            match self.element(current) {
                GrammarElement::Assignment { feature, .. } => return Some(feature),
                GrammarElement::RuleCall { .. }
                | GrammarElement::Keyword { .. }
                | GrammarElement::CrossReference { .. }
                | GrammarElement::Alternatives { .. } => {
                    current = self.container(current)?;
                }
                _ => return None,
            }
        }
    }

    /// Members of an unordered group.
    pub fn group_members(&self, id: ElementId) -> &[ElementId] {
        match self.element(id) {
            GrammarElement::UnorderedGroup { elements }
            | GrammarElement::Group { elements }
            | GrammarElement::Alternatives { elements } => elements,
            _ => &[],
        }
    }

    /// Human readable description used in messages.
    pub fn describe(&self, id: ElementId) -> String {
        match self.element(id) {
            GrammarElement::Rule { name, .. } | GrammarElement::RuleCall { rule: name } => {
                name.clone()
            }
            GrammarElement::Keyword { value } => format!("'{value}'"),
            GrammarElement::Assignment {
                feature, terminal, ..
            } => match terminal {
                Some(terminal) => format!("{feature}={}", self.describe(*terminal)),
                None => feature.clone(),
            },
            GrammarElement::Action { classifier, .. } => format!("{{{classifier}}}"),
            GrammarElement::CrossReference { classifier, .. } => format!("[{classifier}]"),
            GrammarElement::Alternatives { elements } => self.describe_all(elements, " | "),
            GrammarElement::Group { elements } => self.describe_all(elements, " "),
            GrammarElement::UnorderedGroup { elements } => self.describe_all(elements, " & "),
        }
    }

    fn describe_all(&self, elements: &[ElementId], separator: &str) -> String {
        let parts: Vec<String> = elements.iter().map(|e| self.describe(*e)).collect();
        format!("({})", parts.join(separator))
    }
}

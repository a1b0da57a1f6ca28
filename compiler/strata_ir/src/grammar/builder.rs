//! Incremental construction of a [`Grammar`].

use rustc_hash::FxHashMap;

use super::{AssignOp, Cardinality, ElementData, ElementId, Grammar, GrammarElement, RuleKind};

/// Builds a grammar arena.
///
/// Children are attached to their container as they are added, so the
/// builder is driven top-down:
///
/// ```
/// use strata_ir::grammar::{GrammarBuilder, AssignOp, RuleKind};
///
/// let mut b = GrammarBuilder::new("Greetings");
/// let model = b.rule("Model", RuleKind::Parser, Some("Model"));
/// let body = b.group(model);
/// b.keyword(body, "hello");
/// let name = b.assignment(body, "name", AssignOp::Set);
/// b.rule_call(name, "ID");
/// b.rule("ID", RuleKind::Terminal, None);
/// let grammar = b.finish();
/// assert_eq!(grammar.rule_name(model), Some("Model"));
/// ```
#[derive(Debug)]
pub struct GrammarBuilder {
    name: String,
    elements: Vec<ElementData>,
    rules: FxHashMap<String, ElementId>,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        GrammarBuilder {
            name: name.into(),
            elements: Vec::new(),
            rules: FxHashMap::default(),
        }
    }

    /// Declare a rule. The body is the first element added under it.
    pub fn rule(&mut self, name: &str, kind: RuleKind, classifier: Option<&str>) -> ElementId {
        let id = self.push(
            GrammarElement::Rule {
                name: name.to_owned(),
                kind,
                classifier: classifier.map(str::to_owned),
                body: None,
            },
            None,
        );
        self.rules.insert(name.to_owned(), id);
        id
    }

    pub fn keyword(&mut self, parent: ElementId, value: &str) -> ElementId {
        self.add(
            parent,
            GrammarElement::Keyword {
                value: value.to_owned(),
            },
        )
    }

    pub fn rule_call(&mut self, parent: ElementId, rule: &str) -> ElementId {
        self.add(
            parent,
            GrammarElement::RuleCall {
                rule: rule.to_owned(),
            },
        )
    }

    pub fn assignment(&mut self, parent: ElementId, feature: &str, operator: AssignOp) -> ElementId {
        self.add(
            parent,
            GrammarElement::Assignment {
                feature: feature.to_owned(),
                operator,
                terminal: None,
            },
        )
    }

    /// `{classifier}` or, with a feature, `{classifier.feature op current}`.
    pub fn action(
        &mut self,
        parent: ElementId,
        classifier: &str,
        feature: Option<(&str, AssignOp)>,
    ) -> ElementId {
        self.add(
            parent,
            GrammarElement::Action {
                classifier: classifier.to_owned(),
                feature: feature.map(|(f, _)| f.to_owned()),
                operator: feature.map(|(_, op)| op),
            },
        )
    }

    pub fn alternatives(&mut self, parent: ElementId) -> ElementId {
        self.add(
            parent,
            GrammarElement::Alternatives {
                elements: Vec::new(),
            },
        )
    }

    pub fn group(&mut self, parent: ElementId) -> ElementId {
        self.add(
            parent,
            GrammarElement::Group {
                elements: Vec::new(),
            },
        )
    }

    pub fn unordered_group(&mut self, parent: ElementId) -> ElementId {
        self.add(
            parent,
            GrammarElement::UnorderedGroup {
                elements: Vec::new(),
            },
        )
    }

    pub fn cross_reference(&mut self, parent: ElementId, classifier: &str) -> ElementId {
        self.add(
            parent,
            GrammarElement::CrossReference {
                classifier: classifier.to_owned(),
                terminal: None,
            },
        )
    }

    /// Set the cardinality of an already added element.
    pub fn set_cardinality(&mut self, id: ElementId, cardinality: Cardinality) -> ElementId {
        self.elements[id.index()].cardinality = cardinality;
        id
    }

    pub fn finish(self) -> Grammar {
        Grammar {
            name: self.name,
            elements: self.elements,
            rules: self.rules,
        }
    }

    fn push(&mut self, element: GrammarElement, container: Option<ElementId>) -> ElementId {
        let raw = u32::try_from(self.elements.len())
            .unwrap_or_else(|_| panic!("grammar exceeds u32::MAX elements"));
        let id = ElementId(raw);
        self.elements.push(ElementData {
            element,
            container,
            cardinality: Cardinality::One,
        });
        id
    }

    /// Add `element` under `parent`.
    ///
    /// # Panics
    /// Panics if `parent` cannot contain elements (keywords, rule calls,
    /// actions) or already holds its single child.
    fn add(&mut self, parent: ElementId, element: GrammarElement) -> ElementId {
        let id = self.push(element, Some(parent));
        match &mut self.elements[parent.index()].element {
            GrammarElement::Rule { body: slot, .. }
            | GrammarElement::Assignment { terminal: slot, .. }
            | GrammarElement::CrossReference { terminal: slot, .. } => {
                assert!(slot.is_none(), "grammar element {parent:?} already has a child");
                *slot = Some(id);
            }
            GrammarElement::Alternatives { elements }
            | GrammarElement::Group { elements }
            | GrammarElement::UnorderedGroup { elements } => elements.push(id),
            other => panic!("a {} cannot contain grammar elements", other.kind_name()),
        }
        id
    }
}

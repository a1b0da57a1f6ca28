//! Rule boundaries, composite nodes and semantic actions.

use strata_ir::{AssignOp, ElementId, GrammarElement, Token, TokenType};
use tracing::debug;

use super::Parser;
use crate::error::{ParseError, ValueConverterErrorContext};
use crate::node::{Compressed, NodeId, NodeRef};
use crate::semantic::{SemanticId, SemanticValue, ValueConversionError};

impl<'a> Parser<'a> {
    /// Start of a rule procedure: hand the lookahead that selected this
    /// rule to its composite and start recording afresh.
    pub fn enter_rule(&mut self) {
        self.lookahead.set_current_lookahead(
            self.current,
            self.cursor.lookahead_tokens(),
            &mut self.nodes,
        );
        self.cursor.reset_lookahead();
        debug!(node = ?self.current, "enter rule");
    }

    /// End of a rule procedure.
    pub fn leave_rule(&mut self) {
        self.cursor.reset_lookahead();
        self.last_consumed_node = Some(self.current);
        debug!(node = ?self.current, "leave rule");
    }

    /// Open a composite for `element` below the current one.
    pub fn new_composite_node(&mut self, element: ElementId) {
        let lookahead = u32::try_from(self.cursor.current_lookahead()).unwrap_or(u32::MAX);
        let anchor = self
            .last_consumed_index
            .and_then(|index| self.cursor.get(index))
            .map_or(0, |token| token.span.end);
        self.current = self
            .nodes
            .new_composite(Some(element), lookahead, anchor, self.current);
    }

    /// Close the composite of a called rule and return to its parent.
    ///
    /// A composite whose only child is another composite absorbs it.
    pub fn after_rule_call(&mut self) {
        let exiting = self.current;
        let Some(parent) = self.nodes.parent(exiting) else {
            return;
        };
        if self.recognizer.config.compress_nodes {
            if let Some(Compressed { absorbed, semantic }) = self.nodes.compress(exiting) {
                self.lookahead.move_lookahead(absorbed, exiting, &mut self.nodes);
                if let Some(primary) = semantic.and_then(|e| self.semantic_nodes.get_mut(&e)) {
                    if *primary == absorbed {
                        *primary = exiting;
                    }
                }
                if self.last_consumed_node == Some(absorbed) {
                    self.last_consumed_node = Some(exiting);
                }
            }
        }
        self.current = parent;
    }

    /// `LA(i)`, recorded as lookahead.
    pub fn la(&mut self, i: isize) -> TokenType {
        self.cursor.la(i)
    }

    /// `LT(i)`, recorded as lookahead.
    pub fn lt(&mut self, i: isize) -> Token {
        self.cursor.lt(i)
    }

    /// Text of `token` as a feature value.
    pub fn token_value(&self, token: &Token) -> SemanticValue {
        SemanticValue::Text(self.cursor.source().text_of(token).to_owned())
    }

    /// Text of the visible leaves of the current composite, the value of a
    /// datatype rule.
    pub fn current_text(&self) -> SemanticValue {
        let text = self
            .view(self.current)
            .leaves()
            .filter(|leaf| !leaf.is_hidden())
            .map(|leaf| leaf.text())
            .collect();
        SemanticValue::Text(text)
    }

    /// Create the element returned by `rule` and bind it to the current
    /// composite.
    pub fn create_model_element(&mut self, rule: ElementId) -> Result<SemanticId, ParseError> {
        self.create_for(rule, self.current)
    }

    /// Like [`Parser::create_model_element`], but bound to the parent of the
    /// current composite. Used while the composite of a called rule is
    /// still open.
    pub fn create_model_element_for_parent(
        &mut self,
        rule: ElementId,
    ) -> Result<SemanticId, ParseError> {
        let node = self.nodes.parent(self.current).unwrap_or(self.current);
        self.create_for(rule, node)
    }

    fn create_for(&mut self, rule: ElementId, node: NodeId) -> Result<SemanticId, ParseError> {
        let classifier = self
            .grammar()
            .rule_classifier(rule)
            .ok_or_else(|| ParseError::UnknownRule(self.grammar().describe(rule)))?;
        let element = self.factory.create(classifier).map_err(ParseError::Internal)?;
        self.associate(node, element)?;
        Ok(element)
    }

    /// Run an unassigned action: wrap the current composite in a new one
    /// for `action` bound to a fresh element.
    pub fn force_create_model_element(&mut self, action: ElementId) -> Result<SemanticId, ParseError> {
        let (classifier, _) = self.action_parts(action)?;
        let element = self.factory.create(classifier).map_err(ParseError::Internal)?;
        self.insert_composite_node(action);
        self.associate(self.current, element)?;
        Ok(element)
    }

    /// Run an assigned `=` action, storing `value` in the new element.
    pub fn force_create_model_element_and_set(
        &mut self,
        action: ElementId,
        value: SemanticId,
    ) -> Result<SemanticId, ParseError> {
        self.force_create_assigned(action, value)
    }

    /// Run an assigned `+=` action, appending `value` to the new element.
    pub fn force_create_model_element_and_add(
        &mut self,
        action: ElementId,
        value: SemanticId,
    ) -> Result<SemanticId, ParseError> {
        self.force_create_assigned(action, value)
    }

    fn force_create_assigned(
        &mut self,
        action: ElementId,
        value: SemanticId,
    ) -> Result<SemanticId, ParseError> {
        let (classifier, assigned) = self.action_parts(action)?;
        let element = self.factory.create(classifier).map_err(ParseError::Internal)?;
        if let Some((feature, operator)) = assigned {
            let value = SemanticValue::Element(value);
            match operator {
                AssignOp::Add => self.add_to(element, feature, value, None, self.current)?,
                AssignOp::Set | AssignOp::Flag => {
                    self.set_to(element, feature, value, None, self.current)?;
                }
            }
        }
        self.insert_composite_node(action);
        self.associate(self.current, element)?;
        Ok(element)
    }

    fn action_parts(
        &self,
        action: ElementId,
    ) -> Result<(&'a str, Option<(&'a str, AssignOp)>), ParseError> {
        let grammar = self.grammar();
        match grammar.element(action) {
            GrammarElement::Action {
                classifier,
                feature,
                operator,
            } => Ok((classifier, feature.as_deref().zip(*operator))),
            _ => Err(ParseError::UnknownRule(grammar.describe(action))),
        }
    }

    /// Wrap the current composite in a new one for `action`.
    fn insert_composite_node(&mut self, action: ElementId) {
        let lookahead = self.nodes.lookahead(self.current);
        let wrapper = self
            .nodes
            .new_composite_as_parent_of(action, lookahead, self.current);
        self.lookahead.move_lookahead(self.current, wrapper, &mut self.nodes);
        self.current = wrapper;
    }

    /// Assign `feature` of `element`, reading the value from the current
    /// composite.
    pub fn set(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
    ) -> Result<(), ParseError> {
        self.set_to(element, feature, value, rule_name, self.current)
    }

    /// Append to `feature` of `element`, reading the value from the current
    /// composite.
    pub fn add(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
    ) -> Result<(), ParseError> {
        self.add_to(element, feature, value, rule_name, self.current)
    }

    /// [`Parser::set`] reading the value from the last finished node.
    pub fn set_with_last_consumed(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
    ) -> Result<(), ParseError> {
        let node = self.last_consumed_node.unwrap_or(self.current);
        self.set_to(element, feature, value, rule_name, node)
    }

    /// [`Parser::add`] reading the value from the last finished node.
    pub fn add_with_last_consumed(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
    ) -> Result<(), ParseError> {
        let node = self.last_consumed_node.unwrap_or(self.current);
        self.add_to(element, feature, value, rule_name, node)
    }

    fn set_to(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeId,
    ) -> Result<(), ParseError> {
        let view = NodeRef::new(
            self.nodes.arena(),
            self.cursor.source().source_text(),
            node,
        );
        match self.factory.set(element, feature, value, rule_name, view) {
            Ok(()) => Ok(()),
            Err(error) => self.handle_value_conversion_error(error),
        }
    }

    fn add_to(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeId,
    ) -> Result<(), ParseError> {
        let view = NodeRef::new(
            self.nodes.arena(),
            self.cursor.source().source_text(),
            node,
        );
        match self.factory.add(element, feature, value, rule_name, view) {
            Ok(()) => Ok(()),
            Err(error) => self.handle_value_conversion_error(error),
        }
    }

    /// Attach a rejected value to the tree, or abort on internal failures.
    ///
    /// The error goes to the node the factory named; otherwise to the
    /// current composite if it is still empty, else to its last child.
    fn handle_value_conversion_error(&mut self, error: ValueConversionError) -> Result<(), ParseError> {
        if error.is_internal() {
            return Err(ParseError::Internal(error));
        }
        let message = {
            let context = ValueConverterErrorContext::new(&error, self.view(self.current));
            self.recognizer.provider.value_conversion_error(&context)
        };
        let target = error
            .node()
            .filter(|node| node.index() < self.nodes.arena().len())
            .or_else(|| self.nodes.last_child(self.current))
            .unwrap_or(self.current);
        debug!(node = ?target, "value conversion failed: {}", error);
        self.nodes.set_syntax_error(target, message);
        Ok(())
    }

    /// Bind `element` to `node`. The first node bound is the element's
    /// primary node.
    fn associate(&mut self, node: NodeId, element: SemanticId) -> Result<(), ParseError> {
        if !self.nodes.associate(node, element) {
            return Err(ParseError::Reassignment { node });
        }
        self.semantic_nodes.entry(element).or_insert(node);
        Ok(())
    }
}

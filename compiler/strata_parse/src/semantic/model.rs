//! An in-memory semantic model driven by grammar classifiers and features.

use rust_decimal::Decimal;

use super::{
    SemanticFactory, SemanticId, SemanticValue, ValueConversionError, ValueConverterRegistry,
};
use crate::node::NodeRef;

/// Value of a feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Bool(bool),
    Element(SemanticId),
    /// Values collected by `+=`.
    List(Vec<Value>),
}

/// One element of a [`DynamicModel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelElement {
    classifier: String,
    /// Features in first-assignment order.
    features: Vec<(String, Value)>,
}

impl ModelElement {
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn feature(&self, name: &str) -> Option<&Value> {
        self.features
            .iter()
            .find_map(|(feature, value)| (feature == name).then_some(value))
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.features.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn slot(&mut self, name: &str) -> Option<&mut Value> {
        self.features
            .iter_mut()
            .find_map(|(feature, value)| (feature == name).then_some(value))
    }
}

/// A [`SemanticFactory`] storing elements as classifier-tagged feature maps.
///
/// Text values pass through the converter registered for the rule that
/// produced them; converter failures carry the node they were read from.
#[derive(Debug, Default)]
pub struct DynamicModel {
    elements: Vec<ModelElement>,
    converters: ValueConverterRegistry,
}

impl DynamicModel {
    /// A model using the default converters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_converters(converters: ValueConverterRegistry) -> Self {
        DynamicModel {
            elements: Vec::new(),
            converters,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: SemanticId) -> Option<&ModelElement> {
        self.elements.get(id.raw() as usize)
    }

    /// Shorthand for `element(id)?.feature(feature)`.
    pub fn get(&self, id: SemanticId, feature: &str) -> Option<&Value> {
        self.element(id)?.feature(feature)
    }

    fn convert(
        &self,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeRef<'_>,
    ) -> Result<Value, ValueConversionError> {
        match value {
            SemanticValue::Element(id) => Ok(Value::Element(id)),
            SemanticValue::Bool(flag) => Ok(Value::Bool(flag)),
            SemanticValue::Text(text) => match rule_name {
                Some(rule) => self
                    .converters
                    .to_value(rule, &text)
                    .map_err(|e| e.or_node(node.id())),
                None => Ok(Value::Text(text)),
            },
        }
    }

    fn element_mut(&mut self, id: SemanticId) -> Result<&mut ModelElement, ValueConversionError> {
        self.elements
            .get_mut(id.raw() as usize)
            .ok_or_else(|| ValueConversionError::internal(format!("unknown element {id:?}")))
    }
}

impl SemanticFactory for DynamicModel {
    fn create(&mut self, classifier: &str) -> Result<SemanticId, ValueConversionError> {
        if classifier.is_empty() {
            return Err(ValueConversionError::internal(
                "cannot create an element without classifier",
            ));
        }
        let raw = u32::try_from(self.elements.len())
            .map_err(|_| ValueConversionError::internal("too many semantic elements"))?;
        self.elements.push(ModelElement {
            classifier: classifier.to_owned(),
            features: Vec::new(),
        });
        Ok(SemanticId::from_raw(raw))
    }

    fn set(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeRef<'_>,
    ) -> Result<(), ValueConversionError> {
        let value = self.convert(value, rule_name, node)?;
        let target = self.element_mut(element)?;
        match target.slot(feature) {
            Some(slot) => *slot = value,
            None => target.features.push((feature.to_owned(), value)),
        }
        Ok(())
    }

    fn add(
        &mut self,
        element: SemanticId,
        feature: &str,
        value: SemanticValue,
        rule_name: Option<&str>,
        node: NodeRef<'_>,
    ) -> Result<(), ValueConversionError> {
        let value = self.convert(value, rule_name, node)?;
        let target = self.element_mut(element)?;
        match target.slot(feature) {
            Some(Value::List(values)) => values.push(value),
            Some(slot) => {
                let previous = std::mem::replace(slot, Value::Bool(false));
                *slot = Value::List(vec![previous, value]);
            }
            None => target
                .features
                .push((feature.to_owned(), Value::List(vec![value]))),
        }
        Ok(())
    }
}

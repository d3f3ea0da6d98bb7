//! Entity specifications and the hand-off record between commands

use crate::error::DatagenResult;
use crate::graph::{GraphBackend, Label, NodeId, PropertyValue};
use crate::numbers::{FlatDistribution, NumberGenerator};
use crate::range::Range;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Entity-type name plus the identifiers a command produced
///
/// Produced by one command and consumed read-only by any number of later
/// commands (e.g. the user ids a relationship command fans out from).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntityInfo {
    entity_name: String,
    node_ids: Vec<NodeId>,
}

impl DomainEntityInfo {
    pub fn new(entity_name: impl Into<String>, node_ids: Vec<NodeId>) -> Self {
        Self {
            entity_name: entity_name.into(),
            node_ids,
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }
}

/// Generates one property value per created node or relationship
///
/// `owner` is the entity name of a node or the type of a relationship;
/// `iteration` counts the elements created so far by the same command.
pub trait Property {
    fn key(&self) -> &str;

    fn value(&self, owner: &str, iteration: usize, rng: &mut dyn RngCore) -> PropertyValue;
}

impl<P: Property + ?Sized> Property for Box<P> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn value(&self, owner: &str, iteration: usize, rng: &mut dyn RngCore) -> PropertyValue {
        (**self).value(owner, iteration, rng)
    }
}

/// `key = "<owner>-<n>"`, where `n` is the 1-based iteration
#[derive(Debug, Clone)]
pub struct IndexedProperty {
    key: String,
}

impl IndexedProperty {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Property for IndexedProperty {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self, owner: &str, iteration: usize, _rng: &mut dyn RngCore) -> PropertyValue {
        PropertyValue::String(format!("{}-{}", owner, iteration + 1))
    }
}

/// Integer drawn uniformly from a range
#[derive(Debug, Clone)]
pub struct RangeProperty {
    key: String,
    range: Range,
}

impl RangeProperty {
    pub fn new(key: impl Into<String>, range: Range) -> Self {
        Self {
            key: key.into(),
            range,
        }
    }
}

impl Property for RangeProperty {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self, _owner: &str, _iteration: usize, rng: &mut dyn RngCore) -> PropertyValue {
        let value = FlatDistribution.generate_single(self.range.min(), self.range.max(), rng);
        PropertyValue::Integer(value as i64)
    }
}

/// The same value on every element
#[derive(Debug, Clone)]
pub struct ConstantProperty {
    key: String,
    value: PropertyValue,
}

impl ConstantProperty {
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Property for ConstantProperty {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self, _owner: &str, _iteration: usize, _rng: &mut dyn RngCore) -> PropertyValue {
        self.value.clone()
    }
}

/// Describes how to create one entity of a type
pub struct EntitySpec {
    label: Label,
    extra_labels: Vec<Label>,
    properties: Vec<Box<dyn Property>>,
}

impl EntitySpec {
    pub fn new(label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            extra_labels: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.extra_labels.push(label.into());
        self
    }

    pub fn with_property(mut self, property: impl Property + 'static) -> Self {
        self.properties.push(Box::new(property));
        self
    }

    /// Primary label, used as the entity name
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn entity_name(&self) -> &str {
        self.label.as_str()
    }

    /// Create one entity and apply its properties
    pub fn build(
        &self,
        store: &mut dyn GraphBackend,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<NodeId> {
        let mut labels = Vec::with_capacity(1 + self.extra_labels.len());
        labels.push(self.label.clone());
        labels.extend(self.extra_labels.iter().cloned());

        let node = store.create_node(&labels)?;
        for property in &self.properties {
            let value = property.value(self.label.as_str(), iteration, rng);
            store.set_node_property(node, property.key(), value)?;
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_domain_entity_info() {
        let info = DomainEntityInfo::new("user", vec![NodeId::new(1), NodeId::new(2)]);
        assert_eq!(info.entity_name(), "user");
        assert_eq!(info.len(), 2);
        assert!(!info.is_empty());
        assert_eq!(info.clone(), info);
    }

    #[test]
    fn test_build_entity_with_labels_and_properties() {
        let mut store = GraphStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        let spec = EntitySpec::new("user")
            .with_label("customer")
            .with_property(IndexedProperty::new("name"))
            .with_property(RangeProperty::new("age", Range::new(18, 65).unwrap()))
            .with_property(ConstantProperty::new("tier", "gold"));

        let id = spec.build(&mut store, 4, &mut rng).unwrap();

        let node = store.get_node(id).unwrap();
        assert!(node.has_label(&Label::new("user")));
        assert!(node.has_label(&Label::new("customer")));
        assert_eq!(node.get_property("name").unwrap().as_string(), Some("user-5"));
        let age = node.get_property("age").unwrap().as_integer().unwrap();
        assert!((18..=65).contains(&age));
        assert_eq!(node.get_property("tier").unwrap().as_string(), Some("gold"));
        assert_eq!(spec.entity_name(), "user");
    }
}

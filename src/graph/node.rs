//! Node implementation for the generated property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node in the property graph
///
/// Generated nodes carry one primary label (the entity name) and may carry
/// additional labels declared on their entity specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Set of labels for this node
    pub labels: HashSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Node {
    /// Create a new node with a single label
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        Self::new_with_labels(id, vec![label.into()])
    }

    /// Create a new node with multiple labels
    pub fn new_with_labels(id: NodeId, labels: Vec<Label>) -> Self {
        Node {
            id,
            labels: labels.into_iter().collect(),
            properties: PropertyMap::new(),
            created_at: current_timestamp(),
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Set a property value, returning the previous one
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_single_label() {
        let node = Node::new(NodeId::new(1), "user");
        assert_eq!(node.id, NodeId::new(1));
        assert_eq!(node.labels.len(), 1);
        assert!(node.has_label(&Label::new("user")));
        assert!(node.created_at > 0);
    }

    #[test]
    fn test_create_node_multiple_labels() {
        let node = Node::new_with_labels(NodeId::new(2), vec![Label::new("user"), Label::new("customer")]);
        assert_eq!(node.labels.len(), 2);
        assert!(node.has_label(&Label::new("customer")));
    }

    #[test]
    fn test_node_properties() {
        let mut node = Node::new(NodeId::new(4), "user");

        assert_eq!(node.set_property("name", "user-1"), None);
        let old = node.set_property("name", "user-2");
        assert_eq!(old, Some(PropertyValue::from("user-1")));
        node.set_property("age", 30i64);

        assert_eq!(node.get_property("name").unwrap().as_string(), Some("user-2"));
        assert_eq!(node.property_count(), 2);

        assert!(node.remove_property("age").is_some());
        assert!(!node.has_property("age"));
    }

    #[test]
    fn test_node_equality() {
        let node1 = Node::new(NodeId::new(7), "user");
        let node2 = Node::new(NodeId::new(7), "product");
        let node3 = Node::new(NodeId::new(8), "user");

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
    }
}

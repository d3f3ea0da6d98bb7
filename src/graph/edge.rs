//! Edge implementation for the generated property graph

use super::node::current_timestamp;
use super::property::{PropertyMap, PropertyValue};
use super::types::{Direction, EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Multiple edges of the same type may connect the same pair of nodes;
/// whether the generator permits that is decided by its uniqueness policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Type of relationship (e.g., "BOUGHT")
    pub edge_type: EdgeType,

    /// Properties associated with this edge
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties: PropertyMap::new(),
            created_at: current_timestamp(),
        }
    }

    /// Set a property value, returning the previous one
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: NodeId, node2: NodeId) -> bool {
        (self.source == node1 && self.target == node2)
            || (self.source == node2 && self.target == node1)
    }

    /// Check whether this edge links `start` to `end` with the given
    /// orientation, as seen from `start`
    pub fn links(&self, start: NodeId, end: NodeId, direction: Direction) -> bool {
        match direction {
            Direction::Outgoing => self.source == start && self.target == end,
            Direction::Incoming => self.source == end && self.target == start,
            Direction::Both => self.connects(start, end),
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(EdgeId::new(1), NodeId::new(1), NodeId::new(2), "BOUGHT");

        assert_eq!(edge.id, EdgeId::new(1));
        assert_eq!(edge.source, NodeId::new(1));
        assert_eq!(edge.target, NodeId::new(2));
        assert_eq!(edge.edge_type.as_str(), "BOUGHT");
    }

    #[test]
    fn test_edge_links_by_direction() {
        let edge = Edge::new(EdgeId::new(2), NodeId::new(10), NodeId::new(20), "FRIEND");

        assert!(edge.links(NodeId::new(10), NodeId::new(20), Direction::Outgoing));
        assert!(!edge.links(NodeId::new(20), NodeId::new(10), Direction::Outgoing));
        assert!(edge.links(NodeId::new(20), NodeId::new(10), Direction::Incoming));
        assert!(edge.links(NodeId::new(20), NodeId::new(10), Direction::Both));
        assert!(!edge.links(NodeId::new(10), NodeId::new(30), Direction::Both));
    }

    #[test]
    fn test_edge_properties() {
        let mut edge = Edge::new(EdgeId::new(4), NodeId::new(1), NodeId::new(2), "BOUGHT");
        assert_eq!(edge.set_property("quantity", 3i64), None);
        assert_eq!(edge.set_property("quantity", 4i64), Some(PropertyValue::Integer(3)));
        assert_eq!(edge.get_property("quantity").unwrap().as_integer(), Some(4));
        assert!(edge.remove_property("quantity").is_some());
        assert!(edge.get_property("quantity").is_none());
    }
}

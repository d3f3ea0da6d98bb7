//! In-memory graph storage implementation
//!
//! The reference backend the generator writes into. Writes made while a
//! transaction is open are journaled so a failed batch can be undone.

use super::backend::GraphBackend;
use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Relationships cannot be created with direction {0}")]
    InvalidDirection(Direction),

    #[error("A transaction is already active")]
    TransactionAlreadyActive,

    #[error("No active transaction")]
    NoActiveTransaction,
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Undo record for a write made inside an open transaction
#[derive(Debug, Clone)]
enum UndoEntry {
    CreateNode(NodeId),
    CreateEdge(EdgeId),
    SetNodeProperty {
        node_id: NodeId,
        key: String,
        previous: Option<PropertyValue>,
    },
    SetEdgeProperty {
        edge_id: EdgeId,
        key: String,
        previous: Option<PropertyValue>,
    },
}

/// Journal of the currently open transaction
#[derive(Debug)]
struct TxJournal {
    next_node_id: u64,
    next_edge_id: u64,
    entries: Vec<UndoEntry>,
}

/// In-memory graph storage
///
/// Layout:
/// - nodes: NodeId -> Node (arena indexed by id)
/// - edges: EdgeId -> Edge (arena indexed by id)
/// - outgoing / incoming: NodeId -> Vec<EdgeId> adjacency lists
/// - label_index: Label -> node ids
/// - edge_type_index: EdgeType -> edge ids
#[derive(Debug)]
pub struct GraphStore {
    nodes: Vec<Option<Node>>,

    edges: Vec<Option<Edge>>,

    outgoing: Vec<Vec<EdgeId>>,

    incoming: Vec<Vec<EdgeId>>,

    label_index: HashMap<Label, HashSet<NodeId>>,

    edge_type_index: HashMap<EdgeType, HashSet<EdgeId>>,

    node_count: usize,

    edge_count: usize,

    next_node_id: u64,

    next_edge_id: u64,

    /// Open transaction, if any
    journal: Option<TxJournal>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            label_index: HashMap::new(),
            edge_type_index: HashMap::new(),
            node_count: 0,
            edge_count: 0,
            next_node_id: 1,
            next_edge_id: 1,
            journal: None,
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_u64() as usize).and_then(|n| n.as_ref())
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(|e| e.as_ref())
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.adjacent(&self.outgoing, node_id)
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.adjacent(&self.incoming, node_id)
    }

    fn adjacent<'a>(&'a self, lists: &'a [Vec<EdgeId>], node_id: NodeId) -> Vec<&'a Edge> {
        lists
            .get(node_id.as_u64() as usize)
            .map(|ids| ids.iter().filter_map(|id| self.get_edge(*id)).collect())
            .unwrap_or_default()
    }

    /// Get all nodes with a specific label
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self
            .label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|id| self.get_node(*id)).collect())
            .unwrap_or_default();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// Get all edges of a specific type
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self
            .edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|id| self.get_edge(*id)).collect())
            .unwrap_or_default();
        edges.sort_by_key(|e| e.id);
        edges
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    fn record(&mut self, entry: UndoEntry) {
        if let Some(journal) = self.journal.as_mut() {
            journal.entries.push(entry);
        }
    }

    fn ensure_node_capacity(&mut self, idx: usize) {
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
            self.incoming.resize(idx + 1, Vec::new());
        }
    }

    fn remove_node(&mut self, id: NodeId) {
        let idx = id.as_u64() as usize;
        if let Some(node) = self.nodes.get_mut(idx).and_then(|n| n.take()) {
            for label in &node.labels {
                if let Some(ids) = self.label_index.get_mut(label) {
                    ids.remove(&id);
                }
            }
            self.node_count -= 1;
        }
    }

    fn remove_edge(&mut self, id: EdgeId) {
        let idx = id.as_u64() as usize;
        if let Some(edge) = self.edges.get_mut(idx).and_then(|e| e.take()) {
            if let Some(list) = self.outgoing.get_mut(edge.source.as_u64() as usize) {
                list.retain(|e| *e != id);
            }
            if let Some(list) = self.incoming.get_mut(edge.target.as_u64() as usize) {
                list.retain(|e| *e != id);
            }
            if let Some(ids) = self.edge_type_index.get_mut(&edge.edge_type) {
                ids.remove(&id);
            }
            self.edge_count -= 1;
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBackend for GraphStore {
    fn create_node(&mut self, labels: &[Label]) -> GraphResult<NodeId> {
        let node_id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        let idx = node_id.as_u64() as usize;

        for label in labels {
            self.label_index
                .entry(label.clone())
                .or_default()
                .insert(node_id);
        }

        self.ensure_node_capacity(idx);
        self.nodes[idx] = Some(Node::new_with_labels(node_id, labels.to_vec()));
        self.node_count += 1;
        self.record(UndoEntry::CreateNode(node_id));
        Ok(node_id)
    }

    fn set_node_property(&mut self, id: NodeId, key: &str, value: PropertyValue) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(id.as_u64() as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::NodeNotFound(id))?;
        let previous = node.set_property(key, value);
        self.record(UndoEntry::SetNodeProperty {
            node_id: id,
            key: key.to_string(),
            previous,
        });
        Ok(())
    }

    fn set_relationship_property(&mut self, id: EdgeId, key: &str, value: PropertyValue) -> GraphResult<()> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(|e| e.as_mut())
            .ok_or(GraphError::EdgeNotFound(id))?;
        let previous = edge.set_property(key, value);
        self.record(UndoEntry::SetEdgeProperty {
            edge_id: id,
            key: key.to_string(),
            previous,
        });
        Ok(())
    }

    fn create_relationship(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<EdgeId> {
        let (source, target) = match direction {
            Direction::Outgoing => (from, to),
            Direction::Incoming => (to, from),
            Direction::Both => return Err(GraphError::InvalidDirection(direction)),
        };

        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        let idx = edge_id.as_u64() as usize;
        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }
        self.edges[idx] = Some(Edge::new(edge_id, source, target, edge_type.clone()));

        self.outgoing[source.as_u64() as usize].push(edge_id);
        self.incoming[target.as_u64() as usize].push(edge_id);
        self.edge_type_index
            .entry(edge_type.clone())
            .or_default()
            .insert(edge_id);
        self.edge_count += 1;
        self.record(UndoEntry::CreateEdge(edge_id));
        Ok(edge_id)
    }

    fn relationship_exists(
        &self,
        from: NodeId,
        to: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> bool {
        let mut candidates = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            candidates.extend(self.get_outgoing_edges(from));
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            candidates.extend(self.get_incoming_edges(from));
        }
        candidates
            .into_iter()
            .any(|e| &e.edge_type == edge_type && e.links(from, to, direction))
    }

    fn lookup_by_id(&self, id: NodeId) -> GraphResult<NodeId> {
        if self.has_node(id) {
            Ok(id)
        } else {
            Err(GraphError::NodeNotFound(id))
        }
    }

    fn nodes_by_label(&self, label: &Label) -> Vec<NodeId> {
        self.get_nodes_by_label(label).iter().map(|n| n.id).collect()
    }

    fn related_nodes(&self, id: NodeId, edge_type: &EdgeType, direction: Direction) -> Vec<NodeId> {
        let mut related = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            related.extend(
                self.get_outgoing_edges(id)
                    .into_iter()
                    .filter(|e| &e.edge_type == edge_type)
                    .map(|e| e.target),
            );
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            related.extend(
                self.get_incoming_edges(id)
                    .into_iter()
                    .filter(|e| &e.edge_type == edge_type)
                    .map(|e| e.source),
            );
        }
        related
    }

    fn begin(&mut self) -> GraphResult<()> {
        if self.journal.is_some() {
            return Err(GraphError::TransactionAlreadyActive);
        }
        self.journal = Some(TxJournal {
            next_node_id: self.next_node_id,
            next_edge_id: self.next_edge_id,
            entries: Vec::new(),
        });
        Ok(())
    }

    fn commit(&mut self) -> GraphResult<()> {
        let journal = self.journal.take().ok_or(GraphError::NoActiveTransaction)?;
        debug!("Committed {} writes", journal.entries.len());
        Ok(())
    }

    fn rollback(&mut self) -> GraphResult<()> {
        let journal = self.journal.take().ok_or(GraphError::NoActiveTransaction)?;
        debug!("Rolling back {} writes", journal.entries.len());

        for entry in journal.entries.into_iter().rev() {
            match entry {
                UndoEntry::CreateEdge(id) => self.remove_edge(id),
                UndoEntry::CreateNode(id) => self.remove_node(id),
                UndoEntry::SetNodeProperty { node_id, key, previous } => {
                    if let Some(node) = self
                        .nodes
                        .get_mut(node_id.as_u64() as usize)
                        .and_then(|n| n.as_mut())
                    {
                        match previous {
                            Some(value) => {
                                node.set_property(key, value);
                            }
                            None => {
                                node.remove_property(&key);
                            }
                        }
                    }
                }
                UndoEntry::SetEdgeProperty { edge_id, key, previous } => {
                    if let Some(edge) = self
                        .edges
                        .get_mut(edge_id.as_u64() as usize)
                        .and_then(|e| e.as_mut())
                    {
                        match previous {
                            Some(value) => {
                                edge.set_property(key, value);
                            }
                            None => {
                                edge.remove_property(&key);
                            }
                        }
                    }
                }
            }
        }

        self.next_node_id = journal.next_node_id;
        self.next_edge_id = journal.next_edge_id;
        Ok(())
    }
}

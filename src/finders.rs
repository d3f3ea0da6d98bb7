//! Target selection for relationship creation
//!
//! A finder turns "this source wants `quantity` relationships" into the
//! concrete end nodes. The returned sequence is finite and rebuilt on every
//! call.

use crate::entity::{DomainEntityInfo, EntitySpec};
use crate::error::{DatagenError, DatagenResult};
use crate::graph::{Direction, EdgeType, GraphBackend, GraphResult, Label, NodeId};
use crate::numbers::UniqueNumbers;
use crate::range::Range;
use indexmap::IndexSet;
use rand::{Rng, RngCore};

/// Pluggable target-selection policy
pub trait NodeFinderStrategy {
    /// Select up to `quantity` target nodes for `source`
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        source: NodeId,
        quantity: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>>;

    /// Entity name of the nodes this finder returns
    fn entity_name(&self) -> &str;

    /// Reject cardinalities this finder can never satisfy
    fn validate(&self, _cardinality: &Range) -> DatagenResult<()> {
        Ok(())
    }
}

impl<F: NodeFinderStrategy + ?Sized> NodeFinderStrategy for Box<F> {
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        source: NodeId,
        quantity: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        (**self).get_nodes(store, source, quantity, rng)
    }

    fn entity_name(&self) -> &str {
        (**self).entity_name()
    }

    fn validate(&self, cardinality: &Range) -> DatagenResult<()> {
        (**self).validate(cardinality)
    }
}

/// Where pool-based finders draw their candidates from
#[derive(Debug, Clone)]
pub enum NodePool {
    /// Ids produced by an earlier command
    Entities(DomainEntityInfo),
    /// Every node carrying a label, resolved at selection time
    Label(Label),
}

impl NodePool {
    fn name(&self) -> &str {
        match self {
            NodePool::Entities(info) => info.entity_name(),
            NodePool::Label(label) => label.as_str(),
        }
    }

    fn candidates(&self, store: &dyn GraphBackend) -> Vec<NodeId> {
        match self {
            NodePool::Entities(info) => info.node_ids().to_vec(),
            NodePool::Label(label) => store.nodes_by_label(label),
        }
    }

    /// Pool size when it is known up front
    fn known_size(&self) -> Option<usize> {
        match self {
            NodePool::Entities(info) => Some(info.len()),
            NodePool::Label(_) => None,
        }
    }
}

/// Draws `quantity` nodes from a pool with replacement
#[derive(Debug, Clone)]
pub struct RandomNodes {
    pool: NodePool,
}

impl RandomNodes {
    pub fn from_entities(entities: &DomainEntityInfo) -> Self {
        Self {
            pool: NodePool::Entities(entities.clone()),
        }
    }

    pub fn from_label(label: impl Into<Label>) -> Self {
        Self {
            pool: NodePool::Label(label.into()),
        }
    }
}

impl NodeFinderStrategy for RandomNodes {
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        _source: NodeId,
        quantity: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        if quantity == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.pool.candidates(store);
        if candidates.is_empty() {
            return Err(DatagenError::EmptyPool(self.pool.name().to_string()));
        }
        Ok((0..quantity)
            .map(|_| candidates[rng.gen_range(0..candidates.len())])
            .collect())
    }

    fn entity_name(&self) -> &str {
        self.pool.name()
    }

    fn validate(&self, cardinality: &Range) -> DatagenResult<()> {
        if self.pool.known_size() == Some(0) && cardinality.max() > 0 {
            return Err(DatagenError::Configuration(format!(
                "Cannot draw up to {} nodes from empty pool '{}'",
                cardinality.max(),
                self.pool.name()
            )));
        }
        Ok(())
    }
}

/// Draws distinct nodes from a pool for each source (no repeats within one
/// source's fan-out)
#[derive(Debug, Clone)]
pub struct UniqueRandomNodes {
    pool: NodePool,
}

impl UniqueRandomNodes {
    pub fn from_entities(entities: &DomainEntityInfo) -> Self {
        Self {
            pool: NodePool::Entities(entities.clone()),
        }
    }

    pub fn from_label(label: impl Into<Label>) -> Self {
        Self {
            pool: NodePool::Label(label.into()),
        }
    }
}

impl NodeFinderStrategy for UniqueRandomNodes {
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        _source: NodeId,
        quantity: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        let candidates = self.pool.candidates(store);
        let picks = UniqueNumbers::sample(candidates.len(), quantity, rng)?;
        Ok(picks.into_iter().map(|i| candidates[i]).collect())
    }

    fn entity_name(&self) -> &str {
        self.pool.name()
    }

    fn validate(&self, cardinality: &Range) -> DatagenResult<()> {
        match self.pool.known_size() {
            Some(size) if cardinality.max() > size => Err(DatagenError::Configuration(format!(
                "Cardinality maximum {} exceeds the {} distinct nodes in '{}'",
                cardinality.max(),
                size,
                self.pool.name()
            ))),
            _ => Ok(()),
        }
    }
}

/// Always returns the same nodes, whatever the quantity (hub and star shapes)
#[derive(Debug, Clone)]
pub struct FixedNodes {
    entity_name: String,
    nodes: Vec<NodeId>,
}

impl FixedNodes {
    pub fn new(entities: &DomainEntityInfo) -> Self {
        Self {
            entity_name: entities.entity_name().to_string(),
            nodes: entities.node_ids().to_vec(),
        }
    }

    /// A single hub node
    pub fn single(entity_name: impl Into<String>, node: NodeId) -> Self {
        Self {
            entity_name: entity_name.into(),
            nodes: vec![node],
        }
    }
}

impl NodeFinderStrategy for FixedNodes {
    fn get_nodes(
        &mut self,
        _store: &mut dyn GraphBackend,
        _source: NodeId,
        _quantity: usize,
        _rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        Ok(self.nodes.clone())
    }

    fn entity_name(&self) -> &str {
        &self.entity_name
    }
}

/// A structural query evaluated relative to a source node
pub trait GraphQuery {
    fn execute(&self, store: &dyn GraphBackend, current: NodeId) -> GraphResult<Vec<NodeId>>;
}

/// Multi-hop traversal over typed relationships
///
/// Returns the distinct nodes reached at the last hop, in discovery order,
/// excluding the start node. Two `FRIEND` hops yield friends of friends.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    hops: Vec<(EdgeType, Direction)>,
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hop(mut self, edge_type: impl Into<EdgeType>, direction: Direction) -> Self {
        self.hops.push((edge_type.into(), direction));
        self
    }
}

impl GraphQuery for Traversal {
    fn execute(&self, store: &dyn GraphBackend, current: NodeId) -> GraphResult<Vec<NodeId>> {
        store.lookup_by_id(current)?;

        let mut frontier: IndexSet<NodeId> = IndexSet::from([current]);
        for (edge_type, direction) in &self.hops {
            let mut next = IndexSet::new();
            for node in &frontier {
                next.extend(store.related_nodes(*node, edge_type, *direction));
            }
            frontier = next;
        }
        frontier.shift_remove(&current);
        Ok(frontier.into_iter().collect())
    }
}

/// Targets come from a query relative to the source node
///
/// `quantity` caps the results unless the finder is built unbounded.
pub struct QueryNodes {
    query: Box<dyn GraphQuery>,
    entity_name: String,
    bounded: bool,
}

impl QueryNodes {
    pub fn new(entity_name: impl Into<String>, query: impl GraphQuery + 'static) -> Self {
        Self {
            query: Box::new(query),
            entity_name: entity_name.into(),
            bounded: true,
        }
    }

    /// Return every query result regardless of the requested quantity
    pub fn unbounded(mut self) -> Self {
        self.bounded = false;
        self
    }
}

impl NodeFinderStrategy for QueryNodes {
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        source: NodeId,
        quantity: usize,
        _rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        let mut nodes = self.query.execute(store, source)?;
        if self.bounded {
            nodes.truncate(quantity);
        }
        Ok(nodes)
    }

    fn entity_name(&self) -> &str {
        &self.entity_name
    }
}

/// Creates fresh entities as targets (one-to-many trees)
pub struct NewNodes {
    spec: EntitySpec,
    created: usize,
}

impl NewNodes {
    pub fn new(spec: EntitySpec) -> Self {
        Self { spec, created: 0 }
    }
}

impl NodeFinderStrategy for NewNodes {
    fn get_nodes(
        &mut self,
        store: &mut dyn GraphBackend,
        _source: NodeId,
        quantity: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        let mut nodes = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            nodes.push(self.spec.build(store, self.created, rng)?);
            self.created += 1;
        }
        Ok(nodes)
    }

    fn entity_name(&self) -> &str {
        self.spec.entity_name()
    }
}

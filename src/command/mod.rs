//! Batch commands: the units of generation work
//!
//! A command is configuration plus strategies. Everything it accumulates
//! while running lives in an [`ExecutionContext`] owned by the dataset for
//! the duration of one run.

pub mod create;
pub mod relate;

pub use create::{create_entities, CreateEntities, CreateNodesBuilder, CreateNodesCommand};
pub use relate::{
    relate_entities, RelateCardinality, RelateNodesBuilder, RelateNodesCommand, RelateRelationship,
    RelateTo,
};

use crate::entity::DomainEntityInfo;
use crate::error::DatagenResult;
use crate::graph::{EdgeId, GraphBackend, NodeId};
use crate::log::Log;
use indexmap::IndexSet;
use rand::RngCore;

/// Default number of iterations grouped into one transaction
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// A unit of generation work executed in bounded batches
pub trait BatchCommand {
    /// Total number of elementary operations
    fn number_of_iterations(&self) -> usize;

    /// Maximum iterations per transactional batch
    fn batch_size(&self) -> usize;

    /// Perform iteration `index`
    fn execute(
        &mut self,
        ctx: &mut ExecutionContext,
        store: &mut dyn GraphBackend,
        index: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<()>;

    fn on_begin(&self, log: &dyn Log);

    fn on_end(&self, ctx: &ExecutionContext, log: &dyn Log);

    fn description(&self) -> String;

    /// Compact form, e.g. `(user)-[:BOUGHT]->(product)`
    fn short_description(&self) -> String;

    /// Identifiers exposed to downstream commands, valid once the run completes
    fn results(&self, ctx: &ExecutionContext) -> DomainEntityInfo;
}

/// Accumulators for one command run
#[derive(Debug, Default)]
pub struct ExecutionContext {
    node_ids: IndexSet<NodeId>,
    nodes_created: u64,
    relationships_created: u64,
    relationships_skipped: u64,
    iterations: usize,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a node this command exposes downstream; repeats are ignored
    pub fn record_node(&mut self, id: NodeId) {
        self.node_ids.insert(id);
    }

    pub fn record_created_node(&mut self, id: NodeId) {
        self.nodes_created += 1;
        self.record_node(id);
    }

    /// Count a uniqueness outcome: `None` means skipped
    pub fn record_relationship(&mut self, outcome: Option<EdgeId>) {
        match outcome {
            Some(_) => self.relationships_created += 1,
            None => self.relationships_skipped += 1,
        }
    }

    pub(crate) fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    /// Recorded node ids in first-seen order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.node_ids.iter().copied().collect()
    }

    pub fn nodes_created(&self) -> u64 {
        self.nodes_created
    }

    pub fn relationships_created(&self) -> u64 {
        self.relationships_created
    }

    pub fn relationships_skipped(&self) -> u64 {
        self.relationships_skipped
    }

    /// Iterations completed so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_deduplicates_in_order() {
        let mut ctx = ExecutionContext::new();
        ctx.record_node(NodeId::new(3));
        ctx.record_node(NodeId::new(1));
        ctx.record_node(NodeId::new(3));
        assert_eq!(ctx.node_ids(), vec![NodeId::new(3), NodeId::new(1)]);
    }

    #[test]
    fn test_context_counters() {
        let mut ctx = ExecutionContext::new();
        ctx.record_created_node(NodeId::new(1));
        ctx.record_relationship(Some(EdgeId::new(1)));
        ctx.record_relationship(None);
        ctx.record_iteration();

        assert_eq!(ctx.nodes_created(), 1);
        assert_eq!(ctx.relationships_created(), 1);
        assert_eq!(ctx.relationships_skipped(), 1);
        assert_eq!(ctx.iterations(), 1);
    }
}

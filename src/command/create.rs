//! Node creation command

use super::{BatchCommand, ExecutionContext, DEFAULT_BATCH_SIZE};
use crate::dataset::Dataset;
use crate::entity::{DomainEntityInfo, EntitySpec};
use crate::error::{DatagenError, DatagenResult};
use crate::graph::GraphBackend;
use crate::log::Log;
use rand::RngCore;

/// Start building a command that creates entities from `spec`
pub fn create_entities(spec: EntitySpec) -> CreateEntities {
    CreateEntities { spec }
}

/// First stage: the quantity is mandatory
pub struct CreateEntities {
    spec: EntitySpec,
}

impl CreateEntities {
    pub fn quantity(self, quantity: usize) -> CreateNodesBuilder {
        CreateNodesBuilder {
            spec: self.spec,
            quantity,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Final stage of the node creation builder
pub struct CreateNodesBuilder {
    spec: EntitySpec,
    quantity: usize,
    batch_size: usize,
}

impl CreateNodesBuilder {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn build(self) -> DatagenResult<CreateNodesCommand> {
        if self.batch_size == 0 {
            return Err(DatagenError::Configuration(format!(
                "Batch size for '{}' must be greater than zero",
                self.spec.entity_name()
            )));
        }
        Ok(CreateNodesCommand {
            spec: self.spec,
            quantity: self.quantity,
            batch_size: self.batch_size,
        })
    }

    /// Build and run on `dataset`, returning the created ids
    pub fn update(self, dataset: &mut Dataset<'_>) -> DatagenResult<DomainEntityInfo> {
        let mut command = self.build()?;
        dataset.execute(&mut command)
    }
}

/// Creates one entity per iteration
pub struct CreateNodesCommand {
    spec: EntitySpec,
    quantity: usize,
    batch_size: usize,
}

impl BatchCommand for CreateNodesCommand {
    fn number_of_iterations(&self) -> usize {
        self.quantity
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn execute(
        &mut self,
        ctx: &mut ExecutionContext,
        store: &mut dyn GraphBackend,
        index: usize,
        rng: &mut dyn RngCore,
    ) -> DatagenResult<()> {
        let node = self.spec.build(store, index, rng)?;
        ctx.record_created_node(node);
        Ok(())
    }

    fn on_begin(&self, log: &dyn Log) {
        log.write(&format!("      [Quantity: {}]", self.quantity));
    }

    fn on_end(&self, ctx: &ExecutionContext, log: &dyn Log) {
        log.write(&format!(
            "      [Created: {} {}]",
            ctx.nodes_created(),
            self.spec.entity_name()
        ));
    }

    fn description(&self) -> String {
        format!("Creating '{}' nodes.", self.short_description())
    }

    fn short_description(&self) -> String {
        format!("({})", self.spec.entity_name())
    }

    fn results(&self, ctx: &ExecutionContext) -> DomainEntityInfo {
        DomainEntityInfo::new(self.spec.entity_name(), ctx.node_ids())
    }
}

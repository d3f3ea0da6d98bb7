//! Relationship creation command and its staged builder
//!
//! The builder only exposes the next legal step:
//! `relate_entities(&users).to(finder).relationship("BOUGHT").cardinality(range)`
//! and then the optional settings (`distribution`, `batch_size`,
//! `with_property`) plus `build` / `update`.

use super::{BatchCommand, ExecutionContext, DEFAULT_BATCH_SIZE};
use crate::dataset::Dataset;
use crate::entity::{DomainEntityInfo, Property};
use crate::error::{DatagenError, DatagenResult};
use crate::finders::NodeFinderStrategy;
use crate::graph::{Direction, EdgeType, GraphBackend};
use crate::log::Log;
use crate::numbers::{FlatDistribution, NumberGenerator};
use crate::range::Range;
use crate::uniqueness::{AllowMultiple, UniquenessStrategy};
use rand::RngCore;

/// Start building a command that relates each of `entities` to targets
pub fn relate_entities(entities: &DomainEntityInfo) -> RelateTo {
    RelateTo {
        start: entities.clone(),
    }
}

/// Stage 1: choose how targets are found
pub struct RelateTo {
    start: DomainEntityInfo,
}

impl RelateTo {
    pub fn to(self, finder: impl NodeFinderStrategy + 'static) -> RelateRelationship {
        RelateRelationship {
            start: self.start,
            finder: Box::new(finder),
        }
    }
}

/// Stage 2: name the relationship type
pub struct RelateRelationship {
    start: DomainEntityInfo,
    finder: Box<dyn NodeFinderStrategy>,
}

impl RelateRelationship {
    /// Outgoing relationships of the given type
    pub fn relationship(self, edge_type: impl Into<EdgeType>) -> RelateCardinality {
        self.relationship_with_direction(edge_type, Direction::Outgoing)
    }

    pub fn relationship_with_direction(
        self,
        edge_type: impl Into<EdgeType>,
        direction: Direction,
    ) -> RelateCardinality {
        RelateCardinality {
            start: self.start,
            finder: self.finder,
            edge_type: edge_type.into(),
            direction,
        }
    }
}

/// Stage 3: how many relationships per source, and the duplicate policy
pub struct RelateCardinality {
    start: DomainEntityInfo,
    finder: Box<dyn NodeFinderStrategy>,
    edge_type: EdgeType,
    direction: Direction,
}

impl RelateCardinality {
    /// Cardinality with duplicates allowed
    pub fn cardinality(self, range: Range) -> RelateNodesBuilder {
        self.cardinality_with(range, AllowMultiple)
    }

    pub fn cardinality_with(
        self,
        range: Range,
        uniqueness: impl UniquenessStrategy + 'static,
    ) -> RelateNodesBuilder {
        RelateNodesBuilder {
            start: self.start,
            finder: self.finder,
            edge_type: self.edge_type,
            direction: self.direction,
            cardinality: range,
            uniqueness: Box::new(uniqueness),
            number_generator: Box::new(FlatDistribution),
            properties: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Final stage: optional settings, then build or run
pub struct RelateNodesBuilder {
    start: DomainEntityInfo,
    finder: Box<dyn NodeFinderStrategy>,
    edge_type: EdgeType,
    direction: Direction,
    cardinality: Range,
    uniqueness: Box<dyn UniquenessStrategy>,
    number_generator: Box<dyn NumberGenerator>,
    properties: Vec<Box<dyn Property>>,
    batch_size: usize,
}

impl RelateNodesBuilder {
    /// Distribution used to draw each source's relationship count
    pub fn distribution(mut self, generator: impl NumberGenerator + 'static) -> Self {
        self.number_generator = Box::new(generator);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Property set on every relationship the command creates
    pub fn with_property(mut self, property: impl Property + 'static) -> Self {
        self.properties.push(Box::new(property));
        self
    }

    /// Validate the configuration and produce the command
    pub fn build(self) -> DatagenResult<RelateNodesCommand> {
        self.build_with_capture(true)
    }

    fn build_with_capture(self, capture_end_node_ids: bool) -> DatagenResult<RelateNodesCommand> {
        if self.batch_size == 0 {
            return Err(DatagenError::Configuration(format!(
                "Batch size for '{}' relationships must be greater than zero",
                self.edge_type
            )));
        }
        if self.direction == Direction::Both {
            return Err(DatagenError::Configuration(format!(
                "Relationships of type '{}' need an outgoing or incoming direction",
                self.edge_type
            )));
        }
        self.finder.validate(&self.cardinality)?;

        Ok(RelateNodesCommand {
            start: self.start,
            finder: self.finder,
            edge_type: self.edge_type,
            direction: self.direction,
            cardinality: self.cardinality,
            uniqueness: self.uniqueness,
            number_generator: self.number_generator,
            properties: self.properties,
            batch_size: self.batch_size,
            capture_end_node_ids,
        })
    }

    /// Build and run on `dataset`, returning the distinct end nodes touched
    pub fn update(self, dataset: &mut Dataset<'_>) -> DatagenResult<DomainEntityInfo> {
        let mut command = self.build_with_capture(true)?;
        dataset.execute(&mut command)
    }

    /// Build and run without collecting end node ids
    pub fn update_no_return(self, dataset: &mut Dataset<'_>) -> DatagenResult<()> {
        let mut command = self.build_with_capture(false)?;
        dataset.execute(&mut command).map(|_| ())
    }
}

/// Creates `0..k` relationships from each source entity
pub struct RelateNodesCommand {
    start: DomainEntityInfo,
    finder: Box<dyn NodeFinderStrategy>,
    edge_type: EdgeType,
    direction: Direction,
    cardinality: Range,
    uniqueness: Box<dyn UniquenessStrategy>,
    number_generator: Box<dyn NumberGenerator>,
    properties: Vec<Box<dyn Property>>,
    batch_size: usize,
    capture_end_node_ids: bool,
}

impl BatchCommand for RelateNodesCommand {
    fn number_of_iterations(&self) -> usize {
        self.start.len()
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
        let start_id = *self.start.node_ids().get(index).ok_or_else(|| {
            DatagenError::Configuration(format!(
                "Iteration {} is outside the {} '{}' source nodes",
                index,
                self.start.len(),
                self.start.entity_name()
            ))
        })?;
        let first = store.lookup_by_id(start_id)?;

        let count = self.number_generator.generate_single(
            self.cardinality.min(),
            self.cardinality.max(),
            rng,
        );
        let targets = self.finder.get_nodes(store, first, count, rng)?;

        for second in targets {
            if self.capture_end_node_ids {
                ctx.record_node(second);
            }
            let outcome = self
                .uniqueness
                .apply(store, first, second, &self.edge_type, self.direction)?;
            if let Some(edge) = outcome {
                let created = ctx.relationships_created() as usize;
                for property in &self.properties {
                    let value = property.value(self.edge_type.as_str(), created, rng);
                    store.set_relationship_property(edge, property.key(), value)?;
                }
            }
            ctx.record_relationship(outcome);
        }
        Ok(())
    }

    fn on_begin(&self, log: &dyn Log) {
        log.write(&format!(
            "      [Min: {}, Max: {}, Uniqueness: {}, Distribution: {}]",
            self.cardinality.min(),
            self.cardinality.max(),
            self.uniqueness.description(),
            self.number_generator.description()
        ));
    }

    fn on_end(&self, ctx: &ExecutionContext, log: &dyn Log) {
        let sources = self.start.len();
        let average = if sources == 0 {
            0.0
        } else {
            ctx.relationships_created() as f64 / sources as f64
        };
        log.write(&format!(
            "      [Avg: {:.2} relationship(s) per {}, Skipped: {}]",
            average,
            self.start.entity_name(),
            ctx.relationships_skipped()
        ));
    }

    fn description(&self) -> String {
        format!("Creating '{}' relationships.", self.short_description())
    }

    fn short_description(&self) -> String {
        let (rel_start, rel_end) = match self.direction {
            Direction::Incoming => ("<-", "-"),
            _ => ("-", "->"),
        };
        format!(
            "({}){}[:{}]{}({})",
            self.start.entity_name(),
            rel_start,
            self.edge_type,
            rel_end,
            self.finder.entity_name()
        )
    }

    fn results(&self, ctx: &ExecutionContext) -> DomainEntityInfo {
        DomainEntityInfo::new(self.finder.entity_name(), ctx.node_ids())
    }
}

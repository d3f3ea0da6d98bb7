//! Declarative dataset descriptions
//!
//! A YAML document names the entities to create and the relationships to
//! draw between them:
//!
//! ```yaml
//! name: shop
//! seed: 7
//! entities:
//!   - name: user
//!     quantity: 100
//!     properties:
//!       - kind: indexed
//!         key: name
//!   - name: product
//!     quantity: 20
//! relationships:
//!   - from: user
//!     to: product
//!     type: BOUGHT
//!     min: 0
//!     max: 5
//!     uniqueness: single_direction
//! ```
//!
//! Entities run first, then relationships, each in declared order.

use crate::command::{create_entities, relate_entities, DEFAULT_BATCH_SIZE};
use crate::dataset::{DatasetManager, DatasetStatistics};
use crate::entity::{ConstantProperty, DomainEntityInfo, EntitySpec, IndexedProperty, Property, RangeProperty};
use crate::error::{DatagenError, DatagenResult};
use crate::finders::{FixedNodes, NodeFinderStrategy, QueryNodes, RandomNodes, Traversal, UniqueRandomNodes};
use crate::graph::{Direction, GraphBackend, PropertyValue};
use crate::log::Log;
use crate::numbers::{ExponentialDistribution, FlatDistribution, NormalDistribution, NumberGenerator};
use crate::range::Range;
use crate::uniqueness::{AllowMultiple, Unique, UniqueBothDirections, UniquenessStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// A complete dataset description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name, used in progress output
    pub name: String,
    /// Seed for reproducible output; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Iterations per transaction for every command
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Primary label and entity name
    pub name: String,
    pub quantity: usize,
    /// Extra labels added to every node
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

/// How a node property is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyConfig {
    /// `"{label}-{n}"` with n counting from 1
    Indexed { key: String },
    /// Uniform integer in `[min, max]`
    Range { key: String, min: usize, max: usize },
    Constant { key: String, value: PropertyValue },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipConfig {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub direction: Direction,
    pub min: usize,
    /// Defaults to `min`
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub uniqueness: UniquenessConfig,
    #[serde(default)]
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub finder: FinderConfig,
    /// Index into the `to` entities, for the `fixed` finder
    #[serde(default)]
    pub target_index: Option<usize>,
    /// Traversal from the source node, for the `query` finder
    #[serde(default)]
    pub hops: Vec<HopConfig>,
    /// Set on every relationship created
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessConfig {
    #[default]
    AllowMultiple,
    SingleDirection,
    BothDirections,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionConfig {
    #[default]
    Flat,
    Normal,
    Exponential,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderConfig {
    #[default]
    Random,
    UniqueRandom,
    Fixed,
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopConfig {
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub direction: Direction,
}

impl DatasetConfig {
    /// Parse and validate a YAML description
    pub fn from_yaml_str(yaml: &str) -> DatagenResult<Self> {
        let config: DatasetConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DatagenResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Check cross references and value ranges
    pub fn validate(&self) -> DatagenResult<()> {
        if self.name.trim().is_empty() {
            return Err(DatagenError::Config("Dataset name is empty".to_string()));
        }
        if self.batch_size == Some(0) {
            return Err(DatagenError::Config("batch_size must be greater than zero".to_string()));
        }

        let mut quantities: HashMap<&str, usize> = HashMap::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(DatagenError::Config("Entity name is empty".to_string()));
            }
            if quantities.insert(entity.name.as_str(), entity.quantity).is_some() {
                return Err(DatagenError::Config(format!(
                    "Entity '{}' is declared twice",
                    entity.name
                )));
            }
            validate_properties(&entity.name, &entity.properties)?;
        }

        for (i, rel) in self.relationships.iter().enumerate() {
            let context = format!("relationship #{} ({}-[:{}]-{})", i + 1, rel.from, rel.edge_type, rel.to);
            if !quantities.contains_key(rel.from.as_str()) {
                return Err(DatagenError::Config(format!(
                    "{}: unknown entity '{}'",
                    context, rel.from
                )));
            }
            let target_quantity = *quantities.get(rel.to.as_str()).ok_or_else(|| {
                DatagenError::Config(format!("{}: unknown entity '{}'", context, rel.to))
            })?;
            if rel.edge_type.trim().is_empty() {
                return Err(DatagenError::Config(format!("{}: relationship type is empty", context)));
            }
            if rel.direction == Direction::Both {
                return Err(DatagenError::Config(format!(
                    "{}: direction must be outgoing or incoming",
                    context
                )));
            }
            validate_properties(&context, &rel.properties)?;
            if rel.max() < rel.min {
                return Err(DatagenError::Config(format!(
                    "{}: min {} is above max {}",
                    context,
                    rel.min,
                    rel.max()
                )));
            }
            match rel.finder {
                FinderConfig::Fixed => match rel.target_index {
                    None => {
                        return Err(DatagenError::Config(format!(
                            "{}: fixed finder requires target_index",
                            context
                        )))
                    }
                    Some(index) if index >= target_quantity => {
                        return Err(DatagenError::Config(format!(
                            "{}: target_index {} is outside the {} '{}' entities",
                            context, index, target_quantity, rel.to
                        )))
                    }
                    Some(_) => {}
                },
                FinderConfig::Query if rel.hops.is_empty() => {
                    return Err(DatagenError::Config(format!(
                        "{}: query finder requires at least one hop",
                        context
                    )));
                }
                FinderConfig::UniqueRandom if rel.max() > target_quantity => {
                    return Err(DatagenError::Config(format!(
                        "{}: cannot pick {} distinct targets from {} '{}' entities",
                        context,
                        rel.max(),
                        target_quantity,
                        rel.to
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Manager over `store`, seeded when the description carries a seed
    pub fn manager<S: GraphBackend>(&self, store: S, log: impl Log + 'static) -> DatasetManager<S> {
        let manager = DatasetManager::new(store, log);
        match self.seed {
            Some(seed) => manager.with_seed(seed),
            None => manager,
        }
    }

    /// Run the description as one dataset on `manager`
    pub fn run<S: GraphBackend>(&self, manager: &mut DatasetManager<S>) -> DatagenResult<GenerationReport> {
        self.validate()?;
        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        info!(
            "Generating dataset '{}' ({} entities, {} relationships)",
            self.name,
            self.entities.len(),
            self.relationships.len()
        );

        let mut dataset = manager.new_dataset(self.name.as_str());
        let mut created: HashMap<&str, DomainEntityInfo> = HashMap::new();
        let mut entities = Vec::with_capacity(self.entities.len());

        for entity in &self.entities {
            let info = create_entities(entity.spec()?)
                .quantity(entity.quantity)
                .batch_size(batch_size)
                .update(&mut dataset)?;
            entities.push(EntityReport {
                name: entity.name.clone(),
                nodes: info.len(),
            });
            created.insert(entity.name.as_str(), info);
        }

        let mut relationships = Vec::with_capacity(self.relationships.len());
        for rel in &self.relationships {
            let (from, to) = match (created.get(rel.from.as_str()), created.get(rel.to.as_str())) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    return Err(DatagenError::Config(format!(
                        "Relationship {} refers to an undeclared entity",
                        rel.pattern()
                    )))
                }
            };

            let mut builder = relate_entities(from)
                .to(rel.finder(to)?)
                .relationship_with_direction(rel.edge_type.as_str(), rel.direction)
                .cardinality_with(Range::new(rel.min, rel.max())?, rel.uniqueness.strategy())
                .distribution(rel.distribution.generator()?)
                .batch_size(batch_size);
            for property in &rel.properties {
                builder = builder.with_property(property.build()?);
            }

            let before = dataset.statistics().clone();
            let end_nodes = builder.update(&mut dataset)?;
            let after = dataset.statistics();

            relationships.push(RelationshipReport {
                pattern: rel.pattern(),
                created: after.relationships_created - before.relationships_created,
                skipped: after.relationships_skipped - before.relationships_skipped,
                end_nodes: end_nodes.len(),
            });
        }

        let statistics = dataset.end();
        Ok(GenerationReport {
            name: self.name.clone(),
            seed: self.seed,
            entities,
            relationships,
            statistics,
        })
    }

    /// Run on a fresh manager and hand the store back with the report
    pub fn generate<S: GraphBackend>(
        &self,
        store: S,
        log: impl Log + 'static,
    ) -> DatagenResult<(GenerationReport, S)> {
        let mut manager = self.manager(store, log);
        let report = self.run(&mut manager)?;
        Ok((report, manager.into_store()))
    }
}

fn validate_properties(owner: &str, properties: &[PropertyConfig]) -> DatagenResult<()> {
    let mut keys = HashSet::new();
    for property in properties {
        if !keys.insert(property.key()) {
            return Err(DatagenError::Config(format!(
                "Property '{}' of {} is declared twice",
                property.key(),
                owner
            )));
        }
        if let PropertyConfig::Range { key, min, max } = property {
            if min > max {
                return Err(DatagenError::Config(format!(
                    "Property '{}' of {} has min {} above max {}",
                    key, owner, min, max
                )));
            }
        }
    }
    Ok(())
}

impl EntityConfig {
    fn spec(&self) -> DatagenResult<EntitySpec> {
        let mut spec = EntitySpec::new(self.name.as_str());
        for label in &self.labels {
            spec = spec.with_label(label.as_str());
        }
        for property in &self.properties {
            spec = spec.with_property(property.build()?);
        }
        Ok(spec)
    }
}

impl PropertyConfig {
    pub fn key(&self) -> &str {
        match self {
            PropertyConfig::Indexed { key }
            | PropertyConfig::Range { key, .. }
            | PropertyConfig::Constant { key, .. } => key,
        }
    }

    fn build(&self) -> DatagenResult<Box<dyn Property>> {
        let property: Box<dyn Property> = match self {
            PropertyConfig::Indexed { key } => Box::new(IndexedProperty::new(key.as_str())),
            PropertyConfig::Range { key, min, max } => {
                Box::new(RangeProperty::new(key.as_str(), Range::new(*min, *max)?))
            }
            PropertyConfig::Constant { key, value } => {
                Box::new(ConstantProperty::new(key.as_str(), value.clone()))
            }
        };
        Ok(property)
    }
}

impl RelationshipConfig {
    pub fn max(&self) -> usize {
        self.max.unwrap_or(self.min)
    }

    /// Compact form, e.g. `(user)-[:BOUGHT]->(product)`
    pub fn pattern(&self) -> String {
        match self.direction {
            Direction::Incoming => format!("({})<-[:{}]-({})", self.from, self.edge_type, self.to),
            _ => format!("({})-[:{}]->({})", self.from, self.edge_type, self.to),
        }
    }

    fn finder(&self, to: &DomainEntityInfo) -> DatagenResult<Box<dyn NodeFinderStrategy>> {
        let finder: Box<dyn NodeFinderStrategy> = match self.finder {
            FinderConfig::Random => Box::new(RandomNodes::from_entities(to)),
            FinderConfig::UniqueRandom => Box::new(UniqueRandomNodes::from_entities(to)),
            FinderConfig::Fixed => {
                let node = self
                    .target_index
                    .and_then(|index| to.node_ids().get(index).copied())
                    .ok_or_else(|| {
                        DatagenError::Config(format!(
                            "Relationship {} has no valid target_index",
                            self.pattern()
                        ))
                    })?;
                Box::new(FixedNodes::single(to.entity_name(), node))
            }
            FinderConfig::Query => {
                let traversal = self
                    .hops
                    .iter()
                    .fold(Traversal::new(), |t, hop| t.hop(hop.edge_type.as_str(), hop.direction));
                Box::new(QueryNodes::new(to.entity_name(), traversal))
            }
        };
        Ok(finder)
    }
}

impl UniquenessConfig {
    fn strategy(self) -> Box<dyn UniquenessStrategy> {
        match self {
            UniquenessConfig::AllowMultiple => Box::new(AllowMultiple),
            UniquenessConfig::SingleDirection => Box::new(Unique),
            UniquenessConfig::BothDirections => Box::new(UniqueBothDirections),
        }
    }
}

impl DistributionConfig {
    fn generator(self) -> DatagenResult<Box<dyn NumberGenerator>> {
        let generator: Box<dyn NumberGenerator> = match self {
            DistributionConfig::Flat => Box::new(FlatDistribution),
            DistributionConfig::Normal => Box::new(NormalDistribution::new(NormalDistribution::DEFAULT_SIGMA)?),
            DistributionConfig::Exponential => {
                Box::new(ExponentialDistribution::new(ExponentialDistribution::DEFAULT_MEAN)?)
            }
        };
        Ok(generator)
    }
}

/// Outcome of running a [`DatasetConfig`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub name: String,
    pub seed: Option<u64>,
    pub entities: Vec<EntityReport>,
    pub relationships: Vec<RelationshipReport>,
    pub statistics: DatasetStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub name: String,
    pub nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipReport {
    pub pattern: String,
    pub created: u64,
    pub skipped: u64,
    /// Distinct end nodes touched
    pub end_nodes: usize,
}

impl GenerationReport {
    pub fn to_json(&self) -> DatagenResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

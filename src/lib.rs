//! Samyama Datagen
//!
//! Synthetic property-graph generation in bounded transactional batches.
//!
//! A dataset is built from [`command::BatchCommand`]s: node creation
//! commands produce entities, relationship commands connect them. Targets
//! are chosen by a [`finders::NodeFinderStrategy`], relationship counts by
//! a [`numbers::NumberGenerator`], and duplicates are governed by a
//! [`uniqueness::UniquenessStrategy`]. Everything writes through the
//! [`graph::GraphBackend`] contract, with [`graph::GraphStore`] as the
//! in-memory implementation.
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_datagen::command::{create_entities, relate_entities};
//! use samyama_datagen::dataset::DatasetManager;
//! use samyama_datagen::entity::{EntitySpec, IndexedProperty};
//! use samyama_datagen::finders::RandomNodes;
//! use samyama_datagen::graph::GraphStore;
//! use samyama_datagen::log::TracingLog;
//! use samyama_datagen::range::Range;
//!
//! let mut manager = DatasetManager::new(GraphStore::new(), TracingLog).with_seed(7);
//! let mut dataset = manager.new_dataset("shop");
//!
//! let users = create_entities(EntitySpec::new("user").with_property(IndexedProperty::new("name")))
//!     .quantity(10)
//!     .update(&mut dataset)
//!     .unwrap();
//! let products = create_entities(EntitySpec::new("product"))
//!     .quantity(5)
//!     .update(&mut dataset)
//!     .unwrap();
//!
//! relate_entities(&users)
//!     .to(RandomNodes::from_entities(&products))
//!     .relationship("BOUGHT")
//!     .cardinality(Range::new(0, 3).unwrap())
//!     .update_no_return(&mut dataset)
//!     .unwrap();
//!
//! let stats = dataset.end();
//! assert_eq!(stats.nodes_created, 15);
//! ```

pub mod command;
pub mod config;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod finders;
pub mod graph;
pub mod log;
pub mod numbers;
pub mod range;
pub mod selection;
pub mod uniqueness;

pub use command::{create_entities, relate_entities, BatchCommand, ExecutionContext};
pub use config::{DatasetConfig, GenerationReport};
pub use dataset::{Dataset, DatasetManager, DatasetStatistics};
pub use entity::{DomainEntityInfo, EntitySpec};
pub use error::{DatagenError, DatagenResult};
pub use graph::{GraphBackend, GraphStore};
pub use range::Range;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

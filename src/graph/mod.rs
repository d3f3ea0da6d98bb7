//! Property graph model and store contract
//!
//! - Nodes with one or more labels and properties
//! - Directed, typed edges; multiple edges between the same pair allowed
//! - [`GraphBackend`]: the narrow interface the generator writes through
//! - [`GraphStore`]: in-memory backend with transactional batches

pub mod backend;
pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use backend::{GraphBackend, Transaction};
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{Direction, EdgeId, EdgeType, Label, NodeId};

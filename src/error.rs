//! Error types for dataset generation

use crate::graph::GraphError;
use thiserror::Error;

/// Errors that can occur while building or running generation commands
#[derive(Error, Debug)]
pub enum DatagenError {
    /// Invalid command configuration, detected before any work runs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// More distinct values requested than the domain holds
    #[error("Domain exhausted: requested {requested} distinct values from a domain of {domain}")]
    DomainExhausted { requested: usize, domain: usize },

    /// A finder was asked for nodes from a pool that has none
    #[error("No nodes available in pool '{0}'")]
    EmptyPool(String),

    /// Failure reported by the underlying store
    #[error("Store failure: {0}")]
    Store(#[from] GraphError),

    /// A command aborted at a specific iteration
    #[error("Command {command} failed at iteration {iteration}: {source}")]
    CommandFailed {
        command: String,
        iteration: usize,
        #[source]
        source: Box<DatagenError>,
    },

    /// Invalid dataset description
    #[error("Invalid dataset description: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatagenError {
    /// The innermost error, unwrapping `CommandFailed` layers
    pub fn root_cause(&self) -> &DatagenError {
        match self {
            DatagenError::CommandFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type DatagenResult<T> = Result<T, DatagenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    #[test]
    fn test_command_failed_message() {
        let err = DatagenError::CommandFailed {
            command: "(user)-[:BOUGHT]->(product)".to_string(),
            iteration: 7,
            source: Box::new(DatagenError::Store(GraphError::NodeNotFound(NodeId::new(3)))),
        };
        assert_eq!(
            err.to_string(),
            "Command (user)-[:BOUGHT]->(product) failed at iteration 7: Store failure: Node NodeId(3) not found"
        );
        assert!(matches!(err.root_cause(), DatagenError::Store(GraphError::NodeNotFound(_))));
    }

    #[test]
    fn test_domain_exhausted_message() {
        let err = DatagenError::DomainExhausted { requested: 5, domain: 3 };
        assert!(err.to_string().contains("requested 5"));
    }
}

//! Duplicate-avoidance policies for relationship creation
//!
//! A skipped relationship is reported as `Ok(None)`: it is a normal outcome
//! of the policy, never an error.

use crate::graph::{Direction, EdgeId, EdgeType, GraphBackend, GraphResult, NodeId};

/// Decides whether a candidate relationship may be created
pub trait UniquenessStrategy {
    /// Create the relationship if the policy allows it
    fn apply(
        &self,
        store: &mut dyn GraphBackend,
        start: NodeId,
        end: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<Option<EdgeId>>;

    fn description(&self) -> &'static str;
}

impl<U: UniquenessStrategy + ?Sized> UniquenessStrategy for Box<U> {
    fn apply(
        &self,
        store: &mut dyn GraphBackend,
        start: NodeId,
        end: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<Option<EdgeId>> {
        (**self).apply(store, start, end, edge_type, direction)
    }

    fn description(&self) -> &'static str {
        (**self).description()
    }
}

/// No check: every candidate becomes a relationship
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowMultiple;

impl UniquenessStrategy for AllowMultiple {
    fn apply(
        &self,
        store: &mut dyn GraphBackend,
        start: NodeId,
        end: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<Option<EdgeId>> {
        store
            .create_relationship(start, end, edge_type, direction)
            .map(Some)
    }

    fn description(&self) -> &'static str {
        "ALLOW_MULTIPLE"
    }
}

/// At most one relationship of a type per pair and orientation.
///
/// Check-then-create is only atomic under sequential execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unique;

impl UniquenessStrategy for Unique {
    fn apply(
        &self,
        store: &mut dyn GraphBackend,
        start: NodeId,
        end: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<Option<EdgeId>> {
        if store.relationship_exists(start, end, edge_type, direction) {
            return Ok(None);
        }
        store
            .create_relationship(start, end, edge_type, direction)
            .map(Some)
    }

    fn description(&self) -> &'static str {
        "SINGLE_DIRECTION"
    }
}

/// At most one relationship of a type per pair, whichever way it points
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueBothDirections;

impl UniquenessStrategy for UniqueBothDirections {
    fn apply(
        &self,
        store: &mut dyn GraphBackend,
        start: NodeId,
        end: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<Option<EdgeId>> {
        if store.relationship_exists(start, end, edge_type, Direction::Both) {
            return Ok(None);
        }
        store
            .create_relationship(start, end, edge_type, direction)
            .map(Some)
    }

    fn description(&self) -> &'static str {
        "BOTH_DIRECTIONS"
    }
}

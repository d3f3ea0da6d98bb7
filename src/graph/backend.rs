//! Store collaborator contract used by the generator
//!
//! Any graph store the generator writes into implements [`GraphBackend`].
//! Batches run inside a [`Transaction`], which rolls back whenever it is
//! dropped without an explicit commit.

use super::property::PropertyValue;
use super::store::GraphResult;
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Narrow write/read interface a graph store exposes to the generator
pub trait GraphBackend {
    /// Create a node carrying the given labels
    fn create_node(&mut self, labels: &[Label]) -> GraphResult<NodeId>;

    /// Set a property on an existing node
    fn set_node_property(&mut self, id: NodeId, key: &str, value: PropertyValue) -> GraphResult<()>;

    /// Set a property on an existing relationship
    fn set_relationship_property(&mut self, id: EdgeId, key: &str, value: PropertyValue) -> GraphResult<()>;

    /// Create a relationship between `from` and `to`. `Incoming` stores the
    /// edge as `to -> from`.
    fn create_relationship(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> GraphResult<EdgeId>;

    /// Whether a relationship of this type already links `from` and `to`
    /// with the given orientation
    fn relationship_exists(
        &self,
        from: NodeId,
        to: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> bool;

    /// Resolve an identifier to a live node handle
    fn lookup_by_id(&self, id: NodeId) -> GraphResult<NodeId>;

    /// All nodes carrying a label, in ascending id order
    fn nodes_by_label(&self, label: &Label) -> Vec<NodeId>;

    /// Nodes one hop away from `id` over relationships of the given type
    fn related_nodes(&self, id: NodeId, edge_type: &EdgeType, direction: Direction) -> Vec<NodeId>;

    fn begin(&mut self) -> GraphResult<()>;

    fn commit(&mut self) -> GraphResult<()>;

    fn rollback(&mut self) -> GraphResult<()>;
}

/// Scoped unit of work over a backend
///
/// Rolls back on drop unless [`Transaction::commit`] or
/// [`Transaction::rollback`] was called.
pub struct Transaction<'a> {
    store: &'a mut dyn GraphBackend,
    finished: bool,
}

impl<'a> Transaction<'a> {
    /// Open a transaction on the store
    pub fn begin(store: &'a mut dyn GraphBackend) -> GraphResult<Self> {
        store.begin()?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    pub fn commit(mut self) -> GraphResult<()> {
        self.finished = true;
        self.store.commit()
    }

    pub fn rollback(mut self) -> GraphResult<()> {
        self.finished = true;
        self.store.rollback()
    }
}

impl<'a> Deref for Transaction<'a> {
    type Target = dyn GraphBackend + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.store
    }
}

impl<'a> DerefMut for Transaction<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.store
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Transaction dropped without commit, rolling back");
            if let Err(e) = self.store.rollback() {
                warn!("Rollback failed: {}", e);
            }
        }
    }
}

//! Integration tests for dataset execution
//!
//! Verifies batch boundaries, command interleaving and rollback of failed
//! batches.

use rand::RngCore;
use samyama_datagen::command::{create_entities, relate_entities, BatchCommand};
use samyama_datagen::dataset::DatasetManager;
use samyama_datagen::entity::{EntitySpec, IndexedProperty};
use samyama_datagen::error::{DatagenError, DatagenResult};
use samyama_datagen::finders::{NodeFinderStrategy, RandomNodes, UniqueRandomNodes};
use samyama_datagen::graph::{GraphBackend, GraphError, GraphStore, Label, NodeId};
use samyama_datagen::log::CapturingLog;
use samyama_datagen::range::Range;
use samyama_datagen::selection::{CommandSelectionStrategy, PendingCommand, RoundRobin, Sequential};

/// Returns `target` until call number `fail_at`, then reports a missing node
struct FailingFinder {
    target: NodeId,
    calls: usize,
    fail_at: usize,
}

impl NodeFinderStrategy for FailingFinder {
    fn get_nodes(
        &mut self,
        _store: &mut dyn GraphBackend,
        _source: NodeId,
        _quantity: usize,
        _rng: &mut dyn RngCore,
    ) -> DatagenResult<Vec<NodeId>> {
        let call = self.calls;
        self.calls += 1;
        if call == self.fail_at {
            return Err(GraphError::NodeNotFound(NodeId::new(9999)).into());
        }
        Ok(vec![self.target])
    }

    fn entity_name(&self) -> &str {
        "target"
    }
}

/// Picks one past the last pending command
struct PastTheEnd;

impl CommandSelectionStrategy for PastTheEnd {
    fn next_command(&mut self, pending: &[PendingCommand]) -> usize {
        pending.len()
    }
}

fn setup(users: usize) -> (DatasetManager<GraphStore>, Vec<NodeId>, NodeId) {
    let mut store = GraphStore::new();
    let ids = (0..users)
        .map(|_| store.create_node(&[Label::new("user")]).unwrap())
        .collect();
    let target = store.create_node(&[Label::new("target")]).unwrap();
    (DatasetManager::new(store, CapturingLog::new()).with_seed(1), ids, target)
}

#[test]
fn test_failed_batch_is_rolled_back() {
    let (mut manager, users, target) = setup(6);
    let users = samyama_datagen::DomainEntityInfo::new("user", users);
    let mut dataset = manager.new_dataset("failing");

    // Batches [0,2) and [2,4) commit; iteration 5 fails after iteration 4 wrote
    let result = relate_entities(&users)
        .to(FailingFinder { target, calls: 0, fail_at: 5 })
        .relationship("LINKED")
        .cardinality(Range::exactly(1))
        .batch_size(2)
        .update(&mut dataset);

    match result {
        Err(DatagenError::CommandFailed { command, iteration, source }) => {
            assert_eq!(command, "(user)-[:LINKED]->(target)");
            assert_eq!(iteration, 5);
            assert!(matches!(*source, DatagenError::Store(GraphError::NodeNotFound(_))));
        }
        other => panic!("expected CommandFailed, got {:?}", other.map(|info| info.len())),
    }
    drop(dataset);

    let store = manager.store();
    assert_eq!(store.edge_count(), 4);
    assert!(!store.in_transaction());
    assert_eq!(store.get_incoming_edges(target).len(), 4);
}

#[test]
fn test_failed_node_batch_leaves_earlier_nodes() {
    let (mut manager, _, _) = setup(0);
    let before = manager.store().node_count();

    struct Exploding {
        inner: samyama_datagen::command::CreateNodesCommand,
    }

    impl BatchCommand for Exploding {
        fn number_of_iterations(&self) -> usize {
            self.inner.number_of_iterations()
        }
        fn batch_size(&self) -> usize {
            self.inner.batch_size()
        }
        fn execute(
            &mut self,
            ctx: &mut samyama_datagen::ExecutionContext,
            store: &mut dyn GraphBackend,
            index: usize,
            rng: &mut dyn RngCore,
        ) -> DatagenResult<()> {
            if index == 7 {
                return Err(DatagenError::EmptyPool("boom".to_string()));
            }
            self.inner.execute(ctx, store, index, rng)
        }
        fn on_begin(&self, log: &dyn samyama_datagen::log::Log) {
            self.inner.on_begin(log)
        }
        fn on_end(&self, ctx: &samyama_datagen::ExecutionContext, log: &dyn samyama_datagen::log::Log) {
            self.inner.on_end(ctx, log)
        }
        fn description(&self) -> String {
            self.inner.description()
        }
        fn short_description(&self) -> String {
            self.inner.short_description()
        }
        fn results(&self, ctx: &samyama_datagen::ExecutionContext) -> samyama_datagen::DomainEntityInfo {
            self.inner.results(ctx)
        }
    }

    let mut command = Exploding {
        inner: create_entities(EntitySpec::new("item")).quantity(10).batch_size(3).build().unwrap(),
    };
    let mut dataset = manager.new_dataset("exploding");
    let err = dataset.execute(&mut command).unwrap_err();
    assert!(matches!(err.root_cause(), DatagenError::EmptyPool(_)));
    drop(dataset);

    // [0,3) and [3,6) committed, [6,9) rolled back
    assert_eq!(manager.store().node_count(), before + 6);
}

#[test]
fn test_round_robin_interleaves_batches() {
    let log = CapturingLog::new();
    let mut manager = DatasetManager::new(GraphStore::new(), log.clone()).with_seed(4);
    let mut dataset = manager.new_dataset("interleaved");

    let mut commands: Vec<Box<dyn BatchCommand>> = vec![
        Box::new(
            create_entities(EntitySpec::new("user").with_property(IndexedProperty::new("name")))
                .quantity(6)
                .batch_size(2)
                .build()
                .unwrap(),
        ),
        Box::new(create_entities(EntitySpec::new("product")).quantity(3).batch_size(2).build().unwrap()),
    ];
    let results = dataset.execute_all(&mut commands, &mut RoundRobin::new()).unwrap();
    let stats = dataset.end();

    assert_eq!(results[0].entity_name(), "user");
    assert_eq!(results[0].len(), 6);
    assert_eq!(results[1].entity_name(), "product");
    assert_eq!(results[1].len(), 3);
    assert_eq!(stats.batches, 5);
    assert_eq!(stats.nodes_created, 9);

    // Node ids reveal the interleaving: u u p p u u p u u
    let users: Vec<u64> = results[0].node_ids().iter().map(|id| id.as_u64()).collect();
    let products: Vec<u64> = results[1].node_ids().iter().map(|id| id.as_u64()).collect();
    assert_eq!(users, vec![1, 2, 5, 6, 8, 9]);
    assert_eq!(products, vec![3, 4, 7]);

    let lines = log.lines();
    assert!(lines.contains(&"Creating '(user)' nodes.".to_string()));
    assert!(lines.contains(&"      [Created: 3 product]".to_string()));
}

#[test]
fn test_sequential_runs_in_submission_order() {
    let mut manager = DatasetManager::new(GraphStore::new(), CapturingLog::new()).with_seed(4);
    let mut dataset = manager.new_dataset("sequential");

    let mut commands: Vec<Box<dyn BatchCommand>> = vec![
        Box::new(create_entities(EntitySpec::new("user")).quantity(3).batch_size(2).build().unwrap()),
        Box::new(create_entities(EntitySpec::new("product")).quantity(2).batch_size(2).build().unwrap()),
    ];
    let results = dataset.execute_all(&mut commands, &mut Sequential).unwrap();

    let users: Vec<u64> = results[0].node_ids().iter().map(|id| id.as_u64()).collect();
    assert_eq!(users, vec![1, 2, 3]);
    let products: Vec<u64> = results[1].node_ids().iter().map(|id| id.as_u64()).collect();
    assert_eq!(products, vec![4, 5]);
}

#[test]
fn test_relationship_command_after_creation_in_one_dataset() {
    let log = CapturingLog::new();
    let mut manager = DatasetManager::new(GraphStore::new(), log.clone()).with_seed(17);
    let mut dataset = manager.new_dataset("shop");

    let users = create_entities(EntitySpec::new("user")).quantity(4).update(&mut dataset).unwrap();
    let products = create_entities(EntitySpec::new("product")).quantity(4).update(&mut dataset).unwrap();
    relate_entities(&users)
        .to(RandomNodes::from_entities(&products))
        .relationship("BOUGHT")
        .cardinality(Range::exactly(2))
        .update_no_return(&mut dataset)
        .unwrap();
    let stats = dataset.end();

    assert_eq!(stats.commands, 3);
    assert_eq!(stats.relationships_created, 8);
    assert_eq!(manager.store().edge_count(), 8);

    let lines = log.lines();
    assert!(lines.contains(&"Creating '(user)-[:BOUGHT]->(product)' relationships.".to_string()));
    assert!(lines.contains(&"      [Min: 2, Max: 2, Uniqueness: ALLOW_MULTIPLE, Distribution: flat]".to_string()));
    assert!(lines.contains(&"      [Avg: 2.00 relationship(s) per user, Skipped: 0]".to_string()));
}

#[test]
fn test_exhausted_domain_aborts_command() {
    let mut store = GraphStore::new();
    let users: Vec<NodeId> = (0..3).map(|_| store.create_node(&[Label::new("user")]).unwrap()).collect();
    for _ in 0..2 {
        store.create_node(&[Label::new("product")]).unwrap();
    }
    let mut manager = DatasetManager::new(store, CapturingLog::new()).with_seed(5);
    let users = samyama_datagen::DomainEntityInfo::new("user", users);
    let mut dataset = manager.new_dataset("exhausted");

    let result = relate_entities(&users)
        .to(UniqueRandomNodes::from_label("product"))
        .relationship("BOUGHT")
        .cardinality(Range::exactly(3))
        .update(&mut dataset);

    let err = result.unwrap_err();
    match &err {
        DatagenError::CommandFailed { command, iteration, .. } => {
            assert_eq!(command, "(user)-[:BOUGHT]->(product)");
            assert_eq!(*iteration, 0);
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
    assert!(matches!(
        err.root_cause(),
        DatagenError::DomainExhausted { requested: 3, domain: 2 }
    ));
    drop(dataset);
    assert_eq!(manager.store().edge_count(), 0);
}

#[test]
fn test_empty_pool_aborts_command() {
    let (mut manager, users, _) = setup(2);
    let users = samyama_datagen::DomainEntityInfo::new("user", users);
    let mut dataset = manager.new_dataset("empty");

    let err = relate_entities(&users)
        .to(RandomNodes::from_label("missing"))
        .relationship("KNOWS")
        .cardinality(Range::exactly(1))
        .update_no_return(&mut dataset)
        .unwrap_err();

    assert!(matches!(err, DatagenError::CommandFailed { iteration: 0, .. }));
    assert!(matches!(err.root_cause(), DatagenError::EmptyPool(name) if name == "missing"));
    assert_eq!(dataset.end().relationships_created, 0);
}

#[test]
fn test_open_transaction_fails_first_batch() {
    let (mut manager, _, _) = setup(1);
    manager.store_mut().begin().unwrap();
    let mut dataset = manager.new_dataset("busy");

    let err = create_entities(EntitySpec::new("user")).quantity(2).update(&mut dataset).unwrap_err();

    match &err {
        DatagenError::CommandFailed { command, iteration, .. } => {
            assert_eq!(command, "(user)");
            assert_eq!(*iteration, 0);
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
    assert!(matches!(
        err.root_cause(),
        DatagenError::Store(GraphError::TransactionAlreadyActive)
    ));
}

#[test]
fn test_out_of_range_selection_is_configuration_error() {
    let mut manager = DatasetManager::new(GraphStore::new(), CapturingLog::new()).with_seed(2);
    let mut dataset = manager.new_dataset("selection");

    let mut commands: Vec<Box<dyn BatchCommand>> =
        vec![Box::new(create_entities(EntitySpec::new("user")).quantity(2).build().unwrap())];
    let result = dataset.execute_all(&mut commands, &mut PastTheEnd);

    match result {
        Err(DatagenError::Configuration(message)) => {
            assert_eq!(message, "Selection strategy chose command 1 of 1 pending");
        }
        other => panic!("expected Configuration, got {:?}", other.map(|r| r.len())),
    }
    drop(dataset);
    assert_eq!(manager.store().node_count(), 0);
}

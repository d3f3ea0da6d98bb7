use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use samyama_datagen::command::{create_entities, relate_entities};
use samyama_datagen::dataset::DatasetManager;
use samyama_datagen::entity::{EntitySpec, IndexedProperty, RangeProperty};
use samyama_datagen::finders::{QueryNodes, RandomNodes, Traversal};
use samyama_datagen::graph::{Direction, GraphStore};
use samyama_datagen::log::CapturingLog;
use samyama_datagen::numbers::UniqueNumbers;
use samyama_datagen::range::Range;
use samyama_datagen::uniqueness::Unique;

fn person() -> EntitySpec {
    EntitySpec::new("Person")
        .with_property(IndexedProperty::new("name"))
        .with_property(RangeProperty::new("age", Range::exactly(30)))
}

/// Benchmark node creation throughput
fn bench_node_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_creation");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut manager = DatasetManager::new(GraphStore::new(), CapturingLog::new()).with_seed(1);
                let mut dataset = manager.new_dataset("bench");
                let people = create_entities(person()).quantity(size).update(&mut dataset).unwrap();
                criterion::black_box(people.len());
            });
        });
    }
    group.finish();
}

/// Benchmark random relationship creation with the unique check
fn bench_relate_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("relate_random");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut manager = DatasetManager::new(GraphStore::new(), CapturingLog::new()).with_seed(1);
                let mut dataset = manager.new_dataset("bench");
                let people = create_entities(person()).quantity(size).update(&mut dataset).unwrap();
                relate_entities(&people)
                    .to(RandomNodes::from_entities(&people))
                    .relationship("KNOWS")
                    .cardinality_with(Range::new(1, 5).unwrap(), Unique)
                    .update_no_return(&mut dataset)
                    .unwrap();
                criterion::black_box(dataset.end());
            });
        });
    }
    group.finish();
}

/// Benchmark two-hop query finder
fn bench_friend_of_friend(c: &mut Criterion) {
    let mut group = c.benchmark_group("friend_of_friend");
    group.bench_function("1000_people", |b| {
        b.iter(|| {
            let mut manager = DatasetManager::new(GraphStore::new(), CapturingLog::new()).with_seed(1);
            let mut dataset = manager.new_dataset("bench");
            let people = create_entities(person()).quantity(1000).update(&mut dataset).unwrap();
            relate_entities(&people)
                .to(RandomNodes::from_entities(&people))
                .relationship("FRIEND")
                .cardinality(Range::new(1, 4).unwrap())
                .update_no_return(&mut dataset)
                .unwrap();
            let traversal = Traversal::new()
                .hop("FRIEND", Direction::Outgoing)
                .hop("FRIEND", Direction::Outgoing);
            relate_entities(&people)
                .to(QueryNodes::new("Person", traversal))
                .relationship("SUGGESTED")
                .cardinality(Range::new(0, 3).unwrap())
                .update_no_return(&mut dataset)
                .unwrap();
            criterion::black_box(dataset.end());
        });
    });
    group.finish();
}

/// Benchmark distinct index sampling
fn bench_unique_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("unique_numbers");
    let mut rng = StdRng::seed_from_u64(7);

    for count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                criterion::black_box(UniqueNumbers::sample(100_000, count, &mut rng).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_node_creation,
    bench_relate_random,
    bench_friend_of_friend,
    bench_unique_numbers,
);
criterion_main!(benches);

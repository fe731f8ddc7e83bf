//! stmgc Barrier Benchmarks
//!
//! Fast and slow paths of the barriers, nursery allocation and local
//! collection. Run with: `cargo bench --package stmgc`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stmgc::object::{write_field, TypeInfo, TypeRegistry};
use stmgc::{StmConfig, StmGc, StmThread};

const S: u16 = 1;
const SR: u16 = 2;

fn create_gc() -> Arc<StmGc> {
    let mut types = TypeRegistry::new();
    types.register(S, TypeInfo::new("S", 24)).unwrap();
    types
        .register(SR, TypeInfo::new("SR", 24).with_pointers(&[0, 8, 16]))
        .unwrap();
    let config = StmConfig {
        nursery_size: 4 * 1024 * 1024,
        verify_invariants: false,
        ..Default::default()
    };
    StmGc::emulated(config, types).unwrap()
}

fn worker(gc: &Arc<StmGc>) -> StmThread {
    let mut thread = gc.worker_thread().unwrap();
    thread.start_transaction().unwrap();
    thread
}

fn bench_read_barrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_barrier");
    let gc = create_gc();
    let global = gc.allocate_global(S).unwrap();
    let shadowed = gc.allocate_global(S).unwrap();
    let mut thread = worker(&gc);
    let local = thread.allocate_object(S).unwrap();
    thread.write_barrier(shadowed).unwrap();

    group.bench_function("local", |b| b.iter(|| black_box(thread.read_barrier(black_box(local)))));
    group.bench_function("global", |b| b.iter(|| black_box(thread.read_barrier(black_box(global)))));
    group.bench_function("global_with_local_copy", |b| {
        b.iter(|| black_box(thread.read_barrier(black_box(shadowed))))
    });

    group.finish();
}

fn bench_write_barrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_barrier");
    let gc = create_gc();

    group.bench_function("already_written", |b| {
        let mut thread = worker(&gc);
        let obj = thread.allocate_object(S).unwrap();
        b.iter(|| black_box(thread.write_barrier(black_box(obj)).unwrap()))
    });

    group.bench_function("localized_global", |b| {
        let g = gc.allocate_global(S).unwrap();
        let mut thread = worker(&gc);
        thread.write_barrier(g).unwrap();
        b.iter(|| black_box(thread.write_barrier(black_box(g)).unwrap()))
    });

    // global space is never reclaimed: a fresh collector per sample
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(1));
    group.bench_function("localize_and_commit", |b| {
        b.iter_custom(|iters| {
            let gc = create_gc();
            let mut thread = worker(&gc);
            let mut latest = gc.allocate_global(S).unwrap();
            let start = Instant::now();
            for _ in 0..iters {
                black_box(thread.write_barrier(latest).unwrap());
                thread.commit_transaction().unwrap();
                latest = thread.read_barrier(latest);
            }
            start.elapsed()
        })
    });

    group.finish();
}

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");
    let gc = create_gc();
    let mut thread = worker(&gc);

    group.throughput(Throughput::Elements(1));
    group.bench_function("nursery_object", |b| {
        b.iter(|| black_box(thread.allocate_object(S).unwrap()))
    });

    group.finish();
}

fn build_list(thread: &mut StmThread, len: usize) -> usize {
    let mut head = 0;
    for _ in 0..len {
        let node = thread.allocate_object(SR).unwrap();
        unsafe { write_field(node, 8, head) };
        head = node;
    }
    head
}

fn bench_local_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_collection");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(1));

    for &len in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(len as u64));

        group.bench_function(format!("dead_list_{}", len), |b| {
            let gc = create_gc();
            let mut thread = worker(&gc);
            b.iter(|| {
                black_box(build_list(&mut thread, len));
                black_box(thread.local_collection().unwrap());
            })
        });

        group.bench_function(format!("rooted_list_{}", len), |b| {
            b.iter_custom(|iters| {
                let gc = create_gc();
                let mut thread = worker(&gc);
                let start = Instant::now();
                for _ in 0..iters {
                    let head = build_list(&mut thread, len);
                    thread.push_root(head);
                    black_box(thread.local_collection().unwrap());
                    thread.pop_root();
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_read_barrier,
    bench_write_barrier,
    bench_allocation,
    bench_local_collection
);
criterion_main!(benches);

//! Criterion benchmarks for the reorderable chain
//!
//! Run with: cargo bench -p cadena-chain
#![allow(missing_docs)]

use cadena_chain::{
    BypassSet, ChainConfig, ChainOrder, ChainProcessor, OrderQueue, StageKind, StageRegistry,
    assemble, codec,
};
use cadena_core::ProcessSpec;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn permutations(count: usize) -> Vec<ChainOrder> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count).map(|_| ChainOrder::shuffled(&mut rng)).collect()
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("ChainProcessor");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let config = ChainConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_max_block_size(block_size);

        group.bench_with_input(
            BenchmarkId::new("steady", block_size),
            &block_size,
            |b, _| {
                let (mut processor, _controller) = ChainProcessor::new(&config).unwrap();
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    processor.process(black_box(&mut [&mut left[..], &mut right[..]]));
                });
            },
        );

        // A fresh order queued before every block
        group.bench_with_input(
            BenchmarkId::new("reorder_every_block", block_size),
            &block_size,
            |b, _| {
                let (mut processor, mut controller) = ChainProcessor::new(&config).unwrap();
                let orders = permutations(64);
                let mut next = orders.iter().cycle();
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    if let Some(&order) = next.next() {
                        let _ = controller.push_order(order);
                    }
                    processor.process(black_box(&mut [&mut left[..], &mut right[..]]));
                });
            },
        );
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assembly");
    let spec = ProcessSpec::mono(SAMPLE_RATE, 256);
    let mut registry = StageRegistry::new(&spec);
    let order = ChainOrder::STANDARD.with_moved(4, 0).unwrap();
    let bypass = BypassSet::NONE.with(StageKind::Chorus, true);

    group.bench_function("assemble_plan", |b| {
        b.iter(|| {
            let assembly = assemble(black_box(&order), &mut registry, black_box(&bypass));
            black_box(assembly.plan())
        });
    });

    group.finish();
}

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderQueue");
    let orders = permutations(32);

    group.bench_function("push_drain_32", |b| {
        let (mut producer, mut consumer) = OrderQueue::with_capacity(64);
        b.iter(|| {
            for &order in &orders {
                let _ = producer.push(black_box(order));
            }
            black_box(consumer.drain_latest())
        });
    });

    group.bench_function("codec_roundtrip", |b| {
        b.iter(|| {
            let bytes = codec::order_to_bytes(black_box(&orders[0]));
            black_box(codec::order_from_bytes(&bytes))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_process, bench_assemble, bench_queue);
criterion_main!(benches);

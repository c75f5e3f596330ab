//! Performance benchmarks for rooted-graph classification.
//!
//! Run with: `cargo bench --bench classification`
//!
//! ## Workload
//!
//! A periodic honeycomb (every vertex of degree 3, every ring a hexagon)
//! gives identical balls at every root, so timings isolate the per-root
//! cost of each scheme.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use swatches::{
    ClassificationPolicy, ClassificationType, EmpiricalDistribution, Network, RootSelection, RootedGraph,
    VertexId,
};

/// Honeycomb on a `width x height` torus of hexagons (brick-wall layout).
fn honeycomb(width: usize, height: usize) -> Network {
    let cols = 2 * width;
    let mut network = Network::new(0);
    for _ in 0..(cols * height) {
        network.add_vertex(0);
    }
    let id = |x: usize, y: usize| VertexId::new((y % height) * cols + (x % cols));
    for y in 0..height {
        for x in 0..cols {
            network.add_edge(id(x, y), id(x + 1, y));
            if (x + y) % 2 == 0 {
                network.add_edge(id(x, y), id(x, y + 1));
            }
        }
    }
    network
}

/// Benchmark one full distribution per scheme.
fn bench_distribution(c: &mut Criterion) {
    let network = honeycomb(6, 6);
    let mut group = c.benchmark_group("distribution");
    group.throughput(Throughput::Elements(network.len() as u64));

    for classification in ClassificationType::ALL {
        group.bench_with_input(
            BenchmarkId::new(classification.to_string(), 3),
            &network,
            |b, network| {
                b.iter(|| {
                    let policy = ClassificationPolicy::new(classification, 3, RootSelection::All);
                    let mut distribution = EmpiricalDistribution::new(policy).unwrap();
                    distribution.compute(black_box(network), &[]).unwrap();
                    distribution
                })
            },
        );
    }

    group.finish();
}

/// Benchmark neighborhood extraction alone.
fn bench_extraction(c: &mut Criterion) {
    let network = honeycomb(8, 8);
    let mut group = c.benchmark_group("extraction");

    for radius in [1, 3, 5] {
        group.bench_with_input(BenchmarkId::new("radius", radius), &radius, |b, &radius| {
            b.iter(|| {
                let rooted = RootedGraph::extract(&network, black_box(VertexId::new(0)), radius).unwrap();
                rooted.len()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_distribution, bench_extraction);
criterion_main!(benches);

//! Benchmarks for dominator analysis and irreducible-loop elimination.
//!
//! Tests performance on synthetic control-flow graphs:
//! - Long chains of nested natural loops (dominators, reducibility test)
//! - Ladders of two-entry loops (one split per rung)
//! - Fully connected loop bodies (nested splits)
//! - Batch conversion of many independent graphs

extern crate cfgreduce;

use cfgreduce::{
    analysis::{
        convert_batch, split_irreducible_graph, ConversionJob, ConverterConfig, GraphCopyBackend,
    },
    utils::graph::{
        algorithms::{build_dominator_tree, is_irreducible},
        DirectedGraph, GraphBase,
    },
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// Nested loops: `i -> i + 1` and a latch `i + 1 -> i` at every level.
fn nested_loops(depth: usize) -> DirectedGraph {
    let edges = (0..depth).flat_map(|i| [(i, i + 1), (i + 1, i.max(1))]);
    DirectedGraph::from_edges(depth + 1, edges)
}

/// A sequence of two-entry loops, each rung `a <-> b` entered at both nodes.
fn irreducible_ladder(rungs: usize) -> DirectedGraph {
    let mut edges = Vec::new();
    for rung in 0..rungs {
        let head = rung * 3;
        let (a, b, next) = (head + 1, head + 2, head + 3);
        edges.extend([(head, a), (head, b), (a, b), (b, a), (a, next), (b, next)]);
    }
    DirectedGraph::from_edges(rungs * 3 + 1, edges)
}

/// A loop body where every node jumps to every other and all are entered from 0.
fn complete_loop(size: usize) -> DirectedGraph {
    let mut edges = Vec::new();
    for from in 1..=size {
        edges.push((0, from));
        edges.extend((1..=size).filter(|&to| to != from).map(|to| (from, to)));
    }
    DirectedGraph::from_edges(size + 1, edges)
}

/// Benchmark the dominator tree and the reducibility test on deep loop nests.
fn bench_dominators(c: &mut Criterion) {
    let mut group = c.benchmark_group("dominators");
    for depth in [64, 512, 4096] {
        let graph = nested_loops(depth);
        group.bench_with_input(
            BenchmarkId::new("build_dominator_tree", depth),
            &graph,
            |b, g| b.iter(|| black_box(build_dominator_tree(black_box(g)))),
        );
        group.bench_with_input(BenchmarkId::new("is_irreducible", depth), &graph, |b, g| {
            b.iter(|| black_box(is_irreducible(black_box(g))));
        });
    }
    group.finish();
}

/// Benchmark conversion of graphs with many independent irreducible loops.
fn bench_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_ladder");
    for rungs in [4, 32, 128] {
        let graph = irreducible_ladder(rungs);
        let weights = vec![1; graph.node_count()];
        group.bench_with_input(BenchmarkId::from_parameter(rungs), &graph, |b, g| {
            b.iter(|| {
                let mut backend = GraphCopyBackend::new(g);
                let result =
                    split_irreducible_graph(black_box(g), &weights, &mut backend).unwrap();
                black_box(result)
            });
        });
    }
    group.finish();
}

/// Benchmark conversion of fully connected loop bodies, which need nested splits.
fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_complete");
    group.sample_size(20);
    for size in [3, 4, 5] {
        let graph = complete_loop(size);
        let weights: Vec<u64> = (0..graph.node_count() as u64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, g| {
            b.iter(|| {
                let mut backend = GraphCopyBackend::new(g);
                let result =
                    split_irreducible_graph(black_box(g), &weights, &mut backend).unwrap();
                black_box(result)
            });
        });
    }
    group.finish();
}

/// Benchmark parallel conversion of many small graphs.
fn bench_batch(c: &mut Criterion) {
    let graph = irreducible_ladder(8);
    let config = ConverterConfig::default();

    c.bench_function("convert_batch_256", |b| {
        b.iter(|| {
            let mut jobs: Vec<_> = (0..256)
                .map(|_| {
                    ConversionJob::new(
                        graph.clone(),
                        vec![1; graph.node_count()],
                        GraphCopyBackend::new(&graph),
                    )
                })
                .collect();
            black_box(convert_batch(&mut jobs, &config))
        });
    });
}

criterion_group!(benches, bench_dominators, bench_ladder, bench_complete, bench_batch);
criterion_main!(benches);

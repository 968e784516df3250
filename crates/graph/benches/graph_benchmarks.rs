//! Benchmarks for quest graph operations
//!
//! Run with: cargo bench -p questgraph-graph

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use questgraph_graph::{PrerequisiteEdge, QuestGraph, QuestId, QuestNodeRef};
use std::collections::HashSet;
use std::hint::black_box;

type Definition = (Vec<QuestNodeRef>, Vec<PrerequisiteEdge>);

/// Many quests unlocked by a single root
fn wide_chain(quest_count: usize) -> Definition {
    let mut nodes = vec![QuestNodeRef::unlabeled("root")];
    let mut edges = Vec::with_capacity(quest_count);
    for i in 0..quest_count {
        let id = format!("quest_{i}");
        edges.push(PrerequisiteEdge::new("root", id.as_str()));
        nodes.push(QuestNodeRef::unlabeled(id));
    }
    (nodes, edges)
}

/// One long storyline
fn deep_chain(depth: usize) -> Definition {
    let nodes: Vec<QuestNodeRef> = (0..depth)
        .map(|i| QuestNodeRef::unlabeled(format!("quest_{i}")))
        .collect();
    let edges = (1..depth)
        .map(|i| PrerequisiteEdge::new(format!("quest_{}", i - 1), format!("quest_{i}")))
        .collect();
    (nodes, edges)
}

/// Fan-out then fan-in at every level
fn diamond_chain(width: usize, depth: usize) -> Definition {
    let mut nodes = vec![QuestNodeRef::unlabeled("root")];
    let mut edges = Vec::new();
    let mut prev_level: Vec<String> = vec!["root".to_string()];

    for level in 0..depth {
        let mut current_level = Vec::with_capacity(width);
        for w in 0..width {
            let id = format!("quest_{level}_{w}");
            for prev in &prev_level {
                edges.push(PrerequisiteEdge::new(prev.as_str(), id.as_str()));
            }
            nodes.push(QuestNodeRef::unlabeled(id.as_str()));
            current_level.push(id);
        }
        prev_level = current_level;
    }

    (nodes, edges)
}

fn build((nodes, edges): &Definition) -> QuestGraph {
    QuestGraph::build(nodes.iter().cloned(), edges.iter().cloned()).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [100, 1_000, 10_000] {
        let definition = wide_chain(size);
        group.bench_with_input(BenchmarkId::new("wide", size), &definition, |b, def| {
            b.iter(|| build(black_box(def)));
        });
    }
    group.finish();
}

fn bench_cycle_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_cycle");
    for depth in [100, 1_000, 10_000] {
        let graph = build(&deep_chain(depth));
        group.bench_with_input(BenchmarkId::new("deep", depth), &graph, |b, g| {
            b.iter(|| black_box(g.find_cycle()));
        });
    }
    for (width, depth) in [(5, 5), (10, 10), (20, 10)] {
        let graph = build(&diamond_chain(width, depth));
        group.bench_with_input(
            BenchmarkId::new("diamond", format!("{width}x{depth}")),
            &graph,
            |b, g| b.iter(|| black_box(g.find_cycle())),
        );
    }
    group.finish();
}

fn bench_topological_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_order");
    for size in [100, 1_000, 10_000] {
        let graph = build(&wide_chain(size));
        group.bench_with_input(BenchmarkId::new("wide", size), &graph, |b, g| {
            b.iter(|| g.topological_order().unwrap());
        });
    }
    for (width, depth) in [(10, 10), (20, 10)] {
        let graph = build(&diamond_chain(width, depth));
        group.bench_with_input(
            BenchmarkId::new("diamond", format!("{width}x{depth}")),
            &graph,
            |b, g| b.iter(|| g.topological_order().unwrap()),
        );
    }
    group.finish();
}

fn bench_frontier(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontier");
    for depth in [100, 1_000, 10_000] {
        let graph = build(&deep_chain(depth));
        let completed: HashSet<QuestId> = (0..depth / 2)
            .map(|i| QuestId::new(format!("quest_{i}")))
            .collect();
        group.bench_with_input(BenchmarkId::new("deep_half_done", depth), &graph, |b, g| {
            b.iter(|| g.frontier(black_box(&completed)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_cycle_detection,
    bench_topological_order,
    bench_frontier
);
criterion_main!(benches);

//! Benchmarks for graph analysis performance
//!
//! Measures cycle detection, weak-edge identification, and batch scoring
//! on generated graphs of clustered modules.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modscope::context::AnalysisContext;
use modscope::cycles::{annotate_weak_edges, detect_cycles};
use modscope::graph::{CouplingThresholds, Dependency, DependencyGraph, DependencyKind};
use modscope::scoring::{
    ExtractionScoreCalculator, FanCouplingMetric, MetricKind, MetricProviders, MetricTable,
    ScoringWeights,
};

/// Create a graph of `clusters` rings of `cluster_size` modules each.
///
/// Every ring is a cycle; consecutive rings are joined by a single edge so
/// the graph stays connected without merging components.
fn create_clustered_graph(clusters: usize, cluster_size: usize) -> DependencyGraph {
    let thresholds = CouplingThresholds::default();
    let mut graph =
        DependencyGraph::with_capacity(clusters * cluster_size, clusters * (cluster_size + 1));

    for c in 0..clusters {
        for m in 0..cluster_size {
            let name = format!("mod-{}-{}", c, m);
            graph.add_module(&name, format!("src/{}", name));
        }
    }

    for c in 0..clusters {
        for m in 0..cluster_size {
            let from = format!("mod-{}-{}", c, m);
            let to = format!("mod-{}-{}", c, (m + 1) % cluster_size);
            let score = ((c * 7 + m * 13) % 30) as u32 + 1;
            graph.add_dependency_with_metadata(
                &from,
                &to,
                Dependency::with_coupling(DependencyKind::ProjectReference, score, &thresholds),
            );
        }
        if c + 1 < clusters {
            graph.add_dependency(
                &format!("mod-{}-0", c),
                &format!("mod-{}-0", c + 1),
                DependencyKind::BinaryReference,
            );
        }
    }

    graph
}

/// Uniform metric tables covering every module of `graph`.
fn create_tables(graph: &DependencyGraph) -> (MetricTable, MetricTable, MetricTable) {
    let names: Vec<String> = graph.modules().map(|m| m.name.clone()).collect();
    let table = |kind: MetricKind, offset: usize| {
        MetricTable::from_values(
            kind,
            names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.clone(), ((i + offset) % 101) as f64)),
        )
    };
    (
        table(MetricKind::Complexity, 0),
        table(MetricKind::TechDebt, 31),
        table(MetricKind::ExternalExposure, 67),
    )
}

/// Benchmark Tarjan SCC cycle detection
fn bench_detect_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_cycles");
    let ctx = AnalysisContext::new();

    for clusters in [10, 100, 500, 1000].iter() {
        let graph = create_clustered_graph(*clusters, 5);

        group.bench_with_input(BenchmarkId::new("clusters", clusters), &graph, |b, graph| {
            b.iter(|| black_box(detect_cycles(graph, &ctx)));
        });
    }

    group.finish();
}

/// Benchmark weak-edge identification over detected cycles
fn bench_weak_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("weak_edges");
    let ctx = AnalysisContext::new();

    for clusters in [10, 100, 500].iter() {
        let graph = create_clustered_graph(*clusters, 8);
        let cycles = detect_cycles(&graph, &ctx).unwrap();

        group.bench_with_input(BenchmarkId::new("clusters", clusters), &cycles, |b, cycles| {
            b.iter(|| black_box(annotate_weak_edges(&graph, cycles.clone(), &ctx)));
        });
    }

    group.finish();
}

/// Benchmark batch extraction scoring, sequential against parallel
fn bench_score_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_all");
    let ctx = AnalysisContext::new();

    for clusters in [100, 1000].iter() {
        let graph = create_clustered_graph(*clusters, 5);
        let (complexity, tech_debt, exposure) = create_tables(&graph);
        let providers = MetricProviders::new(&complexity, &tech_debt, &exposure);

        for parallel in [false, true] {
            let calculator =
                ExtractionScoreCalculator::new(ScoringWeights::default()).with_parallel(parallel);
            let label = if parallel { "parallel" } else { "sequential" };

            group.bench_with_input(BenchmarkId::new(label, clusters), &graph, |b, graph| {
                b.iter(|| {
                    black_box(calculator.score_all(graph, &FanCouplingMetric, providers, &ctx))
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_detect_cycles, bench_weak_edges, bench_score_all);
criterion_main!(benches);

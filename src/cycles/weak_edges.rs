//! Weak-edge identification inside cycles.
//!
//! For every cycle, finds the internal dependencies with the lowest coupling
//! score. These are the cheapest places to cut a cycle. Ties are all kept.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::{Cycle, WeakEdge};
use crate::context::AnalysisContext;
use crate::error::AnalysisResult;
use crate::graph::{DependencyEdge, DependencyGraph, EdgeId};

/// Fills in weak edges and the weak coupling score of every cycle.
///
/// An edge is internal to a cycle only when both endpoints are members.
/// A cycle without internal edges is left unannotated and logged at debug
/// level; the remaining cycles are still processed.
///
/// # Example
///
/// ```rust
/// use modscope::context::AnalysisContext;
/// use modscope::cycles::{annotate_weak_edges, detect_cycles};
/// use modscope::graph::{CouplingThresholds, DependencyGraph, DependencyKind};
///
/// let mut graph = DependencyGraph::new();
/// graph.add_module("a", "a");
/// graph.add_module("b", "b");
/// let ab = graph.add_dependency("a", "b", DependencyKind::ProjectReference).unwrap();
/// let ba = graph.add_dependency("b", "a", DependencyKind::ProjectReference).unwrap();
/// graph.set_coupling(ab, 2, &CouplingThresholds::default()).unwrap();
/// graph.set_coupling(ba, 9, &CouplingThresholds::default()).unwrap();
///
/// let ctx = AnalysisContext::new();
/// let cycles = detect_cycles(&graph, &ctx).unwrap();
/// let cycles = annotate_weak_edges(&graph, cycles, &ctx).unwrap();
///
/// assert_eq!(cycles[0].weak_coupling_score(), Some(2));
/// assert_eq!(cycles[0].weak_edges().len(), 1);
/// assert_eq!(cycles[0].weak_edges()[0].source, "a");
/// ```
pub fn annotate_weak_edges(
    graph: &DependencyGraph,
    cycles: Vec<Cycle>,
    ctx: &AnalysisContext,
) -> AnalysisResult<Vec<Cycle>> {
    let _guard = ctx.span().enter();
    let cycle_count = cycles.len();
    let mut total_weak_edges = 0usize;
    let mut annotated = Vec::with_capacity(cycle_count);

    for cycle in cycles {
        ctx.checkpoint()?;

        let internal = internal_edges(graph, &cycle);
        let Some(min_score) = internal.iter().map(DependencyEdge::coupling_score).min() else {
            debug!(
                cycle = cycle.id(),
                size = cycle.len(),
                "Cycle has no internal edges; leaving weak edges empty"
            );
            annotated.push(cycle);
            continue;
        };

        let weak_edges: Vec<WeakEdge> = internal
            .iter()
            .filter(|edge| edge.coupling_score() == min_score)
            .map(|edge| WeakEdge {
                edge_index: edge.id.index(),
                source: edge.source.name.clone(),
                target: edge.target.name.clone(),
                coupling_score: min_score,
            })
            .collect();

        total_weak_edges += weak_edges.len();
        annotated.push(cycle.with_weak_edges(weak_edges, min_score));
    }

    let average = if cycle_count == 0 {
        0.0
    } else {
        total_weak_edges as f64 / cycle_count as f64
    };
    info!(
        weak_edges = total_weak_edges,
        cycles = cycle_count,
        "Identified {} weak edges across {} cycles (avg {:.2} per cycle)",
        total_weak_edges,
        cycle_count,
        average
    );

    Ok(annotated)
}

/// Edges whose source and target both belong to `cycle`, in graph order.
pub fn internal_edges<'g>(graph: &'g DependencyGraph, cycle: &Cycle) -> Vec<DependencyEdge<'g>> {
    let members: HashSet<&str> = cycle.modules().iter().map(String::as_str).collect();

    graph
        .edges()
        .filter(|edge| {
            members.contains(edge.source.name.as_str())
                && members.contains(edge.target.name.as_str())
        })
        .collect()
}

/// Every edge internal to some cycle, in a single pass over the graph.
///
/// Renderers use this to highlight cyclic edges; the weak edges of each
/// cycle are a subset of it.
pub fn edges_in_cycles(
    graph: &DependencyGraph,
    cycles: &[Cycle],
    ctx: &AnalysisContext,
) -> AnalysisResult<HashSet<EdgeId>> {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    for cycle in cycles {
        ctx.checkpoint()?;
        for module in cycle.modules() {
            owner.insert(module.as_str(), cycle.id());
        }
    }

    // Cycles are disjoint components, so an edge is internal iff both
    // endpoints belong to the same one.
    Ok(graph
        .edges()
        .filter(|edge| {
            match (
                owner.get(edge.source.name.as_str()),
                owner.get(edge.target.name.as_str()),
            ) {
                (Some(source), Some(target)) => source == target,
                _ => false,
            }
        })
        .map(|edge| edge.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use crate::cycles::detect_cycles;
    use crate::graph::{CouplingThresholds, DependencyKind};

    /// Builds a graph from `(from, to, coupling)` triples.
    fn scored_graph(edges: &[(&str, &str, i64)]) -> (DependencyGraph, Vec<EdgeId>) {
        let mut graph = DependencyGraph::new();
        for (from, to, _) in edges {
            graph.add_module(from, from);
            graph.add_module(to, to);
        }
        let thresholds = CouplingThresholds::default();
        let ids = edges
            .iter()
            .map(|(from, to, score)| {
                let id = graph
                    .add_dependency(from, to, DependencyKind::ProjectReference)
                    .unwrap();
                graph.set_coupling(id, *score, &thresholds).unwrap();
                id
            })
            .collect();
        (graph, ids)
    }

    fn analyze(graph: &DependencyGraph) -> Vec<Cycle> {
        let ctx = AnalysisContext::new();
        let cycles = detect_cycles(graph, &ctx).unwrap();
        annotate_weak_edges(graph, cycles, &ctx).unwrap()
    }

    fn weak_ids(cycle: &Cycle) -> HashSet<EdgeId> {
        cycle.weak_edges().iter().map(WeakEdge::edge_id).collect()
    }

    #[test]
    fn test_uniform_triangle_keeps_every_tie() {
        let (graph, ids) = scored_graph(&[("a", "b", 5), ("b", "c", 5), ("c", "a", 5)]);
        let cycles = analyze(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].weak_coupling_score(), Some(5));
        assert_eq!(weak_ids(&cycles[0]), ids.into_iter().collect());
    }

    #[test]
    fn test_only_minimum_edges_are_weak() {
        let (graph, ids) = scored_graph(&[
            ("a", "b", 3),
            ("b", "c", 10),
            ("c", "a", 3),
            ("a", "c", 15),
            ("c", "b", 3),
        ]);
        let cycles = analyze(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].weak_coupling_score(), Some(3));
        let expected: HashSet<EdgeId> = [ids[0], ids[2], ids[4]].into_iter().collect();
        assert_eq!(weak_ids(&cycles[0]), expected);
    }

    #[test]
    fn test_external_edges_are_ignored() {
        // x -> a has the lowest score but only one endpoint in the cycle.
        let (graph, ids) = scored_graph(&[
            ("a", "b", 7),
            ("b", "a", 8),
            ("x", "a", 1),
            ("b", "y", 1),
        ]);
        let cycles = analyze(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].weak_coupling_score(), Some(7));
        assert_eq!(weak_ids(&cycles[0]), HashSet::from([ids[0]]));
    }

    #[test]
    fn test_parallel_internal_edges_are_independent() {
        let (graph, ids) = scored_graph(&[("a", "b", 4), ("a", "b", 4), ("b", "a", 9)]);
        let cycles = analyze(&graph);
        assert_eq!(weak_ids(&cycles[0]), HashSet::from([ids[0], ids[1]]));
    }

    #[test]
    fn test_cycle_without_internal_edges_is_left_unannotated() {
        let (graph, _) = scored_graph(&[("a", "b", 2), ("b", "a", 2)]);
        let phantom = Cycle::new(7, vec!["p".into(), "q".into()]);
        let cycles = annotate_weak_edges(&graph, vec![phantom], &AnalysisContext::new()).unwrap();

        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].weak_edges().is_empty());
        assert_eq!(cycles[0].weak_coupling_score(), None);
    }

    #[test]
    fn test_degraded_cycle_does_not_stop_others() {
        let (graph, _) = scored_graph(&[("a", "b", 2), ("b", "a", 6)]);
        let ctx = AnalysisContext::new();
        let mut cycles = vec![Cycle::new(1, vec!["p".into(), "q".into()])];
        cycles.extend(detect_cycles(&graph, &ctx).unwrap());

        let annotated = annotate_weak_edges(&graph, cycles, &ctx).unwrap();
        assert_eq!(annotated[0].weak_coupling_score(), None);
        assert_eq!(annotated[1].weak_coupling_score(), Some(2));
    }

    #[test]
    fn test_edges_in_cycles_is_superset_of_weak_edges() {
        let (graph, ids) = scored_graph(&[
            ("a", "b", 1),
            ("b", "a", 4),
            ("b", "c", 1),
            ("c", "d", 2),
            ("d", "c", 2),
        ]);
        let cycles = analyze(&graph);
        let cyclic = edges_in_cycles(&graph, &cycles, &AnalysisContext::new()).unwrap();

        // b -> c connects two different cycles and is not internal to either.
        assert_eq!(cyclic, HashSet::from([ids[0], ids[1], ids[3], ids[4]]));
        for cycle in &cycles {
            assert!(weak_ids(cycle).is_subset(&cyclic));
        }
    }

    #[test]
    fn test_cancellation_yields_no_partial_cycles() {
        let (graph, _) = scored_graph(&[("a", "b", 1), ("b", "a", 1)]);
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let ctx = AnalysisContext::with_cancellation(token);
        assert!(annotate_weak_edges(&graph, cycles, &ctx)
            .unwrap_err()
            .is_cancelled());
    }
}

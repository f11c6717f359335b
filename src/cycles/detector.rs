//! Circular dependency detection.
//!
//! Runs Tarjan's strongly connected components algorithm over the whole
//! graph and keeps only components with two or more modules.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::AnalysisContext;
use crate::error::AnalysisResult;
use crate::graph::{Dependency, DependencyGraph, EdgeId, Module};

/// One of the weakest internal edges of a cycle.
///
/// Holds module names and the edge index rather than references into the
/// graph, so cycles can outlive the graph that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakEdge {
    /// Index of the edge in the graph it was found in
    pub edge_index: usize,
    /// Dependent module
    pub source: String,
    /// Module depended upon
    pub target: String,
    /// Coupling score of the edge (equal to the cycle's minimum)
    pub coupling_score: u32,
}

impl WeakEdge {
    /// The graph edge this record refers to.
    pub fn edge_id(&self) -> EdgeId {
        EdgeId::new(self.edge_index)
    }

    /// "source -> target"
    pub fn label(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}

/// A circular dependency: a strongly connected component of size >= 2.
///
/// Produced by [`detect_cycles`] without weak-edge data; finalized by
/// [`annotate_weak_edges`](super::annotate_weak_edges).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    id: usize,
    modules: Vec<String>,
    /// Closed walk through real edges, without the repeated first module
    path: Vec<String>,
    weak_edges: Vec<WeakEdge>,
    weak_coupling_score: Option<u32>,
}

impl Cycle {
    /// Creates an unannotated cycle.
    ///
    /// The members are taken to be in walk order; [`detect_cycles`] replaces
    /// the walk with one traced along the graph's edges.
    pub fn new(id: usize, modules: Vec<String>) -> Self {
        Self {
            id,
            path: modules.clone(),
            modules,
            weak_edges: Vec::new(),
            weak_coupling_score: None,
        }
    }

    fn with_path(self, path: Vec<String>) -> Self {
        Self { path, ..self }
    }

    /// Finalizes the cycle with its weakest internal edges.
    pub(crate) fn with_weak_edges(self, weak_edges: Vec<WeakEdge>, min_score: u32) -> Self {
        Self {
            weak_edges,
            weak_coupling_score: Some(min_score),
            ..self
        }
    }

    /// 1-based id, stable within one detection run.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Member module names in discovery order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Internal edges with the minimum coupling score (all ties).
    pub fn weak_edges(&self) -> &[WeakEdge] {
        &self.weak_edges
    }

    /// Minimum internal coupling score; `None` until weak-edge analysis ran.
    pub fn weak_coupling_score(&self) -> Option<u32> {
        self.weak_coupling_score
    }

    /// Returns true if `name` is a member of this cycle.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m == name)
    }

    /// Modules along one closed walk of the cycle, starting at the first
    /// member. Consecutive entries (and last to first) are graph edges.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.path.first() else {
            return String::new();
        };
        format!("{} -> {}", self.path.join(" -> "), first)
    }

    /// Human-readable break-point suggestions, one per weak edge.
    pub fn break_suggestions(&self) -> Vec<String> {
        self.weak_edges
            .iter()
            .map(|edge| format!("{} (coupling {})", edge.label(), edge.coupling_score))
            .collect()
    }

    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the cycle is empty (never produced by detection).
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Detects all circular dependencies in the graph.
///
/// Components of size one are discarded, including modules that only
/// depend on themselves. Ids are assigned in the order Tarjan's algorithm
/// completes components, which is deterministic for a given graph.
///
/// # Example
///
/// ```rust
/// use modscope::context::AnalysisContext;
/// use modscope::cycles::detect_cycles;
/// use modscope::graph::{DependencyGraph, DependencyKind};
///
/// let mut graph = DependencyGraph::new();
/// for name in ["a", "b", "c", "d"] {
///     graph.add_module(name, name);
/// }
/// graph.add_dependency("a", "b", DependencyKind::ProjectReference);
/// graph.add_dependency("b", "c", DependencyKind::ProjectReference);
/// graph.add_dependency("c", "a", DependencyKind::ProjectReference);
/// graph.add_dependency("a", "d", DependencyKind::ProjectReference);
///
/// let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
/// assert_eq!(cycles.len(), 1);
/// assert_eq!(cycles[0].id(), 1);
/// assert_eq!(cycles[0].len(), 3);
/// assert!(!cycles[0].contains("d"));
/// ```
pub fn detect_cycles(graph: &DependencyGraph, ctx: &AnalysisContext) -> AnalysisResult<Vec<Cycle>> {
    let _guard = ctx.span().enter();
    let inner = graph.inner();
    let components = tarjan_scc(inner);

    let mut cycles = Vec::new();
    for mut component in components {
        ctx.checkpoint()?;
        if component.len() < 2 {
            continue;
        }

        // Tarjan pops members against edge direction.
        component.reverse();

        let modules: Vec<String> = component
            .iter()
            .map(|&idx| inner[idx].name.clone())
            .collect();
        let path: Vec<String> = shortest_closed_walk(inner, &component)
            .into_iter()
            .map(|idx| inner[idx].name.clone())
            .collect();

        let id = cycles.len() + 1;
        debug!(id, size = modules.len(), path = path.len(), "Found cycle");
        let cycle = Cycle::new(id, modules);
        cycles.push(if path.is_empty() { cycle } else { cycle.with_path(path) });
    }

    info!(
        cycles = cycles.len(),
        modules = graph.module_count(),
        "Cycle detection complete"
    );
    Ok(cycles)
}

/// Shortest closed walk from the component's first member back to itself,
/// using only edges between members. Self-loops are skipped.
///
/// Empty when no such walk exists, which cannot happen for a strongly
/// connected component of two or more modules.
fn shortest_closed_walk(
    graph: &DiGraph<Module, Dependency>,
    component: &[NodeIndex],
) -> Vec<NodeIndex> {
    let Some(&start) = component.first() else {
        return Vec::new();
    };
    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if next == current || !members.contains(&next) {
                continue;
            }
            if next == start {
                let mut walk = vec![current];
                let mut node = current;
                while let Some(&prev) = parent.get(&node) {
                    walk.push(prev);
                    node = prev;
                }
                walk.reverse();
                return walk;
            }
            if !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use crate::graph::DependencyKind;
    use std::collections::HashSet;

    fn graph_with(modules: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for name in modules {
            graph.add_module(name, name);
        }
        for (from, to) in edges {
            graph.add_dependency(from, to, DependencyKind::ProjectReference);
        }
        graph
    }

    fn member_set(cycle: &Cycle) -> HashSet<&str> {
        cycle.modules().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_self_loop_is_not_reported() {
        let graph = graph_with(&["a", "b"], &[("a", "a"), ("a", "b")]);
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_two_disjoint_cycles_get_sequential_ids() {
        let graph = graph_with(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "e"), ("e", "c")],
        );
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert_eq!(cycles.len(), 2);

        let ids: Vec<usize> = cycles.iter().map(Cycle::id).collect();
        assert_eq!(ids, vec![1, 2]);

        let sets: Vec<HashSet<&str>> = cycles.iter().map(member_set).collect();
        assert!(sets.contains(&HashSet::from(["a", "b"])));
        assert!(sets.contains(&HashSet::from(["c", "d", "e"])));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")],
        );
        let first = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        let second = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_cycles_are_unannotated() {
        let graph = graph_with(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert!(cycles[0].weak_edges().is_empty());
        assert_eq!(cycles[0].weak_coupling_score(), None);
    }

    #[test]
    fn test_cancelled_detection_returns_no_partial_result() {
        let graph = graph_with(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let token = CancellationToken::new();
        token.cancel();
        let result = detect_cycles(&graph, &AnalysisContext::with_cancellation(token));
        assert!(result.unwrap_err().is_cancelled());
    }

    fn assert_path_follows_edges(graph: &DependencyGraph, cycle: &Cycle) {
        let path = cycle.path();
        for (i, from) in path.iter().enumerate() {
            let to = &path[(i + 1) % path.len()];
            assert!(
                graph.dependencies_of(from).iter().any(|m| &m.name == to),
                "{} -> {} is not an edge (path {})",
                from,
                to,
                cycle.cycle_path()
            );
        }
    }

    #[test]
    fn test_detected_cycle_path_follows_edges() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();

        assert_eq!(cycles[0].cycle_path(), "a -> b -> c -> a");
        assert_path_follows_edges(&graph, &cycles[0]);
    }

    #[test]
    fn test_cycle_path_in_dense_component() {
        // Every member shares one component but no ring visits all of them.
        let graph = graph_with(
            &["hub", "x", "y", "z"],
            &[
                ("hub", "x"),
                ("x", "hub"),
                ("hub", "y"),
                ("y", "hub"),
                ("y", "z"),
                ("z", "y"),
                ("z", "z"),
            ],
        );
        let cycles = detect_cycles(&graph, &AnalysisContext::new()).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 4);

        let path = cycles[0].path();
        assert!(path.len() >= 2);
        assert_eq!(path[0], cycles[0].modules()[0]);
        assert_path_follows_edges(&graph, &cycles[0]);
    }

    #[test]
    fn test_cycle_path() {
        let cycle = Cycle::new(1, vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(cycle.cycle_path(), "a -> b -> c -> a");
        assert_eq!(Cycle::new(2, Vec::new()).cycle_path(), "");
    }

    #[test]
    fn test_break_suggestions() {
        let cycle = Cycle::new(1, vec!["a".into(), "b".into()]).with_weak_edges(
            vec![WeakEdge {
                edge_index: 0,
                source: "a".into(),
                target: "b".into(),
                coupling_score: 2,
            }],
            2,
        );
        assert_eq!(cycle.break_suggestions(), vec!["a -> b (coupling 2)"]);
        assert_eq!(cycle.weak_coupling_score(), Some(2));
    }
}

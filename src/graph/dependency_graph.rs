//! Module dependency graph implementation using petgraph.
//!
//! Provides a directed multigraph of modules and the dependencies between
//! them. Edges live in petgraph's edge arena and are addressed by
//! [`EdgeId`], so coupling annotation is a single indexed write.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::coupling::{validate_count, CouplingStrength, CouplingThresholds, DEFAULT_COUPLING_SCORE};
use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};

/// Stable identifier of a dependency edge within one graph.
pub type EdgeId = EdgeIndex;

/// Represents the kind of reference a dependency was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DependencyKind {
    /// Reference to another module built from source in the same codebase
    #[default]
    #[serde(rename = "project", alias = "ProjectReference")]
    ProjectReference,
    /// Reference to a prebuilt binary artifact
    #[serde(rename = "binary", alias = "BinaryReference")]
    BinaryReference,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectReference => write!(f, "project"),
            Self::BinaryReference => write!(f, "binary"),
        }
    }
}

/// A module (vertex) in the dependency graph.
///
/// Identity is the name alone; the path is kept for display and lookup.
#[derive(Debug, Clone)]
pub struct Module {
    /// Unique module name (e.g., "Orders.Core")
    pub name: String,
    /// Location of the module on disk, if known
    pub path: PathBuf,
}

impl Module {
    /// Creates a new module.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modscope::graph::Module;
    ///
    /// let a = Module::new("billing", "src/billing");
    /// let b = Module::new("billing", "elsewhere/billing");
    /// assert_eq!(a, b); // equality ignores the path
    /// ```
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Module {}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Metadata carried by a dependency edge.
///
/// Starts out as a reference-only edge (score 1, weak) and receives its
/// real coupling score through [`DependencyGraph::annotate_coupling`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    kind: DependencyKind,
    coupling_score: u32,
    strength: CouplingStrength,
}

impl Default for Dependency {
    fn default() -> Self {
        Self::new(DependencyKind::default())
    }
}

impl Dependency {
    /// Creates an unscored dependency of the given kind.
    pub fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            coupling_score: DEFAULT_COUPLING_SCORE,
            strength: CouplingStrength::Weak,
        }
    }

    /// Creates a dependency with a known coupling score.
    pub fn with_coupling(
        kind: DependencyKind,
        score: u32,
        thresholds: &CouplingThresholds,
    ) -> Self {
        Self {
            kind,
            coupling_score: score,
            strength: thresholds.classify_score(score),
        }
    }

    /// How the dependency was declared.
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// Number of semantic interactions across the edge.
    pub fn coupling_score(&self) -> u32 {
        self.coupling_score
    }

    /// Category derived from the coupling score.
    pub fn strength(&self) -> CouplingStrength {
        self.strength
    }
}

/// Borrowed view of one edge: its id, endpoints and metadata.
#[derive(Debug, Clone, Copy)]
pub struct DependencyEdge<'a> {
    pub id: EdgeId,
    pub source: &'a Module,
    pub target: &'a Module,
    pub dependency: &'a Dependency,
}

impl DependencyEdge<'_> {
    /// Shorthand for the edge's coupling score.
    pub fn coupling_score(&self) -> u32 {
        self.dependency.coupling_score()
    }
}

/// Supplies raw coupling counts for the edges of a graph.
///
/// Implemented by semantic-analysis collaborators. Edges not mentioned keep
/// the default reference-only score.
pub trait CouplingCountProvider {
    /// Returns `(edge, count)` pairs for the edges this provider knows about.
    fn edge_counts(&self, graph: &DependencyGraph) -> AnalysisResult<Vec<(EdgeId, i64)>>;
}

/// A directed multigraph of modules and their dependencies.
///
/// Edges point from the dependent module to the module it depends on.
/// Parallel edges between the same pair are kept as independent edges.
///
/// # Example
///
/// ```rust
/// use modscope::graph::{DependencyGraph, DependencyKind};
///
/// let mut graph = DependencyGraph::new();
/// graph.add_module("orders", "src/orders");
/// graph.add_module("billing", "src/billing");
/// graph.add_dependency("orders", "billing", DependencyKind::ProjectReference);
/// graph.add_dependency("billing", "orders", DependencyKind::ProjectReference);
///
/// assert_eq!(graph.module_count(), 2);
/// assert_eq!(graph.dependency_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<Module, Dependency>,
    /// Maps module names to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(modules: usize, dependencies: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(modules, dependencies),
            node_indices: HashMap::with_capacity(modules),
        }
    }

    /// Adds a module to the graph.
    ///
    /// If a module with the same name already exists, returns its existing
    /// node index without modification.
    pub fn add_module(&mut self, name: &str, path: impl AsRef<Path>) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }

        let idx = self.graph.add_node(Module::new(name, path.as_ref()));
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Adds an unscored dependency edge from `from` to `to`.
    ///
    /// Returns `None` if either module doesn't exist.
    pub fn add_dependency(&mut self, from: &str, to: &str, kind: DependencyKind) -> Option<EdgeId> {
        self.add_dependency_with_metadata(from, to, Dependency::new(kind))
    }

    /// Adds an edge with custom metadata.
    ///
    /// Returns `None` if either module doesn't exist.
    pub fn add_dependency_with_metadata(
        &mut self,
        from: &str,
        to: &str,
        dependency: Dependency,
    ) -> Option<EdgeId> {
        let from_idx = *self.node_indices.get(from)?;
        let to_idx = *self.node_indices.get(to)?;
        Some(self.graph.add_edge(from_idx, to_idx, dependency))
    }

    /// Gets a module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.node_indices
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Iterates over all modules in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.graph.node_weights()
    }

    /// Iterates over all edges in insertion order.
    ///
    /// The sequence is finite and restartable: call again to rescan.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge<'_>> + '_ {
        self.graph.edge_references().map(move |edge| DependencyEdge {
            id: edge.id(),
            source: &self.graph[edge.source()],
            target: &self.graph[edge.target()],
            dependency: edge.weight(),
        })
    }

    /// Looks up a single edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<DependencyEdge<'_>> {
        let (source, target) = self.graph.edge_endpoints(id)?;
        Some(DependencyEdge {
            id,
            source: &self.graph[source],
            target: &self.graph[target],
            dependency: &self.graph[id],
        })
    }

    /// Gets the modules `name` depends on (outgoing edges).
    pub fn dependencies_of(&self, name: &str) -> Vec<&Module> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Gets the modules that depend on `name` (incoming edges).
    pub fn dependents_of(&self, name: &str) -> Vec<&Module> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&Module> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, direction)
            .filter_map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph.node_weight(other)
            })
            .collect()
    }

    /// Edges leaving or entering `name`.
    pub fn edges_touching(&self, name: &str) -> Vec<DependencyEdge<'_>> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let outgoing = self.graph.edges_directed(idx, Direction::Outgoing);
        // Self-loops show up in both directions; count them once.
        let incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|edge| edge.source() != edge.target());

        outgoing
            .chain(incoming)
            .filter_map(|edge| self.edge(edge.id()))
            .collect()
    }

    /// Sets the coupling score of one edge and reclassifies it.
    pub fn set_coupling(
        &mut self,
        id: EdgeId,
        count: i64,
        thresholds: &CouplingThresholds,
    ) -> AnalysisResult<()> {
        let score = validate_count(count)?;
        let dependency = self
            .graph
            .edge_weight_mut(id)
            .ok_or(AnalysisError::UnknownEdge(id.index()))?;
        dependency.coupling_score = score;
        dependency.strength = thresholds.classify_score(score);
        Ok(())
    }

    /// Applies coupling counts from a provider to the graph's edges.
    ///
    /// This is the single mutation the graph sees after loading; it must
    /// finish before cycle detection or scoring read the graph.
    ///
    /// # Returns
    ///
    /// The number of edges annotated.
    pub fn annotate_coupling(
        &mut self,
        provider: &dyn CouplingCountProvider,
        thresholds: &CouplingThresholds,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<usize> {
        let _guard = ctx.span().enter();
        let counts = provider.edge_counts(self)?;

        // Validate everything before touching the graph so a failed call
        // leaves every edge as it was.
        let mut scores = Vec::with_capacity(counts.len());
        for &(id, count) in &counts {
            ctx.checkpoint()?;
            let score = validate_count(count)?;
            if self.graph.edge_weight(id).is_none() {
                return Err(AnalysisError::UnknownEdge(id.index()));
            }
            scores.push((id, score));
        }

        for &(id, score) in &scores {
            if let Some(dependency) = self.graph.edge_weight_mut(id) {
                dependency.coupling_score = score;
                dependency.strength = thresholds.classify_score(score);
            }
        }

        debug!(
            annotated = scores.len(),
            total = self.dependency_count(),
            "Annotated coupling scores"
        );
        Ok(scores.len())
    }

    /// Returns the number of modules in the graph.
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of dependency edges in the graph.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a module exists in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Read access to the petgraph structure for graph algorithms.
    pub(crate) fn inner(&self) -> &DiGraph<Module, Dependency> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CouplingStrength;

    struct FixedCounts(Vec<(EdgeId, i64)>);

    impl CouplingCountProvider for FixedCounts {
        fn edge_counts(&self, _graph: &DependencyGraph) -> AnalysisResult<Vec<(EdgeId, i64)>> {
            Ok(self.0.clone())
        }
    }

    fn two_module_graph() -> (DependencyGraph, EdgeId) {
        let mut graph = DependencyGraph::new();
        graph.add_module("a", "src/a");
        graph.add_module("b", "src/b");
        let id = graph
            .add_dependency("a", "b", DependencyKind::ProjectReference)
            .unwrap();
        (graph, id)
    }

    #[test]
    fn test_new_graph_is_empty() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.module_count(), 0);
        assert_eq!(graph.dependency_count(), 0);
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn test_add_module_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let first = graph.add_module("a", "src/a");
        let second = graph.add_module("a", "other/a");
        assert_eq!(first, second);
        assert_eq!(graph.module_count(), 1);
        assert_eq!(graph.module("a").unwrap().path, PathBuf::from("src/a"));
    }

    #[test]
    fn test_add_dependency_requires_both_modules() {
        let mut graph = DependencyGraph::new();
        graph.add_module("a", "src/a");
        assert!(graph
            .add_dependency("a", "missing", DependencyKind::ProjectReference)
            .is_none());
        assert!(graph
            .add_dependency("missing", "a", DependencyKind::ProjectReference)
            .is_none());
        assert_eq!(graph.dependency_count(), 0);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let (mut graph, first) = two_module_graph();
        let second = graph
            .add_dependency("a", "b", DependencyKind::BinaryReference)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.dependency_count(), 2);
        assert_eq!(graph.dependencies_of("a").len(), 2);
    }

    #[test]
    fn test_new_edges_default_to_reference_only() {
        let (graph, id) = two_module_graph();
        let edge = graph.edge(id).unwrap();
        assert_eq!(edge.coupling_score(), 1);
        assert_eq!(edge.dependency.strength(), CouplingStrength::Weak);
        assert_eq!(edge.source.name, "a");
        assert_eq!(edge.target.name, "b");
    }

    #[test]
    fn test_edges_are_restartable() {
        let (graph, _) = two_module_graph();
        assert_eq!(graph.edges().count(), 1);
        assert_eq!(graph.edges().count(), 1);
    }

    #[test]
    fn test_dependents_and_dependencies() {
        let (graph, _) = two_module_graph();
        assert_eq!(graph.dependencies_of("a")[0].name, "b");
        assert_eq!(graph.dependents_of("b")[0].name, "a");
        assert!(graph.dependencies_of("b").is_empty());
        assert!(graph.dependents_of("unknown").is_empty());
    }

    #[test]
    fn test_set_coupling_reclassifies() {
        let (mut graph, id) = two_module_graph();
        graph
            .set_coupling(id, 25, &CouplingThresholds::default())
            .unwrap();
        let edge = graph.edge(id).unwrap();
        assert_eq!(edge.coupling_score(), 25);
        assert_eq!(edge.dependency.strength(), CouplingStrength::Strong);
    }

    #[test]
    fn test_set_coupling_rejects_negative_and_unknown() {
        let (mut graph, id) = two_module_graph();
        let thresholds = CouplingThresholds::default();
        assert!(matches!(
            graph.set_coupling(id, -1, &thresholds),
            Err(AnalysisError::NegativeCouplingCount(-1))
        ));
        assert!(matches!(
            graph.set_coupling(EdgeIndex::new(42), 3, &thresholds),
            Err(AnalysisError::UnknownEdge(42))
        ));
    }

    #[test]
    fn test_annotate_coupling_from_provider() {
        let (mut graph, id) = two_module_graph();
        let provider = FixedCounts(vec![(id, 12)]);
        let thresholds = CouplingThresholds::default();
        let annotated = graph
            .annotate_coupling(&provider, &thresholds, &AnalysisContext::new())
            .unwrap();
        assert_eq!(annotated, 1);
        assert_eq!(
            graph.edge(id).unwrap().dependency.strength(),
            CouplingStrength::Medium
        );
    }

    #[test]
    fn test_failed_annotation_leaves_graph_untouched() {
        let (mut graph, first) = two_module_graph();
        let second = graph
            .add_dependency("b", "a", DependencyKind::ProjectReference)
            .unwrap();
        let thresholds = CouplingThresholds::default();

        let negative = FixedCounts(vec![(first, 30), (second, -1)]);
        let err = graph
            .annotate_coupling(&negative, &thresholds, &AnalysisContext::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NegativeCouplingCount(-1)));
        assert_eq!(graph.edge(first).unwrap().coupling_score(), 1);

        let unknown = FixedCounts(vec![(first, 30), (EdgeIndex::new(9), 2)]);
        let err = graph
            .annotate_coupling(&unknown, &thresholds, &AnalysisContext::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownEdge(9)));
        assert_eq!(graph.edge(first).unwrap().coupling_score(), 1);
        assert_eq!(
            graph.edge(first).unwrap().dependency.strength(),
            CouplingStrength::Weak
        );
    }

    #[test]
    fn test_cancelled_annotation_applies_nothing() {
        let (mut graph, id) = two_module_graph();
        let token = crate::context::CancellationToken::new();
        token.cancel();

        let err = graph
            .annotate_coupling(
                &FixedCounts(vec![(id, 30)]),
                &CouplingThresholds::default(),
                &AnalysisContext::with_cancellation(token),
            )
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(graph.edge(id).unwrap().coupling_score(), 1);
    }

    #[test]
    fn test_edges_touching_counts_self_loop_once() {
        let mut graph = DependencyGraph::new();
        graph.add_module("a", "a");
        graph.add_module("b", "b");
        graph.add_dependency("a", "a", DependencyKind::ProjectReference);
        graph.add_dependency("a", "b", DependencyKind::ProjectReference);
        graph.add_dependency("b", "a", DependencyKind::ProjectReference);
        assert_eq!(graph.edges_touching("a").len(), 3);
        assert_eq!(graph.edges_touching("b").len(), 2);
    }

    #[test]
    fn test_dependency_kind_display() {
        assert_eq!(format!("{}", DependencyKind::ProjectReference), "project");
        assert_eq!(format!("{}", DependencyKind::BinaryReference), "binary");
    }
}

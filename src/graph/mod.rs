//! Graph module for module dependency modeling.
//!
//! This module provides the [`DependencyGraph`] struct, a directed multigraph
//! of modules whose edges carry a dependency kind and a coupling score, plus
//! the coupling strength classifier.
//!
//! # Example
//!
//! ```rust
//! use modscope::graph::{DependencyGraph, DependencyKind};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_module("orders", "src/orders");
//! graph.add_module("billing", "src/billing");
//! graph.add_dependency("orders", "billing", DependencyKind::ProjectReference);
//!
//! assert_eq!(graph.module_count(), 2);
//! assert_eq!(graph.dependency_count(), 1);
//! ```

mod coupling;
mod dependency_graph;

pub use coupling::{
    classify, CouplingStrength, CouplingThresholds, DEFAULT_COUPLING_SCORE, MEDIUM_MAX_COUNT,
    WEAK_MAX_COUNT,
};
pub use dependency_graph::{
    CouplingCountProvider, Dependency, DependencyEdge, DependencyGraph, DependencyKind, EdgeId,
    Module,
};

//! Circular dependency analysis.
//!
//! Cycle detection produces [`Cycle`] records from a [`DependencyGraph`];
//! weak-edge identification finalizes them with break-point candidates; and
//! [`CycleStatistics`] summarizes the result.
//!
//! # Example
//!
//! ```rust
//! use modscope::context::AnalysisContext;
//! use modscope::cycles::{annotate_weak_edges, detect_cycles, CycleStatistics};
//! use modscope::graph::{DependencyGraph, DependencyKind};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_module("a", "a");
//! graph.add_module("b", "b");
//! graph.add_dependency("a", "b", DependencyKind::ProjectReference);
//! graph.add_dependency("b", "a", DependencyKind::ProjectReference);
//!
//! let ctx = AnalysisContext::new();
//! let cycles = annotate_weak_edges(&graph, detect_cycles(&graph, &ctx)?, &ctx)?;
//! let stats = CycleStatistics::compute(&cycles, graph.module_count());
//! assert_eq!(stats.total_cycles, 1);
//! # Ok::<(), modscope::error::AnalysisError>(())
//! ```
//!
//! [`DependencyGraph`]: crate::graph::DependencyGraph

mod detector;
mod statistics;
mod weak_edges;

pub use detector::{detect_cycles, Cycle, WeakEdge};
pub use statistics::CycleStatistics;
pub use weak_edges::{annotate_weak_edges, edges_in_cycles, internal_edges};

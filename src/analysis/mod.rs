//! End-to-end analysis pipeline.
//!
//! Runs the steps of one analysis pass in order:
//!
//! 1. Annotate edge coupling (the graph's only mutation)
//! 2. Detect cycles
//! 3. Identify weak edges inside each cycle
//! 4. Summarize cycle statistics
//! 5. Score every module for extraction difficulty
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use modscope::analysis::Analyzer;
//! use modscope::config::Config;
//! use modscope::context::AnalysisContext;
//! use modscope::loader::GraphLoader;
//!
//! let project = GraphLoader::new().load(Path::new("."))?;
//! let report = Analyzer::new(Config::default())
//!     .analyze_project(project, &AnalysisContext::new())?;
//!
//! for score in &report.scores {
//!     println!("{}: {:.1} ({})", score.module, score.final_score, score.category);
//! }
//! ```

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::context::AnalysisContext;
use crate::cycles::{annotate_weak_edges, detect_cycles, edges_in_cycles, Cycle, CycleStatistics};
use crate::error::AnalysisResult;
use crate::graph::DependencyGraph;
use crate::loader::LoadedProject;
use crate::scoring::{
    ExtractionScore, ExtractionScoreCalculator, FanCouplingMetric, GraphCouplingMetric,
    MetricProviders,
};

/// Everything one analysis pass produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Project name
    pub project: String,
    pub module_count: usize,
    pub dependency_count: usize,
    /// Cycles with weak edges filled in, in detection order
    pub cycles: Vec<Cycle>,
    pub statistics: CycleStatistics,
    /// Extraction scores, easiest first
    pub scores: Vec<ExtractionScore>,
    /// Indices of every edge internal to some cycle, ascending
    pub cycle_edges: Vec<usize>,
}

impl AnalysisReport {
    /// The `n` easiest extraction candidates.
    pub fn easiest(&self, n: usize) -> &[ExtractionScore] {
        &self.scores[..n.min(self.scores.len())]
    }

    /// Short plain-text summary for terminal output.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}: {} modules, {} dependencies\n",
            self.project, self.module_count, self.dependency_count
        ));
        out.push_str(&format!(
            "Cycles: {} ({} modules, {:.1}% participation",
            self.statistics.total_cycles,
            self.statistics.total_modules_in_cycles,
            self.statistics.participation_percentage()
        ));
        if let Some(largest) = self.statistics.largest_cycle_size {
            out.push_str(&format!(", largest {}", largest));
        }
        out.push_str(")\n");

        for cycle in &self.cycles {
            out.push_str(&format!("  #{} {}\n", cycle.id(), cycle.cycle_path()));
            for suggestion in cycle.break_suggestions() {
                out.push_str(&format!("    break: {}\n", suggestion));
            }
        }

        out.push_str("Extraction candidates (easiest first):\n");
        for score in &self.scores {
            out.push_str(&format!(
                "  {:<30} {:>6.1}  {}\n",
                score.module, score.final_score, score.category
            ));
        }
        out
    }
}

/// Runs the analysis pipeline with one configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Annotates a loaded project's graph and analyzes it.
    ///
    /// Coupling counts from the manifest are applied first; metric tables
    /// from the manifest feed extraction scoring, with graph-wide coupling
    /// from [`FanCouplingMetric`].
    pub fn analyze_project(
        &self,
        project: LoadedProject,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<AnalysisReport> {
        let LoadedProject {
            name,
            mut graph,
            coupling_counts,
            complexity,
            tech_debt,
            external_exposure,
            ..
        } = project;

        graph.annotate_coupling(&coupling_counts, &self.config.coupling, ctx)?;

        let providers = MetricProviders::new(&complexity, &tech_debt, &external_exposure);
        self.run(&name, &graph, &FanCouplingMetric, providers, ctx)
    }

    /// Analyzes an already annotated graph.
    pub fn run(
        &self,
        project: &str,
        graph: &DependencyGraph,
        coupling_metric: &dyn GraphCouplingMetric,
        providers: MetricProviders<'_>,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<AnalysisReport> {
        let cycles = detect_cycles(graph, ctx)?;
        let cycles = annotate_weak_edges(graph, cycles, ctx)?;
        let statistics = CycleStatistics::compute(&cycles, graph.module_count());

        let mut cycle_edges: Vec<usize> = edges_in_cycles(graph, &cycles, ctx)?
            .into_iter()
            .map(|id| id.index())
            .collect();
        cycle_edges.sort_unstable();

        let scores = ExtractionScoreCalculator::from_config(&self.config).score_all(
            graph,
            coupling_metric,
            providers,
            ctx,
        )?;

        info!(
            project,
            cycles = statistics.total_cycles,
            scored = scores.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            project: project.to_string(),
            module_count: graph.module_count(),
            dependency_count: graph.dependency_count(),
            cycles,
            statistics,
            scores,
            cycle_edges,
        })
    }
}

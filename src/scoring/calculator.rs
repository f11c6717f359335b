//! Extraction difficulty calculation.
//!
//! Combines coupling, complexity, technical debt and external exposure into
//! a single 0-100 score per module:
//!
//! ```text
//! score = clamp(coupling*Wc + complexity*Wcx + tech_debt*Wt + exposure*We, 0, 100)
//! ```

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use super::metrics::{
    validate_metric, GraphCouplingMetric, MetricContribution, MetricKind, MetricProviders,
    ModuleMetricProvider, METRIC_MAX,
};
use super::weights::ScoringWeights;
use crate::config::Config;
use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::{DependencyGraph, Module};

/// Highest score still considered an easy extraction.
pub const EASY_MAX_SCORE: f64 = 33.0;

/// Highest score still considered a medium extraction.
pub const MEDIUM_MAX_SCORE: f64 = 66.0;

/// Coarse difficulty bucket for an extraction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DifficultyCategory {
    /// 0-33
    Easy,
    /// 34-66
    Medium,
    /// 67-100
    Hard,
}

impl DifficultyCategory {
    /// Buckets a final score.
    ///
    /// ```rust
    /// use modscope::scoring::DifficultyCategory;
    ///
    /// assert_eq!(DifficultyCategory::from_score(33.0), DifficultyCategory::Easy);
    /// assert_eq!(DifficultyCategory::from_score(33.1), DifficultyCategory::Medium);
    /// assert_eq!(DifficultyCategory::from_score(66.1), DifficultyCategory::Hard);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score <= EASY_MAX_SCORE {
            DifficultyCategory::Easy
        } else if score <= MEDIUM_MAX_SCORE {
            DifficultyCategory::Medium
        } else {
            DifficultyCategory::Hard
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyCategory::Easy => "Easy",
            DifficultyCategory::Medium => "Medium",
            DifficultyCategory::Hard => "Hard",
        }
    }
}

impl fmt::Display for DifficultyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Extraction difficulty of one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionScore {
    /// Module name
    pub module: String,
    /// Weighted score, clamped to 0-100
    pub final_score: f64,
    /// Coupling share; `None` when scored without graph context
    pub coupling: Option<MetricContribution>,
    pub complexity: MetricContribution,
    pub tech_debt: MetricContribution,
    pub external_exposure: MetricContribution,
    /// Bucket derived from `final_score`
    pub category: DifficultyCategory,
}

/// Flat, export-friendly view of an [`ExtractionScore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub module: String,
    pub final_score: f64,
    pub category: DifficultyCategory,
    pub coupling: Option<f64>,
    pub complexity: f64,
    pub tech_debt: f64,
    pub external_exposure: f64,
}

impl ExtractionScore {
    /// Flattens the score into one row of metric values.
    pub fn to_row(&self) -> ScoreRow {
        ScoreRow {
            module: self.module.clone(),
            final_score: self.final_score,
            category: self.category,
            coupling: self.coupling.map(|c| c.value),
            complexity: self.complexity.value,
            tech_debt: self.tech_debt.value,
            external_exposure: self.external_exposure.value,
        }
    }
}

/// Per-module metric values gathered before weighting.
#[derive(Debug, Clone, Copy)]
struct ModuleMetrics {
    complexity: f64,
    tech_debt: f64,
    external_exposure: f64,
}

/// Scores modules by how hard they would be to extract.
///
/// # Example
///
/// ```rust
/// use modscope::context::AnalysisContext;
/// use modscope::graph::{DependencyGraph, DependencyKind};
/// use modscope::scoring::{
///     ExtractionScoreCalculator, FanCouplingMetric, MetricKind, MetricProviders, MetricTable,
///     ScoringWeights,
/// };
///
/// let mut graph = DependencyGraph::new();
/// graph.add_module("a", "a");
/// graph.add_module("b", "b");
/// graph.add_dependency("a", "b", DependencyKind::ProjectReference);
///
/// let complexity = MetricTable::from_values(MetricKind::Complexity, [("a", 40.0), ("b", 10.0)]);
/// let debt = MetricTable::from_values(MetricKind::TechDebt, [("a", 20.0), ("b", 0.0)]);
/// let exposure = MetricTable::from_values(MetricKind::ExternalExposure, [("a", 5.0), ("b", 0.0)]);
/// let providers = MetricProviders::new(&complexity, &debt, &exposure);
///
/// let calculator = ExtractionScoreCalculator::new(ScoringWeights::default());
/// let scores = calculator
///     .score_all(&graph, &FanCouplingMetric, providers, &AnalysisContext::new())
///     .unwrap();
///
/// assert_eq!(scores.len(), 2);
/// assert!(scores[0].final_score <= scores[1].final_score);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionScoreCalculator {
    weights: ScoringWeights,
    parallel: bool,
}

impl ExtractionScoreCalculator {
    /// Creates a calculator with already validated weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            parallel: true,
        }
    }

    /// Creates a calculator from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scoring).with_parallel(config.analysis.parallel)
    }

    /// Enables or disables parallel metric collection.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores every module of the graph.
    ///
    /// Coupling is computed once for the whole graph; the three per-module
    /// metrics are collected independently (in parallel when enabled) and
    /// reassembled in graph order. The result is sorted ascending by final
    /// score, easiest candidates first, ties kept in graph order.
    ///
    /// On cancellation no partial list is returned.
    pub fn score_all(
        &self,
        graph: &DependencyGraph,
        coupling_metric: &dyn GraphCouplingMetric,
        providers: MetricProviders<'_>,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<Vec<ExtractionScore>> {
        let _guard = ctx.span().enter();
        let coupling = coupling_metric.compute(graph, ctx)?;
        let modules: Vec<&Module> = graph.modules().collect();

        let collect = |module: &&Module| -> AnalysisResult<ModuleMetrics> {
            ctx.checkpoint()?;
            collect_metrics(module, providers)
        };
        let metrics: Vec<ModuleMetrics> = if self.parallel {
            modules.par_iter().map(collect).collect::<AnalysisResult<_>>()?
        } else {
            modules.iter().map(collect).collect::<AnalysisResult<_>>()?
        };

        let mut scores = Vec::with_capacity(modules.len());
        for (module, metrics) in modules.iter().zip(metrics) {
            ctx.checkpoint()?;
            let value = coupling.get(&module.name).copied().ok_or_else(|| {
                AnalysisError::MetricUnavailable {
                    module: module.name.clone(),
                    metric: MetricKind::Coupling,
                    reason: "missing from graph-wide coupling pass".to_string(),
                }
            })?;
            let value = validate_metric(&module.name, MetricKind::Coupling, value)?;
            scores.push(self.combine(&module.name, Some(value), metrics));
        }

        scores.sort_by(|a, b| a.final_score.total_cmp(&b.final_score));

        info!(
            modules = scores.len(),
            easy = count_category(&scores, DifficultyCategory::Easy),
            medium = count_category(&scores, DifficultyCategory::Medium),
            hard = count_category(&scores, DifficultyCategory::Hard),
            "Extraction scoring complete"
        );
        Ok(scores)
    }

    /// Scores a single module without graph context.
    ///
    /// Coupling is only meaningful relative to the whole graph, so this
    /// entry point leaves it out: the coupling contribution is 0 and
    /// [`ExtractionScore::coupling`] is `None`. Use [`score_all`] for
    /// accurate scores.
    ///
    /// [`score_all`]: ExtractionScoreCalculator::score_all
    pub fn score_module(
        &self,
        module: &Module,
        providers: MetricProviders<'_>,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<ExtractionScore> {
        let _guard = ctx.span().enter();
        ctx.checkpoint()?;
        debug!(
            module = %module.name,
            "Scoring without graph context; coupling contributes 0"
        );
        let metrics = collect_metrics(module, providers)?;
        Ok(self.combine(&module.name, None, metrics))
    }

    fn combine(
        &self,
        module: &str,
        coupling: Option<f64>,
        metrics: ModuleMetrics,
    ) -> ExtractionScore {
        let weights = &self.weights;
        let coupling = coupling.map(|v| MetricContribution::new(v, weights.coupling()));
        let complexity = MetricContribution::new(metrics.complexity, weights.complexity());
        let tech_debt = MetricContribution::new(metrics.tech_debt, weights.tech_debt());
        let external_exposure =
            MetricContribution::new(metrics.external_exposure, weights.external_exposure());

        let raw = coupling.map_or(0.0, |c| c.weighted())
            + complexity.weighted()
            + tech_debt.weighted()
            + external_exposure.weighted();
        let final_score = raw.clamp(0.0, METRIC_MAX);

        ExtractionScore {
            module: module.to_string(),
            final_score,
            coupling,
            complexity,
            tech_debt,
            external_exposure,
            category: DifficultyCategory::from_score(final_score),
        }
    }
}

fn collect_metrics(
    module: &Module,
    providers: MetricProviders<'_>,
) -> AnalysisResult<ModuleMetrics> {
    let fetch = |provider: &dyn ModuleMetricProvider| -> AnalysisResult<f64> {
        let value = provider.score(module)?;
        validate_metric(&module.name, provider.kind(), value)
    };

    Ok(ModuleMetrics {
        complexity: fetch(providers.complexity)?,
        tech_debt: fetch(providers.tech_debt)?,
        external_exposure: fetch(providers.external_exposure)?,
    })
}

fn count_category(scores: &[ExtractionScore], category: DifficultyCategory) -> usize {
    scores.iter().filter(|s| s.category == category).count()
}

/// Groups scores by category, preserving their order.
pub fn scores_by_category(
    scores: &[ExtractionScore],
) -> HashMap<DifficultyCategory, Vec<&ExtractionScore>> {
    let mut grouped: HashMap<DifficultyCategory, Vec<&ExtractionScore>> = HashMap::new();
    for score in scores {
        grouped.entry(score.category).or_default().push(score);
    }
    grouped
}

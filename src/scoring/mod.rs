//! Extraction difficulty scoring.
//!
//! Ranks modules by how hard they would be to pull out of the codebase as
//! independently deployable units. Four normalized metrics (coupling,
//! complexity, technical debt, external API exposure) are weighted with a
//! validated [`ScoringWeights`] set and folded into one 0-100 score.
//!
//! # Example
//!
//! ```rust
//! use modscope::scoring::{DifficultyCategory, ScoringWeights};
//!
//! let weights = ScoringWeights::new(0.40, 0.30, 0.20, 0.10)?;
//! assert_eq!(weights.coupling(), 0.40);
//! assert_eq!(DifficultyCategory::from_score(52.6), DifficultyCategory::Medium);
//! # Ok::<(), modscope::error::AnalysisError>(())
//! ```

pub mod calculator;
pub mod metrics;
pub mod weights;

pub use calculator::{
    scores_by_category, DifficultyCategory, ExtractionScore, ExtractionScoreCalculator, ScoreRow,
    EASY_MAX_SCORE, MEDIUM_MAX_SCORE,
};
pub use metrics::{
    validate_metric, FanCouplingMetric, GraphCouplingMetric, MetricContribution, MetricKind,
    MetricProviders, MetricTable, ModuleMetricProvider, METRIC_MAX,
};
pub use weights::{RawScoringWeights, ScoringWeights, WEIGHT_SUM_TOLERANCE};

//! Error types for the analysis engine.
//!
//! Configuration and validation errors propagate straight to the caller.
//! Cancellation shares the enum so it can travel through `?`, but it is a
//! control signal rather than a failure; use [`AnalysisError::is_cancelled`]
//! to tell the two apart.

use crate::scoring::MetricKind;

/// Errors that can occur while analyzing a dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Scoring weights do not sum to 1.0 within tolerance.
    #[error(
        "Invalid scoring weights: coupling={coupling}, complexity={complexity}, \
         tech_debt={tech_debt}, external_exposure={external_exposure} (sum={sum:.4}). \
         Weights must each be within 0.0-1.0 and sum to 1.0 (+/-0.01), \
         e.g. coupling=0.40, complexity=0.30, tech_debt=0.20, external_exposure=0.10"
    )]
    InvalidWeights {
        coupling: f64,
        complexity: f64,
        tech_debt: f64,
        external_exposure: f64,
        sum: f64,
    },

    /// A single scoring weight lies outside 0.0-1.0.
    #[error(
        "Scoring weight '{name}' out of range: {value} (must be 0.0-1.0). \
         Got coupling={coupling}, complexity={complexity}, tech_debt={tech_debt}, \
         external_exposure={external_exposure} (sum={sum:.4}); \
         e.g. coupling=0.40, complexity=0.30, tech_debt=0.20, external_exposure=0.10"
    )]
    WeightOutOfRange {
        name: &'static str,
        value: f64,
        coupling: f64,
        complexity: f64,
        tech_debt: f64,
        external_exposure: f64,
        sum: f64,
    },

    /// Coupling counts are call-count-like and can never be negative.
    #[error("Coupling count must be non-negative, got {0}")]
    NegativeCouplingCount(i64),

    /// An annotation referenced an edge that is not part of the graph.
    #[error("Unknown dependency edge index {0}")]
    UnknownEdge(usize),

    /// A metric collaborator produced a value outside the normalized range.
    #[error("{metric} metric for module '{module}' is out of range: {value} (expected 0-100)")]
    MetricOutOfRange {
        module: String,
        metric: MetricKind,
        value: f64,
    },

    /// A metric collaborator could not produce a value for a module.
    #[error("{metric} metric unavailable for module '{module}': {reason}")]
    MetricUnavailable {
        module: String,
        metric: MetricKind,
        reason: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was aborted through its cancellation token.
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Returns true if this value signals cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled)
    }
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

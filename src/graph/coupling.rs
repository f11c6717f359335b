//! Coupling strength classification.
//!
//! Maps a raw coupling count (method calls, type references, ...) across a
//! dependency edge to a three-level strength category.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, AnalysisResult};

/// Highest count still considered weak coupling.
pub const WEAK_MAX_COUNT: u32 = 5;

/// Highest count still considered medium coupling.
pub const MEDIUM_MAX_COUNT: u32 = 20;

/// Coupling score assigned to edges with no semantic data: reference only.
pub const DEFAULT_COUPLING_SCORE: u32 = 1;

/// Strength category derived from a coupling count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum CouplingStrength {
    /// 0..=5 interactions
    #[default]
    Weak,
    /// 6..=20 interactions
    Medium,
    /// 21 or more interactions
    Strong,
}

impl CouplingStrength {
    /// Returns a short label for the strength.
    pub fn label(&self) -> &'static str {
        match self {
            CouplingStrength::Weak => "weak",
            CouplingStrength::Medium => "medium",
            CouplingStrength::Strong => "strong",
        }
    }
}

impl fmt::Display for CouplingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Upper bounds for the weak and medium categories.
///
/// Anything above `medium_max` is strong. Loaded from the `[coupling]`
/// section of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CouplingThresholds {
    pub weak_max: u32,
    pub medium_max: u32,
}

impl Default for CouplingThresholds {
    fn default() -> Self {
        Self {
            weak_max: WEAK_MAX_COUNT,
            medium_max: MEDIUM_MAX_COUNT,
        }
    }
}

impl CouplingThresholds {
    /// Classifies a coupling count against these thresholds.
    ///
    /// Negative counts are rejected with [`AnalysisError::NegativeCouplingCount`].
    pub fn classify(&self, count: i64) -> AnalysisResult<CouplingStrength> {
        let count = validate_count(count)?;
        Ok(self.classify_score(count))
    }

    /// Classifies an already validated, non-negative score.
    pub fn classify_score(&self, score: u32) -> CouplingStrength {
        if score <= self.weak_max {
            CouplingStrength::Weak
        } else if score <= self.medium_max {
            CouplingStrength::Medium
        } else {
            CouplingStrength::Strong
        }
    }
}

/// Classifies a coupling count with the default thresholds.
///
/// # Example
///
/// ```rust
/// use modscope::graph::{classify, CouplingStrength};
///
/// assert_eq!(classify(5).unwrap(), CouplingStrength::Weak);
/// assert_eq!(classify(6).unwrap(), CouplingStrength::Medium);
/// assert_eq!(classify(21).unwrap(), CouplingStrength::Strong);
/// assert!(classify(-1).is_err());
/// ```
pub fn classify(count: i64) -> AnalysisResult<CouplingStrength> {
    CouplingThresholds::default().classify(count)
}

/// Converts a raw count into a stored coupling score.
pub(crate) fn validate_count(count: i64) -> AnalysisResult<u32> {
    if count < 0 {
        return Err(AnalysisError::NegativeCouplingCount(count));
    }
    // Counts beyond u32 are all "strong"; saturate rather than wrap.
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

//! Scoring weights for extraction difficulty.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Allowed distance between the weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Slack for float rounding so sums written as exactly 0.99 or 1.01 pass.
const SUM_ROUNDING_SLACK: f64 = 1e-9;

pub const DEFAULT_COUPLING_WEIGHT: f64 = 0.40;
pub const DEFAULT_COMPLEXITY_WEIGHT: f64 = 0.30;
pub const DEFAULT_TECH_DEBT_WEIGHT: f64 = 0.20;
pub const DEFAULT_EXTERNAL_EXPOSURE_WEIGHT: f64 = 0.10;

/// Validated weights of the four extraction metrics.
///
/// Each weight lies in 0.0-1.0 and the four sum to 1.0 within
/// [`WEIGHT_SUM_TOLERANCE`]. The only way to obtain a value is through
/// [`ScoringWeights::new`] or [`Default`], so a held value is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    coupling: f64,
    complexity: f64,
    tech_debt: f64,
    external_exposure: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            coupling: DEFAULT_COUPLING_WEIGHT,
            complexity: DEFAULT_COMPLEXITY_WEIGHT,
            tech_debt: DEFAULT_TECH_DEBT_WEIGHT,
            external_exposure: DEFAULT_EXTERNAL_EXPOSURE_WEIGHT,
        }
    }
}

impl ScoringWeights {
    /// Validates and builds a weight set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modscope::scoring::ScoringWeights;
    ///
    /// assert!(ScoringWeights::new(0.25, 0.25, 0.25, 0.25).is_ok());
    /// assert!(ScoringWeights::new(0.5, 0.5, 0.5, 0.0).is_err());
    /// ```
    pub fn new(
        coupling: f64,
        complexity: f64,
        tech_debt: f64,
        external_exposure: f64,
    ) -> AnalysisResult<Self> {
        let sum = coupling + complexity + tech_debt + external_exposure;

        let named = [
            ("coupling", coupling),
            ("complexity", complexity),
            ("tech_debt", tech_debt),
            ("external_exposure", external_exposure),
        ];
        if let Some(&(name, value)) = named.iter().find(|(_, v)| !Self::is_valid_weight(*v)) {
            return Err(AnalysisError::WeightOutOfRange {
                name,
                value,
                coupling,
                complexity,
                tech_debt,
                external_exposure,
                sum,
            });
        }

        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE + SUM_ROUNDING_SLACK {
            return Err(AnalysisError::InvalidWeights {
                coupling,
                complexity,
                tech_debt,
                external_exposure,
                sum,
            });
        }

        Ok(Self {
            coupling,
            complexity,
            tech_debt,
            external_exposure,
        })
    }

    /// Returns true if `weight` is a finite value in 0.0-1.0.
    pub fn is_valid_weight(weight: f64) -> bool {
        (0.0..=1.0).contains(&weight)
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    pub fn tech_debt(&self) -> f64 {
        self.tech_debt
    }

    pub fn external_exposure(&self) -> f64 {
        self.external_exposure
    }

    /// Sum of the four weights.
    pub fn sum(&self) -> f64 {
        self.coupling + self.complexity + self.tech_debt + self.external_exposure
    }
}

/// Weight values as read from configuration, before validation.
///
/// Missing keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawScoringWeights {
    pub coupling: f64,
    pub complexity: f64,
    pub tech_debt: f64,
    pub external_exposure: f64,
}

impl Default for RawScoringWeights {
    fn default() -> Self {
        let defaults = ScoringWeights::default();
        Self {
            coupling: defaults.coupling,
            complexity: defaults.complexity,
            tech_debt: defaults.tech_debt,
            external_exposure: defaults.external_exposure,
        }
    }
}

impl TryFrom<RawScoringWeights> for ScoringWeights {
    type Error = AnalysisError;

    fn try_from(raw: RawScoringWeights) -> AnalysisResult<Self> {
        ScoringWeights::new(
            raw.coupling,
            raw.complexity,
            raw.tech_debt,
            raw.external_exposure,
        )
    }
}

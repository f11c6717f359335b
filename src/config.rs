//! Analysis configuration.
//!
//! Loaded from `modscope.toml`. Every section is optional; absent values
//! fall back to defaults. Invalid weights are fatal and reported before any
//! scoring happens.
//!
//! # Configuration Format
//!
//! ```toml
//! [scoring]
//! coupling = 0.40
//! complexity = 0.30
//! tech_debt = 0.20
//! external_exposure = 0.10
//!
//! [coupling]
//! weak_max = 5
//! medium_max = 20
//!
//! [analysis]
//! parallel = true
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CouplingThresholds;
use crate::scoring::{RawScoringWeights, ScoringWeights};

/// File name looked up in the analyzed directory.
pub const CONFIG_FILE_NAME: &str = "modscope.toml";

/// Settings for the analysis run itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Collect per-module metrics on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub scoring: ScoringWeights,
    pub coupling: CouplingThresholds,
    pub analysis: AnalysisSettings,
}

/// Configuration as written on disk, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    scoring: RawScoringWeights,
    coupling: CouplingThresholds,
    analysis: AnalysisSettings,
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modscope::config::Config;
    ///
    /// let config = Config::from_toml_str("[scoring]\ncoupling = 0.5\ncomplexity = 0.2").unwrap();
    /// assert_eq!(config.scoring.coupling(), 0.5);
    ///
    /// assert!(Config::from_toml_str("[scoring]\ncoupling = 0.9").is_err());
    /// ```
    pub fn from_toml_str(content: &str) -> AnalysisResult<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| AnalysisError::Config(e.to_string()))?;

        if raw.coupling.weak_max > raw.coupling.medium_max {
            return Err(AnalysisError::Config(format!(
                "coupling.weak_max ({}) must not exceed coupling.medium_max ({})",
                raw.coupling.weak_max, raw.coupling.medium_max
            )));
        }

        Ok(Self {
            scoring: ScoringWeights::try_from(raw.scoring)?,
            coupling: raw.coupling,
            analysis: raw.analysis,
        })
    }

    /// Loads configuration from a file.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolves the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `modscope.toml` in `dir` is
    /// used when present, and defaults when not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> AnalysisResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Loading configuration");
            Self::load(&candidate)
        } else {
            debug!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }
}

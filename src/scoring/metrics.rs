//! Metric collaborators for extraction scoring.
//!
//! Coupling is only meaningful relative to the whole graph, so it is
//! computed once for every module by a [`GraphCouplingMetric`]. The other
//! three metrics are per-module and come from [`ModuleMetricProvider`]s.
//! Every value is normalized to 0-100 before it reaches the calculator.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::{DependencyGraph, Module};

/// Upper bound of every normalized metric.
pub const METRIC_MAX: f64 = 100.0;

/// The four metrics combined into an extraction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Coupling,
    Complexity,
    TechDebt,
    ExternalExposure,
}

impl MetricKind {
    /// Returns a short label for the metric.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Coupling => "coupling",
            MetricKind::Complexity => "complexity",
            MetricKind::TechDebt => "tech_debt",
            MetricKind::ExternalExposure => "external_exposure",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One metric's share of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricContribution {
    /// Normalized metric value (0-100)
    pub value: f64,
    /// Weight applied to the value
    pub weight: f64,
}

impl MetricContribution {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }

    /// `value * weight`
    pub fn weighted(&self) -> f64 {
        self.value * self.weight
    }
}

/// Checks that a collaborator returned a finite value in 0-100.
pub fn validate_metric(module: &str, metric: MetricKind, value: f64) -> AnalysisResult<f64> {
    if value.is_finite() && (0.0..=METRIC_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(AnalysisError::MetricOutOfRange {
            module: module.to_string(),
            metric,
            value,
        })
    }
}

/// Computes normalized coupling for every module of a graph in one pass.
pub trait GraphCouplingMetric {
    /// Returns module name -> coupling metric (0-100) for every module.
    fn compute(
        &self,
        graph: &DependencyGraph,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<HashMap<String, f64>>;
}

/// Supplies one independently computable metric for a single module.
///
/// Implementations are shared across worker threads during batch scoring.
pub trait ModuleMetricProvider: Send + Sync {
    /// Which metric this provider produces.
    fn kind(&self) -> MetricKind;

    /// Returns the normalized (0-100) value for `module`.
    ///
    /// Failures propagate; the calculator never substitutes a default.
    fn score(&self, module: &Module) -> AnalysisResult<f64>;
}

/// The three per-module providers used by the calculator.
#[derive(Clone, Copy)]
pub struct MetricProviders<'a> {
    pub complexity: &'a dyn ModuleMetricProvider,
    pub tech_debt: &'a dyn ModuleMetricProvider,
    pub external_exposure: &'a dyn ModuleMetricProvider,
}

impl<'a> MetricProviders<'a> {
    pub fn new(
        complexity: &'a dyn ModuleMetricProvider,
        tech_debt: &'a dyn ModuleMetricProvider,
        external_exposure: &'a dyn ModuleMetricProvider,
    ) -> Self {
        Self {
            complexity,
            tech_debt,
            external_exposure,
        }
    }
}

/// Coupling derived from the annotated coupling scores of each module's edges.
///
/// A module's raw coupling is the sum of scores on every edge entering or
/// leaving it (self-loops once). Raw values are scaled so the most coupled
/// module of the graph scores 100; an edgeless graph scores 0 everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanCouplingMetric;

impl GraphCouplingMetric for FanCouplingMetric {
    fn compute(
        &self,
        graph: &DependencyGraph,
        ctx: &AnalysisContext,
    ) -> AnalysisResult<HashMap<String, f64>> {
        let mut raw: HashMap<&str, u64> = graph.modules().map(|m| (m.name.as_str(), 0)).collect();

        for edge in graph.edges() {
            let score = u64::from(edge.coupling_score());
            *raw.entry(edge.source.name.as_str()).or_default() += score;
            if edge.source != edge.target {
                *raw.entry(edge.target.name.as_str()).or_default() += score;
            }
        }

        let max = raw.values().copied().max().unwrap_or(0);
        let mut normalized = HashMap::with_capacity(raw.len());
        for module in graph.modules() {
            ctx.checkpoint()?;
            let value = match raw.get(module.name.as_str()) {
                Some(&r) if max > 0 => r as f64 / max as f64 * METRIC_MAX,
                _ => 0.0,
            };
            normalized.insert(module.name.clone(), value);
        }

        Ok(normalized)
    }
}

/// Precomputed metric values looked up by module name.
///
/// Unknown modules are reported as unavailable rather than scored 0.
#[derive(Debug, Clone)]
pub struct MetricTable {
    kind: MetricKind,
    values: HashMap<String, f64>,
}

impl MetricTable {
    /// Creates an empty table for `kind`.
    pub fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            values: HashMap::new(),
        }
    }

    /// Creates a table from `(module, value)` pairs.
    pub fn from_values<I, S>(kind: MetricKind, values: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            kind,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Sets the value for a module.
    pub fn insert(&mut self, module: impl Into<String>, value: f64) {
        self.values.insert(module.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ModuleMetricProvider for MetricTable {
    fn kind(&self) -> MetricKind {
        self.kind
    }

    fn score(&self, module: &Module) -> AnalysisResult<f64> {
        self.values
            .get(&module.name)
            .copied()
            .ok_or_else(|| AnalysisError::MetricUnavailable {
                module: module.name.clone(),
                metric: self.kind,
                reason: "no value recorded".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CouplingThresholds, DependencyKind};

    #[test]
    fn test_validate_metric_range() {
        assert_eq!(validate_metric("a", MetricKind::Complexity, 0.0).unwrap(), 0.0);
        assert_eq!(validate_metric("a", MetricKind::Complexity, 100.0).unwrap(), 100.0);
        assert!(validate_metric("a", MetricKind::Complexity, 100.5).is_err());
        assert!(validate_metric("a", MetricKind::Complexity, -0.1).is_err());
        assert!(validate_metric("a", MetricKind::Complexity, f64::NAN).is_err());
    }

    #[test]
    fn test_contribution_weighted() {
        let c = MetricContribution::new(50.0, 0.4);
        assert!((c.weighted() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_fan_coupling_normalizes_to_graph_max() {
        let mut graph = DependencyGraph::new();
        for name in ["hub", "a", "b", "lonely"] {
            graph.add_module(name, name);
        }
        let thresholds = CouplingThresholds::default();
        let e1 = graph.add_dependency("a", "hub", DependencyKind::ProjectReference).unwrap();
        let e2 = graph.add_dependency("b", "hub", DependencyKind::ProjectReference).unwrap();
        graph.set_coupling(e1, 10, &thresholds).unwrap();
        graph.set_coupling(e2, 30, &thresholds).unwrap();

        let values = FanCouplingMetric.compute(&graph, &AnalysisContext::new()).unwrap();
        assert_eq!(values.len(), 4);
        assert!((values["hub"] - 100.0).abs() < 1e-9);
        assert!((values["a"] - 25.0).abs() < 1e-9);
        assert!((values["b"] - 75.0).abs() < 1e-9);
        assert_eq!(values["lonely"], 0.0);
    }

    #[test]
    fn test_fan_coupling_edgeless_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_module("a", "a");
        let values = FanCouplingMetric.compute(&graph, &AnalysisContext::new()).unwrap();
        assert_eq!(values["a"], 0.0);
    }

    #[test]
    fn test_metric_table_unknown_module() {
        let table = MetricTable::from_values(MetricKind::TechDebt, [("a", 10.0)]);
        assert_eq!(table.score(&Module::new("a", "a")).unwrap(), 10.0);

        let err = table.score(&Module::new("b", "b")).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MetricUnavailable {
                metric: MetricKind::TechDebt,
                ..
            }
        ));
    }
}

//! Project manifest format and conversion into a dependency graph.
//!
//! A manifest lists modules (optionally with precomputed metrics) and the
//! dependencies between them. JSON and TOML encodings share one schema.
//!
//! ```json
//! {
//!   "name": "shop",
//!   "modules": [
//!     { "name": "orders", "path": "src/Orders",
//!       "metrics": { "complexity": 40, "tech_debt": 10, "external_exposure": 5 } },
//!     { "name": "billing" }
//!   ],
//!   "dependencies": [
//!     { "from": "orders", "to": "billing", "kind": "project", "coupling": 12 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::LoadError;
use crate::error::AnalysisResult;
use crate::graph::{CouplingCountProvider, DependencyGraph, DependencyKind, EdgeId};
use crate::scoring::{MetricKind, MetricTable};

/// Result type alias for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project name shown in reports.
    pub name: Option<String>,

    /// Modules of the project.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    /// Dependencies between modules.
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

/// One module declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,

    /// Defaults to the module name.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub metrics: Option<ModuleMetricsEntry>,
}

/// Normalized (0-100) metrics recorded for a module.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModuleMetricsEntry {
    pub complexity: Option<f64>,
    pub tech_debt: Option<f64>,
    pub external_exposure: Option<f64>,
}

/// One dependency declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub from: String,
    pub to: String,

    #[serde(default)]
    pub kind: DependencyKind,

    /// Raw coupling count; edges without one stay reference-only.
    #[serde(default)]
    pub coupling: Option<i64>,
}

/// Coupling counts recorded in a manifest, keyed by the edges they produced.
#[derive(Debug, Clone, Default)]
pub struct ManifestCouplingCounts {
    counts: Vec<(EdgeId, i64)>,
}

impl ManifestCouplingCounts {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl CouplingCountProvider for ManifestCouplingCounts {
    fn edge_counts(&self, _graph: &DependencyGraph) -> AnalysisResult<Vec<(EdgeId, i64)>> {
        Ok(self.counts.clone())
    }
}

/// A graph plus the metric data that came with it.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub name: String,
    /// File the project was read from
    pub source: PathBuf,
    /// Unscored graph; annotate with `coupling_counts` before analysis
    pub graph: DependencyGraph,
    pub coupling_counts: ManifestCouplingCounts,
    pub complexity: MetricTable,
    pub tech_debt: MetricTable,
    pub external_exposure: MetricTable,
}

/// Parses a JSON manifest.
///
/// # Example
///
/// ```
/// use modscope::loader::manifest::parse_json_str;
///
/// let manifest = parse_json_str(r#"{"name": "shop", "modules": [{"name": "orders"}]}"#).unwrap();
/// assert_eq!(manifest.modules.len(), 1);
/// ```
pub fn parse_json_str(content: &str) -> LoadResult<ProjectManifest> {
    Ok(serde_json::from_str(content)?)
}

/// Parses a TOML manifest.
pub fn parse_toml_str(content: &str) -> LoadResult<ProjectManifest> {
    Ok(toml::from_str(content)?)
}

/// Parses a manifest file, choosing the format by extension (JSON otherwise).
pub fn parse_file(path: &Path) -> LoadResult<ProjectManifest> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml_str(&content),
        _ => parse_json_str(&content),
    }
}

/// Validates a parsed manifest.
///
/// Checks for duplicate module names and dependencies on undeclared modules.
pub fn validate(manifest: &ProjectManifest) -> LoadResult<()> {
    let mut names = HashSet::with_capacity(manifest.modules.len());
    for module in &manifest.modules {
        if module.name.trim().is_empty() {
            return Err(LoadError::Invalid("module with empty name".to_string()));
        }
        if !names.insert(module.name.as_str()) {
            return Err(LoadError::Invalid(format!(
                "duplicate module '{}'",
                module.name
            )));
        }
    }

    for dep in &manifest.dependencies {
        for end in [&dep.from, &dep.to] {
            if !names.contains(end.as_str()) {
                return Err(LoadError::Invalid(format!(
                    "dependency {} -> {} references undeclared module '{}'",
                    dep.from, dep.to, end
                )));
            }
        }
    }

    Ok(())
}

/// Builds the graph and metric tables described by a manifest.
pub fn build_project(manifest: ProjectManifest, source: &Path) -> LoadResult<LoadedProject> {
    validate(&manifest)?;

    let name = manifest.name.clone().unwrap_or_else(|| {
        source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("project")
            .to_string()
    });

    let mut graph =
        DependencyGraph::with_capacity(manifest.modules.len(), manifest.dependencies.len());
    let mut complexity = MetricTable::new(MetricKind::Complexity);
    let mut tech_debt = MetricTable::new(MetricKind::TechDebt);
    let mut external_exposure = MetricTable::new(MetricKind::ExternalExposure);

    for module in &manifest.modules {
        let path = module
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&module.name));
        graph.add_module(&module.name, path);

        let metrics = module.metrics.unwrap_or_default();
        let tables = [
            (&mut complexity, metrics.complexity),
            (&mut tech_debt, metrics.tech_debt),
            (&mut external_exposure, metrics.external_exposure),
        ];
        for (table, value) in tables {
            if let Some(value) = value {
                table.insert(module.name.clone(), value);
            }
        }
    }

    let mut counts = Vec::new();
    for dep in &manifest.dependencies {
        let id = graph
            .add_dependency(&dep.from, &dep.to, dep.kind)
            .ok_or_else(|| LoadError::Invalid(format!("cannot add {} -> {}", dep.from, dep.to)))?;
        if let Some(count) = dep.coupling {
            counts.push((id, count));
        }
    }

    Ok(LoadedProject {
        name,
        source: source.to_path_buf(),
        graph,
        coupling_counts: ManifestCouplingCounts { counts },
        complexity,
        tech_debt,
        external_exposure,
    })
}

//! Loading project graphs from disk.
//!
//! [`GraphLoader`] tries an ordered list of strategies. Each strategy either
//! yields a [`LoadedProject`] or fails with its own [`LoadError`]; when every
//! strategy fails, the caller gets [`LoadError::Exhausted`] carrying all of
//! the individual causes.
//!
//! # Strategies
//!
//! 1. **explicit-file** - the path itself is a manifest (`.json` or `.toml`)
//! 2. **directory-json** - `modgraph.json` inside the directory
//! 3. **directory-toml** - `modgraph.toml` inside the directory
//! 4. **search** - first `*.modgraph.json` found below the directory
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use modscope::loader::GraphLoader;
//!
//! let project = GraphLoader::new().load(Path::new("."))?;
//! println!("{}: {} modules", project.name, project.graph.module_count());
//! ```

pub mod manifest;

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub use manifest::{
    build_project, parse_file, parse_json_str, parse_toml_str, validate, LoadResult,
    LoadedProject, ManifestCouplingCounts, ProjectManifest,
};

/// Manifest file name looked up in a directory (JSON encoding).
pub const JSON_MANIFEST_NAME: &str = "modgraph.json";

/// Manifest file name looked up in a directory (TOML encoding).
pub const TOML_MANIFEST_NAME: &str = "modgraph.toml";

/// Suffix matched by the recursive search strategy.
pub const SEARCH_SUFFIX: &str = ".modgraph.json";

/// How deep the search strategy descends.
const SEARCH_MAX_DEPTH: usize = 4;

/// Errors that can occur while loading a project graph.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read a file from disk.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse TOML content.
    #[error("Failed to parse TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    /// The manifest parsed but describes an inconsistent graph.
    #[error("Invalid manifest: {0}")]
    Invalid(String),

    /// The strategy found nothing to load.
    #[error("No manifest found at {}", .0.display())]
    NotFound(PathBuf),

    /// Every strategy failed.
    #[error(
        "Could not load a project graph from {}: {}",
        .path.display(),
        summarize(.attempts)
    )]
    Exhausted {
        path: PathBuf,
        attempts: Vec<LoadAttempt>,
    },
}

/// A failed strategy and its cause.
#[derive(Debug)]
pub struct LoadAttempt {
    pub strategy: &'static str,
    pub error: LoadError,
}

fn summarize(attempts: &[LoadAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("[{}] {}", a.strategy, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// One way of turning a path into a project.
pub type LoadStrategy = fn(&Path) -> LoadResult<LoadedProject>;

/// Loads a project by trying strategies in order.
pub struct GraphLoader {
    strategies: Vec<(&'static str, LoadStrategy)>,
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphLoader {
    /// Creates a loader with the built-in strategies.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                ("explicit-file", load_explicit_file as LoadStrategy),
                ("directory-json", load_directory_json),
                ("directory-toml", load_directory_toml),
                ("search", load_by_search),
            ],
        }
    }

    /// Creates a loader with a custom strategy list.
    pub fn with_strategies(strategies: Vec<(&'static str, LoadStrategy)>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|(name, _)| *name).collect()
    }

    /// Loads the project at `path`, returning the first strategy's success.
    pub fn load(&self, path: &Path) -> LoadResult<LoadedProject> {
        let mut attempts = Vec::new();

        for &(strategy, load) in &self.strategies {
            match load(path) {
                Ok(project) => {
                    debug!(
                        strategy,
                        source = %project.source.display(),
                        modules = project.graph.module_count(),
                        "Loaded project graph"
                    );
                    return Ok(project);
                }
                Err(error) => {
                    if !matches!(error, LoadError::NotFound(_)) {
                        warn!(strategy, %error, "Load strategy failed");
                    }
                    attempts.push(LoadAttempt { strategy, error });
                }
            }
        }

        Err(LoadError::Exhausted {
            path: path.to_path_buf(),
            attempts,
        })
    }
}

fn load_file(path: &Path) -> LoadResult<LoadedProject> {
    let manifest = parse_file(path)?;
    build_project(manifest, path)
}

fn load_explicit_file(path: &Path) -> LoadResult<LoadedProject> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    load_file(path)
}

fn load_named(dir: &Path, file_name: &str) -> LoadResult<LoadedProject> {
    let candidate = dir.join(file_name);
    if !candidate.is_file() {
        return Err(LoadError::NotFound(candidate));
    }
    load_file(&candidate)
}

fn load_directory_json(path: &Path) -> LoadResult<LoadedProject> {
    load_named(path, JSON_MANIFEST_NAME)
}

fn load_directory_toml(path: &Path) -> LoadResult<LoadedProject> {
    load_named(path, TOML_MANIFEST_NAME)
}

fn load_by_search(path: &Path) -> LoadResult<LoadedProject> {
    if !path.is_dir() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let found = WalkDir::new(path)
        .max_depth(SEARCH_MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(SEARCH_SUFFIX))
        });

    match found {
        Some(entry) => load_file(entry.path()),
        None => Err(LoadError::NotFound(path.join(format!("*{}", SEARCH_SUFFIX)))),
    }
}

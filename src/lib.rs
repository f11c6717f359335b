//! ModScope - Module dependency analytics for modularization planning
//!
//! This crate models a codebase as a directed graph of modules, finds
//! circular dependencies, points at the weakest edges to break inside each
//! cycle, and ranks modules by how hard they would be to extract.

pub mod analysis;
pub mod config;
pub mod context;
pub mod cycles;
pub mod error;
pub mod export;
pub mod graph;
pub mod loader;
pub mod scoring;

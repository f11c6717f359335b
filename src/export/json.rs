//! JSON export implementation.
//!
//! Exports the full analysis report in JSON format for machine-readable output.

use super::{category_count, Exporter};
use crate::analysis::AnalysisReport;
use crate::cycles::CycleStatistics;
use crate::scoring::{DifficultyCategory, ScoreRow};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable weak edge for JSON output.
#[derive(Serialize)]
struct JsonWeakEdge<'a> {
    source: &'a str,
    target: &'a str,
    coupling_score: u32,
}

/// Serializable cycle for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    id: usize,
    modules: &'a [String],
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    weak_coupling_score: Option<u32>,
    weak_edges: Vec<JsonWeakEdge<'a>>,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary<'a> {
    modules: usize,
    dependencies: usize,
    cycles: &'a CycleStatistics,
    easy: usize,
    medium: usize,
    hard: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    project: &'a str,
    summary: JsonSummary<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cycles: Vec<JsonCycle<'a>>,
    cycle_edges: &'a [usize],
    scores: Vec<ScoreRow>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        let cycles: Vec<JsonCycle> = report
            .cycles
            .iter()
            .map(|c| JsonCycle {
                id: c.id(),
                modules: c.modules(),
                path: c.cycle_path(),
                weak_coupling_score: c.weak_coupling_score(),
                weak_edges: c
                    .weak_edges()
                    .iter()
                    .map(|e| JsonWeakEdge {
                        source: &e.source,
                        target: &e.target,
                        coupling_score: e.coupling_score,
                    })
                    .collect(),
            })
            .collect();

        let export = JsonExport {
            project: &report.project,
            summary: JsonSummary {
                modules: report.module_count,
                dependencies: report.dependency_count,
                cycles: &report.statistics,
                easy: category_count(report, DifficultyCategory::Easy),
                medium: category_count(report, DifficultyCategory::Medium),
                hard: category_count(report, DifficultyCategory::Hard),
            },
            cycles,
            cycle_edges: &report.cycle_edges,
            scores: report.scores.iter().map(|s| s.to_row()).collect(),
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

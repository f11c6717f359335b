//! CSV export implementation.
//!
//! Exports extraction scores as flat rows for spreadsheet use, in ranked
//! order (easiest first).

use super::Exporter;
use crate::analysis::AnalysisReport;
use std::collections::HashSet;
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn format_metric(value: f64) -> String {
        format!("{:.2}", value)
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "module,final_score,category,coupling,complexity,tech_debt,external_exposure,in_cycle"
        )?;

        let cycle_modules: HashSet<&str> = report
            .cycles
            .iter()
            .flat_map(|c| c.modules().iter().map(String::as_str))
            .collect();

        for score in &report.scores {
            let row = score.to_row();
            // Coupling is absent for scores computed without graph context.
            let coupling = row.coupling.map(Self::format_metric).unwrap_or_default();

            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                Self::escape_field(&row.module),
                Self::format_metric(row.final_score),
                row.category,
                coupling,
                Self::format_metric(row.complexity),
                Self::format_metric(row.tech_debt),
                Self::format_metric(row.external_exposure),
                cycle_modules.contains(row.module.as_str())
            )?;
        }

        Ok(())
    }
}

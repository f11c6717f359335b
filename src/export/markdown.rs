//! Markdown export implementation.
//!
//! Exports analysis results in Markdown format for documentation and reporting.

use super::{category_count, Exporter};
use crate::analysis::AnalysisReport;
use crate::scoring::DifficultyCategory;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl MarkdownExporter {
    fn format_optional(value: Option<f64>) -> String {
        value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, report: &AnalysisReport, writer: &mut W) -> io::Result<()> {
        let stats = &report.statistics;

        // Title
        writeln!(writer, "# Module Dependency Analysis Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Project:** {}", report.project)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Modules | {} |", report.module_count)?;
        writeln!(writer, "| Dependencies | {} |", report.dependency_count)?;
        writeln!(writer, "| Circular Dependencies | {} |", stats.total_cycles)?;
        writeln!(
            writer,
            "| Modules in Cycles | {} ({:.1}%) |",
            stats.total_modules_in_cycles,
            stats.participation_percentage()
        )?;
        if let Some(largest) = stats.largest_cycle_size {
            writeln!(writer, "| Largest Cycle | {} |", largest)?;
        }
        for category in [
            DifficultyCategory::Easy,
            DifficultyCategory::Medium,
            DifficultyCategory::Hard,
        ] {
            writeln!(
                writer,
                "| {} Extractions | {} |",
                category,
                category_count(report, category)
            )?;
        }
        writeln!(writer)?;

        // Circular dependencies
        if !report.cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;

            for cycle in &report.cycles {
                writeln!(writer, "### Cycle {} ({} modules)", cycle.id(), cycle.len())?;
                writeln!(writer)?;
                writeln!(writer, "`{}`", cycle.cycle_path())?;
                writeln!(writer)?;

                let suggestions = cycle.break_suggestions();
                if suggestions.is_empty() {
                    writeln!(writer, "No internal edges found for this cycle.")?;
                } else {
                    writeln!(writer, "Suggested break points:")?;
                    writeln!(writer)?;
                    for suggestion in suggestions {
                        writeln!(writer, "- `{}`", suggestion)?;
                    }
                }
                writeln!(writer)?;
            }
        }

        // Extraction candidates
        if !report.scores.is_empty() {
            writeln!(writer, "## Extraction Candidates")?;
            writeln!(writer)?;
            writeln!(writer, "Ranked from easiest to hardest to extract.")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "| Module | Score | Difficulty | Coupling | Complexity | Tech Debt | API Exposure |"
            )?;
            writeln!(
                writer,
                "|--------|-------|------------|----------|------------|-----------|--------------|"
            )?;
            for score in &report.scores {
                let row = score.to_row();
                writeln!(
                    writer,
                    "| {} | {:.1} | {} | {} | {:.1} | {:.1} | {:.1} |",
                    row.module,
                    row.final_score,
                    row.category,
                    Self::format_optional(row.coupling),
                    row.complexity,
                    row.tech_debt,
                    row.external_exposure
                )?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by modscope*")?;

        Ok(())
    }
}

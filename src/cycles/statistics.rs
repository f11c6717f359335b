//! Aggregate statistics over detected cycles.

use serde::Serialize;
use std::collections::HashSet;

use super::Cycle;

/// Summary view over a cycle list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleStatistics {
    /// Number of cycles found
    pub total_cycles: usize,
    /// Distinct modules taking part in at least one cycle
    pub total_modules_in_cycles: usize,
    /// `total_modules_in_cycles / total module count`, 0 for an empty graph
    pub participation_rate: f64,
    /// Member count of the biggest cycle; `None` when there are no cycles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_cycle_size: Option<usize>,
}

impl CycleStatistics {
    /// Computes statistics for `cycles` found in a graph of `total_modules`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modscope::cycles::{Cycle, CycleStatistics};
    ///
    /// let cycles = vec![Cycle::new(1, vec!["a".into(), "b".into()])];
    /// let stats = CycleStatistics::compute(&cycles, 4);
    /// assert_eq!(stats.total_cycles, 1);
    /// assert_eq!(stats.participation_rate, 0.5);
    /// assert_eq!(stats.largest_cycle_size, Some(2));
    /// ```
    pub fn compute(cycles: &[Cycle], total_modules: usize) -> Self {
        let mut members: HashSet<&str> = HashSet::new();
        let mut largest: Option<usize> = None;

        for cycle in cycles {
            members.extend(cycle.modules().iter().map(String::as_str));
            largest = Some(largest.map_or(cycle.len(), |l| l.max(cycle.len())));
        }

        let participation_rate = if total_modules == 0 {
            0.0
        } else {
            members.len() as f64 / total_modules as f64
        };

        Self {
            total_cycles: cycles.len(),
            total_modules_in_cycles: members.len(),
            participation_rate,
            largest_cycle_size: largest,
        }
    }

    /// Participation rate as a percentage (0-100).
    pub fn participation_percentage(&self) -> f64 {
        self.participation_rate * 100.0
    }

    /// Returns true if any cycle was found.
    pub fn has_cycles(&self) -> bool {
        self.total_cycles > 0
    }
}

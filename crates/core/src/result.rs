//! Layout result representation.

use crate::geometry::{CoreTypeId, DieSpec};
use crate::placement::PlacedCore;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a single floorplanning run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutResult {
    /// Every placed core, primaries first, filler cores last.
    pub placements: Vec<PlacedCore>,

    /// Number of placed cores per type.
    pub counts: BTreeMap<CoreTypeId, usize>,

    /// Core type whose count was maximised.
    pub filler_type: CoreTypeId,

    /// Number of filler cores placed after the primary request.
    pub filler_count: usize,

    /// Whether every requested primary core was placed.
    pub feasible: bool,

    /// Placed area divided by die area (0.0 - 1.0).
    pub utilization: f64,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Strategy used.
    pub strategy: Option<String>,
}

impl LayoutResult {
    /// Creates an infeasible result with no placements.
    pub fn infeasible(filler_type: impl Into<CoreTypeId>) -> Self {
        Self {
            placements: Vec::new(),
            counts: BTreeMap::new(),
            filler_type: filler_type.into(),
            filler_count: 0,
            feasible: false,
            utilization: 0.0,
            computation_time_ms: 0,
            strategy: None,
        }
    }

    /// Creates a result from placements, deriving counts and utilization.
    pub fn from_placements(
        placements: Vec<PlacedCore>,
        filler_type: impl Into<CoreTypeId>,
        filler_count: usize,
        feasible: bool,
        die: &DieSpec,
    ) -> Self {
        let counts = count_by_type(&placements);
        let placed_area: f64 = placements.iter().map(PlacedCore::area).sum();
        Self {
            placements,
            counts,
            filler_type: filler_type.into(),
            filler_count,
            feasible,
            utilization: placed_area / die.area(),
            computation_time_ms: 0,
            strategy: None,
        }
    }

    /// Number of placed cores of the given type.
    pub fn count_of(&self, core_type: &str) -> usize {
        self.counts.get(core_type).copied().unwrap_or(0)
    }

    /// Total number of placed cores.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Sets the strategy name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }

    /// Layout records, one `x,y,w,h,type` line per placed core.
    pub fn records(&self) -> String {
        let mut out = String::new();
        for placement in &self.placements {
            out.push_str(&placement.to_record());
            out.push('\n');
        }
        out
    }
}

/// Counts placed cores per type.
pub fn count_by_type(placements: &[PlacedCore]) -> BTreeMap<CoreTypeId, usize> {
    let mut counts = BTreeMap::new();
    for placement in placements {
        *counts.entry(placement.core_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Summary statistics for a layout result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutSummary {
    /// Total cores placed.
    pub total_placed: usize,
    /// Filler cores placed.
    pub filler_placed: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Whether the primary request was met.
    pub feasible: bool,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
}

impl From<&LayoutResult> for LayoutSummary {
    fn from(result: &LayoutResult) -> Self {
        Self {
            total_placed: result.placements.len(),
            filler_placed: result.filler_count,
            utilization_percent: result.utilization * 100.0,
            feasible: result.feasible,
            time_ms: result.computation_time_ms,
            strategy: result
                .strategy
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutResult {
        let placements = vec![
            PlacedCore::new("big", 0.0, 0.0, 5.0, 4.0),
            PlacedCore::new("LITTLE", 5.0, 0.0, 2.5, 2.0),
            PlacedCore::new("LITTLE", 5.0, 2.0, 2.5, 2.0),
        ];
        LayoutResult::from_placements(placements, "LITTLE", 2, true, &DieSpec::square(10.0))
    }

    #[test]
    fn test_infeasible_result() {
        let result = LayoutResult::infeasible("LITTLE");
        assert!(!result.feasible);
        assert!(result.placements.is_empty());
        assert_eq!(result.count_of("LITTLE"), 0);
    }

    #[test]
    fn test_counts_and_utilization() {
        let result = sample();
        assert_eq!(result.count_of("big"), 1);
        assert_eq!(result.count_of("LITTLE"), 2);
        assert_eq!(result.placed_count(), 3);
        assert!((result.utilization - 0.3).abs() < 1e-12);
        assert_eq!(result.utilization_percent(), "30.0%");
    }

    #[test]
    fn test_records() {
        let result = sample();
        let records = result.records();
        let lines: Vec<_> = records.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0,0,5,4,big");
        assert_eq!(lines[2], "5,2,2.5,2,LITTLE");
    }

    #[test]
    fn test_layout_summary() {
        let result = sample().with_strategy("corner-search");
        let summary = LayoutSummary::from(&result);
        assert_eq!(summary.total_placed, 3);
        assert_eq!(summary.filler_placed, 2);
        assert!(summary.feasible);
        assert_eq!(summary.strategy, "corner-search");
    }
}

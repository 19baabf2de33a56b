//! Engine configuration, placement requests and the planner trait.

use crate::geometry::{CoreCatalog, CoreTypeId, DieSpec, GEOM_EPS};
use crate::result::LayoutResult;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Corner-anchored search over row partitions, then a greedy filler scan.
    #[default]
    CornerSearch,
    /// Greedy skyline strip packing, order sensitive.
    SkylineStrip,
}

impl Strategy {
    /// Short name used in results and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CornerSearch => "corner-search",
            Strategy::SkylineStrip => "skyline-strip",
        }
    }
}

/// How the strip packer picks the next requested core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectionMode {
    /// Best-fitness entry anywhere in the remaining list.
    #[default]
    FitnessGuided,
    /// Always the head of the remaining list.
    ListOrder,
}

/// Common configuration for the engines and the sweep.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Placement engine.
    pub strategy: Strategy,

    /// Core selection of the strip packer.
    pub selection: SelectionMode,

    /// Equality tolerance for skyline heights and widths.
    pub tolerance: f64,

    /// Number of sweep worker threads (0 = rayon default).
    pub threads: usize,

    /// Skip sweep rows whose primary area already exceeds the die area.
    pub area_prune: bool,

    /// Check every produced layout for overlaps and containment.
    pub validate_layouts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            selection: SelectionMode::default(),
            tolerance: 0.001,
            threads: 0,
            area_prune: true,
            validate_layouts: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the placement engine.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the strip packer's core selection.
    pub fn with_selection(mut self, selection: SelectionMode) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the skyline equality tolerance, at least [`GEOM_EPS`].
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs().max(GEOM_EPS);
        self
    }

    /// Sets the number of sweep worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enables or disables area pruning of sweep rows.
    pub fn with_area_prune(mut self, enabled: bool) -> Self {
        self.area_prune = enabled;
        self
    }

    /// Enables or disables layout validation.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_layouts = enabled;
        self
    }
}

/// Requested counts for the primary core types plus the filler type.
///
/// The order of `primaries` is the placement order: it picks the corner of
/// each type in the corner search and the instance order in the strip packer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementRequest {
    /// Primary core types and their requested counts, in placement order.
    pub primaries: Vec<(CoreTypeId, usize)>,
    /// Core type whose count is maximised.
    pub filler: CoreTypeId,
}

impl PlacementRequest {
    /// Creates an empty request filling with `filler`.
    pub fn new(filler: impl Into<CoreTypeId>) -> Self {
        Self {
            primaries: Vec::new(),
            filler: filler.into(),
        }
    }

    /// Appends a primary core type.
    pub fn with_count(mut self, core_type: impl Into<CoreTypeId>, count: usize) -> Self {
        self.primaries.push((core_type.into(), count));
        self
    }

    /// Primary type names in placement order.
    pub fn primary_types(&self) -> impl Iterator<Item = &CoreTypeId> {
        self.primaries.iter().map(|(name, _)| name)
    }

    /// Requested count of a primary type.
    pub fn count_of(&self, core_type: &str) -> usize {
        self.primaries
            .iter()
            .find(|(name, _)| name == core_type)
            .map_or(0, |&(_, count)| count)
    }

    /// Total number of requested primary cores.
    pub fn total_requested(&self) -> usize {
        self.primaries.iter().map(|(_, count)| count).sum()
    }

    /// Literal instance list `[t0; c0] ++ [t1; c1] ++ ...`.
    pub fn expand(&self) -> Vec<CoreTypeId> {
        self.primaries
            .iter()
            .flat_map(|(name, count)| std::iter::repeat(name.clone()).take(*count))
            .collect()
    }

    /// Checks names against the catalog and rejects duplicates.
    pub fn validate(&self, catalog: &CoreCatalog) -> Result<()> {
        if self.filler.is_empty() {
            return Err(Error::InvalidRequest("filler type must be named".into()));
        }
        catalog.require(&self.filler)?.validate()?;
        for (i, (name, _)) in self.primaries.iter().enumerate() {
            catalog.require(name)?.validate()?;
            if self.primaries[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::InvalidRequest(format!(
                    "core type {} listed more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Trait for floorplanning engines.
pub trait Planner {
    /// Places the requested primaries and as many filler cores as the
    /// engine finds room for.
    fn plan(
        &self,
        request: &PlacementRequest,
        die: &DieSpec,
        catalog: &CoreCatalog,
    ) -> Result<LayoutResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_strategy(Strategy::SkylineStrip)
            .with_selection(SelectionMode::ListOrder)
            .with_tolerance(-0.01)
            .with_threads(4)
            .with_area_prune(false);
        assert_eq!(config.strategy, Strategy::SkylineStrip);
        assert_eq!(config.selection, SelectionMode::ListOrder);
        assert_eq!(config.tolerance, 0.01);
        assert_eq!(Config::new().with_tolerance(0.0).tolerance, GEOM_EPS);
        assert_eq!(config.threads, 4);
        assert!(!config.area_prune);
        assert!(config.validate_layouts);
    }

    #[test]
    fn test_request_expand_keeps_order() {
        let request = PlacementRequest::new("LITTLE")
            .with_count("C3", 1)
            .with_count("big", 2)
            .with_count("C4", 0);
        assert_eq!(request.expand(), vec!["C3", "big", "big"]);
        assert_eq!(request.total_requested(), 3);
        assert_eq!(request.count_of("big"), 2);
        assert_eq!(request.count_of("A72"), 0);
    }

    #[test]
    fn test_request_validation() {
        let catalog = CoreCatalog::millimetres();
        assert!(PlacementRequest::new("LITTLE")
            .with_count("big", 2)
            .validate(&catalog)
            .is_ok());
        assert_eq!(
            PlacementRequest::new("LITTLE")
                .with_count("A53", 1)
                .validate(&catalog),
            Err(Error::UnknownCoreType("A53".into()))
        );
        assert!(matches!(
            PlacementRequest::new("LITTLE")
                .with_count("big", 1)
                .with_count("big", 1)
                .validate(&catalog),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            PlacementRequest::new("").validate(&catalog),
            Err(Error::InvalidRequest(_))
        ));
    }
}

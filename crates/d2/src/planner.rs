//! Engine dispatcher.

use crate::corner_search::CornerSearch;
use crate::spatial_index::validate_layout;
use crate::strip_packer::StripPacker;
use corefill_core::{
    shuffle_instances, Config, CoreCatalog, DieSpec, LayoutResult, OrderPolicy,
    PlacementRequest, Planner, Result, Strategy,
};
use std::time::Instant;

/// Floorplanner running the engine selected by [`Config::strategy`].
#[derive(Debug, Clone, Default)]
pub struct Floorplanner {
    config: Config,
    order: OrderPolicy,
    instance_seed: Option<u64>,
}

impl Floorplanner {
    /// Creates a planner with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            order: OrderPolicy::AsGiven,
            instance_seed: None,
        }
    }

    /// Creates a planner with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Reorders the primaries of every request before planning.
    pub fn with_order(mut self, order: OrderPolicy) -> Self {
        self.order = order;
        self
    }

    /// Shuffles the strip packer's instance list with a seeded RNG.
    pub fn with_instance_seed(mut self, seed: u64) -> Self {
        self.instance_seed = Some(seed);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn corner_search(
        &self,
        request: &PlacementRequest,
        die: &DieSpec,
        catalog: &CoreCatalog,
    ) -> Result<LayoutResult> {
        let layout = CornerSearch::new(die, catalog).search_request(request)?;
        Ok(match layout {
            Some(layout) => layout.into_result(die),
            None => LayoutResult::infeasible(request.filler.clone()),
        })
    }

    fn strip_pack(
        &self,
        request: &PlacementRequest,
        die: &DieSpec,
        catalog: &CoreCatalog,
    ) -> Result<LayoutResult> {
        let mut instances = request.expand();
        if let Some(seed) = self.instance_seed {
            shuffle_instances(&mut instances, seed);
        }
        let outcome = StripPacker::new(die, catalog)
            .with_tolerance(self.config.tolerance)
            .with_mode(self.config.selection)
            .pack(&instances, &request.filler)?;
        Ok(outcome.into_result(die))
    }
}

impl Planner for Floorplanner {
    fn plan(
        &self,
        request: &PlacementRequest,
        die: &DieSpec,
        catalog: &CoreCatalog,
    ) -> Result<LayoutResult> {
        die.validate()?;
        request.validate(catalog)?;

        let start = Instant::now();
        let request = self.order.arrange(request, catalog)?;
        let mut result = match self.config.strategy {
            Strategy::CornerSearch => self.corner_search(&request, die, catalog),
            Strategy::SkylineStrip => self.strip_pack(&request, die, catalog),
        }?;

        if self.config.validate_layouts {
            validate_layout(&result.placements, die)?;
        }
        if !result.feasible {
            log::warn!(
                "{}: no feasible layout for {:?} on a {}x{} die",
                self.config.strategy.name(),
                request.primaries,
                die.width,
                die.height
            );
        }

        result.computation_time_ms = start.elapsed().as_millis() as u64;
        Ok(result.with_strategy(self.config.strategy.name()))
    }
}

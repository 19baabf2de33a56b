//! Greedy skyline strip packing.
//!
//! Requested cores are placed one at a time on the lowest skyline segment,
//! then filler cores follow until the skyline rises above the die. The
//! placement that crossed the die top is rolled back.

use crate::skyline::Skyline;
use corefill_core::{
    count_by_type, CoreCatalog, CoreType, CoreTypeId, DieSpec, Error, LayoutResult, PlacedCore,
    PlacementRequest, Result, SelectionMode, GEOM_EPS,
};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of one strip packing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StripOutcome {
    /// Placed cores in placement order.
    pub placements: Vec<PlacedCore>,
    /// Placed cores per type.
    pub counts: BTreeMap<CoreTypeId, usize>,
    /// Filler type name.
    pub filler_type: CoreTypeId,
    /// Number of filler cores placed.
    pub filler_count: usize,
    /// The requested cores overflowed the die before all were placed.
    pub chip_full: bool,
    /// Segments dropped because nothing left to place fit them.
    pub segments_removed: usize,
}

impl StripOutcome {
    /// Returns true if every requested core was placed.
    pub fn feasible(&self) -> bool {
        !self.chip_full
    }

    /// Number of placed cores of the given type.
    pub fn count_of(&self, core_type: &str) -> usize {
        self.counts.get(core_type).copied().unwrap_or(0)
    }

    /// Converts the outcome into a [`LayoutResult`].
    pub fn into_result(self, die: &DieSpec) -> LayoutResult {
        let feasible = self.feasible();
        LayoutResult::from_placements(
            self.placements,
            self.filler_type,
            self.filler_count,
            feasible,
            die,
        )
    }
}

/// Skyline strip packer on one die.
pub struct StripPacker<'a> {
    die: &'a DieSpec,
    catalog: &'a CoreCatalog,
    tolerance: f64,
    mode: SelectionMode,
}

impl<'a> StripPacker<'a> {
    /// Creates a fitness-guided packer with tolerance 0.001.
    pub fn new(die: &'a DieSpec, catalog: &'a CoreCatalog) -> Self {
        Self {
            die,
            catalog,
            tolerance: 0.001,
            mode: SelectionMode::FitnessGuided,
        }
    }

    /// Sets the skyline equality tolerance, at least [`GEOM_EPS`].
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs().max(GEOM_EPS);
        self
    }

    /// Sets how the next requested core is picked.
    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Packs the request's primaries expanded in order.
    pub fn pack_request(&self, request: &PlacementRequest) -> Result<StripOutcome> {
        self.pack(&request.expand(), &request.filler)
    }

    /// Places `instances`, then fills with `filler` until the die overflows.
    ///
    /// In [`SelectionMode::ListOrder`] the head of the list is always placed
    /// next; in [`SelectionMode::FitnessGuided`] the remaining instance with
    /// the best fitness on the lowest segment is, earliest first on ties.
    pub fn pack(&self, instances: &[CoreTypeId], filler: &str) -> Result<StripOutcome> {
        self.die.validate()?;
        let filler_core = self.resolve(filler)?;
        let mut remaining = instances
            .iter()
            .map(|name| self.resolve(name))
            .collect::<Result<Vec<_>>>()?;

        let mut skyline = Skyline::new(self.die.width, self.tolerance);
        let mut placements: Vec<PlacedCore> = Vec::new();
        let mut last_is_filler = false;
        let mut filler_count = 0;
        let mut segments_removed = 0;
        let mut chip_full = false;

        while !remaining.is_empty() {
            let segment = skyline.lowest();
            let Some(index) = self.pick(&skyline, segment, &remaining) else {
                skyline.remove(segment)?;
                segments_removed += 1;
                continue;
            };
            let core = remaining.remove(index);
            placements.push(Self::place(&mut skyline, segment, core)?);
            if skyline.height() > self.die.height + GEOM_EPS {
                chip_full = true;
                break;
            }
        }

        if !chip_full {
            loop {
                let segment = skyline.lowest();
                if skyline
                    .fitness(segment, filler_core.width(), filler_core.height())
                    .is_none()
                {
                    skyline.remove(segment)?;
                    segments_removed += 1;
                    continue;
                }
                placements.push(Self::place(&mut skyline, segment, filler_core)?);
                last_is_filler = true;
                filler_count += 1;
                if skyline.height() > self.die.height + GEOM_EPS {
                    break;
                }
            }
        }

        // The last placement is the one that crossed the die top.
        if placements.pop().is_some() && last_is_filler {
            filler_count -= 1;
        }

        log::debug!(
            "strip packer: {} placed, {} filler, {} segments removed, chip_full {}",
            placements.len(),
            filler_count,
            segments_removed,
            chip_full
        );

        Ok(StripOutcome {
            counts: count_by_type(&placements),
            placements,
            filler_type: filler_core.name().clone(),
            filler_count,
            chip_full,
            segments_removed,
        })
    }

    fn resolve(&self, name: &str) -> Result<&'a CoreType> {
        let core = self.catalog.require(name)?;
        core.validate()?;
        if core.width() > self.die.width + GEOM_EPS {
            return Err(Error::InvalidCoreType(format!(
                "{} is {} wide, the die only {}",
                name,
                core.width(),
                self.die.width
            )));
        }
        Ok(core)
    }

    fn pick(&self, skyline: &Skyline, segment: usize, remaining: &[&CoreType]) -> Option<usize> {
        match self.mode {
            SelectionMode::ListOrder => {
                let head = remaining.first()?;
                skyline
                    .fitness(segment, head.width(), head.height())
                    .map(|_| 0)
            }
            SelectionMode::FitnessGuided => {
                let mut best: Option<(usize, u8)> = None;
                for (i, core) in remaining.iter().enumerate() {
                    if let Some(score) = skyline.fitness(segment, core.width(), core.height()) {
                        if best.map_or(true, |(_, top)| score > top) {
                            best = Some((i, score));
                        }
                    }
                }
                best.map(|(i, _)| i)
            }
        }
    }

    fn place(skyline: &mut Skyline, segment: usize, core: &CoreType) -> Result<PlacedCore> {
        let at = skyline.place(segment, core.width(), core.height())?;
        Ok(PlacedCore::new(
            core.name().clone(),
            at.x,
            at.y,
            core.width(),
            core.height(),
        ))
    }
}

//! Systematic sweep over primary core counts.
//!
//! Every count tuple from all zeros up to each type's die capacity is
//! evaluated independently, so rows are computed in parallel with rayon.

use crate::corner_search::CornerSearch;
use crate::spatial_index::validate_layout;
use crate::strip_packer::StripPacker;
use corefill_core::{
    Config, CoreCatalog, CoreTypeId, DieSpec, Error, PlacementRequest, Result, SelectionMode,
    Strategy, GEOM_EPS,
};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of one count tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepRow {
    /// Requested count per primary type.
    pub counts: Vec<usize>,
    /// Filler cores placed, `None` when the tuple is infeasible.
    pub filler_count: Option<usize>,
}

impl SweepRow {
    /// Returns true if the tuple could be placed.
    pub fn is_feasible(&self) -> bool {
        self.filler_count.is_some()
    }

    /// Comma-separated counts followed by the filler count, `-1` if
    /// infeasible.
    pub fn to_record(&self) -> String {
        let mut fields: Vec<String> = self.counts.iter().map(usize::to_string).collect();
        fields.push(match self.filler_count {
            Some(n) => n.to_string(),
            None => "-1".to_string(),
        });
        fields.join(",")
    }
}

/// Sweep of one die and catalog.
pub struct Sweep<'a> {
    die: &'a DieSpec,
    catalog: &'a CoreCatalog,
    config: Config,
}

impl<'a> Sweep<'a> {
    /// Creates a sweep using the engine named by `config.strategy`.
    pub fn new(die: &'a DieSpec, catalog: &'a CoreCatalog, config: Config) -> Self {
        Self {
            die,
            catalog,
            config,
        }
    }

    /// All count tuples for `primaries`, first type outermost.
    pub fn grid(&self, primaries: &[CoreTypeId]) -> Result<Vec<Vec<usize>>> {
        let mut grid: Vec<Vec<usize>> = vec![Vec::new()];
        for name in primaries {
            let capacity = self.catalog.require(name)?.capacity(self.die);
            grid = grid
                .into_iter()
                .flat_map(|prefix| {
                    (0..=capacity).map(move |n| {
                        let mut counts = prefix.clone();
                        counts.push(n);
                        counts
                    })
                })
                .collect();
        }
        Ok(grid)
    }

    /// Evaluates every count tuple of `primaries` with `filler`.
    ///
    /// The strip packer runs in list order with instances grouped by type in
    /// the order of `primaries`.
    pub fn run(&self, primaries: &[CoreTypeId], filler: &str) -> Result<Vec<SweepRow>> {
        self.die.validate()?;
        let supported = match self.config.strategy {
            Strategy::CornerSearch => primaries.len() == 1 || primaries.len() == 3,
            Strategy::SkylineStrip => (1..=3).contains(&primaries.len()),
        };
        if !supported {
            return Err(Error::UnsupportedPrimaryCount(primaries.len()));
        }
        if primaries.iter().any(|name| name == filler) {
            return Err(Error::InvalidRequest(format!(
                "filler type {} is also a primary type",
                filler
            )));
        }
        let request = primaries
            .iter()
            .fold(PlacementRequest::new(filler), |r, name| {
                r.with_count(name.clone(), 0)
            });
        request.validate(self.catalog)?;

        let grid = self.grid(primaries)?;
        log::info!(
            "sweep: {} rows over {:?} filled with {} ({})",
            grid.len(),
            primaries,
            filler,
            self.config.strategy.name()
        );

        let evaluate = || {
            grid.par_iter()
                .map(|counts| {
                    Ok(SweepRow {
                        counts: counts.clone(),
                        filler_count: self.evaluate(primaries, counts, filler)?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        };
        let rows = if self.config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| Error::Internal(format!("failed to build thread pool: {}", e)))?;
            pool.install(evaluate)?
        } else {
            evaluate()?
        };

        log::info!(
            "sweep: {} of {} rows feasible",
            rows.iter().filter(|r| r.is_feasible()).count(),
            rows.len()
        );
        Ok(rows)
    }

    fn evaluate(
        &self,
        primaries: &[CoreTypeId],
        counts: &[usize],
        filler: &str,
    ) -> Result<Option<usize>> {
        let pairs: Vec<(CoreTypeId, usize)> = primaries
            .iter()
            .cloned()
            .zip(counts.iter().copied())
            .collect();

        if self.config.area_prune {
            let used = primary_area(self.catalog, &pairs)?;
            if used > self.die.area() + GEOM_EPS {
                return Ok(None);
            }
        }

        match self.config.strategy {
            Strategy::CornerSearch => {
                let layout = CornerSearch::new(self.die, self.catalog).search(&pairs, filler)?;
                if let Some(layout) = layout.as_ref().filter(|_| self.config.validate_layouts) {
                    validate_layout(&layout.placements, self.die)?;
                }
                Ok(layout.map(|l| l.filler_count()))
            }
            Strategy::SkylineStrip => {
                let instances = pairs
                    .iter()
                    .fold(PlacementRequest::new(filler), |r, (name, count)| {
                        r.with_count(name.clone(), *count)
                    })
                    .expand();
                let outcome = StripPacker::new(self.die, self.catalog)
                    .with_tolerance(self.config.tolerance)
                    .with_mode(SelectionMode::ListOrder)
                    .pack(&instances, filler)?;
                if self.config.validate_layouts {
                    validate_layout(&outcome.placements, self.die)?;
                }
                Ok(outcome.feasible().then_some(outcome.filler_count))
            }
        }
    }
}

fn primary_area(catalog: &CoreCatalog, pairs: &[(CoreTypeId, usize)]) -> Result<f64> {
    pairs.iter().try_fold(0.0, |acc, (name, count)| {
        Ok(acc + catalog.require(name)?.area() * *count as f64)
    })
}

/// Upper bound on the filler count from area alone:
/// `floor((die area - primary area) / filler area)`.
pub fn filler_area_bound(
    die: &DieSpec,
    catalog: &CoreCatalog,
    primaries: &[(CoreTypeId, usize)],
    filler: &str,
) -> Result<usize> {
    let filler_area = catalog.require(filler)?.area();
    let free = die.area() - primary_area(catalog, primaries)?;
    if free <= 0.0 || filler_area <= 0.0 {
        return Ok(0);
    }
    Ok((free / filler_area + GEOM_EPS).floor() as usize)
}

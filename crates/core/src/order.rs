//! Placement-order policies.
//!
//! Both engines are order sensitive: the corner search assigns corners by
//! position in the request, the strip packer places instances in list order.
//! These policies rearrange a request before it reaches an engine.

use crate::geometry::{CoreCatalog, CoreTypeId};
use crate::solver::PlacementRequest;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rule for ordering the primary core types of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderPolicy {
    /// Keep the caller's order.
    #[default]
    AsGiven,
    /// Largest core footprint first.
    LargestCoreFirst,
    /// Largest requested area (count x footprint) first.
    LargestTotalAreaFirst,
    /// Seeded random order.
    Shuffled {
        /// RNG seed.
        seed: u64,
    },
}

impl OrderPolicy {
    /// Returns a copy of the request with its primaries reordered.
    ///
    /// Sorting is stable, so ties keep their relative order.
    pub fn arrange(
        &self,
        request: &PlacementRequest,
        catalog: &CoreCatalog,
    ) -> Result<PlacementRequest> {
        let mut primaries = request.primaries.clone();
        match *self {
            OrderPolicy::AsGiven => {}
            OrderPolicy::LargestCoreFirst => {
                let mut keyed = with_keys(primaries, catalog, |area, _| area)?;
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
                primaries = keyed.into_iter().map(|(_, p)| p).collect();
            }
            OrderPolicy::LargestTotalAreaFirst => {
                let mut keyed = with_keys(primaries, catalog, |area, count| area * count as f64)?;
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
                primaries = keyed.into_iter().map(|(_, p)| p).collect();
            }
            OrderPolicy::Shuffled { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                primaries.shuffle(&mut rng);
            }
        }
        log::debug!("{:?} placement order: {:?}", self, primaries);
        Ok(PlacementRequest {
            primaries,
            filler: request.filler.clone(),
        })
    }
}

fn with_keys(
    primaries: Vec<(CoreTypeId, usize)>,
    catalog: &CoreCatalog,
    key: impl Fn(f64, usize) -> f64,
) -> Result<Vec<(f64, (CoreTypeId, usize))>> {
    primaries
        .into_iter()
        .map(|(name, count)| {
            let area = catalog.require(&name)?.area();
            Ok((key(area, count), (name, count)))
        })
        .collect()
}

/// Shuffles an expanded instance list with a seeded RNG.
pub fn shuffle_instances(instances: &mut [CoreTypeId], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    instances.shuffle(&mut rng);
}

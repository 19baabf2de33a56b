//! Corner-anchored search over row configurations.
//!
//! Each primary core type is packed as a staircase block into its own die
//! corner. Every combination of row configurations is tried; combinations
//! whose blocks overlap are pruned, and the rest are scored by how many
//! filler cores a row-by-row scan fits into the bottom-left corner.

use crate::region::{AnchoredRegion, Corner};
use corefill_core::{
    partitions, CoreCatalog, CoreType, CoreTypeId, DieSpec, Error, LayoutResult, PlacedCore,
    PlacementRequest, Result, RowConfiguration,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row configuration chosen for one core type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerAssignment {
    /// Core type name.
    pub core_type: CoreTypeId,
    /// Corner the block is anchored at.
    pub corner: Corner,
    /// Cores per row, nearest the corner first.
    pub rows: RowConfiguration,
}

impl CornerAssignment {
    /// Number of cores in the block.
    pub fn count(&self) -> usize {
        self.rows.iter().sum()
    }
}

/// Counters collected while searching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStats {
    /// Candidate row configurations per primary slot.
    pub candidates: Vec<usize>,
    /// Branches cut because two blocks overlapped.
    pub pruned: usize,
    /// Combinations that reached the filler scan.
    pub filled: usize,
}

/// Best corner arrangement found for a request.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerLayout {
    /// Primary assignments in placement order.
    pub primaries: Vec<CornerAssignment>,
    /// Filler rows, anchored bottom-left.
    pub filler: CornerAssignment,
    /// Every placed core: primaries in placement order, then the filler.
    pub placements: Vec<PlacedCore>,
    /// Search counters.
    pub stats: SearchStats,
}

impl CornerLayout {
    /// Number of filler cores placed.
    pub fn filler_count(&self) -> usize {
        self.filler.count()
    }

    /// Assignment of a core type, primary or filler.
    pub fn assignment(&self, core_type: &str) -> Option<&CornerAssignment> {
        self.primaries
            .iter()
            .chain(std::iter::once(&self.filler))
            .find(|a| a.core_type == core_type)
    }

    /// Converts the layout into a feasible [`LayoutResult`].
    pub fn into_result(self, die: &DieSpec) -> LayoutResult {
        let filler_count = self.filler.count();
        LayoutResult::from_placements(
            self.placements,
            self.filler.core_type,
            filler_count,
            true,
            die,
        )
    }
}

struct Candidate {
    rows: RowConfiguration,
    region: AnchoredRegion,
}

#[derive(Default)]
struct Best {
    chosen: Vec<usize>,
    filler_rows: RowConfiguration,
    filler_count: usize,
}

/// Corner search on one die.
pub struct CornerSearch<'a> {
    die: &'a DieSpec,
    catalog: &'a CoreCatalog,
}

impl<'a> CornerSearch<'a> {
    /// Creates a search over `die` using footprints from `catalog`.
    pub fn new(die: &'a DieSpec, catalog: &'a CoreCatalog) -> Self {
        Self { die, catalog }
    }

    /// Searches the request's primaries in their given order.
    pub fn search_request(&self, request: &PlacementRequest) -> Result<Option<CornerLayout>> {
        self.search(&request.primaries, &request.filler)
    }

    /// Finds the row configurations of `primaries` that leave room for the
    /// most `filler` cores.
    ///
    /// `primaries` lists one or three `(type, count)` pairs in placement
    /// order. Returns `Ok(None)` when no combination of blocks fits.
    pub fn search(
        &self,
        primaries: &[(CoreTypeId, usize)],
        filler: &str,
    ) -> Result<Option<CornerLayout>> {
        self.die.validate()?;
        if primaries.len() != 1 && primaries.len() != 3 {
            return Err(Error::UnsupportedPrimaryCount(primaries.len()));
        }
        let filler_core = self.catalog.require(filler)?;
        filler_core.validate()?;

        let mut cores = Vec::with_capacity(primaries.len());
        for (i, (name, _)) in primaries.iter().enumerate() {
            if name == filler {
                return Err(Error::InvalidRequest(format!(
                    "filler type {} is also a primary type",
                    name
                )));
            }
            if primaries[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::InvalidRequest(format!(
                    "core type {} listed more than once",
                    name
                )));
            }
            let core = self.catalog.require(name)?;
            core.validate()?;
            cores.push(core);
        }

        let mut corners = Vec::with_capacity(primaries.len());
        let mut candidates = Vec::with_capacity(primaries.len());
        for (slot, ((_, count), core)) in primaries.iter().zip(&cores).enumerate() {
            let corner = Corner::for_slot(slot, primaries.len())
                .ok_or(Error::UnsupportedPrimaryCount(primaries.len()))?;
            corners.push(corner);
            candidates.push(self.candidates(core, *count, corner));
        }

        let mut stats = SearchStats {
            candidates: candidates.iter().map(Vec::len).collect(),
            ..SearchStats::default()
        };
        let mut best = None;
        let mut chosen = Vec::with_capacity(candidates.len());
        self.explore(&candidates, filler_core, &mut chosen, &mut stats, &mut best);

        log::debug!(
            "corner search: candidates {:?}, pruned {}, filled {}, best filler {:?}",
            stats.candidates,
            stats.pruned,
            stats.filled,
            best.as_ref().map(|b| b.filler_count)
        );

        let Some(best) = best else {
            return Ok(None);
        };

        let mut assignments = Vec::with_capacity(primaries.len());
        let mut placements = Vec::new();
        for (slot, &index) in best.chosen.iter().enumerate() {
            let assignment = CornerAssignment {
                core_type: cores[slot].name().clone(),
                corner: corners[slot],
                rows: candidates[slot][index].rows.clone(),
            };
            self.place_block(&assignment, cores[slot], &mut placements);
            assignments.push(assignment);
        }
        let filler_assignment = CornerAssignment {
            core_type: filler_core.name().clone(),
            corner: Corner::Rot0,
            rows: best.filler_rows,
        };
        self.place_block(&filler_assignment, filler_core, &mut placements);

        Ok(Some(CornerLayout {
            primaries: assignments,
            filler: filler_assignment,
            placements,
            stats,
        }))
    }

    /// Fits filler rows into the bottom-left corner around `regions`.
    ///
    /// For each row the widest run of cores starting at the left die edge
    /// that overlaps no region is taken; a blocked row gets zero.
    pub fn fill(&self, regions: &[&AnchoredRegion], filler: &CoreType) -> RowConfiguration {
        let (w, h) = (filler.width(), filler.height());
        let (rows, cols) = filler.grid_in(self.die.width, self.die.height);
        (0..rows)
            .map(|row| {
                (1..=cols)
                    .rev()
                    .find(|&n| {
                        let rect = Corner::Rot0.map_rect(
                            self.die,
                            0.0,
                            row as f64 * h,
                            n as f64 * w,
                            h,
                        );
                        !regions.iter().any(|region| region.intersects_rect(&rect))
                    })
                    .unwrap_or(0)
            })
            .collect()
    }

    fn candidates(&self, core: &CoreType, count: usize, corner: Corner) -> Vec<Candidate> {
        if count == 0 {
            return vec![Candidate {
                rows: Vec::new(),
                region: AnchoredRegion::empty(corner, self.die),
            }];
        }
        let (frame_w, frame_h) = corner.frame(self.die);
        let (rows, cols) = core.grid_in(frame_w, frame_h);
        partitions(count, cols, rows)
            .map(|config| {
                let region = AnchoredRegion::new(&config, core, corner, self.die);
                Candidate {
                    rows: config,
                    region,
                }
            })
            .collect()
    }

    fn explore(
        &self,
        candidates: &[Vec<Candidate>],
        filler: &CoreType,
        chosen: &mut Vec<usize>,
        stats: &mut SearchStats,
        best: &mut Option<Best>,
    ) {
        let slot = chosen.len();
        if slot == candidates.len() {
            let regions: Vec<&AnchoredRegion> = chosen
                .iter()
                .enumerate()
                .map(|(s, &i)| &candidates[s][i].region)
                .collect();
            let filler_rows = self.fill(&regions, filler);
            let filler_count: usize = filler_rows.iter().sum();
            stats.filled += 1;
            // Strict comparison keeps the first maximum in generation order.
            if best.as_ref().map_or(true, |b| filler_count > b.filler_count) {
                *best = Some(Best {
                    chosen: chosen.clone(),
                    filler_rows,
                    filler_count,
                });
            }
            return;
        }

        for (index, candidate) in candidates[slot].iter().enumerate() {
            let clash = chosen
                .iter()
                .enumerate()
                .any(|(s, &i)| candidates[s][i].region.intersects(&candidate.region));
            if clash {
                stats.pruned += 1;
                continue;
            }
            chosen.push(index);
            self.explore(candidates, filler, chosen, stats, best);
            chosen.pop();
        }
    }

    fn place_block(
        &self,
        assignment: &CornerAssignment,
        core: &CoreType,
        placements: &mut Vec<PlacedCore>,
    ) {
        let (w, h) = (core.width(), core.height());
        for (row, &n) in assignment.rows.iter().enumerate() {
            for col in 0..n {
                let rect = assignment.corner.map_rect(
                    self.die,
                    col as f64 * w,
                    row as f64 * h,
                    w,
                    h,
                );
                placements.push(PlacedCore::new(
                    assignment.core_type.clone(),
                    rect.min().x,
                    rect.min().y,
                    rect.width(),
                    rect.height(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CoreCatalog {
        CoreCatalog::millimetres()
    }

    fn request(pairs: &[(&str, usize)]) -> Vec<(CoreTypeId, usize)> {
        pairs.iter().map(|&(n, c)| (n.to_string(), c)).collect()
    }

    fn assert_disjoint(placements: &[PlacedCore]) {
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_two_big_filled_with_little() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let layout = CornerSearch::new(&die, &catalog)
            .search(&request(&[("big", 2)]), "LITTLE")
            .unwrap()
            .unwrap();

        let big = layout.assignment("big").unwrap();
        assert_eq!(big.corner, Corner::Rot180);
        assert_eq!(big.count(), 2);
        assert!(layout.filler_count() >= 1);
        assert_eq!(layout.placements.len(), 2 + layout.filler_count());
        assert_eq!(layout.stats.candidates, vec![1]);
        assert_eq!(layout.stats.filled, 1);
        assert_disjoint(&layout.placements);
        for p in &layout.placements {
            assert!(die.contains_rect(p.x, p.y, p.width, p.height));
        }
    }

    #[test]
    fn test_zero_count_leaves_die_to_filler() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let layout = CornerSearch::new(&die, &catalog)
            .search(&request(&[("big", 0)]), "LITTLE")
            .unwrap()
            .unwrap();
        // 4 columns of 2.1 and 5 rows of 1.81 fit into 9.55.
        assert_eq!(layout.filler.rows, vec![4, 4, 4, 4, 4]);
        assert_eq!(layout.filler_count(), 20);
        assert_eq!(layout.primaries[0].count(), 0);
    }

    #[test]
    fn test_over_capacity_is_infeasible() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let result = CornerSearch::new(&die, &catalog)
            .search(&request(&[("big", 3)]), "LITTLE")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unsupported_primary_count() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let search = CornerSearch::new(&die, &catalog);
        let err = search
            .search(&request(&[("big", 1), ("C3", 1)]), "LITTLE")
            .unwrap_err();
        assert_eq!(err, Error::UnsupportedPrimaryCount(2));
        assert!(search.search(&[], "LITTLE").is_err());
    }

    #[test]
    fn test_rejects_bad_names() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let search = CornerSearch::new(&die, &catalog);
        assert!(matches!(
            search.search(&request(&[("A53", 1)]), "LITTLE"),
            Err(Error::UnknownCoreType(_))
        ));
        assert!(matches!(
            search.search(&request(&[("LITTLE", 1)]), "LITTLE"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            search.search(&request(&[("big", 1), ("C3", 0), ("LITTLE", 1)]), "LITTLE"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            search.search(&request(&[("big", 1), ("big", 1), ("C3", 1)]), "LITTLE"),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_fill_scans_around_regions() {
        let die = DieSpec::square(10.0);
        let catalog = CoreCatalog::new()
            .with_core("block", 5.0, 5.0)
            .with_core("cell", 2.0, 2.0);
        let search = CornerSearch::new(&die, &catalog);
        let block = catalog.require("block").unwrap();
        let cell = catalog.require("cell").unwrap();

        // Block occupies the top-right quadrant.
        let region = AnchoredRegion::new(&[1], block, Corner::Rot180, &die);
        let rows = search.fill(&[&region], cell);
        assert_eq!(rows, vec![5, 5, 2, 2, 2]);
    }

    #[test]
    fn test_three_primaries_take_separate_corners() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let layout = CornerSearch::new(&die, &catalog)
            .search(&request(&[("big", 1), ("C3", 1), ("LITTLE", 1)]), "C4")
            .unwrap();
        // The only C4 row collides with the big block in the bottom-right
        // corner; the arrangement is still feasible.
        let layout = layout.unwrap();
        assert_eq!(layout.primaries.len(), 3);
        assert_eq!(layout.primaries[0].corner, Corner::Rot270);
        assert_eq!(layout.primaries[1].corner, Corner::Rot180);
        assert_eq!(layout.primaries[2].corner, Corner::Rot90);
        assert_eq!(layout.filler_count(), 0);
        assert_disjoint(&layout.placements);
    }

    #[test]
    fn test_rotated_corners_swap_footprint() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let layout = CornerSearch::new(&die, &catalog)
            .search(&request(&[("big", 1), ("C3", 0), ("C4", 0)]), "LITTLE")
            .unwrap()
            .unwrap();
        let big = layout
            .placements
            .iter()
            .find(|p| p.core_type == "big")
            .unwrap();
        // Rot270 lays rows along the die's right edge.
        assert!((big.width - 3.8).abs() < 1e-9);
        assert!((big.height - 5.0).abs() < 1e-9);
        assert!((big.max_x() - 9.55).abs() < 1e-9);
        assert!(big.y.abs() < 1e-9);
    }

    #[test]
    fn test_search_is_deterministic() {
        let die = DieSpec::square(9.55);
        let catalog = catalog();
        let search = CornerSearch::new(&die, &catalog);
        let req = request(&[("big", 1), ("C3", 2), ("LITTLE", 3)]);
        let a = search.search(&req, "C4").unwrap().map(|l| l.placements);
        let b = search.search(&req, "C4").unwrap().map(|l| l.placements);
        assert_eq!(a, b);
    }
}

//! R*-tree index over placed cores for layout validation.
//!
//! The tree is the broad phase: envelopes that merely touch are returned by
//! the query and discarded by the exact positive-area test.

use corefill_core::{CoreTypeId, DieSpec, Error, PlacedCore, Result};
use rstar::{RTree, RTreeObject, AABB};

/// An entry in the layout index representing a placed core.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    /// Index of the core in the placement list
    pub index: usize,
    /// Core type name
    pub core_type: CoreTypeId,
    /// Axis-aligned bounding box (min_x, min_y, max_x, max_y)
    pub aabb: [f64; 4],
}

impl LayoutEntry {
    /// Creates a new entry.
    pub fn new(index: usize, core_type: CoreTypeId, aabb: [f64; 4]) -> Self {
        Self {
            index,
            core_type,
            aabb,
        }
    }

    /// Creates an entry from a placed core.
    pub fn from_placed(index: usize, core: &PlacedCore) -> Self {
        Self::new(
            index,
            core.core_type.clone(),
            [core.x, core.y, core.max_x(), core.max_y()],
        )
    }
}

impl RTreeObject for LayoutEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.aabb[0], self.aabb[1]], [self.aabb[2], self.aabb[3]])
    }
}

/// R*-tree over the cores of one layout.
#[derive(Debug)]
pub struct LayoutIndex {
    tree: RTree<LayoutEntry>,
}

impl LayoutIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-loads an index over `placements`.
    pub fn from_placements(placements: &[PlacedCore]) -> Self {
        let entries = placements
            .iter()
            .enumerate()
            .map(|(i, core)| LayoutEntry::from_placed(i, core))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts a placed core.
    pub fn insert(&mut self, index: usize, core: &PlacedCore) {
        self.tree.insert(LayoutEntry::from_placed(index, core));
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds all entries whose bounding boxes intersect or touch the box.
    pub fn query_aabb(&self, min: [f64; 2], max: [f64; 2]) -> Vec<&LayoutEntry> {
        let envelope = AABB::from_corners(min, max);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Returns an iterator over all entries in the index.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.tree.iter()
    }
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Pairs `(i, j)` with `i < j` of cores that overlap with positive area,
/// sorted.
pub fn find_overlaps(placements: &[PlacedCore]) -> Vec<(usize, usize)> {
    let index = LayoutIndex::from_placements(placements);
    let mut pairs = Vec::new();
    for (i, core) in placements.iter().enumerate() {
        for entry in index.query_aabb([core.x, core.y], [core.max_x(), core.max_y()]) {
            if entry.index > i && core.overlaps(&placements[entry.index]) {
                pairs.push((i, entry.index));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// Indices of cores that leave `[0, width] x [0, height]`.
pub fn out_of_bounds(placements: &[PlacedCore], die: &DieSpec) -> Vec<usize> {
    placements
        .iter()
        .enumerate()
        .filter(|(_, p)| !die.contains_rect(p.x, p.y, p.width, p.height))
        .map(|(i, _)| i)
        .collect()
}

/// Checks that no two cores overlap and every core lies on the die.
pub fn validate_layout(placements: &[PlacedCore], die: &DieSpec) -> Result<()> {
    if let Some(&i) = out_of_bounds(placements, die).first() {
        return Err(Error::InvariantViolation(format!(
            "core {} ({}) leaves the {}x{} die",
            i, placements[i], die.width, die.height
        )));
    }
    if let Some(&(i, j)) = find_overlaps(placements).first() {
        return Err(Error::InvariantViolation(format!(
            "cores {} ({}) and {} ({}) overlap",
            i, placements[i], j, placements[j]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(x: f64, y: f64, w: f64, h: f64) -> PlacedCore {
        PlacedCore::new("c", x, y, w, h)
    }

    #[test]
    fn test_layout_index_new() {
        let index = LayoutIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_layout_index_query_aabb() {
        let mut index = LayoutIndex::new();
        index.insert(0, &core(0.0, 0.0, 10.0, 10.0));
        index.insert(1, &core(20.0, 0.0, 10.0, 10.0));
        index.insert(2, &core(0.0, 20.0, 10.0, 10.0));
        assert_eq!(index.len(), 3);

        let results = index.query_aabb([5.0, 5.0], [15.0, 15.0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);

        let results = index.query_aabb([5.0, 0.0], [25.0, 10.0]);
        assert_eq!(results.len(), 2);

        assert!(index.query_aabb([50.0, 50.0], [60.0, 60.0]).is_empty());
        assert_eq!(index.query_aabb([-10.0, -10.0], [40.0, 40.0]).len(), 3);
    }

    #[test]
    fn test_touching_cores_are_not_overlaps() {
        let placements = vec![
            core(0.0, 0.0, 5.0, 5.0),
            core(5.0, 0.0, 5.0, 5.0),
            core(0.0, 5.0, 10.0, 5.0),
        ];
        assert!(find_overlaps(&placements).is_empty());
        assert!(validate_layout(&placements, &DieSpec::square(10.0)).is_ok());
    }

    #[test]
    fn test_find_overlaps() {
        let placements = vec![
            core(0.0, 0.0, 5.0, 5.0),
            core(20.0, 20.0, 1.0, 1.0),
            core(4.0, 4.0, 2.0, 2.0),
            core(4.5, 0.0, 1.0, 1.0),
        ];
        assert_eq!(find_overlaps(&placements), vec![(0, 2), (0, 3)]);
    }

    #[test]
    fn test_out_of_bounds() {
        let die = DieSpec::square(10.0);
        let placements = vec![core(0.0, 0.0, 5.0, 5.0), core(8.0, 8.0, 3.0, 1.0)];
        assert_eq!(out_of_bounds(&placements, &die), vec![1]);
        let err = validate_layout(&placements, &die).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_validate_reports_overlap() {
        let die = DieSpec::square(10.0);
        let placements = vec![core(0.0, 0.0, 5.0, 5.0), core(2.0, 2.0, 5.0, 5.0)];
        assert!(matches!(
            validate_layout(&placements, &die),
            Err(Error::InvariantViolation(_))
        ));
    }
}

//! Corner-anchored regions occupied by a block of cores.
//!
//! A row configuration placed flush against the origin forms a staircase
//! polygon. [`Corner`] moves that polygon into one of the die's four corners
//! by a clockwise rotation about the die centre.

use corefill_core::{CoreType, DieSpec, GEOM_EPS};
use geo::{coord, Area, LineString, MapCoords, Polygon, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clockwise rotation about the die centre that anchors a block in a corner.
///
/// | Variant  | Anchoring corner |
/// |----------|------------------|
/// | `Rot0`   | bottom-left      |
/// | `Rot90`  | top-left         |
/// | `Rot180` | top-right        |
/// | `Rot270` | bottom-right     |
///
/// On a non-square die the block is laid out in its own frame (`W x H` for
/// `Rot0`/`Rot180`, `H x W` for `Rot90`/`Rot270`) so that the mapped block
/// always stays on the die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Corner {
    /// No rotation.
    Rot0,
    /// 90 degrees clockwise.
    Rot90,
    /// 180 degrees.
    Rot180,
    /// 270 degrees clockwise.
    Rot270,
}

impl Corner {
    /// All corners in rotation order.
    pub const ALL: [Corner; 4] = [Corner::Rot0, Corner::Rot90, Corner::Rot180, Corner::Rot270];

    /// Corner of the primary type at `slot` when `primaries` types are placed.
    ///
    /// With three primaries the slots take `Rot270`, `Rot180`, `Rot90`; a
    /// single primary takes `Rot180`. The filler always stays at `Rot0`.
    pub fn for_slot(slot: usize, primaries: usize) -> Option<Corner> {
        match (primaries, slot) {
            (1, 0) => Some(Corner::Rot180),
            (3, 0) => Some(Corner::Rot270),
            (3, 1) => Some(Corner::Rot180),
            (3, 2) => Some(Corner::Rot90),
            _ => None,
        }
    }

    /// Clockwise rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Corner::Rot0 => 0,
            Corner::Rot90 => 90,
            Corner::Rot180 => 180,
            Corner::Rot270 => 270,
        }
    }

    /// Die corner the local origin is mapped to.
    pub fn label(self) -> &'static str {
        match self {
            Corner::Rot0 => "bottom-left",
            Corner::Rot90 => "top-left",
            Corner::Rot180 => "top-right",
            Corner::Rot270 => "bottom-right",
        }
    }

    /// Returns true if local x runs along the die's y axis.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Corner::Rot90 | Corner::Rot270)
    }

    /// Size `(width, height)` of the local frame a block is laid out in.
    pub fn frame(self, die: &DieSpec) -> (f64, f64) {
        if self.swaps_axes() {
            (die.height, die.width)
        } else {
            (die.width, die.height)
        }
    }

    /// Maps a point of the local frame to die coordinates.
    pub fn map_point(self, die: &DieSpec, x: f64, y: f64) -> (f64, f64) {
        match self {
            Corner::Rot0 => (x, y),
            Corner::Rot90 => (y, die.height - x),
            Corner::Rot180 => (die.width - x, die.height - y),
            Corner::Rot270 => (die.width - y, x),
        }
    }

    /// Maps an axis-aligned local rectangle to die coordinates.
    pub fn map_rect(self, die: &DieSpec, x: f64, y: f64, w: f64, h: f64) -> Rect<f64> {
        let (ax, ay) = self.map_point(die, x, y);
        let (bx, by) = self.map_point(die, x + w, y + h);
        Rect::new(coord! { x: ax, y: ay }, coord! { x: bx, y: by })
    }
}

/// Vertices of the staircase occupied by `rows` when anchored at the origin,
/// in clockwise order starting at the origin.
///
/// `rows` must be non-increasing; trailing empty rows are ignored.
pub fn staircase_outline(rows: &[usize], core_width: f64, core_height: f64) -> Vec<(f64, f64)> {
    let used = rows.iter().rposition(|&n| n > 0).map_or(0, |last| last + 1);
    if used == 0 {
        return Vec::new();
    }
    let rows = &rows[..used];

    let top = core_height * used as f64;
    let mut coords = vec![(0.0, 0.0), (0.0, top), (core_width * rows[used - 1] as f64, top)];
    for row in (0..used - 1).rev() {
        if rows[row] == rows[row + 1] {
            continue;
        }
        let step_y = (row + 1) as f64 * core_height;
        let (last_x, _) = coords[coords.len() - 1];
        coords.push((last_x, step_y));
        coords.push((rows[row] as f64 * core_width, step_y));
    }
    let (last_x, _) = coords[coords.len() - 1];
    coords.push((last_x, 0.0));
    coords
}

/// The area a row configuration occupies once anchored in a die corner.
#[derive(Debug, Clone)]
pub struct AnchoredRegion {
    corner: Corner,
    rows: Vec<usize>,
    core_size: (f64, f64),
    die: DieSpec,
    /// One rectangle per non-empty row, in die coordinates.
    bands: Vec<Rect<f64>>,
    bounds: Option<Rect<f64>>,
}

impl AnchoredRegion {
    /// Builds the region of `rows` cores of type `core` anchored at `corner`.
    pub fn new(rows: &[usize], core: &CoreType, corner: Corner, die: &DieSpec) -> Self {
        let (w, h) = (core.width(), core.height());
        debug_assert!(rows.windows(2).all(|p| p[0] >= p[1]));

        let bands: Vec<Rect<f64>> = rows
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(i, &n)| corner.map_rect(die, 0.0, i as f64 * h, n as f64 * w, h))
            .collect();

        let bounds = bands.iter().copied().reduce(|acc, band| {
            Rect::new(
                coord! { x: acc.min().x.min(band.min().x), y: acc.min().y.min(band.min().y) },
                coord! { x: acc.max().x.max(band.max().x), y: acc.max().y.max(band.max().y) },
            )
        });

        Self {
            corner,
            rows: rows.to_vec(),
            core_size: (w, h),
            die: *die,
            bands,
            bounds,
        }
    }

    /// An empty region: a zero count for its type.
    pub fn empty(corner: Corner, die: &DieSpec) -> Self {
        Self {
            corner,
            rows: Vec::new(),
            core_size: (0.0, 0.0),
            die: *die,
            bands: Vec::new(),
            bounds: None,
        }
    }

    /// Corner the region is anchored at.
    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Rectilinear outline in die coordinates, built on each call.
    pub fn outline(&self) -> Polygon<f64> {
        let (w, h) = self.core_size;
        let local = staircase_outline(&self.rows, w, h);
        Polygon::new(LineString::from(local), vec![]).map_coords(|c| {
            let (x, y) = self.corner.map_point(&self.die, c.x, c.y);
            coord! { x: x, y: y }
        })
    }

    /// Per-row rectangles in die coordinates.
    pub fn bands(&self) -> &[Rect<f64>] {
        &self.bands
    }

    /// Returns true if no area is occupied.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Occupied area.
    pub fn area(&self) -> f64 {
        self.bands.iter().map(|band| band.unsigned_area()).sum()
    }

    /// Returns true if the regions overlap with positive area.
    ///
    /// Touching edges do not count; an empty region intersects nothing.
    pub fn intersects(&self, other: &AnchoredRegion) -> bool {
        match (self.bounds, other.bounds) {
            (Some(a), Some(b)) if rects_overlap(&a, &b) => self
                .bands
                .iter()
                .any(|band| other.bands.iter().any(|o| rects_overlap(band, o))),
            _ => false,
        }
    }

    /// Returns true if the rectangle overlaps the region with positive area.
    pub fn intersects_rect(&self, rect: &Rect<f64>) -> bool {
        match self.bounds {
            Some(bounds) if rects_overlap(&bounds, rect) => {
                self.bands.iter().any(|band| rects_overlap(band, rect))
            }
            _ => false,
        }
    }
}

/// Positive-area overlap of two rectangles, ignoring slivers below
/// [`GEOM_EPS`] left by coordinate arithmetic.
pub(crate) fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    let dx = a.max().x.min(b.max().x) - a.min().x.max(b.min().x);
    let dy = a.max().y.min(b.max().y) - a.min().y.max(b.min().y);
    dx > GEOM_EPS && dy > GEOM_EPS
}

//! Skyline of the occupied region for strip packing.
//!
//! The skyline is a list of constant-height segments whose x-ranges tile
//! `[0, width)` without gaps or overlaps. Each segment caches the absolute
//! height difference to its neighbours (`f64::INFINITY` at the die edges);
//! the caches are refreshed around every structural change.

use corefill_core::{Error, Result, GEOM_EPS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One constant-height piece of the skyline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Left edge.
    pub x: f64,
    /// Width.
    pub width: f64,
    /// Baseline height.
    pub y: f64,
    /// Height difference to the left neighbour.
    pub left_delta: f64,
    /// Height difference to the right neighbour.
    pub right_delta: f64,
}

impl Segment {
    fn new(x: f64, width: f64, y: f64) -> Self {
        Self {
            x,
            width,
            y,
            left_delta: f64::INFINITY,
            right_delta: f64::INFINITY,
        }
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }
}

/// How a core was fitted into a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    /// Core width matched the segment; the segment rose.
    ExactWidth,
    /// Core top met the left neighbour; placed flush left.
    FlushLeft,
    /// Core top met the right neighbour; placed flush right.
    FlushRight,
    /// New segment inserted at the left end of the segment.
    InsertLeft,
    /// New segment inserted at the right end of the segment.
    InsertRight,
}

/// Lower-left corner of a placed core and how it was fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkylinePlacement {
    /// Lower-left x.
    pub x: f64,
    /// Lower-left y.
    pub y: f64,
    /// Fitting case.
    pub kind: PlaceKind,
}

/// Mutable skyline over a strip of fixed width.
#[derive(Debug, Clone)]
pub struct Skyline {
    width: f64,
    tolerance: f64,
    segments: Vec<Segment>,
}

impl Skyline {
    /// Creates a flat skyline at height 0.
    ///
    /// Tolerances below [`GEOM_EPS`] are raised to it.
    pub fn new(width: f64, tolerance: f64) -> Self {
        Self {
            width,
            tolerance: tolerance.abs().max(GEOM_EPS),
            segments: vec![Segment::new(0.0, width, 0.0)],
        }
    }

    /// Strip width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Segments from left to right.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments (always at least one).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: the skyline keeps at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn is_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.tolerance
    }

    /// A core no wider than the segment leaves less than the tolerance free.
    fn spans(&self, segment_width: f64, width: f64) -> bool {
        segment_width - width < self.tolerance
    }

    /// Index of the lowest segment, leftmost on ties.
    pub fn lowest(&self) -> usize {
        let mut best = 0;
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.y < self.segments[best].y {
                best = i;
            }
        }
        best
    }

    /// Highest baseline across all segments.
    pub fn height(&self) -> f64 {
        self.segments.iter().map(|s| s.y).fold(0.0, f64::max)
    }

    /// Scores how well a `width` x `height` core fits segment `index`.
    ///
    /// `None` if the core is wider than the segment. Otherwise one point each
    /// for matching the left step, the right step and the segment width.
    pub fn fitness(&self, index: usize, width: f64, height: f64) -> Option<u8> {
        let segment = self.segments.get(index)?;
        if width > segment.width + GEOM_EPS {
            return None;
        }
        let mut score = 0;
        if self.is_equal(segment.left_delta, height) {
            score += 1;
        }
        if self.is_equal(segment.right_delta, height) {
            score += 1;
        }
        if self.spans(segment.width, width) {
            score += 1;
        }
        Some(score)
    }

    /// Places a `width` x `height` core on segment `index`.
    ///
    /// Cases are tried in order: exact width, flush against a left wall of
    /// the core's height, flush against such a right wall, and otherwise a
    /// new segment on the side whose step is closer to the core's height.
    /// Walls are measured upwards, so placing on the lowest segment flushes
    /// against any neighbour whose height step matches.
    pub fn place(&mut self, index: usize, width: f64, height: f64) -> Result<SkylinePlacement> {
        let segment = *self.segments.get(index).ok_or_else(|| {
            Error::InvariantViolation(format!("no skyline segment at index {}", index))
        })?;
        if width > segment.width + GEOM_EPS {
            return Err(Error::InvariantViolation(format!(
                "core of width {} placed on segment of width {}",
                width, segment.width
            )));
        }
        let top = segment.y + height;

        let placement = if self.spans(segment.width, width) {
            self.segments[index].y = top;
            let mut current = index;
            if index + 1 < self.segments.len() && self.is_equal(self.segments[index + 1].y, top) {
                let right = self.segments.remove(index + 1);
                self.segments[current].width = right.max_x() - self.segments[current].x;
            }
            if current > 0 && self.is_equal(self.segments[current - 1].y, top) {
                let merged = self.segments.remove(current);
                current -= 1;
                self.segments[current].width = merged.max_x() - self.segments[current].x;
            }
            self.refresh_around(current);
            SkylinePlacement {
                x: segment.x,
                y: segment.y,
                kind: PlaceKind::ExactWidth,
            }
        } else if index > 0 && self.is_equal(self.segments[index - 1].y - segment.y, height) {
            self.segments[index].x += width;
            self.segments[index].width -= width;
            self.segments[index - 1].width += width;
            self.refresh_around(index);
            SkylinePlacement {
                x: segment.x,
                y: segment.y,
                kind: PlaceKind::FlushLeft,
            }
        } else if index + 1 < self.segments.len()
            && self.is_equal(self.segments[index + 1].y - segment.y, height)
        {
            let x = segment.max_x() - width;
            self.segments[index].width -= width;
            self.segments[index + 1].x = x;
            self.segments[index + 1].width += width;
            self.refresh_around(index);
            SkylinePlacement {
                x,
                y: segment.y,
                kind: PlaceKind::FlushRight,
            }
        } else if (height - segment.left_delta).abs() <= (height - segment.right_delta).abs() {
            self.segments[index].x += width;
            self.segments[index].width -= width;
            self.segments
                .insert(index, Segment::new(segment.x, width, top));
            self.refresh_around(index);
            SkylinePlacement {
                x: segment.x,
                y: segment.y,
                kind: PlaceKind::InsertLeft,
            }
        } else {
            let x = segment.max_x() - width;
            self.segments[index].width -= width;
            self.segments.insert(index + 1, Segment::new(x, width, top));
            self.refresh_around(index + 1);
            SkylinePlacement {
                x,
                y: segment.y,
                kind: PlaceKind::InsertRight,
            }
        };

        self.check_invariants()?;
        Ok(placement)
    }

    /// Removes segment `index`, handing its width to a neighbour.
    ///
    /// An edge segment goes to its only neighbour. An inner segment goes to
    /// the neighbour with the smaller height difference. Removing the last
    /// segment is an invariant violation.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if self.segments.len() <= 1 {
            return Err(Error::InvariantViolation(
                "cannot remove the last remaining skyline segment".into(),
            ));
        }
        let last = self.segments.len() - 1;
        let segment = *self.segments.get(index).ok_or_else(|| {
            Error::InvariantViolation(format!("no skyline segment at index {}", index))
        })?;

        let absorb_left = if index == 0 {
            false
        } else if index == last {
            true
        } else {
            segment.left_delta < segment.right_delta
        };

        self.segments.remove(index);
        let neighbour = if absorb_left {
            self.segments[index - 1].width += segment.width;
            index - 1
        } else {
            self.segments[index].x = segment.x;
            self.segments[index].width += segment.width;
            index
        };
        self.refresh_around(neighbour);

        self.check_invariants()?;
        Ok(())
    }

    /// Recomputes the neighbour deltas of segments `index - 1 ..= index + 1`.
    fn refresh_around(&mut self, index: usize) {
        let lo = index.saturating_sub(1);
        let hi = (index + 1).min(self.segments.len() - 1);
        for i in lo..=hi {
            let y = self.segments[i].y;
            self.segments[i].left_delta = match i {
                0 => f64::INFINITY,
                _ => (self.segments[i - 1].y - y).abs(),
            };
            self.segments[i].right_delta = match self.segments.get(i + 1) {
                Some(next) => (next.y - y).abs(),
                None => f64::INFINITY,
            };
        }
    }

    /// Checks that the segments tile `[0, width)` and the deltas are current.
    pub fn check_invariants(&self) -> Result<()> {
        let eps = GEOM_EPS.max(self.tolerance * 1e-3);
        let first = self.segments.first().ok_or_else(|| {
            Error::InvariantViolation("skyline has no segments".into())
        })?;
        if first.x.abs() > eps {
            return Err(Error::InvariantViolation(format!(
                "skyline starts at {} instead of 0",
                first.x
            )));
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.width <= 0.0 {
                return Err(Error::InvariantViolation(format!(
                    "segment {} has width {}",
                    i, segment.width
                )));
            }
            let left = match i {
                0 => f64::INFINITY,
                _ => (self.segments[i - 1].y - segment.y).abs(),
            };
            let right = match self.segments.get(i + 1) {
                Some(next) => {
                    if (next.x - segment.max_x()).abs() > eps {
                        return Err(Error::InvariantViolation(format!(
                            "gap or overlap between segments {} and {}",
                            i,
                            i + 1
                        )));
                    }
                    (next.y - segment.y).abs()
                }
                None => f64::INFINITY,
            };
            if !same_delta(segment.left_delta, left) || !same_delta(segment.right_delta, right) {
                return Err(Error::InvariantViolation(format!(
                    "stale neighbour deltas on segment {}",
                    i
                )));
            }
        }
        let end = self.segments[self.segments.len() - 1].max_x();
        if (end - self.width).abs() > eps {
            return Err(Error::InvariantViolation(format!(
                "skyline ends at {} instead of {}",
                end, self.width
            )));
        }
        Ok(())
    }
}

fn same_delta(a: f64, b: f64) -> bool {
    (a.is_infinite() && b.is_infinite()) || (a - b).abs() <= GEOM_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 0.001;

    fn skyline(steps: &[(f64, f64)]) -> Skyline {
        // (width, y) pairs from left to right
        let width = steps.iter().map(|s| s.0).sum();
        let mut x = 0.0;
        let segments = steps
            .iter()
            .map(|&(w, y)| {
                let s = Segment::new(x, w, y);
                x += w;
                s
            })
            .collect();
        let mut skyline = Skyline {
            width,
            tolerance: TOL,
            segments,
        };
        for i in 0..skyline.len() {
            skyline.refresh_around(i);
        }
        skyline
    }

    #[test]
    fn test_new_skyline() {
        let s = Skyline::new(9.55, TOL);
        assert_eq!(s.len(), 1);
        assert_eq!(s.height(), 0.0);
        assert!(s.segments()[0].left_delta.is_infinite());
        assert!(s.segments()[0].right_delta.is_infinite());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_lowest_prefers_leftmost() {
        let s = skyline(&[(2.0, 3.0), (2.0, 1.0), (2.0, 1.0), (2.0, 4.0)]);
        assert_eq!(s.lowest(), 1);
        assert_eq!(s.height(), 4.0);
    }

    #[test]
    fn test_fitness() {
        let s = skyline(&[(2.0, 3.0), (4.0, 1.0), (2.0, 3.0)]);
        assert_eq!(s.fitness(1, 4.5, 1.0), None);
        assert_eq!(s.fitness(1, 1.0, 1.0), Some(0));
        assert_eq!(s.fitness(1, 1.0, 2.0), Some(2));
        assert_eq!(s.fitness(1, 4.0, 2.0), Some(3));
        assert_eq!(s.fitness(1, 3.9995, 2.0), Some(3));
        assert_eq!(s.fitness(1, 4.0005, 2.0), None);
    }

    #[test]
    fn test_first_placement_inserts_left() {
        let mut s = Skyline::new(9.55, TOL);
        let p = s.place(0, 2.1, 1.81).unwrap();
        assert_eq!(p.kind, PlaceKind::InsertLeft);
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(s.len(), 2);
        assert!((s.segments()[0].y - 1.81).abs() < 1e-12);
        assert!((s.segments()[1].x - 2.1).abs() < 1e-12);
        assert!((s.segments()[1].left_delta - 1.81).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_flush_left_extends_neighbour() {
        let mut s = Skyline::new(9.55, TOL);
        s.place(0, 2.1, 1.81).unwrap();
        let p = s.place(1, 2.1, 1.81).unwrap();
        assert_eq!(p.kind, PlaceKind::FlushLeft);
        assert!((p.x - 2.1).abs() < 1e-12);
        assert_eq!(s.len(), 2);
        assert!((s.segments()[0].width - 4.2).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_flush_right() {
        let mut s = skyline(&[(2.0, 1.0), (4.0, 0.0), (2.0, 3.0)]);
        let p = s.place(1, 1.5, 3.0).unwrap();
        assert_eq!(p.kind, PlaceKind::FlushRight);
        assert!((p.x - 4.5).abs() < 1e-12);
        assert!((s.segments()[1].width - 2.5).abs() < 1e-12);
        assert!((s.segments()[2].x - 4.5).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_insert_right_when_right_step_is_closer() {
        let mut s = skyline(&[(2.0, 5.0), (4.0, 0.0), (2.0, 1.5)]);
        let p = s.place(1, 1.0, 1.0).unwrap();
        assert_eq!(p.kind, PlaceKind::InsertRight);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert_eq!(s.len(), 4);
        assert!((s.segments()[2].y - 1.0).abs() < 1e-12);
        assert!((s.segments()[2].right_delta - 0.5).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_exact_width_merges_both_sides() {
        let mut s = skyline(&[(2.0, 3.0), (4.0, 1.0), (2.0, 3.0)]);
        let p = s.place(1, 4.0, 2.0).unwrap();
        assert_eq!(p.kind, PlaceKind::ExactWidth);
        assert_eq!((p.x, p.y), (2.0, 1.0));
        assert_eq!(s.len(), 1);
        assert!((s.segments()[0].width - 8.0).abs() < 1e-12);
        assert!((s.segments()[0].y - 3.0).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_exact_width_merges_right_only() {
        let mut s = skyline(&[(2.0, 5.0), (4.0, 1.0), (2.0, 3.0)]);
        s.place(1, 4.0, 2.0).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s.segments()[1].x - 2.0).abs() < 1e-12);
        assert!((s.segments()[1].width - 6.0).abs() < 1e-12);
        assert!((s.segments()[1].left_delta - 2.0).abs() < 1e-12);
        assert!(s.segments()[1].right_delta.is_infinite());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_exact_width_without_merge_refreshes_deltas() {
        let mut s = skyline(&[(2.0, 5.0), (4.0, 1.0), (2.0, 4.0)]);
        s.place(1, 4.0, 2.0).unwrap();
        assert_eq!(s.len(), 3);
        assert!((s.segments()[1].left_delta - 2.0).abs() < 1e-12);
        assert!((s.segments()[2].left_delta - 1.0).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_place_rejects_wider_core() {
        let mut s = skyline(&[(2.0, 1.0), (1.0, 0.0), (2.0, 1.0)]);
        let err = s.place(1, 1.5, 1.0).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_zero_tolerance_still_matches_exact_width() {
        let mut s = Skyline::new(10.0, 0.0);
        assert_eq!(s.place(0, 2.5, 1.0).unwrap().kind, PlaceKind::InsertLeft);
        assert_eq!(s.place(1, 2.5, 1.0).unwrap().kind, PlaceKind::FlushLeft);
        assert_eq!(s.place(1, 2.5, 1.0).unwrap().kind, PlaceKind::FlushLeft);
        assert_eq!(s.fitness(1, 2.5, 1.0), Some(2));
        let p = s.place(1, 2.5, 1.0).unwrap();
        assert_eq!(p.kind, PlaceKind::ExactWidth);
        assert_eq!(s.len(), 1);
        assert!((s.segments()[0].width - 10.0).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_leftmost() {
        let mut s = skyline(&[(1.0, 0.0), (3.0, 2.0), (2.0, 1.0)]);
        s.remove(0).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.segments()[0].x, 0.0);
        assert!((s.segments()[0].width - 4.0).abs() < 1e-12);
        assert!(s.segments()[0].left_delta.is_infinite());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_rightmost() {
        let mut s = skyline(&[(3.0, 2.0), (2.0, 1.0), (1.0, 0.0)]);
        s.remove(2).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s.segments()[1].width - 3.0).abs() < 1e-12);
        assert!(s.segments()[1].right_delta.is_infinite());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_inner_goes_to_closer_neighbour() {
        let mut s = skyline(&[(2.0, 1.0), (1.0, 0.0), (2.0, 3.0)]);
        s.remove(1).unwrap();
        assert!((s.segments()[0].width - 3.0).abs() < 1e-12);
        assert!((s.segments()[0].right_delta - 2.0).abs() < 1e-12);
        assert!((s.segments()[1].left_delta - 2.0).abs() < 1e-12);

        let mut s = skyline(&[(2.0, 3.0), (1.0, 0.0), (2.0, 1.0)]);
        s.remove(1).unwrap();
        assert!((s.segments()[1].x - 2.0).abs() < 1e-12);
        assert!((s.segments()[1].width - 3.0).abs() < 1e-12);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_last_segment_is_fatal() {
        let mut s = Skyline::new(9.55, TOL);
        let err = s.remove(0).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert_eq!(s.len(), 1);
    }
}

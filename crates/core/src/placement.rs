//! Placed-core records.

use crate::geometry::{CoreTypeId, GEOM_EPS};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A core placed on the die.
///
/// `(x, y)` is the lower-left corner in die coordinates; `width` and
/// `height` are the footprint as oriented on the die, so a core anchored in
/// a corner rotated by 90 or 270 degrees has its footprint swapped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedCore {
    /// Lower-left x.
    pub x: f64,
    /// Lower-left y.
    pub y: f64,
    /// Oriented width.
    pub width: f64,
    /// Oriented height.
    pub height: f64,
    /// Core type name.
    pub core_type: CoreTypeId,
}

impl PlacedCore {
    /// Creates a new placed core.
    pub fn new(core_type: impl Into<CoreTypeId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            core_type: core_type.into(),
        }
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Footprint area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if the footprint is rotated relative to `(width, height)`.
    pub fn is_rotated(&self, width: f64, height: f64) -> bool {
        (self.width - height).abs() < GEOM_EPS
            && (self.height - width).abs() < GEOM_EPS
            && (width - height).abs() >= GEOM_EPS
    }

    /// Area of the intersection with another core (0 when only touching).
    pub fn overlap_area(&self, other: &PlacedCore) -> f64 {
        let dx = self.max_x().min(other.max_x()) - self.x.max(other.x);
        let dy = self.max_y().min(other.max_y()) - self.y.max(other.y);
        if dx <= 0.0 || dy <= 0.0 {
            0.0
        } else {
            dx * dy
        }
    }

    /// Returns true if the two cores share more than a touching edge.
    pub fn overlaps(&self, other: &PlacedCore) -> bool {
        let dx = self.max_x().min(other.max_x()) - self.x.max(other.x);
        let dy = self.max_y().min(other.max_y()) - self.y.max(other.y);
        dx > GEOM_EPS && dy > GEOM_EPS
    }

    /// Layout record `x,y,w,h,type`.
    pub fn to_record(&self) -> String {
        self.to_string()
    }

    /// Short layout record `x,y,type`, for consumers that infer the footprint
    /// from the type.
    pub fn to_short_record(&self) -> String {
        format!("{},{},{}", self.x, self.y, self.core_type)
    }
}

impl fmt::Display for PlacedCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.x, self.y, self.width, self.height, self.core_type
        )
    }
}

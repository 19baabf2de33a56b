//! Core footprints, the die, and the catalog that maps names to footprints.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name identifying a core type.
pub type CoreTypeId = String;

/// Tolerance for geometric comparisons (overlap, containment, capacity).
pub const GEOM_EPS: f64 = 1e-9;

/// A named rectangular core footprint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoreType {
    /// Unique name.
    name: CoreTypeId,
    /// Footprint width.
    width: f64,
    /// Footprint height.
    height: f64,
}

impl CoreType {
    /// Creates a core type with the given footprint.
    pub fn new(name: impl Into<CoreTypeId>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Returns the name.
    pub fn name(&self) -> &CoreTypeId {
        &self.name
    }

    /// Returns the footprint width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the footprint height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the footprint area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Number of rows and columns of this footprint that fit into a
    /// `width` x `height` frame, as `(rows, cols)`.
    pub fn grid_in(&self, width: f64, height: f64) -> (usize, usize) {
        (fit_count(height, self.height), fit_count(width, self.width))
    }

    /// Maximum number of rows on the die (`floor(die height / height)`).
    pub fn max_rows(&self, die: &DieSpec) -> usize {
        fit_count(die.height, self.height)
    }

    /// Maximum number of columns on the die (`floor(die width / width)`).
    pub fn max_cols(&self, die: &DieSpec) -> usize {
        fit_count(die.width, self.width)
    }

    /// Maximum number of cores of this type in an axis-aligned grid on the die.
    pub fn capacity(&self, die: &DieSpec) -> usize {
        self.max_rows(die) * self.max_cols(die)
    }

    /// Validates the footprint.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidCoreType("name must not be empty".into()));
        }
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(Error::InvalidCoreType(format!(
                "{}: width and height must be positive, got {} x {}",
                self.name, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// How many whole `size` lengths fit into `extent`.
fn fit_count(extent: f64, size: f64) -> usize {
    if size <= 0.0 || extent <= 0.0 {
        return 0;
    }
    // Guard exact multiples such as 7.6 / 3.8 against representation error.
    (extent / size + GEOM_EPS).floor() as usize
}

/// The rectangular die that cores are placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DieSpec {
    /// Die width.
    pub width: f64,
    /// Die height.
    pub height: f64,
}

impl DieSpec {
    /// Creates a die of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Creates a square die.
    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Returns the die area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns the die centre.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Returns true if the rectangle lies within `[0, width] x [0, height]`.
    pub fn contains_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        x >= -GEOM_EPS
            && y >= -GEOM_EPS
            && x + w <= self.width + GEOM_EPS
            && y + h <= self.height + GEOM_EPS
    }

    /// Validates the die size.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(Error::InvalidDie(format!(
                "width and height must be positive, got {} x {}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Catalog of core types, looked up by name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoreCatalog {
    cores: Vec<CoreType>,
}

impl CoreCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a core type, replacing any existing entry with the same name.
    pub fn with_core(mut self, name: impl Into<CoreTypeId>, width: f64, height: f64) -> Self {
        self.insert(CoreType::new(name, width, height));
        self
    }

    /// Inserts a core type, replacing any existing entry with the same name.
    pub fn insert(&mut self, core: CoreType) {
        match self.cores.iter_mut().find(|c| c.name == core.name) {
            Some(existing) => {
                log::debug!(
                    "replacing core type {} ({} x {}) with {} x {}",
                    core.name,
                    existing.width,
                    existing.height,
                    core.width,
                    core.height
                );
                *existing = core;
            }
            None => self.cores.push(core),
        }
    }

    /// Looks up a core type by name.
    pub fn get(&self, name: &str) -> Option<&CoreType> {
        self.cores.iter().find(|c| c.name == name)
    }

    /// Looks up a core type by name, failing with [`Error::UnknownCoreType`].
    pub fn require(&self, name: &str) -> Result<&CoreType> {
        self.get(name)
            .ok_or_else(|| Error::UnknownCoreType(name.to_string()))
    }

    /// Returns true if the catalog knows the name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over core types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CoreType> {
        self.cores.iter()
    }

    /// Number of core types.
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Validates every entry.
    pub fn validate(&self) -> Result<()> {
        self.cores.iter().try_for_each(CoreType::validate)
    }

    /// big.LITTLE catalog in millimetres, sized for a 9.55 x 9.55 die.
    pub fn millimetres() -> Self {
        Self::new()
            .with_core("big", 5.0, 3.8)
            .with_core("LITTLE", 2.1, 1.81)
            .with_core("C3", 3.34, 2.54)
            .with_core("C4", 8.85, 6.56)
    }

    /// Catalog in hundredths of a millimetre, sized for 2400 and 3200 dies.
    pub fn hundredths_mm() -> Self {
        Self::new()
            .with_core("big", 500.0, 380.0)
            .with_core("LITTLE", 210.0, 181.0)
            .with_core("A72", 583.0, 469.0)
            .with_core("Mali", 449.0, 394.0)
    }
}

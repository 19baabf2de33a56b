//! # corefill 2D
//!
//! Placement engines for packing heterogeneous cores onto a rectangular die.
//!
//! Two heuristics answer the same question: with fixed counts of up to three
//! primary core types placed, how many filler cores still fit?
//!
//! - **Corner search**: each primary type is packed as a staircase block into
//!   its own die corner; all row configurations are combined, overlapping
//!   combinations are pruned, and the filler is scanned row by row into the
//!   remaining bottom-left area.
//! - **Skyline strip packing**: cores are placed one at a time on the lowest
//!   segment of a skyline, then filler cores until the die overflows.
//!
//! ## Quick Start
//!
//! ```rust
//! use corefill_d2::{CoreCatalog, DieSpec, Floorplanner, PlacementRequest, Planner};
//!
//! let die = DieSpec::square(9.55);
//! let catalog = CoreCatalog::millimetres();
//! let request = PlacementRequest::new("LITTLE").with_count("big", 2);
//!
//! let result = Floorplanner::default_config()
//!     .plan(&request, &die, &catalog)
//!     .unwrap();
//!
//! assert!(result.feasible);
//! println!("{} LITTLE cores, utilization {}",
//!     result.filler_count,
//!     result.utilization_percent());
//! ```
//!
//! ## Sweeping counts
//!
//! ```rust
//! use corefill_d2::{Config, CoreCatalog, DieSpec, Strategy, Sweep};
//!
//! let die = DieSpec::square(9.55);
//! let catalog = CoreCatalog::millimetres();
//! let config = Config::default().with_strategy(Strategy::SkylineStrip);
//!
//! let rows = Sweep::new(&die, &catalog, config)
//!     .run(&["big".to_string()], "LITTLE")
//!     .unwrap();
//! for row in &rows {
//!     println!("{}", row.to_record());
//! }
//! ```

pub mod corner_search;
pub mod planner;
pub mod region;
pub mod skyline;
pub mod spatial_index;
pub mod strip_packer;
pub mod sweep;

// Re-exports
pub use corner_search::{CornerAssignment, CornerLayout, CornerSearch, SearchStats};
pub use planner::Floorplanner;
pub use region::{staircase_outline, AnchoredRegion, Corner};
pub use skyline::{PlaceKind, Segment, Skyline, SkylinePlacement};
pub use spatial_index::{find_overlaps, out_of_bounds, validate_layout, LayoutEntry, LayoutIndex};
pub use strip_packer::{StripOutcome, StripPacker};
pub use sweep::{filler_area_bound, Sweep, SweepRow};
pub use corefill_core::{
    partitions, Config, CoreCatalog, CoreType, CoreTypeId, DieSpec, Error, LayoutResult,
    OrderPolicy, PlacedCore, PlacementRequest, Planner, Result, RowConfiguration, SelectionMode,
    Strategy,
};

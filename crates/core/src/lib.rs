//! # corefill core
//!
//! Shared types for packing heterogeneous processing cores onto a fixed
//! rectangular die.
//!
//! A request names up to three primary core types with fixed counts and one
//! filler type whose count is maximised. The engines in `corefill-d2` answer
//! it; this crate provides what they share:
//!
//! - **Catalog**: [`CoreType`], [`CoreCatalog`], [`DieSpec`]
//! - **Partitions**: [`partitions`] enumerates per-row core counts
//! - **Records**: [`PlacedCore`] and [`LayoutResult`]
//! - **Configuration**: [`Config`], [`Strategy`], [`SelectionMode`]
//! - **Engine seam**: the [`Planner`] trait and [`PlacementRequest`]
//! - **Ordering**: [`OrderPolicy`] rearranges the primaries of a request
//!
//! ```rust
//! use corefill_core::{CoreCatalog, DieSpec, PlacementRequest};
//!
//! let die = DieSpec::square(9.55);
//! let catalog = CoreCatalog::millimetres();
//! let big = catalog.require("big").unwrap();
//! assert_eq!(big.capacity(&die), 2);
//!
//! let request = PlacementRequest::new("LITTLE").with_count("big", 2);
//! assert!(request.validate(&catalog).is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod order;
pub mod partition;
pub mod placement;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{CoreCatalog, CoreType, CoreTypeId, DieSpec, GEOM_EPS};
pub use order::{shuffle_instances, OrderPolicy};
pub use partition::{partitions, Partitions, RowConfiguration};
pub use placement::PlacedCore;
pub use result::{count_by_type, LayoutResult, LayoutSummary};
pub use solver::{Config, PlacementRequest, Planner, SelectionMode, Strategy};

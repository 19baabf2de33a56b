//! Error types shared by all floorplanning engines.

use thiserror::Error;

/// Errors raised by the catalog, the engines and the sweep.
///
/// An infeasible request is not an error: the corner search reports it as
/// `Ok(None)` and the strip packer as an outcome with `chip_full` set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A core type name was not found in the catalog.
    #[error("unknown core type: {0}")]
    UnknownCoreType(String),

    /// A core type has an unusable footprint.
    #[error("invalid core type: {0}")]
    InvalidCoreType(String),

    /// The die has an unusable size.
    #[error("invalid die: {0}")]
    InvalidDie(String),

    /// The corner search only handles one or three primary core types.
    #[error("unsupported number of primary core types: {0} (expected 1 or 3)")]
    UnsupportedPrimaryCount(usize),

    /// The request is malformed (duplicates, empty names, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An internal invariant was broken. Indicates a logic defect.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Failure of the runtime environment (thread pool, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true for errors that indicate a defect rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_) | Error::Internal(_))
    }
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

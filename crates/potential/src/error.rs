//! Error types for potential computations.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PotentialError {
    /// The node pool ran out while inserting particles.
    #[error("maximum number {capacity} of tree nodes reached while inserting particle {inserted} of {total}")]
    CapacityExceeded {
        capacity: usize,
        inserted: usize,
        total: usize,
    },

    /// All particles coincide, so the root cube has no extent.
    #[error("degenerate geometry: root cube side length {extent} is not positive")]
    DegenerateGeometry { extent: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, PotentialError>;

//! Error types for the grid and economy cores.

use std::fmt;

use crate::economy::ResourceType;
use crate::grid::HexTileCoordinate;

/// Failures when addressing grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the grid's radius or height bounds.
    OutOfBounds {
        /// The rejected coordinate.
        coord: HexTileCoordinate,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds { coord } => write!(f, "coordinate {coord} is out of bounds"),
        }
    }
}

impl std::error::Error for GridError {}

/// Result type for grid cell access.
pub type GridResult<T> = Result<T, GridError>;

/// Failures raised by the economy system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EconomyError {
    /// A ledger was configured with an unusable initial amount or maximum.
    InvalidLedger {
        /// Resource the ledger tracks.
        resource: ResourceType,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// Not enough of a resource to cover a cost.
    InsufficientResources {
        /// First resource found short.
        resource: ResourceType,
        /// Amount the cost asked for.
        required: f64,
        /// Amount currently held.
        available: f64,
    },
}

impl fmt::Display for EconomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EconomyError::InvalidLedger { resource, reason } => {
                write!(f, "invalid {resource} ledger: {reason}")
            }
            EconomyError::InsufficientResources {
                resource,
                required,
                available,
            } => write!(
                f,
                "insufficient {resource}: need {required}, have {available}"
            ),
        }
    }
}

impl std::error::Error for EconomyError {}

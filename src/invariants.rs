//! Colony invariants - sanity checks that detect bugs.
//!
//! The disable pass and the all-or-nothing placement make these hold by
//! construction. A violation means the core is broken, not that a player did
//! something unusual.

use std::collections::HashSet;

use crate::colony::Colony;
use crate::grid::{GridId, HexTileCoordinate};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all colony invariants.
///
/// Returns every violation found, or an empty list if the colony is consistent.
#[must_use]
pub fn check_invariants(colony: &Colony) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Ledger bounds
    for (resource, ledger) in colony.economy().ledgers() {
        if ledger.current.is_nan() || ledger.current < 0.0 || ledger.current > ledger.max {
            violations.push(InvariantViolation {
                message: format!(
                    "{resource} amount {} outside [0, {}]",
                    ledger.current, ledger.max
                ),
            });
        }
    }

    // Registry and placement records agree
    if colony.placements().len() != colony.buildings().len() {
        violations.push(InvariantViolation {
            message: format!(
                "{} placements recorded for {} registered buildings",
                colony.placements().len(),
                colony.buildings().len()
            ),
        });
    }

    // Claimed cells: in bounds, occupied, claimed once
    let mut claimed: HashSet<(GridId, HexTileCoordinate)> = HashSet::new();
    for placement in colony.placements() {
        let Some(grid) = colony.grid(placement.grid) else {
            violations.push(InvariantViolation {
                message: format!(
                    "placement {:?} on missing grid {}",
                    placement.actor, placement.grid.0
                ),
            });
            continue;
        };
        for cell in &placement.cells {
            if !grid.contains(*cell) {
                violations.push(InvariantViolation {
                    message: format!("cell {cell} of {:?} is out of bounds", placement.actor),
                });
            }
            if !grid.is_occupied(*cell) {
                violations.push(InvariantViolation {
                    message: format!(
                        "cell {cell} claimed by {:?} is not occupied",
                        placement.actor
                    ),
                });
            }
            if !claimed.insert((placement.grid, *cell)) {
                violations.push(InvariantViolation {
                    message: format!("cell {cell} on grid {} claimed twice", placement.grid.0),
                });
            }
        }
    }

    // Occupied cells are claimed
    for grid in colony.grids() {
        for tile in grid.tiles().filter(|t| t.is_occupied()) {
            if !claimed.contains(&(grid.id(), tile.coordinate())) {
                violations.push(InvariantViolation {
                    message: format!(
                        "cell {} on grid {} occupied without a building",
                        tile.coordinate(),
                        grid.id().0
                    ),
                });
            }
        }
    }

    violations
}

/// Assert all colony invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(colony: &Colony) {
    let violations = check_invariants(colony);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Colony invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_colony: &Colony) {}

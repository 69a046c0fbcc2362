// Allow unwrap and exact float comparison in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Hexcolony: hex-prism territory grids and a deterministic building economy.
//!
//! The crate models the construction layer of a colony game:
//! - Stacked flat-top hex grids with multi-cell building footprints
//! - A per-tick resource economy that disables starving buildings in
//!   registration order
//! - A check-then-pay protocol for construction costs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Scenario runner / CLI           │
//! ├─────────────────────────────────────┤
//! │     Colony (placement + ticks)      │
//! ├──────────────────┬──────────────────┤
//! │   Hex grids      │   Economy        │
//! └──────────────────┴──────────────────┘
//! ```

pub mod colony;
pub mod economy;
pub mod error;
pub mod grid;
pub mod invariants;
pub mod notify;
pub mod scenario;

pub use colony::{Colony, ColonyError, Placement};
pub use error::{EconomyError, GridError, GridResult};

// Re-export key types at crate root for convenience
pub use economy::{
    ActorId, Building, BuildingKind, BuildingManager, BuildingTemplate, EconomyActor,
    EconomyConfig, EconomySystem, LedgerConfig, ResourceMap, ResourceType,
};
pub use grid::{Footprint, GridConfig, GridId, HexGridData, HexTileCoordinate, PlayerId};
pub use scenario::{Scenario, ScenarioError, ScenarioOutcome};

//! Resource economy: building templates, the actor registry, and the
//! ledger system that aggregates them once per tick.

mod building;
mod manager;
mod resource;
mod system;

pub use building::{Building, BuildingKind, BuildingTemplate, EconomyActor};
pub use manager::{ActorId, BuildingManager};
pub use resource::{ResourceMap, ResourceType};
pub use system::{
    EconomyConfig, EconomySystem, LedgerConfig, ResourceEvent, ResourceLedger, TickReport,
};

//! Building templates and the economy actor capability.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::economy::{ResourceMap, ResourceType};
use crate::grid::{Footprint, HexTileCoordinate};

/// Anything the economy tick can aggregate.
///
/// The tick only needs the steady-state change and a one-way switch off;
/// concrete building kinds never matter to it.
pub trait EconomyActor {
    /// Net resource change per tick while enabled.
    fn net_resource_change(&self) -> &ResourceMap;

    /// One-time cost paid at construction.
    fn build_cost(&self) -> &ResourceMap;

    /// Whether the actor still contributes.
    fn is_enabled(&self) -> bool;

    /// Switch the actor off for good.
    fn disable(&mut self);
}

/// Auxiliary data per building kind. None of it affects the economy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BuildingKind {
    /// Structural or decorative building.
    Base,
    /// Extractor dedicated to one resource.
    Resource {
        /// Resource the extractor yields.
        produces: ResourceType,
    },
    /// Converts resources into others.
    Factory,
    /// Defensive emplacement.
    Weapon {
        /// Engagement range in tiles.
        range: u32,
    },
    /// Colony heart.
    Core,
}

/// Static, read-only description of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    /// Unique catalog name.
    pub name: String,
    /// Kind and its auxiliary data.
    pub kind: BuildingKind,
    /// Cell offsets relative to the anchor. Defaults to the anchor alone.
    #[serde(default = "single_cell")]
    pub shape: Vec<HexTileCoordinate>,
    /// Net change per tick.
    #[serde(default)]
    pub net_change: ResourceMap,
    /// One-time construction cost.
    #[serde(default)]
    pub build_cost: ResourceMap,
}

fn single_cell() -> Vec<HexTileCoordinate> {
    vec![HexTileCoordinate::ORIGIN]
}

impl BuildingTemplate {
    /// Single-cell template with no economic effect.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: BuildingKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: single_cell(),
            net_change: ResourceMap::new(),
            build_cost: ResourceMap::new(),
        }
    }

    /// Replace the footprint.
    #[must_use]
    pub fn with_shape(mut self, shape: impl IntoIterator<Item = HexTileCoordinate>) -> Self {
        self.shape = shape.into_iter().collect();
        self
    }

    /// Set the per-tick change for one resource.
    #[must_use]
    pub fn with_net_change(mut self, resource: ResourceType, amount: f64) -> Self {
        self.net_change.insert(resource, amount);
        self
    }

    /// Set the construction cost for one resource.
    #[must_use]
    pub fn with_cost(mut self, resource: ResourceType, amount: f64) -> Self {
        self.build_cost.insert(resource, amount);
        self
    }
}

impl Footprint for BuildingTemplate {
    fn shape(&self) -> &[HexTileCoordinate] {
        &self.shape
    }
}

/// A constructed building: a shared template plus its own on/off state.
#[derive(Debug, Clone)]
pub struct Building {
    template: Arc<BuildingTemplate>,
    enabled: bool,
}

impl Building {
    /// New, enabled building.
    #[must_use]
    pub fn new(template: Arc<BuildingTemplate>) -> Self {
        Self {
            template,
            enabled: true,
        }
    }

    /// The template this building was built from.
    #[must_use]
    pub fn template(&self) -> &BuildingTemplate {
        &self.template
    }
}

impl From<BuildingTemplate> for Building {
    fn from(template: BuildingTemplate) -> Self {
        Self::new(Arc::new(template))
    }
}

impl EconomyActor for Building {
    fn net_resource_change(&self) -> &ResourceMap {
        &self.template.net_change
    }

    fn build_cost(&self) -> &ResourceMap {
        &self.template.build_cost
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

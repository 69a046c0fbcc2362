//! Colony session state.
//!
//! A [`Colony`] owns everything one game session mutates: each player's
//! territory grid, the building registry, the resource ledgers and the
//! template catalog. Nothing is global; callers hold the colony and drive
//! placements and ticks from a single thread of control.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::economy::{
    ActorId, Building, BuildingManager, BuildingTemplate, EconomyConfig, EconomySystem, TickReport,
};
use crate::error::{EconomyError, GridError};
use crate::grid::{
    Footprint, GridConfig, GridId, HexGridData, HexTileCoordinate, PlayerId, TileEvent,
};
use crate::invariants::assert_invariants;
use crate::notify::SubscriptionId;

/// Failures when placing buildings or editing a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ColonyError {
    /// No grid with this id.
    UnknownGrid(GridId),
    /// No template with this name in the catalog.
    UnknownTemplate(String),
    /// The build cost is not covered.
    InsufficientResources(EconomyError),
    /// A footprint cell is occupied or out of bounds.
    PlacementBlocked {
        /// Grid the placement targeted.
        grid: GridId,
        /// Requested anchor cell.
        anchor: HexTileCoordinate,
    },
    /// A flag update addressed a cell outside the grid.
    Grid(GridError),
}

impl fmt::Display for ColonyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGrid(id) => write!(f, "unknown grid {}", id.0),
            Self::UnknownTemplate(name) => write!(f, "unknown building template '{name}'"),
            Self::InsufficientResources(e) => write!(f, "cannot afford building: {e}"),
            Self::PlacementBlocked { grid, anchor } => {
                write!(f, "footprint at {anchor} on grid {} is blocked", grid.0)
            }
            Self::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ColonyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InsufficientResources(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ColonyError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// Record of a committed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Registry entry for the building.
    pub actor: ActorId,
    /// Grid the building stands on.
    pub grid: GridId,
    /// Anchor cell.
    pub anchor: HexTileCoordinate,
    /// Absolute cells claimed, sorted and without repeats.
    pub cells: Vec<HexTileCoordinate>,
}

/// One game session's spatial and economic state.
#[derive(Debug)]
pub struct Colony {
    grids: Vec<HexGridData>,
    buildings: BuildingManager<Building>,
    economy: EconomySystem,
    templates: BTreeMap<String, Arc<BuildingTemplate>>,
    placements: Vec<Placement>,
    ticks: u64,
}

impl Colony {
    /// Create a colony with no grids and no buildings.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger configuration is invalid.
    pub fn new(economy: &EconomyConfig) -> Result<Self, EconomyError> {
        Ok(Self {
            grids: Vec::new(),
            buildings: BuildingManager::new(),
            economy: EconomySystem::new(economy)?,
            templates: BTreeMap::new(),
            placements: Vec::new(),
            ticks: 0,
        })
    }

    /// Add a territory grid owned by `owner`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_grid(&mut self, owner: PlayerId, config: GridConfig) -> GridId {
        let id = GridId(self.grids.len() as u32);
        self.grids.push(HexGridData::new(id, owner, config));
        id
    }

    /// Look up a grid.
    #[must_use]
    pub fn grid(&self, id: GridId) -> Option<&HexGridData> {
        self.grids.get(id.0 as usize)
    }

    /// Raw grid access, bypassing placement records.
    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self, id: GridId) -> Option<&mut HexGridData> {
        self.grids.get_mut(id.0 as usize)
    }

    fn territory_mut(&mut self, id: GridId) -> Result<&mut HexGridData, ColonyError> {
        self.grids
            .get_mut(id.0 as usize)
            .ok_or(ColonyError::UnknownGrid(id))
    }

    /// Share a grid with another player.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::UnknownGrid`] if the grid does not exist.
    pub fn add_player(&mut self, grid: GridId, player: PlayerId) -> Result<(), ColonyError> {
        self.territory_mut(grid)?.add_player(player);
        Ok(())
    }

    /// Set a cell's hover flag. Returns whether it transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown grid or a cell outside it.
    pub fn set_hovered(
        &mut self,
        grid: GridId,
        coord: HexTileCoordinate,
        value: bool,
    ) -> Result<bool, ColonyError> {
        Ok(self.territory_mut(grid)?.set_hovered(coord, value)?)
    }

    /// Set a cell's mouse-target flag. Returns whether it transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown grid or a cell outside it.
    pub fn set_mouse_target(
        &mut self,
        grid: GridId,
        coord: HexTileCoordinate,
        value: bool,
    ) -> Result<bool, ColonyError> {
        Ok(self.territory_mut(grid)?.set_mouse_target(coord, value)?)
    }

    /// Highlight where a catalog building would go and report whether it fits.
    ///
    /// Only build-target flags change; nothing is claimed or paid.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown grid or template.
    pub fn preview_placement(
        &mut self,
        grid: GridId,
        anchor: HexTileCoordinate,
        template_name: &str,
    ) -> Result<bool, ColonyError> {
        let template = self
            .templates
            .get(template_name)
            .cloned()
            .ok_or_else(|| ColonyError::UnknownTemplate(template_name.to_string()))?;
        Ok(self.territory_mut(grid)?.preview_placement(anchor, &*template))
    }

    /// Drop a grid's build-target highlights.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::UnknownGrid`] if the grid does not exist.
    pub fn clear_build_targets(&mut self, grid: GridId) -> Result<(), ColonyError> {
        self.territory_mut(grid)?.clear_build_targets();
        Ok(())
    }

    /// Subscribe to a grid's tile events.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::UnknownGrid`] if the grid does not exist.
    pub fn subscribe_tiles(
        &mut self,
        grid: GridId,
        listener: impl FnMut(&TileEvent) + 'static,
    ) -> Result<SubscriptionId, ColonyError> {
        Ok(self.territory_mut(grid)?.subscribe(listener))
    }

    /// Detach a tile listener. Returns `false` if it was not attached.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::UnknownGrid`] if the grid does not exist.
    pub fn unsubscribe_tiles(
        &mut self,
        grid: GridId,
        id: SubscriptionId,
    ) -> Result<bool, ColonyError> {
        Ok(self.territory_mut(grid)?.unsubscribe(id))
    }

    /// All grids in creation order.
    #[must_use]
    pub fn grids(&self) -> &[HexGridData] {
        &self.grids
    }

    /// First grid a player owns.
    #[must_use]
    pub fn grid_of(&self, player: PlayerId) -> Option<GridId> {
        self.grids
            .iter()
            .find(|g| g.is_owned_by(player))
            .map(HexGridData::id)
    }

    /// Add or replace a catalog template.
    pub fn add_template(&mut self, template: BuildingTemplate) -> Arc<BuildingTemplate> {
        let template = Arc::new(template);
        self.templates
            .insert(template.name.clone(), Arc::clone(&template));
        template
    }

    /// Look up a catalog template.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&BuildingTemplate> {
        self.templates.get(name).map(|t| &**t)
    }

    /// Catalog in name order.
    pub fn templates(&self) -> impl Iterator<Item = &BuildingTemplate> {
        self.templates.values().map(|t| &**t)
    }

    /// The building registry.
    #[must_use]
    pub fn buildings(&self) -> &BuildingManager<Building> {
        &self.buildings
    }

    /// The resource ledgers.
    #[must_use]
    pub fn economy(&self) -> &EconomySystem {
        &self.economy
    }

    /// Mutable ledgers, for subscriptions and direct spending.
    #[must_use]
    pub fn economy_mut(&mut self) -> &mut EconomySystem {
        &mut self.economy
    }

    /// Committed buildings in placement order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Number of completed economy ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Construct a building from the catalog.
    ///
    /// Checks the cost, commits the footprint, pays, then registers the new
    /// building. Nothing changes unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError`] for an unknown grid or template, an
    /// unaffordable cost, or a blocked footprint.
    pub fn place_building(
        &mut self,
        grid: GridId,
        anchor: HexTileCoordinate,
        template_name: &str,
    ) -> Result<ActorId, ColonyError> {
        let template = self
            .templates
            .get(template_name)
            .cloned()
            .ok_or_else(|| ColonyError::UnknownTemplate(template_name.to_string()))?;
        let territory = self
            .grids
            .get_mut(grid.0 as usize)
            .ok_or(ColonyError::UnknownGrid(grid))?;

        if let Some(shortfall) = self.economy.shortfall(&template.build_cost) {
            tracing::warn!(template = template_name, %shortfall, "placement unaffordable");
            return Err(ColonyError::InsufficientResources(shortfall));
        }
        if !territory.validate_and_commit_placement(anchor, &*template) {
            tracing::warn!(template = template_name, grid = grid.0, %anchor, "placement blocked");
            return Err(ColonyError::PlacementBlocked { grid, anchor });
        }
        self.economy.pay_resource(&template.build_cost);

        let mut cells = template.cells_at(anchor).unwrap_or_default();
        cells.sort_unstable();
        cells.dedup();
        let actor = self.buildings.register(Building::new(template));
        tracing::info!(
            template = template_name,
            grid = grid.0,
            %anchor,
            actor = actor.0,
            "building placed"
        );
        self.placements.push(Placement {
            actor,
            grid,
            anchor,
            cells,
        });
        Ok(actor)
    }

    /// Run one economy tick.
    ///
    /// In debug builds, panics if the tick leaves the colony inconsistent.
    pub fn tick(&mut self) -> TickReport {
        let report = self.economy.update_economy(&mut self.buildings);
        self.ticks += 1;
        assert_invariants(self);
        report
    }
}

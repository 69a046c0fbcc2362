//! JSON-described colony scenarios.
//!
//! A scenario bundles everything the core consumes from outside: grid
//! placement, initial ledgers, the building catalog and a schedule of
//! placement requests. Running one is deterministic, so a scenario file plus
//! a tick count fully reproduces a session.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colony::{Colony, ColonyError};
use crate::economy::{
    ActorId, BuildingKind, BuildingTemplate, EconomyConfig, LedgerConfig, ResourceLedger,
    ResourceType,
};
use crate::error::EconomyError;
use crate::grid::{GridConfig, HexTileCoordinate, PlayerId};

/// Failures loading or running a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    /// Reading or writing the file failed.
    Io(io::Error),
    /// The file is not a valid scenario.
    Parse(serde_json::Error),
    /// The ledger configuration is invalid.
    Economy(EconomyError),
    /// Setting up a territory failed.
    Colony(ColonyError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "scenario I/O failed: {e}"),
            Self::Parse(e) => write!(f, "invalid scenario: {e}"),
            Self::Economy(e) => write!(f, "invalid economy: {e}"),
            Self::Colony(e) => write!(f, "invalid territory: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Economy(e) => Some(e),
            Self::Colony(e) => Some(e),
        }
    }
}

impl From<ColonyError> for ScenarioError {
    fn from(e: ColonyError) -> Self {
        Self::Colony(e)
    }
}

impl From<io::Error> for ScenarioError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<EconomyError> for ScenarioError {
    fn from(e: EconomyError) -> Self {
        Self::Economy(e)
    }
}

/// One territory grid and the players sharing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    /// Owners; the first one creates the grid, the rest are added as allies.
    pub owners: Vec<PlayerId>,
    /// Grid override. Falls back to the scenario-wide grid.
    #[serde(default)]
    pub grid: Option<GridConfig>,
}

/// A scheduled placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedPlacement {
    /// Player placing the building; resolves to their first territory.
    pub player: PlayerId,
    /// Catalog name.
    pub template: String,
    /// Anchor cell.
    pub anchor: HexTileCoordinate,
    /// Placed before this tick runs.
    #[serde(default)]
    pub at_tick: u32,
}

fn default_ticks() -> u32 {
    10
}

/// A complete, reproducible session description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Default grid for every territory.
    #[serde(default)]
    pub grid: GridConfig,
    /// Initial ledgers.
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Territories, one grid each.
    pub territories: Vec<Territory>,
    /// Building catalog.
    pub templates: Vec<BuildingTemplate>,
    /// Placement schedule.
    #[serde(default)]
    pub placements: Vec<PlannedPlacement>,
    /// Number of economy ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

/// Result of one scheduled placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOutcome {
    /// The request.
    pub request: PlannedPlacement,
    /// Registry id when the building went up.
    pub actor: Option<ActorId>,
    /// Why it did not, otherwise.
    pub error: Option<String>,
}

/// Ledger state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSnapshot {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Actors disabled during this tick.
    pub disabled: Vec<ActorId>,
    /// Ledgers after the tick.
    pub ledgers: BTreeMap<ResourceType, ResourceLedger>,
}

/// Everything that happened while running a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    /// Placement results in execution order.
    pub placements: Vec<PlacementOutcome>,
    /// One snapshot per tick.
    pub ticks: Vec<TickSnapshot>,
    /// Buildings still enabled at the end.
    pub enabled: usize,
    /// Buildings registered in total.
    pub registered: usize,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the scenario as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Small two-player sample used by the CLI `template` command.
    #[must_use]
    pub fn example() -> Self {
        let metal = ResourceType::Metal;
        let power = ResourceType::Power;
        let magma = ResourceType::Magma;
        Self {
            grid: GridConfig::default(),
            economy: EconomyConfig {
                resources: [
                    (metal, LedgerConfig::bounded(200.0, 1000.0)),
                    (power, LedgerConfig::bounded(0.0, 500.0)),
                    (magma, LedgerConfig::bounded(0.0, 500.0)),
                ]
                .into(),
            },
            territories: vec![
                Territory {
                    owners: vec![1],
                    grid: None,
                },
                Territory {
                    owners: vec![2, 3],
                    grid: None,
                },
            ],
            templates: vec![
                BuildingTemplate::new("core", BuildingKind::Core)
                    .with_shape([
                        HexTileCoordinate::ORIGIN,
                        HexTileCoordinate::planar(1, 0),
                        HexTileCoordinate::planar(0, 1),
                    ])
                    .with_net_change(power, 20.0),
                BuildingTemplate::new(
                    "magma_pump",
                    BuildingKind::Resource { produces: magma },
                )
                .with_net_change(magma, 10.0)
                .with_net_change(power, -5.0)
                .with_cost(metal, 50.0),
                BuildingTemplate::new("foundry", BuildingKind::Factory)
                    .with_shape([HexTileCoordinate::ORIGIN, HexTileCoordinate::new(0, 0, 1)])
                    .with_net_change(magma, -15.0)
                    .with_net_change(power, -10.0)
                    .with_net_change(metal, 30.0)
                    .with_cost(metal, 80.0),
                BuildingTemplate::new("turret", BuildingKind::Weapon { range: 4 })
                    .with_net_change(power, -25.0)
                    .with_cost(metal, 60.0),
            ],
            placements: vec![
                PlannedPlacement {
                    player: 1,
                    template: "core".to_string(),
                    anchor: HexTileCoordinate::ORIGIN,
                    at_tick: 0,
                },
                PlannedPlacement {
                    player: 1,
                    template: "magma_pump".to_string(),
                    anchor: HexTileCoordinate::planar(-2, 0),
                    at_tick: 0,
                },
                PlannedPlacement {
                    player: 3,
                    template: "foundry".to_string(),
                    anchor: HexTileCoordinate::planar(2, -1),
                    at_tick: 1,
                },
                PlannedPlacement {
                    player: 1,
                    template: "turret".to_string(),
                    anchor: HexTileCoordinate::planar(0, -2),
                    at_tick: 2,
                },
            ],
            ticks: 10,
        }
    }

    /// Problems that would make placements fail regardless of game state.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let owners: Vec<PlayerId> = self
            .territories
            .iter()
            .flat_map(|t| t.owners.iter().copied())
            .collect();

        for (i, territory) in self.territories.iter().enumerate() {
            if territory.owners.is_empty() {
                problems.push(format!("territory {i} has no owners"));
            }
        }
        let mut names: Vec<&str> = self.templates.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        for pair in names.windows(2) {
            if pair[0] == pair[1] {
                problems.push(format!("template '{}' defined twice", pair[0]));
            }
        }
        for template in &self.templates {
            if template.shape.is_empty() {
                problems.push(format!("template '{}' has an empty footprint", template.name));
            }
        }
        for placement in &self.placements {
            if !owners.contains(&placement.player) {
                problems.push(format!("placement for unknown player {}", placement.player));
            }
            if !names.contains(&placement.template.as_str()) {
                problems.push(format!("placement uses unknown template '{}'", placement.template));
            }
        }
        problems
    }

    /// Build the colony: grids, allies and catalog, but no buildings.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger configuration is invalid.
    pub fn colony(&self) -> Result<Colony, ScenarioError> {
        let mut colony = Colony::new(&self.economy)?;
        for territory in &self.territories {
            let Some((&owner, allies)) = territory.owners.split_first() else {
                continue;
            };
            let id = colony.add_grid(owner, territory.grid.unwrap_or(self.grid));
            for &ally in allies {
                colony.add_player(id, ally)?;
            }
        }
        for template in &self.templates {
            colony.add_template(template.clone());
        }
        Ok(colony)
    }

    /// Run the placement schedule and the ticks.
    ///
    /// Placements scheduled at tick `n` are attempted, in file order, right
    /// before tick `n` runs. Placements scheduled past the last tick are
    /// attempted after it.
    ///
    /// # Errors
    ///
    /// Returns an error if the colony cannot be built.
    pub fn run(&self) -> Result<ScenarioOutcome, ScenarioError> {
        let mut colony = self.colony()?;
        let mut schedule: Vec<&PlannedPlacement> = self.placements.iter().collect();
        schedule.sort_by_key(|p| p.at_tick);

        let mut placements = Vec::with_capacity(schedule.len());
        let mut ticks = Vec::with_capacity(self.ticks as usize);
        let mut next = 0;

        for tick in 0..self.ticks {
            while let Some(request) = schedule.get(next).filter(|p| p.at_tick <= tick) {
                placements.push(attempt(&mut colony, request));
                next += 1;
            }
            let report = colony.tick();
            ticks.push(TickSnapshot {
                tick: colony.tick_count(),
                disabled: report.disabled,
                ledgers: colony.economy().ledgers().clone(),
            });
        }
        for request in &schedule[next..] {
            placements.push(attempt(&mut colony, request));
        }

        Ok(ScenarioOutcome {
            placements,
            ticks,
            enabled: colony.buildings().enabled_count(),
            registered: colony.buildings().len(),
        })
    }
}

fn attempt(colony: &mut Colony, request: &PlannedPlacement) -> PlacementOutcome {
    let result = match colony.grid_of(request.player) {
        Some(grid) => colony
            .place_building(grid, request.anchor, &request.template)
            .map_err(|e| e.to_string()),
        None => Err(format!("player {} has no territory", request.player)),
    };
    PlacementOutcome {
        request: request.clone(),
        actor: result.as_ref().ok().copied(),
        error: result.err(),
    }
}

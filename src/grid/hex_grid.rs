//! One player's hex-prism territory.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::grid::{HexTileCoordinate, HexTileData};
use crate::notify::{SubscriptionId, Subscribers};

/// Unique identifier for a player.
pub type PlayerId = u32;

/// Index of a grid inside its owning colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridId(pub u32);

/// Placement and dimensions of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World position of the (0, 0, 0) cell.
    pub origin: Vec3,
    /// Maximum planar hex distance from the origin cell.
    pub radius: u32,
    /// Number of addressable layers (`0 <= h < max_height`).
    pub max_height: u32,
    /// Hex circumradius in world units.
    pub tile_radius: f32,
    /// Layer height in world units.
    pub tile_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            radius: 8,
            max_height: 4,
            tile_radius: 1.0,
            tile_height: 1.0,
        }
    }
}

impl GridConfig {
    /// Check whether a coordinate lies inside the hexagonal prism bounds.
    #[must_use]
    pub fn contains(&self, coord: HexTileCoordinate) -> bool {
        let radius = u64::from(self.radius);
        let q = i64::from(coord.q);
        let r = i64::from(coord.r);
        q.unsigned_abs() <= radius
            && r.unsigned_abs() <= radius
            && (q + r).unsigned_abs() <= radius
            && coord.h >= 0
            && coord.h.unsigned_abs() < self.max_height
    }

    /// Number of cells the bounds admit.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        let n = u64::from(self.radius);
        (3 * n * (n + 1) + 1) * u64::from(self.max_height)
    }
}

/// Relative cell offsets occupied by something placed on a grid.
pub trait Footprint {
    /// Offsets from the anchor cell.
    fn shape(&self) -> &[HexTileCoordinate];

    /// Absolute cells covered when anchored at `anchor`.
    ///
    /// Returns `None` if any offset overflows the coordinate range.
    fn cells_at(&self, anchor: HexTileCoordinate) -> Option<Vec<HexTileCoordinate>> {
        self.shape()
            .iter()
            .map(|offset| anchor.checked_add(*offset))
            .collect()
    }
}

impl Footprint for [HexTileCoordinate] {
    fn shape(&self) -> &[HexTileCoordinate] {
        self
    }
}

impl Footprint for Vec<HexTileCoordinate> {
    fn shape(&self) -> &[HexTileCoordinate] {
        self
    }
}

/// Change notifications emitted by a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEvent {
    /// A previously absent cell was materialized.
    Created(HexTileData),
    /// A flag on an existing cell transitioned.
    Changed(HexTileData),
}

/// Spatial model for one territory: lazily materialized cells plus
/// all-or-nothing footprint placement.
#[derive(Debug)]
pub struct HexGridData {
    id: GridId,
    owners: BTreeSet<PlayerId>,
    config: GridConfig,
    tiles: HashMap<HexTileCoordinate, HexTileData>,
    build_targets: Vec<HexTileCoordinate>,
    events: Subscribers<TileEvent>,
}

impl HexGridData {
    /// Create an empty grid owned by `owner`.
    #[must_use]
    pub fn new(id: GridId, owner: PlayerId, config: GridConfig) -> Self {
        Self {
            id,
            owners: BTreeSet::from([owner]),
            config,
            tiles: HashMap::new(),
            build_targets: Vec::new(),
            events: Subscribers::new(),
        }
    }

    /// Grid identifier.
    #[must_use]
    pub const fn id(&self) -> GridId {
        self.id
    }

    /// Bounds and world placement.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Players sharing this territory.
    #[must_use]
    pub fn owners(&self) -> &BTreeSet<PlayerId> {
        &self.owners
    }

    /// Check whether a player shares this territory.
    #[must_use]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owners.contains(&player)
    }

    /// Record an additional owner. Occupancy is unaffected.
    pub fn add_player(&mut self, player: PlayerId) {
        self.owners.insert(player);
    }

    /// Check whether a coordinate is addressable.
    #[must_use]
    pub fn contains(&self, coord: HexTileCoordinate) -> bool {
        self.config.contains(coord)
    }

    /// Number of materialized cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if no cell has been materialized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Existing cell data, without materializing anything.
    #[must_use]
    pub fn get(&self, coord: HexTileCoordinate) -> Option<&HexTileData> {
        self.tiles.get(&coord)
    }

    /// Iterate over all materialized cells (unordered).
    pub fn tiles(&self) -> impl Iterator<Item = &HexTileData> {
        self.tiles.values()
    }

    /// Check whether a cell is claimed. Absent in-bounds cells are free.
    #[must_use]
    pub fn is_occupied(&self, coord: HexTileCoordinate) -> bool {
        self.tiles.get(&coord).is_some_and(HexTileData::is_occupied)
    }

    /// World position of a cell's base center.
    #[must_use]
    pub fn world_position(&self, coord: HexTileCoordinate) -> Vec3 {
        self.config.origin + coord.to_world(self.config.tile_radius, self.config.tile_height)
    }

    /// Cell under a world position, if it is inside the bounds.
    #[must_use]
    pub fn coordinate_at(&self, world: Vec3) -> Option<HexTileCoordinate> {
        let coord = HexTileCoordinate::from_world(
            world - self.config.origin,
            self.config.tile_radius,
            self.config.tile_height,
        );
        self.contains(coord).then_some(coord)
    }

    /// Subscribe to cell creation and flag transitions.
    pub fn subscribe(&mut self, listener: impl FnMut(&TileEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Detach a tile listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Return the cell at `coord`, materializing it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate is outside the
    /// grid; no cell is created in that case.
    pub fn get_or_create_tile(&mut self, coord: HexTileCoordinate) -> GridResult<&HexTileData> {
        self.tile_mut(coord).map(|tile| &*tile)
    }

    fn tile_mut(&mut self, coord: HexTileCoordinate) -> GridResult<&mut HexTileData> {
        if !self.config.contains(coord) {
            return Err(GridError::OutOfBounds { coord });
        }
        match self.tiles.entry(coord) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let tile = entry.insert(HexTileData::new(coord));
                tracing::debug!(grid = self.id.0, %coord, "tile materialized");
                self.events.notify(&TileEvent::Created(*tile));
                Ok(tile)
            }
        }
    }

    /// Apply a flag update and emit [`TileEvent::Changed`] on transition.
    fn update_tile(
        &mut self,
        coord: HexTileCoordinate,
        update: impl FnOnce(&mut HexTileData) -> bool,
    ) -> GridResult<bool> {
        let tile = self.tile_mut(coord)?;
        let changed = update(tile);
        let snapshot = *tile;
        if changed {
            self.events.notify(&TileEvent::Changed(snapshot));
        }
        Ok(changed)
    }

    /// Set the hover flag. Returns whether it transitioned.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn set_hovered(&mut self, coord: HexTileCoordinate, value: bool) -> GridResult<bool> {
        self.update_tile(coord, |tile| tile.set_hovered(value))
    }

    /// Set the mouse-target flag. Returns whether it transitioned.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn set_mouse_target(&mut self, coord: HexTileCoordinate, value: bool) -> GridResult<bool> {
        self.update_tile(coord, |tile| tile.set_mouse_target(value))
    }

    /// Read-only placement check: every footprint cell in bounds and free.
    #[must_use]
    pub fn can_place<F: Footprint + ?Sized>(
        &self,
        anchor: HexTileCoordinate,
        template: &F,
    ) -> bool {
        template
            .cells_at(anchor)
            .is_some_and(|cells| self.all_free(&cells))
    }

    fn all_free(&self, cells: &[HexTileCoordinate]) -> bool {
        cells
            .iter()
            .all(|cell| self.contains(*cell) && !self.is_occupied(*cell))
    }

    /// Claim a footprint if, and only if, every cell is in bounds and free.
    ///
    /// The whole footprint is scanned before anything is written, so a
    /// rejected placement leaves every cell untouched.
    pub fn validate_and_commit_placement<F: Footprint + ?Sized>(
        &mut self,
        anchor: HexTileCoordinate,
        template: &F,
    ) -> bool {
        let Some(cells) = template.cells_at(anchor) else {
            return false;
        };
        if !self.all_free(&cells) {
            return false;
        }

        for cell in &cells {
            self.occupy(*cell);
        }
        tracing::debug!(grid = self.id.0, %anchor, cells = cells.len(), "footprint committed");
        true
    }

    /// Mark an in-bounds cell occupied, materializing it if needed.
    fn occupy(&mut self, coord: HexTileCoordinate) {
        let mut created = false;
        let tile = self.tiles.entry(coord).or_insert_with(|| {
            created = true;
            HexTileData::new(coord)
        });
        let fresh = *tile;
        let changed = tile.set_occupied(true);
        let occupied = *tile;

        if created {
            tracing::debug!(grid = self.id.0, %coord, "tile materialized");
            self.events.notify(&TileEvent::Created(fresh));
        }
        if changed {
            self.events.notify(&TileEvent::Changed(occupied));
        }
    }

    /// Highlight a candidate footprint and report whether it would fit.
    ///
    /// Clears the previous preview first. Out-of-bounds footprint cells are
    /// skipped rather than reported.
    pub fn preview_placement<F: Footprint + ?Sized>(
        &mut self,
        anchor: HexTileCoordinate,
        template: &F,
    ) -> bool {
        self.clear_build_targets();
        let Some(cells) = template.cells_at(anchor) else {
            return false;
        };
        for cell in &cells {
            if self.update_tile(*cell, |tile| tile.set_build_target(true)).is_ok() {
                self.build_targets.push(*cell);
            }
        }
        self.all_free(&cells)
    }

    /// Drop every build-target highlight.
    pub fn clear_build_targets(&mut self) {
        for cell in std::mem::take(&mut self.build_targets) {
            // Only in-bounds cells are ever recorded.
            let _ = self.update_tile(cell, |tile| tile.set_build_target(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small_grid() -> HexGridData {
        HexGridData::new(
            GridId(0),
            1,
            GridConfig {
                radius: 2,
                max_height: 2,
                ..GridConfig::default()
            },
        )
    }

    fn record_events(grid: &mut HexGridData) -> Rc<RefCell<Vec<TileEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        grid.subscribe(move |event| sink.borrow_mut().push(*event));
        log
    }

    #[test]
    fn test_bounds() {
        let grid = small_grid();
        assert!(grid.contains(HexTileCoordinate::new(2, 0, 0)));
        assert!(grid.contains(HexTileCoordinate::new(2, -2, 1)));
        assert!(!grid.contains(HexTileCoordinate::new(2, 1, 0)));
        assert!(!grid.contains(HexTileCoordinate::new(0, 0, 2)));
        assert!(!grid.contains(HexTileCoordinate::new(0, 0, -1)));
    }

    #[test]
    fn test_capacity_matches_enumeration() {
        let grid = small_grid();
        let mut count = 0u64;
        for q in -3..=3 {
            for r in -3..=3 {
                for h in -1..=2 {
                    if grid.contains(HexTileCoordinate::new(q, r, h)) {
                        count += 1;
                    }
                }
            }
        }
        assert_eq!(count, grid.config().capacity());
        assert_eq!(count, 38);
    }

    #[test]
    fn test_get_or_create_lazily() {
        let mut grid = small_grid();
        let log = record_events(&mut grid);
        let coord = HexTileCoordinate::new(1, 0, 0);

        assert!(grid.get(coord).is_none());
        let tile = grid.get_or_create_tile(coord).unwrap();
        assert!(!tile.is_occupied());
        grid.get_or_create_tile(coord).unwrap();

        assert_eq!(grid.len(), 1);
        assert_eq!(*log.borrow(), vec![TileEvent::Created(HexTileData::new(coord))]);
    }

    #[test]
    fn test_out_of_bounds_fails_closed() {
        let mut grid = small_grid();
        let coord = HexTileCoordinate::new(3, 0, 0);
        assert_eq!(
            grid.get_or_create_tile(coord),
            Err(GridError::OutOfBounds { coord })
        );
        assert!(grid.is_empty());
        assert!(grid.set_hovered(coord, true).is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_no_event_on_noop_write() {
        let mut grid = small_grid();
        let coord = HexTileCoordinate::ORIGIN;
        grid.get_or_create_tile(coord).unwrap();
        let log = record_events(&mut grid);

        assert!(grid.set_hovered(coord, true).unwrap());
        assert!(!grid.set_hovered(coord, true).unwrap());
        assert_eq!(log.borrow().len(), 1);
        assert!(matches!(log.borrow()[0], TileEvent::Changed(t) if t.is_hovered()));
    }

    #[test]
    fn test_commit_marks_footprint() {
        let mut grid = small_grid();
        let shape = vec![
            HexTileCoordinate::ORIGIN,
            HexTileCoordinate::planar(1, 0),
            HexTileCoordinate::new(0, 0, 1),
        ];
        let anchor = HexTileCoordinate::planar(0, 1);

        assert!(grid.validate_and_commit_placement(anchor, &shape));
        assert!(grid.is_occupied(HexTileCoordinate::planar(0, 1)));
        assert!(grid.is_occupied(HexTileCoordinate::planar(1, 1)));
        assert!(grid.is_occupied(HexTileCoordinate::new(0, 1, 1)));
        assert_eq!(grid.tiles().filter(|t| t.is_occupied()).count(), 3);
    }

    #[test]
    fn test_commit_materializes_then_occupies_each_cell() {
        let mut grid = small_grid();
        let hovered = HexTileCoordinate::planar(1, 0);
        grid.set_hovered(hovered, true).unwrap();
        let log = record_events(&mut grid);
        let shape = vec![HexTileCoordinate::ORIGIN, HexTileCoordinate::planar(1, 0)];

        assert!(grid.validate_and_commit_placement(HexTileCoordinate::ORIGIN, &shape));

        let events = log.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], TileEvent::Created(HexTileData::new(HexTileCoordinate::ORIGIN)));
        assert!(matches!(events[1], TileEvent::Changed(t) if t.is_occupied()));
        assert!(matches!(
            events[2],
            TileEvent::Changed(t) if t.coordinate() == hovered && t.is_occupied() && t.is_hovered()
        ));
    }

    #[test]
    fn test_repeated_offset_occupies_once() {
        let mut grid = small_grid();
        let log = record_events(&mut grid);
        let shape = vec![HexTileCoordinate::ORIGIN, HexTileCoordinate::ORIGIN];

        assert!(grid.validate_and_commit_placement(HexTileCoordinate::ORIGIN, &shape));
        assert_eq!(grid.len(), 1);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut grid = small_grid();
        let single = vec![HexTileCoordinate::ORIGIN];
        assert!(grid.validate_and_commit_placement(HexTileCoordinate::planar(1, 0), &single));

        let log = record_events(&mut grid);
        let wide = vec![HexTileCoordinate::ORIGIN, HexTileCoordinate::planar(1, 0)];
        assert!(!grid.validate_and_commit_placement(HexTileCoordinate::ORIGIN, &wide));

        assert!(!grid.is_occupied(HexTileCoordinate::ORIGIN));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_commit_rejects_out_of_bounds_cell() {
        let mut grid = small_grid();
        let tall = vec![HexTileCoordinate::ORIGIN, HexTileCoordinate::new(0, 0, 1)];
        assert!(!grid.validate_and_commit_placement(HexTileCoordinate::new(0, 0, 1), &tall));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_commit_rejects_overflowing_anchor() {
        let mut grid = small_grid();
        let shape = vec![HexTileCoordinate::planar(1, 0)];
        let anchor = HexTileCoordinate::planar(i32::MAX, 0);
        assert!(!grid.validate_and_commit_placement(anchor, &shape));
    }

    #[test]
    fn test_preview_sets_and_clears_targets() {
        let mut grid = small_grid();
        let shape = vec![HexTileCoordinate::ORIGIN, HexTileCoordinate::planar(1, 0)];

        assert!(grid.preview_placement(HexTileCoordinate::ORIGIN, &shape));
        assert!(grid.get(HexTileCoordinate::planar(1, 0)).unwrap().is_build_target());

        // Half off the edge: in-bounds cell highlighted, placement reported invalid.
        assert!(!grid.preview_placement(HexTileCoordinate::planar(2, 0), &shape));
        assert!(!grid.get(HexTileCoordinate::ORIGIN).unwrap().is_build_target());
        assert!(grid.get(HexTileCoordinate::planar(2, 0)).unwrap().is_build_target());

        grid.clear_build_targets();
        assert!(grid.tiles().all(|t| !t.is_build_target()));
    }

    #[test]
    fn test_add_player_keeps_occupancy() {
        let mut grid = small_grid();
        let shape = vec![HexTileCoordinate::ORIGIN];
        grid.validate_and_commit_placement(HexTileCoordinate::ORIGIN, &shape);
        grid.add_player(7);
        assert!(grid.is_owned_by(1));
        assert!(grid.is_owned_by(7));
        assert!(grid.is_occupied(HexTileCoordinate::ORIGIN));
    }

    #[test]
    fn test_world_position_uses_origin() {
        let grid = HexGridData::new(
            GridId(3),
            1,
            GridConfig {
                origin: Vec3::new(10.0, 0.0, -5.0),
                ..GridConfig::default()
            },
        );
        let pos = grid.world_position(HexTileCoordinate::ORIGIN);
        assert!((pos - Vec3::new(10.0, 0.0, -5.0)).length() < 1e-6);
        assert_eq!(
            grid.coordinate_at(grid.world_position(HexTileCoordinate::new(1, 1, 2))),
            Some(HexTileCoordinate::new(1, 1, 2))
        );
        assert_eq!(grid.coordinate_at(Vec3::new(1000.0, 0.0, 0.0)), None);
    }
}

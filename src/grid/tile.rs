//! Per-cell state.

use serde::{Deserialize, Serialize};

use crate::grid::HexTileCoordinate;

/// Mutable flags for one cell of a grid.
///
/// Setters report whether the flag actually transitioned so the owning grid
/// can emit change events only on real changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTileData {
    coordinate: HexTileCoordinate,
    occupied: bool,
    hovered: bool,
    build_target: bool,
    mouse_target: bool,
}

impl HexTileData {
    /// Fresh, unoccupied cell.
    #[must_use]
    pub const fn new(coordinate: HexTileCoordinate) -> Self {
        Self {
            coordinate,
            occupied: false,
            hovered: false,
            build_target: false,
            mouse_target: false,
        }
    }

    /// Address of this cell.
    #[must_use]
    pub const fn coordinate(&self) -> HexTileCoordinate {
        self.coordinate
    }

    /// True while a committed building claims the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// True while the pointer hovers the cell.
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// True while the cell is part of a build preview footprint.
    #[must_use]
    pub const fn is_build_target(&self) -> bool {
        self.build_target
    }

    /// True while the cell is under the mouse ray.
    #[must_use]
    pub const fn is_mouse_target(&self) -> bool {
        self.mouse_target
    }

    /// Returns `true` if the value changed.
    pub fn set_occupied(&mut self, value: bool) -> bool {
        replace_flag(&mut self.occupied, value)
    }

    /// Returns `true` if the value changed.
    pub fn set_hovered(&mut self, value: bool) -> bool {
        replace_flag(&mut self.hovered, value)
    }

    /// Returns `true` if the value changed.
    pub fn set_build_target(&mut self, value: bool) -> bool {
        replace_flag(&mut self.build_target, value)
    }

    /// Returns `true` if the value changed.
    pub fn set_mouse_target(&mut self, value: bool) -> bool {
        replace_flag(&mut self.mouse_target, value)
    }
}

fn replace_flag(flag: &mut bool, value: bool) -> bool {
    std::mem::replace(flag, value) != value
}

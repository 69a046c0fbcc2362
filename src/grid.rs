//! Hex-prism spatial model.
//!
//! - Coordinates: axial (q, r) plus a vertical layer h
//! - Per-cell flags with change notification
//! - Per-territory grids with all-or-nothing footprint placement

mod coord;
mod hex_grid;
mod tile;

pub use coord::HexTileCoordinate;
pub use hex_grid::{Footprint, GridConfig, GridId, HexGridData, PlayerId, TileEvent};
pub use tile::HexTileData;

//! Hex-prism coordinates.
//!
//! Axial coordinates (q, r) address a cell on the hex plane, `h` is the
//! vertical layer. The implicit cube axis is s = -q - r.
//!
//! World conversion uses flat-topped hexagons:
//! - x = 1.5 · R · q
//! - z = √3 · R · (r + q/2)
//! - y = h · H
//!
//! where R is the tile circumradius and H the layer height.

use std::ops::{Add, Sub};

use glam::Vec3;
use serde::{Deserialize, Serialize};

const SQRT_3: f32 = 1.732_050_8;

/// Address of one hex-prism cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HexTileCoordinate {
    /// Axial column.
    pub q: i32,
    /// Axial row.
    pub r: i32,
    /// Vertical layer (0 = ground).
    pub h: i32,
}

impl HexTileCoordinate {
    /// The grid origin at ground level.
    pub const ORIGIN: Self = Self { q: 0, r: 0, h: 0 };

    /// The six planar neighbor offsets, starting east and turning counter-clockwise.
    pub const PLANAR_DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: 0, h: 0 },
        Self { q: 1, r: -1, h: 0 },
        Self { q: 0, r: -1, h: 0 },
        Self { q: -1, r: 0, h: 0 },
        Self { q: -1, r: 1, h: 0 },
        Self { q: 0, r: 1, h: 0 },
    ];

    /// Create a new coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32, h: i32) -> Self {
        Self { q, r, h }
    }

    /// Create a ground-level coordinate.
    #[must_use]
    pub const fn planar(q: i32, r: i32) -> Self {
        Self { q, r, h: 0 }
    }

    /// Implicit third cube axis.
    #[must_use]
    pub fn s(self) -> i64 {
        -i64::from(self.q) - i64::from(self.r)
    }

    /// Apply an offset, returning `None` on integer overflow.
    #[must_use]
    pub fn checked_add(self, offset: Self) -> Option<Self> {
        Some(Self {
            q: self.q.checked_add(offset.q)?,
            r: self.r.checked_add(offset.r)?,
            h: self.h.checked_add(offset.h)?,
        })
    }

    /// Remove an offset, returning `None` on integer overflow.
    #[must_use]
    pub fn checked_sub(self, offset: Self) -> Option<Self> {
        Some(Self {
            q: self.q.checked_sub(offset.q)?,
            r: self.r.checked_sub(offset.r)?,
            h: self.h.checked_sub(offset.h)?,
        })
    }

    /// Planar hex distance, ignoring layers.
    #[must_use]
    pub fn hex_distance(self, other: Self) -> u64 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        dq.unsigned_abs()
            .max(dr.unsigned_abs())
            .max((dq + dr).unsigned_abs())
    }

    /// The same-layer neighbors in [`Self::PLANAR_DIRECTIONS`] order.
    ///
    /// Neighbors past the `i32` range are skipped, so cells on the edge of the
    /// coordinate space yield fewer than six.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        Self::PLANAR_DIRECTIONS
            .into_iter()
            .filter_map(move |d| self.checked_add(d))
    }

    /// The cell stacked directly on top, if the layer index fits.
    #[must_use]
    pub fn above(self) -> Option<Self> {
        self.checked_add(Self::new(0, 0, 1))
    }

    /// The cell directly underneath, if the layer index fits.
    #[must_use]
    pub fn below(self) -> Option<Self> {
        self.checked_sub(Self::new(0, 0, 1))
    }

    /// World-space position of the cell's base center, relative to the grid origin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_world(self, tile_radius: f32, tile_height: f32) -> Vec3 {
        let q = self.q as f32;
        let r = self.r as f32;
        Vec3::new(
            tile_radius * 1.5 * q,
            self.h as f32 * tile_height,
            tile_radius * SQRT_3 * (r + q / 2.0),
        )
    }

    /// Nearest cell to a world-space position (relative to the grid origin).
    ///
    /// Uses cube rounding so positions near hex edges snap to the closest center.
    /// A zero `tile_height` maps everything onto layer 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world(pos: Vec3, tile_radius: f32, tile_height: f32) -> Self {
        let qf = pos.x / (tile_radius * 1.5);
        let rf = pos.z / (tile_radius * SQRT_3) - qf / 2.0;
        let sf = -qf - rf;

        let mut q = qf.round();
        let mut r = rf.round();
        let s = sf.round();

        let dq = (q - qf).abs();
        let dr = (r - rf).abs();
        let ds = (s - sf).abs();

        if dq > dr && dq > ds {
            q = -r - s;
        } else if dr > ds {
            r = -q - s;
        }

        let h = if tile_height > 0.0 {
            (pos.y / tile_height).round() as i32
        } else {
            0
        };

        Self::new(q as i32, r as i32, h)
    }
}

impl Add for HexTileCoordinate {
    type Output = Self;

    /// # Panics
    ///
    /// Overflow follows `i32` addition: a panic in debug builds. Use
    /// [`HexTileCoordinate::checked_add`] for untrusted offsets.
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
            h: self.h + other.h,
        }
    }
}

impl Sub for HexTileCoordinate {
    type Output = Self;

    /// # Panics
    ///
    /// Overflow follows `i32` subtraction: a panic in debug builds. Use
    /// [`HexTileCoordinate::checked_sub`] for untrusted offsets.
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
            h: self.h - other.h,
        }
    }
}

impl std::fmt::Display for HexTileCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.h)
    }
}

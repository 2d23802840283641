// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point types and the cell quantization shared by the grid.

use core::fmt::Debug;

/// Integer cell coordinates of a point. Unused axes are zero.
pub type CellCoord = [i64; 3];

/// A point that can be bucketed by [`HashGrid`][crate::HashGrid].
///
/// Implementations quantize each axis with [`cell_coord`] and pack the
/// resulting cell into a single `u64` bucket key.
pub trait GridPoint: Copy + Debug {
    /// Number of cells probed by a neighborhood query (`2^d`).
    const PROBES: u32;

    /// Quantize the point into cell coordinates.
    ///
    /// Each axis becomes `floor(coord * inv_cell_size - bias)`.
    fn cell(self, inv_cell_size: f32, bias: f32) -> CellCoord;

    /// Pack `cell` shifted by the probe pattern `probe` into a bucket key.
    ///
    /// Bit `i` of `probe` adds one to axis `i`. Probe `0` is the cell itself.
    fn pack(cell: CellCoord, probe: u32) -> u64;

    /// Squared Euclidean distance between two points.
    fn distance_squared(self, other: Self) -> f32;
}

/// Map a scalar coordinate to a cell coordinate along one axis.
///
/// Rounds towards -∞ and saturates at the `i64` range. `NaN` maps to cell 0.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Cell indices are intentionally i64; out-of-range values are saturated."
)]
#[inline]
pub fn cell_coord(value: f32, inv_cell_size: f32, bias: f32) -> i64 {
    let t = value * inv_cell_size - bias;
    let coord = t as i64;

    // Round towards -∞ (the cast above has already truncated).
    if t < 0.0 && (coord as f32) > t {
        coord.saturating_sub(1)
    } else {
        coord
    }
}

const MASK_32: u64 = (1 << 32) - 1;
const MASK_21: u64 = (1 << 21) - 1;

#[allow(
    clippy::cast_sign_loss,
    reason = "Negative cells wrap into the masked key space on purpose."
)]
#[inline]
fn field(coord: i64, probe: u32, axis: u32, mask: u64) -> u64 {
    let offset = i64::from((probe >> axis) & 1);
    (coord.wrapping_add(offset) as u64) & mask
}

/// A point in the plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2 {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point2 {
    /// Create a point from its coordinates.
    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point2 {
    #[inline]
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl GridPoint for Point2 {
    const PROBES: u32 = 4;

    #[inline]
    fn cell(self, inv_cell_size: f32, bias: f32) -> CellCoord {
        [
            cell_coord(self.x, inv_cell_size, bias),
            cell_coord(self.y, inv_cell_size, bias),
            0,
        ]
    }

    #[inline]
    fn pack(cell: CellCoord, probe: u32) -> u64 {
        (field(cell[0], probe, 0, MASK_32) << 32) | field(cell[1], probe, 1, MASK_32)
    }

    #[inline]
    fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A point in space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3 {
    /// First coordinate.
    pub x: f32,
    /// Second coordinate.
    pub y: f32,
    /// Third coordinate.
    pub z: f32,
}

impl Point3 {
    /// Create a point from its coordinates.
    #[inline(always)]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl GridPoint for Point3 {
    const PROBES: u32 = 8;

    #[inline]
    fn cell(self, inv_cell_size: f32, bias: f32) -> CellCoord {
        [
            cell_coord(self.x, inv_cell_size, bias),
            cell_coord(self.y, inv_cell_size, bias),
            cell_coord(self.z, inv_cell_size, bias),
        ]
    }

    #[inline]
    fn pack(cell: CellCoord, probe: u32) -> u64 {
        (field(cell[0], probe, 0, MASK_21) << 42)
            | (field(cell[1], probe, 1, MASK_21) << 21)
            | field(cell[2], probe, 2, MASK_21)
    }

    #[inline]
    fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reident Grid: a uniform-grid spatial hash over points.
//!
//! Reident Grid is the spatial index behind per-tick entity matching.
//!
//! - Insert points with a `Copy` key, typically a slot index.
//! - Enumerate the keys of points within a radius of a query point.
//! - Rebuild wholesale with [`HashGrid::clear`] and hand whole grids between
//!   buffers with [`HashGrid::swap`].
//!
//! Cells are quantized with `floor(coord / cell_size)` and packed into one
//! `u64` bucket key: two 32-bit halves for [`Point2`], three 21-bit fields for
//! [`Point3`]. A query shifts its own coordinates down by half a cell and then
//! probes that cell plus the `+1` neighbor on every axis (`2^d` cells). With a
//! cell size of twice the query radius this covers every point within the
//! radius, including points sitting exactly on a cell boundary.
//!
//! # Example
//!
//! ```rust
//! use reident_grid::{HashGrid2D, Point2};
//!
//! // Cells of 1.0 for queries of radius 0.5.
//! let mut grid: HashGrid2D<usize> = HashGrid2D::for_radius(0.5);
//! grid.insert(Point2::new(0.0, 0.0), 0);
//! grid.insert(Point2::new(10.0, 10.0), 1);
//!
//! let hits = grid.query_within(Point2::new(0.2, 0.1), 0.5);
//! assert_eq!(hits, vec![0]);
//! ```
//!
//! ## Float semantics
//!
//! Coordinates are assumed finite. Coordinates outside the packed range wrap
//! around the key space; the exact distance filter keeps results correct, at
//! the cost of sharing buckets with far away cells.

#![no_std]

extern crate alloc;

mod grid;
mod point;

pub use grid::{HashGrid, HashGrid2D, HashGrid3D};
pub use point::{CellCoord, GridPoint, Point2, Point3, cell_coord};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn rebuild_then_query() {
        let mut grid: HashGrid3D<u16> = HashGrid3D::for_radius(0.5);
        for i in 0..10_u16 {
            grid.insert(Point3::new(f32::from(i), 0.0, 0.0), i);
        }
        assert_eq!(grid.len(), 10);

        grid.clear();
        grid.insert(Point3::new(3.0, 0.0, 0.0), 42);
        let hits: Vec<_> = grid.query_within(Point3::new(3.0, 0.0, 0.1), 0.5);
        assert_eq!(hits, [42]);
    }
}

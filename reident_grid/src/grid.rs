// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid spatial hash over points.
//!
//! Points are bucketed into fixed-size cells keyed by their packed cell
//! coordinates. The grid is meant to be rebuilt wholesale: there is no
//! removal, only [`HashGrid::clear`].

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::point::{GridPoint, Point2, Point3};

/// Offset applied to query coordinates before quantization, in cells.
///
/// A query at `p` with radius `r <= cell_size / 2` only reaches cells between
/// `floor(p / s - 0.5)` and that cell plus one on every axis.
const QUERY_BIAS: f32 = 0.5;

/// Uniform grid spatial hash.
///
/// Each inserted point carries a `Copy` key that is handed back by queries.
/// Choose the cell size from the query radius you expect: a cell size of
/// twice the radius (see [`HashGrid::for_radius`]) guarantees that every
/// point within the radius is probed. Larger radii on the same grid may miss
/// points beyond the probed neighborhood.
pub struct HashGrid<P: GridPoint, K> {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<u64, Cell<P, K>>,
    len: usize,
}

struct Cell<P, K> {
    entries: SmallVec<[(P, K); 4]>,
}

impl<P, K> Default for Cell<P, K> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<P: GridPoint, K> Debug for HashGrid<P, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashGrid")
            .field("cell_size", &self.cell_size)
            .field("len", &self.len)
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl<P: GridPoint, K: Copy> HashGrid<P, K> {
    /// Create an empty grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "cell_size must be finite and strictly positive"
        );
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Create an empty grid sized for queries of `radius`.
    ///
    /// The cell size is `2 * radius`.
    pub fn for_radius(radius: f32) -> Self {
        Self::new(2.0 * radius)
    }

    /// Edge length of a cell.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of inserted points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the grid holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Insert a point with its key.
    ///
    /// Duplicate points and duplicate keys are both allowed.
    pub fn insert(&mut self, point: P, key: K) {
        let bucket = P::pack(point.cell(self.inv_cell_size, 0.0), 0);
        self.cells
            .entry(bucket)
            .or_default()
            .entries
            .push((point, key));
        self.len += 1;
    }

    /// Visit the key of every point at most `radius` away from `point`.
    ///
    /// A point queried at its own position is always found, even with a
    /// radius of zero. Only the `2^d` cells around the query are probed, so points further
    /// than half a cell away may be missed when `radius` exceeds
    /// `cell_size / 2`.
    pub fn visit_within<F: FnMut(K)>(&self, point: P, radius: f32, mut f: F) {
        if self.cells.is_empty() {
            return;
        }
        let r2 = radius * radius;
        let base = point.cell(self.inv_cell_size, QUERY_BIAS);
        for probe in 0..P::PROBES {
            let Some(cell) = self.cells.get(&P::pack(base, probe)) else {
                continue;
            };
            for &(p, key) in &cell.entries {
                if point.distance_squared(p) <= r2 {
                    f(key);
                }
            }
        }
    }

    /// Collect the keys found by [`visit_within`][Self::visit_within].
    pub fn query_within(&self, point: P, radius: f32) -> Vec<K> {
        let mut out = Vec::new();
        self.visit_within(point, radius, |k| out.push(k));
        out
    }

    /// Iterate over every inserted point and key, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (P, K)> + '_ {
        self.cells
            .values()
            .flat_map(|cell| cell.entries.iter().copied())
    }

    /// Remove every point. Cell allocations are released.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    /// Exchange the contents (including cell size) of two grids.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }
}

/// Grid over planar points.
pub type HashGrid2D<K> = HashGrid<Point2, K>;
/// Grid over spatial points.
pub type HashGrid3D<K> = HashGrid<Point3, K>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn insert_and_find_2d() {
        let mut grid: HashGrid2D<u32> = HashGrid2D::for_radius(0.5);
        grid.insert(Point2::new(0.0, 0.0), 1);
        grid.insert(Point2::new(0.3, 0.0), 2);
        grid.insert(Point2::new(5.0, 5.0), 3);
        assert_eq!(grid.len(), 3);

        let hits = sorted(grid.query_within(Point2::new(0.1, 0.0), 0.5));
        assert_eq!(hits, vec![1, 2]);

        let hits = grid.query_within(Point2::new(5.0, 5.2), 0.5);
        assert_eq!(hits, vec![3]);

        assert!(grid.query_within(Point2::new(2.5, 2.5), 0.5).is_empty());
    }

    #[test]
    fn radius_filter_includes_the_boundary() {
        let mut grid: HashGrid2D<u32> = HashGrid2D::new(4.0);
        grid.insert(Point2::new(1.0, 0.0), 7);
        assert!(grid.query_within(Point2::new(0.0, 0.0), 0.999).is_empty());
        assert_eq!(grid.query_within(Point2::new(0.0, 0.0), 1.0), vec![7]);
    }

    #[test]
    fn zero_radius_finds_the_point_itself() {
        let mut grid: HashGrid2D<u32> = HashGrid2D::new(1.0);
        grid.insert(Point2::new(0.3, 0.3), 7);
        grid.insert(Point2::new(0.3, 0.31), 8);
        assert_eq!(grid.query_within(Point2::new(0.3, 0.3), 0.0), vec![7]);

        let mut grid: HashGrid3D<u32> = HashGrid3D::new(1.0);
        grid.insert(Point3::new(-2.5, 0.0, 7.0), 1);
        assert_eq!(grid.query_within(Point3::new(-2.5, 0.0, 7.0), 0.0), vec![1]);
    }

    #[test]
    fn points_on_cell_boundaries_are_found_from_both_sides() {
        // Cell size 1: the point sits exactly on the boundary between cells 0 and 1.
        let mut grid: HashGrid2D<u32> = HashGrid2D::for_radius(0.5);
        grid.insert(Point2::new(1.0, 1.0), 9);
        for q in [
            Point2::new(0.7, 0.7),
            Point2::new(1.3, 1.3),
            Point2::new(0.7, 1.3),
            Point2::new(1.0, 1.0),
        ] {
            assert_eq!(grid.query_within(q, 0.5), vec![9], "query at {q:?}");
        }
    }

    #[test]
    fn negative_coordinates() {
        let mut grid: HashGrid3D<u32> = HashGrid3D::for_radius(1.0);
        grid.insert(Point3::new(-10.0, -0.5, -3.0), 4);
        grid.insert(Point3::new(-10.0, 0.5, -3.0), 5);
        let hits = sorted(grid.query_within(Point3::new(-10.0, 0.0, -3.0), 1.0));
        assert_eq!(hits, vec![4, 5]);
    }

    #[test]
    fn oversized_radius_may_miss_far_points() {
        let mut grid: HashGrid2D<u32> = HashGrid2D::new(1.0);
        grid.insert(Point2::new(3.0, 0.0), 1);
        // Within the radius, but three cells away from the probed neighborhood.
        assert!(grid.query_within(Point2::new(0.0, 0.0), 5.0).is_empty());
    }

    #[test]
    fn clear_and_swap() {
        let mut a: HashGrid2D<u32> = HashGrid2D::new(1.0);
        let mut b: HashGrid2D<u32> = HashGrid2D::new(2.0);
        a.insert(Point2::new(0.0, 0.0), 1);
        a.swap(&mut b);
        assert!(a.is_empty());
        assert!((a.cell_size() - 2.0).abs() < f32::EPSILON);
        assert_eq!(b.len(), 1);
        assert_eq!(b.query_within(Point2::new(0.0, 0.0), 0.5), vec![1]);

        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.occupied_cells(), 0);
        assert!(b.query_within(Point2::new(0.0, 0.0), 0.5).is_empty());
    }

    #[test]
    fn duplicate_points_are_all_reported() {
        let mut grid: HashGrid2D<u32> = HashGrid2D::new(1.0);
        grid.insert(Point2::new(0.2, 0.2), 1);
        grid.insert(Point2::new(0.2, 0.2), 2);
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(sorted(grid.query_within(Point2::new(0.2, 0.2), 0.1)), vec![1, 2]);
        assert_eq!(grid.iter().count(), 2);
    }
}

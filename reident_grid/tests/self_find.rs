// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests: every inserted point is found by a query at its own position.

use proptest::prelude::*;
use reident_grid::{HashGrid2D, HashGrid3D, Point2, Point3};

proptest! {
    #[test]
    fn every_point_finds_itself_2d(
        points in prop::collection::vec((-1.0e4_f32..1.0e4, -1.0e4_f32..1.0e4), 1..200),
        cell_size in 0.02_f32..10.0,
        radius in prop_oneof![Just(0.0_f32), 0.0_f32..5.0],
    ) {
        let mut grid: HashGrid2D<usize> = HashGrid2D::new(cell_size);
        for (i, &(x, y)) in points.iter().enumerate() {
            grid.insert(Point2::new(x, y), i);
        }
        for (i, &(x, y)) in points.iter().enumerate() {
            let hits = grid.query_within(Point2::new(x, y), radius);
            prop_assert!(hits.contains(&i), "point {} at ({}, {}) not found", i, x, y);
        }
    }

    #[test]
    fn every_point_finds_itself_3d(
        points in prop::collection::vec(
            (-1.0e3_f32..1.0e3, -1.0e3_f32..1.0e3, -1.0e3_f32..1.0e3),
            1..200,
        ),
        cell_size in 0.02_f32..10.0,
        radius in prop_oneof![Just(0.0_f32), 0.0_f32..5.0],
    ) {
        let mut grid: HashGrid3D<usize> = HashGrid3D::new(cell_size);
        for (i, &(x, y, z)) in points.iter().enumerate() {
            grid.insert(Point3::new(x, y, z), i);
        }
        for (i, &(x, y, z)) in points.iter().enumerate() {
            let hits = grid.query_within(Point3::new(x, y, z), radius);
            prop_assert!(hits.contains(&i), "point {} not found", i);
        }
    }

    #[test]
    fn results_respect_the_radius(
        points in prop::collection::vec((-50.0_f32..50.0, -50.0_f32..50.0), 1..100),
        qx in -50.0_f32..50.0,
        qy in -50.0_f32..50.0,
        radius in 0.1_f32..3.0,
    ) {
        let mut grid: HashGrid2D<usize> = HashGrid2D::for_radius(radius);
        for (i, &(x, y)) in points.iter().enumerate() {
            grid.insert(Point2::new(x, y), i);
        }
        let q = Point2::new(qx, qy);
        let hits = grid.query_within(q, radius);
        for &i in &hits {
            let (x, y) = points[i];
            let d2 = (x - qx) * (x - qx) + (y - qy) * (y - qy);
            prop_assert!(d2 <= radius * radius);
        }
        // With cells sized for the radius, nothing within reach is missed.
        let expected = points
            .iter()
            .filter(|&&(x, y)| (x - qx) * (x - qx) + (y - qy) * (y - qy) < radius * radius * 0.98)
            .count();
        prop_assert!(hits.len() >= expected);
    }
}

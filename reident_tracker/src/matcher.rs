// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-track lookup by position, orientation and category.

use core::ops::Deref;

use glam::{Mat4, Quat, Vec3};
use reident_grid::Point2;

use crate::category::Category;
use crate::config::TrackerConfig;
use crate::frame::TrackedFrame;
use crate::slot::TrackSlot;

/// Angular distance between two orientations, `1 - |q1 · q2|`.
///
/// Zero for equal rotations (either sign), one for orthogonal quaternions.
#[inline]
pub fn angular_distance(a: Quat, b: Quat) -> f32 {
    1.0 - a.dot(b).abs()
}

/// What a consumer observed and how strictly it must match a track.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MatchQuery {
    /// Observed world position.
    pub position: Vec3,
    /// Observed world orientation.
    pub orientation: Quat,
    /// Tracks must be strictly closer than this.
    ///
    /// Candidates come from the frame's planar index, which reaches at most
    /// half a cell ([`TrackerConfig::tracking_radius`]) in the plane. A
    /// larger radius only widens the vertical reach.
    pub radius: f32,
    /// Tracks must have a strictly smaller [`angular_distance`].
    pub angular_tolerance: f32,
    /// Category filter, see [`Category::accepts`].
    pub category: Category,
}

impl MatchQuery {
    /// Query with the configured default radius and tolerance.
    pub fn new(
        config: &TrackerConfig,
        position: Vec3,
        orientation: Quat,
        category: Category,
    ) -> Self {
        Self {
            position,
            orientation,
            radius: config.tracking_radius,
            angular_tolerance: config.angular_tolerance,
            category,
        }
    }

    /// Tight match against any category.
    pub fn untyped(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            radius: 0.01,
            angular_tolerance: 0.01,
            category: Category::Unknown,
        }
    }

    /// Loose match against pedestrians, ignoring orientation.
    ///
    /// Bone transforms drift from the root transform, so pedestrians are
    /// matched within a metre and with any orientation. The planar reach is
    /// still that of the frame's index.
    pub fn pedestrian(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            radius: 1.0,
            angular_tolerance: 10.0,
            category: Category::Pedestrian,
        }
    }

    /// Tight match against vehicles.
    pub fn vehicle(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            radius: 0.1,
            angular_tolerance: 0.1,
            category: Category::Vehicle,
        }
    }

    /// Position and orientation of a row-major world matrix whose last row
    /// holds the translation.
    ///
    /// Scale is removed from the rotation block before it is converted.
    pub fn transform_from_world_matrix(rows: &[[f32; 4]; 4]) -> (Vec3, Quat) {
        // Row-major with a translation row reads as column-major in glam.
        let (_, rotation, translation) =
            Mat4::from_cols_array_2d(rows).to_scale_rotation_translation();
        (translation, rotation)
    }

    /// Replace the position and orientation with those of a world matrix.
    ///
    /// See [`transform_from_world_matrix`](Self::transform_from_world_matrix).
    #[must_use]
    pub fn from_world_matrix(mut self, rows: &[[f32; 4]; 4]) -> Self {
        (self.position, self.orientation) = Self::transform_from_world_matrix(rows);
        self
    }

    /// Whether `slot` satisfies every bound of the query.
    ///
    /// Returns the squared distance when it does.
    pub fn accepts(&self, slot: &TrackSlot) -> Option<f32> {
        if !slot.is_occupied() || !self.category.accepts(slot.category()) {
            return None;
        }
        let d2 = self.position.distance_squared(slot.position());
        (d2 < self.radius * self.radius
            && angular_distance(self.orientation, slot.orientation()) < self.angular_tolerance)
            .then_some(d2)
    }
}

/// A matched track.
#[derive(Copy, Clone, Debug)]
pub struct TrackRef<'a> {
    index: usize,
    distance_squared: f32,
    slot: &'a TrackSlot,
}

impl<'a> TrackRef<'a> {
    /// Slot number in the table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Squared distance between the query and the track.
    #[inline]
    pub fn distance_squared(&self) -> f32 {
        self.distance_squared
    }

    /// The matched slot.
    #[inline]
    pub fn slot(&self) -> &'a TrackSlot {
        self.slot
    }
}

impl Deref for TrackRef<'_> {
    type Target = TrackSlot;

    fn deref(&self) -> &TrackSlot {
        self.slot
    }
}

impl TrackedFrame {
    /// Slot number and squared distance of the closest track satisfying
    /// `query`.
    ///
    /// Ties keep the candidate the index enumerates first.
    pub fn find_index(&self, query: &MatchQuery) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        let plane = Point2::new(query.position.x, query.position.y);
        // The probed cells only cover half a cell around the query.
        let reach = query.radius.min(0.5 * self.index.cell_size());
        self.index.visit_within(plane, reach, |index| {
            let Some(d2) = query.accepts(&self.slots[index]) else {
                return;
            };
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((index, d2));
            }
        });
        best
    }

    /// The closest track satisfying `query`.
    pub fn find(&self, query: &MatchQuery) -> Option<TrackRef<'_>> {
        self.find_index(query).map(|(index, distance_squared)| TrackRef {
            index,
            distance_squared,
            slot: &self.slots[index],
        })
    }

    /// The closest track satisfying `query`, mutably, to reach its payload.
    pub fn find_mut(&mut self, query: &MatchQuery) -> Option<&mut TrackSlot> {
        let (index, _) = self.find_index(query)?;
        self.slots.get_mut(index)
    }
}

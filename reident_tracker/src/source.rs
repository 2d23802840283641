// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The world the sampler reads from.

use glam::{Quat, Vec3};

use crate::category::EntityKind;
use crate::info::FrameInfo;

/// Read access to the host's live entities.
///
/// Every method may be called many times per tick. Reads that fail degrade:
/// an entity whose transform is unavailable is skipped for the tick.
pub trait WorldSource {
    /// Append the handle of every live entity of `kind` to `out`.
    fn collect(&mut self, kind: EntityKind, out: &mut Vec<u32>);

    /// World position and orientation of an entity.
    fn transform(&mut self, handle: u32) -> Option<(Vec3, Quat)>;

    /// World position of a pedestrian's head.
    fn head_position(&mut self, handle: u32) -> Option<Vec3>;

    /// Handle of the entity the player controls.
    fn controlled_entity(&mut self) -> Option<u32>;

    /// Player status for the current tick.
    fn player_status(&mut self) -> FrameInfo;
}

impl<S: WorldSource + ?Sized> WorldSource for &mut S {
    fn collect(&mut self, kind: EntityKind, out: &mut Vec<u32>) {
        (**self).collect(kind, out);
    }

    fn transform(&mut self, handle: u32) -> Option<(Vec3, Quat)> {
        (**self).transform(handle)
    }

    fn head_position(&mut self, handle: u32) -> Option<Vec3> {
        (**self).head_position(handle)
    }

    fn controlled_entity(&mut self) -> Option<u32> {
        (**self).controlled_entity()
    }

    fn player_status(&mut self) -> FrameInfo {
        (**self).player_status()
    }
}

/// An entity held by a [`SceneSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneEntity {
    /// Transient host handle.
    pub handle: u32,
    /// Which list the entity is enumerated in.
    pub kind: EntityKind,
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
    /// Head position, for pedestrians.
    pub head: Option<Vec3>,
}

impl SceneEntity {
    /// An entity with the identity orientation and no head.
    pub fn new(handle: u32, kind: EntityKind, position: Vec3) -> Self {
        Self {
            handle,
            kind,
            position,
            orientation: Quat::IDENTITY,
            head: None,
        }
    }

    /// A pedestrian whose head sits `height` above its position.
    pub fn pedestrian(handle: u32, position: Vec3, height: f32) -> Self {
        Self {
            head: Some(position + Vec3::Z * height),
            ..Self::new(handle, EntityKind::Pedestrian, position)
        }
    }

    /// Replace the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }
}

/// In-memory [`WorldSource`].
///
/// Entities are enumerated in insertion order within each kind.
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    entities: Vec<SceneEntity>,
    controlled: Option<u32>,
    status: FrameInfo,
}

impl SceneSnapshot {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entity, keyed by handle.
    pub fn insert(&mut self, entity: SceneEntity) -> &mut Self {
        match self.get_mut(entity.handle) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
        self
    }

    /// Remove an entity, returning it.
    pub fn remove(&mut self, handle: u32) -> Option<SceneEntity> {
        let at = self.entities.iter().position(|e| e.handle == handle)?;
        if self.controlled == Some(handle) {
            self.controlled = None;
        }
        Some(self.entities.remove(at))
    }

    /// Borrow an entity.
    pub fn get(&self, handle: u32) -> Option<&SceneEntity> {
        self.entities.iter().find(|e| e.handle == handle)
    }

    /// Mutably borrow an entity, typically to move it.
    pub fn get_mut(&mut self, handle: u32) -> Option<&mut SceneEntity> {
        self.entities.iter_mut().find(|e| e.handle == handle)
    }

    /// Every entity, in insertion order.
    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    /// Mark the entity the player controls.
    pub fn set_controlled(&mut self, handle: Option<u32>) -> &mut Self {
        self.controlled = handle;
        self
    }

    /// Player status reported for every tick.
    pub fn status_mut(&mut self) -> &mut FrameInfo {
        &mut self.status
    }

    /// Remove every entity and forget the controlled one.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.controlled = None;
    }
}

impl WorldSource for SceneSnapshot {
    fn collect(&mut self, kind: EntityKind, out: &mut Vec<u32>) {
        out.extend(
            self.entities
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.handle),
        );
    }

    fn transform(&mut self, handle: u32) -> Option<(Vec3, Quat)> {
        self.get(handle).map(|e| (e.position, e.orientation))
    }

    fn head_position(&mut self, handle: u32) -> Option<Vec3> {
        self.get(handle).and_then(|e| e.head)
    }

    fn controlled_entity(&mut self) -> Option<u32> {
        self.controlled
    }

    fn player_status(&mut self) -> FrameInfo {
        self.status
    }
}

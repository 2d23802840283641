// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A slot table with its planar index and player status.

use glam::{Quat, Vec3};
use reident_grid::{HashGrid2D, Point2};

use crate::category::Identity;
use crate::config::TrackerConfig;
use crate::info::FrameInfo;
use crate::slot::SlotTable;

/// One sampled frame: track slots, a planar index over their positions and
/// the player status of the same tick.
///
/// The index is keyed by slot number and positioned at each slot's `(x, y)`.
/// Matching refines candidates with the full 3-D position the slot holds.
#[derive(Debug)]
pub struct TrackedFrame {
    pub(crate) slots: SlotTable,
    pub(crate) index: HashGrid2D<usize>,
    pub(crate) info: FrameInfo,
}

impl TrackedFrame {
    /// Create an empty frame sized by `config`.
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            slots: SlotTable::new(config.capacity, config.handle_shift),
            index: HashGrid2D::new(config.cell_size()),
            info: FrameInfo::default(),
        }
    }

    /// The slot table.
    #[inline]
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// The slot table, mutably, for attaching payloads.
    #[inline]
    pub fn slots_mut(&mut self) -> &mut SlotTable {
        &mut self.slots
    }

    /// The planar index over occupied slots.
    #[inline]
    pub fn index(&self) -> &HashGrid2D<usize> {
        &self.index
    }

    /// Player status sampled with this frame.
    #[inline]
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Empty every slot and the index before a rebuild.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Write an occupant into `slot` and index it.
    ///
    /// Returns the identity it displaced this tick, if any. A displaced
    /// occupant's index entry stays behind and resolves to the new occupant.
    pub(crate) fn place(
        &mut self,
        slot: usize,
        identity: Identity,
        position: Vec3,
        orientation: Quat,
    ) -> Option<Identity> {
        let previous = self.slots.write(slot, identity, position, orientation);
        self.index.insert(Point2::new(position.x, position.y), slot);
        previous
    }
}

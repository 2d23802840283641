// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rebuilds a frame from the world once per tick.

use glam::Quat;
use tracing::warn;

use crate::category::{Category, EntityKind, Identity};
use crate::config::TrackerConfig;
use crate::frame::TrackedFrame;
use crate::source::WorldSource;

/// Head slots carry no orientation.
const HEAD_ORIENTATION: Quat = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);

/// Counters for one [`FrameSampler::sample`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleStats {
    /// Entities written to a primary slot.
    pub entities: usize,
    /// Head slots written.
    pub heads: usize,
    /// Writes that displaced an occupant from earlier in the same tick.
    pub collisions: usize,
    /// Entities skipped because their transform could not be read.
    pub skipped: usize,
}

/// Writes every live entity of a [`WorldSource`] into a [`TrackedFrame`].
#[derive(Debug)]
pub struct FrameSampler {
    track_heads: bool,
    handles: Vec<u32>,
}

impl FrameSampler {
    /// Create a sampler configured by `config`.
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            track_heads: config.track_heads,
            handles: Vec::new(),
        }
    }

    /// Replace the contents of `frame` with the current state of `source`.
    ///
    /// Kinds are walked in [`EntityKind::ALL`] order, so on a collision the
    /// entity enumerated last keeps the slot.
    pub fn sample<S: WorldSource + ?Sized>(
        &mut self,
        source: &mut S,
        frame: &mut TrackedFrame,
    ) -> SampleStats {
        let mut stats = SampleStats::default();
        frame.reset();
        let controlled = source.controlled_entity();

        for kind in EntityKind::ALL {
            self.handles.clear();
            source.collect(kind, &mut self.handles);
            for &handle in &self.handles {
                let Some((position, orientation)) = source.transform(handle) else {
                    stats.skipped += 1;
                    continue;
                };
                let category = if controlled == Some(handle) {
                    Category::Player
                } else {
                    kind.category()
                };
                // Sampled categories are never `Unknown`, so this always encodes.
                let Some(identity) = Identity::new(category, handle) else {
                    continue;
                };

                let primary = frame.slots.primary_slot(handle);
                if let Some(previous) = frame.place(primary, identity, position, orientation) {
                    stats.collisions += 1;
                    warn!(slot = primary, ?previous, incoming = ?identity, "slot collision");
                }
                stats.entities += 1;

                if !(self.track_heads && kind == EntityKind::Pedestrian) {
                    continue;
                }
                let Some(head) = source.head_position(handle) else {
                    continue;
                };
                let slot = frame.slots.head_slot(primary);
                if let Some(previous) = frame.place(slot, identity, head, HEAD_ORIENTATION) {
                    stats.collisions += 1;
                    warn!(slot, ?previous, incoming = ?identity, "head slot collision");
                }
                stats.heads += 1;
            }
        }

        frame.info = source.player_status();
        stats
    }
}

// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered handoff between the sampling producer and the consumer.
//!
//! The producer rebuilds a shared "current" frame under a lock every tick.
//! The consumer owns a "returned" frame and, when it asks for the latest
//! state, merges the current frame into it slot by slot. Slots whose identity
//! did not change keep their payload and grow older; every other slot starts
//! over.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::TrackerConfig;
use crate::error::ConfigError;
use crate::frame::TrackedFrame;
use crate::sampler::{FrameSampler, SampleStats};
use crate::slot::TrackSlot;
use crate::source::WorldSource;

#[derive(Debug)]
struct Current {
    frame: TrackedFrame,
    tick: u64,
}

/// Build the producer and consumer halves of a tracker.
///
/// ```
/// use reident_tracker::glam::{Quat, Vec3};
/// use reident_tracker::{EntityKind, MatchQuery, SceneEntity, SceneSnapshot, TrackerConfig};
///
/// let (mut producer, mut handoff) = reident_tracker::tracker(&TrackerConfig::default())?;
/// let mut scene = SceneSnapshot::new();
/// scene.insert(SceneEntity::new(0x100, EntityKind::Vehicle, Vec3::ZERO));
///
/// assert!(handoff.pull_latest().is_none());
/// producer.tick(&mut scene);
/// let frame = handoff.pull_latest().unwrap();
/// let track = frame.find(&MatchQuery::vehicle(Vec3::ZERO, Quat::IDENTITY)).unwrap();
/// assert_eq!(track.identity().unwrap().handle(), 0x100);
/// # Ok::<(), reident_tracker::ConfigError>(())
/// ```
pub fn tracker(config: &TrackerConfig) -> Result<(FrameProducer, FrameHandoff), ConfigError> {
    config.validate()?;
    let shared = Arc::new(Mutex::new(Current {
        frame: TrackedFrame::new(config),
        tick: 0,
    }));
    let producer = FrameProducer {
        shared: Arc::clone(&shared),
        sampler: FrameSampler::new(config),
    };
    let handoff = FrameHandoff {
        shared,
        returned: TrackedFrame::new(config),
        returned_tick: 0,
        last_merge: None,
    };
    Ok((producer, handoff))
}

/// Producer half: samples the world into the shared current frame.
#[derive(Debug)]
pub struct FrameProducer {
    shared: Arc<Mutex<Current>>,
    sampler: FrameSampler,
}

impl FrameProducer {
    /// Rebuild the current frame from `source` and advance the tick.
    ///
    /// The lock is held for the whole rebuild.
    pub fn tick<S: WorldSource + ?Sized>(&mut self, source: &mut S) -> SampleStats {
        let mut current = self.shared.lock();
        let stats = self.sampler.sample(source, &mut current.frame);
        current.tick += 1;
        debug!(
            tick = current.tick,
            entities = stats.entities,
            heads = stats.heads,
            collisions = stats.collisions,
            skipped = stats.skipped,
            "sampled tick"
        );
        stats
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.shared.lock().tick
    }
}

/// Slot counts of one merge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Ticks elapsed since the previous merge.
    pub elapsed: u64,
    /// Occupied slots whose identity was unchanged.
    pub continued: usize,
    /// Slots taken over by a new identity.
    pub replaced: usize,
    /// Slots whose occupant disappeared.
    pub vanished: usize,
    /// Payloads dropped by the merge.
    pub released: usize,
}

/// Consumer half: owns the stable frame handed out to the consumer.
#[derive(Debug)]
pub struct FrameHandoff {
    shared: Arc<Mutex<Current>>,
    returned: TrackedFrame,
    returned_tick: u64,
    last_merge: Option<MergeStats>,
}

impl FrameHandoff {
    /// Merge the producer's latest frame and return it.
    ///
    /// Returns `None` until the producer has completed a tick. When no tick
    /// completed since the last call, the frame is returned untouched.
    pub fn pull_latest(&mut self) -> Option<&mut TrackedFrame> {
        {
            let mut current = self.shared.lock();
            if current.tick == 0 {
                return None;
            }
            let elapsed = current.tick - self.returned_tick;
            if elapsed > 0 {
                let stats = merge(&mut self.returned, &mut current.frame, elapsed);
                trace!(
                    tick = current.tick,
                    elapsed,
                    continued = stats.continued,
                    replaced = stats.replaced,
                    vanished = stats.vanished,
                    released = stats.released,
                    "merged frame"
                );
                self.returned_tick = current.tick;
                self.last_merge = Some(stats);
            }
        }
        Some(&mut self.returned)
    }

    /// The frame handed out by the last [`pull_latest`](Self::pull_latest),
    /// without merging.
    pub fn frame(&self) -> Option<&TrackedFrame> {
        (self.returned_tick > 0).then_some(&self.returned)
    }

    /// Producer tick the returned frame reflects, zero before the first merge.
    pub fn tick(&self) -> u64 {
        self.returned_tick
    }

    /// Statistics of the most recent merge.
    pub fn last_merge(&self) -> Option<MergeStats> {
        self.last_merge
    }
}

/// Reconcile `current` into `returned`, then hand `current`'s index over.
fn merge(returned: &mut TrackedFrame, current: &mut TrackedFrame, elapsed: u64) -> MergeStats {
    let mut stats = MergeStats {
        elapsed,
        ..MergeStats::default()
    };
    let delta = u32::try_from(elapsed).unwrap_or(u32::MAX);

    for (index, (kept, fresh)) in returned
        .slots
        .iter_mut()
        .zip(current.slots.iter_mut())
        .enumerate()
    {
        if kept.identity == fresh.identity {
            let age = kept.age.saturating_add(delta);
            kept.age = age;
            fresh.age = age;
            kept.position = fresh.position;
            kept.orientation = fresh.orientation;
            if kept.identity.is_some() {
                stats.continued += 1;
            } else {
                // A payload left on an empty slot has no identity to follow.
                release(kept, index, &mut stats);
            }
            continue;
        }

        release(kept, index, &mut stats);
        if fresh.identity.is_some() {
            *kept = TrackSlot {
                identity: fresh.identity,
                age: fresh.age,
                position: fresh.position,
                orientation: fresh.orientation,
                payload: None,
            };
            stats.replaced += 1;
        } else {
            kept.identity = None;
            stats.vanished += 1;
        }
    }

    returned.index.swap(&mut current.index);
    returned.info = current.info;
    stats
}

fn release(slot: &mut TrackSlot, index: usize, stats: &mut MergeStats) {
    if let Some(payload) = slot.payload.take() {
        trace!(slot = index, identity = ?slot.identity, ?payload, "released payload");
        stats.released += 1;
    }
}

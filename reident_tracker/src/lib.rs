// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reident Tracker: frame-to-frame re-identification of world entities.
//!
//! A host world (a game, a simulation) exposes live entities under transient
//! handles. A consumer observing the world from elsewhere, typically a render
//! hook, only sees positions and orientations. This crate lets the consumer
//! recover which entity it is looking at, how long that entity has been
//! continuously present, and keep its own per-entity state alive for as long
//! as the entity is.
//!
//! - A [`FrameProducer`] samples a [`WorldSource`] once per tick into a shared
//!   "current" [`TrackedFrame`]: one [`TrackSlot`] per entity, addressed by a
//!   hash of its handle, plus a planar spatial index.
//! - A [`FrameHandoff`] merges that frame into the consumer's stable frame on
//!   demand. Slots keep their [`Payload`] and grow older while their identity
//!   is unchanged and start over otherwise.
//! - [`TrackedFrame::find`] returns the closest track satisfying a
//!   [`MatchQuery`].
//!
//! [`tracker`] builds both halves; [`SamplerThread`] runs the producer on its
//! own thread.
//!
//! # Example
//!
//! ```rust
//! use reident_tracker::glam::{Quat, Vec3};
//! use reident_tracker::{EntityKind, MatchQuery, SceneEntity, SceneSnapshot, TrackerConfig};
//!
//! let (mut producer, mut handoff) = reident_tracker::tracker(&TrackerConfig::default())?;
//! let mut scene = SceneSnapshot::new();
//! scene.insert(SceneEntity::pedestrian(0x200, Vec3::new(3.0, 4.0, 0.0), 1.7));
//!
//! for _ in 0..3 {
//!     producer.tick(&mut scene);
//! }
//! let frame = handoff.pull_latest().expect("the producer ticked");
//! let query = MatchQuery::pedestrian(Vec3::new(3.0, 4.2, 0.0), Quat::IDENTITY);
//! let track = frame.find_mut(&query).expect("the pedestrian is tracked");
//! *track.payload_or_insert_with(|| 0_u32) += 1;
//! # Ok::<(), reident_tracker::ConfigError>(())
//! ```
//!
//! Slots are lossy: two entities whose handles hash to the same slot in one
//! tick collide and the later one wins. Collisions are logged with
//! `tracing` and counted in [`SampleStats`].

mod category;
mod config;
mod error;
mod frame;
mod handoff;
mod info;
mod matcher;
mod payload;
mod runtime;
mod sampler;
mod slot;
mod source;

pub use glam;

pub use category::{Category, EntityKind, Identity};
pub use config::TrackerConfig;
pub use error::{ConfigError, SamplerError};
pub use frame::TrackedFrame;
pub use handoff::{FrameHandoff, FrameProducer, MergeStats, tracker};
pub use info::{FrameInfo, Locomotion};
pub use matcher::{MatchQuery, TrackRef, angular_distance};
pub use payload::{Advance, Payload, TrackHistory};
pub use runtime::{SamplerHandle, SamplerThread, TickPort, YieldNow};
pub use sampler::{FrameSampler, SampleStats};
pub use slot::{SlotTable, TrackSlot};
pub use source::{SceneEntity, SceneSnapshot, WorldSource};

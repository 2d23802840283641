// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Crowd tracking.
//!
//! Run a sampler thread over a small moving scene, re-identify what a
//! renderer would observe each frame, and keep a per-track payload alive
//! across frames. A vehicle drives off halfway through and its payload is
//! released.
//!
//! Run:
//! - `cargo run -p reident_demos --example crowd_tracking`
//! - `RUST_LOG=reident_tracker=trace cargo run -p reident_demos --example crowd_tracking`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use reident_tracker::glam::{Quat, Vec3};
use reident_tracker::{
    Advance, EntityKind, FrameHandoff, FrameInfo, Locomotion, MatchQuery, SamplerThread,
    SceneEntity, SceneSnapshot, TrackHistory, TrackerConfig, WorldSource, tracker,
};
use tracing_subscriber::EnvFilter;

const PLAYER: u32 = 0x0101;
const VEHICLE_LEAVING: u32 = 0x2001;

/// The host world, shared with the sampler thread.
#[derive(Clone, Default)]
struct World(Arc<Mutex<SceneSnapshot>>);

impl WorldSource for World {
    fn collect(&mut self, kind: EntityKind, out: &mut Vec<u32>) {
        self.0.lock().collect(kind, out);
    }

    fn transform(&mut self, handle: u32) -> Option<(Vec3, Quat)> {
        self.0.lock().transform(handle)
    }

    fn head_position(&mut self, handle: u32) -> Option<Vec3> {
        self.0.lock().head_position(handle)
    }

    fn controlled_entity(&mut self) -> Option<u32> {
        self.0.lock().controlled_entity()
    }

    fn player_status(&mut self) -> FrameInfo {
        self.0.lock().player_status()
    }
}

/// What the renderer keeps about a track between frames.
#[derive(Debug)]
struct Sighting {
    first_frame: u64,
    frames: u32,
    /// Last observed position per attachment id; 0 is the body.
    positions: TrackHistory<Vec3>,
}

fn populate(scene: &mut SceneSnapshot) {
    for i in 0..6_u32 {
        let handle = 0x0101 + (i << 8);
        let angle = i as f32;
        let position = Vec3::new(angle.cos() * 8.0, angle.sin() * 8.0, 0.0);
        scene.insert(SceneEntity::pedestrian(handle, position, 1.75));
    }
    for i in 0..3_u32 {
        let handle = 0x2001 + (i << 8);
        let position = Vec3::new(-20.0 + 6.0 * i as f32, -12.0, 0.5);
        scene.insert(SceneEntity::new(handle, EntityKind::Vehicle, position));
    }
    scene.set_controlled(Some(PLAYER));
    let status = scene.status_mut();
    status.locomotion = Locomotion::ON_FOOT;
    status.money = 250;
    status.time_since_player_hit_vehicle = -1;
    status.time_since_player_hit_ped = -1;
    status.time_since_player_drove_on_pavement = -1;
    status.time_since_player_drove_against_traffic = -1;
}

/// Pedestrians walk around the origin; vehicles stay parked.
fn step(scene: &mut SceneSnapshot, frame: u64) {
    let turn = Quat::from_rotation_z(0.01);
    let handles: Vec<u32> = scene
        .entities()
        .iter()
        .filter(|e| e.kind == EntityKind::Pedestrian)
        .map(|e| e.handle)
        .collect();
    for handle in handles {
        if let Some(ped) = scene.get_mut(handle) {
            ped.position = turn * ped.position;
            ped.orientation = turn * ped.orientation;
            ped.head = Some(ped.position + Vec3::Z * 1.75);
        }
    }
    if frame == 30 {
        scene.remove(VEHICLE_LEAVING);
    }
    if let Some(player) = scene.get(PLAYER).copied() {
        let status = scene.status_mut();
        status.position = player.position;
        status.forward_vector = player.orientation * Vec3::Y;
    }
}

/// Wait until the producer has sampled a full tick after the last change.
fn wait_for_fresh_tick(handoff: &mut FrameHandoff) {
    let seen = handoff.tick();
    while handoff.pull_latest().is_none() || handoff.tick() < seen + 2 {
        thread::sleep(Duration::from_millis(1));
    }
}

fn observe(handoff: &mut FrameHandoff, observed: &[SceneEntity], frame_no: u64) -> usize {
    let Some(frame) = handoff.pull_latest() else {
        return 0;
    };
    let mut matched = 0;
    for entity in observed {
        let query = match entity.kind {
            EntityKind::Vehicle => MatchQuery::vehicle(entity.position, entity.orientation),
            _ => MatchQuery::pedestrian(entity.position, entity.orientation),
        };
        let Some(slot) = frame.find_mut(&query) else {
            continue;
        };
        matched += 1;
        let sighting = slot.payload_or_insert_with(|| Sighting {
            first_frame: frame_no,
            frames: 0,
            positions: TrackHistory::new(),
        });
        sighting.frames += 1;
        if sighting.positions.advance(frame_no) == Advance::Restarted && frame_no > 0 {
            println!("frame {frame_no:>2}: track of {:#06x} restarted", entity.handle);
        }
        sighting.positions.record(0, entity.position);
    }
    matched
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TrackerConfig::default();
    let (producer, mut handoff) = tracker(&config).expect("default configuration is valid");

    let world = World::default();
    populate(&mut world.0.lock());

    let host_tick = || thread::sleep(Duration::from_millis(2));
    let sampler = SamplerThread::spawn(producer, world.clone(), host_tick)
        .expect("failed to spawn the sampler thread");

    for frame_no in 0..60 {
        step(&mut world.0.lock(), frame_no);
        wait_for_fresh_tick(&mut handoff);
        let observed = world.0.lock().entities().to_vec();
        let matched = observe(&mut handoff, &observed, frame_no);
        if frame_no % 10 == 0 {
            println!("frame {frame_no:>2}: matched {matched}/{}", observed.len());
        }
    }

    let producer = sampler.join().expect("sampler thread panicked");
    println!("sampled {} ticks", producer.ticks());

    if let Some(frame) = handoff.frame() {
        for (index, slot) in frame.slots().occupied() {
            let Some(sighting) = slot.payload::<Sighting>() else {
                continue;
            };
            println!(
                "slot {index:>4}: {:?} age {:>4} seen {} frames since frame {}",
                slot.identity(),
                slot.age(),
                sighting.frames,
                sighting.first_frame,
            );
        }
        match frame.info().to_json() {
            Ok(json) => println!("player: {json}"),
            Err(err) => eprintln!("failed to serialize player status: {err}"),
        }
    }
    if let Some(stats) = handoff.last_merge() {
        println!("last merge: {stats:?}");
    }
}

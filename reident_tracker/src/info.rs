// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick player status carried alongside the track table.

use bitflags::bitflags;
use glam::Vec3;
use serde::Serialize;

bitflags! {
    /// How the player is getting around.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Locomotion: u8 {
        /// Walking, running or standing.
        const ON_FOOT = 1 << 0;
        /// Seated in any vehicle.
        const IN_VEHICLE = 1 << 1;
        /// Climbing into a vehicle.
        const ENTERING_VEHICLE = 1 << 2;
        /// Riding a bike or motorbike.
        const ON_BIKE = 1 << 3;
    }
}

impl Locomotion {
    /// The vehicle state as exported: 0 none, 1 in a vehicle, 2 getting in,
    /// 3 both.
    pub fn vehicle_code(self) -> i32 {
        2 * i32::from(self.contains(Self::ENTERING_VEHICLE))
            + i32::from(self.contains(Self::IN_VEHICLE))
    }
}

/// Player status snapshot sampled once per tick.
///
/// Timers count milliseconds since the event; hosts report a negative value
/// when the event never happened.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(into = "FrameInfoRecord")]
pub struct FrameInfo {
    /// Time since the player last hit a vehicle.
    pub time_since_player_hit_vehicle: i32,
    /// Time since the player last hit a pedestrian.
    pub time_since_player_hit_ped: i32,
    /// Time since the player last drove on the pavement.
    pub time_since_player_drove_on_pavement: i32,
    /// Time since the player last drove against traffic.
    pub time_since_player_drove_against_traffic: i32,
    /// Whether the player is dead or dying.
    pub dead: bool,
    /// World position of the player.
    pub position: Vec3,
    /// Unit forward vector of the player.
    pub forward_vector: Vec3,
    /// Heading in degrees.
    pub heading: f32,
    /// Locomotion state.
    pub locomotion: Locomotion,
    /// Cash held by the player.
    pub money: i32,
}

impl FrameInfo {
    /// Serialize as a flat JSON object.
    ///
    /// Flags are exported as integers: `dead`, `on_foot` and `on_bike` are
    /// 0 or 1 and `in_vehicle` uses [`Locomotion::vehicle_code`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Wire form of [`FrameInfo`].
#[derive(Serialize)]
struct FrameInfoRecord {
    time_since_player_hit_vehicle: i32,
    time_since_player_hit_ped: i32,
    time_since_player_drove_on_pavement: i32,
    time_since_player_drove_against_traffic: i32,
    dead: i32,
    position: [f32; 3],
    forward_vector: [f32; 3],
    heading: f32,
    on_foot: i32,
    in_vehicle: i32,
    on_bike: i32,
    money: i32,
}

impl From<FrameInfo> for FrameInfoRecord {
    fn from(info: FrameInfo) -> Self {
        Self {
            time_since_player_hit_vehicle: info.time_since_player_hit_vehicle,
            time_since_player_hit_ped: info.time_since_player_hit_ped,
            time_since_player_drove_on_pavement: info.time_since_player_drove_on_pavement,
            time_since_player_drove_against_traffic: info
                .time_since_player_drove_against_traffic,
            dead: i32::from(info.dead),
            position: info.position.to_array(),
            forward_vector: info.forward_vector.to_array(),
            heading: info.heading,
            on_foot: i32::from(info.locomotion.contains(Locomotion::ON_FOOT)),
            in_vehicle: info.locomotion.vehicle_code(),
            on_bike: i32::from(info.locomotion.contains(Locomotion::ON_BIKE)),
            money: info.money,
        }
    }
}

// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sizing and matching defaults for a tracker.
///
/// Every field has a default, so a configuration file only needs the fields
/// it changes:
///
/// ```
/// use reident_tracker::TrackerConfig;
///
/// let config = TrackerConfig::from_json(r#"{ "capacity": 4096 }"#).unwrap();
/// assert_eq!(config.capacity, 4096);
/// assert!(config.track_heads);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Number of slots in each frame table. Must be a power of two.
    ///
    /// The lower half holds one slot per entity, the upper half the head
    /// slots of pedestrians.
    pub capacity: usize,
    /// Right shift applied to an entity handle before it is masked into a
    /// slot address. Hosts that keep a pool index above a generation byte
    /// want this to be 8.
    pub handle_shift: u32,
    /// Default match radius. The spatial index cells are twice this size.
    pub tracking_radius: f32,
    /// Default angular tolerance, in `1 - |q1 · q2|` units.
    pub angular_tolerance: f32,
    /// Whether pedestrians get a second slot at their head position.
    pub track_heads: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: 1 << 13,
            handle_shift: 8,
            tracking_radius: 0.5,
            angular_tolerance: 0.1,
            track_heads: true,
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the tracker relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 || !self.capacity.is_power_of_two() {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        if self.handle_shift >= 32 {
            return Err(ConfigError::InvalidHandleShift(self.handle_shift));
        }
        if !(self.tracking_radius.is_finite() && self.tracking_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.tracking_radius));
        }
        if !(self.angular_tolerance.is_finite() && self.angular_tolerance > 0.0) {
            return Err(ConfigError::InvalidAngularTolerance(
                self.angular_tolerance,
            ));
        }
        Ok(())
    }

    /// Edge length of the spatial index cells.
    pub fn cell_size(&self) -> f32 {
        2.0 * self.tracking_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = TrackerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.capacity, 8192);
        assert!((config.cell_size() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            TrackerConfig {
                capacity: 1000,
                ..Default::default()
            },
            TrackerConfig {
                capacity: 1,
                ..Default::default()
            },
            TrackerConfig {
                handle_shift: 32,
                ..Default::default()
            },
            TrackerConfig {
                tracking_radius: 0.0,
                ..Default::default()
            },
            TrackerConfig {
                angular_tolerance: f32::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn parses_partial_json() {
        let config =
            TrackerConfig::from_json(r#"{ "tracking_radius": 2.0, "track_heads": false }"#)
                .unwrap();
        assert!((config.tracking_radius - 2.0).abs() < f32::EPSILON);
        assert!(!config.track_heads);
        assert_eq!(config.capacity, TrackerConfig::default().capacity);
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(
            TrackerConfig::from_json("{ \"capacity\": "),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            TrackerConfig::from_json(r#"{ "capacity": 12 }"#),
            Err(ConfigError::InvalidCapacity(12))
        ));
        assert!(matches!(
            TrackerConfig::from_json(r#"{ "radius": 1.0 }"#),
            Err(ConfigError::Parse(_))
        ));
    }
}

//! RoomProfiles kind: per room type, the safe operating range, nominal
//! target and critical limits of each quantity.

use std::collections::BTreeMap;

use climate_core::Quantity;
use serde::{Deserialize, Serialize};

use crate::schema::CommonMetadata;

pub const BUILTIN_YAML: &str = include_str!("../../../data/config/room-profiles.yml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoomProfilesRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: RoomProfilesSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoomProfilesSpec {
    /// Profile used when a request names an unknown room type.
    pub default_room: String,
    pub rooms: BTreeMap<String, RoomProfile>,
}

impl RoomProfilesSpec {
    pub fn get(&self, room_type: &str) -> Option<&RoomProfile> {
        self.rooms.get(room_type)
    }

    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.keys().map(|k| k.as_str()).collect()
    }

    /// The configured fallback profile, if it exists.
    pub fn default_profile(&self) -> Option<&RoomProfile> {
        self.rooms.get(&self.default_room)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoomProfile {
    #[serde(default)]
    pub description: Option<String>,
    pub ranges: BTreeMap<Quantity, QuantityRange>,
}

impl RoomProfile {
    pub fn range(&self, quantity: Quantity) -> Option<&QuantityRange> {
        self.ranges.get(&quantity)
    }

    /// Nominal temperature, used as the assumed ambient temperature.
    pub fn nominal_temperature(&self) -> Option<f64> {
        self.range(Quantity::Temperature).map(|r| r.target)
    }
}

/// Safe range `[min, max]` with a nominal target and optional hard limits.
///
/// For humidity, `critical_high` is the condensation threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuantityRange {
    pub min: f64,
    pub max: f64,
    pub target: f64,
    #[serde(default)]
    pub critical_low: Option<f64>,
    #[serde(default)]
    pub critical_high: Option<f64>,
}

impl QuantityRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Distance outside the range; zero inside.
    pub fn excess(&self, value: f64) -> f64 {
        if value > self.max {
            value - self.max
        } else if value < self.min {
            self.min - value
        } else {
            0.0
        }
    }

    /// Distance outside the range in half-widths.
    pub fn relative_excess(&self, value: f64) -> f64 {
        let half = self.half_width();
        if half > 0.0 {
            self.excess(value) / half
        } else {
            self.excess(value)
        }
    }
}

pub type CompiledRoomProfiles = RoomProfilesSpec;

impl RoomProfilesRule {
    pub fn compile(&self) -> CompiledRoomProfiles {
        self.spec.clone()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions: routing points drawn as horizontal bands.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of routing point an edge stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// A broker exchange
    Exchange,
    /// A publish/subscribe topic
    Topic,
}

/// Drawing direction of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BandOrientation {
    /// Emitters on the left, collectors on the right
    #[default]
    Positive,
    /// Collectors on the left, emitters on the right
    Negative,
}

/// Layout data of the band drawn for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Vertical layout key; unique among live edges
    pub altitude: i32,
    /// Secondary ordering key
    pub rank: i32,
    /// Drawing direction
    pub orientation: BandOrientation,
}

impl Band {
    /// Create a positive band whose rank follows its altitude
    pub fn new(altitude: i32) -> Self {
        Self {
            altitude,
            rank: altitude,
            orientation: BandOrientation::Positive,
        }
    }
}

/// An edge instance in the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique instance ID
    pub id: EdgeId,
    /// Display name
    pub name: String,
    /// Edge kind
    pub kind: EdgeKind,
    /// The band drawn for this edge
    pub band: Band,
}

impl Edge {
    pub(crate) fn new(name: impl Into<String>, kind: EdgeKind, altitude: i32) -> Self {
        Self {
            id: EdgeId::new(),
            name: name.into(),
            kind,
            band: Band::new(altitude),
        }
    }

    /// Altitude of this edge's band
    pub fn altitude(&self) -> i32 {
        self.band.altitude
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:?}={} (altitude {})>", self.kind, self.name, self.band.altitude)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vertex definitions: the nodes of a topology, drawn as blocks.

use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub Uuid);

impl VertexId {
    /// Create a new random vertex ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VertexId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of topology node a vertex stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A broker queue
    Queue,
    /// A service consuming from queues and publishing to exchanges
    Service,
    /// A link to another virtual host
    Wormhole,
    /// Invisible relay anchoring a hook; only created by transfers
    Latch,
}

impl NodeType {
    /// Short tag used in labels and diagnostics
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Service => "sb",
            Self::Wormhole => "wh",
            Self::Latch => "latch",
        }
    }

    /// Whether blocks of this type are meant to be seen
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Latch)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NodeType {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(Self::Queue),
            "sb" | "service" => Ok(Self::Service),
            "wh" | "wormhole" => Ok(Self::Wormhole),
            "latch" => Ok(Self::Latch),
            _ => Err(TopologyError::UnknownNodeType(s.to_string())),
        }
    }
}

/// A vertex instance in the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique instance ID
    pub id: VertexId,
    /// Display name
    pub name: String,
    /// Node type
    pub node_type: NodeType,
    /// Left-to-right position index; unique among live vertices
    pub index: u32,
}

impl Vertex {
    pub(crate) fn new(name: impl Into<String>, node_type: NodeType, index: u32) -> Self {
        Self {
            id: VertexId::new(),
            name: name.into(),
            node_type,
            index,
        }
    }

    /// Whether this vertex is a hook latch
    pub fn is_latch(&self) -> bool {
        self.node_type == NodeType::Latch
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Node={}, index={}, type={}>", self.name, self.index, self.node_type)
    }
}

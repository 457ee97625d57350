// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection definitions: a vertex publishing into, or consuming from, an edge.

use crate::edge::EdgeId;
use crate::lifecycle::Lifecycle;
use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// The vertex emits into the edge (a producer)
    Source,
    /// The edge feeds into the vertex (a consumer)
    Sink,
}

impl Direction {
    /// Single-letter container tag used in snap keys
    pub fn container_tag(&self) -> char {
        match self {
            Self::Source => 'e',
            Self::Sink => 'c',
        }
    }

    /// Parse a container tag back into a direction
    pub fn from_container_tag(tag: char) -> Option<Self> {
        match tag {
            'e' => Some(Self::Source),
            'c' => Some(Self::Sink),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("->"),
            Self::Sink => f.write_str("<-"),
        }
    }
}

/// Routing keys attached to a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoutingKeys(pub Vec<String>);

impl RoutingKeys {
    /// Create routing keys from any list of strings
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Check if no keys are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoutingKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// A directed link between one vertex and one edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// The vertex end
    pub vertex: VertexId,
    /// The edge end
    pub edge: EdgeId,
    /// Direction of message flow
    pub direction: Direction,
    /// Position among sibling connections sharing vertex and direction
    pub order: u32,
    /// Optional routing-key metadata
    pub routing_keys: Option<RoutingKeys>,
    /// Lifecycle state
    pub state: Lifecycle,
}

impl Connection {
    pub(crate) fn new(
        vertex: VertexId,
        edge: EdgeId,
        direction: Direction,
        order: u32,
        routing_keys: Option<RoutingKeys>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            vertex,
            edge,
            direction,
            order,
            routing_keys,
            state: Lifecycle::Active,
        }
    }

    /// Check if the vertex emits into the edge
    pub fn is_source(&self) -> bool {
        self.direction == Direction::Source
    }

    /// Check if the edge feeds into the vertex
    pub fn is_sink(&self) -> bool {
        self.direction == Direction::Sink
    }

    /// Check if this connection involves a specific vertex
    pub fn involves_vertex(&self, vertex: VertexId) -> bool {
        self.vertex == vertex
    }

    /// Check if this connection involves a specific edge
    pub fn involves_edge(&self, edge: EdgeId) -> bool {
        self.edge == edge
    }

    /// Check if this connection links the same vertex, edge and direction
    pub fn same_triple(&self, vertex: VertexId, edge: EdgeId, direction: Direction) -> bool {
        self.vertex == vertex && self.edge == edge && self.direction == direction
    }

    pub(crate) fn release(&mut self) {
        tracing::debug!("releasing connection {:?}", self.id);
        self.state = Lifecycle::Released;
    }
}

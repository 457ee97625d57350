// SPDX-License-Identifier: MIT OR Apache-2.0
//! Feeds (vertex to vertex routing) and their flow projections.

use crate::connection::RoutingKeys;
use crate::lifecycle::Lifecycle;
use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedId(pub Uuid);

impl FeedId {
    /// Create a new random feed ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeedId {
    fn default() -> Self {
        Self::new()
    }
}

/// Messages flowing from one vertex directly into another, e.g. a queue
/// draining into the service that consumes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Unique feed ID
    pub id: FeedId,
    /// Vertex the messages leave
    pub origin: VertexId,
    /// Vertex the messages enter
    pub dest: VertexId,
    /// Optional routing keys of the binding
    pub routing_keys: Option<RoutingKeys>,
    flow: Flow,
}

impl Feed {
    pub(crate) fn new(origin: VertexId, dest: VertexId, routing_keys: Option<RoutingKeys>) -> Self {
        let id = FeedId::new();
        Self {
            id,
            origin,
            dest,
            flow: Flow {
                feed: id,
                origin,
                dest,
                routing_keys: routing_keys.clone(),
                state: Lifecycle::Active,
            },
            routing_keys,
        }
    }

    /// The visual projection of this feed
    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Check if this feed touches a vertex on either end
    pub fn involves_vertex(&self, vertex: VertexId) -> bool {
        self.origin == vertex || self.dest == vertex
    }

    /// Check if this feed has the given origin, destination and routing keys
    pub fn same_triple(&self, origin: VertexId, dest: VertexId, routing_keys: Option<&RoutingKeys>) -> bool {
        self.origin == origin && self.dest == dest && self.routing_keys.as_ref() == routing_keys
    }

    pub(crate) fn release(&mut self) {
        self.flow.release();
    }
}

/// Visual projection of a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    feed: FeedId,
    /// Origin vertex
    pub origin: VertexId,
    /// Destination vertex
    pub dest: VertexId,
    /// Routing keys shown on the flow
    pub routing_keys: Option<RoutingKeys>,
    state: Lifecycle,
}

impl Flow {
    /// The owning feed, or `None` once released
    pub fn feed(&self) -> Option<FeedId> {
        self.state.is_active().then_some(self.feed)
    }

    /// Lifecycle state
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Whether the flow should be drawn
    pub fn is_used(&self) -> bool {
        self.state.is_active()
    }

    fn release(&mut self) {
        tracing::debug!("releasing flow of feed {:?}", self.feed);
        self.state = Lifecycle::Released;
    }
}

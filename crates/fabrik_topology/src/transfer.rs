// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transfers (edge to edge routing) and their hook projections.

use crate::connection::RoutingKeys;
use crate::edge::EdgeId;
use crate::lifecycle::Lifecycle;
use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    /// Create a new random transfer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

/// Messages flowing from one edge into another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique transfer ID
    pub id: TransferId,
    /// Edge the messages leave
    pub origin: EdgeId,
    /// Edge the messages enter
    pub dest: EdgeId,
    /// Optional routing keys of the binding
    pub routing_keys: Option<RoutingKeys>,
    /// Invisible vertex anchoring the hook horizontally
    pub latch: VertexId,
    hook: Hook,
}

impl Transfer {
    pub(crate) fn new(
        origin: EdgeId,
        dest: EdgeId,
        routing_keys: Option<RoutingKeys>,
        latch: VertexId,
    ) -> Self {
        let id = TransferId::new();
        Self {
            id,
            origin,
            dest,
            hook: Hook {
                transfer: id,
                origin,
                dest,
                latch,
                routing_keys: routing_keys.clone(),
                state: Lifecycle::Active,
            },
            routing_keys,
            latch,
        }
    }

    /// The visual projection of this transfer
    pub fn hook(&self) -> &Hook {
        &self.hook
    }

    /// Check if this transfer touches an edge on either end
    pub fn involves_edge(&self, edge: EdgeId) -> bool {
        self.origin == edge || self.dest == edge
    }

    /// Check if this transfer has the given origin, destination and routing keys
    pub fn same_triple(&self, origin: EdgeId, dest: EdgeId, routing_keys: Option<&RoutingKeys>) -> bool {
        self.origin == origin && self.dest == dest && self.routing_keys.as_ref() == routing_keys
    }

    pub(crate) fn release(&mut self) {
        self.hook.release();
    }
}

/// Visual projection of a transfer: a vertical connector spanning two bands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    transfer: TransferId,
    /// Origin edge
    pub origin: EdgeId,
    /// Destination edge
    pub dest: EdgeId,
    /// Latch vertex the hook is anchored at
    pub latch: VertexId,
    /// Routing keys shown on the hook
    pub routing_keys: Option<RoutingKeys>,
    state: Lifecycle,
}

impl Hook {
    /// The owning transfer, or `None` once released
    pub fn transfer(&self) -> Option<TransferId> {
        self.state.is_active().then_some(self.transfer)
    }

    /// Lifecycle state
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Whether the hook should be drawn
    pub fn is_used(&self) -> bool {
        self.state.is_active()
    }

    fn release(&mut self) {
        tracing::debug!("releasing hook of transfer {:?}", self.transfer);
        self.state = Lifecycle::Released;
    }
}

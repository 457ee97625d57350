// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for topology construction, label decoding and consistency checks.

use crate::connection::{ConnectionId, Direction, RoutingKeys};
use crate::edge::EdgeId;
use crate::feed::FeedId;
use crate::transfer::TransferId;
use crate::vertex::{NodeType, VertexId};

/// Error when building or mutating a topology
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// Name is empty or whitespace only
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Node type tag is not recognized
    #[error("Unknown node type: {0:?}")]
    UnknownNodeType(String),

    /// Node type may not be created directly
    #[error("Node type {0} is reserved for transfer latches")]
    ReservedNodeType(NodeType),

    /// Vertex not found
    #[error("Vertex not found: {0:?}")]
    VertexNotFound(VertexId),

    /// Edge not found
    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),

    /// Connection not found
    #[error("Connection not found: {0:?}")]
    ConnectionNotFound(ConnectionId),

    /// Transfer not found
    #[error("Transfer not found: {0:?}")]
    TransferNotFound(TransferId),

    /// Feed not found
    #[error("Feed not found: {0:?}")]
    FeedNotFound(FeedId),

    /// Latches only exist as transfer anchors
    #[error("Latch vertex cannot be used here: {0:?}")]
    LatchEndpoint(VertexId),

    /// Origin and destination are the same object
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// A connection with the same vertex, edge and direction already exists
    #[error("Duplicate connection! {vertex} {direction} {edge}")]
    DuplicateConnection {
        /// Vertex name
        vertex: String,
        /// Edge name
        edge: String,
        /// Direction
        direction: Direction,
    },

    /// A transfer with the same origin, destination and routing keys already exists
    #[error("Duplicate exchange transfer! {origin}->{dest}, routing-keys: {routing_keys:?}")]
    DuplicateTransfer {
        /// Origin edge name
        origin: String,
        /// Destination edge name
        dest: String,
        /// Routing keys
        routing_keys: Option<RoutingKeys>,
    },

    /// A feed with the same origin, destination and routing keys already exists
    #[error("Duplicate node feed! {origin}->{dest}, routing-keys: {routing_keys:?}")]
    DuplicateFeed {
        /// Origin vertex name
        origin: String,
        /// Destination vertex name
        dest: String,
        /// Routing keys
        routing_keys: Option<RoutingKeys>,
    },
}

/// Error when a label string does not decode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} {label:?}")]
pub struct InvalidLabelError {
    /// Which codec rejected the string
    pub kind: &'static str,
    /// The rejected string
    pub label: String,
}

impl InvalidLabelError {
    pub(crate) fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// Broken model invariant found while deriving layout facts.
///
/// This indicates a bug in the mutation path of the topology and is never
/// recoverable in-process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphConsistencyError {
    /// Two live vertices share a position index
    #[error("Duplicate vertex index: {0}")]
    DuplicateIndex(u32),

    /// Two live edges share an altitude
    #[error("Duplicate band altitude: {0}")]
    DuplicateAltitude(i32),

    /// Two sibling connections share an order
    #[error("Duplicate order {order} on vertex index {index} ({direction:?})")]
    DuplicateOrder {
        /// Position index of the owning vertex
        index: u32,
        /// Direction of the siblings
        direction: Direction,
        /// The shared order
        order: u32,
    },

    /// Two connections share vertex, edge and direction
    #[error("Duplicate connection on vertex index {index} and altitude {altitude} ({direction:?})")]
    DuplicateConnection {
        /// Position index of the vertex
        index: u32,
        /// Altitude of the edge
        altitude: i32,
        /// Direction
        direction: Direction,
    },

    /// Two view items resolve to the same key
    #[error("Duplicate item key: {0}")]
    DuplicateItemKey(String),

    /// A reference points at a vertex that does not exist
    #[error("Dangling vertex reference: {0:?}")]
    DanglingVertex(VertexId),

    /// A reference points at an edge that does not exist
    #[error("Dangling edge reference: {0:?}")]
    DanglingEdge(EdgeId),

    /// A reference points at a connection that does not exist
    #[error("Dangling connection reference: {0:?}")]
    DanglingConnection(ConnectionId),

    /// A transfer's latch is missing or is not a latch
    #[error("Transfer {0:?} has no valid latch")]
    InvalidLatch(TransferId),

    /// A live object carries a released projection
    #[error("Live object {0} holds a released projection")]
    ReleasedProjection(String),
}

/// Error when saving or loading a topology snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The loaded model breaks an invariant
    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(#[from] GraphConsistencyError),
}

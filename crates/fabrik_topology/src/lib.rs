// SPDX-License-Identifier: MIT OR Apache-2.0
//! Topology model for Fabrik block diagrams.
//!
//! This crate holds the graph side of a message-broker diagram:
//! - Vertices (queues, services, wormholes and invisible latches)
//! - Edges (exchanges and topics), each drawn as one band
//! - Connections between a vertex and an edge (sources and sinks)
//! - Transfers (edge to edge) and feeds (vertex to vertex)
//!
//! ## Architecture
//!
//! [`Topology`] is the single collection of record. Every relationship
//! query filters its flat collections on demand, so there is no secondary
//! index to keep in sync. The [`ordering`] module derives the neighbor and
//! stacking facts a layout renderer needs, and [`label`] encodes the
//! composite keys used to address items that have no single unique field.

pub mod connection;
pub mod edge;
pub mod error;
pub mod feed;
pub mod label;
pub mod lifecycle;
pub mod ordering;
pub mod topology;
pub mod transfer;
pub mod vertex;

pub use connection::{Connection, ConnectionId, Direction, RoutingKeys};
pub use edge::{Band, BandOrientation, Edge, EdgeId, EdgeKind};
pub use error::{GraphConsistencyError, InvalidLabelError, SnapshotError, TopologyError};
pub use feed::{Feed, FeedId, Flow};
pub use label::{FlowLabel, HookLabel, SnapKey};
pub use lifecycle::Lifecycle;
pub use ordering::{BandEndpoint, BandSpan, BandStacking, OrderingEngine, SnapNeighbors, VertexNeighbors};
pub use topology::Topology;
pub use transfer::{Hook, Transfer, TransferId};
pub use vertex::{NodeType, Vertex, VertexId};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Topology data structure: the single collection of record for a diagram.

use crate::connection::{Connection, ConnectionId, Direction, RoutingKeys};
use crate::edge::{BandOrientation, Edge, EdgeId, EdgeKind};
use crate::error::{GraphConsistencyError, SnapshotError, TopologyError};
use crate::feed::{Feed, FeedId, Flow};
use crate::label::{FlowLabel, HookLabel, SnapKey};
use crate::transfer::{Hook, Transfer, TransferId};
use crate::vertex::{NodeType, Vertex, VertexId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A message-broker topology.
///
/// Relationship queries such as [`Topology::connections_of_vertex`] filter the
/// flat collections every time they are called; nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Topology name
    pub name: String,
    vertices: IndexMap<VertexId, Vertex>,
    edges: IndexMap<EdgeId, Edge>,
    connections: IndexMap<ConnectionId, Connection>,
    transfers: IndexMap<TransferId, Transfer>,
    feeds: IndexMap<FeedId, Feed>,
}

impl Topology {
    /// Create a new empty topology
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: IndexMap::new(),
            edges: IndexMap::new(),
            connections: IndexMap::new(),
            transfers: IndexMap::new(),
            feeds: IndexMap::new(),
        }
    }

    /// The next available vertex position index
    pub fn next_free_index(&self) -> u32 {
        self.vertices
            .values()
            .map(|v| v.index)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// The next available band altitude
    pub fn next_free_altitude(&self) -> i32 {
        self.edges
            .values()
            .map(Edge::altitude)
            .chain(std::iter::once(0))
            .max()
            .unwrap_or(0)
            + 1
    }

    // ----------------------------------------------------------------------
    // Construction
    // ----------------------------------------------------------------------

    /// Add a vertex at the next free position index.
    ///
    /// Latches cannot be added directly; they are created by
    /// [`Topology::add_transfer`].
    pub fn add_vertex(&mut self, node_type: NodeType, name: impl Into<String>) -> Result<VertexId, TopologyError> {
        let name = validated_name(name.into())?;
        if node_type == NodeType::Latch {
            return Err(TopologyError::ReservedNodeType(node_type));
        }
        Ok(self.insert_vertex(node_type, name))
    }

    fn insert_vertex(&mut self, node_type: NodeType, name: String) -> VertexId {
        let vertex = Vertex::new(name, node_type, self.next_free_index());
        tracing::debug!("Adding {:?} {} at index {}", node_type, vertex.name, vertex.index);
        let id = vertex.id;
        self.vertices.insert(id, vertex);
        id
    }

    /// Add an edge at the next free altitude.
    ///
    /// Same-named edges are distinct objects; callers that want unique names
    /// look them up through [`Topology::exchanges`] first.
    pub fn add_edge(&mut self, kind: EdgeKind, name: impl Into<String>) -> Result<EdgeId, TopologyError> {
        let name = validated_name(name.into())?;
        let edge = Edge::new(name, kind, self.next_free_altitude());
        tracing::debug!("Adding {:?} {} at altitude {}", kind, edge.name, edge.altitude());
        let id = edge.id;
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Connect a vertex and an edge.
    ///
    /// The new connection's order is one past the highest order among the
    /// vertex's connections in the same direction.
    pub fn connect(
        &mut self,
        vertex_id: VertexId,
        edge_id: EdgeId,
        direction: Direction,
        routing_keys: Option<RoutingKeys>,
    ) -> Result<ConnectionId, TopologyError> {
        let vertex = self.vertices.get(&vertex_id)
            .ok_or(TopologyError::VertexNotFound(vertex_id))?;
        let edge = self.edges.get(&edge_id)
            .ok_or(TopologyError::EdgeNotFound(edge_id))?;

        if vertex.is_latch() {
            return Err(TopologyError::LatchEndpoint(vertex_id));
        }

        if self.connections.values().any(|c| c.same_triple(vertex_id, edge_id, direction)) {
            return Err(TopologyError::DuplicateConnection {
                vertex: vertex.name.clone(),
                edge: edge.name.clone(),
                direction,
            });
        }

        let order = self
            .connections
            .values()
            .filter(|c| c.vertex == vertex_id && c.direction == direction)
            .map(|c| c.order)
            .max()
            .map_or(0, |max| max + 1);

        tracing::debug!(
            "Adding {:?}: {} {} {} with routing-keys {:?}",
            direction, vertex.name, direction, edge.name, routing_keys
        );
        let connection = Connection::new(vertex_id, edge_id, direction, order, routing_keys);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Add a transfer between two edges, creating its latch vertex and hook
    pub fn add_transfer(
        &mut self,
        origin: EdgeId,
        dest: EdgeId,
        routing_keys: Option<RoutingKeys>,
    ) -> Result<TransferId, TopologyError> {
        let origin_edge = self.edges.get(&origin).ok_or(TopologyError::EdgeNotFound(origin))?;
        let dest_edge = self.edges.get(&dest).ok_or(TopologyError::EdgeNotFound(dest))?;

        if origin == dest {
            return Err(TopologyError::SelfLoop);
        }

        if self.transfers.values().any(|t| t.same_triple(origin, dest, routing_keys.as_ref())) {
            return Err(TopologyError::DuplicateTransfer {
                origin: origin_edge.name.clone(),
                dest: dest_edge.name.clone(),
                routing_keys,
            });
        }

        let latch_name = format!("{}->{}", origin_edge.name, dest_edge.name);
        tracing::debug!("Adding Transfer {} with routing-keys {:?}", latch_name, routing_keys);
        let latch = self.insert_vertex(NodeType::Latch, latch_name);

        let transfer = Transfer::new(origin, dest, routing_keys, latch);
        let id = transfer.id;
        self.transfers.insert(id, transfer);
        Ok(id)
    }

    /// Add a feed between two vertices, creating its flow
    pub fn add_feed(
        &mut self,
        origin: VertexId,
        dest: VertexId,
        routing_keys: Option<RoutingKeys>,
    ) -> Result<FeedId, TopologyError> {
        let origin_vertex = self.vertices.get(&origin).ok_or(TopologyError::VertexNotFound(origin))?;
        let dest_vertex = self.vertices.get(&dest).ok_or(TopologyError::VertexNotFound(dest))?;

        if origin_vertex.is_latch() {
            return Err(TopologyError::LatchEndpoint(origin));
        }
        if dest_vertex.is_latch() {
            return Err(TopologyError::LatchEndpoint(dest));
        }
        if origin == dest {
            return Err(TopologyError::SelfLoop);
        }

        if self.feeds.values().any(|f| f.same_triple(origin, dest, routing_keys.as_ref())) {
            return Err(TopologyError::DuplicateFeed {
                origin: origin_vertex.name.clone(),
                dest: dest_vertex.name.clone(),
                routing_keys,
            });
        }

        tracing::debug!(
            "Adding Feed from {} to {} with routing-keys {:?}",
            origin_vertex.name, dest_vertex.name, routing_keys
        );
        let feed = Feed::new(origin, dest, routing_keys);
        let id = feed.id;
        self.feeds.insert(id, feed);
        Ok(id)
    }

    /// Set the drawing direction of an edge's band
    pub fn set_orientation(&mut self, edge_id: EdgeId, orientation: BandOrientation) -> Result<(), TopologyError> {
        let edge = self.edges.get_mut(&edge_id).ok_or(TopologyError::EdgeNotFound(edge_id))?;
        edge.band.orientation = orientation;
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Removal
    // ----------------------------------------------------------------------

    /// Remove a connection. The returned connection is released.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, TopologyError> {
        let mut connection = self
            .connections
            .shift_remove(&connection_id)
            .ok_or(TopologyError::ConnectionNotFound(connection_id))?;
        connection.release();
        Ok(connection)
    }

    /// Remove a transfer together with its latch. The returned transfer's hook is released.
    pub fn remove_transfer(&mut self, transfer_id: TransferId) -> Result<Transfer, TopologyError> {
        let mut transfer = self
            .transfers
            .shift_remove(&transfer_id)
            .ok_or(TopologyError::TransferNotFound(transfer_id))?;
        self.vertices.shift_remove(&transfer.latch);
        transfer.release();
        Ok(transfer)
    }

    /// Remove a feed. The returned feed's flow is released.
    pub fn remove_feed(&mut self, feed_id: FeedId) -> Result<Feed, TopologyError> {
        let mut feed = self
            .feeds
            .shift_remove(&feed_id)
            .ok_or(TopologyError::FeedNotFound(feed_id))?;
        feed.release();
        Ok(feed)
    }

    // ----------------------------------------------------------------------
    // Lookup
    // ----------------------------------------------------------------------

    /// Get a vertex by ID
    pub fn vertex(&self, vertex_id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&vertex_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get a transfer by ID
    pub fn transfer(&self, transfer_id: TransferId) -> Option<&Transfer> {
        self.transfers.get(&transfer_id)
    }

    /// Get a feed by ID
    pub fn feed(&self, feed_id: FeedId) -> Option<&Feed> {
        self.feeds.get(&feed_id)
    }

    /// Get the vertex at a position index
    pub fn vertex_by_index(&self, index: u32) -> Option<&Vertex> {
        self.vertices.values().find(|v| v.index == index)
    }

    /// Get the edge at an altitude
    pub fn edge_by_altitude(&self, altitude: i32) -> Option<&Edge> {
        self.edges.values().find(|e| e.altitude() == altitude)
    }

    /// Get the connection addressed by a snap key
    pub fn connection_by_snap_key(&self, key: SnapKey) -> Option<&Connection> {
        let vertex = self.vertex_by_index(key.block_index)?;
        self.connections
            .values()
            .find(|c| c.vertex == vertex.id && c.direction == key.direction && c.order == key.order)
    }

    /// Get all vertices
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get all transfers
    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.values()
    }

    /// Get all feeds
    pub fn feeds(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.values()
    }

    /// Get the number of vertices, latches included
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of transfers
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Get the number of feeds
    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    /// Name to vertex map of all non-latch vertices
    pub fn nodes(&self) -> IndexMap<&str, &Vertex> {
        self.vertices
            .values()
            .filter(|v| !v.is_latch())
            .map(|v| (v.name.as_str(), v))
            .collect()
    }

    /// Name to vertex map of all queues
    pub fn queues(&self) -> IndexMap<&str, &Vertex> {
        self.vertices
            .values()
            .filter(|v| v.node_type == NodeType::Queue)
            .map(|v| (v.name.as_str(), v))
            .collect()
    }

    /// Name to edge map of all exchanges
    pub fn exchanges(&self) -> IndexMap<&str, &Edge> {
        self.edges
            .values()
            .filter(|e| e.kind == EdgeKind::Exchange)
            .map(|e| (e.name.as_str(), e))
            .collect()
    }

    // ----------------------------------------------------------------------
    // Relationships
    // ----------------------------------------------------------------------

    /// Get connections involving a vertex
    pub fn connections_of_vertex(&self, vertex_id: VertexId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_vertex(vertex_id))
    }

    /// Get connections involving an edge
    pub fn connections_of_edge(&self, edge_id: EdgeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_edge(edge_id))
    }

    /// Get the sources (emitters) publishing into an edge
    pub fn sources_of_edge(&self, edge_id: EdgeId) -> impl Iterator<Item = &Connection> {
        self.connections_of_edge(edge_id).filter(|c| c.is_source())
    }

    /// Get the sinks (collectors) consuming from an edge
    pub fn sinks_of_edge(&self, edge_id: EdgeId) -> impl Iterator<Item = &Connection> {
        self.connections_of_edge(edge_id).filter(|c| c.is_sink())
    }

    /// Get transfers entering or leaving an edge
    pub fn transfers_of(&self, edge_id: EdgeId) -> impl Iterator<Item = &Transfer> {
        self.transfers.values().filter(move |t| t.involves_edge(edge_id))
    }

    /// Get feeds entering or leaving a vertex
    pub fn feeds_of(&self, vertex_id: VertexId) -> impl Iterator<Item = &Feed> {
        self.feeds.values().filter(move |f| f.involves_vertex(vertex_id))
    }

    /// Flows this vertex is the origin of
    pub fn flows_going_out(&self, vertex_id: VertexId) -> impl Iterator<Item = &Flow> {
        self.feeds.values().filter(move |f| f.origin == vertex_id).map(Feed::flow)
    }

    /// Flows this vertex is the destination of
    pub fn flows_coming_in(&self, vertex_id: VertexId) -> impl Iterator<Item = &Flow> {
        self.feeds.values().filter(move |f| f.dest == vertex_id).map(Feed::flow)
    }

    /// Check if the vertex originates at least one flow
    pub fn is_flow_origin(&self, vertex_id: VertexId) -> bool {
        self.flows_going_out(vertex_id).next().is_some()
    }

    /// Check if the vertex receives at least one flow
    pub fn is_flow_dest(&self, vertex_id: VertexId) -> bool {
        self.flows_coming_in(vertex_id).next().is_some()
    }

    // ----------------------------------------------------------------------
    // Labels
    // ----------------------------------------------------------------------

    /// Snap key of a connection
    pub fn snap_key(&self, connection: &Connection) -> Result<SnapKey, GraphConsistencyError> {
        let vertex = self
            .vertices
            .get(&connection.vertex)
            .ok_or(GraphConsistencyError::DanglingVertex(connection.vertex))?;
        Ok(SnapKey::new(vertex.index, connection.direction, connection.order))
    }

    /// Label of a hook, derived from its band altitudes and latch index
    pub fn hook_label(&self, hook: &Hook) -> Result<HookLabel, GraphConsistencyError> {
        let origin = self.edges.get(&hook.origin).ok_or(GraphConsistencyError::DanglingEdge(hook.origin))?;
        let dest = self.edges.get(&hook.dest).ok_or(GraphConsistencyError::DanglingEdge(hook.dest))?;
        let latch = self.vertices.get(&hook.latch).ok_or(GraphConsistencyError::DanglingVertex(hook.latch))?;
        Ok(HookLabel::new(origin.altitude(), dest.altitude(), latch.index))
    }

    /// Label of a flow, derived from its endpoint indices
    pub fn flow_label(&self, flow: &Flow) -> Result<FlowLabel, GraphConsistencyError> {
        let origin = self.vertices.get(&flow.origin).ok_or(GraphConsistencyError::DanglingVertex(flow.origin))?;
        let dest = self.vertices.get(&flow.dest).ok_or(GraphConsistencyError::DanglingVertex(flow.dest))?;
        Ok(FlowLabel::new(origin.index, dest.index))
    }

    /// Hook label to hook map of all transfers
    pub fn hooks(&self) -> Result<IndexMap<HookLabel, &Hook>, GraphConsistencyError> {
        self.transfers
            .values()
            .map(|t| Ok((self.hook_label(t.hook())?, t.hook())))
            .collect()
    }

    /// Flow label to flow map of all feeds.
    ///
    /// Feeds that differ only by routing keys share a label; the first one wins.
    pub fn flows(&self) -> Result<IndexMap<FlowLabel, &Flow>, GraphConsistencyError> {
        let mut flows = IndexMap::new();
        for feed in self.feeds.values() {
            flows.entry(self.flow_label(feed.flow())?).or_insert(feed.flow());
        }
        Ok(flows)
    }

    // ----------------------------------------------------------------------
    // Consistency
    // ----------------------------------------------------------------------

    /// Verify every invariant the ordering engine relies on
    pub fn check_consistency(&self) -> Result<(), GraphConsistencyError> {
        let mut indices = HashSet::new();
        for vertex in self.vertices.values() {
            if !indices.insert(vertex.index) {
                return Err(GraphConsistencyError::DuplicateIndex(vertex.index));
            }
        }

        let mut altitudes = HashSet::new();
        for edge in self.edges.values() {
            if !altitudes.insert(edge.altitude()) {
                return Err(GraphConsistencyError::DuplicateAltitude(edge.altitude()));
            }
        }

        let mut triples = HashSet::new();
        let mut orders = HashSet::new();
        for connection in self.connections.values() {
            if !connection.state.is_active() {
                return Err(GraphConsistencyError::ReleasedProjection(format!("connection {:?}", connection.id)));
            }
            let vertex = self
                .vertices
                .get(&connection.vertex)
                .ok_or(GraphConsistencyError::DanglingVertex(connection.vertex))?;
            let edge = self
                .edges
                .get(&connection.edge)
                .ok_or(GraphConsistencyError::DanglingEdge(connection.edge))?;
            if !triples.insert((vertex.index, edge.altitude(), connection.direction)) {
                return Err(GraphConsistencyError::DuplicateConnection {
                    index: vertex.index,
                    altitude: edge.altitude(),
                    direction: connection.direction,
                });
            }
            if !orders.insert((vertex.index, connection.direction, connection.order)) {
                return Err(GraphConsistencyError::DuplicateOrder {
                    index: vertex.index,
                    direction: connection.direction,
                    order: connection.order,
                });
            }
        }

        for transfer in self.transfers.values() {
            let hook = transfer.hook();
            if hook.transfer() != Some(transfer.id) {
                return Err(GraphConsistencyError::ReleasedProjection(format!("transfer {:?}", transfer.id)));
            }
            match self.vertices.get(&transfer.latch) {
                Some(latch) if latch.is_latch() => {}
                _ => return Err(GraphConsistencyError::InvalidLatch(transfer.id)),
            }
            self.hook_label(hook)?;
        }

        for feed in self.feeds.values() {
            if feed.flow().feed() != Some(feed.id) {
                return Err(GraphConsistencyError::ReleasedProjection(format!("feed {:?}", feed.id)));
            }
            self.flow_label(feed.flow())?;
        }

        Ok(())
    }

    // ----------------------------------------------------------------------
    // Snapshots
    // ----------------------------------------------------------------------

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format and re-check every invariant
    pub fn from_ron(s: &str) -> Result<Self, SnapshotError> {
        let topology: Self = ron::from_str(s)?;
        topology.check_consistency()?;
        Ok(topology)
    }

    /// Save a snapshot to a file
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load a snapshot from a file
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn validated_name(name: String) -> Result<String, TopologyError> {
    if name.trim().is_empty() {
        return Err(TopologyError::InvalidName(name));
    }
    Ok(name)
}

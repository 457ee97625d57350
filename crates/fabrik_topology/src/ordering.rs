// SPDX-License-Identifier: MIT OR Apache-2.0
//! Relative ordering and adjacency of diagram objects.
//!
//! The layout renderer never receives coordinates. Instead every block knows
//! its left and right neighbor, every snap its siblings, and every band the
//! bands above and below it plus the objects that bound it horizontally.
//! All orderings are total orders on integer layout keys, so running the
//! engine twice on an unchanged topology gives identical answers.

use crate::connection::{Connection, ConnectionId, Direction};
use crate::edge::{BandOrientation, EdgeId};
use crate::error::GraphConsistencyError;
use crate::label::{HookLabel, SnapKey};
use crate::topology::Topology;
use crate::vertex::{Vertex, VertexId};
use serde::{Deserialize, Serialize};

/// Left and right neighbors of a block, by position index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VertexNeighbors {
    /// Index of the block to the left
    pub left: Option<u32>,
    /// Index of the block to the right
    pub right: Option<u32>,
}

/// Left and right siblings of a snap within its container, by order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapNeighbors {
    /// Order of the sibling to the left
    pub left_order: Option<u32>,
    /// Order of the sibling to the right
    pub right_order: Option<u32>,
}

/// Bands directly above and below a band, by altitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BandStacking {
    /// Altitude of the band above
    pub top: Option<i32>,
    /// Altitude of the band below
    pub bottom: Option<i32>,
}

/// Object a band end is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandEndpoint {
    /// A snap on the band
    Snap(SnapKey),
    /// A hook leaving or entering the band
    Hook(HookLabel),
    /// Nothing touches the band; anchor to the band container
    Container,
}

impl BandEndpoint {
    /// Horizontal position index of the anchoring object
    pub fn position(&self) -> Option<u32> {
        match self {
            Self::Snap(key) => Some(key.block_index),
            Self::Hook(label) => Some(label.latch_index),
            Self::Container => None,
        }
    }
}

/// Left-most and right-most objects touching a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSpan {
    /// Left end of the band
    pub leftmost: BandEndpoint,
    /// Right end of the band
    pub rightmost: BandEndpoint,
}

/// Derives ordering and adjacency facts from a topology
#[derive(Debug, Clone, Copy)]
pub struct OrderingEngine<'a> {
    topology: &'a Topology,
    hide_disconnected: bool,
}

impl<'a> OrderingEngine<'a> {
    /// Create an engine that shows every snap
    pub fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            hide_disconnected: false,
        }
    }

    /// Hide snaps whose band is not linked
    pub fn hide_disconnected(mut self, hide: bool) -> Self {
        self.hide_disconnected = hide;
        self
    }

    /// The topology being ordered
    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    /// Vertices sorted by position index
    pub fn blocks_in_order(&self) -> Vec<&'a Vertex> {
        let mut vertices: Vec<_> = self.topology.vertices().collect();
        vertices.sort_by_key(|v| v.index);
        vertices
    }

    /// Edge IDs sorted by altitude
    pub fn bands_in_order(&self) -> Vec<EdgeId> {
        let mut edges: Vec<_> = self.topology.edges().collect();
        edges.sort_by_key(|e| e.altitude());
        edges.into_iter().map(|e| e.id).collect()
    }

    /// A band is linked when something can flow across it: it has an emitter
    /// and a collector, or at least one hook.
    pub fn band_is_linked(&self, edge_id: EdgeId) -> bool {
        if self.topology.transfers_of(edge_id).any(|t| t.hook().is_used()) {
            return true;
        }
        self.topology.sources_of_edge(edge_id).next().is_some()
            && self.topology.sinks_of_edge(edge_id).next().is_some()
    }

    /// Whether a connection's snap should be drawn
    pub fn snap_is_used(&self, connection: &Connection) -> bool {
        connection.state.is_active() && (!self.hide_disconnected || self.band_is_linked(connection.edge))
    }

    /// Left and right neighbors of a vertex among all vertices
    pub fn vertex_neighbors(&self, vertex_id: VertexId) -> Result<VertexNeighbors, GraphConsistencyError> {
        let vertex = self
            .topology
            .vertex(vertex_id)
            .ok_or(GraphConsistencyError::DanglingVertex(vertex_id))?;
        let indices: Vec<u32> = self.topology.vertices().map(|v| v.index).collect();
        let (left, right) = neighbors(&indices, vertex.index, GraphConsistencyError::DuplicateIndex)?;
        Ok(VertexNeighbors { left, right })
    }

    /// Left and right siblings of a connection among the used connections
    /// sharing its vertex and direction
    pub fn snap_neighbors(&self, connection_id: ConnectionId) -> Result<SnapNeighbors, GraphConsistencyError> {
        let connection = self
            .topology
            .connection(connection_id)
            .ok_or(GraphConsistencyError::DanglingConnection(connection_id))?;
        let key = self.topology.snap_key(connection)?;

        let mut orders: Vec<u32> = self
            .topology
            .connections_of_vertex(connection.vertex)
            .filter(|c| c.direction == connection.direction && self.snap_is_used(c))
            .map(|c| c.order)
            .collect();
        if !self.snap_is_used(connection) {
            orders.push(connection.order);
        }

        let (left_order, right_order) = neighbors(&orders, connection.order, |order| {
            GraphConsistencyError::DuplicateOrder {
                index: key.block_index,
                direction: key.direction,
                order,
            }
        })?;
        Ok(SnapNeighbors { left_order, right_order })
    }

    /// Bands directly above and below an edge's band
    pub fn band_stacking(&self, edge_id: EdgeId) -> Result<BandStacking, GraphConsistencyError> {
        let edge = self
            .topology
            .edge(edge_id)
            .ok_or(GraphConsistencyError::DanglingEdge(edge_id))?;
        let altitudes: Vec<i32> = self.topology.edges().map(|e| e.altitude()).collect();
        let (bottom, top) = neighbors(&altitudes, edge.altitude(), GraphConsistencyError::DuplicateAltitude)?;
        Ok(BandStacking { top, bottom })
    }

    /// Left-most and right-most objects touching an edge's band.
    ///
    /// Snaps are ranked by the index of their block and hooks by the index of
    /// their latch. On a positive band the left end is the first emitter and
    /// the right end the last collector; a negative band swaps the two roles.
    /// A hook wins over a snap when it lies further out.
    pub fn band_span(&self, edge_id: EdgeId) -> Result<BandSpan, GraphConsistencyError> {
        let edge = self
            .topology
            .edge(edge_id)
            .ok_or(GraphConsistencyError::DanglingEdge(edge_id))?;

        let mut emitters = Vec::new();
        let mut collectors = Vec::new();
        for connection in self.topology.connections_of_edge(edge_id) {
            if !self.snap_is_used(connection) {
                continue;
            }
            let key = self.topology.snap_key(connection)?;
            match connection.direction {
                Direction::Source => emitters.push(key),
                Direction::Sink => collectors.push(key),
            }
        }
        sort_by_block(&mut emitters, edge.altitude())?;
        sort_by_block(&mut collectors, edge.altitude())?;

        let (snap_left, snap_right) = match edge.band.orientation {
            BandOrientation::Positive => (emitters.first(), collectors.last()),
            BandOrientation::Negative => (collectors.first(), emitters.last()),
        };

        let mut hooks = self
            .topology
            .transfers_of(edge_id)
            .filter(|t| t.hook().is_used())
            .map(|t| self.topology.hook_label(t.hook()))
            .collect::<Result<Vec<_>, _>>()?;
        hooks.sort_by_key(|h| h.latch_index);

        Ok(BandSpan {
            leftmost: outermost(snap_left.copied(), hooks.first().copied(), |hook, snap| hook < snap),
            rightmost: outermost(snap_right.copied(), hooks.last().copied(), |hook, snap| hook > snap),
        })
    }
}

/// Nearest smaller and nearest larger key around `target`.
///
/// Fails if any key appears twice.
fn neighbors<K, F>(keys: &[K], target: K, duplicate: F) -> Result<(Option<K>, Option<K>), GraphConsistencyError>
where
    K: Ord + Copy,
    F: Fn(K) -> GraphConsistencyError,
{
    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(duplicate(pair[0]));
    }
    let left = sorted.iter().copied().rev().find(|k| *k < target);
    let right = sorted.iter().copied().find(|k| *k > target);
    Ok((left, right))
}

fn sort_by_block(keys: &mut [SnapKey], altitude: i32) -> Result<(), GraphConsistencyError> {
    keys.sort_by_key(|k| k.block_index);
    if let Some(pair) = keys.windows(2).find(|pair| pair[0].block_index == pair[1].block_index) {
        return Err(GraphConsistencyError::DuplicateConnection {
            index: pair[0].block_index,
            altitude,
            direction: pair[0].direction,
        });
    }
    Ok(())
}

/// Pick the hook when `further(hook, snap)` holds, otherwise the snap
fn outermost<F>(snap: Option<SnapKey>, hook: Option<HookLabel>, further: F) -> BandEndpoint
where
    F: Fn(u32, u32) -> bool,
{
    match (snap, hook) {
        (Some(snap), Some(hook)) if further(hook.latch_index, snap.block_index) => BandEndpoint::Hook(hook),
        (Some(snap), _) => BandEndpoint::Snap(snap),
        (None, Some(hook)) => BandEndpoint::Hook(hook),
        (None, None) => BandEndpoint::Container,
    }
}

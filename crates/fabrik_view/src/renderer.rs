// SPDX-License-Identifier: MIT OR Apache-2.0
//! The renderer contract consumed by the reconciler.

use crate::attributes::ItemAttributes;
use fabrik_topology::{BandSpan, BandStacking, FlowLabel, HookLabel, SnapKey, SnapNeighbors, VertexNeighbors};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a visual item.
///
/// The declaration order is the order items are added in; removal runs in
/// reverse so dependents go before the blocks and bands they attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// A vertex
    Block,
    /// An edge
    Band,
    /// A connection
    Snap,
    /// A transfer
    Hook,
    /// A feed
    Flow,
}

impl ItemKind {
    /// All kinds in add order
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Block,
        ItemKind::Band,
        ItemKind::Snap,
        ItemKind::Hook,
        ItemKind::Flow,
    ];

    /// Whether items of this kind are drawn only while their `is_used` holds
    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::Snap | Self::Hook | Self::Flow)
    }

    /// Lowercase display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Band => "band",
            Self::Snap => "snap",
            Self::Hook => "hook",
            Self::Flow => "flow",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key of a visual item, unique within a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKey {
    /// Block by vertex position index
    Block(u32),
    /// Band by edge altitude
    Band(i32),
    /// Snap by snap key
    Snap(SnapKey),
    /// Hook by hook label
    Hook(HookLabel),
    /// Flow by flow label
    Flow(FlowLabel),
}

impl ItemKey {
    /// Kind of the keyed item
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Block(_) => ItemKind::Block,
            Self::Band(_) => ItemKind::Band,
            Self::Snap(_) => ItemKind::Snap,
            Self::Hook(_) => ItemKind::Hook,
            Self::Flow(_) => ItemKind::Flow,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(index) => write!(f, "block {index}"),
            Self::Band(altitude) => write!(f, "band {altitude}"),
            Self::Snap(key) => write!(f, "snap {key}"),
            Self::Hook(label) => write!(f, "hook {label}"),
            Self::Flow(label) => write!(f, "flow {label}"),
        }
    }
}

/// Topology-derived placement facts for one item.
///
/// Positions are given relative to other items by key, never as coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSettings {
    /// Blocks to the left and right
    Block(VertexNeighbors),
    /// Band stacking and horizontal span
    Band {
        /// Secondary ordering key
        rank: i32,
        /// Bands above and below
        stacking: BandStacking,
        /// Objects bounding the band
        span: BandSpan,
    },
    /// Sibling snaps and the band the snap attaches to
    Snap {
        /// Siblings in the same container
        neighbors: SnapNeighbors,
        /// Altitude of the snap's band
        band_altitude: i32,
    },
    /// Bands a hook spans and the block it hangs from
    Hook {
        /// Upper band altitude
        top_band: i32,
        /// Lower band altitude
        bottom_band: i32,
        /// Latch block index
        latch: u32,
    },
    /// Blocks a flow joins
    Flow {
        /// Origin block index
        origin: u32,
        /// Destination block index
        dest: u32,
    },
}

/// Error reported by a renderer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendererError {
    /// The item is already materialized
    #[error("Item already exists: {0}")]
    DuplicateItem(ItemKey),

    /// The item is not materialized
    #[error("Unknown item: {0}")]
    UnknownItem(ItemKey),

    /// The renderer on the other end of a channel has gone away
    #[error("Renderer disconnected")]
    Disconnected,
}

/// Receiver of diagram updates.
///
/// Calls arrive in order from a single thread. Implementations backed by
/// another thread must marshal the calls themselves.
pub trait Renderer {
    /// Materialize an item
    fn add_item(&mut self, key: &ItemKey) -> Result<(), RendererError>;

    /// Destroy an item
    fn remove_item(&mut self, key: &ItemKey) -> Result<(), RendererError>;

    /// Check if an item is materialized
    fn has_item(&self, key: &ItemKey) -> bool;

    /// Push placement facts for an item
    fn set_item_settings(&mut self, key: &ItemKey, settings: &ItemSettings) -> Result<(), RendererError>;

    /// Push cosmetics for an item
    fn set_item_attributes(&mut self, key: &ItemKey, attributes: &ItemAttributes) -> Result<(), RendererError>;

    /// Run one layout pass over everything pushed so far
    fn commit_layout(&mut self) -> Result<(), RendererError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrik_topology::Direction;

    #[test]
    fn test_key_order_follows_kind_order() {
        let mut keys = vec![
            ItemKey::Flow(FlowLabel::new(0, 1)),
            ItemKey::Snap(SnapKey::new(0, Direction::Sink, 0)),
            ItemKey::Band(-4),
            ItemKey::Hook(HookLabel::new(1, 2, 3)),
            ItemKey::Block(9),
        ];
        keys.sort();
        let kinds: Vec<_> = keys.iter().map(ItemKey::kind).collect();
        assert_eq!(kinds, ItemKind::ALL.to_vec());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ItemKey::Snap(SnapKey::new(3, Direction::Source, 0)).to_string(), "snap 3e0");
        assert_eq!(ItemKey::Hook(HookLabel::new(-1, 2, 7)).to_string(), "hook -1_2_7");
        assert_eq!(ItemKey::Band(-2).to_string(), "band -2");
    }

    #[test]
    fn test_conditional_kinds() {
        assert!(!ItemKind::Block.is_conditional());
        assert!(!ItemKind::Band.is_conditional());
        assert!(ItemKind::Snap.is_conditional());
        assert!(ItemKind::Hook.is_conditional());
        assert!(ItemKind::Flow.is_conditional());
    }
}

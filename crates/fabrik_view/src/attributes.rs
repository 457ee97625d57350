// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cosmetic attributes and the provider that computes them.

use crate::config::ViewConfig;
use fabrik_topology::{Connection, Edge, Flow, Hook, NodeType, RoutingKeys, Topology, Vertex};
use serde::{Deserialize, Serialize};

/// Cosmetic facts for one item. Unset fields keep the renderer's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    /// Fill color
    pub background_color: Option<String>,
    /// Outline color
    pub border_color: Option<String>,
    /// Outline width
    pub border_width: Option<u32>,
    /// Text color
    pub label_color: Option<String>,
    /// Text
    pub label: Option<String>,
    /// Item width (bands: thickness)
    pub width: Option<u32>,
    /// Gap kept to the next item
    pub spacer_width: Option<u32>,
}

/// A live topology object that is being drawn
#[derive(Debug, Clone, Copy)]
pub enum ViewItem<'a> {
    /// Vertex behind a block
    Block(&'a Vertex),
    /// Edge behind a band
    Band(&'a Edge),
    /// Connection behind a snap
    Snap(&'a Connection),
    /// Hook of a transfer
    Hook(&'a Hook),
    /// Flow of a feed
    Flow(&'a Flow),
}

/// Supplies cosmetics for drawn items
pub trait AttributeProvider {
    /// Attributes for one item
    fn attributes(&self, topology: &Topology, item: &ViewItem<'_>) -> ItemAttributes;
}

/// Band fill colors, picked by edge name
const BAND_PALETTE: &[&str] = &[
    "IndianRed", "DarkSalmon", "Crimson", "HotPink", "DeepPink", "Coral", "OrangeRed", "DarkOrange",
    "Gold", "DarkKhaki", "Thistle", "Orchid", "MediumPurple", "DarkOrchid", "Purple", "Indigo",
    "DarkSlateBlue", "LawnGreen", "LimeGreen", "MediumSeaGreen", "ForestGreen", "OliveDrab", "Olive",
    "DarkOliveGreen", "DarkCyan", "PaleTurquoise", "Turquoise", "CadetBlue", "SteelBlue", "DodgerBlue",
];

/// Stock cosmetics keyed by node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAttributes {
    /// Gap between blocks
    pub block_spacer_width: u32,
    /// Band thickness
    pub band_width: u32,
    /// Snap width
    pub snap_width: u32,
    /// Hook width
    pub hook_width: u32,
}

impl StockAttributes {
    /// Take widths from a view config
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            block_spacer_width: config.block_spacer_width,
            band_width: config.band_width,
            snap_width: config.snap_width,
            hook_width: config.hook_width,
        }
    }

    /// Fill color of a band, stable for a given edge name
    pub fn band_color(name: &str) -> &'static str {
        // FNV-1a
        let hash = name
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3));
        BAND_PALETTE[(hash % BAND_PALETTE.len() as u64) as usize]
    }

    fn block(&self, vertex: &Vertex) -> ItemAttributes {
        let (background, label_color) = node_colors(vertex.node_type);
        let visible = vertex.node_type.is_visible();
        ItemAttributes {
            background_color: Some(background.into()),
            border_color: Some("black".into()),
            border_width: Some(u32::from(visible)),
            label_color: Some(label_color.into()),
            label: visible.then(|| vertex.name.clone()),
            width: None,
            spacer_width: Some(self.block_spacer_width),
        }
    }

    fn band(&self, edge: &Edge) -> ItemAttributes {
        ItemAttributes {
            background_color: Some(Self::band_color(&edge.name).into()),
            border_color: Some("black".into()),
            label_color: Some("black".into()),
            label: Some(edge.name.clone()),
            width: Some(self.band_width),
            ..Default::default()
        }
    }

    fn snap(&self, topology: &Topology, connection: &Connection) -> ItemAttributes {
        let node_type = topology
            .vertex(connection.vertex)
            .map_or(NodeType::Wormhole, |v| v.node_type);
        let (background, label_color) = node_colors(node_type);
        ItemAttributes {
            background_color: Some(background.into()),
            border_color: Some("black".into()),
            border_width: Some(0),
            label_color: Some(label_color.into()),
            label: Some(keys_label(connection.routing_keys.as_ref())),
            width: Some(self.snap_width),
            spacer_width: None,
        }
    }

    fn hook(&self, hook: &Hook) -> ItemAttributes {
        ItemAttributes {
            background_color: Some("white".into()),
            border_color: Some("white".into()),
            border_width: Some(1),
            label_color: Some("black".into()),
            label: Some(keys_label(hook.routing_keys.as_ref())),
            width: Some(self.hook_width),
            spacer_width: None,
        }
    }

    fn flow(&self, flow: &Flow) -> ItemAttributes {
        ItemAttributes {
            border_color: Some("black".into()),
            border_width: Some(1),
            label_color: Some("black".into()),
            label: Some(keys_label(flow.routing_keys.as_ref())),
            ..Default::default()
        }
    }
}

impl Default for StockAttributes {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

impl AttributeProvider for StockAttributes {
    fn attributes(&self, topology: &Topology, item: &ViewItem<'_>) -> ItemAttributes {
        match *item {
            ViewItem::Block(vertex) => self.block(vertex),
            ViewItem::Band(edge) => self.band(edge),
            ViewItem::Snap(connection) => self.snap(topology, connection),
            ViewItem::Hook(hook) => self.hook(hook),
            ViewItem::Flow(flow) => self.flow(flow),
        }
    }
}

/// Background and label color for a node type
fn node_colors(node_type: NodeType) -> (&'static str, &'static str) {
    match node_type {
        NodeType::Service => ("blue", "white"),
        NodeType::Queue => ("red", "black"),
        NodeType::Wormhole | NodeType::Latch => ("gray", "black"),
    }
}

fn keys_label(keys: Option<&RoutingKeys>) -> String {
    keys.map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrik_topology::{Direction, EdgeKind};

    #[test]
    fn test_block_colors_by_node_type() {
        let mut topology = Topology::new("colors");
        let service = topology.add_vertex(NodeType::Service, "svc").unwrap();
        let queue = topology.add_vertex(NodeType::Queue, "q").unwrap();
        let stock = StockAttributes::default();

        let attrs = stock.attributes(&topology, &ViewItem::Block(topology.vertex(service).unwrap()));
        assert_eq!(attrs.background_color.as_deref(), Some("blue"));
        assert_eq!(attrs.label_color.as_deref(), Some("white"));
        assert_eq!(attrs.label.as_deref(), Some("svc"));
        assert_eq!(attrs.spacer_width, Some(20));

        let attrs = stock.attributes(&topology, &ViewItem::Block(topology.vertex(queue).unwrap()));
        assert_eq!(attrs.background_color.as_deref(), Some("red"));
        assert_eq!(attrs.label_color.as_deref(), Some("black"));
    }

    #[test]
    fn test_latch_block_is_unlabelled() {
        let mut topology = Topology::new("latch");
        let a = topology.add_edge(EdgeKind::Exchange, "a").unwrap();
        let b = topology.add_edge(EdgeKind::Exchange, "b").unwrap();
        let transfer = topology.add_transfer(a, b, None).unwrap();
        let latch = topology.vertex(topology.transfer(transfer).unwrap().latch).unwrap();

        let attrs = StockAttributes::default().attributes(&topology, &ViewItem::Block(latch));
        assert_eq!(attrs.background_color.as_deref(), Some("gray"));
        assert_eq!(attrs.border_width, Some(0));
        assert_eq!(attrs.label, None);
    }

    #[test]
    fn test_snap_follows_owner_and_shows_keys() {
        let mut topology = Topology::new("snaps");
        let queue = topology.add_vertex(NodeType::Queue, "q").unwrap();
        let edge = topology.add_edge(EdgeKind::Topic, "t").unwrap();
        let id = topology
            .connect(queue, edge, Direction::Sink, Some(RoutingKeys::new(["a.*", "b.#"])))
            .unwrap();

        let stock = StockAttributes { snap_width: 12, ..Default::default() };
        let attrs = stock.attributes(&topology, &ViewItem::Snap(topology.connection(id).unwrap()));
        assert_eq!(attrs.background_color.as_deref(), Some("red"));
        assert_eq!(attrs.label.as_deref(), Some("a.*,b.#"));
        assert_eq!(attrs.width, Some(12));
    }

    #[test]
    fn test_band_color_is_stable() {
        assert_eq!(StockAttributes::band_color("orders"), StockAttributes::band_color("orders"));
        assert!(BAND_PALETTE.contains(&StockAttributes::band_color("")));
    }

    #[test]
    fn test_widths_from_config() {
        let config = ViewConfig {
            band_width: 40,
            hook_width: 3,
            ..Default::default()
        };
        let stock = StockAttributes::from_config(&config);
        assert_eq!(stock.band_width, 40);
        assert_eq!(stock.hook_width, 3);
    }
}

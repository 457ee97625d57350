// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for label codecs and layout-key uniqueness.

use fabrik_topology::label::{gen_flowlabel, gen_hooklabel, gen_snapkey, parse_flowlabel, parse_hooklabel, parse_snapkey};
use fabrik_topology::{Direction, EdgeKind, NodeType, OrderingEngine, Topology};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Vertex(u8),
    Edge,
    Connect(usize, usize, bool),
    Transfer(usize, usize),
    Feed(usize, usize),
    RemoveTransfer(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3).prop_map(Op::Vertex),
        Just(Op::Edge),
        (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(v, e, s)| Op::Connect(v, e, s)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Transfer(a, b)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Feed(a, b)),
        any::<usize>().prop_map(Op::RemoveTransfer),
    ]
}

fn apply(topology: &mut Topology, op: &Op) {
    let vertices: Vec<_> = topology.vertices().filter(|v| !v.is_latch()).map(|v| v.id).collect();
    let edges: Vec<_> = topology.edges().map(|e| e.id).collect();
    let transfers: Vec<_> = topology.transfers().map(|t| t.id).collect();
    // Rejections (duplicates, self-loops) are part of the exercised surface.
    match *op {
        Op::Vertex(kind) => {
            let node_type = [NodeType::Queue, NodeType::Service, NodeType::Wormhole][kind as usize];
            let _ = topology.add_vertex(node_type, "v");
        }
        Op::Edge => {
            let _ = topology.add_edge(EdgeKind::Exchange, "e");
        }
        Op::Connect(v, e, source) if !vertices.is_empty() && !edges.is_empty() => {
            let direction = if source { Direction::Source } else { Direction::Sink };
            let _ = topology.connect(vertices[v % vertices.len()], edges[e % edges.len()], direction, None);
        }
        Op::Transfer(a, b) if !edges.is_empty() => {
            let _ = topology.add_transfer(edges[a % edges.len()], edges[b % edges.len()], None);
        }
        Op::Feed(a, b) if !vertices.is_empty() => {
            let _ = topology.add_feed(vertices[a % vertices.len()], vertices[b % vertices.len()], None);
        }
        Op::RemoveTransfer(t) if !transfers.is_empty() => {
            let _ = topology.remove_transfer(transfers[t % transfers.len()]);
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn prop_flowlabel_roundtrip(a in any::<u32>(), b in any::<u32>()) {
        prop_assert_eq!(parse_flowlabel(&gen_flowlabel(a, b)).unwrap(), (a, b));
    }

    #[test]
    fn prop_hooklabel_roundtrip(a in any::<i32>(), b in any::<i32>(), c in any::<u32>()) {
        prop_assert_eq!(parse_hooklabel(&gen_hooklabel(a, b, c)).unwrap(), (a, b, c));
    }

    #[test]
    fn prop_snapkey_roundtrip(index in any::<u32>(), source in any::<bool>(), order in any::<u32>()) {
        let direction = if source { Direction::Source } else { Direction::Sink };
        prop_assert_eq!(parse_snapkey(&gen_snapkey(index, direction, order)).unwrap(), (index, direction, order));
    }

    #[test]
    fn prop_hooklabel_injective(
        x in (any::<i32>(), any::<i32>(), any::<u32>()),
        y in (any::<i32>(), any::<i32>(), any::<u32>()),
    ) {
        prop_assume!(x != y);
        prop_assert_ne!(gen_hooklabel(x.0, x.1, x.2), gen_hooklabel(y.0, y.1, y.2));
    }

    #[test]
    fn prop_decode_never_accepts_noncanonical(s in "[-0-9_ec]{0,12}") {
        if let Ok((a, b)) = parse_flowlabel(&s) {
            prop_assert_eq!(gen_flowlabel(a, b), s.clone());
        }
        if let Ok((a, b, c)) = parse_hooklabel(&s) {
            prop_assert_eq!(gen_hooklabel(a, b, c), s.clone());
        }
        if let Ok((a, d, c)) = parse_snapkey(&s) {
            prop_assert_eq!(gen_snapkey(a, d, c), s);
        }
    }

    #[test]
    fn prop_layout_keys_stay_unique(ops in proptest::collection::vec(op(), 0..60)) {
        let mut topology = Topology::default();
        for op in &ops {
            apply(&mut topology, op);
        }

        let indices: HashSet<_> = topology.vertices().map(|v| v.index).collect();
        prop_assert_eq!(indices.len(), topology.vertex_count());
        let altitudes: HashSet<_> = topology.edges().map(|e| e.altitude()).collect();
        prop_assert_eq!(altitudes.len(), topology.edge_count());
        prop_assert!(topology.check_consistency().is_ok());
    }

    #[test]
    fn prop_ordering_is_deterministic(ops in proptest::collection::vec(op(), 0..40), hide in any::<bool>()) {
        let mut topology = Topology::default();
        for op in &ops {
            apply(&mut topology, op);
        }

        let engine = OrderingEngine::new(&topology).hide_disconnected(hide);
        let run = || {
            let blocks: Vec<_> = topology.vertices().map(|v| engine.vertex_neighbors(v.id).unwrap()).collect();
            let snaps: Vec<_> = topology.connections().map(|c| engine.snap_neighbors(c.id).unwrap()).collect();
            let bands: Vec<_> = topology
                .edges()
                .map(|e| (engine.band_stacking(e.id).unwrap(), engine.band_span(e.id).unwrap()))
                .collect();
            (blocks, snaps, bands)
        };
        prop_assert_eq!(run(), run());
    }
}

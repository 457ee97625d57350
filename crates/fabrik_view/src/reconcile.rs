// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diffing of the live topology against materialized view items.
//!
//! A pass runs in two phases. [`Reconciler::plan`] validates the whole model
//! and computes every key, setting and attribute without touching the
//! renderer, so an inconsistent model aborts before any call is issued.
//! [`Reconciler::reconcile`] then applies the plan:
//!
//! 1. remove stale and hidden items, dependents first (flows before blocks)
//! 2. add missing items, blocks first
//! 3. push settings, then attributes, for every present item
//! 4. commit one layout pass

use crate::attributes::{AttributeProvider, ItemAttributes, ViewItem};
use crate::config::ViewConfig;
use crate::renderer::{ItemKey, ItemKind, ItemSettings, Renderer, RendererError};
use fabrik_topology::{GraphConsistencyError, OrderingEngine, Topology};
use std::collections::{BTreeMap, BTreeSet};

/// Error that aborts a reconcile pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The topology breaks an invariant; no renderer call was made
    #[error("Graph consistency error: {0}")]
    Consistency(#[from] GraphConsistencyError),

    /// The renderer rejected a call
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),
}

/// Keys of the items currently materialized, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCache {
    items: BTreeMap<ItemKind, BTreeSet<ItemKey>>,
}

impl ItemCache {
    /// Check if a key is materialized
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.get(&key.kind()).is_some_and(|keys| keys.contains(key))
    }

    /// Materialized keys of one kind, in key order
    pub fn keys(&self, kind: ItemKind) -> impl Iterator<Item = &ItemKey> {
        self.items.get(&kind).into_iter().flatten()
    }

    /// Number of materialized items
    pub fn len(&self) -> usize {
        self.items.values().map(BTreeSet::len).sum()
    }

    /// Check if nothing is materialized
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, key: ItemKey) -> bool {
        self.items.entry(key.kind()).or_default().insert(key)
    }

    fn remove(&mut self, key: &ItemKey) -> bool {
        self.items.get_mut(&key.kind()).is_some_and(|keys| keys.remove(key))
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// One item that will be present after a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    /// Item key
    pub key: ItemKey,
    /// Placement facts
    pub settings: ItemSettings,
    /// Cosmetics
    pub attributes: ItemAttributes,
}

/// Everything a pass will do, computed before any renderer call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Keys to destroy, dependents first
    pub remove: Vec<ItemKey>,
    /// Keys to create, blocks first
    pub add: Vec<ItemKey>,
    /// Every item present after the pass, in key order
    pub items: Vec<PlannedItem>,
    /// Keys in `remove` that are still live but no longer used
    pub hidden: BTreeSet<ItemKey>,
}

impl ReconcilePlan {
    /// Check if the pass creates and destroys nothing
    pub fn is_structurally_unchanged(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Counts of what a reconcile pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Items created
    pub added: usize,
    /// Items destroyed
    pub removed: usize,
    /// Destroyed items that are still in the model but not used
    pub hidden: usize,
    /// Items the renderer already held and were taken into the cache
    pub adopted: usize,
    /// Items whose settings and attributes were pushed
    pub updated: usize,
}

/// Keeps a renderer in step with a topology
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    hide_disconnected: bool,
    cache: ItemCache,
}

impl Reconciler {
    /// Create a reconciler with nothing materialized
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            hide_disconnected: config.hide_disconnected_snaps,
            cache: ItemCache::default(),
        }
    }

    /// Whether snaps on unlinked bands are hidden
    pub fn hide_disconnected(&self) -> bool {
        self.hide_disconnected
    }

    /// Hide or show snaps on unlinked bands from the next pass on
    pub fn set_hide_disconnected(&mut self, hide: bool) {
        self.hide_disconnected = hide;
    }

    /// Keys materialized by previous passes
    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    /// Forget every materialized key, e.g. after the renderer was rebuilt
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Compute the next pass without touching the renderer
    pub fn plan<P>(&self, topology: &Topology, provider: &P) -> Result<ReconcilePlan, GraphConsistencyError>
    where
        P: AttributeProvider + ?Sized,
    {
        topology.check_consistency()?;
        let engine = OrderingEngine::new(topology).hide_disconnected(self.hide_disconnected);

        let mut live = LiveItems::default();

        for vertex in topology.vertices() {
            let settings = ItemSettings::Block(engine.vertex_neighbors(vertex.id)?);
            live.show(ItemKey::Block(vertex.index), settings, ViewItem::Block(vertex))?;
        }

        for edge in topology.edges() {
            let settings = ItemSettings::Band {
                rank: edge.band.rank,
                stacking: engine.band_stacking(edge.id)?,
                span: engine.band_span(edge.id)?,
            };
            live.show(ItemKey::Band(edge.altitude()), settings, ViewItem::Band(edge))?;
        }

        for connection in topology.connections() {
            let key = ItemKey::Snap(topology.snap_key(connection)?);
            if !engine.snap_is_used(connection) {
                live.hide(key)?;
                continue;
            }
            let edge = topology
                .edge(connection.edge)
                .ok_or(GraphConsistencyError::DanglingEdge(connection.edge))?;
            let settings = ItemSettings::Snap {
                neighbors: engine.snap_neighbors(connection.id)?,
                band_altitude: edge.altitude(),
            };
            live.show(key, settings, ViewItem::Snap(connection))?;
        }

        for transfer in topology.transfers() {
            let hook = transfer.hook();
            let label = topology.hook_label(hook)?;
            if !hook.is_used() {
                live.hide(ItemKey::Hook(label))?;
                continue;
            }
            let settings = ItemSettings::Hook {
                top_band: label.top_altitude(),
                bottom_band: label.bottom_altitude(),
                latch: label.latch_index,
            };
            live.show(ItemKey::Hook(label), settings, ViewItem::Hook(hook))?;
        }

        for (label, flow) in topology.flows()? {
            if !flow.is_used() {
                live.hide(ItemKey::Flow(label))?;
                continue;
            }
            let settings = ItemSettings::Flow {
                origin: label.origin_index,
                dest: label.dest_index,
            };
            live.show(ItemKey::Flow(label), settings, ViewItem::Flow(flow))?;
        }

        let mut plan = ReconcilePlan::default();
        for kind in ItemKind::ALL.iter().rev() {
            for key in self.cache.keys(*kind) {
                if live.shown.contains_key(key) {
                    continue;
                }
                if live.unused.contains(key) {
                    plan.hidden.insert(*key);
                }
                plan.remove.push(*key);
            }
        }

        for (key, (settings, item)) in &live.shown {
            if !self.cache.contains(key) {
                plan.add.push(*key);
            }
            plan.items.push(PlannedItem {
                key: *key,
                settings: *settings,
                attributes: provider.attributes(topology, item),
            });
        }

        Ok(plan)
    }

    /// Bring the renderer in step with the topology.
    ///
    /// Fails with [`ReconcileError::Consistency`] before any renderer call if
    /// the model is inconsistent.
    pub fn reconcile<R, P>(
        &mut self,
        topology: &Topology,
        renderer: &mut R,
        provider: &P,
    ) -> Result<ReconcileReport, ReconcileError>
    where
        R: Renderer + ?Sized,
        P: AttributeProvider + ?Sized,
    {
        let plan = self.plan(topology, provider)?;
        let mut report = ReconcileReport {
            hidden: plan.hidden.len(),
            ..Default::default()
        };

        for key in &plan.remove {
            if renderer.has_item(key) {
                tracing::debug!("Removing {}", key);
                renderer.remove_item(key)?;
                report.removed += 1;
            } else {
                tracing::warn!("Renderer no longer holds {}, dropping it from the cache", key);
            }
            self.cache.remove(key);
        }

        for key in &plan.add {
            if renderer.has_item(key) {
                tracing::warn!("Renderer already holds {}, adopting it", key);
                report.adopted += 1;
            } else {
                tracing::debug!("Adding {}", key);
                renderer.add_item(key)?;
                report.added += 1;
            }
            self.cache.insert(*key);
        }

        for item in &plan.items {
            renderer.set_item_settings(&item.key, &item.settings)?;
            renderer.set_item_attributes(&item.key, &item.attributes)?;
            report.updated += 1;
        }

        renderer.commit_layout()?;

        tracing::info!(
            "Reconciled {}: {} added, {} removed ({} hidden), {} updated",
            topology.name, report.added, report.removed, report.hidden, report.updated
        );
        Ok(report)
    }
}

/// Live items of one pass, split into drawn and not drawn
#[derive(Default)]
struct LiveItems<'a> {
    shown: BTreeMap<ItemKey, (ItemSettings, ViewItem<'a>)>,
    unused: BTreeSet<ItemKey>,
}

impl<'a> LiveItems<'a> {
    fn claim(&self, key: ItemKey) -> Result<(), GraphConsistencyError> {
        if self.shown.contains_key(&key) || self.unused.contains(&key) {
            return Err(GraphConsistencyError::DuplicateItemKey(key.to_string()));
        }
        Ok(())
    }

    fn show(&mut self, key: ItemKey, settings: ItemSettings, item: ViewItem<'a>) -> Result<(), GraphConsistencyError> {
        self.claim(key)?;
        self.shown.insert(key, (settings, item));
        Ok(())
    }

    fn hide(&mut self, key: ItemKey) -> Result<(), GraphConsistencyError> {
        self.claim(key)?;
        self.unused.insert(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::StockAttributes;
    use crate::channel::RenderCommand;
    use crate::memory::MemoryRenderer;
    use fabrik_topology::{Direction, EdgeKind, FlowLabel, HookLabel, NodeType, SnapKey};

    fn sample() -> Topology {
        let mut topology = Topology::new("sample");
        let queue = topology.add_vertex(NodeType::Queue, "jobs").unwrap();
        let service = topology.add_vertex(NodeType::Service, "worker").unwrap();
        let inbox = topology.add_edge(EdgeKind::Exchange, "inbox").unwrap();
        let outbox = topology.add_edge(EdgeKind::Exchange, "outbox").unwrap();
        topology.connect(service, inbox, Direction::Source, None).unwrap();
        topology.connect(queue, inbox, Direction::Sink, None).unwrap();
        topology.add_transfer(inbox, outbox, None).unwrap();
        topology.add_feed(queue, service, None).unwrap();
        topology
    }

    #[test]
    fn test_first_pass_adds_in_kind_order() {
        let topology = sample();
        let mut reconciler = Reconciler::default();
        let mut renderer = MemoryRenderer::new();

        let report = reconciler
            .reconcile(&topology, &mut renderer, &StockAttributes::default())
            .unwrap();

        // 3 blocks (incl. latch), 2 bands, 2 snaps, 1 hook, 1 flow
        assert_eq!(report.added, 9);
        assert_eq!(report.updated, 9);
        assert_eq!(reconciler.cache().len(), 9);
        assert_eq!(renderer.layout_passes(), 1);

        let kinds: Vec<_> = renderer.added_keys().map(ItemKey::kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(renderer.calls().last(), Some(&RenderCommand::CommitLayout));
    }

    #[test]
    fn test_settings_before_attributes() {
        let topology = sample();
        let mut renderer = MemoryRenderer::new();
        Reconciler::default()
            .reconcile(&topology, &mut renderer, &StockAttributes::default())
            .unwrap();

        let calls = renderer.calls();
        for (i, call) in calls.iter().enumerate() {
            if let RenderCommand::SetItemAttributes(key, _) = call {
                assert!(matches!(&calls[i - 1], RenderCommand::SetItemSettings(k, _) if k == key));
            }
        }
    }

    #[test]
    fn test_hook_settings() {
        let topology = sample();
        let plan = Reconciler::default().plan(&topology, &StockAttributes::default()).unwrap();
        let hook = plan
            .items
            .iter()
            .find(|item| item.key == ItemKey::Hook(HookLabel::new(1, 2, 2)))
            .unwrap();
        assert_eq!(
            hook.settings,
            ItemSettings::Hook {
                top_band: 2,
                bottom_band: 1,
                latch: 2
            }
        );
        assert!(plan.items.iter().any(|item| item.key == ItemKey::Flow(FlowLabel::new(0, 1))));
    }

    #[test]
    fn test_removal_runs_dependents_first() {
        let mut topology = sample();
        let mut reconciler = Reconciler::default();
        let mut renderer = MemoryRenderer::new();
        let stock = StockAttributes::default();
        reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();

        let transfer = topology.transfers().next().unwrap().id;
        topology.remove_transfer(transfer).unwrap();
        renderer.take_calls();
        let report = reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();

        let removed: Vec<_> = renderer.removed_keys().copied().collect();
        assert_eq!(removed, vec![ItemKey::Hook(HookLabel::new(1, 2, 2)), ItemKey::Block(2)]);
        assert_eq!(report.removed, 2);
        assert_eq!(report.hidden, 0);
        assert_eq!(report.added, 0);
    }

    #[test]
    fn test_plan_leaves_cache_alone() {
        let topology = sample();
        let reconciler = Reconciler::default();
        let plan = reconciler.plan(&topology, &StockAttributes::default()).unwrap();
        assert_eq!(plan.add.len(), 9);
        assert!(reconciler.cache().is_empty());
    }

    #[test]
    fn test_existing_item_is_adopted() {
        let topology = sample();
        let mut renderer = MemoryRenderer::new();
        renderer.add_item(&ItemKey::Block(0)).unwrap();

        let report = Reconciler::default()
            .reconcile(&topology, &mut renderer, &StockAttributes::default())
            .unwrap();
        assert_eq!(report.adopted, 1);
        assert_eq!(report.added, 8);
    }

    #[test]
    fn test_reset_readopts_everything() {
        let topology = sample();
        let mut reconciler = Reconciler::default();
        let mut renderer = MemoryRenderer::new();
        let stock = StockAttributes::default();
        reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();

        reconciler.reset();
        assert!(reconciler.cache().is_empty());
        let report = reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();
        assert_eq!(report.added, 0);
        assert_eq!(report.adopted, 9);
    }

    #[test]
    fn test_toggling_hide_flag_hides_unlinked_snaps() {
        let mut topology = Topology::new("toggle");
        let service = topology.add_vertex(NodeType::Service, "svc").unwrap();
        let edge = topology.add_edge(EdgeKind::Exchange, "lonely").unwrap();
        topology.connect(service, edge, Direction::Source, None).unwrap();

        let mut reconciler = Reconciler::default();
        let mut renderer = MemoryRenderer::new();
        let stock = StockAttributes::default();
        reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();
        let snap = ItemKey::Snap(SnapKey::new(0, Direction::Source, 0));
        assert!(renderer.has_item(&snap));

        reconciler.set_hide_disconnected(true);
        let report = reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();
        assert_eq!(report.hidden, 1);
        assert!(!renderer.has_item(&snap));

        reconciler.set_hide_disconnected(false);
        let report = reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();
        assert_eq!(report.added, 1);
        assert!(renderer.has_item(&snap));
    }

    #[test]
    fn test_lost_item_is_dropped_without_remove_call() {
        let mut topology = sample();
        let mut reconciler = Reconciler::default();
        let mut renderer = MemoryRenderer::new();
        let stock = StockAttributes::default();
        reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();

        let feed = topology.feeds().next().unwrap().id;
        topology.remove_feed(feed).unwrap();
        let flow = ItemKey::Flow(FlowLabel::new(0, 1));
        renderer.remove_item(&flow).unwrap();
        renderer.take_calls();

        let report = reconciler.reconcile(&topology, &mut renderer, &stock).unwrap();
        assert_eq!(report.removed, 0);
        assert!(!reconciler.cache().contains(&flow));
        assert_eq!(renderer.removed_keys().count(), 0);
    }
}

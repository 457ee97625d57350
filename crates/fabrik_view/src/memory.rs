// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory renderer that records every call.

use crate::attributes::ItemAttributes;
use crate::channel::RenderCommand;
use crate::renderer::{ItemKey, ItemSettings, Renderer, RendererError};
use indexmap::IndexMap;
use std::sync::mpsc;

/// Last pushed state of one materialized item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneItem {
    /// Placement facts, once pushed
    pub settings: Option<ItemSettings>,
    /// Cosmetics, once pushed
    pub attributes: Option<ItemAttributes>,
}

/// A scene of items kept in memory, plus a log of the calls that built it.
///
/// Useful as a headless target and as the receiving end of a
/// [`ChannelRenderer`](crate::ChannelRenderer).
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    items: IndexMap<ItemKey, SceneItem>,
    calls: Vec<RenderCommand>,
    layout_passes: usize,
}

impl MemoryRenderer {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one item
    pub fn item(&self, key: &ItemKey) -> Option<&SceneItem> {
        self.items.get(key)
    }

    /// Materialized keys in creation order
    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.items.keys()
    }

    /// Number of materialized items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the scene is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of committed layout passes
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    /// Every call since the log was last taken
    pub fn calls(&self) -> &[RenderCommand] {
        &self.calls
    }

    /// Take the call log, leaving it empty
    pub fn take_calls(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.calls)
    }

    /// Keys passed to `add_item` in the current log
    pub fn added_keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.calls.iter().filter_map(|call| match call {
            RenderCommand::AddItem(key) => Some(key),
            _ => None,
        })
    }

    /// Keys passed to `remove_item` in the current log
    pub fn removed_keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.calls.iter().filter_map(|call| match call {
            RenderCommand::RemoveItem(key) => Some(key),
            _ => None,
        })
    }

    /// Apply one forwarded command
    pub fn apply(&mut self, command: RenderCommand) -> Result<(), RendererError> {
        match command {
            RenderCommand::AddItem(key) => self.add_item(&key),
            RenderCommand::RemoveItem(key) => self.remove_item(&key),
            RenderCommand::SetItemSettings(key, settings) => self.set_item_settings(&key, &settings),
            RenderCommand::SetItemAttributes(key, attributes) => self.set_item_attributes(&key, &attributes),
            RenderCommand::CommitLayout => self.commit_layout(),
        }
    }

    /// Apply every command already waiting on the channel
    pub fn drain(&mut self, rx: &mpsc::Receiver<RenderCommand>) -> Result<usize, RendererError> {
        let mut applied = 0;
        while let Ok(command) = rx.try_recv() {
            self.apply(command)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Apply commands until every sender is dropped
    pub fn run(mut self, rx: mpsc::Receiver<RenderCommand>) -> Result<Self, RendererError> {
        for command in rx {
            self.apply(command)?;
        }
        Ok(self)
    }

    fn item_mut(&mut self, key: &ItemKey) -> Result<&mut SceneItem, RendererError> {
        self.items.get_mut(key).ok_or(RendererError::UnknownItem(*key))
    }
}

impl Renderer for MemoryRenderer {
    fn add_item(&mut self, key: &ItemKey) -> Result<(), RendererError> {
        if self.items.contains_key(key) {
            return Err(RendererError::DuplicateItem(*key));
        }
        self.items.insert(*key, SceneItem::default());
        self.calls.push(RenderCommand::AddItem(*key));
        Ok(())
    }

    fn remove_item(&mut self, key: &ItemKey) -> Result<(), RendererError> {
        self.items
            .shift_remove(key)
            .ok_or(RendererError::UnknownItem(*key))?;
        self.calls.push(RenderCommand::RemoveItem(*key));
        Ok(())
    }

    fn has_item(&self, key: &ItemKey) -> bool {
        self.items.contains_key(key)
    }

    fn set_item_settings(&mut self, key: &ItemKey, settings: &ItemSettings) -> Result<(), RendererError> {
        self.item_mut(key)?.settings = Some(*settings);
        self.calls.push(RenderCommand::SetItemSettings(*key, *settings));
        Ok(())
    }

    fn set_item_attributes(&mut self, key: &ItemKey, attributes: &ItemAttributes) -> Result<(), RendererError> {
        self.item_mut(key)?.attributes = Some(attributes.clone());
        self.calls.push(RenderCommand::SetItemAttributes(*key, attributes.clone()));
        Ok(())
    }

    fn commit_layout(&mut self) -> Result<(), RendererError> {
        self.layout_passes += 1;
        self.calls.push(RenderCommand::CommitLayout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRenderer;
    use fabrik_topology::VertexNeighbors;

    #[test]
    fn test_scene_tracks_pushed_state() {
        let mut renderer = MemoryRenderer::new();
        let key = ItemKey::Block(4);
        let settings = ItemSettings::Block(VertexNeighbors {
            left: Some(2),
            right: None,
        });

        renderer.add_item(&key).unwrap();
        renderer.set_item_settings(&key, &settings).unwrap();
        assert_eq!(renderer.item(&key).unwrap().settings, Some(settings));
        assert_eq!(renderer.item(&key).unwrap().attributes, None);
    }

    #[test]
    fn test_unknown_items_rejected() {
        let mut renderer = MemoryRenderer::new();
        let key = ItemKey::Band(1);
        assert_eq!(
            renderer.set_item_attributes(&key, &ItemAttributes::default()),
            Err(RendererError::UnknownItem(key))
        );
        assert_eq!(renderer.remove_item(&key), Err(RendererError::UnknownItem(key)));
        assert!(renderer.calls().is_empty());
    }

    #[test]
    fn test_drain_applies_forwarded_commands() {
        let (mut sender, rx) = ChannelRenderer::new();
        sender.add_item(&ItemKey::Block(0)).unwrap();
        sender.add_item(&ItemKey::Block(1)).unwrap();
        sender.remove_item(&ItemKey::Block(0)).unwrap();
        sender.commit_layout().unwrap();

        let mut renderer = MemoryRenderer::new();
        assert_eq!(renderer.drain(&rx).unwrap(), 4);
        assert_eq!(renderer.keys().copied().collect::<Vec<_>>(), vec![ItemKey::Block(1)]);
        assert_eq!(renderer.layout_passes(), 1);
        assert_eq!(renderer.drain(&rx).unwrap(), 0);
    }

    #[test]
    fn test_take_calls_resets_log() {
        let mut renderer = MemoryRenderer::new();
        renderer.add_item(&ItemKey::Block(0)).unwrap();
        assert_eq!(renderer.take_calls().len(), 1);
        assert_eq!(renderer.added_keys().count(), 0);
        assert!(renderer.has_item(&ItemKey::Block(0)));
    }
}

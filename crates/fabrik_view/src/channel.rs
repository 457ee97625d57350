// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer that forwards calls over an `mpsc` channel.
//!
//! The reconciler runs on the host's model thread while the real renderer
//! usually lives on a UI thread. [`ChannelRenderer`] turns each call into a
//! [`RenderCommand`] and keeps a mirror of the materialized keys so
//! `has_item` can answer without a round trip.

use crate::attributes::ItemAttributes;
use crate::renderer::{ItemKey, ItemSettings, Renderer, RendererError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::mpsc;

/// One renderer call, as sent across threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Materialize an item
    AddItem(ItemKey),
    /// Destroy an item
    RemoveItem(ItemKey),
    /// Push placement facts
    SetItemSettings(ItemKey, ItemSettings),
    /// Push cosmetics
    SetItemAttributes(ItemKey, ItemAttributes),
    /// Run one layout pass
    CommitLayout,
}

impl RenderCommand {
    /// Key the command applies to, if any
    pub fn key(&self) -> Option<&ItemKey> {
        match self {
            Self::AddItem(key)
            | Self::RemoveItem(key)
            | Self::SetItemSettings(key, _)
            | Self::SetItemAttributes(key, _) => Some(key),
            Self::CommitLayout => None,
        }
    }
}

/// Renderer half that sends [`RenderCommand`]s to a receiver
#[derive(Debug)]
pub struct ChannelRenderer {
    sender: mpsc::Sender<RenderCommand>,
    mirror: BTreeSet<ItemKey>,
}

impl ChannelRenderer {
    /// Create a new channel renderer and return `(renderer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<RenderCommand>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                mirror: BTreeSet::new(),
            },
            receiver,
        )
    }

    /// Keys the receiving side holds once it has applied every command
    pub fn mirrored_keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.mirror.iter()
    }

    fn send(&self, command: RenderCommand) -> Result<(), RendererError> {
        self.sender.send(command).map_err(|_| RendererError::Disconnected)
    }

    fn require(&self, key: &ItemKey) -> Result<(), RendererError> {
        if self.mirror.contains(key) {
            Ok(())
        } else {
            Err(RendererError::UnknownItem(*key))
        }
    }
}

impl Renderer for ChannelRenderer {
    fn add_item(&mut self, key: &ItemKey) -> Result<(), RendererError> {
        if self.mirror.contains(key) {
            return Err(RendererError::DuplicateItem(*key));
        }
        self.send(RenderCommand::AddItem(*key))?;
        self.mirror.insert(*key);
        Ok(())
    }

    fn remove_item(&mut self, key: &ItemKey) -> Result<(), RendererError> {
        self.require(key)?;
        self.send(RenderCommand::RemoveItem(*key))?;
        self.mirror.remove(key);
        Ok(())
    }

    fn has_item(&self, key: &ItemKey) -> bool {
        self.mirror.contains(key)
    }

    fn set_item_settings(&mut self, key: &ItemKey, settings: &ItemSettings) -> Result<(), RendererError> {
        self.require(key)?;
        self.send(RenderCommand::SetItemSettings(*key, *settings))
    }

    fn set_item_attributes(&mut self, key: &ItemKey, attributes: &ItemAttributes) -> Result<(), RendererError> {
        self.require(key)?;
        self.send(RenderCommand::SetItemAttributes(*key, attributes.clone()))
    }

    fn commit_layout(&mut self) -> Result<(), RendererError> {
        self.send(RenderCommand::CommitLayout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let (mut renderer, rx) = ChannelRenderer::new();
        let key = ItemKey::Block(0);

        renderer.add_item(&key).unwrap();
        renderer.set_item_attributes(&key, &ItemAttributes::default()).unwrap();
        renderer.commit_layout().unwrap();

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                RenderCommand::AddItem(key),
                RenderCommand::SetItemAttributes(key, ItemAttributes::default()),
                RenderCommand::CommitLayout,
            ]
        );
    }

    #[test]
    fn test_mirror_answers_has_item() {
        let (mut renderer, _rx) = ChannelRenderer::new();
        let key = ItemKey::Band(3);
        assert!(!renderer.has_item(&key));

        renderer.add_item(&key).unwrap();
        assert!(renderer.has_item(&key));
        assert_eq!(renderer.add_item(&key), Err(RendererError::DuplicateItem(key)));

        renderer.remove_item(&key).unwrap();
        assert!(!renderer.has_item(&key));
        assert_eq!(renderer.remove_item(&key), Err(RendererError::UnknownItem(key)));
    }

    #[test]
    fn test_dropped_receiver_disconnects() {
        let (mut renderer, rx) = ChannelRenderer::new();
        drop(rx);
        assert_eq!(renderer.add_item(&ItemKey::Block(1)), Err(RendererError::Disconnected));
        assert!(!renderer.has_item(&ItemKey::Block(1)));
        assert_eq!(renderer.commit_layout(), Err(RendererError::Disconnected));
    }
}

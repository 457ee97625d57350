// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reconciliation of a Fabrik topology against a rendered diagram.
//!
//! This crate turns a [`fabrik_topology::Topology`] into calls on an abstract
//! [`Renderer`]:
//! - Blocks (one per vertex), bands (one per edge), snaps (connections),
//!   hooks (transfers) and flows (feeds) are addressed by [`ItemKey`]
//! - [`Reconciler`] diffs the live model against the keys it has materialized
//!   and issues add/remove calls, then pushes settings and attributes for
//!   every present item, then commits exactly one layout pass
//! - [`AttributeProvider`] supplies cosmetics; [`StockAttributes`] is the default
//!
//! ## Threading
//!
//! The reconciler is synchronous. A renderer that lives on another thread is
//! reached through [`ChannelRenderer`], which forwards every call as a
//! [`RenderCommand`]. Hosts that mutate the model from several threads wrap it
//! in a [`SharedDiagram`].

pub mod attributes;
pub mod channel;
pub mod config;
pub mod memory;
pub mod reconcile;
pub mod renderer;
pub mod shared;

pub use attributes::{AttributeProvider, ItemAttributes, StockAttributes, ViewItem};
pub use channel::{ChannelRenderer, RenderCommand};
pub use config::{ConfigError, ViewConfig, VIEW_CONFIG_FORMAT_VERSION};
pub use memory::{MemoryRenderer, SceneItem};
pub use reconcile::{ItemCache, PlannedItem, ReconcileError, ReconcilePlan, ReconcileReport, Reconciler};
pub use renderer::{ItemKey, ItemKind, ItemSettings, Renderer, RendererError};
pub use shared::{Diagram, SharedDiagram};

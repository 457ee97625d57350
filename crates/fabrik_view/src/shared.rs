// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thread-safe handle to a topology and its reconciler.

use crate::attributes::{AttributeProvider, StockAttributes};
use crate::config::ViewConfig;
use crate::reconcile::{ReconcileError, ReconcileReport, Reconciler};
use crate::renderer::Renderer;
use fabrik_topology::Topology;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// A topology together with the state needed to draw it
pub struct Diagram {
    /// The model
    pub topology: Topology,
    /// Materialized-key cache and visibility flag
    pub reconciler: Reconciler,
    provider: Box<dyn AttributeProvider + Send>,
}

impl Diagram {
    /// Create a diagram drawn with the stock attributes of `config`
    pub fn new(topology: Topology, config: &ViewConfig) -> Self {
        Self::with_provider(topology, config, Box::new(StockAttributes::from_config(config)))
    }

    /// Create a diagram drawn with a custom attribute provider
    pub fn with_provider(
        topology: Topology,
        config: &ViewConfig,
        provider: Box<dyn AttributeProvider + Send>,
    ) -> Self {
        Self {
            topology,
            reconciler: Reconciler::new(config),
            provider,
        }
    }

    /// Run one reconcile pass against `renderer`
    pub fn update_view<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<ReconcileReport, ReconcileError> {
        self.reconciler.reconcile(&self.topology, renderer, self.provider.as_ref())
    }
}

/// Shared, lock-guarded [`Diagram`].
///
/// Model mutations and reconcile passes each take the lock for their whole
/// duration, so a background refresh thread and a view thread never
/// interleave inside one call.
#[derive(Clone)]
pub struct SharedDiagram {
    inner: Arc<Mutex<Diagram>>,
}

impl SharedDiagram {
    /// Wrap a topology drawn with the stock attributes of `config`
    pub fn new(topology: Topology, config: &ViewConfig) -> Self {
        Self::from_diagram(Diagram::new(topology, config))
    }

    /// Wrap an existing diagram
    pub fn from_diagram(diagram: Diagram) -> Self {
        Self {
            inner: Arc::new(Mutex::new(diagram)),
        }
    }

    /// Mutate the topology under the lock
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Topology) -> T) -> T {
        f(&mut self.inner.lock().topology)
    }

    /// Read the topology under the lock
    pub fn read<T>(&self, f: impl FnOnce(&Topology) -> T) -> T {
        f(&self.inner.lock().topology)
    }

    /// Hide or show snaps on unlinked bands from the next pass on
    pub fn set_hide_disconnected(&self, hide: bool) {
        self.inner.lock().reconciler.set_hide_disconnected(hide);
    }

    /// Run one reconcile pass under the lock
    pub fn update_view<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<ReconcileReport, ReconcileError> {
        self.inner.lock().update_view(renderer)
    }

    /// Hold the lock across several operations
    pub fn lock(&self) -> MutexGuard<'_, Diagram> {
        self.inner.lock()
    }
}

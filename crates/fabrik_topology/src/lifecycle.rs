// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lifecycle state of connections and visual projections.

use serde::{Deserialize, Serialize};

/// Whether an object is still attached to the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Owned by a live topology object
    #[default]
    Active,
    /// Detached from the topology; the back-reference is no longer valid
    Released,
}

impl Lifecycle {
    /// Check if the object is still attached
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

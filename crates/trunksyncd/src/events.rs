//! Typed lifecycle event dispatch.
//!
//! The host's event-delivery layer used to be a duck-typed
//! publish/subscribe registry; here it is an explicit map from a fixed
//! enum of (resource, phase) pairs to typed handlers. The host looks up
//! whether the driver subscribes to a pair and, if so, invokes
//! [`TrunkDriver::dispatch`](crate::TrunkDriver::dispatch) synchronously
//! with the matching payload variant.

use std::collections::HashSet;

use trunksync_common::types::{Port, Subport, Trunk};

/// Resources whose lifecycle events the synchronizer can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Trunk lifecycle events.
    Trunk,
    /// Subport membership events.
    Subports,
}

/// Event phases delivered by the host.
///
/// `After*` phases fire once the triggering change is durable;
/// `Precommit*` phases fire before, exposing the desired state so the
/// change can still be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AfterCreate,
    AfterUpdate,
    AfterDelete,
    PrecommitCreate,
    PrecommitDelete,
}

/// Registry of the (resource, phase) pairs a driver handles.
///
/// The host's dispatcher consults the registry and, for registered
/// pairs, invokes [`TrunkDriver::dispatch`](crate::TrunkDriver::dispatch),
/// which resolves the pair to its typed handler.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: HashSet<(ResourceKind, Phase)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a (resource, phase) pair.
    pub fn subscribe(&mut self, kind: ResourceKind, phase: Phase) {
        self.entries.insert((kind, phase));
    }

    /// Returns true if the pair is registered.
    pub fn contains(&self, kind: ResourceKind, phase: Phase) -> bool {
        self.entries.contains(&(kind, phase))
    }
}

/// Strongly-typed event payload, one variant per (resource, phase)
/// family.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// Trunk state snapshot for post-commit trunk events.
    TrunkState {
        trunk: Trunk,
    },

    /// Trunk snapshot plus the explicit set of affected subports, for
    /// subport membership events.
    SubportState {
        trunk: Trunk,
        subports: Vec<Subport>,
    },

    /// Desired trunk plus its intended parent port, for pre-commit
    /// creation validation.
    PrecommitTrunkCreate {
        desired: Trunk,
        parent_port: Port,
    },

    /// Trunk being deleted plus its parent port, for pre-commit deletion
    /// validation.
    PrecommitTrunkDelete {
        trunk: Trunk,
        parent_port: Port,
    },
}

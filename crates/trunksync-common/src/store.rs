//! Store contracts: the local port database and the remote northbound
//! control-plane store.
//!
//! Both are injected into the synchronizer as trait objects; the real
//! implementations belong to the host. `trunksync-test` ships in-memory
//! implementations for tests.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::TrunkSyncResult;
use crate::revision::EntityKind;
use crate::types::{BindingProfile, Port, PortStatus, TrunkStatus, VifType};

/// The remote store's representation of a logical port.
///
/// This is the externally-authoritative mirror the synchronizer keeps
/// consistent with the local port database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalPortRecord {
    /// Port identifier.
    pub id: String,
    /// Trunk parent reference; `None` when not attached.
    pub parent: Option<String>,
    /// VLAN tag; `None` when not attached.
    pub tag: Option<u16>,
    /// Whether the logical port is up.
    pub up: bool,
    /// Auxiliary metadata mirroring local attributes.
    pub external_ids: BTreeMap<String, String>,
}

/// One operation inside a remote transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NbOp {
    /// Abort the whole transaction if the store's recorded revision for
    /// `entity_id` is newer than `revision`.
    CheckRevision {
        entity_id: String,
        revision: u64,
        kind: EntityKind,
    },

    /// Write trunk attributes on a logical port record.
    ///
    /// `parent`/`tag` set to `None` clear the attribute; `up` set to
    /// `None` leaves the flag untouched; `external_ids` entries are
    /// merged into the record's metadata.
    SetLogicalPort {
        id: String,
        parent: Option<String>,
        tag: Option<u16>,
        up: Option<bool>,
        external_ids: BTreeMap<String, String>,
    },
}

/// A remote transaction under construction: an ordered batch of ops
/// committed as one unit.
#[derive(Debug, Default)]
pub struct NbTransaction {
    check_error: bool,
    ops: Vec<NbOp>,
}

impl NbTransaction {
    /// Opens a new transaction. With `check_error` set, any failing op
    /// (including a revision check) rejects the whole batch.
    pub fn new(check_error: bool) -> Self {
        Self {
            check_error,
            ops: Vec::new(),
        }
    }

    /// Appends an op to the batch.
    pub fn add(&mut self, op: NbOp) {
        self.ops.push(op);
    }

    /// Whether op failures reject the whole batch.
    pub fn check_error(&self) -> bool {
        self.check_error
    }

    /// The ops collected so far, in append order.
    pub fn ops(&self) -> &[NbOp] {
        &self.ops
    }

    /// Consumes the transaction, yielding its ops.
    pub fn into_ops(self) -> Vec<NbOp> {
        self.ops
    }
}

/// Contract for the remote northbound control-plane store.
#[async_trait]
pub trait NorthboundStore: Send + Sync {
    /// Looks up a logical port record; `None` when the port is not known
    /// to the remote store.
    async fn lookup_logical_port(&self, id: &str) -> TrunkSyncResult<Option<LogicalPortRecord>>;

    /// Commits a transaction.
    ///
    /// Atomic: either every op takes effect or none does. A failed
    /// revision check surfaces as
    /// [`TrunkSyncError::RevisionConflict`](crate::TrunkSyncError::RevisionConflict).
    async fn commit(&self, txn: NbTransaction) -> TrunkSyncResult<()>;
}

/// Field update for a port binding, keyed externally by (port id, host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingUpdate {
    /// New binding profile.
    pub profile: BindingProfile,
    /// New VIF type.
    pub vif_type: VifType,
    /// When set, re-keys the binding onto this host.
    pub host: Option<String>,
}

/// One operation inside a local write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortOp {
    /// Update top-level port fields.
    UpdatePort {
        id: String,
        device_owner: String,
        status: PortStatus,
    },

    /// Update a binding selected by (port id, host).
    UpdatePortBinding {
        port_id: String,
        host: String,
        update: BindingUpdate,
    },

    /// Delete the binding-level rows (scheduling placement state) tied to
    /// a binding. An unbound port must not retain leftover placement
    /// state.
    DeleteBindingLevels { port_id: String, host: String },
}

/// Contract for the local port persistence layer.
#[async_trait]
pub trait PortStore: Send + Sync {
    /// Fetches a port with its bindings; `None` when it does not exist.
    async fn get_port(&self, id: &str) -> TrunkSyncResult<Option<Port>>;

    /// Applies a write batch atomically: either the full batch lands or
    /// none of it does. A lost race with another local writer surfaces as
    /// [`TrunkSyncError::LocalConflict`](crate::TrunkSyncError::LocalConflict).
    async fn apply(&self, ops: Vec<PortOp>) -> TrunkSyncResult<()>;

    /// Advances the entity's revision counter after a committed
    /// synchronization; returns the new revision.
    async fn bump_revision(&self, entity_id: &str, kind: EntityKind) -> TrunkSyncResult<u64>;

    /// Records a trunk's status.
    async fn update_trunk_status(
        &self,
        trunk_id: &str,
        status: TrunkStatus,
    ) -> TrunkSyncResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::RevisionGuard;

    #[test]
    fn test_transaction_collects_ops_in_order() {
        let mut txn = NbTransaction::new(true);
        txn.add(RevisionGuard::check_op("p1", 1, EntityKind::Ports));
        txn.add(NbOp::SetLogicalPort {
            id: "p1".to_string(),
            parent: Some("parent".to_string()),
            tag: Some(10),
            up: None,
            external_ids: BTreeMap::new(),
        });

        assert!(txn.check_error());
        assert_eq!(txn.ops().len(), 2);
        assert!(matches!(txn.ops()[0], NbOp::CheckRevision { .. }));
        assert!(matches!(txn.ops()[1], NbOp::SetLogicalPort { .. }));
    }
}

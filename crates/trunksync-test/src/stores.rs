//! In-memory store implementations.
//!
//! Both stores honor the contract semantics the synchronizer relies on:
//! atomic local batches, check-error remote transactions, and per-entity
//! revision enforcement. They additionally expose inspection helpers and
//! failure injection for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use trunksync_common::store::{
    LogicalPortRecord, NbOp, NbTransaction, NorthboundStore, PortOp, PortStore,
};
use trunksync_common::types::{Port, TrunkStatus};
use trunksync_common::{EntityKind, TrunkSyncError, TrunkSyncResult};

#[derive(Default)]
struct PortStoreInner {
    ports: HashMap<String, Port>,
    revisions: HashMap<String, u64>,
    trunk_status: HashMap<String, TrunkStatus>,
    binding_levels: HashSet<(String, String)>,
    fail_next_apply: bool,
    apply_count: usize,
}

/// In-memory local port store.
#[derive(Default)]
pub struct MemPortStore {
    inner: Mutex<PortStoreInner>,
}

impl MemPortStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a port, seeding its revision counter from the record.
    pub fn insert_port(&self, port: Port) {
        let mut inner = self.inner.lock();
        inner.revisions.insert(port.id.clone(), port.revision);
        inner.ports.insert(port.id.clone(), port);
    }

    /// Seeds a binding-level placement row for (port, host).
    pub fn seed_binding_level(&self, port_id: &str, host: &str) {
        self.inner
            .lock()
            .binding_levels
            .insert((port_id.to_string(), host.to_string()));
    }

    /// Returns a snapshot of a port.
    pub fn port(&self, id: &str) -> Option<Port> {
        self.snapshot(&self.inner.lock(), id)
    }

    /// Returns the recorded status of a trunk, if any was written.
    pub fn trunk_status(&self, trunk_id: &str) -> Option<TrunkStatus> {
        self.inner.lock().trunk_status.get(trunk_id).copied()
    }

    /// Returns an entity's current revision.
    pub fn revision(&self, entity_id: &str) -> u64 {
        self.inner
            .lock()
            .revisions
            .get(entity_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns true if a binding-level row exists for (port, host).
    pub fn has_binding_level(&self, port_id: &str, host: &str) -> bool {
        self.inner
            .lock()
            .binding_levels
            .contains(&(port_id.to_string(), host.to_string()))
    }

    /// Number of committed local write batches.
    pub fn apply_count(&self) -> usize {
        self.inner.lock().apply_count
    }

    /// Makes the next `apply` fail with a local write conflict.
    pub fn fail_next_apply(&self) {
        self.inner.lock().fail_next_apply = true;
    }

    fn snapshot(&self, inner: &PortStoreInner, id: &str) -> Option<Port> {
        inner.ports.get(id).map(|p| {
            let mut port = p.clone();
            port.revision = inner.revisions.get(id).copied().unwrap_or(port.revision);
            port
        })
    }
}

#[async_trait]
impl PortStore for MemPortStore {
    async fn get_port(&self, id: &str) -> TrunkSyncResult<Option<Port>> {
        let inner = self.inner.lock();
        Ok(self.snapshot(&inner, id))
    }

    async fn apply(&self, ops: Vec<PortOp>) -> TrunkSyncResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_next_apply {
            inner.fail_next_apply = false;
            let entity = ops
                .first()
                .map(|op| match op {
                    PortOp::UpdatePort { id, .. } => id.clone(),
                    PortOp::UpdatePortBinding { port_id, .. }
                    | PortOp::DeleteBindingLevels { port_id, .. } => port_id.clone(),
                })
                .unwrap_or_default();
            return Err(TrunkSyncError::local_conflict(
                entity,
                "injected write conflict",
            ));
        }

        // Validate the whole batch against the pre-batch state so a bad
        // op has no partial effect. Binding targets are resolved to
        // indices here: a (port, host) key must select the binding that
        // held that host before the batch, not one an earlier op in the
        // same batch re-keyed onto it.
        let mut binding_targets = Vec::with_capacity(ops.len());
        for op in &ops {
            match op {
                PortOp::UpdatePort { id, .. } => {
                    if !inner.ports.contains_key(id) {
                        return Err(TrunkSyncError::store(
                            "apply",
                            format!("no such port: {}", id),
                        ));
                    }
                    binding_targets.push(None);
                }
                PortOp::UpdatePortBinding { port_id, host, .. } => {
                    let index = inner
                        .ports
                        .get(port_id)
                        .and_then(|p| p.bindings.iter().position(|b| &b.host == host));
                    let Some(index) = index else {
                        return Err(TrunkSyncError::store(
                            "apply",
                            format!("no such binding: ({}, {})", port_id, host),
                        ));
                    };
                    binding_targets.push(Some(index));
                }
                PortOp::DeleteBindingLevels { .. } => binding_targets.push(None),
            }
        }

        for (op, target) in ops.into_iter().zip(binding_targets) {
            match op {
                PortOp::UpdatePort {
                    id,
                    device_owner,
                    status,
                } => {
                    let port = inner.ports.get_mut(&id).unwrap();
                    port.device_owner = device_owner;
                    port.status = status;
                }
                PortOp::UpdatePortBinding {
                    port_id, update, ..
                } => {
                    let port = inner.ports.get_mut(&port_id).unwrap();
                    let binding = &mut port.bindings[target.unwrap()];
                    binding.profile = update.profile;
                    binding.vif_type = update.vif_type;
                    if let Some(new_host) = update.host {
                        binding.host = new_host;
                    }
                }
                PortOp::DeleteBindingLevels { port_id, host } => {
                    inner.binding_levels.remove(&(port_id, host));
                }
            }
        }
        inner.apply_count += 1;
        Ok(())
    }

    async fn bump_revision(&self, entity_id: &str, _kind: EntityKind) -> TrunkSyncResult<u64> {
        let mut inner = self.inner.lock();
        let rev = inner.revisions.entry(entity_id.to_string()).or_insert(0);
        *rev += 1;
        let rev = *rev;
        if let Some(port) = inner.ports.get_mut(entity_id) {
            port.revision = rev;
        }
        Ok(rev)
    }

    async fn update_trunk_status(
        &self,
        trunk_id: &str,
        status: TrunkStatus,
    ) -> TrunkSyncResult<()> {
        self.inner
            .lock()
            .trunk_status
            .insert(trunk_id.to_string(), status);
        Ok(())
    }
}


#[derive(Default)]
struct NorthboundInner {
    records: HashMap<String, LogicalPortRecord>,
    revisions: HashMap<String, u64>,
    commit_count: usize,
    write_count: usize,
}

/// In-memory remote northbound store.
#[derive(Default)]
pub struct MemNorthbound {
    inner: Mutex<NorthboundInner>,
}

impl MemNorthbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a logical port record.
    pub fn insert_logical_port(&self, record: LogicalPortRecord) {
        self.inner.lock().records.insert(record.id.clone(), record);
    }

    /// Removes a logical port record.
    pub fn remove_logical_port(&self, id: &str) {
        self.inner.lock().records.remove(id);
    }

    /// Returns a snapshot of a logical port record.
    pub fn logical_port(&self, id: &str) -> Option<LogicalPortRecord> {
        self.inner.lock().records.get(id).cloned()
    }

    /// Returns the store's committed revision for an entity.
    pub fn stored_revision(&self, entity_id: &str) -> Option<u64> {
        self.inner.lock().revisions.get(entity_id).copied()
    }

    /// Pins the store's revision for an entity, simulating a newer write
    /// committed by another party.
    pub fn set_stored_revision(&self, entity_id: &str, revision: u64) {
        self.inner
            .lock()
            .revisions
            .insert(entity_id.to_string(), revision);
    }

    /// Number of committed transactions.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().commit_count
    }

    /// Number of logical port writes applied across all commits.
    pub fn write_count(&self) -> usize {
        self.inner.lock().write_count
    }
}

#[async_trait]
impl NorthboundStore for MemNorthbound {
    async fn lookup_logical_port(&self, id: &str) -> TrunkSyncResult<Option<LogicalPortRecord>> {
        Ok(self.inner.lock().records.get(id).cloned())
    }

    async fn commit(&self, txn: NbTransaction) -> TrunkSyncResult<()> {
        let check_error = txn.check_error();
        let ops = txn.into_ops();
        let mut inner = self.inner.lock();

        // Evaluate every check before applying anything; an abort has no
        // partial effect.
        let mut accepted: Vec<(String, u64)> = Vec::new();
        for op in &ops {
            if let NbOp::CheckRevision {
                entity_id,
                revision,
                ..
            } = op
            {
                let stored = inner.revisions.get(entity_id).copied().unwrap_or(0);
                if stored > *revision {
                    if check_error {
                        return Err(TrunkSyncError::revision_conflict(
                            entity_id.clone(),
                            *revision,
                            stored,
                        ));
                    }
                    return Ok(());
                }
                accepted.push((entity_id.clone(), *revision));
            }
        }

        for op in ops {
            if let NbOp::SetLogicalPort {
                id,
                parent,
                tag,
                up,
                external_ids,
            } = op
            {
                let record = inner.records.entry(id.clone()).or_insert_with(|| {
                    LogicalPortRecord {
                        id: id.clone(),
                        ..Default::default()
                    }
                });
                record.parent = parent;
                record.tag = tag;
                if let Some(up) = up {
                    record.up = up;
                }
                record.external_ids.extend(external_ids);
                inner.write_count += 1;
            }
        }
        for (entity_id, revision) in accepted {
            inner.revisions.insert(entity_id, revision);
        }
        inner.commit_count += 1;
        Ok(())
    }
}

//! Transactional mutation applier.
//!
//! Commits one subport's local and remote mutation as a unit. The remote
//! transaction (revision check + logical port write) commits first; only
//! then is the local batch applied and the entity's revision bumped. A
//! remote failure therefore never leaves the local write committed. The
//! reverse is not guaranteed by the stores - a local failure after the
//! remote commit leaves the entity unsynchronized until the next event,
//! which the revision scheme accepts and corrects rather than requiring
//! true two-phase commit.

use std::sync::Arc;
use tracing::debug;

use trunksync_common::store::{NbTransaction, NorthboundStore, PortStore};
use trunksync_common::{EntityKind, RevisionGuard, TrunkSyncResult};

use crate::mutator::Mutation;

/// Applies computed mutations against both stores.
pub struct TxnApplier {
    local: Arc<dyn PortStore>,
    remote: Arc<dyn NorthboundStore>,
}

impl TxnApplier {
    /// Creates an applier over the two stores.
    pub fn new(local: Arc<dyn PortStore>, remote: Arc<dyn NorthboundStore>) -> Self {
        Self { local, remote }
    }

    /// Commits `mutation` for one subport; returns the entity's new
    /// revision.
    ///
    /// Safe to retry: a stale retry is rejected by the revision check
    /// with no partial effect on either store.
    pub async fn apply(&self, mutation: Mutation) -> TrunkSyncResult<u64> {
        let entity_id = mutation.port.id.clone();

        let mut txn = NbTransaction::new(true);
        txn.add(RevisionGuard::check_op(
            &entity_id,
            mutation.port.revision,
            EntityKind::Ports,
        ));
        txn.add(mutation.remote_op);
        self.remote.commit(txn).await?;

        self.local.apply(mutation.local_ops).await?;

        let revision = self.local.bump_revision(&entity_id, EntityKind::Ports).await?;
        debug!(port = %entity_id, revision, "committed subport mutation");
        Ok(revision)
    }
}

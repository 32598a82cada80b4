//! TrunkHandler - the trunk lifecycle coordinator.
//!
//! Reacts to trunk and subport lifecycle events, decides which subports
//! need attaching or detaching, guards against trunks whose parent port
//! is not under this system's authority, and advances the trunk's own
//! status once a batch completes.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use trunksync_common::store::{NorthboundStore, PortStore};
use trunksync_common::types::{PortBinding, PortStatus, Subport, Trunk, TrunkStatus};
use trunksync_common::TrunkSyncResult;

use crate::applier::TxnApplier;
use crate::mutator::{attach_mutation, detach_mutation};

/// Coordinates trunk lifecycle events against the two stores.
///
/// Each attach/detach batch processes subports one at a time, each under
/// its own applier transaction; no atomicity is claimed across subports.
/// A vanished subport port is skipped; the first unhandled error stops
/// the remaining batch and propagates to the event-delivery layer.
pub struct TrunkHandler {
    local: Arc<dyn PortStore>,
    remote: Arc<dyn NorthboundStore>,
    applier: TxnApplier,
}

impl TrunkHandler {
    /// Creates a handler over the two stores.
    pub fn new(local: Arc<dyn PortStore>, remote: Arc<dyn NorthboundStore>) -> Self {
        let applier = TxnApplier::new(local.clone(), remote.clone());
        Self {
            local,
            remote,
            applier,
        }
    }

    /// Returns true if the parent port is known to the remote store.
    ///
    /// A trunk whose parent the remote store has never heard of is
    /// outside this system's authority; its events are no-ops.
    async fn parent_is_known(&self, parent_port_id: &str) -> TrunkSyncResult<bool> {
        Ok(self
            .remote
            .lookup_logical_port(parent_port_id)
            .await?
            .is_some())
    }

    /// Resolves the parent's status and last-active binding once per
    /// batch.
    async fn parent_state(
        &self,
        parent_port_id: &str,
    ) -> TrunkSyncResult<Option<(PortStatus, Option<PortBinding>)>> {
        let Some(parent) = self.local.get_port(parent_port_id).await? else {
            return Ok(None);
        };
        let binding = parent.active_binding().cloned();
        Ok(Some((parent.status, binding)))
    }

    /// Attaches each subport to the parent, one transaction per subport.
    async fn set_sub_ports(
        &self,
        parent_port_id: &str,
        subports: &[Subport],
    ) -> TrunkSyncResult<()> {
        let Some((parent_status, parent_binding)) = self.parent_state(parent_port_id).await?
        else {
            // Parent known remotely but gone locally: a concurrent
            // deletion is tearing the trunk down, nothing to attach to.
            warn!(parent = %parent_port_id, "parent port vanished, skipping attach batch");
            return Ok(());
        };

        for subport in subports {
            debug!(parent = %parent_port_id, subport = %subport.port_id, "setting parent");
            let Some(port) = self.local.get_port(&subport.port_id).await? else {
                debug!(
                    subport = %subport.port_id,
                    "port not found while setting binding profile, skipping"
                );
                continue;
            };
            let mutation = attach_mutation(
                port,
                subport,
                parent_port_id,
                parent_status,
                parent_binding.as_ref(),
            );
            self.applier.apply(mutation).await?;
            debug!(parent = %parent_port_id, subport = %subport.port_id, "done setting parent");
        }
        Ok(())
    }

    /// Detaches each subport, one transaction per subport.
    async fn unset_sub_ports(&self, subports: &[Subport]) -> TrunkSyncResult<()> {
        for subport in subports {
            debug!(subport = %subport.port_id, "unsetting parent");
            let Some(port) = self.local.get_port(&subport.port_id).await? else {
                debug!(
                    subport = %subport.port_id,
                    "port not found while unsetting binding profile, skipping"
                );
                continue;
            };
            let mutation = detach_mutation(port);
            self.applier.apply(mutation).await?;
            debug!(subport = %subport.port_id, "done unsetting parent");
        }
        Ok(())
    }

    /// Handles trunk creation: attach any pre-existing subports, then
    /// mark the trunk `ACTIVE` unconditionally.
    #[instrument(skip(self, trunk), fields(trunk = %trunk.id))]
    pub async fn trunk_created(&self, trunk: &Trunk) -> TrunkSyncResult<()> {
        if !self.parent_is_known(&trunk.port_id).await? {
            return Ok(());
        }
        if !trunk.sub_ports.is_empty() {
            self.set_sub_ports(&trunk.port_id, &trunk.sub_ports).await?;
        }
        self.local
            .update_trunk_status(&trunk.id, TrunkStatus::Active)
            .await
    }

    /// Handles trunk update: re-attach current subports; the trunk's
    /// status is not forced.
    #[instrument(skip(self, trunk), fields(trunk = %trunk.id))]
    pub async fn trunk_updated(&self, trunk: &Trunk) -> TrunkSyncResult<()> {
        if !self.parent_is_known(&trunk.port_id).await? {
            return Ok(());
        }
        if !trunk.sub_ports.is_empty() {
            self.set_sub_ports(&trunk.port_id, &trunk.sub_ports).await?;
        }
        Ok(())
    }

    /// Handles trunk deletion: detach all subports. The trunk record
    /// itself is going away, so its status is not touched, and no
    /// remote-authority check applies.
    #[instrument(skip(self, trunk), fields(trunk = %trunk.id))]
    pub async fn trunk_deleted(&self, trunk: &Trunk) -> TrunkSyncResult<()> {
        if !trunk.sub_ports.is_empty() {
            self.unset_sub_ports(&trunk.sub_ports).await?;
        }
        Ok(())
    }

    /// Handles subport addition: attach exactly the added subset, then
    /// mark the trunk `ACTIVE`.
    #[instrument(skip(self, trunk, subports), fields(trunk = %trunk.id))]
    pub async fn subports_added(
        &self,
        trunk: &Trunk,
        subports: &[Subport],
    ) -> TrunkSyncResult<()> {
        if !self.parent_is_known(&trunk.port_id).await? {
            return Ok(());
        }
        if !subports.is_empty() {
            self.set_sub_ports(&trunk.port_id, subports).await?;
        }
        self.local
            .update_trunk_status(&trunk.id, TrunkStatus::Active)
            .await
    }

    /// Handles subport removal: detach exactly the removed subset, then
    /// mark the trunk `ACTIVE`.
    #[instrument(skip(self, trunk, subports), fields(trunk = %trunk.id))]
    pub async fn subports_deleted(
        &self,
        trunk: &Trunk,
        subports: &[Subport],
    ) -> TrunkSyncResult<()> {
        if !self.parent_is_known(&trunk.port_id).await? {
            return Ok(());
        }
        if !subports.is_empty() {
            self.unset_sub_ports(subports).await?;
        }
        self.local
            .update_trunk_status(&trunk.id, TrunkStatus::Active)
            .await
    }
}

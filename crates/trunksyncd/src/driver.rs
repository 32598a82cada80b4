//! Driver registration and capability advertisement.

use std::sync::Arc;
use tracing::info;

use trunksync_common::store::{NorthboundStore, PortStore};
use trunksync_common::types::{SegmentationType, VifType};
use trunksync_common::{TrunkSyncError, TrunkSyncResult};

use crate::events::{EventPayload, HandlerRegistry, Phase, ResourceKind};
use crate::handler::TrunkHandler;
use crate::validator::{validate_trunk_create, validate_trunk_delete};

/// VIF types the synchronizer can trunk.
pub const SUPPORTED_VIF_TYPES: &[VifType] = &[VifType::Ovs, VifType::VhostUser];

/// Segmentation types the synchronizer supports.
pub const SUPPORTED_SEGMENTATION_TYPES: &[SegmentationType] = &[SegmentationType::Vlan];

/// Static capability set advertised at registration time.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Supported VIF types.
    pub vif_types: &'static [VifType],
    /// Supported segmentation types.
    pub segmentation_types: &'static [SegmentationType],
    /// Whether a port that is already bound may become a trunk parent.
    pub can_trunk_bound_port: bool,
}

/// The trunk synchronizer driver: the handler plus the registry of
/// (resource, phase) pairs it handles.
pub struct TrunkDriver {
    handler: TrunkHandler,
    registry: HandlerRegistry,
}

impl TrunkDriver {
    /// Registers the driver over the two stores, wiring the full
    /// handler registry: every trunk phase, plus subport membership
    /// changes.
    pub fn register(local: Arc<dyn PortStore>, remote: Arc<dyn NorthboundStore>) -> Self {
        let mut registry = HandlerRegistry::new();
        for phase in [
            Phase::AfterCreate,
            Phase::AfterUpdate,
            Phase::AfterDelete,
            Phase::PrecommitCreate,
            Phase::PrecommitDelete,
        ] {
            registry.subscribe(ResourceKind::Trunk, phase);
        }
        for phase in [Phase::AfterCreate, Phase::AfterDelete] {
            registry.subscribe(ResourceKind::Subports, phase);
        }

        info!("trunk synchronizer driver registered");
        Self {
            handler: TrunkHandler::new(local, remote),
            registry,
        }
    }

    /// Returns the driver's advertised capabilities.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            vif_types: SUPPORTED_VIF_TYPES,
            segmentation_types: SUPPORTED_SEGMENTATION_TYPES,
            can_trunk_bound_port: true,
        }
    }

    /// Returns true if the driver subscribes to the (resource, phase)
    /// pair.
    pub fn handles(&self, kind: ResourceKind, phase: Phase) -> bool {
        self.registry.contains(kind, phase)
    }

    /// Direct access to the lifecycle handler.
    pub fn handler(&self) -> &TrunkHandler {
        &self.handler
    }

    /// Dispatches one lifecycle event to its typed handler.
    ///
    /// Unsubscribed pairs are no-ops. A payload variant that does not
    /// match the (resource, phase) pair is a host bug and surfaces as an
    /// internal error.
    pub async fn dispatch(
        &self,
        kind: ResourceKind,
        phase: Phase,
        payload: EventPayload,
    ) -> TrunkSyncResult<()> {
        if !self.handles(kind, phase) {
            return Ok(());
        }
        match (kind, phase, payload) {
            (ResourceKind::Trunk, Phase::AfterCreate, EventPayload::TrunkState { trunk }) => {
                self.handler.trunk_created(&trunk).await
            }
            (ResourceKind::Trunk, Phase::AfterUpdate, EventPayload::TrunkState { trunk }) => {
                self.handler.trunk_updated(&trunk).await
            }
            (ResourceKind::Trunk, Phase::AfterDelete, EventPayload::TrunkState { trunk }) => {
                self.handler.trunk_deleted(&trunk).await
            }
            (
                ResourceKind::Trunk,
                Phase::PrecommitCreate,
                EventPayload::PrecommitTrunkCreate { parent_port, .. },
            ) => validate_trunk_create(&parent_port),
            (
                ResourceKind::Trunk,
                Phase::PrecommitDelete,
                EventPayload::PrecommitTrunkDelete { trunk, parent_port },
            ) => validate_trunk_delete(&trunk, &parent_port),
            (
                ResourceKind::Subports,
                Phase::AfterCreate,
                EventPayload::SubportState { trunk, subports },
            ) => self.handler.subports_added(&trunk, &subports).await,
            (
                ResourceKind::Subports,
                Phase::AfterDelete,
                EventPayload::SubportState { trunk, subports },
            ) => self.handler.subports_deleted(&trunk, &subports).await,
            (kind, phase, _) => Err(TrunkSyncError::internal(format!(
                "payload does not match event ({:?}, {:?})",
                kind, phase
            ))),
        }
    }
}

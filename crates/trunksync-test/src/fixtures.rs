//! Fixtures for common trunk synchronization scenarios.

use std::collections::BTreeMap;
use std::sync::Arc;

use trunksync_common::store::LogicalPortRecord;
use trunksync_common::types::{
    BindingProfile, Port, PortBinding, PortStatus, Subport, Trunk, TrunkStatus, VifType,
};

use crate::stores::{MemNorthbound, MemPortStore};

/// Standard identifiers used by the scenario fixtures.
pub const TRUNK_ID: &str = "trunk-1";
pub const PARENT_PORT: &str = "port-parent";
pub const SUBPORT_PORT: &str = "port-sub";
pub const HOST_A: &str = "hostA";
pub const VLAN_TAG: u16 = 10;

/// Builds an actively bound parent port on `host`.
pub fn bound_port(id: &str, host: &str) -> Port {
    Port {
        id: id.to_string(),
        device_owner: "compute:server".to_string(),
        status: PortStatus::Active,
        revision: 0,
        bindings: vec![PortBinding {
            port_id: id.to_string(),
            host: host.to_string(),
            vif_type: VifType::Ovs,
            status: PortStatus::Active,
            profile: BindingProfile::default(),
        }],
    }
}

/// Builds an unbound port with one empty binding, the state a subport's
/// port is in before attach.
pub fn unbound_port(id: &str) -> Port {
    Port {
        id: id.to_string(),
        device_owner: String::new(),
        status: PortStatus::Down,
        revision: 0,
        bindings: vec![PortBinding {
            port_id: id.to_string(),
            host: String::new(),
            vif_type: VifType::Unbound,
            status: PortStatus::Down,
            profile: BindingProfile::default(),
        }],
    }
}

/// Builds a bare logical port record for the remote store.
pub fn logical_port(id: &str) -> LogicalPortRecord {
    LogicalPortRecord {
        id: id.to_string(),
        parent: None,
        tag: None,
        up: false,
        external_ids: BTreeMap::new(),
    }
}

/// Builds a trunk over `parent` carrying `subports`.
pub fn trunk(id: &str, parent: &str, subports: Vec<Subport>) -> Trunk {
    Trunk {
        id: id.to_string(),
        port_id: parent.to_string(),
        status: TrunkStatus::Down,
        sub_ports: subports,
    }
}

/// A seeded pair of stores for lifecycle tests.
pub struct TestEnv {
    pub local: Arc<MemPortStore>,
    pub remote: Arc<MemNorthbound>,
}

impl TestEnv {
    /// Empty stores.
    pub fn new() -> Self {
        Self {
            local: Arc::new(MemPortStore::new()),
            remote: Arc::new(MemNorthbound::new()),
        }
    }

    /// The standard scenario: parent port bound `ACTIVE` on `hostA`,
    /// subport port unbound, both known to the remote store.
    pub fn standard() -> Self {
        let env = Self::new();
        env.local.insert_port(bound_port(PARENT_PORT, HOST_A));
        env.local.insert_port(unbound_port(SUBPORT_PORT));
        env.remote.insert_logical_port(logical_port(PARENT_PORT));
        env.remote.insert_logical_port(logical_port(SUBPORT_PORT));
        env
    }

    /// The standard trunk: one VLAN subport on the standard parent.
    pub fn standard_trunk(&self) -> Trunk {
        trunk(
            TRUNK_ID,
            PARENT_PORT,
            vec![Subport::vlan(SUBPORT_PORT, VLAN_TAG)],
        )
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

//! Pre-commit precondition validation.
//!
//! Runs synchronously before the triggering command becomes durable, so
//! a rejected trunk creation or deletion has no effect on either store.

use tracing::debug;

use trunksync_common::types::{Port, Trunk};
use trunksync_common::{TrunkSyncError, TrunkSyncResult};

/// Rejects trunk creation when the intended parent port is already
/// actively bound elsewhere. A port serving another role cannot become a
/// trunk parent.
pub fn validate_trunk_create(parent_port: &Port) -> TrunkSyncResult<()> {
    if parent_port.is_bound() {
        debug!(port = %parent_port.id, "rejecting trunk creation, parent port in use");
        return Err(TrunkSyncError::parent_port_in_use(&parent_port.id));
    }
    Ok(())
}

/// Rejects trunk deletion while the trunk's parent port is actively
/// bound. An in-use trunk must be drained before removal.
pub fn validate_trunk_delete(trunk: &Trunk, parent_port: &Port) -> TrunkSyncResult<()> {
    if parent_port.is_bound() {
        debug!(trunk = %trunk.id, "rejecting trunk deletion, trunk in use");
        return Err(TrunkSyncError::trunk_in_use(&trunk.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trunksync_common::types::{
        BindingProfile, PortBinding, PortStatus, TrunkStatus, VifType,
    };

    fn port(bound: bool) -> Port {
        Port {
            id: "p1".to_string(),
            device_owner: String::new(),
            status: PortStatus::Active,
            revision: 0,
            bindings: vec![PortBinding {
                port_id: "p1".to_string(),
                host: if bound { "hostA".to_string() } else { String::new() },
                vif_type: if bound { VifType::Ovs } else { VifType::Unbound },
                status: PortStatus::Active,
                profile: BindingProfile::default(),
            }],
        }
    }

    fn trunk() -> Trunk {
        Trunk {
            id: "t1".to_string(),
            port_id: "p1".to_string(),
            status: TrunkStatus::Down,
            sub_ports: vec![],
        }
    }

    #[test]
    fn test_create_rejected_when_parent_bound() {
        let err = validate_trunk_create(&port(true)).unwrap_err();
        assert!(matches!(err, TrunkSyncError::ParentPortInUse { .. }));
    }

    #[test]
    fn test_create_allowed_when_parent_unbound() {
        assert!(validate_trunk_create(&port(false)).is_ok());
    }

    #[test]
    fn test_delete_rejected_when_parent_bound() {
        let err = validate_trunk_delete(&trunk(), &port(true)).unwrap_err();
        match err {
            TrunkSyncError::TrunkInUse { trunk_id } => assert_eq!(trunk_id, "t1"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_delete_allowed_when_parent_unbound() {
        assert!(validate_trunk_delete(&trunk(), &port(false)).is_ok());
    }
}

//! Binding profile mutation.
//!
//! Pure functions computing, from current state plus intent, the local
//! write batch and the remote logical-port write one subport attach or
//! detach implies. Nothing here touches a store; the applier commits the
//! result.

use std::collections::BTreeMap;

use trunksync_common::fields::EXT_ID_DEVICE_OWNER;
use trunksync_common::store::{BindingUpdate, NbOp, PortOp};
use trunksync_common::types::{Port, PortBinding, PortStatus, Subport, VifType};
use trunksync_common::TRUNK_SUBPORT_OWNER;

/// A computed subport mutation: the post-mutation port snapshot, the
/// local write batch, and the matching remote write.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// The port as it will look after the local batch commits. Its
    /// `revision` field still carries the pre-mutation value; the
    /// applier presents it to the revision guard.
    pub port: Port,
    /// Atomic local write batch.
    pub local_ops: Vec<PortOp>,
    /// The remote logical-port write paired with the batch.
    pub remote_op: NbOp,
}

/// Computes the mutation attaching `subport` to `parent_port_id`.
///
/// The subport's device owner becomes the reserved trunk-subport tag and
/// its status is set to the parent's, so a subport whose event was
/// processed before its binding existed does not stay `DOWN` forever.
/// Every binding gains the parent name and tag in its profile, is re-keyed
/// onto the parent's effective host (the migration target host while the
/// parent is mid-migration), and is forced to the plain OVS VIF type.
pub fn attach_mutation(
    mut port: Port,
    subport: &Subport,
    parent_port_id: &str,
    parent_status: PortStatus,
    parent_binding: Option<&PortBinding>,
) -> Mutation {
    let parent_host = parent_binding
        .filter(|b| !b.host.is_empty())
        .map(|b| b.effective_host().to_string())
        .unwrap_or_default();

    port.device_owner = TRUNK_SUBPORT_OWNER.to_string();
    port.status = parent_status;

    let mut local_ops = vec![PortOp::UpdatePort {
        id: port.id.clone(),
        device_owner: port.device_owner.clone(),
        status: port.status,
    }];

    for binding in &mut port.bindings {
        // (port id, host) is the binding's primary key; select by the
        // host recorded before the re-key.
        let keyed_host = binding.host.clone();
        binding.profile.parent_name = Some(parent_port_id.to_string());
        binding.profile.tag = Some(subport.segmentation_id);
        binding.host = parent_host.clone();
        binding.vif_type = VifType::Ovs;
        local_ops.push(PortOp::UpdatePortBinding {
            port_id: port.id.clone(),
            host: keyed_host,
            update: BindingUpdate {
                profile: binding.profile.clone(),
                vif_type: VifType::Ovs,
                host: Some(parent_host.clone()),
            },
        });
    }

    let mut ext_ids = BTreeMap::new();
    ext_ids.insert(
        EXT_ID_DEVICE_OWNER.to_string(),
        TRUNK_SUBPORT_OWNER.to_string(),
    );
    let remote_op = NbOp::SetLogicalPort {
        id: port.id.clone(),
        parent: Some(parent_port_id.to_string()),
        tag: Some(subport.segmentation_id),
        up: None,
        external_ids: ext_ids,
    };

    Mutation {
        port,
        local_ops,
        remote_op,
    }
}

/// Computes the mutation detaching a subport, the inverse of
/// [`attach_mutation`].
///
/// Clears the device owner, strips the trunk profile fields from every
/// binding, marks the bindings unbound, and deletes the binding-level
/// placement rows tied to each binding. The remote side loses its parent
/// reference and tag and is marked down.
pub fn detach_mutation(mut port: Port) -> Mutation {
    port.device_owner = String::new();

    let mut local_ops = vec![PortOp::UpdatePort {
        id: port.id.clone(),
        device_owner: String::new(),
        status: port.status,
    }];

    for binding in &mut port.bindings {
        binding.profile.parent_name = None;
        binding.profile.tag = None;
        binding.vif_type = VifType::Unbound;
        local_ops.push(PortOp::UpdatePortBinding {
            port_id: port.id.clone(),
            host: binding.host.clone(),
            update: BindingUpdate {
                profile: binding.profile.clone(),
                vif_type: VifType::Unbound,
                host: None,
            },
        });
        local_ops.push(PortOp::DeleteBindingLevels {
            port_id: port.id.clone(),
            host: binding.host.clone(),
        });
    }

    let mut ext_ids = BTreeMap::new();
    ext_ids.insert(EXT_ID_DEVICE_OWNER.to_string(), String::new());
    let remote_op = NbOp::SetLogicalPort {
        id: port.id.clone(),
        parent: None,
        tag: None,
        up: Some(false),
        external_ids: ext_ids,
    };

    Mutation {
        port,
        local_ops,
        remote_op,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trunksync_common::types::BindingProfile;

    fn subport_port(id: &str) -> Port {
        Port {
            id: id.to_string(),
            device_owner: String::new(),
            status: PortStatus::Down,
            revision: 3,
            bindings: vec![PortBinding {
                port_id: id.to_string(),
                host: String::new(),
                vif_type: VifType::Unbound,
                status: PortStatus::Down,
                profile: BindingProfile::default(),
            }],
        }
    }

    fn parent_binding(host: &str) -> PortBinding {
        PortBinding {
            port_id: "parent".to_string(),
            host: host.to_string(),
            vif_type: VifType::Ovs,
            status: PortStatus::Active,
            profile: BindingProfile::default(),
        }
    }

    #[test]
    fn test_attach_sets_owner_status_and_profile() {
        let subport = Subport::vlan("p2", 10);
        let binding = parent_binding("hostA");
        let m = attach_mutation(
            subport_port("p2"),
            &subport,
            "p1",
            PortStatus::Active,
            Some(&binding),
        );

        assert_eq!(m.port.device_owner, TRUNK_SUBPORT_OWNER);
        assert_eq!(m.port.status, PortStatus::Active);
        let b = &m.port.bindings[0];
        assert_eq!(b.profile.parent_name.as_deref(), Some("p1"));
        assert_eq!(b.profile.tag, Some(10));
        assert_eq!(b.host, "hostA");
        assert_eq!(b.vif_type, VifType::Ovs);
        // revision is left for the applier
        assert_eq!(m.port.revision, 3);
    }

    #[test]
    fn test_attach_keys_binding_update_by_old_host() {
        let subport = Subport::vlan("p2", 10);
        let binding = parent_binding("hostA");
        let mut port = subport_port("p2");
        port.bindings[0].host = "oldhost".to_string();

        let m = attach_mutation(port, &subport, "p1", PortStatus::Active, Some(&binding));
        match &m.local_ops[1] {
            PortOp::UpdatePortBinding { host, update, .. } => {
                assert_eq!(host, "oldhost");
                assert_eq!(update.host.as_deref(), Some("hostA"));
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_attach_remote_op() {
        let subport = Subport::vlan("p2", 10);
        let m = attach_mutation(
            subport_port("p2"),
            &subport,
            "p1",
            PortStatus::Active,
            None,
        );
        match &m.remote_op {
            NbOp::SetLogicalPort {
                id,
                parent,
                tag,
                up,
                external_ids,
            } => {
                assert_eq!(id, "p2");
                assert_eq!(parent.as_deref(), Some("p1"));
                assert_eq!(*tag, Some(10));
                assert_eq!(*up, None);
                assert_eq!(
                    external_ids.get(EXT_ID_DEVICE_OWNER).map(String::as_str),
                    Some(TRUNK_SUBPORT_OWNER)
                );
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_attach_without_parent_binding_leaves_host_empty() {
        let subport = Subport::vlan("p2", 10);
        let m = attach_mutation(
            subport_port("p2"),
            &subport,
            "p1",
            PortStatus::Down,
            None,
        );
        assert_eq!(m.port.bindings[0].host, "");
        assert_eq!(m.port.status, PortStatus::Down);
    }

    #[test]
    fn test_attach_uses_migration_target_host() {
        let subport = Subport::vlan("p2", 10);
        let mut binding = parent_binding("hostA");
        binding.profile.migrating_to = Some("hostB".to_string());

        let m = attach_mutation(
            subport_port("p2"),
            &subport,
            "p1",
            PortStatus::Active,
            Some(&binding),
        );
        assert_eq!(m.port.bindings[0].host, "hostB");
        assert_eq!(m.port.bindings[0].vif_type, VifType::Ovs);
    }

    #[test]
    fn test_detach_inverts_attach() {
        let subport = Subport::vlan("p2", 10);
        let binding = parent_binding("hostA");
        let attached = attach_mutation(
            subport_port("p2"),
            &subport,
            "p1",
            PortStatus::Active,
            Some(&binding),
        )
        .port;

        let m = detach_mutation(attached);
        assert_eq!(m.port.device_owner, "");
        let b = &m.port.bindings[0];
        assert!(b.profile.parent_name.is_none());
        assert!(b.profile.tag.is_none());
        assert_eq!(b.vif_type, VifType::Unbound);
    }

    #[test]
    fn test_detach_preserves_migration_marker() {
        let mut port = subport_port("p2");
        port.bindings[0].profile.migrating_to = Some("hostB".to_string());

        let m = detach_mutation(port);
        assert_eq!(
            m.port.bindings[0].profile.migrating_to.as_deref(),
            Some("hostB")
        );
    }

    #[test]
    fn test_detach_deletes_binding_levels_per_binding() {
        let mut port = subport_port("p2");
        port.bindings[0].host = "hostA".to_string();
        port.bindings.push(PortBinding {
            port_id: "p2".to_string(),
            host: "hostB".to_string(),
            vif_type: VifType::Ovs,
            status: PortStatus::Down,
            profile: BindingProfile::default(),
        });

        let m = detach_mutation(port);
        let deletes: Vec<_> = m
            .local_ops
            .iter()
            .filter_map(|op| match op {
                PortOp::DeleteBindingLevels { host, .. } => Some(host.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deletes, vec!["hostA", "hostB"]);
    }

    #[test]
    fn test_detach_remote_op_marks_port_down() {
        let m = detach_mutation(subport_port("p2"));
        match &m.remote_op {
            NbOp::SetLogicalPort {
                parent,
                tag,
                up,
                external_ids,
                ..
            } => {
                assert_eq!(*parent, None);
                assert_eq!(*tag, None);
                assert_eq!(*up, Some(false));
                assert_eq!(
                    external_ids.get(EXT_ID_DEVICE_OWNER).map(String::as_str),
                    Some("")
                );
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }
}

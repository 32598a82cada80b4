//! Driver registration, capability advertisement, and typed event
//! dispatch tests.

use trunksync_common::types::{SegmentationType, TrunkStatus, VifType};
use trunksync_common::{TrunkSyncError, TRUNK_SUBPORT_OWNER};
use trunksync_test::{bound_port, unbound_port, TestEnv, PARENT_PORT, SUBPORT_PORT, TRUNK_ID};
use trunksyncd::{EventPayload, Phase, ResourceKind, TrunkDriver};

fn driver(env: &TestEnv) -> TrunkDriver {
    TrunkDriver::register(env.local.clone(), env.remote.clone())
}

#[test]
fn advertises_static_capabilities() {
    let env = TestEnv::new();
    let caps = driver(&env).capabilities();
    assert_eq!(caps.vif_types, &[VifType::Ovs, VifType::VhostUser]);
    assert_eq!(caps.segmentation_types, &[SegmentationType::Vlan]);
    assert!(caps.can_trunk_bound_port);
}

#[test]
fn subscribes_expected_pairs() {
    let env = TestEnv::new();
    let d = driver(&env);
    for phase in [
        Phase::AfterCreate,
        Phase::AfterUpdate,
        Phase::AfterDelete,
        Phase::PrecommitCreate,
        Phase::PrecommitDelete,
    ] {
        assert!(d.handles(ResourceKind::Trunk, phase));
    }
    assert!(d.handles(ResourceKind::Subports, Phase::AfterCreate));
    assert!(d.handles(ResourceKind::Subports, Phase::AfterDelete));
    assert!(!d.handles(ResourceKind::Subports, Phase::AfterUpdate));
    assert!(!d.handles(ResourceKind::Subports, Phase::PrecommitCreate));
}

#[tokio::test]
async fn dispatch_runs_lifecycle_handler() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();

    driver(&env)
        .dispatch(
            ResourceKind::Trunk,
            Phase::AfterCreate,
            EventPayload::TrunkState { trunk },
        )
        .await
        .unwrap();

    let port = env.local.port(SUBPORT_PORT).unwrap();
    assert_eq!(port.device_owner, TRUNK_SUBPORT_OWNER);
    assert_eq!(env.local.trunk_status(TRUNK_ID), Some(TrunkStatus::Active));
}

#[tokio::test]
async fn precommit_create_rejects_bound_parent_without_side_effects() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();

    let err = driver(&env)
        .dispatch(
            ResourceKind::Trunk,
            Phase::PrecommitCreate,
            EventPayload::PrecommitTrunkCreate {
                desired: trunk,
                parent_port: bound_port(PARENT_PORT, "hostA"),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TrunkSyncError::ParentPortInUse { .. }));
    assert_eq!(env.local.apply_count(), 0);
    assert_eq!(env.remote.write_count(), 0);
}

#[tokio::test]
async fn precommit_create_allows_unbound_parent() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();

    driver(&env)
        .dispatch(
            ResourceKind::Trunk,
            Phase::PrecommitCreate,
            EventPayload::PrecommitTrunkCreate {
                desired: trunk,
                parent_port: unbound_port(PARENT_PORT),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn precommit_delete_rejects_bound_parent() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();

    let err = driver(&env)
        .dispatch(
            ResourceKind::Trunk,
            Phase::PrecommitDelete,
            EventPayload::PrecommitTrunkDelete {
                trunk,
                parent_port: bound_port(PARENT_PORT, "hostA"),
            },
        )
        .await
        .unwrap_err();

    match err {
        TrunkSyncError::TrunkInUse { trunk_id } => assert_eq!(trunk_id, TRUNK_ID),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unsubscribed_pair_is_noop() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();
    let subports = trunk.sub_ports.clone();

    driver(&env)
        .dispatch(
            ResourceKind::Subports,
            Phase::AfterUpdate,
            EventPayload::SubportState { trunk, subports },
        )
        .await
        .unwrap();

    assert_eq!(env.local.apply_count(), 0);
    assert_eq!(env.remote.write_count(), 0);
}

#[tokio::test]
async fn mismatched_payload_is_internal_error() {
    let env = TestEnv::standard();
    let trunk = env.standard_trunk();

    let err = driver(&env)
        .dispatch(
            ResourceKind::Subports,
            Phase::AfterCreate,
            EventPayload::TrunkState { trunk },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TrunkSyncError::Internal { .. }));
}

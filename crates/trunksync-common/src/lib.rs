//! Common infrastructure for the trunk control-plane synchronizer.
//!
//! This crate provides the shared building blocks used by `trunksyncd`:
//!
//! - [`types`]: Trunk/Subport/Port domain types and the typed binding profile
//! - [`error`]: Error taxonomy for synchronization operations
//! - [`store`]: Contracts for the local port store and the remote
//!   northbound control-plane store
//! - [`revision`]: Optimistic revision guard composed into remote
//!   transactions
//!
//! # Architecture
//!
//! The synchronizer keeps two views of trunk port state consistent:
//!
//! 1. The local port database (ports, bindings, binding profiles)
//! 2. The remote northbound store (logical port records)
//!
//! Every remote write batch carries a revision check so a stale local view
//! can never overwrite newer remote state; after a successful write the
//! entity's local revision counter is bumped, which is how later checks
//! recognize the latest accepted state.

pub mod error;
pub mod fields;
pub mod revision;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{TrunkSyncError, TrunkSyncResult};
pub use revision::{EntityKind, RevisionGuard};
pub use store::{
    BindingUpdate, LogicalPortRecord, NbOp, NbTransaction, NorthboundStore, PortOp, PortStore,
};
pub use types::{
    BindingProfile, Port, PortBinding, PortStatus, SegmentationType, Subport, Trunk, TrunkStatus,
    VifType, TRUNK_SUBPORT_OWNER,
};

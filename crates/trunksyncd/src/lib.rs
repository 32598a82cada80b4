//! trunksyncd - trunk port lifecycle synchronizer.
//!
//! This crate keeps the remote northbound control-plane store's view of
//! trunk parent/child/VLAN relationships consistent with the local port
//! database. It is a library invoked in-process by its host: the host's
//! event dispatcher delivers trunk and subport lifecycle events, and the
//! synchronizer applies the implied binding mutations to both stores.
//!
//! # Architecture
//!
//! Event processing follows this pattern:
//!
//! 1. The host dispatches a typed lifecycle event to [`TrunkDriver`]
//! 2. [`TrunkHandler`] determines the affected subport set
//! 3. [`mutator`] computes each subport's local and remote mutation
//! 4. [`TxnApplier`] commits local + remote atomically per subport,
//!    gated by the revision guard
//! 5. The handler advances the trunk's status once the batch completes
//!
//! Pre-commit validation events are rejected synchronously by
//! [`validator`] before any durable effect.

pub mod applier;
pub mod driver;
pub mod events;
pub mod handler;
pub mod mutator;
pub mod validator;

// Re-export commonly used items at crate root
pub use applier::TxnApplier;
pub use driver::{Capabilities, TrunkDriver};
pub use events::{EventPayload, HandlerRegistry, Phase, ResourceKind};
pub use handler::TrunkHandler;
pub use mutator::{attach_mutation, detach_mutation, Mutation};
pub use validator::{validate_trunk_create, validate_trunk_delete};

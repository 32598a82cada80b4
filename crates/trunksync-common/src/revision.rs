//! Optimistic revision guard.
//!
//! Every entity synchronized to the remote store carries a monotonically
//! increasing revision counter. A remote transaction includes a revision
//! check op; the store aborts the whole batch, with no partial effect,
//! when its recorded revision for the entity is newer than the one the
//! writer presents. A successful commit records the presented revision,
//! and the writer bumps the local counter afterwards, so the next
//! legitimate write presents a strictly larger value while a stale writer
//! is rejected.

use crate::store::NbOp;

/// Kinds of entities tracked by revision counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Port / logical port records.
    Ports,
}

impl EntityKind {
    /// Returns the kind name as used in store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Ports => "ports",
        }
    }
}

/// Builds revision check operations for remote transactions.
///
/// The guard has no side effect of its own; the check op it produces is
/// composed into the applier's transaction and evaluated by the remote
/// store at commit time.
pub struct RevisionGuard;

impl RevisionGuard {
    /// Produces the conditional op that aborts a remote transaction when
    /// the store's recorded revision for `entity_id` is newer than
    /// `local_revision`.
    pub fn check_op(entity_id: &str, local_revision: u64, kind: EntityKind) -> NbOp {
        NbOp::CheckRevision {
            entity_id: entity_id.to_string(),
            revision: local_revision,
            kind,
        }
    }
}

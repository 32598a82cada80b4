//! Error types for trunk synchronization.
//!
//! A vanished port is deliberately NOT an error: the mutation path models
//! it as an absent value and the coordinator skips that subport. Everything
//! here propagates to the event-delivery layer, which owns retry decisions.

use thiserror::Error;

/// Result type alias for synchronization operations.
pub type TrunkSyncResult<T> = Result<T, TrunkSyncError>;

/// Errors that can occur while synchronizing trunk state.
#[derive(Debug, Error)]
pub enum TrunkSyncError {
    /// Trunk creation rejected: the intended parent port is already
    /// actively bound elsewhere.
    #[error("Parent port '{port_id}' is in use and cannot become a trunk parent")]
    ParentPortInUse {
        /// The intended parent port.
        port_id: String,
    },

    /// Trunk deletion rejected: the trunk's parent port is still actively
    /// bound.
    #[error("Trunk '{trunk_id}' is in use and must be drained before removal")]
    TrunkInUse {
        /// The trunk being deleted.
        trunk_id: String,
    },

    /// A remote write presented a stale revision and the whole transaction
    /// was aborted.
    #[error(
        "Revision conflict for '{entity_id}': presented {presented}, store has {stored}"
    )]
    RevisionConflict {
        /// The entity whose check failed.
        entity_id: String,
        /// Revision carried by the rejected write.
        presented: u64,
        /// Revision currently recorded by the remote store.
        stored: u64,
    },

    /// Two local writers raced on the same port and this one lost.
    #[error("Local write conflict on '{entity_id}': {message}")]
    LocalConflict {
        /// The contended entity.
        entity_id: String,
        /// Conflict detail from the store.
        message: String,
    },

    /// Local or remote store call failed for infrastructure reasons.
    #[error("Store operation failed: {operation}: {message}")]
    Store {
        /// The operation that failed (e.g., "lookup", "commit").
        operation: String,
        /// Error message.
        message: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl TrunkSyncError {
    /// Creates a parent-port-in-use precondition error.
    pub fn parent_port_in_use(port_id: impl Into<String>) -> Self {
        Self::ParentPortInUse {
            port_id: port_id.into(),
        }
    }

    /// Creates a trunk-in-use precondition error.
    pub fn trunk_in_use(trunk_id: impl Into<String>) -> Self {
        Self::TrunkInUse {
            trunk_id: trunk_id.into(),
        }
    }

    /// Creates a revision conflict error.
    pub fn revision_conflict(entity_id: impl Into<String>, presented: u64, stored: u64) -> Self {
        Self::RevisionConflict {
            entity_id: entity_id.into(),
            presented,
            stored,
        }
    }

    /// Creates a local write conflict error.
    pub fn local_conflict(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LocalConflict {
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Creates a store failure error.
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition that may
    /// succeed when the triggering event is redelivered.
    ///
    /// Precondition violations are permanent for the state that produced
    /// them; conflicts and infrastructure failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrunkSyncError::RevisionConflict { .. }
                | TrunkSyncError::LocalConflict { .. }
                | TrunkSyncError::Store { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrunkSyncError::parent_port_in_use("port-1");
        assert_eq!(
            err.to_string(),
            "Parent port 'port-1' is in use and cannot become a trunk parent"
        );
    }

    #[test]
    fn test_revision_conflict_display() {
        let err = TrunkSyncError::revision_conflict("port-1", 3, 5);
        assert!(err.to_string().contains("presented 3"));
        assert!(err.to_string().contains("store has 5"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(TrunkSyncError::revision_conflict("p", 1, 2).is_retryable());
        assert!(TrunkSyncError::store("commit", "connection refused").is_retryable());
        assert!(TrunkSyncError::local_conflict("p", "serialization failure").is_retryable());
        assert!(!TrunkSyncError::parent_port_in_use("p").is_retryable());
        assert!(!TrunkSyncError::trunk_in_use("t").is_retryable());
    }
}

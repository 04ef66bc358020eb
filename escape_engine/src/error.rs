//! Error types for the engine and its collaborators.

use escape_rules::{SessionId, SnapshotId};

/// Errors that abort an engine operation.
///
/// Gating failures (a locked puzzle, a wall where the player tried to walk)
/// are not errors; they come back as unsuccessful [`crate::ActionOutcome`]s.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Theme, room or puzzle data the session refers to is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// Rejected input to session creation.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl EngineError {
    pub fn configuration(message: impl ToString) -> Self {
        Self::Configuration(message.to_string())
    }

    pub fn validation(message: impl ToString) -> Self {
        Self::Validation(message.to_string())
    }

    /// Check if this is a session or snapshot lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_) | Self::SnapshotNotFound(_)
        ) || matches!(self, Self::Store(e) if e.is_not_found())
    }
}

/// Store adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Backend failure, tagged with the operation for tracing.
    #[error("Store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Description generator failures. Always recovered with static text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DescriptionError {
    #[error("Description generation failed: {0}")]
    Failed(String),

    #[error("Description service unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(EngineError::SessionNotFound(SessionId::new()).is_not_found());
        assert!(EngineError::from(StoreError::not_found("Session", 7)).is_not_found());
        assert!(!EngineError::validation("Invalid theme: x").is_not_found());
        assert!(!EngineError::from(StoreError::backend("put", "disk full")).is_not_found());
    }

    #[test]
    fn test_messages() {
        let err = StoreError::backend("put", "disk full");
        assert_eq!(err.to_string(), "Store error in put: disk full");
        assert_eq!(
            EngineError::validation("Invalid starting location: attic").to_string(),
            "Invalid starting location: attic"
        );
    }
}

//! Errors at the collaborator boundary.
//!
//! The aggregation pipeline itself is total: normalize, merge, filter,
//! rank, and paginate never fail. Only the two external calls made by the
//! query translator bridge (NL parsing and keyword expansion) can error, and
//! both degrade to a fallback rather than propagating.

use thiserror::Error;

/// Failures from the NL query-parsing and keyword-expansion collaborators.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Query parsing failed: {0}")]
    ParseFailed(String),

    #[error("Keyword expansion failed: {0}")]
    ExpansionFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Collaborator timed out after {0} seconds")]
    Timeout(u64),
}

impl BridgeError {
    /// Whether a caller could reasonably retry. The bridge itself never
    /// retries (single attempt, graceful fallback); this classification is
    /// for the UI layer's messaging.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Network(_) | BridgeError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_classification() {
        assert!(BridgeError::Network("connection reset".to_string()).is_retryable());
        assert!(BridgeError::Timeout(30).is_retryable());
        assert!(!BridgeError::ParseFailed("bad response".to_string()).is_retryable());
        assert!(!BridgeError::ExpansionFailed("bad response".to_string()).is_retryable());
    }
}

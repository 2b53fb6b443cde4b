//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Stored or supplied hash could not be parsed.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// Stored hash asks for more work than the policy allows.
    #[error("password hash cost exceeds the policy ceiling: m={memory_kib} t={iterations}")]
    CostLimitExceeded { memory_kib: u32, iterations: u32 },

    /// Hashing parameters were rejected.
    #[error("invalid hashing parameters: {0}")]
    InvalidPolicy(String),

    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// User may not place orders in its current status.
    #[error("user {user_id} cannot order while {status}")]
    UserNotActive {
        user_id: String,
        status: &'static str,
    },

    /// Unknown user status code.
    #[error("unknown user status code: {0:?}")]
    UnknownStatus(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MalformedHash(_)
                | AuthError::CostLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(AuthError::InvalidCredentials.is_auth_failure());
        assert!(AuthError::MalformedHash("x".into()).is_auth_failure());
        assert!(AuthError::CostLimitExceeded {
            memory_kib: 1 << 22,
            iterations: 1
        }
        .is_auth_failure());
        assert!(!AuthError::WeakPassword("short".into()).is_auth_failure());
    }
}

//! Authentication error types.

use bizoe_core::AuthStateError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bizoe_core::EmailError),

    /// The operation needs a signed-in client.
    #[error("not signed in")]
    NotAuthenticated,

    /// The auth service did not answer (simulated network failure).
    #[error("authentication service unavailable")]
    Unavailable,

    /// Snapshot storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<AuthStateError> for AuthError {
    fn from(err: AuthStateError) -> Self {
        match err {
            AuthStateError::NotAuthenticated => Self::NotAuthenticated,
        }
    }
}

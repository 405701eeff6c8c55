//! Snapshot storage backed by the request's `tower-sessions` session.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use super::{SnapshotStore, StorageError};

/// Stores snapshots in the client's session.
#[derive(Debug, Clone)]
pub struct SessionSnapshotStore {
    session: Session,
}

impl SessionSnapshotStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Issue a fresh session id, keeping the data.
    ///
    /// Called when the client signs in so a pre-login id cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the change.
    pub async fn rotate_id(&self) -> Result<(), StorageError> {
        self.session.cycle_id().await?;
        Ok(())
    }
}

impl SnapshotStore for SessionSnapshotStore {
    async fn load<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.session.get::<T>(key).await?)
    }

    async fn save<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Send + Sync,
    {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove_value(key).await?;
        Ok(())
    }
}

//! Per-client snapshot persistence.
//!
//! Each client owns independent key-value entries (`cart-storage`,
//! `auth-storage`) holding a serialized snapshot of its state. Snapshots are
//! written at the moment of mutation; the last write wins.
//!
//! [`SnapshotStore`] is the seam between the pure reducers and wherever the
//! snapshot lives: the request's session in production, a shared map in
//! tests.

pub mod memory;
pub mod session;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use memory::MemorySnapshotStore;
pub use session::SessionSnapshotStore;

/// Errors from snapshot storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value storage for state snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot under `key`, if any.
    fn load<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>, StorageError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Replace the snapshot under `key`.
    fn save<T>(&self, key: &str, value: &T) -> impl Future<Output = Result<(), StorageError>> + Send
    where
        T: Serialize + Send + Sync;

    /// Delete the snapshot under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

//! In-memory snapshot storage.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::{SnapshotStore, StorageError};

/// Snapshot store over a shared map.
///
/// Clones share the same map, so two handles behave like two tabs of the
/// same browser.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw snapshot under `key`.
    pub async fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().await.get(key).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn load<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.entries.read().await.get(key).cloned();
        Ok(value.map(serde_json::from_value).transpose()?)
    }

    async fn save<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Send + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_remove() {
        let store = MemorySnapshotStore::new();
        assert_eq!(store.load::<Vec<u32>>("k").await.unwrap(), None);

        store.save("k", &vec![1_u32, 2, 3]).await.unwrap();
        assert_eq!(store.load::<Vec<u32>>("k").await.unwrap(), Some(vec![1, 2, 3]));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.load::<Vec<u32>>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let tab_a = MemorySnapshotStore::new();
        let tab_b = tab_a.clone();
        tab_a.save("cart-storage", &"first").await.unwrap();
        tab_b.save("cart-storage", &"second").await.unwrap();
        assert_eq!(
            tab_a.load::<String>("cart-storage").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_serialization_error() {
        let store = MemorySnapshotStore::new();
        store.save("k", &"text").await.unwrap();
        let err = store.load::<u32>("k").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}

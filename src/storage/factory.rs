//! Storage factory: creates a backend instance from configuration.

use std::sync::Arc;

use slatedb::{object_store, DbBuilder};

use super::config::{ObjectStoreConfig, SlateDbStorageConfig, StorageConfig};
use super::memory::InMemoryStorage;
use super::slate::SlateDbStorage;
use super::{Storage, StorageError, StorageResult};

/// Creates a storage instance based on the provided configuration.
///
/// # Example
///
/// ```ignore
/// use replog::storage::{create_storage, StorageConfig};
///
/// let storage = create_storage(&StorageConfig::InMemory).await?;
/// ```
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config {
        StorageConfig::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        StorageConfig::SlateDb(slate_config) => {
            let storage = create_slatedb_storage(slate_config).await?;
            Ok(Arc::new(storage))
        }
    }
}

async fn create_slatedb_storage(config: &SlateDbStorageConfig) -> StorageResult<SlateDbStorage> {
    let object_store: Arc<dyn object_store::ObjectStore> = match &config.object_store {
        ObjectStoreConfig::InMemory => Arc::new(object_store::memory::InMemory::new()),
        ObjectStoreConfig::Local(local_config) => {
            // The directory must exist before LocalFileSystem will accept it.
            std::fs::create_dir_all(&local_config.path).map_err(|e| {
                StorageError::Storage(format!(
                    "failed to create storage directory '{}': {}",
                    local_config.path, e
                ))
            })?;
            let store = object_store::local::LocalFileSystem::new_with_prefix(&local_config.path)
                .map_err(|e| {
                StorageError::Storage(format!("failed to create local filesystem store: {}", e))
            })?;
            Arc::new(store)
        }
    };

    let db = DbBuilder::new(config.path.clone(), object_store)
        .build()
        .await
        .map_err(|e| StorageError::Storage(format!("failed to open SlateDB: {}", e)))?;

    Ok(SlateDbStorage::new(Arc::new(db)))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::storage::Record;

    #[tokio::test]
    async fn should_create_in_memory_storage() {
        // given
        let config = StorageConfig::InMemory;

        // when
        let storage = create_storage(&config).await.unwrap();

        // then - storage is usable
        storage
            .put(vec![Record::new(Bytes::from("k"), Bytes::from("v"))])
            .await
            .unwrap();
        let r = storage.get(Bytes::from("k")).await.unwrap();
        assert_eq!(r.unwrap().value, Bytes::from("v"));
    }

    #[tokio::test]
    async fn should_create_slatedb_storage_with_in_memory_object_store() {
        // given
        let config = StorageConfig::SlateDb(SlateDbStorageConfig {
            path: "test-data".to_string(),
            object_store: ObjectStoreConfig::InMemory,
        });

        // when
        let storage = create_storage(&config).await.unwrap();

        // then
        storage
            .put(vec![Record::new(Bytes::from("k"), Bytes::from("v"))])
            .await
            .unwrap();
        let r = storage.get(Bytes::from("k")).await.unwrap();
        assert_eq!(r.unwrap().value, Bytes::from("v"));
    }
}

//! SlateDB storage backend.
//!
//! SlateDB is an embedded LSM key-value store built on object storage.
//! Batch writes map to a single `WriteBatch`, snapshots to `DbSnapshot`,
//! and ordered scans to `DbIterator`. SlateDB has no native range delete;
//! [`SlateDbStorage::delete_range`] scans a snapshot of the range and
//! deletes the collected keys in one atomic batch, which relies on the
//! caller serializing mutations over the affected range (the log store
//! holds a per-log write lock across every mutation).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use slatedb::config::WriteOptions as SlateDbWriteOptions;
use slatedb::{Db, DbIterator, DbSnapshot, WriteBatch};

use super::{
    BytesRange, Record, Storage, StorageError, StorageIterator, StorageRead, StorageResult,
    StorageSnapshot, WriteOptions,
};

/// SlateDB-backed implementation of the [`Storage`] trait.
pub struct SlateDbStorage {
    db: Arc<Db>,
}

impl SlateDbStorage {
    /// Creates a new storage wrapping the given SlateDB database.
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StorageRead for SlateDbStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .db
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;

        match value {
            Some(v) => Ok(Some(Record::new(key, v))),
            None => Ok(None),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let iter = self
            .db
            .scan(range)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Box::new(SlateDbStorageIterator { iter }))
    }
}

#[async_trait]
impl Storage for SlateDbStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for record in records {
            batch.put(record.key, record.value);
        }
        let slate_options = SlateDbWriteOptions {
            await_durable: options.await_durable,
        };
        self.db
            .write_with_options(batch, &slate_options)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(())
    }

    async fn delete_range(&self, range: BytesRange) -> StorageResult<()> {
        let snapshot = self
            .db
            .snapshot()
            .await
            .map_err(StorageError::from_storage)?;
        let mut iter = snapshot
            .scan(range)
            .await
            .map_err(StorageError::from_storage)?;

        let mut batch = WriteBatch::new();
        let mut any = false;
        while let Some(entry) = iter.next().await.map_err(StorageError::from_storage)? {
            batch.delete(entry.key);
            any = true;
        }
        if any {
            self.db
                .write(batch)
                .await
                .map_err(StorageError::from_storage)?;
        }
        Ok(())
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        let snapshot = self
            .db
            .snapshot()
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Arc::new(SlateDbStorageSnapshot { snapshot }))
    }
}

struct SlateDbStorageIterator {
    iter: DbIterator,
}

#[async_trait]
impl StorageIterator for SlateDbStorageIterator {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        match self.iter.next().await.map_err(StorageError::from_storage)? {
            Some(entry) => Ok(Some(Record::new(entry.key, entry.value))),
            None => Ok(None),
        }
    }
}

/// SlateDB snapshot exposed through [`StorageSnapshot`].
struct SlateDbStorageSnapshot {
    snapshot: Arc<DbSnapshot>,
}

#[async_trait]
impl StorageRead for SlateDbStorageSnapshot {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .snapshot
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;

        match value {
            Some(v) => Ok(Some(Record::new(key, v))),
            None => Ok(None),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let iter = self
            .snapshot
            .scan(range)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Box::new(SlateDbStorageIterator { iter }))
    }
}

impl StorageSnapshot for SlateDbStorageSnapshot {}

#[cfg(test)]
mod tests {
    use std::ops::Bound;

    use slatedb::object_store::memory::InMemory;
    use slatedb::DbBuilder;

    use super::*;

    async fn open_storage() -> SlateDbStorage {
        let object_store = Arc::new(InMemory::new());
        let db = DbBuilder::new("/test/db", object_store)
            .build()
            .await
            .unwrap();
        SlateDbStorage::new(Arc::new(db))
    }

    fn record(key: &str, value: &str) -> Record {
        Record::new(
            Bytes::copy_from_slice(key.as_bytes()),
            Bytes::from(value.to_string()),
        )
    }

    #[tokio::test]
    async fn should_scan_batch_in_key_order() {
        // given
        let storage = open_storage().await;
        storage
            .put(vec![record("c", "3"), record("a", "1"), record("b", "2")])
            .await
            .unwrap();

        // when
        let mut iter = storage.scan_iter(BytesRange::unbounded()).await.unwrap();
        let mut keys = vec![];
        while let Some(r) = iter.next().await.unwrap() {
            keys.push(r.key);
        }

        // then
        assert_eq!(
            keys,
            vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]
        );
    }

    #[tokio::test]
    async fn should_delete_only_keys_inside_range() {
        // given
        let storage = open_storage().await;
        storage
            .put(vec![record("a", "1"), record("b", "2"), record("c", "3")])
            .await
            .unwrap();

        // when
        storage
            .delete_range(BytesRange::new(
                Bound::Included(Bytes::from("a")),
                Bound::Excluded(Bytes::from("c")),
            ))
            .await
            .unwrap();

        // then
        assert!(storage.get(Bytes::from("a")).await.unwrap().is_none());
        assert!(storage.get(Bytes::from("b")).await.unwrap().is_none());
        assert!(storage.get(Bytes::from("c")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_isolate_snapshot_from_later_deletes() {
        // given
        let storage = open_storage().await;
        storage.put(vec![record("k", "old")]).await.unwrap();
        let snapshot = storage.snapshot().await.unwrap();

        // when
        storage.delete_range(BytesRange::unbounded()).await.unwrap();

        // then
        let r = snapshot.get(Bytes::from("k")).await.unwrap();
        assert_eq!(r.unwrap().value, Bytes::from("old"));
        assert!(storage.get(Bytes::from("k")).await.unwrap().is_none());
    }
}

//! In-memory storage backend.
//!
//! An ordered map behind a lock. Used as the default test backend and for
//! ephemeral deployments; semantics (ordering, batch atomicity, snapshot
//! isolation) match the durable backends exactly.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    BytesRange, Record, Storage, StorageError, StorageIterator, StorageRead, StorageResult,
    StorageSnapshot, WriteOptions,
};

type OrderedMap = BTreeMap<Bytes, Bytes>;

/// Storage backed by an in-process ordered map.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<OrderedMap>>,
}

impl InMemoryStorage {
    /// Creates an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_map(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, OrderedMap>> {
        self.inner
            .read()
            .map_err(|_| StorageError::Storage("storage lock poisoned".to_string()))
    }

    fn write_map(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, OrderedMap>> {
        self.inner
            .write()
            .map_err(|_| StorageError::Storage("storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageRead for InMemoryStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let map = self.read_map()?;
        Ok(map.get(&key).map(|v| Record::new(key.clone(), v.clone())))
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let map = self.read_map()?;
        Ok(Box::new(VecIterator::from_map(&map, &range)))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        _options: WriteOptions,
    ) -> StorageResult<()> {
        let mut map = self.write_map()?;
        for record in records {
            map.insert(record.key, record.value);
        }
        Ok(())
    }

    async fn delete_range(&self, range: BytesRange) -> StorageResult<()> {
        let mut map = self.write_map()?;
        let keys: Vec<Bytes> = map
            .range::<Bytes, _>(range)
            .map(|(k, _)| k.clone())
            .collect();
        for key in keys {
            map.remove(&key);
        }
        Ok(())
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        let map = self.read_map()?;
        Ok(Arc::new(InMemorySnapshot { map: map.clone() }))
    }
}

/// Frozen copy of the map at snapshot time.
struct InMemorySnapshot {
    map: OrderedMap,
}

#[async_trait]
impl StorageRead for InMemorySnapshot {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        Ok(self
            .map
            .get(&key)
            .map(|v| Record::new(key.clone(), v.clone())))
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        Ok(Box::new(VecIterator::from_map(&self.map, &range)))
    }
}

impl StorageSnapshot for InMemorySnapshot {}

/// Owning iterator over records materialized at scan time.
struct VecIterator {
    records: std::vec::IntoIter<Record>,
}

impl VecIterator {
    fn from_map(map: &OrderedMap, range: &BytesRange) -> Self {
        let records: Vec<Record> = map
            .range::<Bytes, _>(range.clone())
            .map(|(k, v)| Record::new(k.clone(), v.clone()))
            .collect();
        Self {
            records: records.into_iter(),
        }
    }
}

#[async_trait]
impl StorageIterator for VecIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        Ok(self.records.next())
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Bound;

    use super::*;

    fn record(key: &str, value: &str) -> Record {
        Record::new(Bytes::copy_from_slice(key.as_bytes()), Bytes::from(value.to_string()))
    }

    #[tokio::test]
    async fn should_get_record_after_put() {
        // given
        let storage = InMemoryStorage::new();
        storage.put(vec![record("k1", "v1")]).await.unwrap();

        // when
        let found = storage.get(Bytes::from("k1")).await.unwrap();
        let missing = storage.get(Bytes::from("k2")).await.unwrap();

        // then
        assert_eq!(found.unwrap().value, Bytes::from("v1"));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn should_scan_records_in_key_order() {
        // given - inserted out of order
        let storage = InMemoryStorage::new();
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
        assert_eq!(keys, vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
    }

    #[tokio::test]
    async fn should_scan_only_keys_inside_range() {
        // given
        let storage = InMemoryStorage::new();
        storage
            .put(vec![record("a", "1"), record("b", "2"), record("c", "3")])
            .await
            .unwrap();

        // when
        let range = BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Excluded(Bytes::from("c")),
        );
        let mut iter = storage.scan_iter(range).await.unwrap();
        let mut keys = vec![];
        while let Some(r) = iter.next().await.unwrap() {
            keys.push(r.key);
        }

        // then
        assert_eq!(keys, vec![Bytes::from("b")]);
    }

    #[tokio::test]
    async fn should_delete_only_keys_inside_range() {
        // given
        let storage = InMemoryStorage::new();
        storage
            .put(vec![record("a", "1"), record("b", "2"), record("c", "3")])
            .await
            .unwrap();

        // when
        let range = BytesRange::new(
            Bound::Included(Bytes::from("a")),
            Bound::Excluded(Bytes::from("c")),
        );
        storage.delete_range(range).await.unwrap();

        // then
        assert!(storage.get(Bytes::from("a")).await.unwrap().is_none());
        assert!(storage.get(Bytes::from("b")).await.unwrap().is_none());
        assert!(storage.get(Bytes::from("c")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_isolate_snapshot_from_later_writes() {
        // given
        let storage = InMemoryStorage::new();
        storage.put(vec![record("k", "old")]).await.unwrap();
        let snapshot = storage.snapshot().await.unwrap();

        // when - mutate after the snapshot was taken
        storage.put(vec![record("k", "new")]).await.unwrap();
        storage.delete_range(BytesRange::unbounded()).await.unwrap();

        // then - snapshot still sees the old state
        let r = snapshot.get(Bytes::from("k")).await.unwrap();
        assert_eq!(r.unwrap().value, Bytes::from("old"));
        assert!(storage.get(Bytes::from("k")).await.unwrap().is_none());
    }
}

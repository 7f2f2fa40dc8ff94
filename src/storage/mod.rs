//! Storage engine abstraction.
//!
//! The log core depends on exactly four engine capabilities: atomic
//! multi-key batch writes, point-in-time consistent snapshots, range
//! deletion, and byte-lexicographically ordered scans. Those capabilities
//! are expressed by the [`Storage`] family of traits so any compliant
//! ordered key-value engine can be substituted without touching the log
//! logic. Two backends are bundled: [`InMemoryStorage`] and
//! [`SlateDbStorage`].

use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod config;
pub mod factory;
mod memory;
mod slate;

pub use config::{LocalObjectStoreConfig, ObjectStoreConfig, SlateDbStorageConfig, StorageConfig};
pub use factory::create_storage;
pub use memory::InMemoryStorage;
pub use slate::SlateDbStorage;

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Generic backend failure (I/O, resource, configuration).
    #[error("storage error: {0}")]
    Storage(String),
}

impl StorageError {
    /// Wraps an arbitrary backend error.
    pub fn from_storage(err: impl std::fmt::Display) -> Self {
        StorageError::Storage(err.to_string())
    }
}

/// A stored key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The record key.
    pub key: Bytes,
    /// The record value.
    pub value: Bytes,
}

impl Record {
    /// Creates a new record.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}

/// Options for batch writes.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Whether the write must reach stable storage before completion.
    pub await_durable: bool,
}

/// A byte-key range with explicit bounds, usable wherever the standard
/// `RangeBounds<Bytes>` is accepted.
#[derive(Debug, Clone)]
pub struct BytesRange {
    start: Bound<Bytes>,
    end: Bound<Bytes>,
}

impl BytesRange {
    /// Creates a range from explicit bounds.
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>) -> Self {
        Self { start, end }
    }

    /// Creates a range covering the whole keyspace.
    pub fn unbounded() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}

/// Read operations shared by live storage and snapshots.
#[async_trait]
pub trait StorageRead: Send + Sync {
    /// Retrieves a single record by key, or `None` if absent.
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>>;

    /// Opens an ordered scan over the given key range.
    ///
    /// Records are yielded in ascending byte-lexicographic key order.
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>>;
}

/// A lazily-evaluated forward scan over stored records.
#[async_trait]
pub trait StorageIterator: Send {
    /// Returns the next record, or `None` once the range is exhausted.
    async fn next(&mut self) -> StorageResult<Option<Record>>;
}

/// A consistent point-in-time view of the storage.
///
/// Snapshots observe the state as of their creation regardless of later
/// writes or deletes. They are reference counted; dropping the last
/// handle releases the underlying engine resources.
pub trait StorageSnapshot: StorageRead {}

/// Full read-write storage interface.
#[async_trait]
pub trait Storage: StorageRead {
    /// Writes a batch of records with default options.
    async fn put(&self, records: Vec<Record>) -> StorageResult<()> {
        self.put_with_options(records, WriteOptions::default()).await
    }

    /// Writes a batch of records atomically.
    ///
    /// Either every record in the batch becomes visible or none does.
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()>;

    /// Deletes every record whose key falls inside the range, atomically.
    async fn delete_range(&self, range: BytesRange) -> StorageResult<()>;

    /// Takes a consistent point-in-time snapshot.
    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>>;
}

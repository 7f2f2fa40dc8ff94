//! Snapshot-isolated log reads.

use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, KeyFormat};
use crate::error::Result;
use crate::model::{LogEntry, LogId, LogIndex};
use crate::serde::{EntryKey, EntryValue};
use crate::storage::{create_storage, Storage, StorageIterator, StorageSnapshot};

/// Forward-only cursor over one log's entries.
///
/// The iterator is pinned to the engine snapshot taken when the read
/// started: inserts and truncations performed after that point are never
/// observed, so a fully drained iterator yields a consistent view of the
/// log even while it is being compacted. The iterator is fused; once it
/// returns `None` or an error, every later call returns `None`.
pub struct LogIterator {
    // Held to keep the snapshot alive for the life of the scan.
    _snapshot: Arc<dyn StorageSnapshot>,
    iter: Box<dyn StorageIterator + Send>,
    key_format: KeyFormat,
    log_id: LogId,
    done: bool,
}

impl LogIterator {
    pub(crate) async fn open(
        snapshot: Arc<dyn StorageSnapshot>,
        log_id: LogId,
        first: LogIndex,
        key_format: KeyFormat,
    ) -> Result<Self> {
        let range = EntryKey::tail_range(log_id, first, key_format);
        let iter = snapshot.scan_iter(range).await?;
        Ok(Self {
            _snapshot: snapshot,
            iter,
            key_format,
            log_id,
            done: false,
        })
    }

    /// Returns the next entry, or `None` once the log is exhausted.
    ///
    /// Fails with [`crate::Error::MalformedKey`] or
    /// [`crate::Error::DecodeError`] if a stored record cannot be decoded;
    /// after a failure the iterator is exhausted.
    pub async fn next(&mut self) -> Result<Option<LogEntry>> {
        if self.done {
            return Ok(None);
        }

        let record = match self.iter.next().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.done = true;
                return Ok(None);
            }
            Err(err) => {
                self.done = true;
                return Err(err.into());
            }
        };

        let key = match EntryKey::deserialize(&record.key, self.key_format) {
            Ok(key) => key,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        if key.log_id != self.log_id {
            // Scanned past the end of this log into a neighbor.
            self.done = true;
            return Ok(None);
        }

        let value = match EntryValue::deserialize(&record.value) {
            Ok(value) => value,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };

        Ok(Some(LogEntry::new(value.term, key.index, value.payload)))
    }
}

/// Read-only access to log storage.
///
/// Serves the same snapshot-isolated reads as
/// [`LogStore`](crate::LogStore) without exposing any mutation, for
/// consumers such as followers catching up or state machine appliers that
/// must not be able to write.
#[derive(Clone)]
pub struct LogStoreReader {
    storage: Arc<dyn Storage>,
    key_format: KeyFormat,
}

impl LogStoreReader {
    /// Opens a reader over the backend described by `config`.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        Ok(Self::new(storage, config.key_format))
    }

    /// Creates a reader over an already-open storage backend.
    pub fn new(storage: Arc<dyn Storage>, key_format: KeyFormat) -> Self {
        Self {
            storage,
            key_format,
        }
    }

    /// Opens an iterator over log `log_id` starting at index `first`.
    ///
    /// Entries with indices below `first` are skipped. Reading a log that
    /// does not exist yields an immediately exhausted iterator, never an
    /// error.
    pub async fn read(&self, log_id: LogId, first: LogIndex) -> Result<LogIterator> {
        debug!(log_id, first, "opening log iterator");
        let snapshot = self.storage.snapshot().await?;
        LogIterator::open(snapshot, log_id, first, self.key_format).await
    }
}

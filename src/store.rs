//! Log store write path.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::debug;

use crate::config::{Config, KeyFormat, WriteOptions};
use crate::error::{Error, Result};
use crate::executor::{Executor, WorkerExecutor};
use crate::model::{LogEntry, LogId, LogIndex};
use crate::reader::LogIterator;
use crate::serde::{EntryBatchBuilder, EntryKey};
use crate::storage::{self, create_storage, Storage};

/// Mutation ordering state for one log.
///
/// The tail is the index of the last entry ever appended. It is recovered
/// lazily from storage on the log's first mutation after open, then kept
/// in memory. Prefix truncation never lowers it, so within one process
/// lifetime an appended index stays consumed even after its entry has
/// been compacted away. The tail is not persisted: after a restart it is
/// rebuilt from the surviving entries, and a log whose entire prefix was
/// truncated recovers with no tail at all.
struct LogWriteState {
    tail: Option<LogIndex>,
    recovered: bool,
}

/// Durable store for many independent term-stamped logs.
///
/// All logs share one storage backend; each is addressed by its [`LogId`].
/// Mutations to one log are serialized against each other, while different
/// logs proceed independently. Reads are snapshot isolated and never block
/// behind mutations.
///
/// The store is cheaply cloneable; clones share the backend, the executor,
/// and the per-log ordering state.
#[derive(Clone)]
pub struct LogStore {
    storage: Arc<dyn Storage>,
    key_format: KeyFormat,
    executor: Arc<dyn Executor>,
    logs: Arc<Mutex<HashMap<LogId, Arc<Mutex<LogWriteState>>>>>,
}

impl LogStore {
    /// Opens a store over the backend described by `config`.
    ///
    /// Commit tasks run on a dedicated worker; use [`LogStore::new`] to
    /// supply a different executor or an already-open backend.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        Ok(Self::new(
            storage,
            config.key_format,
            Arc::new(WorkerExecutor::spawn()),
        ))
    }

    /// Creates a store over an already-open storage backend.
    pub fn new(
        storage: Arc<dyn Storage>,
        key_format: KeyFormat,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            storage,
            key_format,
            executor,
            logs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Appends a batch of entries to log `log_id`, atomically.
    ///
    /// The batch's indices must be strictly increasing and its first index
    /// must lie strictly above the log's current tail; gaps are allowed.
    /// On success the whole batch is visible to subsequent reads and the
    /// tail advances to the batch's last index. On failure nothing is
    /// written and the tail is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyBatch`] if `entries` is empty.
    /// - [`Error::OutOfOrderInsert`] if the batch violates monotonicity.
    /// - [`Error::WriteFailed`] if the engine rejects the commit.
    pub async fn insert(
        &self,
        log_id: LogId,
        entries: Vec<LogEntry>,
        options: WriteOptions,
    ) -> Result<()> {
        let first = entries.first().ok_or(Error::EmptyBatch)?.index;
        validate_batch(log_id, &entries)?;
        let last = entries[entries.len() - 1].index;

        let state = self.log_state(log_id).await;
        let mut state = state.lock().await;
        if !state.recovered {
            state.tail = self.recover_tail(log_id).await?;
            state.recovered = true;
        }
        if let Some(tail) = state.tail {
            if first <= tail {
                return Err(Error::OutOfOrderInsert {
                    log_id,
                    message: format!("first index {first} is not above tail {tail}"),
                });
            }
        }

        let mut records = Vec::with_capacity(entries.len());
        EntryBatchBuilder::build(log_id, &entries, self.key_format, &mut records);

        debug!(log_id, first, last, count = entries.len(), "inserting entries");

        let storage = self.storage.clone();
        let write_options = storage::WriteOptions {
            await_durable: options.await_durable,
        };
        let (tx, rx) = oneshot::channel();
        self.executor
            .execute(Box::pin(async move {
                let result = storage.put_with_options(records, write_options).await;
                let _ = tx.send(result);
            }))
            .await;
        rx.await
            .map_err(|_| Error::WriteFailed("commit task dropped".to_string()))?
            .map_err(|err| Error::WriteFailed(err.to_string()))?;

        state.tail = Some(last);
        Ok(())
    }

    /// Removes every entry of log `log_id` with index below `first_kept`.
    ///
    /// The removal is atomic and idempotent; truncating an empty range or
    /// an unknown log succeeds without effect. The log's tail is not
    /// lowered, so removed indices cannot be reused within this process.
    /// The tail itself is not persisted: after a restart it is recovered
    /// from the surviving entries, so fully truncating a log and then
    /// restarting makes its old indices insertable again.
    ///
    /// Iterators opened before the call are pinned to their snapshot and
    /// still observe the removed entries.
    pub async fn remove_front(&self, log_id: LogId, first_kept: LogIndex) -> Result<()> {
        let state = self.log_state(log_id).await;
        let _state = state.lock().await;

        debug!(log_id, first_kept, "truncating log prefix");

        let range = EntryKey::scan_range(log_id, 0..first_kept, self.key_format);
        let storage = self.storage.clone();
        let (tx, rx) = oneshot::channel();
        self.executor
            .execute(Box::pin(async move {
                let result = storage.delete_range(range).await;
                let _ = tx.send(result);
            }))
            .await;
        rx.await
            .map_err(|_| Error::WriteFailed("truncation task dropped".to_string()))?
            .map_err(|err| Error::WriteFailed(err.to_string()))?;

        Ok(())
    }

    /// Opens an iterator over log `log_id` starting at index `first`.
    ///
    /// The iterator observes the log as of this call; concurrent inserts
    /// and truncations do not affect it. Reading a log that does not exist
    /// yields an immediately exhausted iterator.
    pub async fn read(&self, log_id: LogId, first: LogIndex) -> Result<LogIterator> {
        let snapshot = self.storage.snapshot().await?;
        LogIterator::open(snapshot, log_id, first, self.key_format).await
    }

    async fn log_state(&self, log_id: LogId) -> Arc<Mutex<LogWriteState>> {
        let mut logs = self.logs.lock().await;
        logs.entry(log_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(LogWriteState {
                    tail: None,
                    recovered: false,
                }))
            })
            .clone()
    }

    /// Scans the log forward to its last stored entry.
    ///
    /// Called once per log while holding its write lock, so no mutation
    /// can race the scan.
    async fn recover_tail(&self, log_id: LogId) -> Result<Option<LogIndex>> {
        let range = EntryKey::tail_range(log_id, 0, self.key_format);
        let mut iter = self.storage.scan_iter(range).await?;
        let mut tail = None;
        while let Some(record) = iter.next().await? {
            let key = EntryKey::deserialize(&record.key, self.key_format)?;
            if key.log_id != log_id {
                break;
            }
            tail = Some(key.index);
        }
        if let Some(tail) = tail {
            debug!(log_id, tail, "recovered log tail");
        }
        Ok(tail)
    }
}

/// Checks that a batch's indices are strictly increasing.
fn validate_batch(log_id: LogId, entries: &[LogEntry]) -> Result<()> {
    for pair in entries.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(Error::OutOfOrderInsert {
                log_id,
                message: format!(
                    "index {} does not increase over preceding index {}",
                    pair[1].index, pair[0].index
                ),
            });
        }
    }
    Ok(())
}

//! replog - durable replicated log storage over an ordered key-value engine.
//!
//! replog persists many independent, term-stamped logs in one shared
//! keyspace. Each log is identified by a numeric [`LogId`] and holds a
//! strictly increasing (but not necessarily contiguous) sequence of
//! entries. The crate is the durability primitive a consensus-style
//! replication layer builds on: it stores entries, truncates compacted
//! prefixes, and serves snapshot-isolated reads. It does not implement
//! elections, networking, or a query layer.
//!
//! # Architecture
//!
//! Entries are encoded into fixed-width keys whose byte-lexicographic
//! order matches the numeric `(log id, index)` order, so any engine with
//! a plain byte-wise comparator keeps every log contiguous and ordered.
//! The engine itself sits behind the narrow [`storage::Storage`] trait
//! (atomic batch writes, snapshots, range deletes, ordered scans); an
//! in-memory backend and a SlateDB backend are bundled.
//!
//! # Key Concepts
//!
//! - **LogStore**: the main entry point. Appends entry batches, truncates
//!   prefixes, and opens iterators.
//! - **LogStoreReader**: a read-only view over the same backend, for
//!   consumers that should not have write access.
//! - **LogIterator**: a forward-only cursor pinned to an engine snapshot
//!   taken when the read started. Concurrent truncation never affects an
//!   already-open iterator.
//! - **Executor**: pluggable strategy for running commit tasks, either
//!   inline on the caller or on a dedicated ordered worker.
//!
//! # Example
//!
//! ```ignore
//! use bytes::Bytes;
//! use replog::{Config, LogEntry, LogStore, WriteOptions};
//!
//! let store = LogStore::open(Config::default()).await?;
//!
//! store
//!     .insert(
//!         1,
//!         vec![LogEntry::new(1, 1, Bytes::from("first"))],
//!         WriteOptions::default(),
//!     )
//!     .await?;
//!
//! let mut iter = store.read(1, 1).await?;
//! while let Some(entry) = iter.next().await? {
//!     println!("term={} index={}", entry.term, entry.index);
//! }
//! ```

mod config;
mod error;
mod executor;
mod model;
mod reader;
mod serde;
mod store;
pub mod storage;

pub use config::{Config, KeyFormat, WriteOptions};
pub use error::{Error, Result};
pub use executor::{Executor, InlineExecutor, Task, WorkerExecutor};
pub use model::{LogEntry, LogId, LogIndex, LogTerm};
pub use reader::{LogIterator, LogStoreReader};
pub use store::LogStore;

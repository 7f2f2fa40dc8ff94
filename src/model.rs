//! Core data types for replog.
//!
//! This module defines the value types shared across the crate: the
//! identifiers that scope and order entries, and the entry itself.

use bytes::Bytes;

/// Identity of one independent log.
///
/// Many logs share a single physical backend; their key ranges never
/// overlap. Log ids are assigned by the layer above (typically one per
/// replicated state machine) and are stable for the life of the log.
pub type LogId = u64;

/// Epoch counter associated with an entry.
///
/// Terms identify which leadership period produced an entry. The storage
/// layer round-trips terms exactly but does not enforce the convention
/// that they are non-decreasing along a log; that is a caller invariant.
pub type LogTerm = u64;

/// Position of an entry within one log's total order.
///
/// Indices inserted into a log are strictly increasing across the life of
/// the log. Gaps are permitted; contiguity is not required.
pub type LogIndex = u64;

/// One persisted log entry.
///
/// The atomic unit of storage: a term, an index, and an opaque payload.
/// Entries are immutable once committed; they are only ever removed
/// wholesale by prefix truncation.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use replog::LogEntry;
///
/// let entry = LogEntry::new(2, 17, Bytes::from("applied-command"));
/// assert_eq!(entry.term, 2);
/// assert_eq!(entry.index, 17);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Term under which the entry was produced.
    pub term: LogTerm,

    /// Position of the entry within its log.
    pub index: LogIndex,

    /// The entry payload.
    ///
    /// Any byte sequence. The storage layer never interprets or validates
    /// its contents.
    pub payload: Bytes,
}

impl LogEntry {
    /// Creates a new log entry. Construction cannot fail.
    pub fn new(term: LogTerm, index: LogIndex, payload: Bytes) -> Self {
        Self {
            term,
            index,
            payload,
        }
    }
}

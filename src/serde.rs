//! Serde for log storage.
//!
//! This module encodes log entries into the shared keyspace of the
//! underlying engine and decodes them back during iteration.
//!
//! # Key Format
//!
//! Every entry key has the same fixed width:
//!
//! ```text
//! | log_id (u64) | index (u64) |
//! ```
//!
//! Both fields are written in the [`KeyFormat`] configured when the store
//! was opened. With `BigEndian` (the default), byte-lexicographic key
//! order equals numeric `(log_id, index)` order, so the engine's plain
//! byte-wise comparator keeps every log's entries contiguous and index
//! ordered: log `n` occupies exactly the keys between `(n, 0)` and
//! `(n, u64::MAX)`. That contiguity is what makes range scans and range
//! deletes scoped to one log possible.
//!
//! # Value Format
//!
//! ```text
//! | term (u64 BE) | payload (raw bytes) |
//! ```
//!
//! Values are never compared by the engine, so the term is always stored
//! big-endian regardless of the configured key format.

use std::ops::{Bound, Range};

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::KeyFormat;
use crate::error::Error;
use crate::model::{LogEntry, LogId, LogIndex, LogTerm};
use crate::storage::{BytesRange, Record};

/// Fixed width of an encoded entry key, in bytes.
pub const ENTRY_KEY_LEN: usize = 16;

fn put_u64(buf: &mut BytesMut, value: u64, format: KeyFormat) {
    match format {
        KeyFormat::BigEndian => buf.put_u64(value),
        KeyFormat::LittleEndian => buf.put_u64_le(value),
    }
}

fn get_u64(data: [u8; 8], format: KeyFormat) -> u64 {
    match format {
        KeyFormat::BigEndian => u64::from_be_bytes(data),
        KeyFormat::LittleEndian => u64::from_le_bytes(data),
    }
}

/// Key for a log entry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryKey {
    /// The log this entry belongs to.
    pub log_id: LogId,
    /// The entry's position within the log.
    pub index: LogIndex,
}

impl EntryKey {
    /// Creates a new entry key.
    pub fn new(log_id: LogId, index: LogIndex) -> Self {
        Self { log_id, index }
    }

    /// Serializes the key to bytes for storage.
    pub fn serialize(&self, format: KeyFormat) -> Bytes {
        let mut buf = BytesMut::with_capacity(ENTRY_KEY_LEN);
        put_u64(&mut buf, self.log_id, format);
        put_u64(&mut buf, self.index, format);
        buf.freeze()
    }

    /// Deserializes an entry key from bytes.
    ///
    /// Fails with [`Error::MalformedKey`] if the byte length does not
    /// match the fixed layout; a wrong length indicates corruption or a
    /// key byte-order misconfiguration.
    pub fn deserialize(data: &[u8], format: KeyFormat) -> Result<Self, Error> {
        if data.len() != ENTRY_KEY_LEN {
            return Err(Error::MalformedKey(format!(
                "expected {} bytes, got {}",
                ENTRY_KEY_LEN,
                data.len()
            )));
        }

        let log_id = get_u64(
            [
                data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
            ],
            format,
        );
        let index = get_u64(
            [
                data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
            ],
            format,
        );

        Ok(EntryKey { log_id, index })
    }

    /// Creates a storage key range covering one log's entries with
    /// indices in `[index_range.start, index_range.end)`.
    pub fn scan_range(log_id: LogId, index_range: Range<LogIndex>, format: KeyFormat) -> BytesRange {
        let start = EntryKey::new(log_id, index_range.start).serialize(format);
        let end = EntryKey::new(log_id, index_range.end).serialize(format);
        BytesRange::new(Bound::Included(start), Bound::Excluded(end))
    }

    /// Creates a storage key range covering one log's entries from
    /// `start` to the end of the log.
    pub fn tail_range(log_id: LogId, start: LogIndex, format: KeyFormat) -> BytesRange {
        let start_key = EntryKey::new(log_id, start).serialize(format);
        let end_key = EntryKey::new(log_id, LogIndex::MAX).serialize(format);
        BytesRange::new(Bound::Included(start_key), Bound::Included(end_key))
    }
}

/// Value for a log entry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryValue {
    /// Term under which the entry was produced.
    pub term: LogTerm,
    /// The entry payload.
    pub payload: Bytes,
}

impl EntryValue {
    /// Creates a new entry value.
    pub fn new(term: LogTerm, payload: Bytes) -> Self {
        Self { term, payload }
    }

    /// Serializes the value to bytes for storage.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(8 + self.payload.len());
        buf.put_u64(self.term);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Deserializes an entry value from bytes.
    ///
    /// The payload shares the input buffer; no copy is made. Fails with
    /// [`Error::DecodeError`] if the buffer is too short to hold a term.
    pub fn deserialize(data: &Bytes) -> Result<Self, Error> {
        if data.len() < 8 {
            return Err(Error::DecodeError(format!(
                "value too short for entry: need at least 8 bytes, got {}",
                data.len()
            )));
        }

        let term = u64::from_be_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]);
        let payload = data.slice(8..);

        Ok(EntryValue { term, payload })
    }
}

/// Builder for entry storage records.
///
/// Converts a validated entry batch into storage records with encoded
/// keys, ready to be written atomically.
pub(crate) struct EntryBatchBuilder;

impl EntryBatchBuilder {
    /// Builds storage records for a batch of entries.
    ///
    /// For each entry, creates a record with:
    /// - Key: encoded [`EntryKey`] of (log_id, entry.index)
    /// - Value: encoded [`EntryValue`] of (entry.term, entry.payload)
    ///
    /// Records are appended to the provided `records` vec.
    pub(crate) fn build(
        log_id: LogId,
        entries: &[LogEntry],
        format: KeyFormat,
        records: &mut Vec<Record>,
    ) {
        for entry in entries {
            let key = EntryKey::new(log_id, entry.index);
            let value = EntryValue::new(entry.term, entry.payload.clone());
            records.push(Record::new(key.serialize(format), value.serialize()));
        }
    }
}

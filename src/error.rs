//! Error types for replog.
//!
//! All operations return typed failures; nothing is retried or swallowed
//! at this layer. Each variant carries a human-readable message and maps
//! to a stable numeric code via [`Error::code`] for callers that report
//! errors in a code/message shape.

use thiserror::Error;

/// Result type for replog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by log operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An insert batch's indices are not strictly increasing, or do not
    /// start strictly above the log's current tail. The log is unchanged.
    #[error("out-of-order insert for log {log_id}: {message}")]
    OutOfOrderInsert {
        /// The log the batch was destined for.
        log_id: u64,
        /// What the monotonicity check rejected.
        message: String,
    },

    /// An insert was called with no entries.
    #[error("insert batch is empty")]
    EmptyBatch,

    /// The engine reported an I/O or resource failure while committing a
    /// batch or a range delete. Atomicity of the underlying operation
    /// guarantees the log's durable state is unchanged.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A stored value could not be parsed back into an entry during
    /// iteration. Reported at the `next()` that hit the bad record.
    #[error("entry decode failed: {0}")]
    DecodeError(String),

    /// A stored key did not match the fixed key layout. Indicates
    /// corruption or a key byte-order misconfiguration.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// An engine failure outside the commit path (opening the backend,
    /// taking a snapshot, or stepping a scan).
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<crate::storage::StorageError> for Error {
    fn from(err: crate::storage::StorageError) -> Self {
        Error::Storage(err.to_string())
    }
}

impl Error {
    /// Stable numeric code for this error. `0` is reserved for success.
    pub fn code(&self) -> u32 {
        match self {
            Error::OutOfOrderInsert { .. } => 1,
            Error::EmptyBatch => 2,
            Error::WriteFailed(_) => 3,
            Error::DecodeError(_) => 4,
            Error::MalformedKey(_) => 5,
            Error::Storage(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_each_variant_to_distinct_code() {
        // given
        let errors = vec![
            Error::OutOfOrderInsert {
                log_id: 1,
                message: "tail is 5".to_string(),
            },
            Error::EmptyBatch,
            Error::WriteFailed("io".to_string()),
            Error::DecodeError("short value".to_string()),
            Error::MalformedKey("wrong length".to_string()),
            Error::Storage("backend closed".to_string()),
        ];

        // when
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();

        // then - every code is distinct and non-zero
        assert_eq!(codes.len(), 6);
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn should_include_log_id_in_out_of_order_message() {
        // given
        let err = Error::OutOfOrderInsert {
            log_id: 42,
            message: "first index 3 is not above tail 7".to_string(),
        };

        // then
        let text = err.to_string();
        assert!(text.contains("42"));
        assert!(text.contains("tail 7"));
    }
}

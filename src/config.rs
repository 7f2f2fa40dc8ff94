//! Configuration for opening a log store and for individual operations.

use serde::{Deserialize, Serialize};

use crate::storage::StorageConfig;

/// Byte order used when encoding numeric key fields.
///
/// Selected once when a store is opened and fixed for the life of the
/// data: keys written under one format are not readable under the other,
/// so this is a deployment-time setting, never a per-call option.
///
/// `BigEndian` makes the byte-lexicographic order of encoded keys equal
/// to the numeric `(log id, index)` order, which is what an engine with a
/// plain byte-wise comparator needs. `LittleEndian` exists for engines
/// configured with a numeric key comparator; both bundled backends
/// compare byte-wise and therefore require `BigEndian`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyFormat {
    /// Most significant byte first. Default, and required by byte-wise
    /// comparators.
    #[default]
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

/// Configuration for opening a [`LogStore`](crate::LogStore) or
/// [`LogStoreReader`](crate::LogStoreReader).
///
/// # Example
///
/// ```
/// use replog::{Config, KeyFormat};
/// use replog::storage::StorageConfig;
///
/// let config = Config {
///     storage: StorageConfig::InMemory,
///     key_format: KeyFormat::BigEndian,
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend configuration.
    ///
    /// Determines where log data is persisted. See [`StorageConfig`] for
    /// the available backends.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key byte order. See [`KeyFormat`].
    #[serde(default)]
    pub key_format: KeyFormat,
}

/// Options for insert operations.
///
/// Controls the durability of [`LogStore::insert`](crate::LogStore::insert).
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Whether to wait for the write to be durable before returning.
    ///
    /// When `true`, the insert does not complete until the batch has been
    /// flushed to stable storage. When `false` (the default), it
    /// completes once the batch is queued in the engine's write buffer,
    /// trading a window of data loss on crash for lower latency.
    pub await_durable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_big_endian_keys() {
        // given/when
        let config = Config::default();

        // then
        assert_eq!(config.key_format, KeyFormat::BigEndian);
    }

    #[test]
    fn should_deserialize_config_from_yaml() {
        // given
        let yaml = r#"
storage:
  type: InMemory
key_format: LittleEndian
"#;

        // when
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // then
        assert_eq!(config.storage, StorageConfig::InMemory);
        assert_eq!(config.key_format, KeyFormat::LittleEndian);
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        // given
        let yaml = r#"
storage:
  type: InMemory
"#;

        // when
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // then
        assert_eq!(config.key_format, KeyFormat::BigEndian);
    }
}

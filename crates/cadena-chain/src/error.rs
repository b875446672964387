//! Error types for chain control and persistence.
//!
//! None of these errors ever reach the audio thread. The render path has no
//! failure mode: it falls back to the last valid working order and reports
//! anomalies through [`Diagnostics`](crate::Diagnostics) counters.

use std::path::PathBuf;
use thiserror::Error;

use crate::StageKind;

/// Errors raised by order validation, the order queue, the state codec and
/// state persistence.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The order queue had no free slot; the update was dropped.
    #[error("order queue is full, update dropped")]
    QueueFull,

    /// A persisted order did not have one entry per stage kind.
    #[error("persisted order has {found} entries, expected {expected}")]
    InvalidOrderLength {
        /// Entries a complete order has.
        expected: usize,
        /// Entries found.
        found: usize,
    },

    /// An integer did not name a stage kind.
    #[error("unknown stage ordinal {0}")]
    UnknownStageOrdinal(i32),

    /// An order repeated a stage kind or left one out.
    #[error("chain order is not a permutation ({})", permutation_detail(.duplicate, .missing))]
    NotPermutation {
        /// First kind found twice.
        duplicate: Option<StageKind>,
        /// First kind not found.
        missing: Option<StageKind>,
    },

    /// A position index was outside the chain.
    #[error("position {position} is outside a chain of {len} stages")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Chain length.
        len: usize,
    },

    /// A string did not name a stage kind.
    #[error("unknown stage name: {0}")]
    UnknownStageName(String),

    /// A string did not name a parameter.
    #[error("unknown parameter: {0}")]
    UnknownParam(String),

    /// Persisted state was written by an incompatible format version.
    #[error("unsupported state version {0}")]
    UnsupportedStateVersion(u32),

    /// Persisted state could not be (de)serialized.
    #[error("failed to (de)serialize state: {0}")]
    State(#[from] serde_json::Error),

    /// The configuration was unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn permutation_detail(duplicate: &Option<StageKind>, missing: &Option<StageKind>) -> String {
    match (duplicate, missing) {
        (Some(dup), Some(miss)) => format!("{dup} repeated, {miss} missing"),
        (Some(dup), None) => format!("{dup} repeated"),
        (None, Some(miss)) => format!("{miss} missing"),
        (None, None) => "empty position".to_string(),
    }
}

/// Errors raised while loading or checking a [`ChainConfig`](crate::ChainConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field held an unusable value
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why the value is unusable.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid field error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn invalid_order_length_display() {
        let err = ChainError::InvalidOrderLength {
            expected: 5,
            found: 3,
        };
        assert_eq!(err.to_string(), "persisted order has 3 entries, expected 5");
    }

    #[test]
    fn not_permutation_display() {
        let err = ChainError::NotPermutation {
            duplicate: Some(StageKind::Chorus),
            missing: Some(StageKind::Phaser),
        };
        let msg = err.to_string();
        assert!(msg.contains("chorus repeated"), "got: {msg}");
        assert!(msg.contains("phaser missing"), "got: {msg}");
    }

    #[test]
    fn unknown_ordinal_display() {
        assert_eq!(
            ChainError::UnknownStageOrdinal(9).to_string(),
            "unknown stage ordinal 9"
        );
    }

    #[test]
    fn state_error_keeps_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ChainError::from(json_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn config_factories() {
        let err = ConfigError::read_file(
            "/a/b.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "mock"),
        );
        assert!(err.to_string().contains("/a/b.toml"));
        assert!(err.source().is_some());

        let err = ConfigError::invalid("channels", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for 'channels': must be at least 1"
        );
    }
}

//! Chain configuration file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::{ChainOrder, ChainParams, StageKind};

/// Largest channel count a processor accepts.
pub const MAX_CHANNELS: usize = 8;

/// Sample rate range a processor accepts, in Hz.
pub const SAMPLE_RATE_RANGE: core::ops::RangeInclusive<f32> = 8000.0..=768_000.0;

/// Largest requested order-queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 16;

/// Everything needed to build a processor/controller pair.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100.0
/// max_block_size = 256
/// channels = 2
/// queue_capacity = 100
/// initial_order = ["ladder_filter", "phaser", "chorus", "overdrive", "parametric_filter"]
/// bypass = ["chorus"]
///
/// [params]
/// ladder_cutoff_hz = 800.0
/// overdrive_saturation = 12.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,

    /// Largest block the processor will be handed.
    pub max_block_size: usize,

    /// Channel count; one stage registry is built per channel.
    pub channels: usize,

    /// Requested order queue capacity (rounded up to a power of two).
    pub queue_capacity: usize,

    /// Order in effect before the first push.
    pub initial_order: Vec<StageKind>,

    /// Kinds that start bypassed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bypass: Vec<StageKind>,

    /// Initial parameter values by id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f32>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: 512,
            channels: 2,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            initial_order: StageKind::ALL.to_vec(),
            bypass: Vec::new(),
            params: BTreeMap::new(),
        }
    }
}

impl ChainConfig {
    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the maximum block size.
    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Set the initial order.
    pub fn with_initial_order(mut self, order: &ChainOrder) -> Self {
        self.initial_order = order.iter().flatten().collect();
        self
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded chain config");
        Ok(config)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!(
                    "{} Hz is outside {}..={} Hz",
                    self.sample_rate,
                    SAMPLE_RATE_RANGE.start(),
                    SAMPLE_RATE_RANGE.end()
                ),
            ));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::invalid("max_block_size", "must be at least 1"));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(ConfigError::invalid(
                "channels",
                format!("{} is outside 1..={MAX_CHANNELS}", self.channels),
            ));
        }
        if !(1..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(ConfigError::invalid(
                "queue_capacity",
                format!("{} is outside 1..={MAX_QUEUE_CAPACITY}", self.queue_capacity),
            ));
        }
        self.initial_order()?;

        let known = ChainParams::new();
        if let Some(id) = self.params.keys().find(|id| known.find(id).is_none()) {
            return Err(ConfigError::invalid("params", format!("unknown parameter '{id}'")));
        }
        Ok(())
    }

    /// The initial order as a validated [`ChainOrder`].
    pub fn initial_order(&self) -> Result<ChainOrder, ConfigError> {
        ChainOrder::try_from(self.initial_order.as_slice())
            .map_err(|e| ConfigError::invalid("initial_order", e.to_string()))
    }
}

//! Whole-state persistence.
//!
//! [`PersistedState`] is a small versioned JSON document holding every
//! parameter value by id plus named binary properties. The chain order is
//! the property [`ORDER_PROPERTY`], in the byte form of
//! [`codec::order_to_bytes`](crate::codec::order_to_bytes).
//!
//! ```json
//! {
//!   "version": 1,
//!   "params": { "chorus_mix": 0.05, "ladder_cutoff_hz": 2000.0, ... },
//!   "properties": { "dsp_order": [3, 0, 0, 0, 0, 0, 0, 0, ...] }
//! }
//! ```
//!
//! Properties decode independently: a damaged order never prevents the
//! parameters from being restored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ChainError, ChainOrder, ChainParams, codec};

/// Format version written by [`PersistedState::to_bytes`].
pub const STATE_VERSION: u32 = 1;

/// Property holding the chain order.
pub const ORDER_PROPERTY: &str = "dsp_order";

/// Serializable snapshot of parameters and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Format version.
    pub version: u32,

    /// Parameter values by id.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,

    /// Named binary properties.
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<u8>>,
}

impl PersistedState {
    /// Capture every parameter and `order`.
    pub fn capture(params: &ChainParams, order: &ChainOrder) -> Self {
        let params = params
            .iter()
            .map(|param| (param.id().to_string(), param.get_plain()))
            .collect();
        let mut properties = BTreeMap::new();
        properties.insert(ORDER_PROPERTY.to_string(), codec::order_to_bytes(order));
        Self {
            version: STATE_VERSION,
            params,
            properties,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChainError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse JSON bytes, rejecting unknown format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let state: Self = serde_json::from_slice(bytes)?;
        if state.version != STATE_VERSION {
            return Err(ChainError::UnsupportedStateVersion(state.version));
        }
        Ok(state)
    }

    /// Decoded chain order, `None` when the property is absent.
    pub fn order(&self) -> Option<Result<ChainOrder, ChainError>> {
        self.properties
            .get(ORDER_PROPERTY)
            .map(|bytes| codec::order_from_bytes(bytes))
    }

    /// Write every known parameter into `params` (clamped) and return the
    /// ids that matched no parameter.
    pub fn apply_params(&self, params: &ChainParams) -> Vec<String> {
        let mut unknown = Vec::new();
        for (id, &value) in &self.params {
            match params.find(id) {
                Some(param) => param.set_plain(value),
                None => unknown.push(id.clone()),
            }
        }
        unknown
    }
}

/// Outcome of a state restore.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Parameters written.
    pub params_restored: usize,
    /// Persisted ids that matched no parameter.
    pub params_ignored: Vec<String>,
    /// Order pushed for adoption at the next block.
    pub order: Option<ChainOrder>,
    /// Why the persisted order was not pushed, if it was present but
    /// unusable.
    pub order_error: Option<ChainError>,
}

impl RestoreReport {
    /// Whether everything in the state was restored.
    pub fn is_complete(&self) -> bool {
        self.params_ignored.is_empty() && self.order_error.is_none()
    }
}

//! # Configuration
//!
//! Tunables for the scoring pipeline. Everything here has a default, so an
//! empty JSON object is a valid configuration file.

use crate::types::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default consensus threshold for every triadic processor.
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.8;

/// Default upper bound on input length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 10_000;

/// Runtime configuration for an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Threshold each stage's consensus must reach to count as achieved.
    pub consensus_threshold: f64,

    /// Weight of the mean stage consensus in `system_resonance`.
    pub consensus_weight: f64,

    /// Weight of the aggregate geometry harmony in `system_resonance`.
    pub harmony_weight: f64,

    /// Inputs longer than this are rejected.
    pub max_input_chars: usize,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            consensus_weight: 0.6,
            harmony_weight: 0.4,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl ForgeConfig {
    /// Check the configuration for internal consistency.
    ///
    /// The harmony weight must stay strictly positive: harmony is the term
    /// that keeps resonance above zero for inputs that score no consensus.
    pub fn validate(&self) -> ForgeResult<()> {
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(ForgeError::Config(format!(
                "consensus_threshold {} outside [0, 1]",
                self.consensus_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.consensus_weight) {
            return Err(ForgeError::Config(format!(
                "consensus_weight {} outside [0, 1]",
                self.consensus_weight
            )));
        }
        if !(self.harmony_weight > 0.0 && self.harmony_weight <= 1.0) {
            return Err(ForgeError::Config(format!(
                "harmony_weight {} outside (0, 1]",
                self.harmony_weight
            )));
        }
        if ((self.consensus_weight + self.harmony_weight) - 1.0).abs() > 1e-9 {
            return Err(ForgeError::Config(format!(
                "resonance weights must sum to 1 (got {} + {})",
                self.consensus_weight, self.harmony_weight
            )));
        }
        if self.max_input_chars == 0 {
            return Err(ForgeError::Config(
                "max_input_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> ForgeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> ForgeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

// =============================================================================
// TESTS
// =============================================================================

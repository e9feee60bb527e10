//! # Response Module
//!
//! Records returned by the two pipeline entry points.
//!
//! [`EnhancedResult`] carries everything the pipeline measured;
//! [`ProcessResult`] is the baseline projection of it.

use crate::bridge::BridgeExecution;
use crate::intent::Intent;
use crate::triadic::ConsensusResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bridge activity summary for one enhanced call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyphenatorStatus {
    pub active_bridges: usize,
    /// Bridges executed by this call.
    pub executions_this_call: usize,
    /// Sum of all bridges' execution counts after this call.
    pub total_executions: u64,
    pub log_length: usize,
}

/// Cross-stage consensus summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriadicConsensus {
    pub average_score: f64,
    pub stages_achieved: usize,
    pub stages_total: usize,
    pub unanimous: bool,
}

impl TriadicConsensus {
    /// Summarize stage results.
    #[must_use]
    pub fn from_phases<'a>(phases: impl IntoIterator<Item = &'a ConsensusResult>) -> Self {
        let (total, achieved, sum) =
            phases
                .into_iter()
                .fold((0usize, 0usize, 0.0), |(t, a, s), phase| {
                    (
                        t + 1,
                        a + usize::from(phase.consensus_achieved),
                        s + phase.consensus_score,
                    )
                });
        Self {
            average_score: if total == 0 { 0.0 } else { sum / total as f64 },
            stages_achieved: achieved,
            stages_total: total,
            unanimous: total > 0 && achieved == total,
        }
    }
}

/// Full record from `process_enhanced_input`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedResult {
    pub response: String,
    pub enhanced_response: String,
    pub intent: Intent,
    pub concepts: Vec<String>,
    pub system_resonance: f64,
    pub processing_time_ms: f64,
    /// Stage consensus records keyed by stage name.
    pub phases: BTreeMap<String, ConsensusResult>,
    pub bridge_executions: Vec<BridgeExecution>,
    pub sacred_geometry_harmony: f64,
    /// Entropy fed to the harmony calculation.
    pub input_entropy: f64,
    pub hyphenator_status: HyphenatorStatus,
    pub triadic_consensus: TriadicConsensus,
    pub timestamp: String,
}

/// Baseline record from `process_input`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub response: String,
    pub intent: Intent,
    pub concepts: Vec<String>,
    pub system_resonance: f64,
    pub processing_time_ms: f64,
}

impl From<EnhancedResult> for ProcessResult {
    fn from(full: EnhancedResult) -> Self {
        Self {
            response: full.response,
            intent: full.intent,
            concepts: full.concepts,
            system_resonance: full.system_resonance,
            processing_time_ms: full.processing_time_ms,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

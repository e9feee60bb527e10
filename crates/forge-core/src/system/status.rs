//! Status snapshot types.

use crate::filing::FilingCounts;
use crate::geometry::GOLDEN_RATIO;
use crate::orchestrator::{Orchestrator, VERSION};
use crate::types::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Consensus state of one processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorMetrics {
    /// Mean of the active elements' latest scores.
    pub current_consensus: f64,
    pub consensus_achieved: bool,
    pub active_elements: usize,
    pub threshold: f64,
}

/// Consensus summary across all processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusMetrics {
    pub processors: BTreeMap<String, ProcessorMetrics>,
    pub average_consensus: f64,
    pub processors_in_consensus: usize,
}

/// Geometry summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStatus {
    pub golden_ratio: f64,
    pub total_vertices: usize,
    /// Vertex count per primitive.
    pub primitives: BTreeMap<String, usize>,
}

/// Snapshot returned by [`Orchestrator::get_system_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub timestamp: String,
    pub system_resonance: f64,
    pub active_bridges: usize,
    pub triadic_processors: usize,
    pub geometric_primitives: usize,
    pub bridge_executions_total: u64,
    pub execution_log_length: usize,
    pub consensus_metrics: ConsensusMetrics,
    pub geometry_status: GeometryStatus,
    pub filing: FilingCounts,
}

impl SystemStatus {
    /// Capture the current state of `forge`.
    #[must_use]
    pub fn capture(forge: &Orchestrator) -> Self {
        let processors: BTreeMap<String, ProcessorMetrics> = forge
            .processors()
            .iter()
            .map(|(id, p)| {
                let current = p.current_consensus();
                let metrics = ProcessorMetrics {
                    current_consensus: current,
                    consensus_achieved: p.active_count() > 0 && current >= p.consensus_threshold(),
                    active_elements: p.active_count(),
                    threshold: p.consensus_threshold(),
                };
                (id.clone(), metrics)
            })
            .collect();

        let average_consensus = if processors.is_empty() {
            0.0
        } else {
            processors.values().map(|m| m.current_consensus).sum::<f64>()
                / processors.len() as f64
        };
        let processors_in_consensus = processors.values().filter(|m| m.consensus_achieved).count();

        let primitives: BTreeMap<String, usize> = forge
            .primitives()
            .iter()
            .map(|(name, p)| (name.clone(), p.vertex_count))
            .collect();

        Self {
            version: VERSION.to_string(),
            timestamp: now_rfc3339(),
            system_resonance: forge.system_resonance(),
            active_bridges: forge.bridges().len(),
            triadic_processors: forge.processors().len(),
            geometric_primitives: forge.primitives().len(),
            bridge_executions_total: forge.bridges().total_executions(),
            execution_log_length: forge.bridge_execution_log().len(),
            consensus_metrics: ConsensusMetrics {
                processors,
                average_consensus,
                processors_in_consensus,
            },
            geometry_status: GeometryStatus {
                golden_ratio: GOLDEN_RATIO,
                total_vertices: primitives.values().sum(),
                primitives,
            },
            filing: forge.filing().counts(),
        }
    }
}

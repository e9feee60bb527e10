//! # Orchestrator
//!
//! Owns every registry and runs inputs through the three-stage pipeline:
//!
//! ```text
//! input ─► data_reception ─► cognitive_processing ─► bridges ─► output_generation
//!                               │ intent + concepts      │ log       │ response
//!                               ▼                        ▼           ▼
//!                         geometry harmony ──────► system_resonance ─► result
//! ```
//!
//! Stages always run in this order with no early exit. All counters live on
//! the instance and are mutated without locking: callers that share one
//! orchestrator across threads must serialize access themselves.

use crate::bridge::{BridgeExecution, BridgeRegistry, STANDARD_BRIDGE_COUNT};
use crate::config::ForgeConfig;
use crate::filing::FilingSystem;
use crate::geometry::{
    GeometricPrimitive, STANDARD_PRIMITIVE_COUNT, standard_primitives, text_entropy,
    validate_entropy,
};
use crate::intent::{compose_response, extract_concepts, extract_intent};
use crate::response::{EnhancedResult, HyphenatorStatus, ProcessResult, TriadicConsensus};
use crate::system::SystemStatus;
use crate::triadic::{ConsensusResult, Stage, TRIAD_SIZE, TriadicProcessor};
use crate::types::{ForgeError, ForgeResult, RegistryKind, clamp_unit, now_rfc3339};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Instant;

/// Version label reported in status snapshots.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The pipeline and its registries.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: ForgeConfig,
    bridges: BridgeRegistry,
    processors: BTreeMap<String, TriadicProcessor>,
    primitives: BTreeMap<String, GeometricPrimitive>,
    filing: FilingSystem,
    bridge_execution_log: Vec<BridgeExecution>,
    system_resonance: f64,
}

impl Orchestrator {
    /// Create an orchestrator with the default configuration.
    pub fn new() -> ForgeResult<Self> {
        Self::with_config(ForgeConfig::default())
    }

    /// Create an orchestrator with a validated custom configuration.
    pub fn with_config(config: ForgeConfig) -> ForgeResult<Self> {
        config.validate()?;
        let mut forge = Self::assemble(config)?;
        let threshold = forge.config.consensus_threshold;
        for processor in forge.processors.values_mut() {
            *processor = processor.clone().with_threshold(threshold)?;
        }
        forge.check_cardinality()?;
        Ok(forge)
    }

    fn assemble(config: ForgeConfig) -> ForgeResult<Self> {
        let processors = Stage::ALL
            .iter()
            .map(|stage| (stage.as_str().to_string(), stage.processor()))
            .collect();

        Ok(Self {
            config,
            bridges: BridgeRegistry::standard(),
            processors,
            primitives: standard_primitives()?,
            filing: FilingSystem::new(),
            bridge_execution_log: Vec::new(),
            system_resonance: 0.0,
        })
    }

    /// Registries are fixed at construction; verify their sizes once.
    fn check_cardinality(&self) -> ForgeResult<()> {
        if self.bridges.len() != STANDARD_BRIDGE_COUNT {
            return Err(ForgeError::Validation(format!(
                "expected {} bridges, found {}",
                STANDARD_BRIDGE_COUNT,
                self.bridges.len()
            )));
        }
        if self.processors.len() != Stage::ALL.len()
            || self.processors.values().any(|p| p.elements().len() != TRIAD_SIZE)
        {
            return Err(ForgeError::Validation(format!(
                "expected {} triadic processors of {} elements",
                Stage::ALL.len(),
                TRIAD_SIZE
            )));
        }
        if self.primitives.len() != STANDARD_PRIMITIVE_COUNT {
            return Err(ForgeError::Validation(format!(
                "expected {} geometric primitives, found {}",
                STANDARD_PRIMITIVE_COUNT,
                self.primitives.len()
            )));
        }
        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    #[must_use]
    pub fn bridges(&self) -> &BridgeRegistry {
        &self.bridges
    }

    /// Processors keyed by stage name.
    #[must_use]
    pub fn processors(&self) -> &BTreeMap<String, TriadicProcessor> {
        &self.processors
    }

    /// Primitives keyed by shape name.
    #[must_use]
    pub fn primitives(&self) -> &BTreeMap<String, GeometricPrimitive> {
        &self.primitives
    }

    #[must_use]
    pub fn filing(&self) -> &FilingSystem {
        &self.filing
    }

    pub fn filing_mut(&mut self) -> &mut FilingSystem {
        &mut self.filing
    }

    #[must_use]
    pub fn bridge_execution_log(&self) -> &[BridgeExecution] {
        &self.bridge_execution_log
    }

    /// Resonance of the most recent pipeline run, 0 before the first.
    #[must_use]
    pub fn system_resonance(&self) -> f64 {
        self.system_resonance
    }

    // =========================================================================
    // DIRECT INVOCATION
    // =========================================================================

    /// Execute one bridge outside the pipeline. Not written to the log.
    pub fn execute_bridge(&mut self, bridge_id: &str, payload: &Value) -> ForgeResult<BridgeExecution> {
        self.bridges.execute(bridge_id, payload)
    }

    /// Run one processor's consensus outside the pipeline.
    pub fn process_triadic(&mut self, processor_id: &str, input: &str) -> ForgeResult<ConsensusResult> {
        self.processor_mut(processor_id)
            .map(|p| p.process_consensus(input))
    }

    /// Harmony of one primitive. Entropy must lie in `[0, 1]`.
    pub fn calculate_harmony(&self, primitive: &str, entropy: f64) -> ForgeResult<f64> {
        let primitive = self
            .primitives
            .get(primitive)
            .ok_or_else(|| ForgeError::not_found(RegistryKind::Primitive, primitive))?;
        primitive.calculate_harmony(validate_entropy(entropy)?)
    }

    fn processor_mut(&mut self, processor_id: &str) -> ForgeResult<&mut TriadicProcessor> {
        self.processors
            .get_mut(processor_id)
            .ok_or_else(|| ForgeError::not_found(RegistryKind::Processor, processor_id))
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    /// Baseline entry point: response, intent, concepts, resonance, timing.
    pub fn process_input(&mut self, text: &str, context: Option<&Value>) -> ForgeResult<ProcessResult> {
        self.run_pipeline(text, context).map(ProcessResult::from)
    }

    /// Enhanced entry point: the full record of every stage.
    pub fn process_enhanced_input(&mut self, text: &str) -> ForgeResult<EnhancedResult> {
        self.run_pipeline(text, None)
    }

    fn run_pipeline(&mut self, text: &str, context: Option<&Value>) -> ForgeResult<EnhancedResult> {
        let started = Instant::now();

        let chars = text.chars().count();
        if chars > self.config.max_input_chars {
            return Err(ForgeError::Validation(format!(
                "input of {} characters exceeds limit of {}",
                chars, self.config.max_input_chars
            )));
        }

        let mut phases = BTreeMap::new();

        // Stage 1: data reception
        let reception = self.run_stage(Stage::DataReception, text)?;
        phases.insert(Stage::DataReception.as_str().to_string(), reception);

        // Stage 2: cognitive processing
        let intent = extract_intent(text);
        let concepts = extract_concepts(text);
        tracing::debug!(intent = %intent.kind, concepts = concepts.len(), "input classified");
        let cognition = self.run_stage(Stage::CognitiveProcessing, text)?;
        phases.insert(Stage::CognitiveProcessing.as_str().to_string(), cognition);

        let mut payload = json!({
            "input": text,
            "intent": intent.kind,
            "concepts": concepts,
        });
        if let Some(context) = context {
            payload["context"] = context.clone();
        }
        let bridge_executions = self.bridges.execute_all(&payload);
        self.bridge_execution_log
            .extend(bridge_executions.iter().cloned());

        // Stage 3: output generation votes on the composed response
        let response = compose_response(&intent, &concepts);
        let output = self.run_stage(Stage::OutputGeneration, &response)?;
        phases.insert(Stage::OutputGeneration.as_str().to_string(), output);

        let input_entropy = text_entropy(text);
        let sacred_geometry_harmony = self.aggregate_harmony(input_entropy)?;

        let triadic_consensus = TriadicConsensus::from_phases(phases.values());
        let system_resonance = clamp_unit(
            self.config.consensus_weight * triadic_consensus.average_score
                + self.config.harmony_weight * sacred_geometry_harmony,
        );
        self.system_resonance = system_resonance;

        let enhanced_response = format!(
            "{} [resonance {:.3}, {}/{} stages in consensus]",
            response,
            system_resonance,
            triadic_consensus.stages_achieved,
            triadic_consensus.stages_total
        );

        let hyphenator_status = HyphenatorStatus {
            active_bridges: self.bridges.len(),
            executions_this_call: bridge_executions.len(),
            total_executions: self.bridges.total_executions(),
            log_length: self.bridge_execution_log.len(),
        };

        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            intent = %intent.kind,
            resonance = system_resonance,
            harmony = sacred_geometry_harmony,
            elapsed_ms = processing_time_ms,
            "pipeline complete"
        );

        Ok(EnhancedResult {
            response,
            enhanced_response,
            intent,
            concepts,
            system_resonance,
            processing_time_ms,
            phases,
            bridge_executions,
            sacred_geometry_harmony,
            input_entropy,
            hyphenator_status,
            triadic_consensus,
            timestamp: now_rfc3339(),
        })
    }

    fn run_stage(&mut self, stage: Stage, input: &str) -> ForgeResult<ConsensusResult> {
        let result = self.processor_mut(stage.as_str())?.process_consensus(input);
        tracing::debug!(
            stage = %stage,
            score = result.consensus_score,
            achieved = result.consensus_achieved,
            "stage consensus"
        );
        Ok(result)
    }

    /// Mean harmony over all primitives.
    fn aggregate_harmony(&self, entropy: f64) -> ForgeResult<f64> {
        let scores = self
            .primitives
            .values()
            .map(|p| p.calculate_harmony(entropy))
            .collect::<ForgeResult<Vec<f64>>>()?;
        if scores.is_empty() {
            return Err(ForgeError::Internal(
                "no geometric primitives registered".to_string(),
            ));
        }
        Ok(clamp_unit(scores.iter().sum::<f64>() / scores.len() as f64))
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    /// Read-only snapshot of the whole system.
    #[must_use]
    pub fn get_system_status(&self) -> SystemStatus {
        SystemStatus::capture(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::intent::IntentKind;
    use proptest::prelude::*;

    #[test]
    fn initialization_counts() {
        let forge = Orchestrator::new().unwrap();
        assert_eq!(forge.bridges().len(), 5);
        assert_eq!(forge.processors().len(), 3);
        assert_eq!(forge.primitives().len(), 7);
        for processor in forge.processors().values() {
            assert_eq!(processor.elements().len(), 3);
        }
        for stage in Stage::ALL {
            assert!(forge.processors().contains_key(stage.as_str()));
        }
    }

    #[test]
    fn cardinality_checked_on_construction() {
        let forge = Orchestrator::new().unwrap();
        assert!(forge.check_cardinality().is_ok());

        let mut short = forge.clone();
        short.primitives.remove("cube");
        assert!(matches!(
            short.check_cardinality(),
            Err(ForgeError::Validation(_))
        ));

        let mut missing_stage = forge;
        missing_stage.processors.remove(Stage::OutputGeneration.as_str());
        assert!(missing_stage.check_cardinality().is_err());
    }

    #[test]
    fn with_config_applies_threshold() {
        let config = ForgeConfig {
            consensus_threshold: 0.4,
            ..ForgeConfig::default()
        };
        let forge = Orchestrator::with_config(config).unwrap();
        for processor in forge.processors().values() {
            assert_eq!(processor.consensus_threshold(), 0.4);
        }
    }

    #[test]
    fn with_config_rejects_invalid() {
        let config = ForgeConfig {
            harmony_weight: 0.9,
            ..ForgeConfig::default()
        };
        assert!(matches!(
            Orchestrator::with_config(config),
            Err(ForgeError::Config(_))
        ));
    }

    #[test]
    fn process_input_greeting() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_input("Hello!", None).unwrap();
        assert_eq!(result.intent.kind, IntentKind::Greeting);
        assert!(!result.response.is_empty());
    }

    #[test]
    fn process_input_status() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_input("Show me the system status", None).unwrap();
        assert_eq!(result.intent.kind, IntentKind::StatusQuery);
    }

    #[test]
    fn process_input_cognitive_concepts() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge
            .process_input("Tell me about cognitive architecture", None)
            .unwrap();
        assert!(result.concepts.iter().any(|c| c == "cognitive"));
        assert!(result.concepts.iter().any(|c| c == "architecture"));
    }

    #[test]
    fn resonance_and_timing_bounds() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_input("Test input", None).unwrap();
        assert!(result.system_resonance > 0.0);
        assert!(result.system_resonance <= 1.0);
        assert!(result.processing_time_ms > 0.0);
        assert_eq!(forge.system_resonance(), result.system_resonance);
    }

    #[test]
    fn empty_input_still_resonates() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_input("", None).unwrap();
        assert!(result.system_resonance > 0.0);
        assert!(result.system_resonance <= 1.0);
    }

    #[test]
    fn oversized_input_rejected_without_side_effects() {
        let config = ForgeConfig {
            max_input_chars: 4,
            ..ForgeConfig::default()
        };
        let mut forge = Orchestrator::with_config(config).unwrap();
        let result = forge.process_enhanced_input("too long");
        assert!(matches!(result, Err(ForgeError::Validation(_))));
        assert!(forge.bridge_execution_log().is_empty());
        assert_eq!(forge.bridges().total_executions(), 0);
    }

    #[test]
    fn enhanced_input_grows_log_by_bridge_count() {
        let mut forge = Orchestrator::new().unwrap();
        for round in 1..=3 {
            let result = forge.process_enhanced_input("How does triadic processing work?").unwrap();
            assert_eq!(result.bridge_executions.len(), STANDARD_BRIDGE_COUNT);
            assert_eq!(forge.bridge_execution_log().len(), round * STANDARD_BRIDGE_COUNT);
            assert_eq!(result.hyphenator_status.log_length, round * STANDARD_BRIDGE_COUNT);
        }
        for bridge in forge.bridges().iter() {
            assert_eq!(bridge.execution_count(), 3);
        }
    }

    #[test]
    fn enhanced_result_has_all_phases() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge
            .process_enhanced_input("Hello! Tell me about cognitive architecture.")
            .unwrap();
        let keys: Vec<&str> = result.phases.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["cognitive_processing", "data_reception", "output_generation"]
        );
        assert_eq!(result.triadic_consensus.stages_total, 3);
        assert!(result.enhanced_response.starts_with(&result.response));
        assert!(result.sacred_geometry_harmony > 0.0 && result.sacred_geometry_harmony <= 1.0);
        assert!(!result.timestamp.is_empty());
    }

    #[test]
    fn bridges_run_in_declaration_order() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_enhanced_input("order check").unwrap();
        let ran: Vec<&str> = result.bridge_executions.iter().map(|e| e.bridge_id.as_str()).collect();
        let declared: Vec<&str> = forge.bridges().iter().map(|b| b.bridge_id.as_str()).collect();
        assert_eq!(ran, declared);
    }

    #[test]
    fn context_reaches_bridge_payload() {
        let memory_key = |forge: &Orchestrator| {
            forge.bridge_execution_log()[0].result["detail"]["memory_key"].clone()
        };

        let mut plain = Orchestrator::new().unwrap();
        plain.process_input("with context", None).unwrap();

        let mut with_context = Orchestrator::new().unwrap();
        with_context
            .process_input("with context", Some(&json!({"user": "tester"})))
            .unwrap();

        assert_eq!(with_context.bridge_execution_log()[0].bridge_id, "memory-cognitive");
        assert!(memory_key(&with_context).is_string());
        assert_ne!(memory_key(&plain), memory_key(&with_context));
    }

    #[test]
    fn pipeline_is_deterministic_apart_from_timing() {
        let mut a = Orchestrator::new().unwrap();
        let mut b = Orchestrator::new().unwrap();
        let x = a.process_enhanced_input("Explain the memory bridge").unwrap();
        let y = b.process_enhanced_input("Explain the memory bridge").unwrap();
        assert_eq!(x.system_resonance, y.system_resonance);
        assert_eq!(x.phases, y.phases);
        assert_eq!(x.sacred_geometry_harmony, y.sacred_geometry_harmony);
        assert_eq!(x.response, y.response);
    }

    #[test]
    fn direct_bridge_execution() {
        let mut forge = Orchestrator::new().unwrap();
        let record = forge.execute_bridge("memory-cognitive", &json!("Test data")).unwrap();
        assert!(record.success);
        assert_eq!(forge.bridges().get("memory-cognitive").unwrap().execution_count(), 1);
        assert!(forge.bridge_execution_log().is_empty());
    }

    #[test]
    fn direct_calls_report_not_found() {
        let mut forge = Orchestrator::new().unwrap();
        assert!(matches!(
            forge.execute_bridge("nope", &Value::Null),
            Err(ForgeError::NotFound { kind: RegistryKind::Bridge, .. })
        ));
        assert!(matches!(
            forge.process_triadic("nope", "x"),
            Err(ForgeError::NotFound { kind: RegistryKind::Processor, .. })
        ));
        assert!(matches!(
            forge.calculate_harmony("nope", 0.5),
            Err(ForgeError::NotFound { kind: RegistryKind::Primitive, .. })
        ));
    }

    #[test]
    fn direct_harmony_validates_entropy() {
        let forge = Orchestrator::new().unwrap();
        assert!(matches!(
            forge.calculate_harmony("tetrahedron", 1.5),
            Err(ForgeError::Validation(_))
        ));
        let harmony = forge.calculate_harmony("tetrahedron", 0.5).unwrap();
        assert!(harmony > 0.0 && harmony <= 1.0);
    }

    #[test]
    fn direct_triadic_updates_elements() {
        let mut forge = Orchestrator::new().unwrap();
        let result = forge.process_triadic("data_reception", "Test input").unwrap();
        let processor = &forge.processors()["data_reception"];
        assert_eq!(processor.elements()[0].consensus_score(), result.processed_elements[0].score);
    }

    #[test]
    fn status_snapshot_counts() {
        let forge = Orchestrator::new().unwrap();
        let status = forge.get_system_status();
        assert_eq!(status.version, VERSION);
        assert_eq!(status.active_bridges, 5);
        assert_eq!(status.triadic_processors, 3);
        assert_eq!(status.geometric_primitives, 7);
    }

    proptest! {
        #[test]
        fn resonance_always_in_range(text in ".{0,300}") {
            let mut forge = Orchestrator::new().unwrap();
            let result = forge.process_input(&text, None).unwrap();
            prop_assert!(result.system_resonance > 0.0);
            prop_assert!(result.system_resonance <= 1.0);
        }
    }
}

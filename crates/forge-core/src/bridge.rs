//! # Bridge Registry
//!
//! Hyphenator bridges: typed connectors between two logical components.
//!
//! Each bridge applies a deterministic, type-specific transformation to an
//! arbitrary JSON payload and keeps running execution statistics. Bridges
//! live in a [`BridgeRegistry`] that preserves declaration order, which is
//! also the order the orchestrator executes them in.

use crate::types::{ForgeError, ForgeResult, RegistryKind, clamp_unit, now_rfc3339};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Number of bridges in the standard registry.
pub const STANDARD_BRIDGE_COUNT: usize = 5;

// =============================================================================
// BRIDGE TYPE
// =============================================================================

/// The closed set of bridge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BridgeType {
    MemoryBridge,
    CognitiveBridge,
    ValidationBridge,
    ReflectionBridge,
    HarmonizationBridge,
}

impl BridgeType {
    /// Wire name, e.g. `memory-bridge`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryBridge => "memory-bridge",
            Self::CognitiveBridge => "cognitive-bridge",
            Self::ValidationBridge => "validation-bridge",
            Self::ReflectionBridge => "reflection-bridge",
            Self::HarmonizationBridge => "harmonization-bridge",
        }
    }
}

impl std::fmt::Display for BridgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EXECUTION RECORD
// =============================================================================

/// Outcome of one bridge execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeExecution {
    pub bridge_id: String,
    pub bridge_type: BridgeType,
    pub source_component: String,
    pub target_component: String,
    /// Type-specific transformation output.
    pub result: Value,
    pub success: bool,
    /// The bridge's execution count after this call.
    pub execution_count: u64,
    pub timestamp: String,
}

// =============================================================================
// BRIDGE
// =============================================================================

/// A named, typed connector between two components.
#[derive(Debug, Clone, Serialize)]
pub struct Bridge {
    pub bridge_id: String,
    pub bridge_type: BridgeType,
    pub source_component: String,
    pub target_component: String,
    pub bridge_function: String,
    execution_count: u64,
    #[serde(skip)]
    successes: u64,
    success_rate: f64,
    created_at: String,
}

impl Bridge {
    /// Create a bridge with zeroed statistics.
    #[must_use]
    pub fn new(
        bridge_id: impl Into<String>,
        bridge_type: BridgeType,
        source_component: impl Into<String>,
        target_component: impl Into<String>,
        bridge_function: impl Into<String>,
    ) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            bridge_type,
            source_component: source_component.into(),
            target_component: target_component.into(),
            bridge_function: bridge_function.into(),
            execution_count: 0,
            successes: 0,
            success_rate: 1.0,
            created_at: now_rfc3339(),
        }
    }

    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Run the bridge's transformation over `payload`.
    ///
    /// Any payload is accepted, `null` and the empty string included.
    pub fn execute(&mut self, payload: &Value) -> BridgeExecution {
        let result = self.transform(payload);

        self.execution_count = self.execution_count.saturating_add(1);
        self.successes = self.successes.saturating_add(1);
        self.success_rate = clamp_unit(self.successes as f64 / self.execution_count as f64);

        tracing::trace!(
            bridge = %self.bridge_id,
            count = self.execution_count,
            "bridge executed"
        );

        BridgeExecution {
            bridge_id: self.bridge_id.clone(),
            bridge_type: self.bridge_type,
            source_component: self.source_component.clone(),
            target_component: self.target_component.clone(),
            result,
            success: true,
            execution_count: self.execution_count,
            timestamp: now_rfc3339(),
        }
    }

    fn transform(&self, payload: &Value) -> Value {
        let text = payload_text(payload);
        let route = format!("{} -> {}", self.source_component, self.target_component);

        let detail = match self.bridge_type {
            BridgeType::MemoryBridge => json!({
                "stored_chars": text.chars().count(),
                "memory_key": format!("{:016x}", fnv1a64(text.as_bytes())),
            }),
            BridgeType::CognitiveBridge => {
                let words: Vec<&str> = text.split_whitespace().collect();
                // First longest word wins ties.
                let focus = words
                    .iter()
                    .copied()
                    .fold("", |best, w| if w.len() > best.len() { w } else { best });
                json!({ "tokens": words.len(), "focus": focus })
            }
            BridgeType::ValidationBridge => json!({
                "empty": text.trim().is_empty(),
                "chars": text.chars().count(),
                "control_chars": text.chars().filter(|c| c.is_control()).count(),
            }),
            BridgeType::ReflectionBridge => json!({
                "mirror": text.split_whitespace().rev().collect::<Vec<_>>().join(" "),
            }),
            BridgeType::HarmonizationBridge => json!({ "balance": vowel_balance(&text) }),
        };

        json!({
            "operation": self.bridge_function,
            "route": route,
            "detail": detail,
        })
    }
}

/// Render a payload as text: strings verbatim, `null` as empty, other values as JSON.
fn payload_text(payload: &Value) -> String {
    match payload {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Share of alphabetic characters that are vowels, 0 for text without letters.
fn vowel_balance(text: &str) -> f64 {
    let (letters, vowels) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(l, v), c| {
            let is_vowel = matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u');
            (l + 1, v + usize::from(is_vowel))
        });
    if letters == 0 {
        0.0
    } else {
        vowels as f64 / letters as f64
    }
}

/// 64-bit FNV-1a. Stable across platforms and releases.
fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Ordered collection of bridges with unique ids.
#[derive(Debug, Clone)]
pub struct BridgeRegistry {
    bridges: Vec<Bridge>,
}

impl BridgeRegistry {
    /// Build a registry from bridges in declaration order.
    ///
    /// Rejects an empty list and duplicate ids.
    pub fn new(bridges: Vec<Bridge>) -> ForgeResult<Self> {
        if bridges.is_empty() {
            return Err(ForgeError::Validation(
                "bridge registry needs at least one bridge".to_string(),
            ));
        }
        for (i, bridge) in bridges.iter().enumerate() {
            if bridges[..i].iter().any(|b| b.bridge_id == bridge.bridge_id) {
                return Err(ForgeError::Validation(format!(
                    "duplicate bridge id '{}'",
                    bridge.bridge_id
                )));
            }
        }
        Ok(Self { bridges })
    }

    /// The five standard bridges.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bridges: vec![
                Bridge::new(
                    "memory-cognitive",
                    BridgeType::MemoryBridge,
                    "memory_system",
                    "cognitive_core",
                    "recall_context",
                ),
                Bridge::new(
                    "cognitive-output",
                    BridgeType::CognitiveBridge,
                    "cognitive_core",
                    "output_generator",
                    "synthesize_thought",
                ),
                Bridge::new(
                    "input-validation",
                    BridgeType::ValidationBridge,
                    "input_receiver",
                    "validation_layer",
                    "validate_input",
                ),
                Bridge::new(
                    "output-reflection",
                    BridgeType::ReflectionBridge,
                    "output_generator",
                    "reflection_engine",
                    "reflect_output",
                ),
                Bridge::new(
                    "triadic-harmony",
                    BridgeType::HarmonizationBridge,
                    "triadic_core",
                    "geometry_engine",
                    "harmonize_resonance",
                ),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Bridges in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Bridge> {
        self.bridges.iter()
    }

    #[must_use]
    pub fn get(&self, bridge_id: &str) -> Option<&Bridge> {
        self.bridges.iter().find(|b| b.bridge_id == bridge_id)
    }

    /// Execute one bridge by id.
    pub fn execute(&mut self, bridge_id: &str, payload: &Value) -> ForgeResult<BridgeExecution> {
        let bridge = self
            .bridges
            .iter_mut()
            .find(|b| b.bridge_id == bridge_id)
            .ok_or_else(|| ForgeError::not_found(RegistryKind::Bridge, bridge_id))?;
        Ok(bridge.execute(payload))
    }

    /// Execute every bridge once, in declaration order.
    pub fn execute_all(&mut self, payload: &Value) -> Vec<BridgeExecution> {
        self.bridges.iter_mut().map(|b| b.execute(payload)).collect()
    }

    /// Sum of all bridges' execution counts.
    #[must_use]
    pub fn total_executions(&self) -> u64 {
        self.bridges
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.execution_count))
    }
}

impl Default for BridgeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # forge-core
//!
//! The deterministic scoring pipeline for Nexus Forge - THE LOGIC.
//!
//! A short text input is voted on by three triadic processors (data
//! reception, cognitive processing, output generation), routed through five
//! hyphenator bridges, measured against seven geometric primitives, and
//! condensed into a single `system_resonance` figure in `(0, 1]`.
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Identical input yields identical scores; only timing and timestamps vary
//! - Registries are built once and keep a fixed size
//! - One [`Orchestrator`] owns all mutable state; it does no locking
//!
//! ```
//! use forge_core::{IntentKind, Orchestrator};
//!
//! let mut forge = Orchestrator::new()?;
//! let result = forge.process_input("Hello!", None)?;
//! assert_eq!(result.intent.kind, IntentKind::Greeting);
//! assert!(result.system_resonance > 0.0 && result.system_resonance <= 1.0);
//! # Ok::<(), forge_core::ForgeError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod bridge;
pub mod config;
pub mod filing;
pub mod geometry;
pub mod intent;
pub mod orchestrator;
pub mod response;
pub mod system;
pub mod triadic;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use bridge::{Bridge, BridgeExecution, BridgeRegistry, BridgeType, STANDARD_BRIDGE_COUNT};
pub use config::{DEFAULT_CONSENSUS_THRESHOLD, DEFAULT_MAX_INPUT_CHARS, ForgeConfig};
pub use filing::{FilingCounts, FilingSystem, Zone};
pub use geometry::{
    GOLDEN_RATIO, GeometricPrimitive, SACRED_FREQUENCIES, STANDARD_PRIMITIVE_COUNT,
    standard_primitives, text_entropy, validate_entropy,
};
pub use intent::{Intent, IntentKind, compose_response, extract_concepts, extract_intent};
pub use orchestrator::{Orchestrator, VERSION};
pub use response::{EnhancedResult, HyphenatorStatus, ProcessResult, TriadicConsensus};
pub use system::{ConsensusMetrics, GeometryStatus, ProcessorMetrics, SystemStatus};
pub use triadic::{
    ConsensusResult, ProcessedElement, Stage, TRIAD_SIZE, TriadicElement, TriadicProcessor,
};
pub use types::{ForgeError, ForgeResult, RegistryKind};

//! # Triadic Consensus
//!
//! Every pipeline stage is voted on by a processor holding exactly three
//! elements. Each active element scores the input through its own lens; the
//! stage consensus is the mean of the active scores, compared against the
//! processor's threshold.
//!
//! ## Cardinality
//!
//! Elements are stored as `[TriadicElement; 3]`, so a fourth element cannot
//! be represented. [`TriadicProcessor::from_elements`] is the checked entry
//! point for callers holding a `Vec`.

use crate::config::DEFAULT_CONSENSUS_THRESHOLD;
use crate::types::{ForgeError, ForgeResult, clamp_unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Elements per processor.
pub const TRIAD_SIZE: usize = 3;

/// Floor for an active element voting on non-blank input.
const BASE_VOTE: f64 = 0.35;

/// Characters at which structural coverage reaches ~63%.
const COVERAGE_SCALE: f64 = 24.0;

/// Word length the rhythm lens considers ideal.
const IDEAL_WORD_LEN: f64 = 5.0;

// =============================================================================
// ELEMENT
// =============================================================================

/// One vote in a triadic consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriadicElement {
    pub icon: String,
    pub function: String,
    pub description: String,
    consensus_score: f64,
    active: bool,
}

impl TriadicElement {
    /// Create an active element with a zero score.
    #[must_use]
    pub fn new(
        icon: impl Into<String>,
        function: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            icon: icon.into(),
            function: function.into(),
            description: description.into(),
            consensus_score: 0.0,
            active: true,
        }
    }

    /// Score from the most recent consensus this element took part in.
    #[must_use]
    pub fn consensus_score(&self) -> f64 {
        self.consensus_score
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `(icon, function, description)`.
    #[must_use]
    pub fn to_tuple(&self) -> (&str, &str, &str) {
        (&self.icon, &self.function, &self.description)
    }
}

// =============================================================================
// SCORING LENSES
// =============================================================================

/// How an element reads the input, fixed by its position in the triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lens {
    /// How much material there is.
    Structure,
    /// How varied the vocabulary is.
    Semantics,
    /// How close the average word length sits to a natural cadence.
    Rhythm,
}

impl Lens {
    const ORDER: [Self; TRIAD_SIZE] = [Self::Structure, Self::Semantics, Self::Rhythm];

    fn measure(self, input: &str) -> f64 {
        match self {
            Self::Structure => {
                let chars = input.chars().filter(|c| !c.is_whitespace()).count() as f64;
                1.0 - (-chars / COVERAGE_SCALE).exp()
            }
            Self::Semantics => {
                let words: Vec<String> =
                    input.split_whitespace().map(|w| w.to_lowercase()).collect();
                if words.is_empty() {
                    return 0.0;
                }
                let unique: BTreeSet<&str> = words.iter().map(String::as_str).collect();
                unique.len() as f64 / words.len() as f64
            }
            Self::Rhythm => {
                let (count, total) = input
                    .split_whitespace()
                    .fold((0usize, 0usize), |(n, t), w| (n + 1, t + w.chars().count()));
                if count == 0 {
                    return 0.0;
                }
                let mean = total as f64 / count as f64;
                1.0 / (1.0 + (mean - IDEAL_WORD_LEN).abs() / IDEAL_WORD_LEN)
            }
        }
    }

    /// Vote in `[0, 1]`. Blank input earns nothing.
    fn vote(self, input: &str) -> f64 {
        if input.trim().is_empty() {
            return 0.0;
        }
        clamp_unit(BASE_VOTE + (1.0 - BASE_VOTE) * clamp_unit(self.measure(input)))
    }
}

// =============================================================================
// CONSENSUS RECORDS
// =============================================================================

/// Per-element line of a consensus result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedElement {
    pub icon: String,
    pub function: String,
    pub description: String,
    /// Fresh score for active elements; the stored, untouched score otherwise.
    pub score: f64,
    pub active: bool,
}

/// Result of one [`TriadicProcessor::process_consensus`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub processor_id: String,
    pub consensus_score: f64,
    pub consensus_achieved: bool,
    pub consensus_threshold: f64,
    pub processed_elements: Vec<ProcessedElement>,
}

// =============================================================================
// PROCESSOR
// =============================================================================

/// Three elements voting on one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriadicProcessor {
    pub processor_id: String,
    elements: [TriadicElement; TRIAD_SIZE],
    consensus_threshold: f64,
}

impl TriadicProcessor {
    /// Create a processor with the default threshold.
    #[must_use]
    pub fn new(processor_id: impl Into<String>, elements: [TriadicElement; TRIAD_SIZE]) -> Self {
        Self {
            processor_id: processor_id.into(),
            elements,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
        }
    }

    /// Create a processor from a list that must hold exactly three elements.
    pub fn from_elements(
        processor_id: impl Into<String>,
        elements: Vec<TriadicElement>,
    ) -> ForgeResult<Self> {
        let processor_id = processor_id.into();
        let elements: [TriadicElement; TRIAD_SIZE] = elements.try_into().map_err(
            |rejected: Vec<TriadicElement>| {
                ForgeError::Validation(format!(
                    "processor '{}' needs exactly {} elements, got {}",
                    processor_id,
                    TRIAD_SIZE,
                    rejected.len()
                ))
            },
        )?;
        Ok(Self::new(processor_id, elements))
    }

    /// Replace the consensus threshold. Must lie in `[0, 1]`.
    pub fn with_threshold(mut self, threshold: f64) -> ForgeResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ForgeError::Validation(format!(
                "consensus threshold {} outside [0, 1]",
                threshold
            )));
        }
        self.consensus_threshold = threshold;
        Ok(self)
    }

    #[must_use]
    pub fn consensus_threshold(&self) -> f64 {
        self.consensus_threshold
    }

    #[must_use]
    pub fn elements(&self) -> &[TriadicElement] {
        &self.elements
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.elements.iter().filter(|e| e.active).count()
    }

    /// Mean of the active elements' stored scores, 0 when none are active.
    #[must_use]
    pub fn current_consensus(&self) -> f64 {
        mean(self.elements.iter().filter(|e| e.active).map(|e| e.consensus_score))
    }

    /// Enable or disable the element at `index`.
    pub fn set_element_active(&mut self, index: usize, active: bool) -> ForgeResult<()> {
        let element = self.elements.get_mut(index).ok_or_else(|| {
            ForgeError::Validation(format!(
                "element index {} out of range 0..{}",
                index, TRIAD_SIZE
            ))
        })?;
        element.active = active;
        Ok(())
    }

    /// Vote on `input` and record each active element's new score.
    pub fn process_consensus(&mut self, input: &str) -> ConsensusResult {
        let mut processed = Vec::with_capacity(TRIAD_SIZE);
        let mut active_scores = Vec::with_capacity(TRIAD_SIZE);

        for (element, lens) in self.elements.iter_mut().zip(Lens::ORDER) {
            if element.active {
                element.consensus_score = lens.vote(input);
                active_scores.push(element.consensus_score);
            }
            processed.push(ProcessedElement {
                icon: element.icon.clone(),
                function: element.function.clone(),
                description: element.description.clone(),
                score: element.consensus_score,
                active: element.active,
            });
        }

        let consensus_score = mean(active_scores.iter().copied());
        let consensus_achieved =
            !active_scores.is_empty() && consensus_score >= self.consensus_threshold;

        ConsensusResult {
            processor_id: self.processor_id.clone(),
            consensus_score,
            consensus_achieved,
            consensus_threshold: self.consensus_threshold,
            processed_elements: processed,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (count, sum) = values.fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

// =============================================================================
// STAGES
// =============================================================================

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DataReception,
    CognitiveProcessing,
    OutputGeneration,
}

impl Stage {
    pub const ALL: [Self; 3] = [
        Self::DataReception,
        Self::CognitiveProcessing,
        Self::OutputGeneration,
    ];

    /// Processor id for this stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataReception => "data_reception",
            Self::CognitiveProcessing => "cognitive_processing",
            Self::OutputGeneration => "output_generation",
        }
    }

    /// Build this stage's processor with the default threshold.
    #[must_use]
    pub fn processor(&self) -> TriadicProcessor {
        let elements = match self {
            Self::DataReception => [
                TriadicElement::new("📥", "receive()", "Accept the raw input signal"),
                TriadicElement::new("🔍", "parse()", "Structure the incoming text"),
                TriadicElement::new("🧭", "orient()", "Establish input context"),
            ],
            Self::CognitiveProcessing => [
                TriadicElement::new("🧠", "think()", "Cognitive processing"),
                TriadicElement::new("🔗", "associate()", "Link related concepts"),
                TriadicElement::new("⚖️", "evaluate()", "Weigh interpretations"),
            ],
            Self::OutputGeneration => [
                TriadicElement::new("✍️", "compose()", "Assemble the response"),
                TriadicElement::new("🪞", "reflect()", "Review response coherence"),
                TriadicElement::new("📤", "deliver()", "Emit the final output"),
            ],
        };
        TriadicProcessor::new(self.as_str(), elements)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================

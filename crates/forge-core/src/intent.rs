//! # Intent and Concept Extraction
//!
//! Fixed keyword tables, no language understanding.
//!
//! ## Precedence
//!
//! Intent rules are tried top to bottom and the first hit wins:
//! 1. `greeting` (a greeting word anywhere in the input)
//! 2. `status_query` (status/health vocabulary)
//! 3. `information_request` (question words, "tell me", "explain", ...)
//! 4. `general` (fallback)
//!
//! So "Hello! Tell me about X" is a greeting and "What's the system status?"
//! is a status query. Concepts are reported in vocabulary order, once each.

use serde::{Deserialize, Serialize};

// =============================================================================
// INTENT
// =============================================================================

/// The closed set of intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    StatusQuery,
    InformationRequest,
    General,
}

impl IntentKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::StatusQuery => "status_query",
            Self::InformationRequest => "information_request",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    /// 1.0 for a rule hit, 0.5 for the fallback.
    pub confidence: f64,
    /// The keyword or phrase that fired, if any.
    pub trigger: Option<String>,
}

/// How a rule keyword is matched against the input.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// A whole word, after lowercasing and splitting on non-alphanumerics.
    Word(&'static str),
    /// A substring of the lowercased input.
    Phrase(&'static str),
}

impl Pattern {
    fn matches(self, lowered: &str, words: &[&str]) -> bool {
        match self {
            Self::Word(w) => words.contains(&w),
            Self::Phrase(p) => lowered.contains(p),
        }
    }

    fn text(self) -> &'static str {
        match self {
            Self::Word(s) | Self::Phrase(s) => s,
        }
    }
}

const INTENT_RULES: &[(IntentKind, &[Pattern])] = &[
    (
        IntentKind::Greeting,
        &[
            Pattern::Word("hello"),
            Pattern::Word("hi"),
            Pattern::Word("hey"),
            Pattern::Word("greetings"),
            Pattern::Phrase("good morning"),
            Pattern::Phrase("good afternoon"),
            Pattern::Phrase("good evening"),
        ],
    ),
    (
        IntentKind::StatusQuery,
        &[
            Pattern::Word("status"),
            Pattern::Word("health"),
            Pattern::Word("diagnostics"),
            Pattern::Phrase("how are you"),
        ],
    ),
    (
        IntentKind::InformationRequest,
        &[
            Pattern::Phrase("tell me"),
            Pattern::Word("what"),
            Pattern::Word("how"),
            Pattern::Word("why"),
            Pattern::Word("explain"),
            Pattern::Word("describe"),
            Pattern::Word("who"),
            Pattern::Word("where"),
            Pattern::Word("when"),
        ],
    ),
];

fn lowered_words(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Classify `text` against the intent table.
#[must_use]
pub fn extract_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    let words = lowered_words(&lowered);

    for (kind, patterns) in INTENT_RULES {
        if let Some(hit) = patterns.iter().find(|p| p.matches(&lowered, &words)) {
            return Intent {
                kind: *kind,
                confidence: 1.0,
                trigger: Some(hit.text().to_string()),
            };
        }
    }

    Intent {
        kind: IntentKind::General,
        confidence: 0.5,
        trigger: None,
    }
}

// =============================================================================
// CONCEPTS
// =============================================================================

/// Concept name and the substrings that signal it.
const CONCEPT_VOCABULARY: &[(&str, &[&str])] = &[
    ("cognitive", &["cognitive", "cognition"]),
    ("architecture", &["architecture"]),
    ("memory", &["memory", "memories", "remember"]),
    ("triadic", &["triadic", "triad"]),
    ("bridge", &["bridge", "hyphenator"]),
    ("geometry", &["geometry", "geometric"]),
    ("resonance", &["resonance", "resonate"]),
    ("consensus", &["consensus"]),
    ("harmony", &["harmony", "harmonic"]),
];

/// Concepts mentioned in `text`, in vocabulary order.
#[must_use]
pub fn extract_concepts(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    CONCEPT_VOCABULARY
        .iter()
        .filter(|(_, cues)| cues.iter().any(|cue| lowered.contains(cue)))
        .map(|(name, _)| (*name).to_string())
        .collect()
}

// =============================================================================
// RESPONSE TEXT
// =============================================================================

/// Assemble the natural-language response for an intent and its concepts.
#[must_use]
pub fn compose_response(intent: &Intent, concepts: &[String]) -> String {
    let opening = match intent.kind {
        IntentKind::Greeting => "Hello! The forge is online and listening.",
        IntentKind::StatusQuery => "All systems are operational and resonating.",
        IntentKind::InformationRequest => "Here is what the forge can share.",
        IntentKind::General => "Input received and processed through all three stages.",
    };

    if concepts.is_empty() {
        return opening.to_string();
    }

    format!("{} Concepts engaged: {}.", opening, concepts.join(", "))
}

// =============================================================================
// TESTS
// =============================================================================

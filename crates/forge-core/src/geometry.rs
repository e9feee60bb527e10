//! # Sacred Geometry
//!
//! Geometric primitives and their harmony function.
//!
//! A primitive's harmony for an entropy `e` in `[0, 1]` is
//!
//! ```text
//! complexity = v / (v + φ)
//! proximity  = 1 - |e - optimum|
//! harmony    = complexity · (1 + proximity) / 2
//! ```
//!
//! where `v` is the vertex count and `optimum = frac(v / φ)`. The result is
//! strictly positive, never exceeds 1, grows with `v`, and peaks when the
//! entropy sits on the primitive's optimum.

use crate::types::{ForgeError, ForgeResult, clamp_unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The golden ratio, shared by every primitive.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749;

/// Solfeggio frequencies in Hz, shared by every primitive.
pub const SACRED_FREQUENCIES: [f64; 9] = [
    174.0, 285.0, 396.0, 417.0, 528.0, 639.0, 741.0, 852.0, 963.0,
];

/// Number of primitives in the standard set.
pub const STANDARD_PRIMITIVE_COUNT: usize = 7;

/// Reject entropy outside `[0, 1]` (NaN included).
pub fn validate_entropy(entropy: f64) -> ForgeResult<f64> {
    if (0.0..=1.0).contains(&entropy) {
        Ok(entropy)
    } else {
        Err(ForgeError::Validation(
            "Entropy must be between 0 and 1".to_string(),
        ))
    }
}

/// A named shape with a vertex count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricPrimitive {
    pub primitive_type: String,
    pub vertex_count: usize,
    pub resonance_pattern: Vec<f64>,
    pub golden_ratio: f64,
    pub sacred_frequencies: Vec<f64>,
}

impl GeometricPrimitive {
    /// Create a primitive. The vertex count must be positive.
    pub fn new(primitive_type: impl Into<String>, vertex_count: usize) -> ForgeResult<Self> {
        let primitive_type = primitive_type.into();
        if vertex_count == 0 {
            return Err(ForgeError::Validation(format!(
                "primitive '{}' needs at least one vertex",
                primitive_type
            )));
        }
        Ok(Self {
            primitive_type,
            vertex_count,
            resonance_pattern: resonance_pattern(vertex_count),
            golden_ratio: GOLDEN_RATIO,
            sacred_frequencies: SACRED_FREQUENCIES.to_vec(),
        })
    }

    /// Entropy at which this primitive is most harmonious.
    #[must_use]
    pub fn optimal_entropy(&self) -> f64 {
        (self.vertex_count as f64 / self.golden_ratio).fract()
    }

    /// Harmony in `[0, 1]` for an entropy in `[0, 1]`.
    pub fn calculate_harmony(&self, entropy: f64) -> ForgeResult<f64> {
        let entropy = validate_entropy(entropy)?;
        let v = self.vertex_count as f64;
        let complexity = v / (v + self.golden_ratio);
        let proximity = 1.0 - (entropy - self.optimal_entropy()).abs();
        Ok(clamp_unit(complexity * (1.0 + proximity) / 2.0))
    }
}

/// Golden-angle walk around the unit circle: `frac((i + 1) · φ)` per vertex.
fn resonance_pattern(vertex_count: usize) -> Vec<f64> {
    (1..=vertex_count)
        .map(|i| (i as f64 * GOLDEN_RATIO).fract())
        .collect()
}

/// The seven standard primitives keyed by name.
pub fn standard_primitives() -> ForgeResult<BTreeMap<String, GeometricPrimitive>> {
    const SHAPES: [(&str, usize); STANDARD_PRIMITIVE_COUNT] = [
        ("tetrahedron", 4),
        ("octahedron", 6),
        ("cube", 8),
        ("merkaba", 8),
        ("icosahedron", 12),
        ("flower_of_life", 19),
        ("dodecahedron", 20),
    ];

    SHAPES
        .iter()
        .map(|(name, vertices)| {
            GeometricPrimitive::new(*name, *vertices).map(|p| ((*name).to_string(), p))
        })
        .collect()
}

/// Normalized Shannon entropy of the character distribution of `text`.
///
/// Divides by `log2(len)`, so strings of one repeated character score 0 and
/// strings of all-distinct characters score 1. Strings shorter than two
/// characters score 0.
#[must_use]
pub fn text_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut len = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_default() += 1;
        len += 1;
    }
    if len < 2 {
        return 0.0;
    }
    let n = len as f64;
    let h: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    clamp_unit(h / n.log2())
}

// =============================================================================
// TESTS
// =============================================================================

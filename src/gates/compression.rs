// =============================================================================
// Compression Gate — a definition must compress meaning
// =============================================================================
//
// Hard failures:
//   - more than 280 characters           -> too bloated
//   - under 30 characters or < 5 words   -> too brief
//   - content-token density under 0.4    -> low density
//
// Otherwise:
//   score = 0.5 * density + 0.3 * min(1, chars / 200) + 0.2 * min(1, words / 30)
// and the gate passes iff score >= 0.5.
// =============================================================================

use crate::gates::{GateKind, GateResult, QualityGate};
use crate::signals::SlangSignal;

pub const MAX_DEFINITION_CHARS: usize = 280;
pub const MIN_DEFINITION_CHARS: usize = 30;
pub const MIN_DEFINITION_WORDS: usize = 5;
const MIN_DENSITY: f64 = 0.4;
const PASS_SCORE: f64 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "about", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "being",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "like", "me",
    "more", "most", "my", "no", "not", "of", "on", "or", "our", "out", "really", "she", "should",
    "so", "some", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "to", "too", "up", "very", "was", "we", "were", "what", "when", "which",
    "who", "will", "with", "would", "you", "your",
];

/// Lowercased word tokens with surrounding punctuation stripped.
fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Share of tokens that are not stopwords.
pub fn density_ratio(text: &str) -> f64 {
    let toks = tokens(text);
    if toks.is_empty() {
        return 0.0;
    }
    let content = toks
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .count();
    content as f64 / toks.len() as f64
}

/// Weighted compression score for a definition.
pub fn compression_score(text: &str) -> f64 {
    let chars = text.chars().count() as f64;
    let words = text.split_whitespace().count() as f64;
    0.5 * density_ratio(text) + 0.3 * (chars / 200.0).min(1.0) + 0.2 * (words / 30.0).min(1.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionGate;

impl CompressionGate {
    /// Check a bare definition.
    pub fn check_definition(definition: &str) -> GateResult {
        let chars = definition.chars().count();
        let words = definition.split_whitespace().count();
        let density = density_ratio(definition);
        let score = compression_score(definition);

        if chars > MAX_DEFINITION_CHARS {
            return GateResult::fail(
                GateKind::Compression,
                score,
                format!(
                    "insufficient compression: definition too bloated ({} chars > {})",
                    chars, MAX_DEFINITION_CHARS
                ),
            );
        }

        if chars < MIN_DEFINITION_CHARS || words < MIN_DEFINITION_WORDS {
            return GateResult::fail(
                GateKind::Compression,
                score,
                format!(
                    "insufficient compression: definition too brief ({} chars, {} words; need {}+ chars and {}+ words)",
                    chars, words, MIN_DEFINITION_CHARS, MIN_DEFINITION_WORDS
                ),
            );
        }

        if density < MIN_DENSITY {
            return GateResult::fail(
                GateKind::Compression,
                score,
                format!(
                    "insufficient compression: low density ({:.2} < {:.2} content tokens)",
                    density, MIN_DENSITY
                ),
            );
        }

        if score >= PASS_SCORE {
            GateResult::pass(
                GateKind::Compression,
                score,
                format!("compression ok (score {:.3})", score),
            )
        } else {
            GateResult::fail(
                GateKind::Compression,
                score,
                format!(
                    "insufficient compression: score {:.3} < {:.2}",
                    score, PASS_SCORE
                ),
            )
        }
    }
}

impl QualityGate for CompressionGate {
    fn kind(&self) -> GateKind {
        GateKind::Compression
    }

    fn evaluate(&self, signal: &SlangSignal) -> GateResult {
        Self::check_definition(&signal.definition)
    }
}

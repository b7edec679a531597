// =============================================================================
// Signal Processor — novelty, strength and confidence
// =============================================================================
//
//   novelty    = 1 - mean hash-similarity to the corpus, clamped [0.1, 0.95]
//   strength   = frequency x |pressure| x novelty / sqrt(5), clamped [0, 1]
//   confidence = 0.3 prior + observations + strength + age + cross-domain
//
// Similarity is a Hamming-distance proxy over seeded SHA-256 digests.  It is
// a reproducible stand-in, not a semantic measure.
// =============================================================================

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::signals::model::{clamp_unit, SlangSignal};
use crate::signals::pressure::{seeded_digest, PressureModel, MAX_MAGNITUDE};

/// Novelty reported when there is nothing to compare against.
pub const FIRST_SEEN_NOVELTY: f64 = 0.95;
/// Lower bound on reported novelty.
pub const MIN_NOVELTY: f64 = 0.1;

/// Prior confidence before any evidence is counted.
pub const CONFIDENCE_PRIOR: f64 = 0.3;
const OBSERVATION_CAP: f64 = 100.0;
const AGE_CAP_DAYS: f64 = 90.0;

pub struct SignalProcessor;

impl SignalProcessor {
    /// Hash similarity of two terms under `seed`, in [0, 1].
    pub fn similarity(a: &str, b: &str, seed: &str) -> f64 {
        let da = seeded_digest(a, seed);
        let db = seeded_digest(b, seed);
        let distance: u32 = da
            .iter()
            .zip(db.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        1.0 - distance as f64 / 256.0
    }

    /// Novelty of `term` relative to `corpus`.
    pub fn novelty(term: &str, seed: &str, corpus: &[SlangSignal]) -> f64 {
        if corpus.is_empty() {
            return FIRST_SEEN_NOVELTY;
        }

        let total: f64 = corpus
            .iter()
            .map(|other| Self::similarity(term, &other.term, seed))
            .sum();
        let avg_similarity = total / corpus.len() as f64;

        (1.0 - avg_similarity).clamp(MIN_NOVELTY, FIRST_SEEN_NOVELTY)
    }

    /// Normalised strength of a signal.
    pub fn signal_strength(signal: &SlangSignal) -> f64 {
        let magnitude = PressureModel::magnitude(&signal.pressure_vector);
        let novelty = signal.novelty.unwrap_or(FIRST_SEEN_NOVELTY);
        let raw = signal.frequency_index * magnitude * novelty;
        clamp_unit(raw / MAX_MAGNITUDE)
    }

    /// Bayesian-style confidence blend.
    pub fn confidence(
        signal: &SlangSignal,
        observation_count: u32,
        cross_domain_count: u32,
        now: DateTime<Utc>,
    ) -> f64 {
        let observation_bonus = 0.3 * (observation_count as f64 / OBSERVATION_CAP).min(1.0);
        let strength_bonus = 0.2 * signal.signal_strength;
        let age_bonus = 0.1 * (signal.age_days(now) / AGE_CAP_DAYS).min(1.0);
        let extra_domains = cross_domain_count.saturating_sub(1) as f64;
        let cross_domain_bonus = (0.05 * extra_domains).min(0.1);

        clamp_unit(
            CONFIDENCE_PRIOR + observation_bonus + strength_bonus + age_bonus + cross_domain_bonus,
        )
    }

    /// Recompute novelty and strength against `existing`, stamping
    /// `last_updated`.  Confidence is left untouched.
    pub fn enrich(
        signal: &SlangSignal,
        seed: &str,
        existing: &[SlangSignal],
        now: DateTime<Utc>,
    ) -> SlangSignal {
        let corpus: Vec<SlangSignal> = existing
            .iter()
            .filter(|other| !other.same_identity(&signal.term, signal.id.as_deref()))
            .cloned()
            .collect();

        let mut enriched = signal.clone();
        enriched.novelty = Some(Self::novelty(&signal.term, seed, &corpus));
        enriched.signal_strength = Self::signal_strength(&enriched);
        enriched.base_strength = None;
        enriched.last_updated = now;

        trace!(
            term = %enriched.term,
            novelty = enriched.novelty,
            strength = enriched.signal_strength,
            "signal enriched"
        );

        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::model::PressureVector;
    use crate::types::SignalClass;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn signal(term: &str, freq: f64, pv: PressureVector) -> SlangSignal {
        SlangSignal::new(term, SignalClass::CognitiveDrift, "def", pv, freq, t0())
    }

    #[test]
    fn empty_corpus_is_maximally_novel() {
        assert!((SignalProcessor::novelty("anything", "s", &[]) - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn identical_terms_are_fully_similar() {
        assert!((SignalProcessor::similarity("rizz", "rizz", "s") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_corpus_floors_novelty() {
        let corpus = vec![signal("rizz", 0.5, PressureVector::default())];
        let n = SignalProcessor::novelty("rizz", "s", &corpus);
        assert!((n - MIN_NOVELTY).abs() < f64::EPSILON);
    }

    #[test]
    fn novelty_stays_clamped_for_many_terms() {
        let corpus: Vec<_> = (0..20)
            .map(|i| signal(&format!("w{i}"), 0.5, PressureVector::default()))
            .collect();
        for i in 0..50 {
            let n = SignalProcessor::novelty(&format!("probe{i}"), "seed", &corpus);
            assert!((MIN_NOVELTY..=FIRST_SEEN_NOVELTY).contains(&n));
        }
    }

    #[test]
    fn strength_is_normalised_by_max_magnitude() {
        let mut s = signal("max", 1.0, PressureVector::new(1.0, 1.0, 1.0, 1.0, 1.0));
        s.novelty = Some(0.95);
        assert!((SignalProcessor::signal_strength(&s) - 0.95).abs() < 1e-9);

        s.novelty = Some(0.5);
        s.frequency_index = 0.5;
        assert!((SignalProcessor::signal_strength(&s) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn strength_bounded_under_extreme_inputs() {
        for freq in [0.0, 0.5, 1.0] {
            for p in [0.0, 0.3, 1.0] {
                let mut s = signal("x", freq, PressureVector::new(p, p, p, p, p));
                s.novelty = Some(1.0);
                let v = SignalProcessor::signal_strength(&s);
                assert!((0.0..=1.0).contains(&v), "strength {v} out of range");
            }
        }
        // Out-of-range fields written directly still produce a bounded result.
        let mut rogue = signal("rogue", 1.0, PressureVector::default());
        rogue.frequency_index = 40.0;
        rogue.pressure_vector = PressureVector {
            cognitive: 9.0,
            ..PressureVector::default()
        };
        rogue.novelty = Some(1.0);
        assert!((SignalProcessor::signal_strength(&rogue) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn confidence_prior_with_no_evidence() {
        let s = signal("new", 0.5, PressureVector::default());
        let c = SignalProcessor::confidence(&s, 0, 0, t0());
        assert!((c - CONFIDENCE_PRIOR).abs() < 1e-12);
    }

    #[test]
    fn confidence_components_cap() {
        let mut s = signal("old", 0.5, PressureVector::default());
        s.signal_strength = 1.0;
        let later = t0() + Duration::days(400);
        let c = SignalProcessor::confidence(&s, 10_000, 50, later);
        // 0.3 + 0.3 + 0.2 + 0.1 + 0.1
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn confidence_partial_bonuses() {
        let mut s = signal("mid", 0.5, PressureVector::default());
        s.signal_strength = 0.5;
        let later = t0() + Duration::days(45);
        let c = SignalProcessor::confidence(&s, 50, 2, later);
        // 0.3 + 0.15 + 0.1 + 0.05 + 0.05
        assert!((c - 0.65).abs() < 1e-9);
    }

    #[test]
    fn enrich_excludes_self_from_corpus() {
        let s = signal("solo", 0.8, PressureVector::new(0.5, 0.5, 0.5, 0.5, 0.5));
        let enriched = SignalProcessor::enrich(&s, "seed", &[s.clone()], t0());
        assert_eq!(enriched.novelty, Some(FIRST_SEEN_NOVELTY));
        assert!(enriched.signal_strength > 0.0);
    }

    #[test]
    fn enrich_is_idempotent_for_same_corpus() {
        let corpus = vec![
            signal("a", 0.5, PressureVector::default()),
            signal("b", 0.5, PressureVector::default()),
        ];
        let s = signal("c", 0.6, PressureVector::new(0.2, 0.4, 0.6, 0.8, 1.0));
        let later = t0() + Duration::hours(1);
        let once = SignalProcessor::enrich(&s, "seed", &corpus, later);
        let twice = SignalProcessor::enrich(&once, "seed", &corpus, later);
        assert_eq!(once, twice);
        assert_eq!(once.confidence, s.confidence);
        assert_eq!(once.last_updated, later);
    }
}

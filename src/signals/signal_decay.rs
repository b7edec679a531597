// =============================================================================
// Decay Engine — half-life ageing, archival and resurrection
// =============================================================================
//
// Strength decays exponentially from first sighting:
//
//   s(t) = s0 * exp(-ln(2) * age_days / halflife_days)
//
// A signal is archived only when it is at least two half-lives old AND its
// decayed strength is under its class threshold.  Archived signals come back
// when re-observed pressure beats the archived magnitude by the configured
// percentage (60% by default).
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::signals::model::{clamp_unit, ArchivedSignal, SlangSignal};
use crate::signals::pressure::PressureModel;

/// Half-lives a signal must survive before it can be archived.
const ARCHIVE_MIN_HALFLIVES: f64 = 2.0;
/// Halflife multiplier gained per extra domain.
const CROSS_DOMAIN_STEP: f64 = 0.2;
const BEHAVIORAL_BOOST: f64 = 1.3;
const STABILITY_BOOST: f64 = 1.2;
const STABILITY_FLOOR: f64 = 0.7;
/// Tolerance for the resurrection percentage comparison.
const PCT_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Types
// =============================================================================

/// Corroboration evidence that extends a signal's life.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalFactors {
    /// Number of distinct domains the signal has appeared in.
    #[serde(default)]
    pub cross_domain_appearances: u32,
    /// Behaviour (not just talk) corroborates the signal.
    #[serde(default)]
    pub behavioral_corroboration: bool,
    /// Stability of the signal's meaning in [0, 1].
    #[serde(default)]
    pub semantic_stability: f64,
}

/// Audit record emitted when an archived signal is revived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResurrectionEvent {
    pub original_term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    pub archived_at: DateTime<Utc>,
    pub resurrected_at: DateTime<Utc>,
    pub pressure_increase_pct: f64,
    pub new_strength: f64,
    pub lineage: String,
}

/// Aggregate figures from one decay pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayStats {
    pub processed: usize,
    /// Mean of (strength before - strength after) across processed signals.
    pub average_decay: f64,
    pub archived_count: usize,
}

/// Result of `process_decay_batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayBatch {
    /// Signals that stay active, carrying their decayed strength.
    pub updated: Vec<SlangSignal>,
    pub to_archive: Vec<ArchivedSignal>,
    pub stats: DecayStats,
}

// =============================================================================
// DecayEngine
// =============================================================================

/// Exponential decay, archival and resurrection rules.
#[derive(Debug, Clone)]
pub struct DecayEngine {
    resurrection_threshold_pct: f64,
}

impl DecayEngine {
    /// Create a decay engine that resurrects at `resurrection_threshold_pct`
    /// percent pressure increase.
    pub fn new(resurrection_threshold_pct: f64) -> Self {
        Self {
            resurrection_threshold_pct,
        }
    }

    /// Positive half-life for a signal, falling back to its class default.
    fn halflife(signal: &SlangSignal) -> f64 {
        if signal.decay_halflife_days > 0.0 {
            signal.decay_halflife_days
        } else {
            signal.class.profile().halflife_days
        }
    }

    /// Strength before any decay was applied.
    pub fn base_strength(signal: &SlangSignal) -> f64 {
        signal.base_strength.unwrap_or(signal.signal_strength)
    }

    /// Strength of `signal` at `now` under pure exponential decay from its
    /// base strength.
    pub fn decayed_strength(&self, signal: &SlangSignal, now: DateTime<Utc>) -> f64 {
        let lambda = 2.0_f64.ln() / Self::halflife(signal);
        let decay_factor = (-lambda * signal.age_days(now)).exp();
        (Self::base_strength(signal) * decay_factor).max(0.0)
    }

    /// Old enough AND weak enough.
    pub fn should_archive(&self, signal: &SlangSignal, now: DateTime<Utc>) -> bool {
        let old_enough = signal.age_days(now) >= ARCHIVE_MIN_HALFLIVES * Self::halflife(signal);
        if !old_enough {
            return false;
        }
        self.decayed_strength(signal, now) < signal.class.profile().archive_threshold
    }

    /// Multiplicative halflife boost from corroboration evidence.
    pub fn survival_boost(&self, signal: &SlangSignal, factors: &SurvivalFactors) -> f64 {
        let mut boost = 1.0;

        if factors.cross_domain_appearances > 1 {
            let extra = (factors.cross_domain_appearances - 1) as f64;
            let cap = signal.class.profile().max_cross_domain_multiplier;
            boost *= (1.0 + CROSS_DOMAIN_STEP * extra).min(cap);
        }
        if factors.behavioral_corroboration {
            boost *= BEHAVIORAL_BOOST;
        }
        if factors.semantic_stability > STABILITY_FLOOR {
            boost *= STABILITY_BOOST;
        }

        boost
    }

    /// Extend the signal's half-life by its survival boost.
    pub fn apply_survival_boost(
        &self,
        signal: &SlangSignal,
        factors: &SurvivalFactors,
        now: DateTime<Utc>,
    ) -> SlangSignal {
        let boost = self.survival_boost(signal, factors);
        let mut boosted = signal.clone();
        boosted.decay_halflife_days = Self::halflife(signal) * boost;
        boosted.last_updated = now;

        debug!(
            term = %boosted.term,
            boost,
            halflife_days = boosted.decay_halflife_days,
            "survival boost applied"
        );

        boosted
    }

    /// Percentage increase of `new_magnitude` over the archived magnitude.
    pub fn pressure_increase_pct(&self, archived: &ArchivedSignal, new_magnitude: f64) -> f64 {
        let original = PressureModel::magnitude(&archived.signal.pressure_vector);
        if original <= f64::EPSILON {
            return if new_magnitude > 0.0 { f64::INFINITY } else { 0.0 };
        }
        (new_magnitude - original) / original * 100.0
    }

    /// Whether renewed pressure clears the resurrection bar.
    pub fn should_resurrect(&self, archived: &ArchivedSignal, new_magnitude: f64) -> bool {
        self.pressure_increase_pct(archived, new_magnitude) + PCT_TOLERANCE
            >= self.resurrection_threshold_pct
    }

    /// Bring an archived signal back with a fresh first-seen time and lineage.
    pub fn resurrect(
        &self,
        archived: &ArchivedSignal,
        new_strength: f64,
        pressure_increase_pct: f64,
        now: DateTime<Utc>,
    ) -> (SlangSignal, ResurrectionEvent) {
        let lineage = format!(
            "resurrected:{}:{}",
            archived.signal.term,
            archived.archive_timestamp.to_rfc3339()
        );

        let mut revived = archived.signal.clone();
        revived.archived = false;
        revived.signal_strength = clamp_unit(new_strength);
        revived.base_strength = None;
        revived.timestamp_first_seen = now;
        revived.last_updated = now;
        revived.lineage = Some(lineage.clone());

        let event = ResurrectionEvent {
            original_term: archived.signal.term.clone(),
            original_id: archived.signal.id.clone(),
            archived_at: archived.archive_timestamp,
            resurrected_at: now,
            pressure_increase_pct,
            new_strength: revived.signal_strength,
            lineage,
        };

        info!(
            term = %event.original_term,
            pressure_increase_pct,
            new_strength = event.new_strength,
            "signal resurrected"
        );

        (revived, event)
    }

    /// Decay every signal and split the set into survivors and archivals.
    pub fn process_decay_batch(&self, signals: &[SlangSignal], now: DateTime<Utc>) -> DecayBatch {
        let mut batch = DecayBatch::default();
        let mut total_decay = 0.0;

        for signal in signals {
            let decayed = self.decayed_strength(signal, now);
            total_decay += signal.signal_strength - decayed;

            let archive = self.should_archive(signal, now);

            let mut next = signal.clone();
            next.base_strength = Some(Self::base_strength(signal));
            next.signal_strength = clamp_unit(decayed);
            next.last_updated = now;

            if archive {
                let threshold = signal.class.profile().archive_threshold;
                let reason = format!(
                    "decayed strength {:.3} below {} threshold {:.2} after {:.1} days",
                    decayed,
                    signal.class,
                    threshold,
                    signal.age_days(now)
                );
                debug!(term = %signal.term, %reason, "archiving signal");
                next.archived = true;
                batch.to_archive.push(ArchivedSignal {
                    signal: next,
                    archive_timestamp: now,
                    archive_reason: reason,
                });
            } else {
                batch.updated.push(next);
            }
        }

        batch.stats = DecayStats {
            processed: signals.len(),
            average_decay: if signals.is_empty() {
                0.0
            } else {
                total_decay / signals.len() as f64
            },
            archived_count: batch.to_archive.len(),
        };

        batch
    }
}

impl Default for DecayEngine {
    fn default() -> Self {
        Self::new(60.0)
    }
}

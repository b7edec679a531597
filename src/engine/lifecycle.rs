// =============================================================================
// Lifecycle extras — resurrection and survival boosts outside the mode cycle
// =============================================================================
//
// Both operations follow the mode contract: take state by reference, return a
// new state, never read a clock.
//
//   revive                 re-observed pressure on archived signals; matches
//                          that clear the resurrection bar move back to the
//                          active set with lineage, and the event is logged
//   apply_survival_boosts  stretch half-lives of active signals that show
//                          cross-domain, behavioural or semantic corroboration
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::modes::SlangEngine;
use crate::engine::state::EngineState;
use crate::signals::model::clamp_unit;
use crate::signals::{
    ArchivedSignal, PressureModel, PressureVector, ResurrectionEvent, SignalProcessor,
    SurvivalFactors,
};

/// Fresh pressure reading for a (possibly archived) term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureObservation {
    pub term: String,
    #[serde(default)]
    pub id: Option<String>,
    pub pressure_vector: PressureVector,
    /// Replaces the archived frequency when present.
    #[serde(default)]
    pub frequency_index: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevivalOutcome {
    pub events: Vec<ResurrectionEvent>,
    /// Observations that matched no archived signal.
    pub unmatched: Vec<String>,
    /// Matches whose pressure increase fell short of the threshold.
    pub below_threshold: Vec<String>,
}

/// Corroboration evidence for one active signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalObservation {
    pub term: String,
    #[serde(default)]
    pub id: Option<String>,
    pub factors: SurvivalFactors,
}

impl SlangEngine {
    /// Resurrect archived signals whose pressure has climbed far enough.
    ///
    /// An observation without an id matches the first archived signal with
    /// the same term.  An archived signal already active again is skipped.
    pub fn revive(
        &self,
        state: &EngineState,
        observations: &[PressureObservation],
        seed: &str,
        now: DateTime<Utc>,
    ) -> (EngineState, RevivalOutcome) {
        let mut next = state.clone();
        let mut outcome = RevivalOutcome::default();

        for obs in observations {
            let term = obs.term.trim().to_lowercase();
            let position = next.archived_signals.iter().position(|a| {
                a.signal.term == term
                    && (obs.id.is_none() || a.signal.id.as_deref() == obs.id.as_deref())
            });

            let Some(position) = position else {
                debug!(%term, "no archived signal for observation");
                outcome.unmatched.push(term);
                continue;
            };

            let archived = &next.archived_signals[position];
            if next.is_active(&archived.signal.term, archived.signal.id.as_deref()) {
                debug!(%term, "archived signal already active");
                outcome.unmatched.push(term);
                continue;
            }

            let pressure = obs.pressure_vector.clamped();
            let magnitude = PressureModel::magnitude(&pressure);
            if !self.decay().should_resurrect(archived, magnitude) {
                debug!(
                    %term,
                    pct = self.decay().pressure_increase_pct(archived, magnitude),
                    "pressure increase below resurrection threshold"
                );
                outcome.below_threshold.push(term);
                continue;
            }
            let pct = self.decay().pressure_increase_pct(archived, magnitude);

            let archived = next.archived_signals.remove(position);
            let mut refreshed = archived.signal;
            refreshed.pressure_vector = pressure;
            if let Some(freq) = obs.frequency_index {
                refreshed.frequency_index = clamp_unit(freq);
            }
            let refreshed = SignalProcessor::enrich(&refreshed, seed, &next.active_signals, now);

            let (revived, event) = self.decay().resurrect(
                &ArchivedSignal {
                    signal: refreshed.clone(),
                    archive_timestamp: archived.archive_timestamp,
                    archive_reason: archived.archive_reason,
                },
                refreshed.signal_strength,
                pct,
                now,
            );

            next.active_signals.push(revived);
            next.resurrection_log.push(event.clone());
            outcome.events.push(event);
        }

        info!(
            observations = observations.len(),
            resurrected = outcome.events.len(),
            below_threshold = outcome.below_threshold.len(),
            unmatched = outcome.unmatched.len(),
            "revival pass complete"
        );

        (next, outcome)
    }

    /// Extend half-lives of the matched active signals.  Returns the new state
    /// and the number of signals boosted.
    pub fn apply_survival_boosts(
        &self,
        state: &EngineState,
        boosts: &[SurvivalObservation],
        now: DateTime<Utc>,
    ) -> (EngineState, usize) {
        let mut next = state.clone();
        let mut boosted = 0;

        for obs in boosts {
            let term = obs.term.trim().to_lowercase();
            let target = next.active_signals.iter_mut().find(|s| {
                s.term == term && (obs.id.is_none() || s.id.as_deref() == obs.id.as_deref())
            });
            if let Some(signal) = target {
                *signal = self.decay().apply_survival_boost(signal, &obs.factors, now);
                boosted += 1;
            }
        }

        info!(requested = boosts.len(), boosted, "survival boosts applied");
        (next, boosted)
    }
}

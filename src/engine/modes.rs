// =============================================================================
// Engine Orchestrator — the five mode transitions
// =============================================================================
//
// Intended cycle: OPEN -> ALIGN -> ASCEND -> CLEAR -> SEAL, repeatable.
//
//   OPEN    fill candidate defaults, enrich, gate, score confidence, accept
//   ALIGN   re-enrich active signals; flag bloated definitions and pressure
//           anomalies without changing acceptance
//   ASCEND  kernel hooks; append drift alerts, replace narrative debt
//   CLEAR   decay active signals, move archive-eligible ones out
//   SEAL    deterministic provenance hash + ledger entry
//
// Every transition is `(&EngineState, params, now) -> (EngineState, output)`.
// Time is always passed in; nothing here reads a clock or touches I/O.
// =============================================================================

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::seal::{deterministic_hash, LedgerEntry, Provenance};
use crate::engine::state::EngineState;
use crate::engine_config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::gates::{validate_batch, BatchStats, CompressionGate, GateOptions, GateResult};
use crate::kernel::{
    drift_alerts, modulate_confidence, narrative_debt, pressure_trends, ClassSnapshot, DriftAlert,
    MemeticPressureTrend, NarrativeDebtIndex, OracleMetrics, OracleModulation,
};
use crate::signals::model::clamp_unit;
use crate::signals::processor::CONFIDENCE_PRIOR;
use crate::signals::{
    ArchivedSignal, CandidateSignal, DecayEngine, DecayStats, PressureModel, SignalProcessor,
    SlangSignal,
};
use crate::types::{EngineMode, SignalClass};

/// Magnitude under which ALIGN reports unusually low pressure.
const LOW_PRESSURE_MAGNITUDE: f64 = 0.1;
/// Magnitude over which ALIGN reports unusually high pressure.
const HIGH_PRESSURE_MAGNITUDE: f64 = 2.0;

// =============================================================================
// Mode parameters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenParams {
    #[serde(default)]
    pub candidate_signals: Vec<CandidateSignal>,
    pub seed: String,
    /// Overrides the configured noise threshold for this call.
    #[serde(default)]
    pub noise_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignParams {
    pub seed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AscendParams {
    #[serde(default)]
    pub oracle_metrics: Option<OracleMetrics>,
    #[serde(default)]
    pub prior_snapshot: Option<ClassSnapshot>,
    #[serde(default)]
    pub forecast_horizon_days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearParams {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SealParams {
    pub seed: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for one transition, tagged by mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeParams {
    Open(OpenParams),
    Align(AlignParams),
    Ascend(AscendParams),
    Clear(ClearParams),
    Seal(SealParams),
}

impl ModeParams {
    pub fn mode(&self) -> EngineMode {
        match self {
            Self::Open(_) => EngineMode::Open,
            Self::Align(_) => EngineMode::Align,
            Self::Ascend(_) => EngineMode::Ascend,
            Self::Clear(_) => EngineMode::Clear,
            Self::Seal(_) => EngineMode::Seal,
        }
    }

    /// Decode JSON parameters for `mode`.  `null` counts as `{}`.
    pub fn from_value(mode: EngineMode, value: serde_json::Value) -> EngineResult<Self> {
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };
        let invalid = |e: serde_json::Error| EngineError::InvalidParams {
            mode,
            reason: e.to_string(),
        };

        Ok(match mode {
            EngineMode::Open => Self::Open(serde_json::from_value(value).map_err(invalid)?),
            EngineMode::Align => Self::Align(serde_json::from_value(value).map_err(invalid)?),
            EngineMode::Ascend => Self::Ascend(serde_json::from_value(value).map_err(invalid)?),
            EngineMode::Clear => Self::Clear(serde_json::from_value(value).map_err(invalid)?),
            EngineMode::Seal => Self::Seal(serde_json::from_value(value).map_err(invalid)?),
        })
    }
}

// =============================================================================
// Mode outputs
// =============================================================================

/// A candidate that did not make it into the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub term: String,
    pub reasons: String,
    /// Gate diagnostics; empty when the candidate never reached the gates.
    #[serde(default)]
    pub gate_results: Vec<GateResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenOutput {
    pub accepted: Vec<SlangSignal>,
    pub rejected: Vec<RejectedCandidate>,
    pub stats: BatchStats,
}

/// Definition that no longer compresses its meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionFlag {
    pub term: String,
    pub reason: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    UnusuallyLow,
    UnusuallyHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureAnomaly {
    pub term: String,
    pub magnitude: f64,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignOutput {
    pub realigned: usize,
    /// Mean of (new strength - old strength).
    pub average_strength_shift: f64,
    pub compression_flags: Vec<CompressionFlag>,
    pub pressure_anomalies: Vec<PressureAnomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AscendOutput {
    pub modulation: OracleModulation,
    pub drift_alerts: Vec<DriftAlert>,
    pub narrative_debt: NarrativeDebtIndex,
    pub pressure_trends: Vec<MemeticPressureTrend>,
    /// Class counts now; pass back as the next `prior_snapshot`.
    pub snapshot: ClassSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearOutput {
    pub archived: Vec<ArchivedSignal>,
    pub stats: DecayStats,
    pub active_remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealOutput {
    pub provenance: Provenance,
    pub ledger_entry: LedgerEntry,
}

/// Output of one transition, tagged by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum ModeOutput {
    Open(OpenOutput),
    Align(AlignOutput),
    Ascend(AscendOutput),
    Clear(ClearOutput),
    Seal(SealOutput),
}

/// New state plus mode output.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EngineState,
    pub output: ModeOutput,
}

// =============================================================================
// SlangEngine
// =============================================================================

/// Stateless orchestrator: configuration in, state transitions out.
#[derive(Debug, Clone)]
pub struct SlangEngine {
    config: EngineConfig,
    decay: DecayEngine,
}

impl SlangEngine {
    pub fn new(config: EngineConfig) -> Self {
        let decay = DecayEngine::new(config.resurrection_threshold_pct);
        Self { config, decay }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn decay(&self) -> &DecayEngine {
        &self.decay
    }

    /// Fresh, empty state.
    pub fn initialize(&self, mode: EngineMode) -> EngineState {
        EngineState::initialize(mode)
    }

    /// Dispatch `params` to the handler for `mode`.
    pub fn execute(
        &self,
        mode: EngineMode,
        state: &EngineState,
        params: ModeParams,
        now: DateTime<Utc>,
    ) -> EngineResult<Transition> {
        if params.mode() != mode {
            return Err(EngineError::ParamsMismatch {
                expected: mode,
                got: params.mode(),
            });
        }

        let (state, output) = match params {
            ModeParams::Open(p) => {
                let (s, o) = self.open(state, p, now);
                (s, ModeOutput::Open(o))
            }
            ModeParams::Align(p) => {
                let (s, o) = self.align(state, p, now);
                (s, ModeOutput::Align(o))
            }
            ModeParams::Ascend(p) => {
                let (s, o) = self.ascend(state, p, now);
                (s, ModeOutput::Ascend(o))
            }
            ModeParams::Clear(p) => {
                let (s, o) = self.clear(state, p, now);
                (s, ModeOutput::Clear(o))
            }
            ModeParams::Seal(p) => {
                let (s, o) = self.seal(state, p, now);
                (s, ModeOutput::Seal(o))
            }
        };

        Ok(Transition { state, output })
    }

    /// Dispatch by mode name with JSON parameters.
    pub fn execute_named(
        &self,
        mode_name: &str,
        state: &EngineState,
        params: serde_json::Value,
        now: DateTime<Utc>,
    ) -> EngineResult<Transition> {
        let mode = EngineMode::from_str(mode_name)?;
        let params = ModeParams::from_value(mode, params)?;
        self.execute(mode, state, params, now)
    }

    // -------------------------------------------------------------------------
    // OPEN
    // -------------------------------------------------------------------------

    /// Turn a candidate into a full signal, or explain why it cannot be one.
    fn prepare_candidate(
        &self,
        candidate: &CandidateSignal,
        seed: &str,
        now: DateTime<Utc>,
    ) -> Result<SlangSignal, String> {
        let term = candidate
            .term
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "missing term".to_string())?;

        let class = match candidate.class.as_deref() {
            None => SignalClass::default(),
            Some(tag) => SignalClass::from_str(tag).map_err(|e| e.to_string())?,
        };

        let pressure = candidate
            .pressure_vector
            .map(|p| p.clamped())
            .unwrap_or_else(|| PressureModel::derive(&term, seed));

        let frequency = candidate
            .frequency_index
            .map(clamp_unit)
            .unwrap_or_else(|| clamp_unit(self.config.default_frequency_index));

        let mut signal = SlangSignal::new(
            term,
            class,
            candidate.definition.clone().unwrap_or_default(),
            pressure,
            frequency,
            candidate.timestamp_first_seen.unwrap_or(now),
        );

        signal.id = Some(
            candidate
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| {
                    let name = format!("{}:{}", seed, signal.term);
                    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
                }),
        );
        if let Some(halflife) = candidate
            .decay_halflife_days
            .filter(|h| h.is_finite() && *h > 0.0)
        {
            signal.decay_halflife_days = halflife;
        }
        signal.origin_context = candidate.origin_context.clone().unwrap_or_default();
        signal.symptoms = candidate.symptoms.clone().unwrap_or_default();
        signal.hygiene = candidate.hygiene.clone();
        signal.cross_references = candidate.cross_references.clone();
        signal.last_updated = now;
        // Gates see the prior until the signal is accepted.
        signal.confidence = CONFIDENCE_PRIOR;

        Ok(signal)
    }

    fn open(
        &self,
        state: &EngineState,
        params: OpenParams,
        now: DateTime<Utc>,
    ) -> (EngineState, OpenOutput) {
        let options = GateOptions {
            noise_threshold: params.noise_threshold.unwrap_or(self.config.noise_threshold),
            enable_adoption: self.config.enable_adoption_gate,
            adoption_threshold: self.config.adoption_threshold,
        };

        let mut rejected = Vec::new();
        let mut prepared: Vec<SlangSignal> = Vec::new();
        let mut evidence: HashMap<(String, Option<String>), (u32, u32)> = HashMap::new();

        for candidate in &params.candidate_signals {
            let label = candidate.term.clone().unwrap_or_default();

            let signal = match self.prepare_candidate(candidate, &params.seed, now) {
                Ok(signal) => signal,
                Err(reason) => {
                    debug!(term = %label, %reason, "candidate malformed");
                    rejected.push(RejectedCandidate {
                        term: label,
                        reasons: reason,
                        gate_results: Vec::new(),
                    });
                    continue;
                }
            };

            let key = (signal.term.clone(), signal.id.clone());
            if state.is_active(&key.0, key.1.as_deref()) || evidence.contains_key(&key) {
                debug!(term = %signal.term, "candidate duplicates an existing signal");
                rejected.push(RejectedCandidate {
                    term: signal.term,
                    reasons: "duplicate: signal with this term and id already exists".to_string(),
                    gate_results: Vec::new(),
                });
                continue;
            }

            evidence.insert(
                key,
                (
                    candidate
                        .observation_count
                        .unwrap_or(self.config.default_observation_count),
                    candidate
                        .cross_domain_count
                        .unwrap_or(self.config.default_cross_domain_count),
                ),
            );
            prepared.push(SignalProcessor::enrich(
                &signal,
                &params.seed,
                &state.active_signals,
                now,
            ));
        }

        let validation = validate_batch(prepared, &options);

        let accepted: Vec<SlangSignal> = validation
            .passed
            .into_iter()
            .map(|mut signal| {
                let (observations, domains) = evidence
                    .get(&(signal.term.clone(), signal.id.clone()))
                    .copied()
                    .unwrap_or((
                        self.config.default_observation_count,
                        self.config.default_cross_domain_count,
                    ));
                signal.confidence =
                    SignalProcessor::confidence(&signal, observations, domains, now);
                signal
            })
            .collect();

        rejected.extend(validation.failed.into_iter().map(|f| RejectedCandidate {
            term: f.signal.term,
            reasons: f.reasons,
            gate_results: f.results,
        }));

        let mut stats = validation.stats;
        stats.total = params.candidate_signals.len();
        stats.passed = accepted.len();
        stats.failed = rejected.len();
        stats.pass_rate = if stats.total == 0 {
            0.0
        } else {
            stats.passed as f64 / stats.total as f64
        };

        let mut next = state.clone();
        next.mode = EngineMode::Open;
        next.active_signals.extend(accepted.iter().cloned());

        info!(
            candidates = stats.total,
            accepted = stats.passed,
            rejected = stats.failed,
            active = next.active_signals.len(),
            "OPEN complete"
        );

        (
            next,
            OpenOutput {
                accepted,
                rejected,
                stats,
            },
        )
    }

    // -------------------------------------------------------------------------
    // ALIGN
    // -------------------------------------------------------------------------

    fn align(
        &self,
        state: &EngineState,
        params: AlignParams,
        now: DateTime<Utc>,
    ) -> (EngineState, AlignOutput) {
        let corpus = &state.active_signals;
        let mut output = AlignOutput::default();
        let mut realigned = Vec::with_capacity(corpus.len());
        let mut total_shift = 0.0;

        for signal in corpus {
            let enriched = SignalProcessor::enrich(signal, &params.seed, corpus, now);
            total_shift += enriched.signal_strength - signal.signal_strength;

            let compression = CompressionGate::check_definition(&enriched.definition);
            if !compression.passed {
                output.compression_flags.push(CompressionFlag {
                    term: enriched.term.clone(),
                    reason: compression.reason,
                    score: compression.score,
                });
            }

            let magnitude = PressureModel::magnitude(&enriched.pressure_vector);
            let anomaly = if magnitude < LOW_PRESSURE_MAGNITUDE {
                Some(AnomalyKind::UnusuallyLow)
            } else if magnitude > HIGH_PRESSURE_MAGNITUDE {
                Some(AnomalyKind::UnusuallyHigh)
            } else {
                None
            };
            if let Some(kind) = anomaly {
                debug!(term = %enriched.term, magnitude, ?kind, "pressure anomaly");
                output.pressure_anomalies.push(PressureAnomaly {
                    term: enriched.term.clone(),
                    magnitude,
                    kind,
                });
            }

            realigned.push(enriched);
        }

        output.realigned = realigned.len();
        output.average_strength_shift = if realigned.is_empty() {
            0.0
        } else {
            total_shift / realigned.len() as f64
        };

        let mut next = state.clone();
        next.mode = EngineMode::Align;
        next.active_signals = realigned;

        info!(
            realigned = output.realigned,
            compression_flags = output.compression_flags.len(),
            pressure_anomalies = output.pressure_anomalies.len(),
            "ALIGN complete"
        );

        (next, output)
    }

    // -------------------------------------------------------------------------
    // ASCEND
    // -------------------------------------------------------------------------

    fn ascend(
        &self,
        state: &EngineState,
        params: AscendParams,
        now: DateTime<Utc>,
    ) -> (EngineState, AscendOutput) {
        let active = &state.active_signals;
        let metrics = params.oracle_metrics.unwrap_or_default();
        let horizon = params
            .forecast_horizon_days
            .unwrap_or(self.config.forecast_horizon_days);

        let output = AscendOutput {
            modulation: modulate_confidence(&metrics, active),
            drift_alerts: drift_alerts(active, params.prior_snapshot.as_ref(), now),
            narrative_debt: narrative_debt(active, now),
            pressure_trends: pressure_trends(active, horizon, self.config.trend_characteristic_days),
            snapshot: ClassSnapshot::capture(active, now),
        };

        let mut next = state.clone();
        next.mode = EngineMode::Ascend;
        next.drift_alerts.extend(output.drift_alerts.iter().cloned());
        next.narrative_debt = Some(output.narrative_debt.clone());

        info!(
            drift_alerts = output.drift_alerts.len(),
            stress_level = output.narrative_debt.stress_level,
            confidence_adjustment = output.modulation.confidence_adjustment,
            "ASCEND complete"
        );

        (next, output)
    }

    // -------------------------------------------------------------------------
    // CLEAR
    // -------------------------------------------------------------------------

    fn clear(
        &self,
        state: &EngineState,
        _params: ClearParams,
        now: DateTime<Utc>,
    ) -> (EngineState, ClearOutput) {
        let batch = self.decay.process_decay_batch(&state.active_signals, now);

        let mut next = state.clone();
        next.mode = EngineMode::Clear;
        next.active_signals = batch.updated;
        next.archived_signals.extend(batch.to_archive.iter().cloned());

        info!(
            processed = batch.stats.processed,
            archived = batch.stats.archived_count,
            average_decay = batch.stats.average_decay,
            "CLEAR complete"
        );

        let output = ClearOutput {
            archived: batch.to_archive,
            stats: batch.stats,
            active_remaining: next.active_signals.len(),
        };

        (next, output)
    }

    // -------------------------------------------------------------------------
    // SEAL
    // -------------------------------------------------------------------------

    fn seal(
        &self,
        state: &EngineState,
        params: SealParams,
        now: DateTime<Utc>,
    ) -> (EngineState, SealOutput) {
        let hash = deterministic_hash(state, &params.seed);
        let version = params
            .version
            .unwrap_or_else(|| self.config.seal_version.clone());

        let ledger_entry = LedgerEntry::for_state(state, hash.clone(), now);
        let provenance = Provenance::new(params.seed, now, params.sources, version, hash.clone());

        let mut next = state.clone();
        next.mode = EngineMode::Seal;
        next.last_seal_timestamp = Some(now);
        next.provenance_hash = Some(hash);

        info!(
            hash = %provenance.deterministic_hash,
            active = ledger_entry.active_count,
            archived = ledger_entry.archived_count,
            "SEAL complete"
        );

        (
            next,
            SealOutput {
                provenance,
                ledger_entry,
            },
        )
    }
}

impl Default for SlangEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PressureVector;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    const RICH: &str = "Deliberately stepping outside, away from screens, to reset \
                        attention after prolonged online immersion and argument fatigue.";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    fn rich(term: &str, class: SignalClass) -> CandidateSignal {
        CandidateSignal {
            pressure_vector: Some(PressureVector::new(0.8, 0.7, 0.6, 0.7, 0.8)),
            frequency_index: Some(0.7),
            ..CandidateSignal::new(term, class, RICH)
        }
    }

    fn open(engine: &SlangEngine, state: &EngineState, c: Vec<CandidateSignal>) -> Transition {
        let params = ModeParams::Open(OpenParams {
            candidate_signals: c,
            seed: "seed".to_string(),
            noise_threshold: None,
        });
        engine.execute(EngineMode::Open, state, params, t0()).unwrap()
    }

    fn open_output(t: &Transition) -> &OpenOutput {
        match &t.output {
            ModeOutput::Open(o) => o,
            other => panic!("expected OPEN output, got {other:?}"),
        }
    }

    #[test]
    fn open_fills_defaults_and_scores_accepted() {
        let engine = SlangEngine::default();
        let state = engine.initialize(EngineMode::Open);
        let mut c = rich("Doom-Scroll", SignalClass::TemporalFugue);
        c.class = None;
        c.observation_count = Some(100);

        let t = open(&engine, &state, vec![c]);
        let out = open_output(&t);
        assert_eq!(out.accepted.len(), 1);

        let s = &out.accepted[0];
        assert_eq!(s.term, "doom-scroll");
        assert_eq!(s.class, SignalClass::MeaningInflation);
        assert!((s.decay_halflife_days - 30.0).abs() < f64::EPSILON);
        assert!(s.id.is_some());
        assert_eq!(s.novelty, Some(0.95));
        // prior + full observation bonus + strength share
        assert!((s.confidence - (0.6 + 0.2 * s.signal_strength)).abs() < 1e-9);
        assert_eq!(t.state.active_signals, out.accepted);
        assert_eq!(t.state.mode, EngineMode::Open);
    }

    #[test]
    fn open_derives_pressure_when_missing() {
        let engine = SlangEngine::default();
        let mut c = rich("vibe-check", SignalClass::CognitiveDrift);
        c.pressure_vector = None;
        let params = ModeParams::Open(OpenParams {
            candidate_signals: vec![c],
            seed: "seed".to_string(),
            noise_threshold: Some(0.0),
        });
        let t = engine
            .execute(EngineMode::Open, &engine.initialize(EngineMode::Open), params, t0())
            .unwrap();
        let out = open_output(&t);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(
            out.accepted[0].pressure_vector,
            PressureModel::derive("vibe-check", "seed")
        );
    }

    #[test]
    fn open_rejects_unknown_class_and_missing_term() {
        let engine = SlangEngine::default();
        let mut bad_class = rich("x-factor", SignalClass::CognitiveDrift);
        bad_class.class = Some("vibes".to_string());
        let no_term = CandidateSignal {
            term: Some("   ".to_string()),
            ..rich("ignored", SignalClass::CognitiveDrift)
        };

        let t = open(&engine, &engine.initialize(EngineMode::Open), vec![bad_class, no_term]);
        let out = open_output(&t);
        assert!(out.accepted.is_empty());
        assert_eq!(out.rejected.len(), 2);
        assert!(out.rejected[0].reasons.contains("unknown signal class"));
        assert_eq!(out.rejected[1].reasons, "missing term");
        assert_eq!(out.stats.total, 2);
        assert_eq!(out.stats.failed, 2);
        assert!(t.state.active_signals.is_empty());
    }

    #[test]
    fn open_rejects_duplicates() {
        let engine = SlangEngine::default();
        let first = open(
            &engine,
            &engine.initialize(EngineMode::Open),
            vec![rich("ratio", SignalClass::StatusCompression)],
        );
        assert_eq!(first.state.active_signals.len(), 1);

        let again = open(
            &engine,
            &first.state,
            vec![
                rich("ratio", SignalClass::StatusCompression),
                rich("mid", SignalClass::MeaningInflation),
                rich("mid", SignalClass::MeaningInflation),
            ],
        );
        let out = open_output(&again);
        let dupes = out
            .rejected
            .iter()
            .filter(|r| r.reasons.starts_with("duplicate"))
            .count();
        assert_eq!(dupes, 2);
        assert_eq!(again.state.active_signals.len(), 2);
    }

    #[test]
    fn open_ignores_supplied_derived_fields() {
        let engine = SlangEngine::default();
        let params = json!({
            "seed": "seed",
            "candidate_signals": [{
                "term": "sigma",
                "class": "status_compression",
                "definition": "x",
                "signal_strength": 1.0,
                "confidence": 1.0
            }]
        });
        let t = engine
            .execute_named("open", &engine.initialize(EngineMode::Open), params, t0())
            .unwrap();
        let out = open_output(&t);
        assert!(out.accepted.is_empty());
        assert!(out.rejected[0].reasons.contains("compression"));
    }

    #[test]
    fn align_preserves_identity_and_flags() {
        let engine = SlangEngine::default();
        let t = open(
            &engine,
            &engine.initialize(EngineMode::Open),
            vec![
                rich("ghosting", SignalClass::RitualAvoidance),
                rich("bed-rotting", SignalClass::UnspokenLoad),
            ],
        );

        let mut state = t.state.clone();
        state.active_signals[0].definition = "bloated ".repeat(40);
        state.active_signals[1].pressure_vector = PressureVector::new(1.0, 1.0, 1.0, 1.0, 0.9);

        let aligned = engine
            .execute(
                EngineMode::Align,
                &state,
                ModeParams::Align(AlignParams {
                    seed: "seed".to_string(),
                }),
                t0() + Duration::hours(1),
            )
            .unwrap();

        for (before, after) in state.active_signals.iter().zip(&aligned.state.active_signals) {
            assert_eq!(before.term, after.term);
            assert_eq!(before.class, after.class);
            assert_eq!(before.id, after.id);
            assert_eq!(before.confidence, after.confidence);
        }
        let ModeOutput::Align(out) = aligned.output else {
            panic!("expected ALIGN output");
        };
        assert_eq!(out.realigned, 2);
        assert_eq!(out.compression_flags.len(), 1);
        assert_eq!(out.compression_flags[0].term, "ghosting");
        assert_eq!(out.pressure_anomalies.len(), 1);
        assert_eq!(out.pressure_anomalies[0].kind, AnomalyKind::UnusuallyHigh);
    }

    #[test]
    fn ascend_appends_alerts_and_replaces_debt() {
        let engine = SlangEngine::default();
        let mut state = engine.initialize(EngineMode::Ascend);
        let old_alert = DriftAlert {
            class: SignalClass::CognitiveDrift,
            previous_count: 1,
            current_count: 3,
            change_pct: 200.0,
            severity: crate::kernel::DriftSeverity::Critical,
            detected_at: t0(),
            message: "old".to_string(),
        };
        state.drift_alerts.push(old_alert.clone());
        state.narrative_debt = Some(NarrativeDebtIndex {
            stress_level: 0.9,
            ..NarrativeDebtIndex::default()
        });

        let open_t = open(
            &engine,
            &state,
            vec![
                rich("burnout", SignalClass::UnspokenLoad),
                rich("masking", SignalClass::UnspokenLoad),
            ],
        );
        let prior = ClassSnapshot {
            captured_at: Some(t0()),
            class_counts: [(SignalClass::UnspokenLoad, 1)].into_iter().collect(),
        };

        let t = engine
            .execute(
                EngineMode::Ascend,
                &open_t.state,
                ModeParams::Ascend(AscendParams {
                    prior_snapshot: Some(prior),
                    ..AscendParams::default()
                }),
                t0(),
            )
            .unwrap();

        assert_eq!(t.state.drift_alerts.len(), 2);
        assert_eq!(t.state.drift_alerts[0], old_alert);
        let debt = t.state.narrative_debt.clone().unwrap();
        assert_eq!(debt.signal_count, 2);
        assert!(debt.stress_level < 0.9);

        let ModeOutput::Ascend(out) = t.output else {
            panic!("expected ASCEND output");
        };
        assert_eq!(out.snapshot.count(SignalClass::UnspokenLoad), 2);
        assert_eq!(out.pressure_trends.len(), 1);
        assert_eq!(out.pressure_trends[0].horizon_days, 30);
        assert_eq!(t.state.active_signals, open_t.state.active_signals);
    }

    #[test]
    fn clear_moves_decayed_signals_to_archive() {
        let engine = SlangEngine::default();
        let t = open(
            &engine,
            &engine.initialize(EngineMode::Open),
            vec![
                rich("fomo", SignalClass::MeaningInflation),
                rich("load-bearing", SignalClass::UnspokenLoad),
            ],
        );

        let later = t0() + Duration::days(150);
        let cleared = engine
            .execute(EngineMode::Clear, &t.state, ModeParams::Clear(ClearParams {}), later)
            .unwrap();

        let ModeOutput::Clear(out) = &cleared.output else {
            panic!("expected CLEAR output");
        };
        assert_eq!(out.stats.processed, 2);
        assert_eq!(out.archived.len(), 1);
        assert_eq!(out.archived[0].signal.term, "fomo");
        assert_eq!(out.active_remaining, 1);
        assert_eq!(cleared.state.archived_signals.len(), 1);
        assert_eq!(cleared.state.active_signals[0].term, "load-bearing");
    }

    #[test]
    fn repeated_clear_does_not_compound_decay() {
        let engine = SlangEngine::default();
        let t = open(
            &engine,
            &engine.initialize(EngineMode::Open),
            vec![rich("fomo", SignalClass::MeaningInflation)],
        );
        let clear = |state: &EngineState, days: i64| {
            engine
                .execute(
                    EngineMode::Clear,
                    state,
                    ModeParams::Clear(ClearParams {}),
                    t0() + Duration::days(days),
                )
                .unwrap()
                .state
        };

        let once = clear(&t.state, 30);
        let twice = clear(&once, 30);
        assert_eq!(once.active_signals, twice.active_signals);

        let stepped = clear(&once, 50);
        let direct = clear(&t.state, 50);
        assert_eq!(stepped.active_signals.len(), 1);
        assert_eq!(direct.active_signals.len(), 1);
        assert!(stepped.archived_signals.is_empty());
        assert_eq!(
            stepped.active_signals[0].signal_strength,
            direct.active_signals[0].signal_strength
        );
        let base = t.state.active_signals[0].signal_strength;
        let expected = base * 0.5_f64.powf(50.0 / 30.0);
        assert!((direct.active_signals[0].signal_strength - expected).abs() < 1e-9);
    }

    #[test]
    fn seal_is_idempotent_for_same_state_and_seed() {
        let engine = SlangEngine::default();
        let t = open(
            &engine,
            &engine.initialize(EngineMode::Open),
            vec![rich("delulu", SignalClass::CognitiveDrift)],
        );
        let seal = |state: &EngineState, at: DateTime<Utc>| {
            engine
                .execute(
                    EngineMode::Seal,
                    state,
                    ModeParams::Seal(SealParams {
                        seed: "ledger".to_string(),
                        sources: vec!["forum".to_string()],
                        version: None,
                    }),
                    at,
                )
                .unwrap()
        };

        let a = seal(&t.state, t0());
        let b = seal(&t.state, t0() + Duration::minutes(5));
        let (ModeOutput::Seal(oa), ModeOutput::Seal(ob)) = (&a.output, &b.output) else {
            panic!("expected SEAL outputs");
        };
        assert_eq!(oa.provenance.deterministic_hash, ob.provenance.deterministic_hash);
        assert_eq!(oa.provenance.version, "1.0.0");
        assert_eq!(oa.provenance.sources, vec!["forum"]);
        assert_eq!(oa.ledger_entry.active_count, 1);
        assert_eq!(a.state.provenance_hash.as_deref(), Some(oa.ledger_entry.hash.as_str()));
        assert_eq!(b.state.last_seal_timestamp, Some(t0() + Duration::minutes(5)));
    }

    #[test]
    fn unknown_mode_and_mismatch_are_errors() {
        let engine = SlangEngine::default();
        let state = engine.initialize(EngineMode::Open);

        let err = engine
            .execute_named("TRANSCEND", &state, json!({}), t0())
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownMode("TRANSCEND".to_string()));

        let err = engine
            .execute(EngineMode::Seal, &state, ModeParams::Clear(ClearParams {}), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::ParamsMismatch { .. }));

        let err = engine
            .execute_named("SEAL", &state, json!({ "sources": [] }), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParams { mode: EngineMode::Seal, .. }));
    }

    #[test]
    fn clear_accepts_null_params() {
        let engine = SlangEngine::default();
        let state = engine.initialize(EngineMode::Clear);
        let t = engine
            .execute_named("clear", &state, serde_json::Value::Null, t0())
            .unwrap();
        assert_eq!(t.state.mode, EngineMode::Clear);
    }

    #[test]
    fn transitions_do_not_touch_the_input_state() {
        let engine = SlangEngine::default();
        let state = engine.initialize(EngineMode::Open);
        let before = state.clone();
        let _ = open(&engine, &state, vec![rich("npc", SignalClass::CognitiveDrift)]);
        assert_eq!(state, before);
    }
}

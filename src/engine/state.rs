// =============================================================================
// Engine State — the single aggregate every mode transforms
// =============================================================================
//
// State is never edited in place by callers: each mode takes the current
// value by reference and hands back a whole new one.  Alerts and the
// resurrection log are append-only; the narrative debt snapshot is replaced
// on every ASCEND.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kernel::{DriftAlert, NarrativeDebtIndex};
use crate::signals::{ArchivedSignal, ResurrectionEvent, SlangSignal};
use crate::types::EngineMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Mode of the most recent transition (or the starting mode).
    pub mode: EngineMode,

    /// Accepted signals, unique by (term, id).
    #[serde(default)]
    pub active_signals: Vec<SlangSignal>,

    #[serde(default)]
    pub archived_signals: Vec<ArchivedSignal>,

    /// Latest ASCEND narrative debt figure.
    #[serde(default)]
    pub narrative_debt: Option<NarrativeDebtIndex>,

    /// Every drift alert ever raised, oldest first.
    #[serde(default)]
    pub drift_alerts: Vec<DriftAlert>,

    /// Every resurrection ever performed, oldest first.
    #[serde(default)]
    pub resurrection_log: Vec<ResurrectionEvent>,

    #[serde(default)]
    pub last_seal_timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub provenance_hash: Option<String>,
}

impl EngineState {
    /// Fresh, empty state starting in `mode`.
    pub fn initialize(mode: EngineMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether an active signal carries this identity.
    pub fn is_active(&self, term: &str, id: Option<&str>) -> bool {
        self.active_signals
            .iter()
            .any(|s| s.same_identity(term, id))
    }

    /// Current stress level, zero before the first ASCEND.
    pub fn stress_level(&self) -> f64 {
        self.narrative_debt
            .as_ref()
            .map(|d| d.stress_level)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PressureVector;
    use crate::types::SignalClass;

    #[test]
    fn initialize_is_empty() {
        let s = EngineState::initialize(EngineMode::Align);
        assert_eq!(s.mode, EngineMode::Align);
        assert!(s.active_signals.is_empty());
        assert!(s.archived_signals.is_empty());
        assert!(s.drift_alerts.is_empty());
        assert_eq!(s.provenance_hash, None);
        assert_eq!(s.stress_level(), 0.0);
    }

    #[test]
    fn identity_lookup_uses_term_and_id() {
        let mut s = EngineState::initialize(EngineMode::Open);
        let mut sig = SlangSignal::new(
            "rawdogging",
            SignalClass::TemporalFugue,
            "d",
            PressureVector::default(),
            0.5,
            Utc::now(),
        );
        sig.id = Some("abc".to_string());
        s.active_signals.push(sig);

        assert!(s.is_active("rawdogging", Some("abc")));
        assert!(!s.is_active("rawdogging", None));
        assert!(!s.is_active("rawdogging", Some("xyz")));
    }

    #[test]
    fn state_deserialises_from_minimal_json() {
        let s: EngineState = serde_json::from_str(r#"{ "mode": "CLEAR" }"#).unwrap();
        assert_eq!(s, EngineState::initialize(EngineMode::Clear));
    }
}

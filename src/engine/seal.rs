// =============================================================================
// Seal — deterministic provenance hash and ledger entry
// =============================================================================
//
// The hash covers a canonical projection of state:
//
//   { active_terms (sorted), archived_count, stress_level (6 dp), seed }
//
// The seal timestamp is outside the projection, so sealing an
// unchanged state twice with the same seed yields the same hash.  The records
// below are meant for an external append-only log keyed by that hash.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::state::EngineState;

/// Auditable origin record for one sealed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub seed: String,
    /// When the seal was taken.
    pub timestamp: DateTime<Utc>,
    /// Upstream sources the sealed cycle drew on.
    pub sources: Vec<String>,
    pub version: String,
    /// Hex SHA-256 of the canonical state projection.
    pub deterministic_hash: String,
}

/// One line for the external append-only ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub active_count: usize,
    pub archived_count: usize,
}

/// Canonical JSON projection of `state` under `seed`.
pub fn canonical_projection(state: &EngineState, seed: &str) -> String {
    let mut active_terms: Vec<&str> = state
        .active_signals
        .iter()
        .map(|s| s.term.as_str())
        .collect();
    active_terms.sort_unstable();

    serde_json::json!({
        "active_terms": active_terms,
        "archived_count": state.archived_signals.len(),
        "stress_level": format!("{:.6}", state.stress_level()),
        "seed": seed,
    })
    .to_string()
}

/// Hex SHA-256 over the canonical projection.
pub fn deterministic_hash(state: &EngineState, seed: &str) -> String {
    let digest = Sha256::digest(canonical_projection(state, seed).as_bytes());
    hex::encode(digest)
}

impl Provenance {
    pub fn new(
        seed: impl Into<String>,
        timestamp: DateTime<Utc>,
        sources: Vec<String>,
        version: impl Into<String>,
        deterministic_hash: impl Into<String>,
    ) -> Self {
        Self {
            seed: seed.into(),
            timestamp,
            sources,
            version: version.into(),
            deterministic_hash: deterministic_hash.into(),
        }
    }
}

impl LedgerEntry {
    pub fn for_state(state: &EngineState, hash: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            hash: hash.into(),
            active_count: state.active_signals.len(),
            archived_count: state.archived_signals.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::NarrativeDebtIndex;
    use crate::signals::{PressureVector, SlangSignal};
    use crate::types::{EngineMode, SignalClass};
    use chrono::TimeZone;

    fn state_with(terms: &[&str]) -> EngineState {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut s = EngineState::initialize(EngineMode::Seal);
        for t in terms {
            s.active_signals.push(SlangSignal::new(
                *t,
                SignalClass::CognitiveDrift,
                "d",
                PressureVector::default(),
                0.5,
                now,
            ));
        }
        s
    }

    #[test]
    fn hash_is_hex_sha256() {
        let h = deterministic_hash(&state_with(&["a"]), "seed");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_ignores_signal_order() {
        assert_eq!(
            deterministic_hash(&state_with(&["b", "a", "c"]), "s"),
            deterministic_hash(&state_with(&["c", "b", "a"]), "s"),
        );
    }

    #[test]
    fn hash_changes_with_seed_terms_and_stress() {
        let base = state_with(&["a", "b"]);
        let h = deterministic_hash(&base, "s");
        assert_ne!(h, deterministic_hash(&base, "t"));
        assert_ne!(h, deterministic_hash(&state_with(&["a"]), "s"));

        let mut stressed = base.clone();
        stressed.narrative_debt = Some(NarrativeDebtIndex {
            stress_level: 0.25,
            ..NarrativeDebtIndex::default()
        });
        assert_ne!(h, deterministic_hash(&stressed, "s"));
    }

    #[test]
    fn projection_is_sorted_and_fixed_precision() {
        let p = canonical_projection(&state_with(&["zed", "abc"]), "s");
        assert!(p.contains(r#""active_terms":["abc","zed"]"#));
        assert!(p.contains(r#""stress_level":"0.000000""#));
    }

    #[test]
    fn ledger_counts_state() {
        let s = state_with(&["a", "b"]);
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let entry = LedgerEntry::for_state(&s, "h", now);
        assert_eq!(entry.active_count, 2);
        assert_eq!(entry.archived_count, 0);
        assert_eq!(entry.timestamp, now);
    }
}

// =============================================================================
// Adoption Gate — present, disabled, never required
// =============================================================================
//
// The engine observes signals; it does not promote them.  Disabled, the gate
// always fails with a fixed reason.  Enabled by a caller, it passes when
//   0.4 * strength + 0.3 * confidence + 0.3 * frequency >= threshold (0.8).
// Either way batch validation never rejects on it.
// =============================================================================

use crate::gates::{GateKind, GateResult, QualityGate};
use crate::signals::SlangSignal;

pub const DEFAULT_ADOPTION_THRESHOLD: f64 = 0.8;
pub const DISABLED_REASON: &str = "adoption: disabled, no promotion philosophy";

#[derive(Debug, Clone, Copy)]
pub struct AdoptionGate {
    pub enabled: bool,
    pub threshold: f64,
}

impl AdoptionGate {
    pub fn enabled(threshold: f64) -> Self {
        Self {
            enabled: true,
            threshold,
        }
    }

    /// Weighted adoption score.
    pub fn score(signal: &SlangSignal) -> f64 {
        0.4 * signal.signal_strength + 0.3 * signal.confidence + 0.3 * signal.frequency_index
    }
}

impl Default for AdoptionGate {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_ADOPTION_THRESHOLD,
        }
    }
}

impl QualityGate for AdoptionGate {
    fn kind(&self) -> GateKind {
        GateKind::Adoption
    }

    fn required(&self) -> bool {
        false
    }

    fn evaluate(&self, signal: &SlangSignal) -> GateResult {
        if !self.enabled {
            return GateResult::fail(GateKind::Adoption, 0.0, DISABLED_REASON);
        }

        let score = Self::score(signal);
        if score >= self.threshold {
            GateResult::pass(
                GateKind::Adoption,
                score,
                format!("adoption ok (score {:.3})", score),
            )
        } else {
            GateResult::fail(
                GateKind::Adoption,
                score,
                format!("adoption: score {:.3} < {:.2}", score, self.threshold),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PressureVector;
    use crate::types::SignalClass;
    use chrono::{TimeZone, Utc};

    fn signal(v: f64) -> SlangSignal {
        let mut s = SlangSignal::new(
            "main-character",
            SignalClass::StatusCompression,
            "d",
            PressureVector::default(),
            v,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );
        s.signal_strength = v;
        s.confidence = v;
        s
    }

    #[test]
    fn disabled_gate_always_fails() {
        let gate = AdoptionGate::default();
        let r = gate.evaluate(&signal(1.0));
        assert!(!r.passed);
        assert_eq!(r.reason, DISABLED_REASON);
        assert!(!gate.required());
    }

    #[test]
    fn enabled_gate_needs_high_score() {
        let gate = AdoptionGate::enabled(DEFAULT_ADOPTION_THRESHOLD);
        assert!(gate.evaluate(&signal(0.9)).passed);
        assert!(!gate.evaluate(&signal(0.7)).passed);
    }
}

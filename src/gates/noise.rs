// =============================================================================
// Noise Gate — filter signals too weak to matter
// =============================================================================
//
// Fails when:
//   1. strength < threshold (default 0.15)
//   2. frequency < 0.1 AND pressure magnitude < 0.3 (weak on both axes)
//   3. confidence < 0.2
//
// Passing score = 0.5 * strength + 0.3 * confidence + 0.2 * frequency.
// =============================================================================

use crate::gates::{GateKind, GateResult, QualityGate};
use crate::signals::{PressureModel, SlangSignal};

pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.15;
const MIN_FREQUENCY: f64 = 0.1;
const MIN_MAGNITUDE: f64 = 0.3;
const MIN_CONFIDENCE: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct NoiseGate {
    pub threshold: f64,
}

impl NoiseGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_THRESHOLD)
    }
}

impl QualityGate for NoiseGate {
    fn kind(&self) -> GateKind {
        GateKind::Noise
    }

    fn evaluate(&self, signal: &SlangSignal) -> GateResult {
        let strength = signal.signal_strength;
        let confidence = signal.confidence;
        let frequency = signal.frequency_index;
        let score = 0.5 * strength + 0.3 * confidence + 0.2 * frequency;

        if strength < self.threshold {
            return GateResult::fail(
                GateKind::Noise,
                score,
                format!(
                    "noise: strength {:.3} below threshold {:.3}",
                    strength, self.threshold
                ),
            );
        }

        let magnitude = PressureModel::magnitude(&signal.pressure_vector);
        if frequency < MIN_FREQUENCY && magnitude < MIN_MAGNITUDE {
            return GateResult::fail(
                GateKind::Noise,
                score,
                format!(
                    "noise: frequency {:.3} and pressure {:.3} both too low",
                    frequency, magnitude
                ),
            );
        }

        if confidence < MIN_CONFIDENCE {
            return GateResult::fail(
                GateKind::Noise,
                score,
                format!(
                    "noise: confidence {:.3} below {:.2}",
                    confidence, MIN_CONFIDENCE
                ),
            );
        }

        GateResult::pass(GateKind::Noise, score, format!("noise ok (score {:.3})", score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PressureVector;
    use crate::types::SignalClass;
    use chrono::{TimeZone, Utc};

    fn signal(strength: f64, confidence: f64, freq: f64, p: f64) -> SlangSignal {
        let mut s = SlangSignal::new(
            "mid",
            SignalClass::StatusCompression,
            "d",
            PressureVector::new(p, p, p, p, p),
            freq,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );
        s.signal_strength = strength;
        s.confidence = confidence;
        s
    }

    #[test]
    fn strength_exactly_at_threshold_passes() {
        let r = NoiseGate::default().evaluate(&signal(0.15, 0.5, 0.5, 0.5));
        assert!(r.passed, "{}", r.reason);
        assert!((r.score - (0.075 + 0.15 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn strength_just_below_threshold_fails() {
        let r = NoiseGate::default().evaluate(&signal(0.15 - 1e-12, 0.5, 0.5, 0.5));
        assert!(!r.passed);
        assert!(r.reason.contains("below threshold"));
    }

    #[test]
    fn low_frequency_and_low_pressure_fails() {
        let r = NoiseGate::default().evaluate(&signal(0.5, 0.5, 0.05, 0.1));
        assert!(!r.passed);
        assert!(r.reason.contains("both too low"));
    }

    #[test]
    fn low_frequency_alone_is_tolerated() {
        let r = NoiseGate::default().evaluate(&signal(0.5, 0.5, 0.05, 0.5));
        assert!(r.passed);
    }

    #[test]
    fn low_confidence_fails() {
        let r = NoiseGate::default().evaluate(&signal(0.5, 0.1, 0.5, 0.5));
        assert!(!r.passed);
        assert!(r.reason.contains("confidence"));
    }

    #[test]
    fn custom_threshold_applies() {
        let r = NoiseGate::new(0.6).evaluate(&signal(0.5, 0.5, 0.5, 0.5));
        assert!(!r.passed);
    }
}

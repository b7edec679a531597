// =============================================================================
// Batch Validation — run the gate pipeline over many signals
// =============================================================================
//
// Compression and noise always run and are required.  Adoption runs only when
// enabled and is never required.  Per-signal failures come back as data with
// the full gate diagnostics; nothing here returns an error.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gates::adoption::DEFAULT_ADOPTION_THRESHOLD;
use crate::gates::noise::DEFAULT_NOISE_THRESHOLD;
use crate::gates::{AdoptionGate, CompressionGate, GateKind, GateResult, NoiseGate, QualityGate};
use crate::signals::SlangSignal;

/// Knobs for one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateOptions {
    pub noise_threshold: f64,
    pub enable_adoption: bool,
    pub adoption_threshold: f64,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            enable_adoption: false,
            adoption_threshold: DEFAULT_ADOPTION_THRESHOLD,
        }
    }
}

/// A signal that failed at least one required gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedValidation {
    pub signal: SlangSignal,
    pub results: Vec<GateResult>,
    /// Reasons of the failing required gates, joined with "; ".
    pub reasons: String,
}

/// Aggregate figures for a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub compression_failures: usize,
    pub noise_failures: usize,
    pub adoption_failures: usize,
}

impl BatchStats {
    fn record_failure(&mut self, gate: GateKind) {
        match gate {
            GateKind::Compression => self.compression_failures += 1,
            GateKind::Noise => self.noise_failures += 1,
            GateKind::Adoption => self.adoption_failures += 1,
        }
    }
}

/// Outcome of `validate_batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchValidation {
    pub passed: Vec<SlangSignal>,
    pub failed: Vec<FailedValidation>,
    pub stats: BatchStats,
}

fn pipeline(options: &GateOptions) -> Vec<Box<dyn QualityGate>> {
    let mut gates: Vec<Box<dyn QualityGate>> = vec![
        Box::new(CompressionGate),
        Box::new(NoiseGate::new(options.noise_threshold)),
    ];
    if options.enable_adoption {
        gates.push(Box::new(AdoptionGate::enabled(options.adoption_threshold)));
    }
    gates
}

/// Validate every signal; a signal passes iff all required gates pass.
pub fn validate_batch(signals: Vec<SlangSignal>, options: &GateOptions) -> BatchValidation {
    let gates = pipeline(options);
    let mut out = BatchValidation::default();
    out.stats.total = signals.len();

    for signal in signals {
        let mut results = Vec::with_capacity(gates.len());
        let mut blocking = Vec::new();

        for gate in &gates {
            let result = gate.evaluate(&signal);
            if !result.passed {
                out.stats.record_failure(result.gate);
                if gate.required() {
                    blocking.push(result.reason.clone());
                }
            }
            results.push(result);
        }

        if blocking.is_empty() {
            debug!(term = %signal.term, "signal passed validation");
            out.passed.push(signal);
        } else {
            let reasons = blocking.join("; ");
            debug!(term = %signal.term, %reasons, "signal failed validation");
            out.failed.push(FailedValidation {
                signal,
                results,
                reasons,
            });
        }
    }

    out.stats.passed = out.passed.len();
    out.stats.failed = out.failed.len();
    out.stats.pass_rate = if out.stats.total == 0 {
        0.0
    } else {
        out.stats.passed as f64 / out.stats.total as f64
    };

    out
}

// =============================================================================
// Validation Gates — independent quality checks over a signal
// =============================================================================
//
// Every gate is a pure check returning the same `GateResult` shape.  Batch
// validation composes them: a signal passes only if every REQUIRED gate
// passes.
//
// Gates:
//   - Compression: definition must compress meaning (length, brevity, density)
//   - Noise:       strength / frequency / pressure / confidence floors
//   - Adoption:    off by default and never required; the engine does not
//                  promote signals
// =============================================================================

pub mod adoption;
pub mod batch;
pub mod compression;
pub mod noise;

use serde::{Deserialize, Serialize};

use crate::signals::SlangSignal;

pub use adoption::AdoptionGate;
pub use batch::{validate_batch, BatchStats, BatchValidation, FailedValidation, GateOptions};
pub use compression::CompressionGate;
pub use noise::NoiseGate;

/// Which gate produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Compression,
    Noise,
    Adoption,
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compression => write!(f, "compression"),
            Self::Noise => write!(f, "noise"),
            Self::Adoption => write!(f, "adoption"),
        }
    }
}

/// Verdict of a single gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub gate: GateKind,
    pub passed: bool,
    pub reason: String,
    pub score: f64,
}

impl GateResult {
    pub fn pass(gate: GateKind, score: f64, reason: impl Into<String>) -> Self {
        Self {
            gate,
            passed: true,
            reason: reason.into(),
            score,
        }
    }

    pub fn fail(gate: GateKind, score: f64, reason: impl Into<String>) -> Self {
        Self {
            gate,
            passed: false,
            reason: reason.into(),
            score,
        }
    }
}

/// A quality check over one signal.
pub trait QualityGate {
    fn kind(&self) -> GateKind;

    /// Whether failing this gate rejects the signal.
    fn required(&self) -> bool {
        true
    }

    fn evaluate(&self, signal: &SlangSignal) -> GateResult;
}

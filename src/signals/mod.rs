// =============================================================================
// Signals Module
// =============================================================================
//
// Signal model and per-signal computation:
// - Signal data model (pressure vectors, active / archived / candidate signals)
// - Pressure magnitude and deterministic derivation
// - Novelty, strength and confidence scoring
// - Half-life decay, archival and resurrection

pub mod model;
pub mod pressure;
pub mod processor;
pub mod signal_decay;

pub use model::{ArchivedSignal, CandidateSignal, CrossReferences, PressureVector, SlangSignal};
pub use pressure::PressureModel;
pub use processor::SignalProcessor;
pub use signal_decay::{DecayBatch, DecayEngine, DecayStats, ResurrectionEvent, SurvivalFactors};

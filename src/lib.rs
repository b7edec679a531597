// =============================================================================
// Slang Engine — deterministic lifecycle engine for emergent-language signals
// =============================================================================
//
// Signals enter through OPEN, are re-scored by ALIGN, summarised for the
// forecasting consumer by ASCEND, aged out by CLEAR and fingerprinted by SEAL.
// Every transition is a pure function of (state, params, now).
// =============================================================================

pub mod engine;
pub mod engine_config;
pub mod error;
pub mod gates;
pub mod kernel;
pub mod signals;
pub mod types;

pub use engine::{EngineSession, EngineState, ModeOutput, ModeParams, SlangEngine, Transition};
pub use engine_config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use signals::{CandidateSignal, PressureVector, SlangSignal};
pub use types::{EngineMode, SignalClass};

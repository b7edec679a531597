// =============================================================================
// Engine — state aggregate, mode orchestrator, sealing and session holder
// =============================================================================

pub mod lifecycle;
pub mod modes;
pub mod seal;
pub mod session;
pub mod state;

pub use lifecycle::{PressureObservation, RevivalOutcome, SurvivalObservation};
pub use modes::{
    AlignOutput, AlignParams, AnomalyKind, AscendOutput, AscendParams, ClearOutput, ClearParams,
    CompressionFlag, ModeOutput, ModeParams, OpenOutput, OpenParams, PressureAnomaly,
    RejectedCandidate, SealOutput, SealParams, SlangEngine, Transition,
};
pub use seal::{canonical_projection, deterministic_hash, LedgerEntry, Provenance};
pub use session::EngineSession;
pub use state::EngineState;

// =============================================================================
// Engine Errors — structural misuse only
// =============================================================================
//
// Bad candidate data never surfaces here: gate failures and malformed
// candidates are reported as data in mode outputs.  These variants cover
// caller bugs that should stop the caller immediately.
// =============================================================================

use thiserror::Error;

use crate::types::EngineMode;

/// Fatal engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Mode name outside OPEN / ALIGN / ASCEND / CLEAR / SEAL.
    #[error("unknown engine mode: {0}")]
    UnknownMode(String),

    /// Signal class outside the fixed taxonomy.
    #[error("unknown signal class: {0}")]
    UnknownClass(String),

    /// Parameters for one mode were dispatched to another.
    #[error("mode {expected} received parameters for {got}")]
    ParamsMismatch { expected: EngineMode, got: EngineMode },

    /// Mode parameters could not be decoded.
    #[error("invalid parameters for {mode}: {reason}")]
    InvalidParams { mode: EngineMode, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

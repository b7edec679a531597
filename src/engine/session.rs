// =============================================================================
// Engine Session — shared, versioned holder for one evolving EngineState
// =============================================================================
//
// The engine itself is pure.  A session is the thin stateful shell for hosts
// that want to share one state across threads:
//
//   - parking_lot::RwLock around the state; a transition holds the write lock
//     from read to commit, so concurrent runs never lose an update.
//   - AtomicU64 version, bumped once per committed transition.
//   - Capped history of SEAL ledger entries for the external append-only log.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::engine::lifecycle::{PressureObservation, RevivalOutcome, SurvivalObservation};
use crate::engine::modes::{ModeOutput, ModeParams, SlangEngine, Transition};
use crate::engine::seal::LedgerEntry;
use crate::engine::state::EngineState;
use crate::error::EngineResult;
use crate::types::EngineMode;

/// Maximum number of ledger entries retained in memory.
const MAX_LEDGER_ENTRIES: usize = 100;

pub struct EngineSession {
    engine: SlangEngine,
    state: RwLock<EngineState>,
    /// Incremented on every committed transition.
    state_version: AtomicU64,
    ledger: RwLock<Vec<LedgerEntry>>,
}

impl EngineSession {
    pub fn new(engine: SlangEngine, mode: EngineMode) -> Self {
        let state = engine.initialize(mode);
        Self::with_state(engine, state)
    }

    /// Resume from a previously persisted state.
    pub fn with_state(engine: SlangEngine, state: EngineState) -> Self {
        Self {
            engine,
            state: RwLock::new(state),
            state_version: AtomicU64::new(0),
            ledger: RwLock::new(Vec::new()),
        }
    }

    pub fn engine(&self) -> &SlangEngine {
        &self.engine
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> EngineState {
        self.state.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    /// SEAL ledger entries recorded by this session, oldest first.
    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.ledger.read().clone()
    }

    /// Run one transition against the shared state and commit it.  On error
    /// the state is left untouched.
    pub fn run(&self, params: ModeParams, now: DateTime<Utc>) -> EngineResult<ModeOutput> {
        let mut state = self.state.write();
        let Transition { state: next, output } =
            self.engine.execute(params.mode(), &state, params, now)?;
        *state = next;
        drop(state);

        if let ModeOutput::Seal(seal) = &output {
            self.push_ledger(seal.ledger_entry.clone());
        }
        let version = self.state_version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, "session state committed");

        Ok(output)
    }

    /// Same as [`run`](Self::run) with a mode name and JSON parameters.
    pub fn run_named(
        &self,
        mode_name: &str,
        params: serde_json::Value,
        now: DateTime<Utc>,
    ) -> EngineResult<ModeOutput> {
        let mode = mode_name.parse::<EngineMode>()?;
        self.run(ModeParams::from_value(mode, params)?, now)
    }

    pub fn revive(
        &self,
        observations: &[PressureObservation],
        seed: &str,
        now: DateTime<Utc>,
    ) -> RevivalOutcome {
        let mut state = self.state.write();
        let (next, outcome) = self.engine.revive(&state, observations, seed, now);
        *state = next;
        self.state_version.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    pub fn apply_survival_boosts(
        &self,
        boosts: &[SurvivalObservation],
        now: DateTime<Utc>,
    ) -> usize {
        let mut state = self.state.write();
        let (next, boosted) = self.engine.apply_survival_boosts(&state, boosts, now);
        *state = next;
        self.state_version.fetch_add(1, Ordering::SeqCst);
        boosted
    }

    fn push_ledger(&self, entry: LedgerEntry) {
        let mut ledger = self.ledger.write();
        ledger.push(entry);
        while ledger.len() > MAX_LEDGER_ENTRIES {
            ledger.remove(0);
        }
    }
}

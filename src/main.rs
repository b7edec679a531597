// =============================================================================
// Slang Engine — batch runner
// =============================================================================
//
// Reads a JSON array of candidate signals, drives one full cycle
// (OPEN -> ALIGN -> ASCEND -> CLEAR -> SEAL) and prints the SEAL ledger entry
// as JSON on stdout.  Logs go to stderr.
//
// Environment:
//   SLANG_CANDIDATES  candidate file            (default candidates.json)
//   SLANG_SEED        determinism seed          (default slang-engine)
//   SLANG_SOURCES     comma-separated sources   (default batch)
//   RUST_LOG          tracing filter            (default info)
// =============================================================================

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slang_engine::engine::{
    AlignParams, AscendParams, ClearParams, EngineSession, ModeOutput, ModeParams, OpenParams,
    SealParams,
};
use slang_engine::{CandidateSignal, EngineConfig, EngineMode, SlangEngine};

const CONFIG_PATH: &str = "slang_config.json";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn load_candidates(path: &Path) -> anyhow::Result<Vec<CandidateSignal>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates from {}", path.display()))?;
    let candidates: Vec<CandidateSignal> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse candidates in {}", path.display()))?;
    Ok(candidates)
}

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::load_or_init(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    let candidates_path = env_or("SLANG_CANDIDATES", "candidates.json");
    let seed = env_or("SLANG_SEED", "slang-engine");
    let sources: Vec<String> = env_or("SLANG_SOURCES", "batch")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let candidates = load_candidates(Path::new(&candidates_path))?;
    info!(
        candidates = candidates.len(),
        path = %candidates_path,
        %seed,
        "Starting slang engine cycle"
    );

    // ── 2. One full cycle ────────────────────────────────────────────────
    let session = EngineSession::new(SlangEngine::new(config), EngineMode::Open);
    let now = Utc::now();

    let open = session.run(
        ModeParams::Open(OpenParams {
            candidate_signals: candidates,
            seed: seed.clone(),
            noise_threshold: None,
        }),
        now,
    )?;
    if let ModeOutput::Open(out) = &open {
        for rejected in &out.rejected {
            info!(term = %rejected.term, reasons = %rejected.reasons, "Candidate rejected");
        }
    }

    session.run(ModeParams::Align(AlignParams { seed: seed.clone() }), now)?;
    session.run(ModeParams::Ascend(AscendParams::default()), now)?;
    session.run(ModeParams::Clear(ClearParams {}), now)?;
    let sealed = session.run(
        ModeParams::Seal(SealParams {
            seed,
            sources,
            version: None,
        }),
        now,
    )?;

    // ── 3. Report ────────────────────────────────────────────────────────
    let ModeOutput::Seal(seal) = sealed else {
        anyhow::bail!("SEAL produced an unexpected output");
    };
    println!("{}", serde_json::to_string_pretty(&seal.ledger_entry)?);

    info!(
        hash = %seal.ledger_entry.hash,
        active = seal.ledger_entry.active_count,
        archived = seal.ledger_entry.archived_count,
        "Cycle sealed"
    );

    Ok(())
}

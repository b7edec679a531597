// =============================================================================
// Engine Configuration — tunable thresholds with atomic save
// =============================================================================
//
// Every engine-wide tunable lives here.  Per-class decay constants are NOT
// configurable; they belong to the `SignalClass` profile table.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_noise_threshold() -> f64 {
    0.15
}

fn default_adoption_threshold() -> f64 {
    0.8
}

fn default_resurrection_threshold_pct() -> f64 {
    60.0
}

fn default_forecast_horizon_days() -> u32 {
    30
}

fn default_trend_characteristic_days() -> f64 {
    60.0
}

fn default_seal_version() -> String {
    "1.0.0".to_string()
}

fn default_frequency_index() -> f64 {
    0.5
}

fn default_observation_count() -> u32 {
    1
}

fn default_cross_domain_count() -> u32 {
    1
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the slang engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Validation ---------------------------------------------------------

    /// Minimum signal strength for the noise gate, unless OPEN overrides it.
    #[serde(default = "default_noise_threshold")]
    pub noise_threshold: f64,

    /// Run the adoption gate in batch validation.  Off: the engine does not
    /// promote signals.
    #[serde(default)]
    pub enable_adoption_gate: bool,

    /// Weighted score the adoption gate requires when enabled.
    #[serde(default = "default_adoption_threshold")]
    pub adoption_threshold: f64,

    // --- Lifecycle ----------------------------------------------------------

    /// Pressure increase (percent) that makes an archived signal eligible
    /// for resurrection.
    #[serde(default = "default_resurrection_threshold_pct")]
    pub resurrection_threshold_pct: f64,

    // --- Forecast hooks -----------------------------------------------------

    /// ASCEND projection horizon when the caller does not pass one.
    #[serde(default = "default_forecast_horizon_days")]
    pub forecast_horizon_days: u32,

    /// Characteristic time of the pressure-trend projection.  Shared by all
    /// classes and independent of signal half-lives.
    #[serde(default = "default_trend_characteristic_days")]
    pub trend_characteristic_days: f64,

    // --- Seal ---------------------------------------------------------------

    /// Version stamped onto provenance records when SEAL gets none.
    #[serde(default = "default_seal_version")]
    pub seal_version: String,

    // --- Candidate defaults -------------------------------------------------

    /// Frequency index assumed for candidates that omit it.
    #[serde(default = "default_frequency_index")]
    pub default_frequency_index: f64,

    /// Observation count assumed for candidates that omit it.
    #[serde(default = "default_observation_count")]
    pub default_observation_count: u32,

    /// Cross-domain count assumed for candidates that omit it.
    #[serde(default = "default_cross_domain_count")]
    pub default_cross_domain_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_threshold: default_noise_threshold(),
            enable_adoption_gate: false,
            adoption_threshold: default_adoption_threshold(),
            resurrection_threshold_pct: default_resurrection_threshold_pct(),
            forecast_horizon_days: default_forecast_horizon_days(),
            trend_characteristic_days: default_trend_characteristic_days(),
            seal_version: default_seal_version(),
            default_frequency_index: default_frequency_index(),
            default_observation_count: default_observation_count(),
            default_cross_domain_count: default_cross_domain_count(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            noise_threshold = config.noise_threshold,
            adoption_gate = config.enable_adoption_gate,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Load `path`, or write the defaults there first when the file is absent.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }
}

// =============================================================================
// Narrative Debt Index — aggregate stress from unspoken-load signals
// =============================================================================
//
//   total_load      = sum(|pressure| x strength)   over unspoken_load signals
//   normalized_load = total_load / count
//   stress_level    = normalized_load x min(1, count / 10)
//
// Stress needs volume as well as intensity.  The strongest 20% (at least one)
// are listed as critical.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kernel::weighted_pressure;
use crate::signals::SlangSignal;
use crate::types::SignalClass;

const VOLUME_SATURATION: f64 = 10.0;
const CRITICAL_SHARE: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeDebtIndex {
    pub total_load: f64,
    pub normalized_load: f64,
    pub stress_level: f64,
    pub signal_count: usize,
    /// Terms of the strongest unspoken-load signals, strongest first.
    pub critical_signals: Vec<String>,
    pub computed_at: Option<DateTime<Utc>>,
}

pub fn narrative_debt(active: &[SlangSignal], now: DateTime<Utc>) -> NarrativeDebtIndex {
    let mut load: Vec<&SlangSignal> = active
        .iter()
        .filter(|s| s.class == SignalClass::UnspokenLoad)
        .collect();

    if load.is_empty() {
        return NarrativeDebtIndex {
            computed_at: Some(now),
            ..NarrativeDebtIndex::default()
        };
    }

    let count = load.len();
    let total_load: f64 = load.iter().map(|s| weighted_pressure(s)).sum();
    let normalized_load = total_load / count as f64;
    let stress_level = normalized_load * (count as f64 / VOLUME_SATURATION).min(1.0);

    load.sort_by(|a, b| {
        b.signal_strength
            .total_cmp(&a.signal_strength)
            .then_with(|| a.term.cmp(&b.term))
    });
    let critical_count = ((count as f64 * CRITICAL_SHARE).floor() as usize).max(1);
    let critical_signals = load
        .iter()
        .take(critical_count)
        .map(|s| s.term.clone())
        .collect();

    NarrativeDebtIndex {
        total_load,
        normalized_load,
        stress_level,
        signal_count: count,
        critical_signals,
        computed_at: Some(now),
    }
}

// =============================================================================
// Oracle Modulation — suggested confidence delta for the forecaster
// =============================================================================
//
//   class_pressure[c] = mean(|pressure| x strength) over class c
//   adjustment        = clamp(-0.05 UL - 0.03 CD - 0.02 MI, -0.1, 0.1)
//   debt_influence    = min(1, sum(class_pressure) / 3)
//
// The external system is never touched; callers decide whether to apply it.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kernel::{group_by_class, weighted_pressure};
use crate::signals::model::clamp_unit;
use crate::signals::SlangSignal;
use crate::types::SignalClass;

const MAX_ADJUSTMENT: f64 = 0.1;

/// Metrics reported by the external forecasting system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleMetrics {
    /// The forecaster's own confidence, if it wants an adjusted figure back.
    #[serde(default)]
    pub base_confidence: Option<f64>,
    /// Opaque extra metrics, carried for the audit trail.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// Advisory modulation derived from the active signal set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleModulation {
    pub class_pressures: BTreeMap<SignalClass, f64>,
    pub confidence_adjustment: f64,
    pub narrative_debt_influence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_confidence: Option<f64>,
    pub reasoning: String,
}

pub fn modulate_confidence(metrics: &OracleMetrics, active: &[SlangSignal]) -> OracleModulation {
    let class_pressures: BTreeMap<SignalClass, f64> = group_by_class(active)
        .into_iter()
        .map(|(class, members)| {
            let total: f64 = members.iter().map(|s| weighted_pressure(s)).sum();
            (class, total / members.len() as f64)
        })
        .collect();

    let pressure = |class| class_pressures.get(&class).copied().unwrap_or(0.0);
    let unspoken = pressure(SignalClass::UnspokenLoad);
    let drift = pressure(SignalClass::CognitiveDrift);
    let inflation = pressure(SignalClass::MeaningInflation);

    let confidence_adjustment = (-0.05 * unspoken - 0.03 * drift - 0.02 * inflation)
        .clamp(-MAX_ADJUSTMENT, MAX_ADJUSTMENT);

    let total: f64 = class_pressures.values().sum();
    let narrative_debt_influence = (total / 3.0).min(1.0);

    let adjusted_confidence = metrics
        .base_confidence
        .map(|base| clamp_unit(base + confidence_adjustment));

    let reasoning = format!(
        "unspoken_load={:.3} cognitive_drift={:.3} meaning_inflation={:.3} -> adjustment {:+.4}",
        unspoken, drift, inflation, confidence_adjustment
    );

    OracleModulation {
        class_pressures,
        confidence_adjustment,
        narrative_debt_influence,
        adjusted_confidence,
        reasoning,
    }
}

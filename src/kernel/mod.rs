// =============================================================================
// Kernel Hooks — read-only aggregations for the forecasting consumer
// =============================================================================
//
// Nothing in here mutates signals.  Outputs are advisory:
// - Oracle confidence modulation (suggested delta, never applied here)
// - Drift alerts (per-class population spikes vs a prior snapshot)
// - Narrative debt index (aggregate unspoken-load stress)
// - Memetic pressure trends (fixed-curve projection per class)

pub mod drift;
pub mod modulation;
pub mod narrative_debt;
pub mod trends;

use std::collections::BTreeMap;

use crate::signals::{PressureModel, SlangSignal};
use crate::types::SignalClass;

pub use drift::{drift_alerts, ClassSnapshot, DriftAlert, DriftSeverity};
pub use modulation::{modulate_confidence, OracleMetrics, OracleModulation};
pub use narrative_debt::{narrative_debt, NarrativeDebtIndex};
pub use trends::{pressure_trends, MemeticPressureTrend, TREND_CHARACTERISTIC_DAYS};

/// Signals grouped by class, classes in taxonomy order.
pub(crate) fn group_by_class(signals: &[SlangSignal]) -> BTreeMap<SignalClass, Vec<&SlangSignal>> {
    let mut groups: BTreeMap<SignalClass, Vec<&SlangSignal>> = BTreeMap::new();
    for signal in signals {
        groups.entry(signal.class).or_default().push(signal);
    }
    groups
}

/// Pressure magnitude weighted by strength.
pub(crate) fn weighted_pressure(signal: &SlangSignal) -> f64 {
    PressureModel::magnitude(&signal.pressure_vector) * signal.signal_strength
}

// =============================================================================
// Memetic Pressure Trends — per-class forecast curves
// =============================================================================
//
// Current pressure per class is the strength-weighted mean magnitude.  The
// projection is a plain exponential with a shared 60-day characteristic time:
//
//   p(d) = current * exp(-d / 60),   d = 0 ..= horizon
//
// The curve does not use per-signal half-lives.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::kernel::{group_by_class, weighted_pressure};
use crate::signals::PressureModel;
use crate::signals::SlangSignal;
use crate::types::SignalClass;

/// Characteristic time (days) of the projection curve.
pub const TREND_CHARACTERISTIC_DAYS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeticPressureTrend {
    pub class: SignalClass,
    pub signal_count: usize,
    pub current_pressure: f64,
    pub horizon_days: u32,
    /// Projected pressure for each day `0..=horizon_days`.
    pub projection: Vec<f64>,
    /// Day of the maximum, when it is not day 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_day: Option<u32>,
    pub peak_pressure: f64,
}

pub fn pressure_trends(
    active: &[SlangSignal],
    horizon_days: u32,
    characteristic_days: f64,
) -> Vec<MemeticPressureTrend> {
    group_by_class(active)
        .into_iter()
        .map(|(class, members)| {
            let strength_sum: f64 = members.iter().map(|s| s.signal_strength).sum();
            let current_pressure = if strength_sum > 0.0 {
                members.iter().map(|s| weighted_pressure(s)).sum::<f64>() / strength_sum
            } else {
                members
                    .iter()
                    .map(|s| PressureModel::magnitude(&s.pressure_vector))
                    .sum::<f64>()
                    / members.len() as f64
            };

            let projection: Vec<f64> = (0..=horizon_days)
                .map(|d| current_pressure * (-(d as f64) / characteristic_days).exp())
                .collect();

            let (peak_idx, peak_pressure) = projection.iter().copied().enumerate().fold(
                (0usize, f64::NEG_INFINITY),
                |best, (i, p)| if p > best.1 { (i, p) } else { best },
            );

            MemeticPressureTrend {
                class,
                signal_count: members.len(),
                current_pressure,
                horizon_days,
                projection,
                peak_day: (peak_idx > 0).then_some(peak_idx as u32),
                peak_pressure,
            }
        })
        .collect()
}

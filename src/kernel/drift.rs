// =============================================================================
// Drift Alerts — per-class population spikes against a prior snapshot
// =============================================================================
//
// For each class present in the prior snapshot:
//
//   change_pct = (current - prior) / prior * 100
//
// Increases of 10% or more raise an alert, banded:
//   low [10, 25)   medium [25, 50)   high [50, 100)   critical [100, inf)
//
// Decreases never alert.  Classes with a zero prior count are skipped.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::signals::SlangSignal;
use crate::types::SignalClass;

const ALERT_MIN_PCT: f64 = 10.0;

// =============================================================================
// Types
// =============================================================================

/// Per-class signal counts at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub class_counts: BTreeMap<SignalClass, usize>,
}

impl ClassSnapshot {
    /// Count `signals` by class.
    pub fn capture(signals: &[SlangSignal], now: DateTime<Utc>) -> Self {
        let mut class_counts = BTreeMap::new();
        for signal in signals {
            *class_counts.entry(signal.class).or_insert(0) += 1;
        }
        Self {
            captured_at: Some(now),
            class_counts,
        }
    }

    pub fn count(&self, class: SignalClass) -> usize {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }
}

/// Severity band of a drift alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DriftSeverity {
    /// Band for a percentage increase; `None` below the alert floor.
    pub fn from_change_pct(pct: f64) -> Option<Self> {
        if pct >= 100.0 {
            Some(Self::Critical)
        } else if pct >= 50.0 {
            Some(Self::High)
        } else if pct >= 25.0 {
            Some(Self::Medium)
        } else if pct >= ALERT_MIN_PCT {
            Some(Self::Low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Early warning that a class population is spiking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAlert {
    pub class: SignalClass,
    pub previous_count: usize,
    pub current_count: usize,
    pub change_pct: f64,
    pub severity: DriftSeverity,
    pub detected_at: DateTime<Utc>,
    pub message: String,
}

// =============================================================================
// Detection
// =============================================================================

pub fn drift_alerts(
    active: &[SlangSignal],
    prior: Option<&ClassSnapshot>,
    now: DateTime<Utc>,
) -> Vec<DriftAlert> {
    let Some(prior) = prior else {
        return Vec::new();
    };

    let current = ClassSnapshot::capture(active, now);
    let mut alerts = Vec::new();

    for class in SignalClass::ALL {
        let previous_count = prior.count(class);
        if previous_count == 0 {
            continue;
        }
        let current_count = current.count(class);
        let change_pct =
            (current_count as f64 - previous_count as f64) / previous_count as f64 * 100.0;

        let Some(severity) = DriftSeverity::from_change_pct(change_pct) else {
            continue;
        };

        debug!(%class, previous_count, current_count, change_pct, %severity, "drift alert");

        alerts.push(DriftAlert {
            class,
            previous_count,
            current_count,
            change_pct,
            severity,
            detected_at: now,
            message: format!(
                "{} rose {:.1}% ({} -> {} signals)",
                class, change_pct, previous_count, current_count
            ),
        });
    }

    alerts
}

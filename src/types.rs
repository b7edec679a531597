// =============================================================================
// Shared types used across the slang signal engine
// =============================================================================
//
// The signal taxonomy is closed: six classes, each carrying a fixed decay and
// validation profile.  Anything outside the taxonomy fails at construction
// (`FromStr`) rather than silently falling back to a default class.
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// =============================================================================
// Signal taxonomy
// =============================================================================

/// Taxonomy tag of a slang signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalClass {
    /// Carried stress nobody names out loud.
    UnspokenLoad,
    /// Attention and reasoning sliding off course.
    CognitiveDrift,
    /// Skipping rituals that used to anchor behaviour.
    RitualAvoidance,
    /// Words losing meaning through overuse.
    MeaningInflation,
    /// Status signalling squeezed into shorter forms.
    StatusCompression,
    /// Losing track of time at scale.
    TemporalFugue,
}

/// Per-class constants driving decay and archival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProfile {
    /// Default half-life in days for new signals of this class.
    pub halflife_days: f64,
    /// Decayed strength below which an old signal is archived.
    pub archive_threshold: f64,
    /// Upper bound on the cross-domain survival multiplier.
    pub max_cross_domain_multiplier: f64,
}

impl SignalClass {
    /// Every class, in taxonomy order.
    pub const ALL: [SignalClass; 6] = [
        Self::UnspokenLoad,
        Self::CognitiveDrift,
        Self::RitualAvoidance,
        Self::MeaningInflation,
        Self::StatusCompression,
        Self::TemporalFugue,
    ];

    /// Decay / validation profile for this class.
    pub fn profile(self) -> ClassProfile {
        let (halflife_days, archive_threshold, max_cross_domain_multiplier) = match self {
            // Deep structural stress lingers longest.
            Self::UnspokenLoad => (120.0, 0.10, 2.5),
            Self::CognitiveDrift => (60.0, 0.12, 2.0),
            Self::RitualAvoidance => (90.0, 0.10, 2.0),
            // Inflated words burn out fast.
            Self::MeaningInflation => (30.0, 0.15, 1.5),
            Self::StatusCompression => (45.0, 0.12, 1.8),
            Self::TemporalFugue => (75.0, 0.10, 2.2),
        };
        ClassProfile {
            halflife_days,
            archive_threshold,
            max_cross_domain_multiplier,
        }
    }

    /// Snake-case taxonomy tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnspokenLoad => "unspoken_load",
            Self::CognitiveDrift => "cognitive_drift",
            Self::RitualAvoidance => "ritual_avoidance",
            Self::MeaningInflation => "meaning_inflation",
            Self::StatusCompression => "status_compression",
            Self::TemporalFugue => "temporal_fugue",
        }
    }
}

impl Default for SignalClass {
    fn default() -> Self {
        Self::MeaningInflation
    }
}

impl std::fmt::Display for SignalClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == tag)
            .ok_or_else(|| EngineError::UnknownClass(s.to_string()))
    }
}

// =============================================================================
// Operating modes
// =============================================================================

/// The five operating modes of the engine cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EngineMode {
    Open,
    Align,
    Ascend,
    Clear,
    Seal,
}

impl Default for EngineMode {
    fn default() -> Self {
        Self::Open
    }
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Align => write!(f, "ALIGN"),
            Self::Ascend => write!(f, "ASCEND"),
            Self::Clear => write!(f, "CLEAR"),
            Self::Seal => write!(f, "SEAL"),
        }
    }
}

impl FromStr for EngineMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "ALIGN" => Ok(Self::Align),
            "ASCEND" => Ok(Self::Ascend),
            "CLEAR" => Ok(Self::Clear),
            "SEAL" => Ok(Self::Seal),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_parses_taxonomy_tags() {
        for class in SignalClass::ALL {
            assert_eq!(class.as_str().parse::<SignalClass>().unwrap(), class);
        }
        assert_eq!(
            " Unspoken_Load ".parse::<SignalClass>().unwrap(),
            SignalClass::UnspokenLoad
        );
    }

    #[test]
    fn unknown_class_is_an_error() {
        let err = "vibe_shift".parse::<SignalClass>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownClass(ref s) if s == "vibe_shift"));
    }

    #[test]
    fn every_profile_has_positive_halflife() {
        for class in SignalClass::ALL {
            let p = class.profile();
            assert!(p.halflife_days > 0.0);
            assert!(p.archive_threshold > 0.0 && p.archive_threshold < 1.0);
            assert!(p.max_cross_domain_multiplier >= 1.0);
        }
    }

    #[test]
    fn class_serialises_as_snake_case() {
        let json = serde_json::to_string(&SignalClass::TemporalFugue).unwrap();
        assert_eq!(json, "\"temporal_fugue\"");
        let back: SignalClass = serde_json::from_str("\"status_compression\"").unwrap();
        assert_eq!(back, SignalClass::StatusCompression);
    }

    #[test]
    fn mode_names_round_trip() {
        for name in ["OPEN", "align", "Ascend", "CLEAR", "seal"] {
            let mode: EngineMode = name.parse().unwrap();
            assert_eq!(mode.to_string(), name.to_uppercase());
        }
        assert!(matches!(
            "DANCE".parse::<EngineMode>(),
            Err(EngineError::UnknownMode(_))
        ));
    }

    #[test]
    fn default_class_is_meaning_inflation() {
        assert_eq!(SignalClass::default(), SignalClass::MeaningInflation);
        assert_eq!(EngineMode::default(), EngineMode::Open);
    }
}

// =============================================================================
// Signal Model — pressure vectors, slang signals, archived signals, candidates
// =============================================================================
//
// `SlangSignal` is the central entity.  Derived fields (strength, confidence,
// novelty) are only ever written by the processor and the OPEN pipeline;
// `CandidateSignal` is the untrusted, partially-filled shape that arrives from
// upstream and deliberately has no slots for them.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SignalClass;

/// Clamp into [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// PressureVector
// =============================================================================

/// Five-dimensional stress decomposition of a signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureVector {
    #[serde(default)]
    pub cognitive: f64,
    #[serde(default)]
    pub social: f64,
    #[serde(default)]
    pub economic: f64,
    #[serde(default)]
    pub temporal: f64,
    #[serde(default)]
    pub identity: f64,
}

impl PressureVector {
    /// Dimension names, in component order.
    pub const DIMENSIONS: [&'static str; 5] =
        ["cognitive", "social", "economic", "temporal", "identity"];

    /// Build a vector with every component clamped to [0, 1].
    pub fn new(cognitive: f64, social: f64, economic: f64, temporal: f64, identity: f64) -> Self {
        Self::from_components([cognitive, social, economic, temporal, identity])
    }

    /// Build from components in `DIMENSIONS` order, clamping each to [0, 1].
    pub fn from_components(c: [f64; 5]) -> Self {
        Self {
            cognitive: clamp_unit(c[0]),
            social: clamp_unit(c[1]),
            economic: clamp_unit(c[2]),
            temporal: clamp_unit(c[3]),
            identity: clamp_unit(c[4]),
        }
    }

    /// Components in `DIMENSIONS` order.
    pub fn components(&self) -> [f64; 5] {
        [
            self.cognitive,
            self.social,
            self.economic,
            self.temporal,
            self.identity,
        ]
    }

    /// Same vector with every component forced into [0, 1].
    pub fn clamped(&self) -> Self {
        Self::from_components(self.components())
    }
}

// =============================================================================
// SlangSignal
// =============================================================================

/// Links to external oracle / memetic identifiers.  Carried, never read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReferences {
    #[serde(default)]
    pub oracle_refs: Vec<String>,
    #[serde(default)]
    pub memetic_refs: Vec<String>,
}

/// One observed linguistic / behavioural signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlangSignal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical lowercase term.
    pub term: String,

    pub class: SignalClass,

    /// Compressed meaning; length and density are policed by the compression
    /// gate, not by this type.
    pub definition: String,

    #[serde(default)]
    pub origin_context: String,

    #[serde(default)]
    pub symptoms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hygiene: Option<Vec<String>>,

    pub pressure_vector: PressureVector,

    /// Observed frequency in [0, 1].
    pub frequency_index: f64,

    /// Derived: frequency x pressure x novelty, normalised to [0, 1].  After
    /// CLEAR this holds the decayed value.
    pub signal_strength: f64,

    /// Undecayed strength, recorded by CLEAR once `signal_strength` holds a
    /// decayed value.  Decay always starts from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_strength: Option<f64>,

    /// Derived: Bayesian-style confidence in [0, 1].
    pub confidence: f64,

    /// Derived: distance from the existing corpus in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novelty: Option<f64>,

    pub timestamp_first_seen: DateTime<Utc>,

    /// Always > 0.
    pub decay_halflife_days: f64,

    pub last_updated: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_references: Option<CrossReferences>,

    #[serde(default)]
    pub archived: bool,

    /// Set only when the signal is resurrected from the archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
}

impl SlangSignal {
    /// Fresh signal with derived fields zeroed and the class half-life.
    pub fn new(
        term: impl Into<String>,
        class: SignalClass,
        definition: impl Into<String>,
        pressure_vector: PressureVector,
        frequency_index: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            term: term.into().trim().to_lowercase(),
            class,
            definition: definition.into(),
            origin_context: String::new(),
            symptoms: Vec::new(),
            hygiene: None,
            pressure_vector: pressure_vector.clamped(),
            frequency_index: clamp_unit(frequency_index),
            signal_strength: 0.0,
            base_strength: None,
            confidence: 0.0,
            novelty: None,
            timestamp_first_seen: now,
            decay_halflife_days: class.profile().halflife_days,
            last_updated: now,
            cross_references: None,
            archived: false,
            lineage: None,
        }
    }

    /// Identity key: term plus optional id.
    pub fn same_identity(&self, term: &str, id: Option<&str>) -> bool {
        self.term == term && self.id.as_deref() == id
    }

    /// Days elapsed from first sighting to `now`, never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.timestamp_first_seen).num_milliseconds() as f64 / 1000.0;
        (secs / 86_400.0).max(0.0)
    }
}

// =============================================================================
// ArchivedSignal
// =============================================================================

/// A signal moved out of the active set by the decay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedSignal {
    #[serde(flatten)]
    pub signal: SlangSignal,
    pub archive_timestamp: DateTime<Utc>,
    pub archive_reason: String,
}

// =============================================================================
// CandidateSignal
// =============================================================================

/// Untrusted, partially-filled signal record as supplied to OPEN.
///
/// Any `signal_strength` / `confidence` / `novelty` keys in the incoming JSON
/// are dropped on deserialisation: the engine always recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSignal {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Raw class tag; validated against the taxonomy in OPEN.
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub origin_context: Option<String>,
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub hygiene: Option<Vec<String>>,
    #[serde(default)]
    pub pressure_vector: Option<PressureVector>,
    #[serde(default)]
    pub frequency_index: Option<f64>,
    #[serde(default)]
    pub timestamp_first_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decay_halflife_days: Option<f64>,
    #[serde(default)]
    pub observation_count: Option<u32>,
    #[serde(default)]
    pub cross_domain_count: Option<u32>,
    #[serde(default)]
    pub cross_references: Option<CrossReferences>,
}

impl CandidateSignal {
    /// Minimal candidate with a term, class tag and definition.
    pub fn new(term: &str, class: SignalClass, definition: &str) -> Self {
        Self {
            term: Some(term.to_string()),
            class: Some(class.as_str().to_string()),
            definition: Some(definition.to_string()),
            ..Self::default()
        }
    }
}

// =============================================================================
// Pressure Model — magnitude and deterministic derivation
// =============================================================================
//
// When a candidate arrives without a measured pressure vector, one is derived
// from SHA-256 over (term, seed).  Each dimension hashes the base digest with
// its own suffix, so components are independent and reproducible across runs
// and processes.
// =============================================================================

use sha2::{Digest, Sha256};

use crate::signals::model::PressureVector;

/// Theoretical maximum magnitude of a vector in [0, 1]^5.
pub const MAX_MAGNITUDE: f64 = 2.236_067_977_499_79;

/// SHA-256 digest of `term` followed by `seed`.
pub fn seeded_digest(term: &str, seed: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(term.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.finalize().into()
}

/// Map the first four bytes of a digest into [0, 1].
fn unit_from_digest(digest: &[u8]) -> f64 {
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word as f64 / u32::MAX as f64
}

pub struct PressureModel;

impl PressureModel {
    /// Euclidean norm of the five components.  Inputs are not range-checked.
    pub fn magnitude(vector: &PressureVector) -> f64 {
        vector.components().iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Deterministic pressure vector for `(term, seed)`.
    pub fn derive(term: &str, seed: &str) -> PressureVector {
        let base = hex::encode(seeded_digest(term, seed));

        let mut components = [0.0; 5];
        for (slot, dimension) in components.iter_mut().zip(PressureVector::DIMENSIONS) {
            let mut hasher = Sha256::new();
            hasher.update(base.as_bytes());
            hasher.update(b"_");
            hasher.update(dimension.as_bytes());
            *slot = unit_from_digest(&hasher.finalize());
        }

        PressureVector::from_components(components)
    }
}

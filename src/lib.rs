//! Commitment core for chain-verified tile puzzles.
//!
//! An image is split into tiles by an external producer; this crate turns an
//! ordered tile arrangement into a single verifiable fingerprint, compares
//! the player's arrangement against the answer registered at generation
//! time, and (behind the `attest` feature) has a trusted service recompute
//! and sign the fingerprint before it is submitted on-chain.

use blake3::Hasher as Blake3Hasher;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub mod commitment;
pub mod error;
pub mod fingerprint;
pub mod session;
pub mod verify;

#[cfg(feature = "attest")]
pub mod attest;

pub use commitment::FingerprintVector;
pub use error::CommitError;
pub use fingerprint::{tile_fingerprint, AggregateFingerprint, Tile, TileFingerprint, DIGEST_LEN};
pub use session::{
    AttestationTicket, Grid, PuzzleSeed, PuzzleSeedBuilder, PuzzleSession, SessionError,
    SolutionSubmission,
};
pub use verify::{is_solved, verify_vector_strict};

/// Enum defining the digest backends usable for tile fingerprinting.
///
/// Every backend emits 32 bytes so fingerprints stay fixed-size regardless
/// of which one a session is configured with. `Keccak256` is the canonical
/// choice: it is what the on-chain verifier recomputes.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FingerprintAlgorithm {
    Keccak256,
    Sha2_256,
    Blake3,
}

impl Default for FingerprintAlgorithm {
    fn default() -> Self {
        Self::Keccak256
    }
}

impl FingerprintAlgorithm {
    /// Calculates the Keccak-256 digest of the given data.
    pub fn calculate_keccak256(data: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Calculates the SHA-256 digest of the given data.
    pub fn calculate_sha2_256(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Calculates the BLAKE3 digest of the given data.
    pub fn calculate_blake3(data: &[u8]) -> [u8; 32] {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Calculates the digest based on the selected algorithm.
    pub fn calculate(&self, data: &[u8]) -> [u8; 32] {
        match self {
            Self::Keccak256 => Self::calculate_keccak256(data),
            Self::Sha2_256 => Self::calculate_sha2_256(data),
            Self::Blake3 => Self::calculate_blake3(data),
        }
    }
}

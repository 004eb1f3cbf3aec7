use crate::attest::server::AttestError;
use crate::session::Grid;
use crate::FingerprintAlgorithm;

/// Request body sent to the attestation service: one field, the hex-encoded
/// concatenation of the per-tile fingerprints in positional order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttestRequest {
    pub payload: String,
}

/// Response body: the hex-encoded 65-byte signature over the aggregate the
/// service recomputed itself.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttestResponse {
    pub signature: String,
}

/// Configuration for the attestation service.
///
/// `grids` is the set of puzzle dimensions the service issues; a submitted
/// vector whose tile count matches none of them is rejected as tampered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub algorithm: FingerprintAlgorithm,
    pub grids: Vec<Grid>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            algorithm: FingerprintAlgorithm::Keccak256,
            grids: (0..=8).map(Grid::for_level).collect(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), AttestError> {
        if self.grids.is_empty() {
            return Err(AttestError::InvalidConfig(
                "at least one puzzle grid must be configured".into(),
            ));
        }
        Ok(())
    }

    /// Whether a vector of `tile_count` fingerprints matches an issued grid.
    pub fn allows(&self, tile_count: usize) -> bool {
        self.grids.iter().any(|grid| grid.tile_count() == tile_count)
    }
}

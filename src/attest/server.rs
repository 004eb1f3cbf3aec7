use crate::attest::client::decode_payload;
use crate::attest::signer::{AttestationSigner, SignerError};
use crate::attest::types::{AttestRequest, AttestResponse, ServiceConfig};
use crate::error::CommitError;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    #[error("attestation payload is empty")]
    EmptyPayload,
    #[error("attestation payload is not valid hex: {0}")]
    InvalidHex(String),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("vector of {actual} fingerprints does not match any issued puzzle")]
    UnknownTileCount { actual: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// The trusted attestation service.
///
/// Never trusts a client-supplied aggregate: the raw fingerprint vector is
/// decoded, validated against the issued grids, and the aggregate is
/// recomputed here before anything is signed. The signing key lives behind
/// the injected [`AttestationSigner`] and is held by this service alone.
pub struct AttestationService<S: AttestationSigner> {
    config: ServiceConfig,
    signer: Arc<S>,
}

impl<S> AttestationService<S>
where
    S: AttestationSigner + 'static,
{
    pub fn new(config: ServiceConfig, signer: Arc<S>) -> Result<Self, AttestError> {
        config.validate()?;
        Ok(Self { config, signer })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle one attestation request.
    ///
    /// Input failures (empty payload, malformed hex, ragged vector, tile
    /// count matching no issued puzzle) come back as errors and produce no
    /// signature; only a well-formed vector is aggregated and signed.
    pub fn attest(&self, request: &AttestRequest) -> Result<AttestResponse, AttestError> {
        let payload = request.payload.trim();
        if payload.is_empty() || payload == "0x" {
            tracing::warn!("rejected attestation request with empty payload");
            return Err(AttestError::EmptyPayload);
        }

        let vector = decode_payload(payload)?;
        if !self.config.allows(vector.len()) {
            tracing::warn!(tiles = vector.len(), "rejected vector for unknown grid");
            return Err(AttestError::UnknownTileCount {
                actual: vector.len(),
            });
        }

        let aggregate = vector.aggregate(self.config.algorithm);
        let attestation = self.signer.sign(&aggregate)?;
        tracing::info!(
            tiles = vector.len(),
            aggregate = %aggregate,
            "signed solution aggregate"
        );
        Ok(AttestResponse {
            signature: attestation.to_hex(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attest::client::{build_request, encode_payload};
    use crate::attest::signer::{verify_attestation, Attestation, Secp256k1Signer};
    use crate::commitment::FingerprintVector;
    use crate::fingerprint::Tile;
    use crate::session::Grid;
    use crate::FingerprintAlgorithm;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn service() -> AttestationService<Secp256k1Signer> {
        let signer = Arc::new(Secp256k1Signer::from_hex(DEV_KEY).unwrap());
        AttestationService::new(ServiceConfig::default(), signer).unwrap()
    }

    fn solved_vector() -> FingerprintVector {
        let tiles: Vec<Tile> = ["t1", "t2", "t3", "t4"].iter().map(|c| Tile::from(*c)).collect();
        FingerprintVector::from_tiles(FingerprintAlgorithm::Keccak256, &tiles).unwrap()
    }

    #[test]
    fn rejects_empty_payload() {
        let service = service();
        for payload in ["", "   ", "0x"] {
            let err = service
                .attest(&AttestRequest {
                    payload: payload.into(),
                })
                .expect_err("empty payload");
            assert!(matches!(err, AttestError::EmptyPayload));
        }
    }

    #[test]
    fn rejects_malformed_hex() {
        let err = service()
            .attest(&AttestRequest {
                payload: "0xnothex".into(),
            })
            .expect_err("not hex");
        assert!(matches!(err, AttestError::InvalidHex(_)));
    }

    #[test]
    fn rejects_ragged_vector() {
        let err = service()
            .attest(&AttestRequest {
                payload: format!("0x{}", "ab".repeat(33)),
            })
            .expect_err("33 bytes is not a whole fingerprint");
        assert!(matches!(
            err,
            AttestError::Commit(CommitError::MalformedEncoding { len: 33 })
        ));
    }

    #[test]
    fn rejects_tile_count_matching_no_issued_puzzle() {
        let err = service()
            .attest(&AttestRequest {
                payload: format!("0x{}", "ab".repeat(32 * 5)),
            })
            .expect_err("5 tiles matches no grid");
        assert!(matches!(
            err,
            AttestError::UnknownTileCount { actual: 5 }
        ));
    }

    #[test]
    fn signs_recomputed_aggregate() {
        let service = service();
        let signer = Secp256k1Signer::from_hex(DEV_KEY).unwrap();
        let vector = solved_vector();

        let response = service.attest(&build_request(&vector)).unwrap();
        let attestation = Attestation::from_hex(&response.signature).unwrap();
        let aggregate = vector.aggregate(FingerprintAlgorithm::Keccak256);
        assert!(verify_attestation(
            &signer.public_key_sec1(),
            &aggregate,
            &attestation
        ));
    }

    #[test]
    fn signature_covers_position_order() {
        let service = service();
        let signer = Secp256k1Signer::from_hex(DEV_KEY).unwrap();
        let vector = solved_vector();

        let swapped_tiles: Vec<Tile> =
            ["t2", "t1", "t3", "t4"].iter().map(|c| Tile::from(*c)).collect();
        let swapped =
            FingerprintVector::from_tiles(FingerprintAlgorithm::Keccak256, &swapped_tiles).unwrap();

        let response = service
            .attest(&AttestRequest {
                payload: encode_payload(&swapped),
            })
            .unwrap();
        let attestation = Attestation::from_hex(&response.signature).unwrap();

        // The signature binds the swapped arrangement, not the solved one.
        let solved_aggregate = vector.aggregate(FingerprintAlgorithm::Keccak256);
        let swapped_aggregate = swapped.aggregate(FingerprintAlgorithm::Keccak256);
        assert!(verify_attestation(
            &signer.public_key_sec1(),
            &swapped_aggregate,
            &attestation
        ));
        assert!(!verify_attestation(
            &signer.public_key_sec1(),
            &solved_aggregate,
            &attestation
        ));
    }

    #[test]
    fn restricted_config_narrows_accepted_grids() {
        let signer = Arc::new(Secp256k1Signer::from_hex(DEV_KEY).unwrap());
        let config = ServiceConfig {
            algorithm: FingerprintAlgorithm::Keccak256,
            grids: vec![Grid::new(3, 3).unwrap()],
        };
        let service = AttestationService::new(config, signer).unwrap();

        let err = service
            .attest(&build_request(&solved_vector()))
            .expect_err("2x2 vector against a 3x3-only service");
        assert!(matches!(err, AttestError::UnknownTileCount { actual: 4 }));
    }

    #[test]
    fn full_check_and_submit_flow() {
        use crate::session::{PuzzleSeedBuilder, SessionError};

        let service = service();
        let signer = Secp256k1Signer::from_hex(DEV_KEY).unwrap();
        let tiles: Vec<Tile> = ["t1", "t2", "t3", "t4"].iter().map(|c| Tile::from(*c)).collect();
        let mut session = PuzzleSeedBuilder::default()
            .grid(Grid::new(2, 2).unwrap())
            .tiles(tiles)
            .build_validated()
            .unwrap();

        // Shuffled state: the comparator gates the whole submit flow.
        session.swap(0, 1).unwrap();
        assert!(!session.check());
        assert!(matches!(
            session.begin_attestation(),
            Err(SessionError::NotSolved)
        ));

        // Restored: check passes, attest, verify, submit.
        session.swap(0, 1).unwrap();
        assert!(session.check());

        let ticket = session.begin_attestation().unwrap();
        let response = service
            .attest(&build_request(&session.fingerprint_vector()))
            .unwrap();
        let attestation = Attestation::from_hex(&response.signature).unwrap();
        assert!(verify_attestation(
            &signer.public_key_sec1(),
            &session.current_fingerprint(),
            &attestation
        ));

        let submission = session
            .complete_attestation(ticket, attestation.as_bytes().to_vec())
            .unwrap();
        assert_eq!(submission.tile_fingerprints.len(), 4);
    }

    #[test]
    fn construction_fails_on_invalid_config() {
        let signer = Arc::new(Secp256k1Signer::from_hex(DEV_KEY).unwrap());
        let config = ServiceConfig {
            algorithm: FingerprintAlgorithm::Keccak256,
            grids: Vec::new(),
        };
        assert!(AttestationService::new(config, signer).is_err());
    }
}

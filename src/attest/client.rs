use crate::attest::server::AttestError;
use crate::attest::types::AttestRequest;
use crate::commitment::FingerprintVector;

/// Hex-encode the canonical fingerprint concatenation for the wire,
/// `0x`-prefixed the way the on-chain tooling packs `bytes32[]`.
pub fn encode_payload(vector: &FingerprintVector) -> String {
    format!("0x{}", hex::encode(vector.encode()))
}

/// Decode a wire payload back into a fingerprint vector.
///
/// Tolerates a missing `0x` prefix; everything else is strict, so the
/// server ends up with exactly the bytes the client concatenated.
pub fn decode_payload(payload: &str) -> Result<FingerprintVector, AttestError> {
    let stripped = payload.strip_prefix("0x").unwrap_or(payload);
    let bytes = hex::decode(stripped).map_err(|e| AttestError::InvalidHex(e.to_string()))?;
    Ok(FingerprintVector::decode(&bytes)?)
}

/// Build the attestation request for a solved arrangement.
pub fn build_request(vector: &FingerprintVector) -> AttestRequest {
    AttestRequest {
        payload: encode_payload(vector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Tile;
    use crate::FingerprintAlgorithm;

    fn vector() -> FingerprintVector {
        let tiles: Vec<Tile> = ["t1", "t2"].iter().map(|c| Tile::from(*c)).collect();
        FingerprintVector::from_tiles(FingerprintAlgorithm::Keccak256, &tiles).unwrap()
    }

    #[test]
    fn payload_round_trip() {
        let vector = vector();
        let payload = encode_payload(&vector);
        assert!(payload.starts_with("0x"));
        assert_eq!(payload.len(), 2 + vector.len() * 64);
        assert_eq!(decode_payload(&payload).unwrap(), vector);
    }

    #[test]
    fn decode_tolerates_missing_prefix() {
        let vector = vector();
        let bare = encode_payload(&vector).trim_start_matches("0x").to_string();
        assert_eq!(decode_payload(&bare).unwrap(), vector);
    }

    #[test]
    fn build_request_carries_the_payload() {
        let vector = vector();
        let request = build_request(&vector);
        assert_eq!(request.payload, encode_payload(&vector));
    }
}

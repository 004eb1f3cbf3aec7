use crate::error::CommitError;
use crate::fingerprint::{tile_fingerprint, AggregateFingerprint, Tile, TileFingerprint, DIGEST_LEN};
use crate::FingerprintAlgorithm;

/// The ordered fingerprint vector for one arrangement.
///
/// Order is the point: fingerprints sit at the position of the tile they
/// were computed from, so swapping two tiles changes the vector even though
/// the multiset of fingerprints does not. Nothing here sorts or dedups.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FingerprintVector {
    fingerprints: Vec<TileFingerprint>,
}

impl FingerprintVector {
    /// Fingerprint every tile of an arrangement, in positional order.
    ///
    /// An empty arrangement is invalid and fails fast here, before any tile
    /// reaches the canonicalizer.
    pub fn from_tiles(
        algorithm: FingerprintAlgorithm,
        tiles: &[Tile],
    ) -> Result<Self, CommitError> {
        if tiles.is_empty() {
            return Err(CommitError::EmptyArrangement);
        }
        let fingerprints = tiles
            .iter()
            .map(|tile| tile_fingerprint(algorithm, tile))
            .collect();
        Ok(Self { fingerprints })
    }

    /// Wrap an already-computed fingerprint sequence.
    pub fn from_fingerprints(fingerprints: Vec<TileFingerprint>) -> Result<Self, CommitError> {
        if fingerprints.is_empty() {
            return Err(CommitError::EmptyArrangement);
        }
        Ok(Self { fingerprints })
    }

    pub fn fingerprints(&self) -> &[TileFingerprint] {
        &self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Canonical byte encoding: each 32-byte fingerprint back-to-back, in
    /// positional order. This is the exact payload the attestation service
    /// receives and the layout the on-chain verifier packs itself.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.fingerprints.len() * DIGEST_LEN);
        for fingerprint in &self.fingerprints {
            out.extend_from_slice(fingerprint.as_bytes());
        }
        out
    }

    /// Strict inverse of [`encode`](Self::encode), used on the service side.
    ///
    /// Rejects empty input and any length that is not a whole number of
    /// 32-byte fingerprints.
    pub fn decode(bytes: &[u8]) -> Result<Self, CommitError> {
        if bytes.is_empty() {
            return Err(CommitError::EmptyArrangement);
        }
        if bytes.len() % DIGEST_LEN != 0 {
            return Err(CommitError::MalformedEncoding { len: bytes.len() });
        }
        let fingerprints = bytes
            .chunks_exact(DIGEST_LEN)
            .map(|chunk| {
                let mut fp = [0u8; DIGEST_LEN];
                fp.copy_from_slice(chunk);
                TileFingerprint(fp)
            })
            .collect();
        Ok(Self { fingerprints })
    }

    /// Derive the aggregate fingerprint: one hash pass over the canonical
    /// encoding, using the same algorithm that fingerprinted the tiles.
    pub fn aggregate(&self, algorithm: FingerprintAlgorithm) -> AggregateFingerprint {
        AggregateFingerprint(algorithm.calculate(&self.encode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(contents: &[&str]) -> Vec<Tile> {
        contents.iter().map(|c| Tile::from(*c)).collect()
    }

    #[test]
    fn from_tiles_rejects_empty_arrangement() {
        let err = FingerprintVector::from_tiles(FingerprintAlgorithm::Keccak256, &[])
            .expect_err("empty arrangement must be rejected");
        assert_eq!(err, CommitError::EmptyArrangement);
    }

    #[test]
    fn encode_preserves_positional_order() {
        let vector = FingerprintVector::from_tiles(
            FingerprintAlgorithm::Keccak256,
            &tiles(&["t1", "t2", "t3"]),
        )
        .unwrap();
        let encoded = vector.encode();
        assert_eq!(encoded.len(), 3 * DIGEST_LEN);

        for (i, fingerprint) in vector.fingerprints().iter().enumerate() {
            assert_eq!(
                &encoded[i * DIGEST_LEN..(i + 1) * DIGEST_LEN],
                fingerprint.as_bytes()
            );
        }
    }

    #[test]
    fn decode_is_strict_inverse_of_encode() {
        let vector = FingerprintVector::from_tiles(
            FingerprintAlgorithm::Keccak256,
            &tiles(&["t1", "t2", "t3", "t4"]),
        )
        .unwrap();
        let decoded = FingerprintVector::decode(&vector.encode()).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn decode_rejects_empty_and_partial_fingerprints() {
        let err = FingerprintVector::decode(&[]).expect_err("empty payload");
        assert_eq!(err, CommitError::EmptyArrangement);

        let err = FingerprintVector::decode(&[0u8; DIGEST_LEN + 5]).expect_err("ragged payload");
        assert_eq!(
            err,
            CommitError::MalformedEncoding {
                len: DIGEST_LEN + 5
            }
        );
    }

    #[test]
    fn aggregate_is_hash_of_concatenation() {
        let algorithm = FingerprintAlgorithm::Keccak256;
        let vector =
            FingerprintVector::from_tiles(algorithm, &tiles(&["t1", "t2"])).unwrap();
        let expected = algorithm.calculate(&vector.encode());
        assert_eq!(vector.aggregate(algorithm).0, expected);
    }

    #[test]
    fn swapping_positions_changes_aggregate() {
        let algorithm = FingerprintAlgorithm::Keccak256;
        let solved =
            FingerprintVector::from_tiles(algorithm, &tiles(&["t1", "t2", "t3", "t4"])).unwrap();
        let swapped =
            FingerprintVector::from_tiles(algorithm, &tiles(&["t2", "t1", "t3", "t4"])).unwrap();

        // Same multiset of fingerprints, different positions.
        let mut lhs: Vec<_> = solved.fingerprints().to_vec();
        let mut rhs: Vec<_> = swapped.fingerprints().to_vec();
        lhs.sort_by_key(|fp| *fp.as_bytes());
        rhs.sort_by_key(|fp| *fp.as_bytes());
        assert_eq!(lhs, rhs);

        assert_ne!(solved.aggregate(algorithm), swapped.aggregate(algorithm));
    }

    #[test]
    fn duplicate_content_yields_equal_fingerprints() {
        let vector = FingerprintVector::from_tiles(
            FingerprintAlgorithm::Keccak256,
            &tiles(&["same", "same"]),
        )
        .unwrap();
        assert_eq!(vector.fingerprints()[0], vector.fingerprints()[1]);
    }

    #[test]
    fn content_change_changes_aggregate() {
        let algorithm = FingerprintAlgorithm::Keccak256;
        let original =
            FingerprintVector::from_tiles(algorithm, &tiles(&["t1", "t2"])).unwrap();
        let tampered =
            FingerprintVector::from_tiles(algorithm, &tiles(&["t1", "t2-tampered"])).unwrap();
        assert_ne!(original.aggregate(algorithm), tampered.aggregate(algorithm));
    }
}

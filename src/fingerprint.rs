use crate::FingerprintAlgorithm;
use std::fmt::{Display, Formatter};

/// Length in bytes of every fingerprint, per-tile and aggregate alike.
pub const DIGEST_LEN: usize = 32;

/// One puzzle piece, treated as opaque bytes.
///
/// Identity is bit-for-bit content equality; how the bytes were produced
/// (image splitting, test fixtures) is the producer's business. A tile is
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tile(Vec<u8>);

impl Tile {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Tile {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Tile {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

/// Fingerprint of a single tile's content. Positional context is carried by
/// the vector it sits in, never by the fingerprint itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileFingerprint(pub [u8; DIGEST_LEN]);

impl TileFingerprint {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// `0x`-prefixed hex, the form the on-chain collaborator consumes.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Display for TileFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Fingerprint of a whole ordered arrangement.
///
/// A pure function of the positional fingerprint vector; equality of two of
/// these is exactly "same tiles in the same order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AggregateFingerprint(pub [u8; DIGEST_LEN]);

impl AggregateFingerprint {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Display for AggregateFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Canonicalize one tile: hash its raw bytes with the session algorithm.
///
/// Pure and total for any byte content; zero-tile puzzles are rejected
/// upstream before individual tiles are ever fingerprinted.
pub fn tile_fingerprint(algorithm: FingerprintAlgorithm, tile: &Tile) -> TileFingerprint {
    TileFingerprint(algorithm.calculate(tile.as_bytes()))
}

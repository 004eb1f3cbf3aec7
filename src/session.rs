//! One puzzle instance: the arrangement, its answer fingerprint, and the
//! attestation handshake that guards the submit flow.

use crate::commitment::FingerprintVector;
use crate::error::CommitError;
use crate::fingerprint::{AggregateFingerprint, Tile, TileFingerprint};
use crate::verify::{is_solved, verify_vector_strict};
use crate::FingerprintAlgorithm;
use derive_builder::Builder;
use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid puzzle seed: {0}")]
    InvalidSeed(String),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("tile index {index} out of bounds for {count} tiles")]
    IndexOutOfBounds { index: usize, count: usize },
    #[error("arrangement does not match the answer")]
    NotSolved,
    #[error("an attestation request is already in flight")]
    AttestationInFlight,
    #[error("attestation response is stale: arrangement changed since the request")]
    StaleAttestation,
    #[error("ticket does not belong to an in-flight attestation")]
    UnknownTicket,
}

/// Puzzle dimensions, fixed for the life of one puzzle instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Result<Self, CommitError> {
        if rows == 0 || cols == 0 {
            return Err(CommitError::EmptyArrangement);
        }
        Ok(Self { rows, cols })
    }

    /// Grid for a game level: a level-`n` puzzle is (n+2) x (n+2) tiles.
    pub fn for_level(level: u32) -> Self {
        let side = level as usize + 2;
        Self {
            rows: side,
            cols: side,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Inputs for one puzzle instance, as handed over by the image splitter.
///
/// `tiles` must be in solved order: the answer fingerprint is registered
/// from it before any shuffling happens.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
pub struct PuzzleSeed {
    pub grid: Grid,
    #[builder(default)]
    pub algorithm: FingerprintAlgorithm,
    pub tiles: Vec<Tile>,
}

impl PuzzleSeedBuilder {
    /// Build the seed and open a session in one step.
    pub fn build_validated(self) -> Result<PuzzleSession, SessionError> {
        let seed = self
            .build()
            .map_err(|e| SessionError::InvalidSeed(e.to_string()))?;
        PuzzleSession::open(seed)
    }
}

/// Ticket identifying one in-flight attestation request.
///
/// Issued by [`PuzzleSession::begin_attestation`] and redeemed when the
/// response arrives; a response whose ticket no longer matches the session
/// epoch is discarded rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationTicket {
    epoch: u64,
}

/// What the on-chain collaborator consumes: the positional tile
/// fingerprints and the attestation signature over their aggregate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolutionSubmission {
    pub tile_fingerprints: Vec<TileFingerprint>,
    pub signature: Vec<u8>,
}

/// A single puzzle session owning its arrangement and answer.
///
/// The answer fingerprint is computed exactly once, in [`open`], through the
/// same `FingerprintVector` path every later check uses. All mutation goes
/// through `swap`/`shuffle`, which bump the session epoch so downstream
/// consumers can never observe a fingerprint for a stale arrangement.
#[derive(Debug)]
pub struct PuzzleSession {
    grid: Grid,
    algorithm: FingerprintAlgorithm,
    tiles: Vec<Tile>,
    answer: AggregateFingerprint,
    epoch: u64,
    in_flight: Option<u64>,
}

impl PuzzleSession {
    pub fn open(seed: PuzzleSeed) -> Result<Self, SessionError> {
        let vector = FingerprintVector::from_tiles(seed.algorithm, &seed.tiles)?;
        verify_vector_strict(&vector, seed.grid)?;
        let answer = vector.aggregate(seed.algorithm);
        Ok(Self {
            grid: seed.grid,
            algorithm: seed.algorithm,
            tiles: seed.tiles,
            answer,
            epoch: 0,
            in_flight: None,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The answer fingerprint registered at generation time. Immutable for
    /// the life of this session.
    pub fn answer_fingerprint(&self) -> AggregateFingerprint {
        self.answer
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Swap the tiles at two positions. Swapping a position with itself
    /// leaves the arrangement untouched.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), SessionError> {
        let count = self.tiles.len();
        for index in [a, b] {
            if index >= count {
                return Err(SessionError::IndexOutOfBounds { index, count });
            }
        }
        if a == b {
            return Ok(());
        }
        self.tiles.swap(a, b);
        self.epoch += 1;
        Ok(())
    }

    /// Fisher-Yates shuffle of the arrangement, after the answer has been
    /// registered. The RNG is caller-supplied so tests stay deterministic.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.tiles.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.tiles.swap(i, j);
        }
        self.epoch += 1;
    }

    /// Positional fingerprint vector for the current arrangement.
    pub fn fingerprint_vector(&self) -> FingerprintVector {
        FingerprintVector::from_tiles(self.algorithm, &self.tiles)
            .expect("session holds at least one tile")
    }

    /// Aggregate fingerprint of the current arrangement, recomputed on
    /// every call, never cached across moves.
    pub fn current_fingerprint(&self) -> AggregateFingerprint {
        self.fingerprint_vector().aggregate(self.algorithm)
    }

    /// Explicit check action: the sole comparator gate for the submit flow.
    pub fn check(&self) -> bool {
        is_solved(&self.current_fingerprint(), &self.answer)
    }

    /// Start an attestation round trip for the current (solved) arrangement.
    ///
    /// Refuses while unsolved and while another request is in flight, so two
    /// signatures over possibly different arrangements can never race.
    pub fn begin_attestation(&mut self) -> Result<AttestationTicket, SessionError> {
        if !self.check() {
            return Err(SessionError::NotSolved);
        }
        if self.in_flight.is_some() {
            return Err(SessionError::AttestationInFlight);
        }
        self.in_flight = Some(self.epoch);
        Ok(AttestationTicket { epoch: self.epoch })
    }

    /// Redeem an attestation response into a submission for the chain.
    ///
    /// If the arrangement mutated while the request was in flight the
    /// response is discarded with `StaleAttestation`; the in-flight slot is
    /// cleared either way so the player can retry from scratch.
    pub fn complete_attestation(
        &mut self,
        ticket: AttestationTicket,
        signature: Vec<u8>,
    ) -> Result<SolutionSubmission, SessionError> {
        if self.in_flight != Some(ticket.epoch) {
            return Err(SessionError::UnknownTicket);
        }
        self.in_flight = None;
        if ticket.epoch != self.epoch {
            return Err(SessionError::StaleAttestation);
        }
        Ok(SolutionSubmission {
            tile_fingerprints: self.fingerprint_vector().fingerprints().to_vec(),
            signature,
        })
    }

    /// Drop an in-flight request after a transport failure so a fresh
    /// check-and-submit flow can start.
    pub fn abandon_attestation(&mut self, ticket: AttestationTicket) -> Result<(), SessionError> {
        if self.in_flight != Some(ticket.epoch) {
            return Err(SessionError::UnknownTicket);
        }
        self.in_flight = None;
        Ok(())
    }
}

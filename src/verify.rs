use crate::commitment::FingerprintVector;
use crate::error::CommitError;
use crate::fingerprint::AggregateFingerprint;
use crate::session::Grid;

/// Compare the current aggregate against the registered answer.
///
/// Exact byte equality, no tolerance. `false` means "not solved yet" and is
/// a normal outcome, not an error; input failures surface as `CommitError`
/// long before this point.
pub fn is_solved(current: &AggregateFingerprint, answer: &AggregateFingerprint) -> bool {
    current.as_bytes() == answer.as_bytes()
}

/// Validate a fingerprint vector against the grid it claims to solve.
///
/// Callers at trust boundaries reject vectors whose length disagrees with
/// the declared rows x cols before deriving anything from them.
pub fn verify_vector_strict(vector: &FingerprintVector, grid: Grid) -> Result<(), CommitError> {
    if vector.is_empty() {
        return Err(CommitError::EmptyArrangement);
    }
    let expected = grid.tile_count();
    if vector.len() != expected {
        return Err(CommitError::TileCountMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

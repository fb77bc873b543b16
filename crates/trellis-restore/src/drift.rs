//! Generation-drift classification.
//!
//! Generations are opaque per-object counters bumped by the remote API on
//! every accepted spec mutation; only the difference against the recorded
//! baseline carries meaning.

use crate::error::DriftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftOutcome {
    /// The object was not modified after the snapshot; nothing to recover.
    Unchanged,
    /// Exactly one uncaptured mutation happened; restoring is safe.
    SafeToApply,
    /// More than one change happened since the snapshot. Restoring could
    /// discard legitimate intervening changes; a human has to decide.
    ManualRequired,
}

pub fn classify(original: i64, current: i64) -> Result<DriftOutcome, DriftError> {
    match current - original {
        delta if delta < 0 => Err(DriftError::GenerationRegression { original, current }),
        0 => Ok(DriftOutcome::Unchanged),
        1 => Ok(DriftOutcome::SafeToApply),
        _ => Ok(DriftOutcome::ManualRequired),
    }
}

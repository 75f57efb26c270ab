use thiserror::Error;

use crate::core::segment::Segment;
use crate::store::StoreError;

/// Failures surfaced by wheel operations. None of them are fatal: the widget
/// keeps running with whatever is in memory.
#[derive(Debug, Error)]
pub enum WheelError {
    /// Fewer than two segments when a spin or save was requested; nothing mutated.
    #[error("at least 2 segments are required (found {found})")]
    TooFewSegments { found: usize },
    /// Editing was attempted while a spin or its result handling is in flight.
    #[error("wheel is busy spinning")]
    Busy,
    #[error("segment index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// The store rejected a write; the in-memory change is kept.
    #[error("saving segments failed: {0}")]
    Persistence(#[from] StoreError),
    /// Auto-remove took the winner off the wheel but the store refused the
    /// new list. The removal stands in memory.
    #[error("removed '{}' ({remaining} left) but saving failed: {source}", .segment.text)]
    RemovalNotSaved {
        segment: Segment,
        remaining: usize,
        #[source]
        source: StoreError,
    },
}

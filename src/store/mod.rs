//! Segment persistence. The wheel only needs `load`/`save`; what sits behind
//! them (a JSON file, memory, a remote endpoint) is up to the implementor.

mod json_file;

pub use json_file::JsonFileStore;

use std::path::PathBuf;

use bevy::log::{info, warn};
use rand::Rng;
use thiserror::Error;

use crate::core::segment::{normalize_records, sample_segments, Segment, SegmentRecord, MIN_SEGMENTS};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: invalid segment data: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode segments: {0}")]
    Encode(#[from] serde_json::Error),
    /// Backend refused the write (e.g. a remote store answering "bad request").
    #[error("store rejected write: {0}")]
    Rejected(String),
}

pub trait SegmentStore {
    /// Raw records as persisted; `Ok(None)` when nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<SegmentRecord>>, StoreError>;
    /// Replaces the persisted list (last write wins).
    fn save(&mut self, segments: &[Segment]) -> Result<(), StoreError>;
    /// Persisted auto-remove preference; `Ok(None)` when never set.
    fn load_auto_remove(&self) -> Result<Option<bool>, StoreError>;
    fn save_auto_remove(&mut self, enabled: bool) -> Result<(), StoreError>;
}

/// Keeps segments in memory only. Useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Option<Vec<Segment>>,
    saves: usize,
    auto_remove: Option<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            saved: Some(segments),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Option<&[Segment]> {
        self.saved.as_deref()
    }

    /// Number of successful segment `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn auto_remove(&self) -> Option<bool> {
        self.auto_remove
    }
}

impl SegmentStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<SegmentRecord>>, StoreError> {
        Ok(self
            .saved
            .as_ref()
            .map(|segs| segs.iter().map(SegmentRecord::from).collect()))
    }

    fn save(&mut self, segments: &[Segment]) -> Result<(), StoreError> {
        self.saved = Some(segments.to_vec());
        self.saves += 1;
        Ok(())
    }

    fn load_auto_remove(&self) -> Result<Option<bool>, StoreError> {
        Ok(self.auto_remove)
    }

    fn save_auto_remove(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.auto_remove = Some(enabled);
        Ok(())
    }
}

enum Stored {
    Usable(Vec<Segment>),
    TooFew(usize),
    Unreadable,
}

fn read_stored<S, R>(store: &S, rng: &mut R) -> Stored
where
    S: SegmentStore + ?Sized,
    R: Rng + ?Sized,
{
    match store.load() {
        Ok(Some(records)) => {
            let segments = normalize_records(records, rng);
            if segments.len() >= MIN_SEGMENTS {
                Stored::Usable(segments)
            } else {
                Stored::TooFew(segments.len())
            }
        }
        Ok(None) => Stored::TooFew(0),
        Err(e) => {
            warn!(target: "wheel", "loading segments failed, using sample wheel: {e}");
            Stored::Unreadable
        }
    }
}

/// Loads and normalizes the persisted wheel. When the store is empty or holds
/// fewer than two segments the sample wheel is seeded and saved. A store that
/// cannot be read yields the sample wheel but is left untouched.
pub fn load_segments<S, R>(store: &mut S, rng: &mut R) -> Vec<Segment>
where
    S: SegmentStore + ?Sized,
    R: Rng + ?Sized,
{
    match read_stored(store, rng) {
        Stored::Usable(segments) => {
            info!(target: "wheel", "loaded {} segments", segments.len());
            segments
        }
        Stored::Unreadable => sample_segments(),
        Stored::TooFew(found) => {
            let sample = sample_segments();
            info!(
                target: "wheel",
                "store held {found} usable segments; seeding sample wheel ({} segments)",
                sample.len()
            );
            if let Err(e) = store.save(&sample) {
                warn!(target: "wheel", "saving sample wheel failed: {e}");
            }
            sample
        }
    }
}

/// Same result as [`load_segments`] without ever writing to the store.
pub fn peek_segments<S, R>(store: &S, rng: &mut R) -> Vec<Segment>
where
    S: SegmentStore + ?Sized,
    R: Rng + ?Sized,
{
    match read_stored(store, rng) {
        Stored::Usable(segments) => segments,
        Stored::TooFew(_) | Stored::Unreadable => sample_segments(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_store_is_seeded_with_sample() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        let segs = load_segments(&mut store, &mut rng);
        assert_eq!(segs, sample_segments());
        assert_eq!(store.saved(), Some(sample_segments().as_slice()));
    }

    #[test]
    fn single_segment_falls_back_to_sample() {
        let mut store = MemoryStore::with_segments(vec![Segment::new("x", "Only", "#000000", 0.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(load_segments(&mut store, &mut rng).len(), 4);
    }

    #[test]
    fn stored_segments_are_kept() {
        let segs = vec![
            Segment::new("a", "A", "#ff0000", 10.0),
            Segment::new("b", "B", "#00ff00", 0.0),
        ];
        let mut store = MemoryStore::with_segments(segs.clone());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(load_segments(&mut store, &mut rng), segs);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn peeking_an_empty_store_does_not_seed_it() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(peek_segments(&store, &mut rng), sample_segments());
        assert!(store.saved().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn auto_remove_flag_is_remembered() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load_auto_remove().unwrap(), None);
        store.save_auto_remove(true).unwrap();
        assert_eq!(store.load_auto_remove().unwrap(), Some(true));
        store.save_auto_remove(false).unwrap();
        assert_eq!(store.auto_remove(), Some(false));
    }
}

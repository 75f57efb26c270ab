//! Session state: the segment list, the wheel's rotation and the spin phase.
//!
//! The spin runs as an explicit state machine driven from outside:
//!
//! ```text
//! Idle -> Decelerating -> Settling -> AwaitingAck -> Idle
//!                                          \-> Removing -> Idle   (auto-remove)
//! ```
//!
//! `advance(now_ms)` is a pure function of the current phase and the clock;
//! all randomness is drawn in `spin`. Anything other than `Idle` counts as
//! busy: spin requests are dropped and edits are refused, which also keeps
//! auto-removal strictly after the result is final.

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::angle::norm_angle;
use crate::core::config::WheelConfig;
use crate::core::palette::pick_new_color;
use crate::core::segment::{clamp_weight, new_segment_id, sample_segments, Segment, MIN_SEGMENTS};
use crate::store::SegmentStore;
use crate::wheel::animator::SpinTrajectory;
use crate::wheel::error::WheelError;
use crate::wheel::geometry::WheelGeometry;
use crate::wheel::selector::choose_index;

/// Final result of a spin, resolved from the rendered rest angle.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub index: usize,
    pub label: String,
    pub segment_id: String,
    /// Index the selector drew; always equal to `index` unless the geometry is broken.
    pub target_index: usize,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinPhase {
    Idle,
    Decelerating {
        trajectory: SpinTrajectory,
        started_ms: f64,
    },
    Settling {
        trajectory: SpinTrajectory,
        started_ms: f64,
    },
    /// Result is final and waiting for the user to dismiss it.
    AwaitingAck { outcome: SpinOutcome },
    /// Auto-remove pending for the acknowledged winner.
    Removing { outcome: SpinOutcome },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinStart {
    Started(SpinTrajectory),
    /// A spin is already in flight; the request was dropped.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    SettleStarted { end: f64 },
    SpinCompleted(SpinOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    Removed { segment: Segment, remaining: usize },
    /// The wheel is already at the minimum size.
    Skipped { remaining: usize },
}

#[derive(Debug, Clone, Resource)]
pub struct WheelState {
    segments: Vec<Segment>,
    rotation: f64,
    phase: SpinPhase,
    auto_remove: bool,
    pointer_angle: f64,
}

impl WheelState {
    pub fn new(segments: Vec<Segment>, cfg: &WheelConfig) -> Self {
        Self {
            segments,
            rotation: 0.0,
            phase: SpinPhase::Idle,
            auto_remove: cfg.auto_remove,
            pointer_angle: cfg.pointer_angle,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Rotation to hand to the renderer (radians, unbounded).
    pub fn current_rotation(&self) -> f64 {
        self.rotation
    }

    pub fn phase(&self) -> &SpinPhase {
        &self.phase
    }

    /// The wheel is moving (decelerating or settling).
    pub fn is_spinning(&self) -> bool {
        matches!(
            self.phase,
            SpinPhase::Decelerating { .. } | SpinPhase::Settling { .. }
        )
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, SpinPhase::Idle)
    }

    pub fn is_removing(&self) -> bool {
        matches!(self.phase, SpinPhase::Removing { .. })
    }

    /// Outcome waiting for acknowledgement, if any.
    pub fn pending_outcome(&self) -> Option<&SpinOutcome> {
        match &self.phase {
            SpinPhase::AwaitingAck { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn auto_remove(&self) -> bool {
        self.auto_remove
    }

    /// Overrides the configured auto-remove flag, e.g. with a stored preference.
    pub fn with_auto_remove(mut self, enabled: bool) -> Self {
        self.auto_remove = enabled;
        self
    }

    /// Toggles auto-remove and stores the preference. The flag is applied even
    /// when the store refuses it.
    pub fn set_auto_remove<S: SegmentStore + ?Sized>(
        &mut self,
        enabled: bool,
        store: &mut S,
    ) -> Result<(), WheelError> {
        self.auto_remove = enabled;
        store.save_auto_remove(enabled).map_err(|e| {
            warn!(target: "wheel", "saving auto-remove preference failed: {e}");
            WheelError::Persistence(e)
        })
    }

    pub fn pointer_angle(&self) -> f64 {
        self.pointer_angle
    }

    pub fn geometry(&self) -> WheelGeometry {
        WheelGeometry::new(self.segments.len(), self.pointer_angle)
    }

    /// Segment currently under the pointer.
    pub fn index_under_pointer(&self) -> Option<usize> {
        self.geometry().index_from_rotation(self.rotation)
    }

    // ---------------- Spin lifecycle -----------------

    /// Draws a winner and plans the trajectory. Requests while busy are
    /// ignored without touching any state.
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        now_ms: f64,
        cfg: &WheelConfig,
        rng: &mut R,
    ) -> Result<SpinStart, WheelError> {
        if !self.is_idle() {
            debug!(target: "wheel", "spin request ignored: wheel busy ({:?})", self.phase_name());
            return Ok(SpinStart::Ignored);
        }
        let n = self.segments.len();
        if n < MIN_SEGMENTS {
            return Err(WheelError::TooFewSegments { found: n });
        }
        let target = choose_index(&self.segments, rng).ok_or(WheelError::TooFewSegments { found: n })?;
        let start = norm_angle(self.rotation);
        let trajectory =
            SpinTrajectory::plan(&self.geometry(), start, target, &cfg.spin, &cfg.settle, rng)?;
        self.rotation = start;
        self.phase = SpinPhase::Decelerating {
            trajectory,
            started_ms: now_ms,
        };
        info!(
            target: "wheel",
            "spin started: target={} '{}' turns={} duration={:.0}ms settle={:.0}ms",
            target,
            self.segments[target].text,
            trajectory.spin.extra_turns,
            trajectory.spin.duration_ms,
            trajectory.settle.duration_ms
        );
        Ok(SpinStart::Started(trajectory))
    }

    /// Moves the animation to `now_ms`. Call once per frame with a monotonic clock.
    pub fn advance(&mut self, now_ms: f64) -> Option<WheelEvent> {
        let phase = std::mem::replace(&mut self.phase, SpinPhase::Idle);
        let (next, event) = match phase {
            SpinPhase::Decelerating {
                trajectory,
                started_ms,
            } => {
                let t = trajectory.spin.progress(now_ms - started_ms);
                if t >= 1.0 {
                    self.rotation = trajectory.spin.end;
                    (
                        SpinPhase::Settling {
                            trajectory,
                            started_ms: now_ms,
                        },
                        Some(WheelEvent::SettleStarted {
                            end: trajectory.spin.end,
                        }),
                    )
                } else {
                    self.rotation = trajectory.spin.rotation_at(t);
                    (
                        SpinPhase::Decelerating {
                            trajectory,
                            started_ms,
                        },
                        None,
                    )
                }
            }
            SpinPhase::Settling {
                trajectory,
                started_ms,
            } => {
                let elapsed = (now_ms - started_ms).max(0.0);
                self.rotation = trajectory.settle.rotation_at(elapsed);
                if trajectory.settle.is_finished(elapsed) {
                    let outcome = self.resolve_outcome(trajectory.spin.target_index);
                    (
                        SpinPhase::AwaitingAck {
                            outcome: outcome.clone(),
                        },
                        Some(WheelEvent::SpinCompleted(outcome)),
                    )
                } else {
                    (
                        SpinPhase::Settling {
                            trajectory,
                            started_ms,
                        },
                        None,
                    )
                }
            }
            other => (other, None),
        };
        self.phase = next;
        event
    }

    fn resolve_outcome(&self, target_index: usize) -> SpinOutcome {
        // the rendered angle is authoritative, not the drawn index
        let index = self.index_under_pointer().unwrap_or(target_index);
        if index != target_index {
            warn!(
                target: "wheel",
                "rest angle resolved to segment {index}, selector drew {target_index}"
            );
        }
        let (label, segment_id) = self
            .segments
            .get(index)
            .map(|s| (s.text.clone(), s.id.clone()))
            .unwrap_or_default();
        info!(target: "wheel", "spin complete: winner={index} '{label}'");
        SpinOutcome {
            index,
            label,
            segment_id,
            target_index,
            rotation: self.rotation,
        }
    }

    /// Dismisses the shown result. With auto-remove on, the wheel moves to
    /// `Removing` and waits for [`finish_removal`](Self::finish_removal).
    pub fn acknowledge(&mut self) -> Option<SpinOutcome> {
        let phase = std::mem::replace(&mut self.phase, SpinPhase::Idle);
        match phase {
            SpinPhase::AwaitingAck { outcome } => {
                if self.auto_remove {
                    self.phase = SpinPhase::Removing {
                        outcome: outcome.clone(),
                    };
                }
                Some(outcome)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Deletes the acknowledged winner and persists the list. Returns
    /// `Ok(None)` when no removal is pending. The wheel is idle afterwards even
    /// if the save fails; the removal is kept and reported through
    /// [`WheelError::RemovalNotSaved`].
    pub fn finish_removal<S: SegmentStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<Option<RemovalOutcome>, WheelError> {
        let outcome = match std::mem::replace(&mut self.phase, SpinPhase::Idle) {
            SpinPhase::Removing { outcome } => outcome,
            other => {
                self.phase = other;
                return Ok(None);
            }
        };
        let len = self.segments.len();
        if len <= MIN_SEGMENTS {
            info!(target: "wheel", "auto-remove skipped: only {len} segments left");
            return Ok(Some(RemovalOutcome::Skipped { remaining: len }));
        }
        let idx = self
            .segments
            .iter()
            .position(|s| s.id == outcome.segment_id)
            .unwrap_or(outcome.index);
        if idx >= len {
            return Ok(Some(RemovalOutcome::Skipped { remaining: len }));
        }
        let segment = self.segments.remove(idx);
        info!(target: "wheel", "auto-removed '{}' ({} left)", segment.text, self.segments.len());
        let remaining = self.segments.len();
        if let Err(source) = store.save(&self.segments) {
            warn!(target: "wheel", "saving segments failed (kept in memory): {source}");
            return Err(WheelError::RemovalNotSaved {
                segment,
                remaining,
                source,
            });
        }
        Ok(Some(RemovalOutcome::Removed {
            segment,
            remaining,
        }))
    }

    /// Short phase label for logs.
    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            SpinPhase::Idle => "Idle",
            SpinPhase::Decelerating { .. } => "Decelerating",
            SpinPhase::Settling { .. } => "Settling",
            SpinPhase::AwaitingAck { .. } => "AwaitingAck",
            SpinPhase::Removing { .. } => "Removing",
        }
    }

    // ---------------- Editing -----------------

    fn ensure_idle(&self) -> Result<(), WheelError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(WheelError::Busy)
        }
    }

    fn check_index(&self, index: usize) -> Result<(), WheelError> {
        if index < self.segments.len() {
            Ok(())
        } else {
            Err(WheelError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            })
        }
    }

    fn persist<S: SegmentStore + ?Sized>(&self, store: &mut S) -> Result<(), WheelError> {
        store.save(&self.segments).map_err(|e| {
            warn!(target: "wheel", "saving segments failed (kept in memory): {e}");
            WheelError::Persistence(e)
        })
    }

    /// Removes a segment and persists the new list. A failed save keeps the removal.
    pub fn remove_segment<S: SegmentStore + ?Sized>(
        &mut self,
        index: usize,
        store: &mut S,
    ) -> Result<Segment, WheelError> {
        self.ensure_idle()?;
        self.check_index(index)?;
        let removed = self.segments.remove(index);
        self.persist(store)?;
        Ok(removed)
    }

    /// Appends a segment with a fresh id, an unused palette color and no
    /// weight, then persists. A failed save keeps the new segment.
    pub fn add_segment<R, S>(
        &mut self,
        text: impl Into<String>,
        rng: &mut R,
        store: &mut S,
    ) -> Result<&Segment, WheelError>
    where
        R: Rng + ?Sized,
        S: SegmentStore + ?Sized,
    {
        self.ensure_idle()?;
        let mut id = new_segment_id(rng);
        while self.segments.iter().any(|s| s.id == id) {
            id = new_segment_id(rng);
        }
        let color = pick_new_color(self.segments.iter().map(|s| s.color.as_str()), rng);
        self.segments.push(Segment::new(id, text, color, 0.0));
        self.persist(store)?;
        Ok(&self.segments[self.segments.len() - 1])
    }

    // Field edits stay in memory until `save`.

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), WheelError> {
        self.ensure_idle()?;
        self.check_index(index)?;
        self.segments[index].text = text.into();
        Ok(())
    }

    pub fn set_color(&mut self, index: usize, color: impl Into<String>) -> Result<(), WheelError> {
        self.ensure_idle()?;
        self.check_index(index)?;
        self.segments[index].color = color.into();
        Ok(())
    }

    /// Weight is clamped into `[0, 100]`; non-numbers become 0.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<(), WheelError> {
        self.ensure_idle()?;
        self.check_index(index)?;
        self.segments[index].weight = clamp_weight(weight);
        Ok(())
    }

    pub fn set_segments(&mut self, segments: Vec<Segment>) -> Result<(), WheelError> {
        self.ensure_idle()?;
        self.segments = segments;
        Ok(())
    }

    /// Shuffles the order and persists it.
    pub fn shuffle<R, S>(&mut self, rng: &mut R, store: &mut S) -> Result<(), WheelError>
    where
        R: Rng + ?Sized,
        S: SegmentStore + ?Sized,
    {
        self.ensure_idle()?;
        self.segments.shuffle(rng);
        self.persist(store)
    }

    /// Restores the sample wheel and persists it.
    pub fn reset_to_sample<S: SegmentStore + ?Sized>(&mut self, store: &mut S) -> Result<(), WheelError> {
        self.ensure_idle()?;
        self.segments = sample_segments();
        self.persist(store)
    }

    /// Persists the current list; refuses to save a wheel that cannot spin.
    pub fn save<S: SegmentStore + ?Sized>(&self, store: &mut S) -> Result<(), WheelError> {
        if self.segments.len() < MIN_SEGMENTS {
            return Err(WheelError::TooFewSegments {
                found: self.segments.len(),
            });
        }
        self.persist(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wheel() -> WheelState {
        WheelState::new(sample_segments(), &WheelConfig::default())
    }

    #[test]
    fn edits_clamp_and_bounds_check() {
        let mut w = wheel();
        w.set_weight(0, 180.0).unwrap();
        w.set_weight(1, f64::NAN).unwrap();
        assert_eq!(w.segments()[0].weight, 100.0);
        assert_eq!(w.segments()[1].weight, 0.0);
        assert!(matches!(
            w.set_text(9, "x"),
            Err(WheelError::IndexOutOfRange { index: 9, len: 4 })
        ));
    }

    #[test]
    fn added_segments_get_unique_ids_and_colors() {
        let mut w = wheel();
        let mut rng = StdRng::seed_from_u64(3);
        let mut store = MemoryStore::new();
        for k in 0..5 {
            w.add_segment(format!("extra {k}"), &mut rng, &mut store).unwrap();
        }
        assert_eq!(store.save_count(), 5);
        let segs = w.segments();
        assert_eq!(segs.len(), 9);
        for (i, a) in segs.iter().enumerate() {
            for b in &segs[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.color.to_lowercase(), b.color.to_lowercase());
            }
        }
        assert_eq!(segs[8].weight, 0.0);
    }

    #[test]
    fn save_requires_two_segments() {
        let mut w = wheel();
        let mut store = MemoryStore::new();
        w.set_segments(vec![Segment::new("a", "A", "#000000", 0.0)]).unwrap();
        assert!(matches!(
            w.save(&mut store),
            Err(WheelError::TooFewSegments { found: 1 })
        ));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn remove_segment_persists() {
        let mut w = wheel();
        let mut store = MemoryStore::new();
        let removed = w.remove_segment(1, &mut store).unwrap();
        assert_eq!(removed.text, "Second Prize");
        assert_eq!(store.saved().map(|s| s.len()), Some(3));
    }

    #[test]
    fn edits_refused_while_spinning() {
        let mut w = wheel();
        let mut rng = StdRng::seed_from_u64(1);
        let mut store = MemoryStore::new();
        w.spin(0.0, &WheelConfig::default(), &mut rng).unwrap();
        assert!(matches!(w.remove_segment(0, &mut store), Err(WheelError::Busy)));
        assert!(matches!(w.shuffle(&mut rng, &mut store), Err(WheelError::Busy)));
        assert!(matches!(w.reset_to_sample(&mut store), Err(WheelError::Busy)));
        assert!(matches!(w.add_segment("late", &mut rng, &mut store), Err(WheelError::Busy)));
        assert_eq!(w.segments().len(), 4);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn shuffle_keeps_the_same_segments() {
        let mut w = wheel();
        let mut rng = StdRng::seed_from_u64(17);
        let mut store = MemoryStore::new();
        w.shuffle(&mut rng, &mut store).unwrap();
        let mut ids: Vec<_> = w.segments().iter().map(|s| s.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(store.saved(), Some(w.segments()));
    }

    #[test]
    fn reset_and_auto_remove_are_persisted() {
        let mut w = wheel();
        let mut store = MemoryStore::new();
        w.set_segments(vec![Segment::new("a", "A", "#000000", 0.0)]).unwrap();
        w.reset_to_sample(&mut store).unwrap();
        assert_eq!(store.saved(), Some(sample_segments().as_slice()));
        assert_eq!(store.save_count(), 1);

        w.set_auto_remove(true, &mut store).unwrap();
        assert!(w.auto_remove());
        assert_eq!(store.auto_remove(), Some(true));
        // the flag is a preference, not a segment write
        assert_eq!(store.save_count(), 1);
    }
}

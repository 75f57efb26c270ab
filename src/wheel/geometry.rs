//! Segment layout on the wheel and the pointer boundary lookup.

use crate::core::angle::{norm_angle, TAU};

/// Relative nudge applied before dividing so exact-boundary angles do not
/// round into index `n`.
const BOUNDARY_NUDGE: f64 = 1e-6;

/// Segment `i` occupies `[i * step, (i + 1) * step)` in the wheel frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub segment_count: usize,
    pub pointer_angle: f64,
}

impl WheelGeometry {
    pub fn new(segment_count: usize, pointer_angle: f64) -> Self {
        Self {
            segment_count,
            pointer_angle,
        }
    }

    #[inline]
    pub fn step(&self) -> f64 {
        TAU / self.segment_count.max(1) as f64
    }

    /// `(low, high)` bounds of a segment's arc.
    pub fn arc(&self, index: usize) -> (f64, f64) {
        let step = self.step();
        let low = index as f64 * step;
        (low, low + step)
    }

    /// Wheel-frame angle currently under the pointer, in `[0, TAU)`.
    #[inline]
    pub fn theta_under_pointer(&self, rotation: f64) -> f64 {
        norm_angle(self.pointer_angle - rotation)
    }

    /// Rotation that puts wheel angle `theta` under the pointer (unnormalized).
    #[inline]
    pub fn rotation_for_theta(&self, theta: f64) -> f64 {
        self.pointer_angle - theta
    }

    /// Segment under the pointer for a given rotation. `None` for an empty wheel.
    pub fn index_from_rotation(&self, rotation: f64) -> Option<usize> {
        if self.segment_count == 0 {
            return None;
        }
        let step = self.step();
        let theta = norm_angle(self.theta_under_pointer(rotation) + step * BOUNDARY_NUDGE);
        let idx = (theta / step).floor() as usize;
        Some(idx.min(self.segment_count - 1))
    }
}

/// Free-function form of [`WheelGeometry::index_from_rotation`].
pub fn index_from_rotation(rotation: f64, segment_count: usize, pointer_angle: f64) -> Option<usize> {
    WheelGeometry::new(segment_count, pointer_angle).index_from_rotation(rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::angle::POINTER_UP;

    #[test]
    fn empty_wheel_has_no_index() {
        assert_eq!(index_from_rotation(1.0, 0, POINTER_UP), None);
    }

    #[test]
    fn zero_rotation_with_pointer_up() {
        // pointer up sees theta = 3PI/2, the start of the last quarter
        assert_eq!(index_from_rotation(0.0, 4, POINTER_UP), Some(3));
        assert_eq!(index_from_rotation(0.0, 2, POINTER_UP), Some(1));
    }

    #[test]
    fn exact_boundaries_never_overflow() {
        for n in 1..40 {
            let g = WheelGeometry::new(n, 0.0);
            for i in 0..=n {
                let (low, _) = g.arc(i);
                let idx = g.index_from_rotation(-low).unwrap();
                assert!(idx < n);
            }
        }
    }
}

//! Deceleration trajectory: a fast multi-turn spin easing out onto a point
//! well inside the target segment.

use rand::Rng;

use crate::core::angle::{ease_out_quint, TAU};
use crate::core::config::{SettleConfig, SpinConfig};
use crate::wheel::error::WheelError;
use crate::wheel::geometry::WheelGeometry;
use crate::wheel::settle::SettlePlan;

/// Planned deceleration from `start` to `end` over `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub start: f64,
    /// Always strictly below `start`: the wheel only ever turns one way.
    pub end: f64,
    pub duration_ms: f64,
    pub target_index: usize,
    /// Wheel-frame angle that ends up under the pointer.
    pub landing_theta: f64,
    pub extra_turns: u32,
}

impl SpinPlan {
    /// Rotation at normalized time `t` (clamped into `[0, 1]`).
    pub fn rotation_at(&self, t: f64) -> f64 {
        self.start + (self.end - self.start) * ease_out_quint(t)
    }

    /// Normalized time after `elapsed_ms`; a zero duration finishes at once.
    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Both phases of one spin, drawn up front so advancing is deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTrajectory {
    pub spin: SpinPlan,
    pub settle: SettlePlan,
}

impl SpinTrajectory {
    pub fn plan<R: Rng + ?Sized>(
        geometry: &WheelGeometry,
        current_rotation: f64,
        target_index: usize,
        spin_cfg: &SpinConfig,
        settle_cfg: &SettleConfig,
        rng: &mut R,
    ) -> Result<Self, WheelError> {
        let spin = plan_spin(geometry, current_rotation, target_index, spin_cfg, rng)?;
        let settle = SettlePlan::plan(geometry, spin.end, target_index, settle_cfg, rng);
        Ok(Self { spin, settle })
    }

    /// Deceleration plus settle time.
    pub fn total_duration_ms(&self) -> f64 {
        self.spin.duration_ms.max(0.0) + self.settle.duration_ms.max(0.0)
    }
}

/// Plans the deceleration phase. `current_rotation` is used as-is for
/// `start`; callers normalize it between spins to keep magnitudes small.
pub fn plan_spin<R: Rng + ?Sized>(
    geometry: &WheelGeometry,
    current_rotation: f64,
    target_index: usize,
    cfg: &SpinConfig,
    rng: &mut R,
) -> Result<SpinPlan, WheelError> {
    let n = geometry.segment_count;
    if target_index >= n {
        return Err(WheelError::IndexOutOfRange {
            index: target_index,
            len: n,
        });
    }
    let step = geometry.step();
    let margin = step * cfg.landing_margin.clamp(0.0, 0.5);
    let (low, _) = geometry.arc(target_index);
    let landing_theta = low + margin + rng.gen::<f64>() * (step - 2.0 * margin);

    let extra_turns = cfg.extra_turns.sample(rng);
    let start = current_rotation;
    let mut end = geometry.rotation_for_theta(landing_theta) - extra_turns as f64 * TAU;
    if end >= start {
        let turns = ((end - start) / TAU).floor() + 1.0;
        end -= turns * TAU;
    }
    // rounding guard for the bulk subtraction above
    while end >= start {
        end -= TAU;
    }

    Ok(SpinPlan {
        start,
        end,
        duration_ms: cfg.duration_ms.sample(rng),
        target_index,
        landing_theta,
        extra_turns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::angle::POINTER_UP;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_out_of_range_target() {
        let g = WheelGeometry::new(3, POINTER_UP);
        let mut rng = StdRng::seed_from_u64(0);
        let err = plan_spin(&g, 0.0, 3, &SpinConfig::default(), &mut rng).unwrap_err();
        assert!(matches!(err, WheelError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn landing_point_respects_margin() {
        let g = WheelGeometry::new(6, POINTER_UP);
        let mut rng = StdRng::seed_from_u64(12);
        let cfg = SpinConfig::default();
        for _ in 0..200 {
            let plan = plan_spin(&g, 0.0, 4, &cfg, &mut rng).unwrap();
            let (low, high) = g.arc(4);
            let margin = g.step() * cfg.landing_margin;
            assert!(plan.landing_theta >= low + margin - 1e-12);
            assert!(plan.landing_theta <= high - margin + 1e-12);
            assert!((9..=14).contains(&plan.extra_turns));
            assert!((5200.0..6400.0).contains(&plan.duration_ms));
        }
    }

    #[test]
    fn covers_at_least_the_minimum_turns() {
        let g = WheelGeometry::new(8, POINTER_UP);
        let mut rng = StdRng::seed_from_u64(99);
        for i in 0..8 {
            let plan = plan_spin(&g, 5.5, i, &SpinConfig::default(), &mut rng).unwrap();
            assert!(plan.start - plan.end >= 9.0 * TAU);
        }
    }

    #[test]
    fn curve_is_monotonic() {
        let g = WheelGeometry::new(5, POINTER_UP);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_spin(&g, 1.0, 2, &SpinConfig::default(), &mut rng).unwrap();
        assert_eq!(plan.rotation_at(0.0), plan.start);
        let mut prev = plan.start;
        for k in 1..=100 {
            let r = plan.rotation_at(k as f64 / 100.0);
            assert!(r <= prev);
            prev = r;
        }
        assert!((prev - plan.end).abs() < 1e-9);
    }

    #[test]
    fn far_negative_start_still_ends_below() {
        let g = WheelGeometry::new(4, POINTER_UP);
        let mut rng = StdRng::seed_from_u64(2);
        let plan = plan_spin(&g, -1.0e4, 1, &SpinConfig::default(), &mut rng).unwrap();
        assert!(plan.end < plan.start);
        assert_eq!(g.index_from_rotation(plan.end), Some(1));
    }
}

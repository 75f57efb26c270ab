//! Damped wobble after the deceleration, capped so it can never carry the
//! pointer across a segment boundary.

use rand::Rng;

use crate::core::config::SettleConfig;
use crate::wheel::geometry::WheelGeometry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlePlan {
    /// Rotation the wobble is centered on (the deceleration's end).
    pub end: f64,
    /// Signed amplitude in radians; `|amplitude| <= max_amplitude`.
    pub amplitude: f64,
    /// Largest amplitude that stays inside the target segment.
    pub max_amplitude: f64,
    /// Decay rate `k` in 1/s.
    pub damping: f64,
    /// `ω` in rad/s.
    pub angular_frequency: f64,
    pub duration_ms: f64,
}

impl SettlePlan {
    pub fn plan<R: Rng + ?Sized>(
        geometry: &WheelGeometry,
        end: f64,
        target_index: usize,
        cfg: &SettleConfig,
        rng: &mut R,
    ) -> Self {
        let step = geometry.step();
        let theta_end = geometry.theta_under_pointer(end);
        let (low, high) = geometry.arc(target_index);
        let dist_to_low = theta_end - low;
        let dist_to_high = high - theta_end;

        let mut max_amplitude = dist_to_low.min(dist_to_high) - step * cfg.boundary_pad;
        if !max_amplitude.is_finite() || max_amplitude < 0.0 {
            max_amplitude = 0.0;
        }
        let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        let fraction = cfg.amplitude_fraction.sample(rng).clamp(0.0, 1.0);

        Self {
            end,
            amplitude: sign * max_amplitude * fraction,
            max_amplitude,
            damping: cfg.damping.sample(rng),
            angular_frequency: cfg.angular_frequency.sample(rng),
            duration_ms: cfg.duration_ms.sample(rng),
        }
    }

    /// `end + A * e^(-k t) * sin(ω t)` with `t` in seconds since the settle began.
    pub fn rotation_at(&self, elapsed_ms: f64) -> f64 {
        if self.max_amplitude <= 0.0 {
            return self.end;
        }
        let t = elapsed_ms.max(0.0) / 1000.0;
        self.end + self.amplitude * (-self.damping * t).exp() * (self.angular_frequency * t).sin()
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::angle::POINTER_UP;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn amplitude_capped_by_nearest_boundary() {
        let g = WheelGeometry::new(4, POINTER_UP);
        let step = g.step();
        // land 40% into segment 1 -> nearest boundary is 0.4 * step away
        let theta = step + 0.4 * step;
        let end = g.rotation_for_theta(theta) - 10.0 * std::f64::consts::TAU;
        let mut rng = StdRng::seed_from_u64(8);
        let cfg = SettleConfig::default();
        let plan = SettlePlan::plan(&g, end, 1, &cfg, &mut rng);
        assert!((plan.max_amplitude - (0.4 - cfg.boundary_pad) * step).abs() < 1e-9);
        let ratio = plan.amplitude.abs() / plan.max_amplitude;
        assert!((0.55..0.95).contains(&ratio));
        assert!((7.0..10.0).contains(&plan.damping));
        assert!((22.0..28.0).contains(&plan.angular_frequency));
        assert!((520.0..700.0).contains(&plan.duration_ms));
    }

    #[test]
    fn wrong_segment_disables_wobble() {
        let g = WheelGeometry::new(4, POINTER_UP);
        let end = g.rotation_for_theta(g.step() * 2.5);
        let mut rng = StdRng::seed_from_u64(8);
        let plan = SettlePlan::plan(&g, end, 0, &SettleConfig::default(), &mut rng);
        assert_eq!(plan.max_amplitude, 0.0);
        assert_eq!(plan.rotation_at(123.0), end);
    }

    #[test]
    fn starts_and_decays_at_end() {
        let g = WheelGeometry::new(3, POINTER_UP);
        let end = g.rotation_for_theta(g.step() * 0.5);
        let mut rng = StdRng::seed_from_u64(21);
        let plan = SettlePlan::plan(&g, end, 0, &SettleConfig::default(), &mut rng);
        assert_eq!(plan.rotation_at(0.0), end);
        let late = (plan.rotation_at(plan.duration_ms) - end).abs();
        assert!(late < plan.amplitude.abs() * 0.05);
        assert!(!plan.is_finished(plan.duration_ms - 1.0));
        assert!(plan.is_finished(plan.duration_ms));
    }
}

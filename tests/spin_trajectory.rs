use lucky_wheel::core::angle::{POINTER_UP, TAU};
use lucky_wheel::core::config::WheelConfig;
use lucky_wheel::wheel::{index_from_rotation, plan_spin, SpinTrajectory, WheelGeometry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn settle_never_leaves_the_target() {
    let cfg = WheelConfig::default();
    let mut rng = StdRng::seed_from_u64(0xfeed);
    for n in 2..=50usize {
        let g = WheelGeometry::new(n, POINTER_UP);
        for target in 0..n {
            let start = rng.gen_range(0.0..TAU);
            let traj = SpinTrajectory::plan(&g, start, target, &cfg.spin, &cfg.settle, &mut rng)
                .expect("target in range");
            let settle = traj.settle;
            assert!(settle.amplitude.abs() <= settle.max_amplitude + 1e-12);
            let steps = 120;
            for k in 0..=steps {
                let t = settle.duration_ms * k as f64 / steps as f64;
                let rot = settle.rotation_at(t);
                assert_eq!(
                    g.index_from_rotation(rot),
                    Some(target),
                    "n={n} target={target} t={t:.1}ms rot={rot}"
                );
            }
        }
    }
}

#[test]
fn deceleration_stays_on_target_at_rest() {
    let cfg = WheelConfig::default();
    let mut rng = StdRng::seed_from_u64(11);
    for n in [2usize, 5, 12, 37] {
        let g = WheelGeometry::new(n, POINTER_UP);
        for target in 0..n {
            let plan = plan_spin(&g, 0.0, target, &cfg.spin, &mut rng).unwrap();
            assert_eq!(g.index_from_rotation(plan.rotation_at(1.0)), Some(target));
        }
    }
}

#[test]
fn spin_always_turns_forward() {
    let cfg = WheelConfig::default();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..2_000 {
        let n = rng.gen_range(2..=30);
        let g = WheelGeometry::new(n, POINTER_UP);
        let start = rng.gen_range(-50.0..50.0);
        let target = rng.gen_range(0..n);
        let plan = plan_spin(&g, start, target, &cfg.spin, &mut rng).unwrap();
        assert!(plan.end < plan.start, "start={start} end={}", plan.end);
    }
}

#[test]
fn index_is_stable_under_full_turns() {
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..2_000 {
        let n = rng.gen_range(1..=40);
        let step = TAU / n as f64;
        // stay clear of exact boundaries, where adding turns may round either way
        let i = rng.gen_range(0..n);
        let theta = (i as f64 + rng.gen_range(0.05..0.95)) * step;
        let rot = POINTER_UP - theta;
        let base = index_from_rotation(rot, n, POINTER_UP);
        assert_eq!(base, Some(i));
        for k in [-7i32, -1, 1, 3, 20] {
            assert_eq!(index_from_rotation(rot + k as f64 * TAU, n, POINTER_UP), base);
        }
    }
}

#[test]
fn quarter_wheel_lands_on_third_segment() {
    let cfg = WheelConfig::default();
    let g = WheelGeometry::new(4, POINTER_UP);
    let mut rng = StdRng::seed_from_u64(42);
    let plan = plan_spin(&g, 0.0, 2, &cfg.spin, &mut rng).unwrap();
    assert!(plan.end < 0.0);
    assert_eq!(index_from_rotation(plan.end, 4, POINTER_UP), Some(2));
    assert!(plan.start - plan.end >= cfg.spin.extra_turns.min as f64 * TAU);
}

#[test]
fn total_duration_covers_both_phases() {
    let cfg = WheelConfig::default();
    let g = WheelGeometry::new(6, POINTER_UP);
    let mut rng = StdRng::seed_from_u64(3);
    let traj = SpinTrajectory::plan(&g, 0.0, 1, &cfg.spin, &cfg.settle, &mut rng).unwrap();
    let total = traj.total_duration_ms();
    assert!((5_720.0..7_100.0).contains(&total), "{total}");
}

//! Angle helpers shared by the trajectory and settle math.
//! Everything here works in radians on `f64`; the wheel frame has 0 pointing
//! right and angles growing clockwise (canvas convention).

pub use std::f64::consts::TAU;

/// Pointer straight up (12 o'clock) in the wheel's local frame.
pub const POINTER_UP: f64 = -std::f64::consts::FRAC_PI_2;

/// Wraps an angle into `[0, TAU)`.
#[inline]
pub fn norm_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Fast start, long smooth tail.
#[inline]
pub fn ease_out_quint(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_angle_wraps_into_half_open_turn() {
        assert_eq!(norm_angle(0.0), 0.0);
        assert!((norm_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((norm_angle(3.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert!(norm_angle(-1e-20) < TAU);
    }

    #[test]
    fn ease_out_quint_endpoints_and_shape() {
        assert_eq!(ease_out_quint(0.0), 0.0);
        assert_eq!(ease_out_quint(1.0), 1.0);
        // past halfway in value well before halfway in time
        assert!(ease_out_quint(0.2) > 0.6);
        assert_eq!(ease_out_quint(2.0), 1.0);
    }
}

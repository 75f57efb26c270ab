//! Weighted draw over segments.
//!
//! Weights are absolute percentages. Segments without a weight share whatever
//! is left of 100% equally; a segment at 100% (or more) wins outright. The
//! rules, in order:
//!
//! 1. `raw = weight` if finite and positive (capped at 100), else 0.
//! 2. Any `raw == 100` -> uniform among those segments.
//! 3. No positive weights -> uniform over all segments.
//! 4. `sum >= 100` -> weights normalized by `sum`, unspecified get nothing.
//! 5. `sum < 100` -> `raw / 100` each, remainder split across unspecified
//!    segments (or, when every segment is specified, normalized by `sum`).

use rand::Rng;

use crate::core::segment::{Segment, MAX_WEIGHT};

/// Effective weight used by the draw.
#[inline]
pub fn raw_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight.min(MAX_WEIGHT)
    } else {
        0.0
    }
}

/// Distribution derived from a weight list.
#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
    /// At least one segment is at 100%; pick uniformly among those.
    Certain { candidates: Vec<usize>, len: usize },
    /// Nobody configured a weight.
    Uniform(usize),
    /// Per-index probabilities summing to 1.
    Weighted(Vec<f64>),
}

impl Draw {
    /// `None` for an empty list.
    pub fn from_weights<I>(weights: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let raw: Vec<f64> = weights.into_iter().map(raw_weight).collect();
        let n = raw.len();
        if n == 0 {
            return None;
        }
        let max = raw.iter().copied().fold(0.0_f64, f64::max);
        if max >= MAX_WEIGHT {
            let candidates = (0..n).filter(|&i| raw[i] == max).collect();
            return Some(Draw::Certain { candidates, len: n });
        }

        let (specified, unspecified): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| raw[i] > 0.0);
        if specified.is_empty() {
            return Some(Draw::Uniform(n));
        }

        let sum: f64 = specified.iter().map(|&i| raw[i]).sum();
        let mut prob = vec![0.0; n];
        if sum >= MAX_WEIGHT || unspecified.is_empty() {
            for &i in &specified {
                prob[i] = raw[i] / sum;
            }
        } else {
            for &i in &specified {
                prob[i] = raw[i] / MAX_WEIGHT;
            }
            let each = (MAX_WEIGHT - sum) / MAX_WEIGHT / unspecified.len() as f64;
            for &i in &unspecified {
                prob[i] = each;
            }
        }
        Some(Draw::Weighted(prob))
    }

    pub fn from_segments(segments: &[Segment]) -> Option<Self> {
        Self::from_weights(segments.iter().map(|s| s.weight))
    }

    pub fn len(&self) -> usize {
        match self {
            Draw::Certain { len, .. } => *len,
            Draw::Uniform(n) => *n,
            Draw::Weighted(prob) => prob.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probability of each index being drawn.
    pub fn probabilities(&self) -> Vec<f64> {
        match self {
            Draw::Certain { candidates, len } => {
                let mut prob = vec![0.0; *len];
                let each = 1.0 / candidates.len() as f64;
                for &i in candidates {
                    prob[i] = each;
                }
                prob
            }
            Draw::Uniform(n) => vec![1.0 / *n as f64; *n],
            Draw::Weighted(prob) => prob.clone(),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Draw::Certain { candidates, .. } => candidates[rng.gen_range(0..candidates.len())],
            Draw::Uniform(n) => rng.gen_range(0..*n),
            Draw::Weighted(prob) => {
                let mut r: f64 = rng.gen();
                let mut last_positive = prob.len() - 1;
                for (i, &p) in prob.iter().enumerate() {
                    if p <= 0.0 {
                        continue;
                    }
                    last_positive = i;
                    r -= p;
                    if r <= 0.0 {
                        return i;
                    }
                }
                // float rounding at the tail
                last_positive
            }
        }
    }
}

/// Draws a winning index; `None` when there are no segments.
pub fn choose_index<R: Rng + ?Sized>(segments: &[Segment], rng: &mut R) -> Option<usize> {
    Draw::from_segments(segments).map(|d| d.sample(rng))
}

/// Effective per-segment probabilities (empty for an empty list).
pub fn probabilities(segments: &[Segment]) -> Vec<f64> {
    Draw::from_segments(segments)
        .map(|d| d.probabilities())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn empty_has_no_draw() {
        assert_eq!(Draw::from_weights(Vec::<f64>::new()), None);
    }

    #[test]
    fn certain_ties_split_evenly() {
        let d = Draw::from_weights([100.0, 5.0, 250.0, 0.0]).unwrap();
        assert_eq!(d, Draw::Certain { candidates: vec![0, 2], len: 4 });
        approx(&d.probabilities(), &[0.5, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn unspecified_share_the_remainder() {
        let d = Draw::from_weights([50.0, 0.0, 0.0]).unwrap();
        approx(&d.probabilities(), &[0.5, 0.25, 0.25]);
        let d = Draw::from_weights([5.0, f64::NAN, -3.0, 0.0]).unwrap();
        approx(&d.probabilities(), &[0.05, 0.95 / 3.0, 0.95 / 3.0, 0.95 / 3.0]);
    }

    #[test]
    fn oversubscribed_weights_are_normalized() {
        let d = Draw::from_weights([60.0, 90.0, 0.0]).unwrap();
        approx(&d.probabilities(), &[0.4, 0.6, 0.0]);
    }

    #[test]
    fn all_specified_below_hundred_are_normalized() {
        let d = Draw::from_weights([10.0, 30.0]).unwrap();
        approx(&d.probabilities(), &[0.25, 0.75]);
    }

    #[test]
    fn nobody_configured_is_uniform() {
        let d = Draw::from_weights([0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(d, Draw::Uniform(4));
        approx(&d.probabilities(), &[0.25; 4]);
    }

    #[test]
    fn zero_probability_index_never_sampled() {
        use rand::rngs::mock::StepRng;
        // r == 0.0 exactly must not land on a zero-probability first index
        let d = Draw::from_weights([60.0, 90.0, 0.0]).unwrap();
        let d = Draw::Weighted({
            let mut p = d.probabilities();
            p.rotate_right(1);
            p
        });
        let mut rng = StepRng::new(0, 0);
        assert_eq!(d.sample(&mut rng), 1);
    }
}

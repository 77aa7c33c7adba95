use num_traits::Float;

use super::Scale;

/// Linear scale: affine mapping from a two-point domain onto a two-point range.
///
/// `scale(x) = r0 + t * (r1 - r0)` with `t = (x - d0) / (d1 - d0)`.
///
/// - **No clamping**: values outside the domain extrapolate.
/// - **Reversed axes**: domains and ranges are kept exactly as set, so
///   `range([h, 0])` flips a y axis.
/// - **Degenerate domains** (`d0 == d1`) divide by zero and yield non-finite
///   output; guarding against that is the caller's job.
///
/// # Examples
///
/// ```rust
/// use rsviz::domain::scale::{scale_linear, Scale};
///
/// let x = scale_linear().with_domain([0.0, 10.0]).with_range([0.0, 100.0]);
/// assert_eq!(x.scale(&5.0), 50.0);
/// assert_eq!(x.scale(&-10.0), -100.0);
/// assert_eq!(x.invert(50.0), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLinear<T: Float = f64> {
    domain: [T; 2],
    range: [T; 2],
}

/// Upper bound for the tick count requested from [`ScaleLinear::ticks`].
pub const MAX_TICKS: usize = 1_000;

/// Fresh linear scale with domain `[0, 1]` and range `[0, 1]`.
pub fn scale_linear() -> ScaleLinear<f64> {
    ScaleLinear::new()
}

impl<T: Float> Default for ScaleLinear<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> ScaleLinear<T> {
    pub fn new() -> Self {
        Self {
            domain: [T::zero(), T::one()],
            range: [T::zero(), T::one()],
        }
    }

    pub fn domain(&self) -> [T; 2] {
        self.domain
    }

    pub fn set_domain(&mut self, domain: [T; 2]) -> &mut Self {
        self.domain = domain;
        self
    }

    pub fn with_domain(mut self, domain: [T; 2]) -> Self {
        self.domain = domain;
        self
    }

    pub fn range(&self) -> [T; 2] {
        self.range
    }

    pub fn set_range(&mut self, range: [T; 2]) -> &mut Self {
        self.range = range;
        self
    }

    pub fn with_range(mut self, range: [T; 2]) -> Self {
        self.range = range;
        self
    }

    /// Maps a range value back into the domain.
    pub fn invert(&self, value: T) -> T {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = (value - r0) / (r1 - r0);
        d0 + t * (d1 - d0)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    ///
    /// Steps are 1, 2 or 5 times a power of ten. Ticks follow the domain's
    /// direction, so a reversed domain yields descending ticks. `count` is
    /// capped at [`MAX_TICKS`]. Where the domain is too large for its width to
    /// resolve single steps, coinciding ticks collapse into one.
    pub fn ticks(&self, count: usize) -> Vec<T> {
        let [d0, d1] = self.domain;
        if count == 0 || !d0.is_finite() || !d1.is_finite() {
            return Vec::new();
        }
        if d0 == d1 {
            return vec![d0];
        }
        let Some(count) = T::from(count.min(MAX_TICKS)) else {
            return Vec::new();
        };

        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let step = nice_step((hi - lo) / count);
        if step <= T::zero() || !step.is_finite() {
            return Vec::new();
        }

        let first = (lo / step).ceil();
        let last = (hi / step).floor();
        let n = match (last - first).to_usize() {
            Some(span) if span < 2 * MAX_TICKS => span + 1,
            _ => return Vec::new(),
        };

        let mut ticks: Vec<T> = (0..n)
            .filter_map(|k| T::from(k))
            .map(|k| (first + k) * step)
            .collect();
        ticks.dedup();
        if d0 > d1 {
            ticks.reverse();
        }
        ticks
    }
}

impl<T: Float> Scale<T> for ScaleLinear<T> {
    type Output = T;

    fn scale(&self, value: &T) -> T {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = (*value - d0) / (d1 - d0);
        r0 + t * (r1 - r0)
    }
}

/// Smallest of 1, 2, 5 or 10 times a power of ten that is `>= raw_step`.
fn nice_step<T: Float>(raw_step: T) -> T {
    let one = T::one();
    let two = one + one;
    let five = two + two + one;
    let ten = five + five;

    let abs_step = raw_step.abs();
    if abs_step == T::zero() || !abs_step.is_finite() {
        return abs_step;
    }

    let mut candidate = one;
    while candidate * ten < abs_step {
        candidate = candidate * ten;
    }
    while candidate > abs_step {
        candidate = candidate / ten;
    }

    [candidate, candidate * two, candidate * five, candidate * ten]
        .into_iter()
        .find(|&c| c >= abs_step)
        .unwrap_or(candidate * ten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_identity_on_unit_interval() {
        let scale = scale_linear();
        assert_eq!(scale.domain(), [0.0, 1.0]);
        assert_eq!(scale.range(), [0.0, 1.0]);
        assert_eq!(scale.scale(&0.25), 0.25);
    }

    #[test]
    fn test_nice_step_picks_round_values() {
        assert_eq!(nice_step(0.7_f64), 1.0);
        assert_eq!(nice_step(1.5_f64), 2.0);
        assert_eq!(nice_step(3.0_f64), 5.0);
        assert_eq!(nice_step(7.0_f64), 10.0);
        assert_eq!(nice_step(20.0_f64), 20.0);
        assert!((nice_step(0.03_f64) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_ticks_cover_domain() {
        let scale = scale_linear().with_domain([0.0, 100.0]);
        assert_eq!(scale.ticks(5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_ticks_follow_reversed_domain() {
        let scale = scale_linear().with_domain([10.0, 0.0]);
        assert_eq!(scale.ticks(2), vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_ticks_of_degenerate_domain() {
        let scale = scale_linear().with_domain([3.0, 3.0]);
        assert_eq!(scale.ticks(5), vec![3.0]);
        assert!(scale.ticks(0).is_empty());
    }

    #[test]
    fn test_f32_scale() {
        let scale = ScaleLinear::<f32>::new().with_range([0.0, 10.0]);
        assert_eq!(scale.scale(&0.5), 5.0_f32);
    }
}

use std::borrow::Borrow;

use super::Scale;

/// Band scale: spreads the `n` discrete domain values evenly over the range.
///
/// ```text
/// step      = (r1 - r0) / n
/// scale(x)  = r0 + index(x) * step + padding_outer * step
/// bandwidth = step * (1 - padding_inner)
/// ```
///
/// `index(x)` is a linear search over the domain; values outside the domain
/// map to `None` and must not be treated as position 0.
///
/// `padding_outer` has a getter only and is always 0.
///
/// # Examples
///
/// ```rust
/// use rsviz::domain::scale::{scale_band, Scale};
///
/// let x = scale_band().with_domain(["a", "b", "c"]).with_range([0.0, 90.0]);
/// assert_eq!(x.bandwidth(), 30.0);
/// assert_eq!(x.scale("b"), Some(30.0));
/// assert_eq!(x.scale("z"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBand<K = String> {
    domain: Vec<K>,
    range: [f64; 2],
    padding_inner: f64,
    padding_outer: f64,
}

/// Fresh band scale over string categories: empty domain, range `[0, 1]`,
/// no padding.
pub fn scale_band() -> ScaleBand<String> {
    ScaleBand::new()
}

impl<K: PartialEq> Default for ScaleBand<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq> ScaleBand<K> {
    pub fn new() -> Self {
        Self {
            domain: Vec::new(),
            range: [0.0, 1.0],
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    pub fn set_domain<I, V>(&mut self, domain: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<K>,
    {
        self.domain = domain.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_domain<I, V>(mut self, domain: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<K>,
    {
        self.set_domain(domain);
        self
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn set_range(&mut self, range: [f64; 2]) -> &mut Self {
        self.range = range;
        self
    }

    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = range;
        self
    }

    /// Inner padding as a fraction of the step.
    pub fn padding(&self) -> f64 {
        self.padding_inner
    }

    /// Sets the inner padding only.
    pub fn set_padding(&mut self, padding: f64) -> &mut Self {
        self.padding_inner = padding;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding;
        self
    }

    pub fn padding_outer(&self) -> f64 {
        self.padding_outer
    }

    /// Distance between the starts of adjacent bands.
    /// Non-finite for an empty domain.
    pub fn step(&self) -> f64 {
        (self.range[1] - self.range[0]) / self.domain.len() as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    /// Position of `value` in the domain.
    pub fn index<Q>(&self, value: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.domain.iter().position(|k| k.borrow() == value)
    }

    /// Start of the band for `value`, or `None` when it is not in the domain.
    pub fn position<Q>(&self, value: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let index = self.index(value)?;
        let step = self.step();
        Some(self.range[0] + index as f64 * step + self.padding_outer * step)
    }
}

impl<K, Q> Scale<Q> for ScaleBand<K>
where
    K: PartialEq + Borrow<Q>,
    Q: PartialEq + ?Sized,
{
    type Output = Option<f64>;

    fn scale(&self, value: &Q) -> Option<f64> {
        self.position(value)
    }
}

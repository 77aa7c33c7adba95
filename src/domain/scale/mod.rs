//! Scales: configurable mappings from data values to pixel coordinates.
//!
//! Each scale keeps its configuration as plain mutable state. Configuration
//! uses explicit getter/setter pairs: `domain()` reads, `set_domain()`
//! mutates in place and returns the scale for chaining, `with_domain()`
//! consumes and returns it for builder-style construction.
//!
//! Available scales:
//! - [`ScaleLinear`] - continuous affine mapping, see [`scale_linear`]
//! - [`ScaleBand`] - ordinal-to-interval mapping, see [`scale_band`]

mod band;
mod linear;

pub use band::{scale_band, ScaleBand};
pub use linear::{scale_linear, ScaleLinear, MAX_TICKS};

/// A mapping from a domain value `D` to an output value.
pub trait Scale<D: ?Sized> {
    type Output;

    fn scale(&self, value: &D) -> Self::Output;
}

use std::fmt::Debug;
use std::iter::Sum;

use num_traits::Float;

/// Floating point type the tree, the kernel table and the walk are
/// computed in. Single precision is the default everywhere; `f64` is
/// available for callers that need the extra headroom in distance
/// accumulation and kernel interpolation.
pub trait Real: Float + Send + Sync + Debug + Default + Sum + 'static {
    /// Convert an `f64` literal or configuration value, rounding if needed.
    fn lit(v: f64) -> Self;

    /// Saturating floor to an index. Negative and NaN values map to 0.
    fn floor_index(self) -> usize;
}

impl Real for f32 {
    #[inline]
    fn lit(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn floor_index(self) -> usize {
        self as usize
    }
}

impl Real for f64 {
    #[inline]
    fn lit(v: f64) -> Self {
        v
    }

    #[inline]
    fn floor_index(self) -> usize {
        self as usize
    }
}

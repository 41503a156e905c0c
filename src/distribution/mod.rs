//! Size distributions
//!
//! Every magnitude the tool picks at random (buffer sizes for write and read
//! calls, logical sizes of generated files) is drawn from a configured
//! `(min, max)` range through a [`size::SizeSampler`].
//!
//! # Range semantics
//!
//! - `min < 0`: uniform in `[0, max)`
//! - `min == max`: always `min`
//! - otherwise: uniform in `[min, max)`
//!
//! # Example
//!
//! ```
//! use diskchurn::distribution::{SizeRange, size::SizeSampler};
//!
//! let mut sampler = SizeSampler::with_seed(7);
//! let buf = sampler.sample(SizeRange::fixed(8192));
//! assert_eq!(buf, 8192);
//!
//! let file = sampler.sample(SizeRange::new(1024, 4096));
//! assert!((1024..4096).contains(&file));
//! ```

pub mod size;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configured `(min, max)` range for a sampled size
///
/// A negative `min` is meaningful: it selects "anything below `max`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: i64,
    pub max: i64,
}

impl SizeRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Range that always yields `size`
    pub fn fixed(size: i64) -> Self {
        Self { min: size, max: size }
    }

    /// True when every sample returns the same value
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "{}", self.min)
        } else if self.min < 0 {
            write!(f, "[0, {})", self.max)
        } else {
            write!(f, "[{}, {})", self.min, self.max)
        }
    }
}

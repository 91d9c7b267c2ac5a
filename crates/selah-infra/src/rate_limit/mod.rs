//! Rate limiting implementations.

mod windowed;

pub use windowed::{RateLimitConfig, WindowedRateLimiter};

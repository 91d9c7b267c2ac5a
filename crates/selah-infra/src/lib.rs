//! # Selah Infrastructure
//!
//! Concrete implementations of the ports defined in `selah-core`:
//! the windowed rate limiter and the snapshot stores that make its
//! state survive restarts.

pub mod rate_limit;
pub mod snapshot;

pub use rate_limit::{RateLimitConfig, WindowedRateLimiter};
pub use snapshot::{InMemorySnapshotStore, JsonFileSnapshotStore};

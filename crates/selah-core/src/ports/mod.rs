//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod rate_limit;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{QuotaDecision, RateLimitError, RateLimiter, validate_identifiers};
pub use snapshot::{SnapshotError, SnapshotStore};

//! Domain entities - request counters, the table holding them and the policy
//! that governs both.

mod counter;
mod policy;
mod table;

pub use counter::CounterEntry;
pub use policy::{DEFAULT_MAX_CLIENTS_PER_ENDPOINT, DEFAULT_REQUESTS_PER_WINDOW, RateLimitPolicy};
pub use table::{Admission, EndpointTable, SweepOutcome};

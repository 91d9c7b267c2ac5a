use chrono::TimeDelta;

use crate::error::DomainError;

/// Requests a client may make per endpoint in one window.
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 5;

/// Hard cap on tracked clients per endpoint; the oldest windows are evicted past it.
pub const DEFAULT_MAX_CLIENTS_PER_ENDPOINT: usize = 100_000;

/// Rules a rate limiter enforces.
///
/// Built through [`RateLimitPolicy::new`] and the `with_*` methods so every
/// instance satisfies: at least one request per window, positive window and
/// sweep interval, non-zero client cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    requests_per_window: u32,
    window: TimeDelta,
    sweep_interval: TimeDelta,
    max_clients_per_endpoint: usize,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            window: TimeDelta::hours(24),
            sweep_interval: TimeDelta::minutes(30),
            max_clients_per_endpoint: DEFAULT_MAX_CLIENTS_PER_ENDPOINT,
        }
    }
}

impl RateLimitPolicy {
    pub fn new(requests_per_window: u32, window: TimeDelta) -> Result<Self, DomainError> {
        if requests_per_window == 0 {
            return Err(DomainError::Validation(
                "requests per window must be at least 1".to_string(),
            ));
        }
        if window <= TimeDelta::zero() {
            return Err(DomainError::Validation(
                "rate limit window must be positive".to_string(),
            ));
        }

        Ok(Self {
            requests_per_window,
            window,
            ..Self::default()
        })
    }

    pub fn with_sweep_interval(mut self, sweep_interval: TimeDelta) -> Result<Self, DomainError> {
        if sweep_interval <= TimeDelta::zero() {
            return Err(DomainError::Validation(
                "sweep interval must be positive".to_string(),
            ));
        }
        self.sweep_interval = sweep_interval;
        Ok(self)
    }

    pub fn with_max_clients_per_endpoint(mut self, cap: usize) -> Result<Self, DomainError> {
        if cap == 0 {
            return Err(DomainError::Validation(
                "client cap per endpoint must be at least 1".to_string(),
            ));
        }
        self.max_clients_per_endpoint = cap;
        Ok(self)
    }

    pub fn requests_per_window(&self) -> u32 {
        self.requests_per_window
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn sweep_interval(&self) -> TimeDelta {
        self.sweep_interval
    }

    pub fn max_clients_per_endpoint(&self) -> usize {
        self.max_clients_per_endpoint
    }

    /// Human-readable limit, e.g. `"5 requests per 24 hours"`.
    pub fn describe(&self) -> String {
        let requests = if self.requests_per_window == 1 {
            "1 request".to_string()
        } else {
            format!("{} requests", self.requests_per_window)
        };

        let secs = self.window.num_seconds();
        let (amount, unit) = if secs % 3600 == 0 {
            (secs / 3600, "hour")
        } else if secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };

        if amount == 1 {
            format!("{} per {}", requests, unit)
        } else {
            format!("{} per {} {}s", requests, amount, unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_description() {
        assert_eq!(
            RateLimitPolicy::default().describe(),
            "5 requests per 24 hours"
        );
    }

    #[test]
    fn test_description_follows_configuration() {
        let policy = RateLimitPolicy::new(1, TimeDelta::hours(1)).unwrap();
        assert_eq!(policy.describe(), "1 request per hour");

        let policy = RateLimitPolicy::new(10, TimeDelta::minutes(90)).unwrap();
        assert_eq!(policy.describe(), "10 requests per 90 minutes");

        let policy = RateLimitPolicy::new(3, TimeDelta::seconds(45)).unwrap();
        assert_eq!(policy.describe(), "3 requests per 45 seconds");
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(RateLimitPolicy::new(0, TimeDelta::hours(24)).is_err());
        assert!(RateLimitPolicy::new(5, TimeDelta::zero()).is_err());

        let policy = RateLimitPolicy::default();
        assert!(policy.clone().with_sweep_interval(TimeDelta::seconds(-1)).is_err());
        assert!(policy.with_max_clients_per_endpoint(0).is_err());
    }
}

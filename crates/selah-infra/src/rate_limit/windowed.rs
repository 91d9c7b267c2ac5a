//! Persistent fixed-window rate limiter keyed by (endpoint, client).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use selah_core::DomainError;
use selah_core::domain::{
    DEFAULT_MAX_CLIENTS_PER_ENDPOINT, DEFAULT_REQUESTS_PER_WINDOW, EndpointTable, RateLimitPolicy,
};
use selah_core::ports::{
    Clock, QuotaDecision, RateLimitError, RateLimiter, SnapshotStore, SystemClock,
    validate_identifiers,
};

use crate::snapshot::{InMemorySnapshotStore, JsonFileSnapshotStore};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub requests_per_window: u32,
    /// Window duration.
    pub window: Duration,
    /// How often expired entries are swept.
    pub sweep_interval: Duration,
    /// Tracked clients per endpoint before the oldest are evicted.
    pub max_clients_per_endpoint: usize,
    /// Snapshot file location.
    pub storage_file: PathBuf,
    /// When false, snapshots stay in memory and nothing touches the disk.
    pub persist: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            window: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(30 * 60),
            max_clients_per_endpoint: DEFAULT_MAX_CLIENTS_PER_ENDPOINT,
            storage_file: PathBuf::from("data/rate_limits.json"),
            persist: true,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            requests_per_window: env_parse("RATE_LIMIT_REQUESTS_PER_WINDOW")
                .unwrap_or(defaults.requests_per_window),
            window: env_parse("RATE_LIMIT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
            sweep_interval: env_parse("RATE_LIMIT_SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            max_clients_per_endpoint: env_parse("RATE_LIMIT_MAX_CLIENTS_PER_ENDPOINT")
                .unwrap_or(defaults.max_clients_per_endpoint),
            storage_file: std::env::var("RATE_LIMIT_STORAGE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_file),
            persist: env_parse("RATE_LIMIT_PERSIST").unwrap_or(defaults.persist),
        }
    }

    /// Validate the numbers and turn them into a policy.
    pub fn policy(&self) -> Result<RateLimitPolicy, DomainError> {
        RateLimitPolicy::new(self.requests_per_window, to_delta(self.window, "window")?)?
            .with_sweep_interval(to_delta(self.sweep_interval, "sweep interval")?)?
            .with_max_clients_per_endpoint(self.max_clients_per_endpoint)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn to_delta(duration: Duration, what: &str) -> Result<TimeDelta, DomainError> {
    TimeDelta::from_std(duration)
        .map_err(|_| DomainError::Validation(format!("{} is out of range", what)))
}

struct LimiterState {
    table: EndpointTable,
    last_sweep: DateTime<Utc>,
}

/// Rate limiter backed by an in-memory table and a durable snapshot.
///
/// One mutex serializes every check, sweep and save, so snapshots are
/// written in mutation order. Snapshot failures are logged and the
/// in-memory table stays authoritative.
pub struct WindowedRateLimiter {
    policy: RateLimitPolicy,
    state: Mutex<LimiterState>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl WindowedRateLimiter {
    /// Build a limiter, resuming from the store's last snapshot if it can be read.
    pub async fn open(
        policy: RateLimitPolicy,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let table = match store.load().await {
            Ok(Some(table)) => {
                if table.is_empty() {
                    tracing::debug!("Rate limit snapshot is empty");
                } else {
                    tracing::info!(
                        endpoints = table.endpoint_count(),
                        entries = table.len(),
                        "Loaded rate limit snapshot"
                    );
                }
                table
            }
            Ok(None) => {
                tracing::debug!("No rate limit snapshot found, starting empty");
                EndpointTable::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load rate limit snapshot, starting empty");
                EndpointTable::new()
            }
        };

        let last_sweep = clock.now();

        Self {
            policy,
            state: Mutex::new(LimiterState { table, last_sweep }),
            store,
            clock,
        }
    }

    /// Limiter on the system clock, file-backed unless persistence is off.
    pub async fn from_config(config: &RateLimitConfig) -> Result<Self, DomainError> {
        let policy = config.policy()?;

        let store: Arc<dyn SnapshotStore> = if config.persist {
            tracing::info!(
                storage_file = %config.storage_file.display(),
                limit = %policy.describe(),
                "Rate limiter configured"
            );
            Arc::new(JsonFileSnapshotStore::new(&config.storage_file))
        } else {
            tracing::warn!(
                limit = %policy.describe(),
                "Rate limit persistence disabled, counts reset on restart"
            );
            Arc::new(InMemorySnapshotStore::new())
        };

        Ok(Self::open(policy, store, Arc::new(SystemClock)).await)
    }

    /// Clients currently tracked for `endpoint`.
    pub async fn tracked_clients(&self, endpoint: &str) -> usize {
        self.state.lock().await.table.client_count(endpoint)
    }

    async fn persist(&self, table: &EndpointTable) {
        if let Err(e) = self.store.save(table).await {
            tracing::error!(error = %e, "Failed to save rate limit snapshot");
        }
    }
}

#[async_trait]
impl RateLimiter for WindowedRateLimiter {
    async fn check(&self, endpoint: &str, client: &str) -> Result<QuotaDecision, RateLimitError> {
        validate_identifiers(endpoint, client)?;

        let mut state = self.state.lock().await;
        let now = self.clock.now();
        let mut dirty = false;

        if now - state.last_sweep > self.policy.sweep_interval() {
            let outcome = state.table.sweep(
                now,
                self.policy.window(),
                self.policy.max_clients_per_endpoint(),
            );
            state.last_sweep = now;
            dirty = true;

            tracing::info!(
                removed = outcome.removed(),
                expired = outcome.expired,
                evicted = outcome.evicted,
                endpoints = state.table.endpoint_count(),
                "Swept rate limit table"
            );
        }

        let admission = state.table.admit(endpoint, client, now, &self.policy);
        dirty |= admission.mutated();

        if dirty {
            self.persist(&state.table).await;
        }

        if admission.is_denied() {
            tracing::debug!(endpoint, client, "Request rate limited");
        }

        Ok(QuotaDecision {
            limited: admission.is_denied(),
            remaining: state.table.remaining(endpoint, client, now, &self.policy),
            reset_at: state.table.reset_time(endpoint, client, now, &self.policy),
            checked_at: now,
        })
    }

    async fn remaining_requests(
        &self,
        endpoint: &str,
        client: &str,
    ) -> Result<u32, RateLimitError> {
        validate_identifiers(endpoint, client)?;

        let state = self.state.lock().await;
        Ok(state
            .table
            .remaining(endpoint, client, self.clock.now(), &self.policy))
    }

    async fn reset_time(
        &self,
        endpoint: &str,
        client: &str,
    ) -> Result<DateTime<Utc>, RateLimitError> {
        validate_identifiers(endpoint, client)?;

        let state = self.state.lock().await;
        Ok(state
            .table
            .reset_time(endpoint, client, self.clock.now(), &self.policy))
    }

    fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }
}

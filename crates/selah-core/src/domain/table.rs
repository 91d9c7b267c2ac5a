use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{CounterEntry, RateLimitPolicy};

/// Outcome of recording one request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First request seen from this client on this endpoint.
    Started,
    /// The previous window had expired and a new one was opened.
    Renewed,
    /// Counted inside the current window.
    Counted,
    /// The window is full. Nothing was recorded.
    Denied,
}

impl Admission {
    pub fn is_denied(self) -> bool {
        matches!(self, Admission::Denied)
    }

    /// Whether the table changed and should be persisted.
    pub fn mutated(self) -> bool {
        !self.is_denied()
    }
}

/// Entries removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub expired: usize,
    pub evicted: usize,
}

impl SweepOutcome {
    pub fn removed(&self) -> usize {
        self.expired + self.evicted
    }
}

/// Per-endpoint, per-client request counters.
///
/// Serializes to `{endpoint: {client: [count, timestamp]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable(HashMap<String, HashMap<String, CounterEntry>>);

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, endpoint: &str, client: &str) -> Option<&CounterEntry> {
        self.0.get(endpoint)?.get(client)
    }

    pub fn insert(&mut self, endpoint: &str, client: &str, entry: CounterEntry) {
        self.0
            .entry(endpoint.to_string())
            .or_default()
            .insert(client.to_string(), entry);
    }

    /// Number of endpoints with at least one tracked client.
    pub fn endpoint_count(&self) -> usize {
        self.0.len()
    }

    pub fn client_count(&self, endpoint: &str) -> usize {
        self.0.get(endpoint).map_or(0, HashMap::len)
    }

    /// Total entries across all endpoints.
    pub fn len(&self) -> usize {
        self.0.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(HashMap::is_empty)
    }

    /// Record a request from `client` against `endpoint` at `now`.
    ///
    /// A denied request leaves the table untouched.
    pub fn admit(
        &mut self,
        endpoint: &str,
        client: &str,
        now: DateTime<Utc>,
        policy: &RateLimitPolicy,
    ) -> Admission {
        let clients = self.0.entry(endpoint.to_string()).or_default();

        let Some(entry) = clients.get_mut(client) else {
            clients.insert(client.to_string(), CounterEntry::start(now));
            return Admission::Started;
        };

        if entry.is_expired(now, policy.window()) {
            *entry = CounterEntry::start(now);
            return Admission::Renewed;
        }

        if entry.request_count >= policy.requests_per_window() {
            return Admission::Denied;
        }

        entry.request_count += 1;
        Admission::Counted
    }

    /// Requests left in the current window, without advancing it.
    pub fn remaining(
        &self,
        endpoint: &str,
        client: &str,
        now: DateTime<Utc>,
        policy: &RateLimitPolicy,
    ) -> u32 {
        match self.get(endpoint, client) {
            Some(entry) if !entry.is_expired(now, policy.window()) => policy
                .requests_per_window()
                .saturating_sub(entry.request_count),
            _ => policy.requests_per_window(),
        }
    }

    /// When the client's window ends; `now` for a client never seen.
    pub fn reset_time(
        &self,
        endpoint: &str,
        client: &str,
        now: DateTime<Utc>,
        policy: &RateLimitPolicy,
    ) -> DateTime<Utc> {
        self.get(endpoint, client)
            .map_or(now, |entry| entry.resets_at(policy.window()))
    }

    /// Drop expired windows, then trim each endpoint to `max_clients` by
    /// evicting the oldest windows first. Endpoints left empty are removed.
    pub fn sweep(&mut self, now: DateTime<Utc>, window: TimeDelta, max_clients: usize) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        for clients in self.0.values_mut() {
            let before = clients.len();
            clients.retain(|_, entry| !entry.is_expired(now, window));
            outcome.expired += before - clients.len();

            if clients.len() > max_clients {
                let excess = clients.len() - max_clients;
                let mut by_age: Vec<(DateTime<Utc>, String)> = clients
                    .iter()
                    .map(|(client, entry)| (entry.window_start, client.clone()))
                    .collect();
                by_age.sort_unstable();

                for (_, client) in by_age.into_iter().take(excess) {
                    clients.remove(&client);
                }
                outcome.evicted += excess;
            }
        }

        self.0.retain(|_, clients| !clients.is_empty());
        outcome
    }
}

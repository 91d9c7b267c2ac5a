use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How many requests one client has made against one endpoint since
/// `window_start`.
///
/// Serialized as a `[count, timestamp]` pair so a snapshot stays compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u32, DateTime<Utc>)", into = "(u32, DateTime<Utc>)")]
pub struct CounterEntry {
    pub request_count: u32,
    pub window_start: DateTime<Utc>,
}

impl CounterEntry {
    /// Open a new window at `now` with one request already counted.
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            request_count: 1,
            window_start: now,
        }
    }

    /// A window is expired once strictly more than `window` has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now - self.window_start > window
    }

    pub fn resets_at(&self, window: TimeDelta) -> DateTime<Utc> {
        self.window_start + window
    }
}

impl TryFrom<(u32, DateTime<Utc>)> for CounterEntry {
    type Error = String;

    fn try_from((request_count, window_start): (u32, DateTime<Utc>)) -> Result<Self, Self::Error> {
        if request_count == 0 {
            return Err("request count must be at least 1".to_string());
        }
        Ok(Self {
            request_count,
            window_start,
        })
    }
}

impl From<CounterEntry> for (u32, DateTime<Utc>) {
    fn from(entry: CounterEntry) -> Self {
        (entry.request_count, entry.window_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_is_strict() {
        let entry = CounterEntry::start(noon());
        let window = TimeDelta::hours(24);

        assert!(!entry.is_expired(noon() + window, window));
        assert!(entry.is_expired(noon() + window + TimeDelta::seconds(1), window));
    }

    #[test]
    fn test_serializes_as_pair() {
        let entry = CounterEntry {
            request_count: 3,
            window_start: noon(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"[3,"2026-10-15T12:00:00Z"]"#);
    }

    #[test]
    fn test_rejects_zero_count() {
        let result: Result<CounterEntry, _> = serde_json::from_str(r#"[0,"2026-10-15T12:00:00Z"]"#);
        assert!(result.is_err());
    }
}

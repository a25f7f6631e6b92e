//! Per-location daily AQI trend log.
//!
//! A `TrendStore` keeps at most one entry per (location, date): upserting an
//! existing key replaces its AQI. Entries are never deleted; the "last N
//! days" limit applies only when reading.
//!
//! `TrendLog` wraps a store for use inside a request. It never fails the
//! caller: store errors are logged as operator warnings and reads fall back
//! to an empty series.
//!
//! Submodules:
//! - `file_store`: lock-protected JSON file, rewritten atomically.
//! - `postgres_store`: `aqi_trend` table keyed by (location, log_date).

use crate::config::{TrendBackend, TrendSettings};
use crate::logging::{self, DataSource};
use crate::model::{TrendEntry, TrendError};

pub mod file_store;
pub mod postgres_store;

pub use file_store::JsonFileStore;
pub use postgres_store::PostgresStore;

/// Backing storage for the trend log.
pub trait TrendStore {
    /// Inserts `entry`, replacing any entry with the same location and date.
    fn upsert(&mut self, entry: &TrendEntry) -> Result<(), TrendError>;

    /// The `limit` most recent entries for `location`, oldest first.
    fn recent(&mut self, location: &str, limit: usize) -> Result<Vec<TrendEntry>, TrendError>;
}

// ---------------------------------------------------------------------------
// Shared helpers for in-memory entry lists
// ---------------------------------------------------------------------------

/// Upserts into `entries`, which is kept sorted by (location, date).
pub(crate) fn upsert_sorted(entries: &mut Vec<TrendEntry>, entry: &TrendEntry) {
    let key = (entry.location.as_str(), entry.date);
    match entries.binary_search_by(|e| (e.location.as_str(), e.date).cmp(&key)) {
        Ok(i) => entries[i].aqi = entry.aqi,
        Err(i) => entries.insert(i, entry.clone()),
    }
}

/// The `limit` most recent entries for `location`, oldest first.
pub(crate) fn select_recent(
    entries: &[TrendEntry],
    location: &str,
    limit: usize,
) -> Vec<TrendEntry> {
    let mut matching: Vec<TrendEntry> = entries
        .iter()
        .filter(|e| e.location == location)
        .cloned()
        .collect();
    matching.sort_by_key(|e| e.date);

    let skip = matching.len().saturating_sub(limit);
    matching.split_off(skip)
}

// ---------------------------------------------------------------------------
// Fail-open wrapper
// ---------------------------------------------------------------------------

pub struct TrendLog {
    store: Box<dyn TrendStore>,
}

impl TrendLog {
    pub fn new(store: impl TrendStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Opens the configured backend. `database_url` is only used by the
    /// PostgreSQL backend.
    ///
    /// If that backend has no URL or cannot be reached the log falls back to
    /// the JSON file at `settings.path`.
    pub fn open(settings: &TrendSettings, database_url: Option<&str>) -> Self {
        match settings.backend {
            TrendBackend::File => Self::new(JsonFileStore::new(&settings.path)),
            TrendBackend::Postgres => {
                let connected = database_url
                    .ok_or_else(|| "no database URL configured".to_string())
                    .and_then(|url| PostgresStore::connect(url).map_err(|e| e.to_string()));
                match connected {
                    Ok(store) => Self::new(store),
                    Err(e) => {
                        logging::error(
                            DataSource::TrendLog,
                            None,
                            &format!(
                                "PostgreSQL trend store unavailable ({}); using {}",
                                e,
                                settings.path.display()
                            ),
                        );
                        Self::new(JsonFileStore::new(&settings.path))
                    }
                }
            }
        }
    }

    /// Records one day's AQI. Returns `false` if the store rejected it.
    pub fn record(&mut self, entry: &TrendEntry) -> bool {
        match self.store.upsert(entry) {
            Ok(()) => {
                logging::debug(
                    DataSource::TrendLog,
                    Some(&entry.location),
                    &format!("Recorded AQI {} for {}", entry.aqi, entry.date),
                );
                true
            }
            Err(e) => {
                logging::warn(
                    DataSource::TrendLog,
                    Some(&entry.location),
                    &format!("Upsert failed, trend not updated: {}", e),
                );
                false
            }
        }
    }

    /// Recent history for `location`; empty if the store cannot be read.
    pub fn recent(&mut self, location: &str, limit: usize) -> Vec<TrendEntry> {
        self.store.recent(location, limit).unwrap_or_else(|e| {
            logging::warn(
                DataSource::TrendLog,
                Some(location),
                &format!("Trend log unreadable, showing empty history: {}", e),
            );
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(location: &str, day: u32, aqi: u16) -> TrendEntry {
        TrendEntry {
            date: NaiveDate::from_ymd_opt(2025, 1, day).expect("valid date"),
            location: location.to_string(),
            aqi,
        }
    }

    /// Store that fails every call, for exercising the fail-open paths.
    struct BrokenStore;

    impl TrendStore for BrokenStore {
        fn upsert(&mut self, _entry: &TrendEntry) -> Result<(), TrendError> {
            Err(TrendError::Corrupt("broken".to_string()))
        }

        fn recent(
            &mut self,
            _location: &str,
            _limit: usize,
        ) -> Result<Vec<TrendEntry>, TrendError> {
            Err(TrendError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn test_upsert_sorted_replaces_same_key() {
        let mut entries = Vec::new();
        upsert_sorted(&mut entries, &entry("Pune", 5, 80));
        upsert_sorted(&mut entries, &entry("Pune", 5, 95));
        assert_eq!(entries, vec![entry("Pune", 5, 95)]);
    }

    #[test]
    fn test_upsert_sorted_keeps_key_order() {
        let mut entries = Vec::new();
        upsert_sorted(&mut entries, &entry("Pune", 7, 1));
        upsert_sorted(&mut entries, &entry("Delhi", 9, 2));
        upsert_sorted(&mut entries, &entry("Pune", 3, 3));
        let keys: Vec<_> = entries.iter().map(|e| (e.location.as_str(), e.date)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_select_recent_limits_and_orders_ascending() {
        let mut entries = Vec::new();
        for day in 1..=10 {
            upsert_sorted(&mut entries, &entry("Pune", day, day as u16 * 10));
            upsert_sorted(&mut entries, &entry("Delhi", day, 300));
        }
        let recent = select_recent(&entries, "Pune", 7);
        assert_eq!(recent.len(), 7);
        assert!(recent.iter().all(|e| e.location == "Pune"));
        let days: Vec<_> = recent.iter().map(|e| e.aqi).collect();
        assert_eq!(days, vec![40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn test_select_recent_with_fewer_entries_than_limit() {
        let entries = vec![entry("Pune", 2, 60)];
        assert_eq!(select_recent(&entries, "Pune", 7).len(), 1);
        assert!(select_recent(&entries, "Mumbai", 7).is_empty());
        assert!(select_recent(&entries, "Pune", 0).is_empty());
    }

    #[test]
    fn test_trend_log_fails_open() {
        let mut log = TrendLog::new(BrokenStore);
        assert!(!log.record(&entry("Pune", 1, 50)));
        assert!(log.recent("Pune", 7).is_empty());
    }

    fn postgres_settings(dir: &tempfile::TempDir) -> TrendSettings {
        TrendSettings {
            backend: TrendBackend::Postgres,
            path: dir.path().join("aqi_trend.json"),
            recent_days: 7,
        }
    }

    #[test]
    fn test_unreachable_database_falls_back_to_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let settings = postgres_settings(&dir);

        let mut log = TrendLog::open(&settings, Some("postgres://airsense@127.0.0.1:1/airsense"));
        assert!(log.record(&entry("Pune", 4, 88)), "write should land in the JSON file");
        assert_eq!(log.recent("Pune", 7), vec![entry("Pune", 4, 88)]);
        assert!(settings.path.exists(), "fallback file should have been written");
    }

    #[test]
    fn test_missing_database_url_falls_back_to_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let settings = postgres_settings(&dir);

        let mut log = TrendLog::open(&settings, None);
        assert!(log.record(&entry("Pune", 4, 88)));
        assert_eq!(log.recent("Pune", 7).len(), 1);
    }
}

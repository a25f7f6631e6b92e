/// Integration tests for the full "fetch AQI" pipeline
///
/// These tests verify:
/// 1. geocode → fetch → assess → trend upsert → trend read → comparison
/// 2. Today's AQI is in the trend returned by the same request
/// 3. The trend is bounded to the configured number of days
/// 4. Trend entries for different locations never mix
/// 5. A failed lookup for the requested location still returns the comparison
/// 6. Concurrent writers to one JSON trend file lose no entries
///
/// Everything runs against an in-process fake provider and a temporary
/// trend file, so no network or database is needed.

use std::thread;

use airsense_service::breakpoints::Category;
use airsense_service::ingest::{Geocoder, PollutionSource};
use airsense_service::model::{
    Coordinates, LookupError, Pollutant, PollutantReading, ProviderError, TrendEntry,
};
use airsense_service::report::AirSenseService;
use airsense_service::trend::{JsonFileStore, TrendLog, TrendStore};

use chrono::{Days, NaiveDate};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Known places, keyed by latitude.
struct FakeProvider;

impl Geocoder for FakeProvider {
    fn geocode(&self, location: &str) -> Result<Coordinates, LookupError> {
        let latitude = match location {
            "Pune" => 18.52,
            "Nagpur" => 21.15,
            "Delhi" => 28.61,
            "Mumbai" => 19.07,
            "Kolkata" => 22.57,
            _ => return Err(LookupError::LocationNotFound(location.to_string())),
        };
        Ok(Coordinates {
            latitude,
            longitude: 77.0,
        })
    }
}

impl PollutionSource for FakeProvider {
    fn fetch_reading(&self, at: Coordinates) -> Result<PollutantReading, ProviderError> {
        let reading = PollutantReading::new();
        match at.latitude {
            lat if lat == 18.52 => Ok(reading
                .with(Pollutant::Pm2_5, 45.0)
                .with(Pollutant::Pm10, 20.0)),
            lat if lat == 21.15 => Ok(reading.with(Pollutant::O3, 50.0)),
            lat if lat == 28.61 => Ok(reading.with(Pollutant::Pm2_5, 100.0)),
            lat if lat == 19.07 => Ok(reading.with(Pollutant::Pm10, 20.0)),
            _ => Err(ProviderError::Timeout),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn service_in(dir: &TempDir, references: &[&str]) -> AirSenseService<FakeProvider> {
    let store = JsonFileStore::new(dir.path().join("aqi_trend.json"));
    AirSenseService::new(
        FakeProvider,
        TrendLog::new(store),
        references.iter().map(|s| s.to_string()).collect(),
        7,
    )
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_fetch_report_end_to_end() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &["Delhi", "Kolkata", "Mumbai"]);

    let report = service
        .fetch_report("  Pune ", date(2025, 1, 10))
        .expect("Pune should resolve");

    assert_eq!(report.location, "Pune", "location key should be trimmed");
    assert_eq!(report.outcome.value, Some(75));
    assert_eq!(report.outcome.category, Some(Category::Satisfactory));
    assert_eq!(report.outcome.dominant, Some(Pollutant::Pm2_5));
    let detail = report.detail.as_ref().expect("Pune lookup succeeds");
    assert_eq!(detail.sub_indices.get(&Pollutant::Pm10), Some(&20));

    assert_eq!(
        report.trend,
        vec![TrendEntry {
            date: date(2025, 1, 10),
            location: "Pune".to_string(),
            aqi: 75,
        }],
        "today's AQI must be visible in the same request"
    );

    let rows: Vec<_> = report
        .comparison
        .iter()
        .map(|r| (r.location.as_str(), r.aqi))
        .collect();
    assert_eq!(
        rows,
        vec![("Delhi", 232), ("Kolkata", 0), ("Mumbai", 20), ("Pune", 75)],
        "reference rows in order, failed city degraded, own row last"
    );
    assert_eq!(report.comparison[1].category_label(), "Unavailable");

    assert!(!detail.advisories.is_empty(), "advisories always hold at least one entry");
    assert_eq!(detail.levels.len(), 2);
}

#[test]
fn test_same_day_refetch_replaces_entry() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &[]);

    service.fetch_report("Pune", date(2025, 1, 10)).expect("first fetch");
    let report = service.fetch_report("Pune", date(2025, 1, 10)).expect("second fetch");

    assert_eq!(report.trend.len(), 1, "one entry per (location, date)");
}

#[test]
fn test_trend_is_bounded_and_oldest_first() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &[]);

    let start = date(2025, 1, 1);
    let mut last = None;
    for offset in 0..10 {
        let day = start + Days::new(offset);
        last = Some(service.fetch_report("Pune", day).expect("fetch"));
    }
    let report = last.expect("at least one report");

    assert_eq!(report.trend.len(), 7, "trend keeps the last 7 days only");
    assert_eq!(report.trend.first().map(|e| e.date), Some(date(2025, 1, 4)));
    assert_eq!(report.trend.last().map(|e| e.date), Some(date(2025, 1, 10)));

    // Older entries are kept on disk; only the read is bounded.
    let mut store = JsonFileStore::new(dir.path().join("aqi_trend.json"));
    assert_eq!(store.recent("Pune", 100).expect("read back").len(), 10);
}

#[test]
fn test_trend_locations_are_isolated() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &[]);

    service.fetch_report("Pune", date(2025, 1, 10)).expect("Pune");
    let report = service.fetch_report("Nagpur", date(2025, 1, 10)).expect("Nagpur");

    assert_eq!(report.trend.len(), 1);
    assert!(
        report.trend.iter().all(|e| e.location == "Nagpur"),
        "Nagpur's trend must not contain Pune entries"
    );
}

#[test]
fn test_unknown_location_degrades_to_unavailable() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &["Delhi"]);

    let report = service
        .fetch_report("Atlantis", date(2025, 1, 10))
        .expect("report is still built");
    assert_eq!(
        report.detail,
        Err(LookupError::LocationNotFound("Atlantis".to_string()))
    );
    assert_eq!(report.outcome.value, None);
    assert_eq!(report.outcome.category_label(), "Unavailable");

    let rows: Vec<_> = report
        .comparison
        .iter()
        .map(|r| (r.location.as_str(), r.aqi))
        .collect();
    assert_eq!(rows, vec![("Delhi", 232), ("Atlantis", 0)]);

    assert!(
        !dir.path().join("aqi_trend.json").exists(),
        "failed lookups must not write to the trend log"
    );
}

#[test]
fn test_blank_location_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut service = service_in(&dir, &["Delhi"]);

    assert_eq!(
        service.fetch_report("   ", date(2025, 1, 10)).map(|r| r.outcome),
        Err(LookupError::EmptyLocation)
    );
}

#[test]
fn test_provider_failure_keeps_comparison_and_skips_upsert() {
    let dir = TempDir::new().expect("temp dir");
    // Kolkata geocodes but its pollution fetch times out.
    let mut service = service_in(&dir, &["Delhi", "Mumbai"]);

    let report = service
        .fetch_report("Kolkata", date(2025, 1, 10))
        .expect("report is still built");
    assert_eq!(
        report.detail,
        Err(LookupError::ProviderUnavailable {
            location: "Kolkata".to_string(),
            source: ProviderError::Timeout,
        })
    );
    assert!(report.trend.is_empty());

    let rows: Vec<_> = report
        .comparison
        .iter()
        .map(|r| (r.location.as_str(), r.aqi, r.category_label()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Delhi", 232, "🔴 Poor"),
            ("Mumbai", 20, "🟢 Good"),
            ("Kolkata", 0, "Unavailable"),
        ],
        "reference rows survive a failed primary lookup"
    );
    assert!(!dir.path().join("aqi_trend.json").exists());
}

// ---------------------------------------------------------------------------
// Concurrent writers
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_upserts_lose_no_entries() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("aqi_trend.json");

    let writers = 8;
    let days_per_writer = 5;

    thread::scope(|scope| {
        for writer in 0..writers {
            let path = path.clone();
            scope.spawn(move || {
                let mut store = JsonFileStore::new(path);
                for day in 0..days_per_writer {
                    let entry = TrendEntry {
                        date: date(2025, 1, 1) + Days::new(day),
                        location: format!("City{}", writer),
                        aqi: (writer * 10 + day) as u16,
                    };
                    store.upsert(&entry).expect("upsert under contention");
                }
            });
        }
    });

    let mut store = JsonFileStore::new(&path);
    for writer in 0..writers {
        let entries = store
            .recent(&format!("City{}", writer), 100)
            .expect("read back");
        assert_eq!(
            entries.len(),
            days_per_writer as usize,
            "City{} lost entries to a concurrent writer",
            writer
        );
    }
}

/// Live integration tests against OpenWeather and PostgreSQL
///
/// Prerequisites:
/// - OPENWEATHER_API_KEY set in the environment or .env
/// - DATABASE_URL set for the PostgreSQL test (the `aqi_trend` table is
///   created if missing)
/// - Internet connectivity
///
/// Run with: cargo test --test live_integration -- --ignored --test-threads=1

use airsense_service::analysis::aqi::calculate_aqi;
use airsense_service::config::{self, ApiCredentials, ProviderSettings};
use airsense_service::ingest::openweather::OpenWeatherClient;
use airsense_service::ingest::{Geocoder, PollutionSource};
use airsense_service::model::{LookupError, TrendEntry};
use airsense_service::trend::{PostgresStore, TrendStore};

use chrono::{Days, NaiveDate};

fn live_client() -> OpenWeatherClient {
    dotenv::dotenv().ok();
    let credentials = ApiCredentials::from_env().unwrap_or_else(|e| {
        panic!("live tests need {}: {}", config::API_KEY_VAR, e);
    });
    OpenWeatherClient::new(ProviderSettings::default(), credentials).expect("HTTP client builds")
}

#[test]
#[ignore]
fn test_live_geocode_and_fetch_delhi() {
    let client = live_client();

    let coordinates = client.geocode("Delhi").expect("Delhi geocodes");
    assert!(
        (28.0..29.5).contains(&coordinates.latitude),
        "Delhi latitude looks wrong: {}",
        coordinates.latitude
    );

    let reading = client.fetch_reading(coordinates).expect("air pollution snapshot");
    assert!(!reading.is_empty(), "snapshot should carry pollutant values");

    let outcome = calculate_aqi(&reading);
    println!(
        "Delhi AQI: {:?} {} ({})",
        outcome.value,
        outcome.category_label(),
        outcome.dominant_label()
    );
}

#[test]
#[ignore]
fn test_live_unknown_location_is_not_found() {
    let client = live_client();
    let result = client.geocode("Qzxv Nowhere Town 000");
    assert!(
        matches!(result, Err(LookupError::LocationNotFound(_))),
        "expected LocationNotFound, got {:?}",
        result
    );
}

#[test]
#[ignore]
fn test_live_postgres_upsert_and_recent() {
    dotenv::dotenv().ok();
    let url = config::database_url_from_env().expect("DATABASE_URL must be set");
    let mut store = PostgresStore::connect(&url).expect("PostgreSQL reachable");

    let location = "airsense-live-test";
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date");
    for offset in 0..9 {
        store
            .upsert(&TrendEntry {
                date: start + Days::new(offset),
                location: location.to_string(),
                aqi: 100 + offset as u16,
            })
            .expect("upsert");
    }
    // Same key again: replaces, does not duplicate.
    store
        .upsert(&TrendEntry {
            date: start + Days::new(8),
            location: location.to_string(),
            aqi: 42,
        })
        .expect("re-upsert");

    let recent = store.recent(location, 7).expect("recent");
    assert_eq!(recent.len(), 7);
    assert_eq!(recent.first().map(|e| e.date), Some(start + Days::new(2)));
    assert_eq!(recent.last().map(|e| e.aqi), Some(42));
}

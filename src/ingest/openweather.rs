//! OpenWeather geocoding and air-pollution API client.
//!
//! Resolves a free-text location to coordinates via the Geocoding API, then
//! retrieves the current pollutant concentrations for those coordinates via
//! the Air Pollution API. Both endpoints return JSON; parsing is split into
//! pure functions so it can be tested without network access.
//!
//! API documentation:
//!   https://openweathermap.org/api/geocoding-api
//!   https://openweathermap.org/api/air-pollution

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{ApiCredentials, ProviderSettings};
use crate::ingest::{Geocoder, PollutionSource};
use crate::logging::{self, DataSource};
use crate::model::{Coordinates, LookupError, Pollutant, PollutantReading, ProviderError};

// ============================================================================
// API Response Structures
// ============================================================================

/// One match from the direct geocoding endpoint. Only the position is kept.
#[derive(Debug, Deserialize)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,
}

/// Air pollution endpoint response. `list` holds one entry for the
/// current-conditions endpoint.
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    /// Concentrations in µg/m³ keyed by pollutant id.
    pub components: BTreeMap<String, f64>,
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parses a geocoding response body. `Ok(None)` means the provider returned
/// no match.
pub fn parse_geocode_response(body: &str) -> Result<Option<Coordinates>, ProviderError> {
    let hits: Vec<GeocodeHit> =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    Ok(hits.into_iter().next().map(|hit| Coordinates {
        latitude: hit.lat,
        longitude: hit.lon,
    }))
}

/// Parses an air-pollution response body into a reading.
///
/// Components with identifiers outside the known pollutant set are dropped.
pub fn parse_air_pollution_response(body: &str) -> Result<PollutantReading, ProviderError> {
    let response: AirPollutionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let entry = response
        .list
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    let reading: PollutantReading = entry
        .components
        .iter()
        .filter_map(|(id, value)| Pollutant::from_id(id).map(|p| (p, *value)))
        .collect();

    if reading.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(reading)
}

// ============================================================================
// API Client
// ============================================================================

/// Blocking client for both OpenWeather endpoints.
///
/// Every request is bounded by `ProviderSettings::timeout_secs`.
pub struct OpenWeatherClient {
    http: reqwest::blocking::Client,
    settings: ProviderSettings,
    credentials: ApiCredentials,
}

impl OpenWeatherClient {
    pub fn new(
        settings: ProviderSettings,
        credentials: ApiCredentials,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            settings,
            credentials,
        })
    }

    fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.credentials.api_key.as_str())])
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(response.status().as_u16()));
        }

        Ok(response.text()?)
    }
}

impl Geocoder for OpenWeatherClient {
    fn geocode(&self, location: &str) -> Result<Coordinates, LookupError> {
        let hit = self
            .get_body(
                &self.settings.geocoding_url,
                &[("q", location.to_string()), ("limit", "1".to_string())],
            )
            .and_then(|body| parse_geocode_response(&body))
            .map_err(|source| LookupError::ProviderUnavailable {
                location: location.to_string(),
                source,
            })?;

        hit.ok_or_else(|| {
            logging::debug(DataSource::Geocoding, Some(location), "No geocoding match");
            LookupError::LocationNotFound(location.to_string())
        })
    }
}

impl PollutionSource for OpenWeatherClient {
    fn fetch_reading(&self, at: Coordinates) -> Result<PollutantReading, ProviderError> {
        let body = self.get_body(
            &self.settings.air_pollution_url,
            &[("lat", at.latitude.to_string()), ("lon", at.longitude.to_string())],
        )?;
        parse_air_pollution_response(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PUNE_GEOCODE: &str = r#"[
        {"name":"Pune","local_names":{"en":"Pune"},
         "lat":18.5213738,"lon":73.8545071,
         "country":"IN","state":"Maharashtra"}
    ]"#;

    const AIR_POLLUTION: &str = r#"{
        "coord":{"lon":73.8545,"lat":18.5214},
        "list":[{
            "main":{"aqi":3},
            "components":{
                "co":534.06,"no":0.31,"no2":13.54,"o3":62.23,
                "so2":8.82,"pm2_5":45.0,"pm10":20.0,"nh3":3.42
            },
            "dt":1717315200
        }]
    }"#;

    #[test]
    fn test_parse_geocode_takes_first_hit() {
        let coords = parse_geocode_response(PUNE_GEOCODE)
            .expect("valid body")
            .expect("one hit");
        assert!((coords.latitude - 18.5213738).abs() < 1e-9);
        assert!((coords.longitude - 73.8545071).abs() < 1e-9);
    }

    #[test]
    fn test_parse_geocode_empty_array_is_not_found() {
        assert_eq!(parse_geocode_response("[]"), Ok(None));
    }

    #[test]
    fn test_parse_geocode_error_object_is_parse_error() {
        let body = r#"{"cod":401,"message":"Invalid API key"}"#;
        assert!(matches!(parse_geocode_response(body), Err(ProviderError::ParseError(_))));
    }

    #[test]
    fn test_parse_air_pollution_components() {
        let reading = parse_air_pollution_response(AIR_POLLUTION).expect("valid body");
        assert_eq!(reading.len(), 8);
        assert_eq!(reading.get(Pollutant::Pm2_5), Some(45.0));
        assert_eq!(reading.get(Pollutant::Pm10), Some(20.0));
        assert_eq!(reading.get(Pollutant::Co), Some(534.06));
    }

    #[test]
    fn test_parse_air_pollution_drops_unknown_components() {
        let body = r#"{"list":[{"components":{"pm2_5":12.0,"pm1":4.0}}]}"#;
        let reading = parse_air_pollution_response(body).expect("valid body");
        assert_eq!(reading.len(), 1);
        assert_eq!(reading.get(Pollutant::Pm2_5), Some(12.0));
    }

    #[test]
    fn test_parse_air_pollution_empty_list() {
        assert_eq!(
            parse_air_pollution_response(r#"{"list":[]}"#),
            Err(ProviderError::EmptyResponse)
        );
        assert_eq!(
            parse_air_pollution_response(r#"{"coord":{"lon":0,"lat":0}}"#),
            Err(ProviderError::EmptyResponse)
        );
    }

    #[test]
    fn test_parse_air_pollution_malformed_body() {
        assert!(matches!(
            parse_air_pollution_response("<html>502 Bad Gateway</html>"),
            Err(ProviderError::ParseError(_))
        ));
    }
}

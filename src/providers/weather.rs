//! Current weather provider backed by OpenWeatherMap.
//!
//! API: `https://api.openweathermap.org/data/2.5/weather`
//! Auth: API key via `appid` query param.
//! Units: metric (°C, m/s) requested explicitly.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, SectionData, SectionKind, SectionProvider};
use crate::types::{CityPulseError, CurrentWeather, GeoCity, PulseResult};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const PROVIDER: &str = "openweathermap";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwmWeatherResponse {
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    /// Observation time, unix seconds.
    #[serde(default)]
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Title-case each word of a condition description ("scattered clouds" →
/// "Scattered Clouds"), matching the dashboard's display convention.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map the raw payload into the canonical record. Returns `None` when the
/// payload carries no condition entry at all.
fn normalize(raw: &OwmWeatherResponse) -> Option<CurrentWeather> {
    let condition = raw.weather.first()?;
    let observed_at = raw
        .dt
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Some(CurrentWeather {
        temperature_c: raw.main.temp,
        feels_like_c: raw.main.feels_like,
        humidity_pct: raw.main.humidity,
        wind_speed_ms: raw.wind.as_ref().map_or(0.0, |w| w.speed),
        condition_text: title_case(&condition.description),
        icon: condition.icon.clone(),
        observed_at,
    })
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct CurrentWeatherProvider {
    http: Client,
    api_key: Option<String>,
}

impl CurrentWeatherProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }
}

#[async_trait]
impl SectionProvider for CurrentWeatherProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::CurrentWeather
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        // Coordinates come from the geocoding step; without them there is
        // nothing to ask the API for.
        let Some(coords) = city.coords else {
            return Err(CityPulseError::ProviderEmptyResult { provider: PROVIDER });
        };

        let url = format!(
            "{BASE_URL}?lat={}&lon={}&units=metric&appid={key}",
            coords.lat, coords.lon,
        );

        let resp = self.http.get(&url).send().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CityPulseError::ProviderAuth { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(CityPulseError::ProviderUnavailable {
                provider: PROVIDER,
                message: format!("HTTP {status}"),
            });
        }

        let raw: OwmWeatherResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(city = %city.label, "Current weather fetched");
        Ok(normalize(&raw).map(SectionData::CurrentWeather))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
        "main": {"temp": 28.4, "feels_like": 31.2, "temp_min": 27.0, "temp_max": 29.0,
                 "pressure": 1005, "humidity": 74},
        "wind": {"speed": 3.6, "deg": 250},
        "dt": 1756450800,
        "name": "Mumbai"
    }"#;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("scattered clouds"), "Scattered Clouds");
        assert_eq!(title_case("haze"), "Haze");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalize_fixture() {
        let raw: OwmWeatherResponse = serde_json::from_str(FIXTURE).unwrap();
        let weather = normalize(&raw).unwrap();
        assert!((weather.temperature_c - 28.4).abs() < 1e-10);
        assert!((weather.feels_like_c - 31.2).abs() < 1e-10);
        assert!((weather.humidity_pct - 74.0).abs() < 1e-10);
        assert!((weather.wind_speed_ms - 3.6).abs() < 1e-10);
        assert_eq!(weather.condition_text, "Haze");
        assert_eq!(weather.icon, "50d");
        assert_eq!(weather.observed_at.timestamp(), 1756450800);
    }

    #[test]
    fn test_normalize_idempotent() {
        let raw: OwmWeatherResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(normalize(&raw), normalize(&raw));
    }

    #[test]
    fn test_normalize_missing_condition_is_none() {
        let raw: OwmWeatherResponse = serde_json::from_str(
            r#"{"weather": [], "main": {"temp": 1.0, "feels_like": 0.0, "humidity": 50}}"#,
        )
        .unwrap();
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn test_normalize_missing_wind_defaults_zero() {
        let raw: OwmWeatherResponse = serde_json::from_str(
            r#"{"weather": [{"description": "clear sky", "icon": "01d"}],
                "main": {"temp": 20.0, "feels_like": 19.0, "humidity": 40}}"#,
        )
        .unwrap();
        let weather = normalize(&raw).unwrap();
        assert_eq!(weather.wind_speed_ms, 0.0);
        assert_eq!(weather.condition_text, "Clear Sky");
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let provider = CurrentWeatherProvider::new(None, Duration::from_secs(5)).unwrap();
        let city = GeoCity::unresolved("Mumbai");
        let err = provider.fetch(&city).await.unwrap_err();
        assert!(matches!(err, CityPulseError::ProviderAuth { .. }));
    }

    #[test]
    fn test_provider_kind() {
        let provider =
            CurrentWeatherProvider::new(Some("k".into()), Duration::from_secs(5)).unwrap();
        assert_eq!(provider.kind(), SectionKind::CurrentWeather);
        assert_eq!(provider.name(), "openweathermap");
    }
}

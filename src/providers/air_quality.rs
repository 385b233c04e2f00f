//! Air quality provider backed by the OpenWeatherMap air pollution API.
//!
//! API: `http://api.openweathermap.org/data/2.5/air_pollution`
//! Auth: API key via `appid` query param (shared with the weather key).
//!
//! The API reports an AQI index 1–5 plus pollutant concentrations in µg/m³.
//! The dominant pollutant is derived as the component with the highest
//! concentration, since the API does not name one itself.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::{http_client, SectionData, SectionKind, SectionProvider};
use crate::types::{AqiReading, CityPulseError, GeoCity, PulseResult};

const BASE_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";
const PROVIDER: &str = "openweathermap-air";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwmAirResponse {
    #[serde(default)]
    list: Vec<OwmAirEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmAirEntry {
    main: OwmAirMain,
    #[serde(default)]
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct OwmAirMain {
    aqi: u8,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Render an API component key as a display pollutant name:
/// `pm2_5` → `PM2.5`, `no2` → `NO2`.
fn pollutant_name(key: &str) -> String {
    key.to_uppercase().replace('_', ".")
}

/// Map the raw payload into a canonical reading. Returns `None` when the
/// reading list is empty or carries no components.
fn normalize(raw: &OwmAirResponse) -> Option<AqiReading> {
    let entry = raw.list.first()?;
    if entry.components.is_empty() {
        return None;
    }

    let breakdown: BTreeMap<String, f64> = entry
        .components
        .iter()
        .map(|(k, v)| (pollutant_name(k), *v))
        .collect();

    let dominant = breakdown
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(name, _)| name.clone())?;

    Some(AqiReading {
        index_value: entry.main.aqi,
        level: AqiReading::describe_index(entry.main.aqi).to_string(),
        dominant_pollutant: dominant,
        pollutant_breakdown: breakdown,
    })
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct AirQualityProvider {
    http: Client,
    api_key: Option<String>,
}

impl AirQualityProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }
}

#[async_trait]
impl SectionProvider for AirQualityProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::AirQuality
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        let Some(coords) = city.coords else {
            return Err(CityPulseError::ProviderEmptyResult { provider: PROVIDER });
        };

        let url = format!("{BASE_URL}?lat={}&lon={}&appid={key}", coords.lat, coords.lon);

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

        let raw: OwmAirResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(city = %city.label, readings = raw.list.len(), "Air quality fetched");
        Ok(normalize(&raw).map(SectionData::AirQuality))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! City geocoding via the OpenWeatherMap direct geocoding API.
//!
//! Resolves a free-text city name to coordinates once per snapshot request;
//! the coordinate-dependent providers (current weather, air quality) receive
//! the resolved `GeoCity`.
//!
//! API: `http://api.openweathermap.org/geo/1.0/direct`
//! Auth: API key via `appid` query param.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::http_client;
use crate::types::{CityPulseError, Coordinates, GeoCity, PulseResult};

const BASE_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const PROVIDER: &str = "openweathermap-geocoding";

/// Maximum candidate cities requested per lookup.
const LOOKUP_LIMIT: u8 = 5;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    #[serde(default)]
    state: Option<String>,
    country: String,
    lat: f64,
    lon: f64,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert the raw candidate list into resolved cities. Returns `None` when
/// the provider matched nothing.
fn normalize(query: &str, entries: &[GeoEntry]) -> Option<Vec<GeoCity>> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|e| {
                let label = match e.state.as_deref().filter(|s| !s.is_empty()) {
                    Some(state) => format!("{}, {}, {}", e.name, state, e.country),
                    None => format!("{}, {}", e.name, e.country),
                };
                GeoCity {
                    name: query.to_string(),
                    label,
                    coords: Some(Coordinates { lat: e.lat, lon: e.lon }),
                }
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GeocodeClient {
    http: Client,
    api_key: Option<String>,
}

impl GeocodeClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }

    /// Look up candidate cities for a query string, best match first.
    pub async fn search(&self, query: &str) -> PulseResult<Vec<GeoCity>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        let url = format!(
            "{BASE_URL}?q={}&limit={LOOKUP_LIMIT}&appid={key}",
            urlencoding::encode(query),
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

        let entries: Vec<GeoEntry> = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(query, candidates = entries.len(), "Geocoding lookup complete");

        normalize(query, &entries)
            .ok_or(CityPulseError::ProviderEmptyResult { provider: PROVIDER })
    }

    /// Resolve the single best match for a city name.
    pub async fn resolve(&self, city_name: &str) -> PulseResult<GeoCity> {
        let mut candidates = self.search(city_name).await?;
        // search never returns Ok with an empty list
        Ok(candidates.remove(0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

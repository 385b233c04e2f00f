//! Tourist attractions provider backed by the Google Places text search API.
//!
//! API: `https://maps.googleapis.com/maps/api/place/textsearch/json`
//! Auth: API key via `key` query param.
//!
//! The Places API signals failures through its own `status` field alongside
//! HTTP 200, so both layers are checked.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, SectionData, SectionKind, SectionProvider};
use crate::types::{CityPulseError, GeoCity, PlaceListing, PulseResult};

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const PROVIDER: &str = "google-places";

/// Listings kept per city.
const MAX_PLACES: usize = 10;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert raw results into listings, keeping the first `MAX_PLACES`.
/// Results without a name are malformed and dropped. `None` when nothing
/// usable remains.
fn normalize(raw: &PlacesResponse) -> Option<Vec<PlaceListing>> {
    let listings: Vec<PlaceListing> = raw
        .results
        .iter()
        .filter_map(|place| {
            let name = place.name.clone()?;
            Some(PlaceListing {
                name,
                rating: place.rating,
                category: place.types.first().cloned(),
                address: place.formatted_address.clone(),
            })
        })
        .take(MAX_PLACES)
        .collect();

    if listings.is_empty() {
        None
    } else {
        Some(listings)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct AttractionsProvider {
    http: Client,
    api_key: Option<String>,
}

impl AttractionsProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }
}

#[async_trait]
impl SectionProvider for AttractionsProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::Attractions
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        let query = format!("top tourist attractions in {}", city.name);
        let url = format!("{BASE_URL}?query={}&key={key}", urlencoding::encode(&query));

        let resp = self.http.get(&url).send().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CityPulseError::ProviderUnavailable {
                provider: PROVIDER,
                message: format!("HTTP {status}"),
            });
        }

        let raw: PlacesResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        match raw.status.as_str() {
            "OK" | "" => {}
            "ZERO_RESULTS" => {
                return Err(CityPulseError::ProviderEmptyResult { provider: PROVIDER })
            }
            "REQUEST_DENIED" | "INVALID_REQUEST" => {
                return Err(CityPulseError::ProviderAuth { provider: PROVIDER })
            }
            other => {
                return Err(CityPulseError::ProviderUnavailable {
                    provider: PROVIDER,
                    message: format!("Places status: {other}"),
                })
            }
        }

        debug!(city = %city.name, results = raw.results.len(), "Attractions fetched");
        Ok(normalize(&raw).map(SectionData::Attractions))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

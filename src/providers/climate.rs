//! Monthly climate summary provider backed by Visual Crossing.
//!
//! Uses the timeline API with `include=months` to retrieve a twelve-month
//! climate summary for a city, keyed by name rather than coordinates.
//!
//! API: `https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/{city}`
//! Auth: API key via `key` query param.
//! Units: metric unit group (°C, mm).

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, SectionData, SectionKind, SectionProvider};
use crate::types::{CityPulseError, GeoCity, MonthlyClimate, PulseResult};

const BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";
const PROVIDER: &str = "visualcrossing";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VcTimelineResponse {
    #[serde(default)]
    months: Vec<VcMonth>,
}

#[derive(Debug, Deserialize)]
struct VcMonth {
    /// Calendar month, 1–12.
    month: u32,
    /// Mean temperature for the month.
    temp: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    precip: f64,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert the raw month list into the canonical series. Months outside 1–12
/// are dropped rather than surfaced malformed; an empty series maps to `None`.
fn normalize(raw: &VcTimelineResponse) -> Option<Vec<MonthlyClimate>> {
    let series: Vec<MonthlyClimate> = raw
        .months
        .iter()
        .filter(|m| (1..=12).contains(&m.month))
        .map(|m| MonthlyClimate {
            month: m.month,
            avg_temp_c: m.temp,
            humidity_pct: m.humidity,
            precip_mm: m.precip,
        })
        .collect();

    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct MonthlyClimateProvider {
    http: Client,
    api_key: Option<String>,
}

impl MonthlyClimateProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }
}

#[async_trait]
impl SectionProvider for MonthlyClimateProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::MonthlyClimate
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        let url = format!(
            "{BASE_URL}/{}?unitGroup=metric&include=months&key={key}&contentType=json",
            urlencoding::encode(&city.name),
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

        let raw: VcTimelineResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(city = %city.name, months = raw.months.len(), "Monthly climate fetched");
        Ok(normalize(&raw).map(SectionData::MonthlyClimate))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

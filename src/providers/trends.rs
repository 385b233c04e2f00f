//! Search-interest provider backed by the (unofficial) Google Trends API.
//!
//! Implements the two-step widget flow: an `explore` request yields a signed
//! token for the TIMESERIES widget, then `widgetdata/multiline` returns the
//! interest-over-time series for the keyword `tourist places in {city}`
//! over the last seven days. No credential is required, but both endpoints
//! prefix their JSON bodies with an anti-hijacking junk sequence (`)]}'`)
//! that must be stripped before parsing, and a browser user agent avoids
//! 429 responses.
//!
//! Explore:    `https://trends.google.com/trends/api/explore`
//! Widgetdata: `https://trends.google.com/trends/api/widgetdata/multiline`

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{SectionData, SectionKind, SectionProvider};
use crate::types::{CityPulseError, GeoCity, PulseResult, TrendPoint};

const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const WIDGETDATA_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";
const PROVIDER: &str = "google-trends";

/// Trends timeframe token: the last seven days.
const TIMEFRAME: &str = "now 7-d";

/// Timezone offset in minutes, as the Trends frontend sends it.
const TZ_OFFSET: i32 = 360;

/// Desktop browser user agent; the API rate-limits unknown agents hard.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    #[serde(default)]
    id: String,
    #[serde(default)]
    token: String,
    /// Opaque request blob echoed back to the widgetdata endpoint.
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    #[serde(default)]
    default: MultilineDefault,
}

#[derive(Debug, Deserialize, Default)]
struct MultilineDefault {
    #[serde(default, rename = "timelineData")]
    timeline_data: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    /// Unix seconds as a decimal string.
    #[serde(default)]
    time: String,
    #[serde(default)]
    value: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Strip the `)]}'`-style junk prefix Google puts before the JSON body.
fn strip_junk_prefix(body: &str) -> &str {
    match body.find(['{', '[']) {
        Some(idx) => &body[idx..],
        None => body,
    }
}

/// Convert the widget timeline into the canonical series. Entries with an
/// unparsable timestamp or no value are dropped; an empty series maps to
/// `None`.
fn normalize(raw: &MultilineResponse) -> Option<Vec<TrendPoint>> {
    let points: Vec<TrendPoint> = raw
        .default
        .timeline_data
        .iter()
        .filter_map(|entry| {
            let secs: i64 = entry.time.parse().ok()?;
            let timestamp = DateTime::<Utc>::from_timestamp(secs, 0)?;
            let relative_interest = (*entry.value.first()?).min(100);
            Some(TrendPoint { timestamp, relative_interest })
        })
        .collect();

    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct TrendsProvider {
    http: Client,
}

impl TrendsProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to build trends HTTP client")?;
        Ok(Self { http })
    }

    /// Fetch text from a trends endpoint, translating transport errors.
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> PulseResult<String> {
        let resp = self.http.get(url).query(query).send().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CityPulseError::ProviderUnavailable {
                provider: PROVIDER,
                message: format!("HTTP {status}"),
            });
        }

        resp.text().await.map_err(|e| CityPulseError::ProviderUnavailable {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }

    /// Step 1: resolve the TIMESERIES widget token for a keyword.
    async fn explore(&self, keyword: &str) -> PulseResult<Widget> {
        let req = json!({
            "comparisonItem": [{"keyword": keyword, "time": TIMEFRAME, "geo": ""}],
            "category": 0,
            "property": "",
        });
        let query = [
            ("hl", "en-US".to_string()),
            ("tz", TZ_OFFSET.to_string()),
            ("req", req.to_string()),
        ];

        let body = self.get_text(EXPLORE_URL, &query).await?;
        let parsed: ExploreResponse =
            serde_json::from_str(strip_junk_prefix(&body)).map_err(|e| {
                CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
            })?;

        parsed
            .widgets
            .into_iter()
            .find(|w| w.id == "TIMESERIES")
            .ok_or(CityPulseError::ProviderEmptyResult { provider: PROVIDER })
    }

    /// Step 2: fetch the interest-over-time series for a resolved widget.
    async fn interest_over_time(&self, widget: &Widget) -> PulseResult<MultilineResponse> {
        let query = [
            ("hl", "en-US".to_string()),
            ("tz", TZ_OFFSET.to_string()),
            ("req", widget.request.to_string()),
            ("token", widget.token.clone()),
        ];

        let body = self.get_text(WIDGETDATA_URL, &query).await?;
        serde_json::from_str(strip_junk_prefix(&body)).map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })
    }
}

#[async_trait]
impl SectionProvider for TrendsProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::Trends
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let keyword = format!("tourist places in {}", city.name);
        let widget = self.explore(&keyword).await?;
        let raw = self.interest_over_time(&widget).await?;

        debug!(
            city = %city.name,
            points = raw.default.timeline_data.len(),
            "Trend series fetched"
        );
        Ok(normalize(&raw).map(SectionData::Trends))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

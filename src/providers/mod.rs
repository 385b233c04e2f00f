//! External data providers.
//!
//! Defines the `SectionProvider` trait and one implementation per third-party
//! API. Each provider performs a single HTTP call with a bounded timeout and
//! normalizes the provider-specific payload into the canonical records in
//! `crate::types`. No retries, no backoff, no caching — request volume is a
//! single interactive user action.

pub mod air_quality;
pub mod climate;
pub mod geocode;
pub mod news;
pub mod places;
pub mod search;
pub mod trends;
pub mod weather;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

use crate::types::{
    AqiReading, CurrentWeather, GeoCity, Headline, MonthlyClimate, PlaceListing, PulseResult,
    TrendPoint,
};

/// User agent sent with every outbound request.
pub(crate) const USER_AGENT: &str = "CITY-PULSE/0.1.0";

/// Build the shared-shape HTTP client used by every provider.
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build provider HTTP client")
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// The snapshot section a provider is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    CurrentWeather,
    MonthlyClimate,
    AirQuality,
    Attractions,
    CrimeNews,
    Trends,
}

impl SectionKind {
    /// All known sections (useful for iteration).
    pub const ALL: &'static [SectionKind] = &[
        SectionKind::CurrentWeather,
        SectionKind::MonthlyClimate,
        SectionKind::AirQuality,
        SectionKind::Attractions,
        SectionKind::CrimeNews,
        SectionKind::Trends,
    ];
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::CurrentWeather => write!(f, "current_weather"),
            SectionKind::MonthlyClimate => write!(f, "monthly_climate"),
            SectionKind::AirQuality => write!(f, "air_quality"),
            SectionKind::Attractions => write!(f, "attractions"),
            SectionKind::CrimeNews => write!(f, "crime_news"),
            SectionKind::Trends => write!(f, "trends"),
        }
    }
}

/// A fully normalized section payload, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    CurrentWeather(CurrentWeather),
    MonthlyClimate(Vec<MonthlyClimate>),
    AirQuality(AqiReading),
    Attractions(Vec<PlaceListing>),
    CrimeNews(Vec<Headline>),
    Trends(Vec<TrendPoint>),
}

impl SectionData {
    /// The kind tag of this payload.
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionData::CurrentWeather(_) => SectionKind::CurrentWeather,
            SectionData::MonthlyClimate(_) => SectionKind::MonthlyClimate,
            SectionData::AirQuality(_) => SectionKind::AirQuality,
            SectionData::Attractions(_) => SectionKind::Attractions,
            SectionData::CrimeNews(_) => SectionKind::CrimeNews,
            SectionData::Trends(_) => SectionKind::Trends,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Abstraction over external city-data sources.
///
/// Each provider covers exactly one snapshot section. Implementations return
/// `Ok(None)` when the provider answered with a well-formed but meaningless
/// payload (zero results, empty series) — callers treat that as "section
/// omitted", not as failure.
#[async_trait]
pub trait SectionProvider: Send + Sync {
    /// The snapshot section this provider fills.
    fn kind(&self) -> SectionKind;

    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Fetch and normalize this provider's section for a resolved city.
    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>>;
}

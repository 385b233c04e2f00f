//! Shared types for CITY PULSE.
//!
//! The canonical, provider-agnostic records that make up a city snapshot.
//! Provider modules deserialize each API's bespoke JSON shape and normalize
//! it into these types; nothing downstream of the normalizers ever sees a
//! raw payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// A city as resolved by the geocoding provider.
///
/// Coordinates are optional: when geocoding fails the snapshot build still
/// proceeds, and providers that need coordinates report no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCity {
    /// The name the user typed.
    pub name: String,
    /// Display label, e.g. "Mumbai, Maharashtra, IN".
    pub label: String,
    pub coords: Option<Coordinates>,
}

impl GeoCity {
    /// A city with no resolved coordinates (geocoding unavailable).
    pub fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            coords: None,
        }
    }
}

impl fmt::Display for GeoCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coords {
            Some(c) => write!(f, "{} {c}", self.label),
            None => write!(f, "{} (unresolved)", self.label),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// Current weather conditions. Metric units: °C, %, m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    /// Human-readable condition, title-cased ("Scattered Clouds").
    pub condition_text: String,
    /// OpenWeatherMap icon code ("04d").
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

impl fmt::Display for CurrentWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}°C (feels {:.1}°C), {:.0}% humidity, {:.1} m/s wind — {}",
            self.temperature_c,
            self.feels_like_c,
            self.humidity_pct,
            self.wind_speed_ms,
            self.condition_text,
        )
    }
}

/// One month of a climate normal series. Metric units: °C, %, mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimate {
    /// Calendar month, 1–12.
    pub month: u32,
    pub avg_temp_c: f64,
    pub humidity_pct: f64,
    pub precip_mm: f64,
}

impl fmt::Display for MonthlyClimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "month {}: {:.1}°C avg, {:.0}% humidity, {:.1}mm precip",
            self.month, self.avg_temp_c, self.humidity_pct, self.precip_mm,
        )
    }
}

/// An air-quality reading on the OpenWeatherMap 1–5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiReading {
    /// AQI index, 1 (best) to 5 (worst).
    pub index_value: u8,
    /// "Good" | "Fair" | "Moderate" | "Poor" | "Very Poor" | "Unknown".
    pub level: String,
    /// Pollutant with the highest concentration ("PM2.5", "NO2", ...).
    pub dominant_pollutant: String,
    /// Pollutant name → concentration in µg/m³. BTreeMap for stable order.
    pub pollutant_breakdown: BTreeMap<String, f64>,
}

impl AqiReading {
    /// Map an AQI index to its OpenWeatherMap qualitative level.
    pub fn describe_index(index: u8) -> &'static str {
        match index {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            5 => "Very Poor",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for AqiReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AQI {} ({}) — dominant: {}",
            self.index_value, self.level, self.dominant_pollutant,
        )
    }
}

/// A tourist attraction or other point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceListing {
    pub name: String,
    /// Provider rating, typically 1.0–5.0.
    pub rating: Option<f64>,
    /// Provider category ("tourist_attraction", "museum", ...).
    pub category: Option<String>,
    pub address: Option<String>,
}

impl fmt::Display for PlaceListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(r) = self.rating {
            write!(f, " ({r:.1}★)")?;
        }
        if let Some(addr) = &self.address {
            write!(f, " — {addr}")?;
        }
        Ok(())
    }
}

/// A news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.source, self.title)
    }
}

/// One point of a search-interest time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    /// Relative search interest, 0–100.
    pub relative_interest: u32,
}

impl fmt::Display for TrendPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp.format("%Y-%m-%d"), self.relative_interest)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The aggregated, per-request view of all city data sections.
///
/// Every section is optional: a field is populated only when its provider
/// call succeeded and normalized to a meaningful record. Absence is the sole
/// partial-failure indicator. Built fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub city_name: String,
    pub resolved: Option<GeoCity>,
    pub current_weather: Option<CurrentWeather>,
    pub monthly_climate: Option<Vec<MonthlyClimate>>,
    pub aqi_reading: Option<AqiReading>,
    pub attractions: Option<Vec<PlaceListing>>,
    pub headlines: Option<Vec<Headline>>,
    pub trend_series: Option<Vec<TrendPoint>>,
    /// When this snapshot was assembled.
    pub built_at: DateTime<Utc>,
}

impl CitySnapshot {
    /// A snapshot with every section absent.
    pub fn empty(city_name: &str) -> Self {
        Self {
            city_name: city_name.to_string(),
            resolved: None,
            current_weather: None,
            monthly_climate: None,
            aqi_reading: None,
            attractions: None,
            headlines: None,
            trend_series: None,
            built_at: Utc::now(),
        }
    }

    /// Names of the sections that are populated (for logging).
    pub fn populated_sections(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.current_weather.is_some() {
            out.push("current_weather");
        }
        if self.monthly_climate.is_some() {
            out.push("monthly_climate");
        }
        if self.aqi_reading.is_some() {
            out.push("aqi_reading");
        }
        if self.attractions.is_some() {
            out.push("attractions");
        }
        if self.headlines.is_some() {
            out.push("headlines");
        }
        if self.trend_series.is_some() {
            out.push("trend_series");
        }
        out
    }

    /// Whether no section at all is populated.
    pub fn is_empty(&self) -> bool {
        self.populated_sections().is_empty()
    }
}

impl fmt::Display for CitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = self.populated_sections();
        write!(
            f,
            "Snapshot for {}: {}/6 sections ({})",
            self.city_name,
            sections.len(),
            if sections.is_empty() {
                "none".to_string()
            } else {
                sections.join(", ")
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for CITY PULSE.
#[derive(Debug, thiserror::Error)]
pub enum CityPulseError {
    /// Network or HTTP-level failure against a provider.
    #[error("Provider unavailable ({provider}): {message}")]
    ProviderUnavailable { provider: &'static str, message: String },

    /// Missing or rejected credential.
    #[error("Provider auth error ({provider}): missing or rejected credential")]
    ProviderAuth { provider: &'static str },

    /// Well-formed payload with no usable data for the requested city.
    #[error("Provider returned no usable data ({provider})")]
    ProviderEmptyResult { provider: &'static str },

    /// User input rejected before any provider call.
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CityPulseError {
    /// Name of the provider involved, if any.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            CityPulseError::ProviderUnavailable { provider, .. }
            | CityPulseError::ProviderAuth { provider }
            | CityPulseError::ProviderEmptyResult { provider } => Some(provider),
            _ => None,
        }
    }
}

/// Result alias used throughout the provider and snapshot layers.
pub type PulseResult<T> = Result<T, CityPulseError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

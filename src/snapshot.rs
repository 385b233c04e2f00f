//! Snapshot aggregation.
//!
//! `SnapshotBuilder` owns one client per provider and assembles a
//! best-effort `CitySnapshot` per request: geocode once, fan every section
//! provider out concurrently, and fold whichever calls succeed into the
//! snapshot. Provider failures are caught here — they are logged and
//! converted to "section absent", never surfaced as errors.

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::providers::air_quality::AirQualityProvider;
use crate::providers::climate::MonthlyClimateProvider;
use crate::providers::geocode::GeocodeClient;
use crate::providers::news::CrimeNewsProvider;
use crate::providers::places::AttractionsProvider;
use crate::providers::trends::TrendsProvider;
use crate::providers::weather::CurrentWeatherProvider;
use crate::providers::{SectionData, SectionProvider};
use crate::types::{CitySnapshot, CityPulseError, GeoCity, PulseResult};

pub struct SnapshotBuilder {
    geocode: GeocodeClient,
    providers: Vec<Box<dyn SectionProvider>>,
}

impl SnapshotBuilder {
    /// Wire up all section providers from the resolved configuration.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let timeout = cfg.request_timeout();
        let owm_key = cfg.providers.openweather.resolve();

        let geocode = GeocodeClient::new(owm_key.clone(), timeout)
            .context("Failed to initialise geocoding client")?;

        let providers: Vec<Box<dyn SectionProvider>> = vec![
            Box::new(
                CurrentWeatherProvider::new(owm_key.clone(), timeout)
                    .context("Failed to initialise weather provider")?,
            ),
            Box::new(
                MonthlyClimateProvider::new(cfg.providers.visualcrossing.resolve(), timeout)
                    .context("Failed to initialise climate provider")?,
            ),
            Box::new(
                AirQualityProvider::new(owm_key, timeout)
                    .context("Failed to initialise air quality provider")?,
            ),
            Box::new(
                AttractionsProvider::new(cfg.providers.google_places.resolve(), timeout)
                    .context("Failed to initialise attractions provider")?,
            ),
            Box::new(
                CrimeNewsProvider::new(cfg.providers.news.resolve(), timeout)
                    .context("Failed to initialise news provider")?,
            ),
            Box::new(
                TrendsProvider::new(timeout).context("Failed to initialise trends provider")?,
            ),
        ];

        Ok(Self { geocode, providers })
    }

    /// Assemble a builder from explicit parts (used by tests).
    pub fn new(geocode: GeocodeClient, providers: Vec<Box<dyn SectionProvider>>) -> Self {
        Self { geocode, providers }
    }

    /// Build a best-effort snapshot for a city.
    ///
    /// # Errors
    ///
    /// Only `InputInvalid`, for a blank city name — raised before any
    /// provider call. Provider failures never escape this method.
    pub async fn build(&self, city_name: &str) -> PulseResult<CitySnapshot> {
        let city_name = city_name.trim();
        if city_name.is_empty() {
            return Err(CityPulseError::InputInvalid(
                "city name must not be empty".to_string(),
            ));
        }

        // Geocode once; failure is non-fatal. Coordinate-dependent providers
        // will report no data for an unresolved city.
        let city = match self.geocode.resolve(city_name).await {
            Ok(resolved) => {
                info!(city = %resolved, "City resolved");
                resolved
            }
            Err(e) => {
                warn!(city = city_name, error = %e, "Geocoding failed, proceeding unresolved");
                GeoCity::unresolved(city_name)
            }
        };

        let mut snapshot = CitySnapshot::empty(city_name);
        snapshot.resolved = city.coords.map(|_| city.clone());

        let fetches = self.providers.iter().map(|p| p.fetch(&city));
        for (provider, outcome) in self.providers.iter().zip(join_all(fetches).await) {
            match outcome {
                Ok(Some(data)) => Self::place(&mut snapshot, data),
                Ok(None) => {
                    info!(provider = provider.name(), section = %provider.kind(),
                          "Provider returned no records, section omitted");
                }
                Err(e) => {
                    warn!(provider = provider.name(), section = %provider.kind(),
                          error = %e, "Provider failed, section omitted");
                }
            }
        }

        info!(%snapshot, "Snapshot built");
        Ok(snapshot)
    }

    /// Fold a section payload into its snapshot field.
    fn place(snapshot: &mut CitySnapshot, data: SectionData) {
        match data {
            SectionData::CurrentWeather(w) => snapshot.current_weather = Some(w),
            SectionData::MonthlyClimate(m) => snapshot.monthly_climate = Some(m),
            SectionData::AirQuality(a) => snapshot.aqi_reading = Some(a),
            SectionData::Attractions(p) => snapshot.attractions = Some(p),
            SectionData::CrimeNews(h) => snapshot.headlines = Some(h),
            SectionData::Trends(t) => snapshot.trend_series = Some(t),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! End-to-end snapshot and chat flow against the HTTP surface.
//!
//! Uses deterministic in-memory `SectionProvider` implementations — no
//! network traffic. Exercises the full request path: router → handler →
//! aggregation → JSON response.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use citypulse::chatbot::ChatBot;
use citypulse::providers::geocode::GeocodeClient;
use citypulse::providers::search::WebSearchClient;
use citypulse::providers::{SectionData, SectionKind, SectionProvider};
use citypulse::server::build_router;
use citypulse::server::routes::ServerState;
use citypulse::snapshot::SnapshotBuilder;
use citypulse::types::*;

/// A deterministic section provider for integration testing.
///
/// Returns a canned payload, and can be switched into a failing mode
/// from test code.
struct MockProvider {
    kind: SectionKind,
    payload: Option<SectionData>,
    /// If set, every fetch returns this error message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    fn new(kind: SectionKind, payload: Option<SectionData>) -> Self {
        Self {
            kind,
            payload,
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    fn failing(kind: SectionKind, message: &str) -> Self {
        let mock = Self::new(kind, None);
        *mock.force_error.lock().unwrap() = Some(message.to_string());
        mock
    }
}

#[async_trait]
impl SectionProvider for MockProvider {
    fn kind(&self) -> SectionKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, _city: &GeoCity) -> PulseResult<Option<SectionData>> {
        if let Some(message) = self.force_error.lock().unwrap().as_ref() {
            return Err(CityPulseError::ProviderUnavailable {
                provider: "mock",
                message: message.clone(),
            });
        }
        Ok(self.payload.clone())
    }
}

/// Canned payloads with known values for response assertions.
fn sample_weather() -> SectionData {
    SectionData::CurrentWeather(CurrentWeather {
        temperature_c: 28.4,
        feels_like_c: 31.2,
        humidity_pct: 74.0,
        wind_speed_ms: 3.6,
        condition_text: "Scattered Clouds".to_string(),
        icon: "03d".to_string(),
        observed_at: Utc::now(),
    })
}

fn sample_aqi() -> SectionData {
    let mut breakdown = BTreeMap::new();
    breakdown.insert("PM2.5".to_string(), 61.3);
    breakdown.insert("NO2".to_string(), 18.7);
    SectionData::AirQuality(AqiReading {
        index_value: 3,
        level: "Moderate".to_string(),
        dominant_pollutant: "PM2.5".to_string(),
        pollutant_breakdown: breakdown,
    })
}

fn sample_places() -> SectionData {
    SectionData::Attractions(vec![PlaceListing {
        name: "Shaniwar Wada".to_string(),
        rating: Some(4.4),
        category: Some("tourist_attraction".to_string()),
        address: Some("Shaniwar Peth, Pune".to_string()),
    }])
}

fn sample_news() -> SectionData {
    SectionData::CrimeNews(vec![Headline {
        title: "Police recover stolen vehicles in city sweep".to_string(),
        source: "Example Times".to_string(),
        description: Some("Two-day operation across five districts.".to_string()),
        published_at: Some(Utc::now()),
        url: "https://news.example.com/sweep".to_string(),
    }])
}

/// Build full server state around mock providers. The geocoding client is
/// keyless so it fails fast without touching the network; the search
/// client is keyless so chat surfaces an upstream error.
fn mock_state(providers: Vec<Box<dyn SectionProvider>>) -> Result<Arc<ServerState>> {
    let timeout = Duration::from_secs(1);
    Ok(Arc::new(ServerState {
        snapshots: SnapshotBuilder::new(GeocodeClient::new(None, timeout)?, providers),
        chatbot: ChatBot::new(WebSearchClient::new(None, None, timeout)?),
    }))
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_snapshot_includes_all_successful_sections() {
    let providers: Vec<Box<dyn SectionProvider>> = vec![
        Box::new(MockProvider::new(SectionKind::CurrentWeather, Some(sample_weather()))),
        Box::new(MockProvider::new(SectionKind::AirQuality, Some(sample_aqi()))),
        Box::new(MockProvider::new(SectionKind::Attractions, Some(sample_places()))),
        Box::new(MockProvider::new(SectionKind::CrimeNews, Some(sample_news()))),
    ];
    let app = build_router(mock_state(providers).unwrap());

    let (status, body) = get_json(app, "/api/snapshot?city=Pune").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city_name"], "Pune");
    assert!((body["current_weather"]["temperature_c"].as_f64().unwrap() - 28.4).abs() < 1e-9);
    assert_eq!(body["aqi_reading"]["dominant_pollutant"], "PM2.5");
    assert_eq!(body["attractions"][0]["name"], "Shaniwar Wada");
    assert_eq!(body["headlines"][0]["source"], "Example Times");
    // Sections with no provider wired stay null
    assert!(body["monthly_climate"].is_null());
    assert!(body["trend_series"].is_null());
}

#[tokio::test]
async fn test_failed_section_absent_others_present() {
    let providers: Vec<Box<dyn SectionProvider>> = vec![
        Box::new(MockProvider::new(SectionKind::CurrentWeather, Some(sample_weather()))),
        Box::new(MockProvider::failing(SectionKind::CrimeNews, "simulated outage")),
    ];
    let app = build_router(mock_state(providers).unwrap());

    let (status, body) = get_json(app, "/api/snapshot?city=Pune").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_weather"]["condition_text"], "Scattered Clouds");
    assert!(body["headlines"].is_null());
}

#[tokio::test]
async fn test_all_sections_failing_still_200() {
    let providers: Vec<Box<dyn SectionProvider>> = vec![
        Box::new(MockProvider::failing(SectionKind::CurrentWeather, "down")),
        Box::new(MockProvider::failing(SectionKind::AirQuality, "down")),
        Box::new(MockProvider::failing(SectionKind::CrimeNews, "down")),
    ];
    let app = build_router(mock_state(providers).unwrap());

    let (status, body) = get_json(app, "/api/snapshot?city=Pune").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city_name"], "Pune");
    assert!(body["current_weather"].is_null());
    assert!(body["aqi_reading"].is_null());
    assert!(body["headlines"].is_null());
}

#[tokio::test]
async fn test_empty_payload_section_is_null_not_empty_list() {
    let providers: Vec<Box<dyn SectionProvider>> =
        vec![Box::new(MockProvider::new(SectionKind::Attractions, None))];
    let app = build_router(mock_state(providers).unwrap());

    let (status, body) = get_json(app, "/api/snapshot?city=Pune").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["attractions"].is_null());
}

#[tokio::test]
async fn test_blank_city_is_rejected_with_400() {
    let app = build_router(mock_state(Vec::new()).unwrap());

    let (status, body) = get_json(app, "/api/snapshot?city=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_chat_blank_query_is_400() {
    let app = build_router(mock_state(Vec::new()).unwrap());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query": ""}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_without_search_key_is_502() {
    let app = build_router(mock_state(Vec::new()).unwrap());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query": "weekend markets", "city": "Pune"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("credential"));
}

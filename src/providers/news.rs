//! Crime news provider backed by NewsAPI.
//!
//! API: `https://newsapi.org/v2/everything`
//! Auth: API key via `apiKey` query param. Free tier: 100 req/day.
//!
//! The query is `crime AND {city}`, English only, newest first, ten articles.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, SectionData, SectionKind, SectionProvider};
use crate::types::{CityPulseError, GeoCity, Headline, PulseResult};

const BASE_URL: &str = "https://newsapi.org/v2/everything";
const PROVIDER: &str = "newsapi";

/// Articles requested per city.
const PAGE_SIZE: u8 = 10;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<NewsSource>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsSource {
    #[serde(default)]
    name: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert raw articles into headlines. Articles without a title or URL are
/// malformed and dropped; an unparseable timestamp degrades to `None` rather
/// than dropping the headline.
fn normalize(raw: &NewsApiResponse) -> Option<Vec<Headline>> {
    let headlines: Vec<Headline> = raw
        .articles
        .iter()
        .filter_map(|article| {
            let title = article.title.clone()?;
            let url = article.url.clone()?;
            Some(Headline {
                title,
                source: article
                    .source
                    .as_ref()
                    .and_then(|s| s.name.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
                description: article.description.clone(),
                published_at: article
                    .published_at
                    .as_deref()
                    .and_then(|t| t.parse::<DateTime<Utc>>().ok()),
                url,
            })
        })
        .collect();

    if headlines.is_empty() {
        None
    } else {
        Some(headlines)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct CrimeNewsProvider {
    http: Client,
    api_key: Option<String>,
}

impl CrimeNewsProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key })
    }
}

#[async_trait]
impl SectionProvider for CrimeNewsProvider {
    fn kind(&self) -> SectionKind {
        SectionKind::CrimeNews
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, city: &GeoCity) -> PulseResult<Option<SectionData>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CityPulseError::ProviderAuth { provider: PROVIDER })?;

        let query = format!("crime AND {}", city.name);
        let url = format!(
            "{BASE_URL}?q={}&language=en&sortBy=publishedAt&pageSize={PAGE_SIZE}&apiKey={key}",
            urlencoding::encode(&query),
        );

        let resp = self.http.get(&url).send().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CityPulseError::ProviderAuth { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(CityPulseError::ProviderUnavailable {
                provider: PROVIDER,
                message: format!("HTTP {status}"),
            });
        }

        let raw: NewsApiResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(city = %city.name, articles = raw.articles.len(), "Crime news fetched");
        Ok(normalize(&raw).map(SectionData::CrimeNews))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

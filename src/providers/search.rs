//! Web search client backed by the Google Custom Search JSON API.
//!
//! Used only by the chatbot adapter. Returns the top three results formatted
//! as a markdown answer, exactly as the dashboard renders it.
//!
//! API: `https://www.googleapis.com/customsearch/v1`
//! Auth: API key via `key` plus a search-engine id via `cx`.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::http_client;
use crate::types::{CityPulseError, PulseResult};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const PROVIDER: &str = "google-search";

/// Results kept per query.
const MAX_RESULTS: usize = 3;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format the top results as a markdown answer. Returns `None` for a
/// well-formed response with no items.
fn format_answer(raw: &SearchResponse) -> Option<String> {
    if raw.items.is_empty() {
        return None;
    }
    Some(
        raw.items
            .iter()
            .take(MAX_RESULTS)
            .map(|item| format!("**[{}]({})**\n{}", item.title, item.link, item.snippet))
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Abstraction over the chatbot's search backend.
///
/// Mirrors `SectionProvider`: the chatbot adapter depends on this trait
/// rather than a concrete client, so tests can substitute a deterministic
/// in-memory backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search and return the formatted markdown answer, or `None`
    /// when the engine found nothing relevant.
    async fn search(&self, query: &str) -> PulseResult<Option<String>>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct WebSearchClient {
    http: Client,
    api_key: Option<String>,
    cse_id: Option<String>,
}

impl WebSearchClient {
    pub fn new(
        api_key: Option<String>,
        cse_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self { http: http_client(timeout)?, api_key, cse_id })
    }

    /// Run a search and return the formatted markdown answer, or `None`
    /// when the engine found nothing relevant.
    pub async fn search(&self, query: &str) -> PulseResult<Option<String>> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.cse_id.as_deref()) else {
            return Err(CityPulseError::ProviderAuth { provider: PROVIDER });
        };

        let resp = self
            .http
            .get(BASE_URL)
            .query(&[("key", key), ("cx", cx), ("q", query)])
            .send()
            .await
            .map_err(|e| CityPulseError::ProviderUnavailable {
                provider: PROVIDER,
                message: e.to_string(),
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

        let raw: SearchResponse = resp.json().await.map_err(|e| {
            CityPulseError::ProviderUnavailable { provider: PROVIDER, message: e.to_string() }
        })?;

        debug!(query, results = raw.items.len(), "Web search complete");
        Ok(format_answer(&raw))
    }
}

#[async_trait]
impl SearchBackend for WebSearchClient {
    async fn search(&self, query: &str) -> PulseResult<Option<String>> {
        WebSearchClient::search(self, query).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! CityBot — the conversational query adapter.
//!
//! A stateless pass-through over the web search client: the user's free-text
//! query is optionally scoped with the current city and forwarded to the
//! search provider; its formatted answer is relayed unmodified. No
//! conversation memory, no multi-turn state, no re-ranking.

use tracing::debug;

use crate::providers::search::SearchBackend;
use crate::types::{CityPulseError, PulseResult};

/// Fixed reply when the search engine finds nothing.
const NO_RESULTS_TEXT: &str = "No relevant results found.";

pub struct ChatBot {
    search: Box<dyn SearchBackend>,
}

impl ChatBot {
    pub fn new(search: impl SearchBackend + 'static) -> Self {
        Self { search: Box::new(search) }
    }

    /// Scope a query with the city context, unless the query already
    /// mentions the city.
    fn scoped_query(query: &str, city: Option<&str>) -> String {
        match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) if !query.to_lowercase().contains(&city.to_lowercase()) => {
                format!("{query} in {city}")
            }
            _ => query.to_string(),
        }
    }

    /// Answer a single free-text query.
    ///
    /// # Errors
    ///
    /// `InputInvalid` for a blank query (before any provider call);
    /// provider errors are propagated so the HTTP layer can report them.
    pub async fn answer(&self, query: &str, city: Option<&str>) -> PulseResult<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CityPulseError::InputInvalid("query must not be empty".to_string()));
        }

        let scoped = Self::scoped_query(query, city);
        debug!(query, scoped = %scoped, "Forwarding chat query to search");

        match self.search.search(&scoped).await? {
            Some(answer) => Ok(answer),
            None => Ok(NO_RESULTS_TEXT.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

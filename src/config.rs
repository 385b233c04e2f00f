//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`. The resolved configuration is
//! immutable and passed explicitly to each client constructor.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Default per-request timeout when the config omits one.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    /// Bounded timeout applied to every outbound provider call.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub openweather: ProviderCredential,
    pub visualcrossing: ProviderCredential,
    pub google_places: ProviderCredential,
    pub news: ProviderCredential,
    pub search: SearchCredential,
}

/// A credential referenced by environment-variable name.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderCredential {
    pub api_key_env: String,
}

impl ProviderCredential {
    /// Resolve the key from the environment. `None` means the provider's
    /// client will fail every call with an auth error, per design.
    pub fn resolve(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Google Custom Search needs both an API key and an engine id.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchCredential {
    pub api_key_env: String,
    pub cse_id_env: String,
}

impl SearchCredential {
    pub fn resolve_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }

    pub fn resolve_cse_id(&self) -> Option<String> {
        std::env::var(&self.cse_id_env).ok().filter(|k| !k.is_empty())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// The bounded request timeout for provider HTTP clients.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.providers
                .request_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        port = 8080

        [providers]
        request_timeout_secs = 7

        [providers.openweather]
        api_key_env = "OPENWEATHER_API_KEY"

        [providers.visualcrossing]
        api_key_env = "VISUALCROSSING_API_KEY"

        [providers.google_places]
        api_key_env = "GOOGLE_PLACES_API_KEY"

        [providers.news]
        api_key_env = "NEWS_API_KEY"

        [providers.search]
        api_key_env = "GOOGLE_SEARCH_API_KEY"
        cse_id_env = "GOOGLE_CSE_ID"
    "#;

    #[test]
    fn test_parse_sample_config() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.providers.request_timeout_secs, Some(7));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(7));
        assert_eq!(cfg.providers.news.api_key_env, "NEWS_API_KEY");
        assert_eq!(cfg.providers.search.cse_id_env, "GOOGLE_CSE_ID");
    }

    #[test]
    fn test_default_timeout_when_omitted() {
        let trimmed = SAMPLE.replace("request_timeout_secs = 7", "");
        let cfg: AppConfig = toml::from_str(&trimmed).unwrap();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_resolve_missing_env_is_none() {
        let cred = ProviderCredential {
            api_key_env: "CITYPULSE_TEST_KEY_THAT_IS_NOT_SET".into(),
        };
        assert!(cred.resolve().is_none());
    }

    #[test]
    fn test_load_repo_config() {
        // Exercises the checked-in config.toml when run from the crate root.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert!(cfg.server.port > 0);
            assert_eq!(cfg.providers.openweather.api_key_env, "OPENWEATHER_API_KEY");
        }
    }
}

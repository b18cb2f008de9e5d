//! Build-time configuration
//!
//! A wasm extension has no process environment at run time, so the two
//! Supabase secrets are baked in when the crate is compiled.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_METADATA_ENDPOINT: &str = "https://api.microlink.io";
pub const DEFAULT_WEB_APP_URL: &str = "https://dashstash.app";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
    #[serde(default = "default_web_app_url")]
    pub web_app_url: String,
}

fn default_metadata_endpoint() -> String {
    DEFAULT_METADATA_ENDPOINT.to_string()
}

fn default_web_app_url() -> String {
    DEFAULT_WEB_APP_URL.to_string()
}

impl Config {
    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` (and the optional
    /// `DASHSTASH_*` overrides) captured at compile time.
    pub fn from_build_env() -> Result<Config, ConfigError> {
        Config::from_values(
            option_env!("SUPABASE_URL"),
            option_env!("SUPABASE_ANON_KEY"),
            option_env!("DASHSTASH_METADATA_ENDPOINT"),
            option_env!("DASHSTASH_WEB_APP_URL"),
        )
    }

    fn from_values(
        supabase_url: Option<&str>,
        supabase_anon_key: Option<&str>,
        metadata_endpoint: Option<&str>,
        web_app_url: Option<&str>,
    ) -> Result<Config, ConfigError> {
        let config = Config {
            supabase_url: supabase_url.unwrap_or_default().trim().to_string(),
            supabase_anon_key: supabase_anon_key.unwrap_or_default().trim().to_string(),
            metadata_endpoint: metadata_endpoint
                .filter(|s| !s.trim().is_empty())
                .map_or_else(default_metadata_endpoint, |s| s.trim().to_string()),
            web_app_url: web_app_url
                .filter(|s| !s.trim().is_empty())
                .map_or_else(default_web_app_url, |s| s.trim().to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase_url.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_URL"));
        }
        if self.supabase_anon_key.is_empty() {
            return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
        }

        for (key, value) in [
            ("SUPABASE_URL", &self.supabase_url),
            ("DASHSTASH_METADATA_ENDPOINT", &self.metadata_endpoint),
            ("DASHSTASH_WEB_APP_URL", &self.web_app_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    key,
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }

    /// Supabase base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_with_defaults() {
        let config =
            Config::from_values(Some("https://abc.supabase.co/"), Some("anon"), None, None)
                .unwrap();

        assert_eq!(config.api_base(), "https://abc.supabase.co");
        assert_eq!(config.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
        assert_eq!(config.web_app_url, DEFAULT_WEB_APP_URL);
    }

    #[test]
    fn test_missing_secrets() {
        assert_eq!(
            Config::from_values(None, Some("anon"), None, None),
            Err(ConfigError::Missing("SUPABASE_URL"))
        );
        assert_eq!(
            Config::from_values(Some("https://abc.supabase.co"), Some("  "), None, None),
            Err(ConfigError::Missing("SUPABASE_ANON_KEY"))
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = Config::from_values(Some("not a url"), Some("anon"), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key: "SUPABASE_URL", .. }));
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        let config = Config::from_values(
            Some("https://abc.supabase.co"),
            Some("anon"),
            Some(""),
            Some("https://my.dashstash.dev"),
        )
        .unwrap();

        assert_eq!(config.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
        assert_eq!(config.web_app_url, "https://my.dashstash.dev");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"supabase_url":"https://abc.supabase.co","supabase_anon_key":"k"}"#,
        )
        .unwrap();
        assert_eq!(config.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
        assert!(config.validate().is_ok());
    }
}

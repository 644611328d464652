//! Client configuration parsed from environment variables.
//!
//! A single configured backend endpoint; every request and asset URL is
//! derived from it.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_FILE: &str = ".pinboard/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL including the `/api` prefix, without trailing slash.
    pub api_url: String,
    /// Origin of the browsable app, used for share links.
    pub app_origin: String,
    pub timeouts: Timeouts,
    pub token_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_APP_ORIGIN)
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_url: &str, app_origin: &str) -> Self {
        Self {
            api_url: trim_url(api_url),
            app_origin: trim_url(app_origin),
            timeouts: Timeouts::default(),
            token_file: default_token_file(std::env::var("HOME").ok().as_deref()),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PINBOARD_API_URL`: default `http://localhost:8000/api`
    /// - `PINBOARD_APP_ORIGIN`: default `http://localhost:3000`
    /// - `PINBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PINBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PINBOARD_TOKEN_FILE`: default `$HOME/.pinboard/token`
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var("PINBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let app_origin = std::env::var("PINBOARD_APP_ORIGIN").unwrap_or_else(|_| DEFAULT_APP_ORIGIN.to_string());
        let mut config = Self::new(&api_url, &app_origin);
        config.timeouts = Timeouts {
            request_secs: env_parse_u64("PINBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PINBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        if let Ok(path) = std::env::var("PINBOARD_TOKEN_FILE") {
            config.token_file = PathBuf::from(path);
        }
        config
    }

    /// Full URL for an API path such as `/pins/12`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Resolve a pin's image reference against the backend host.
    ///
    /// The backend serves uploads beside `/api`, so the prefix is dropped.
    #[must_use]
    pub fn asset_url(&self, image_ref: &str) -> String {
        if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            return image_ref.to_string();
        }
        let host = self.api_url.strip_suffix("/api").unwrap_or(&self.api_url);
        if image_ref.starts_with('/') {
            format!("{host}{image_ref}")
        } else {
            format!("{host}/{image_ref}")
        }
    }

    #[must_use]
    pub fn pin_share_url(&self, pin_id: i64) -> String {
        format!("{}/pin/{pin_id}", self.app_origin)
    }
}

fn trim_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn default_token_file(home: Option<&str>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_TOKEN_FILE),
        _ => PathBuf::from(DEFAULT_TOKEN_FILE),
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Client configuration.

/// Production host of the Daxko partner API.
pub const BASE_URL: &str = "https://api.partners.daxko.com";

/// Version prefix of every resource path.
pub const API_VERSION: &str = "api/v1";

/// Environment variable that overrides the base URL.
pub const BASE_URL_ENV: &str = "DAXKO_BASE_URL";

/// Where the client sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
}

impl Config {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `DAXKO_BASE_URL`, falling back to the production host.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(BASE_URL)
    }
}

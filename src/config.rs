use std::time::Duration;
use url::Url;

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing `{0}`, set it on the command line or in the environment")]
    Missing(&'static str),
    #[error("`{name}` is not a valid URL ({value}): {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("`{name}` must be an http(s) URL, got [{value}]")]
    UnsupportedScheme {
        name: &'static str,
        value: String,
    },
}

/// Settings needed to talk to the food-request service and the map provider.
///
/// Built once at startup; a `Config` that exists is a valid one.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub map_api_key: String,
    pub geocode_url: Url,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(
        base_url: Option<String>,
        map_api_key: Option<String>,
        geocode_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = required("API_URL", base_url)?;
        let map_api_key = required("MAP_API_KEY", map_api_key)?;
        let geocode_url = geocode_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string());

        Ok(
            Self {
                base_url: parse_url("API_URL", &base_url)?,
                map_api_key,
                geocode_url: parse_url("GEOCODE_URL", &geocode_url)?,
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            }
        )
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// endpoint listing every food request
    pub fn requests_url(&self) -> String {
        format!("{}/request", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme { name, value: value.to_string() }),
    }
}

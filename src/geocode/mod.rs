use color_eyre::eyre::{bail, eyre, WrapErr};
use log::debug;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::instrument;
use url::Url;
use crate::config::Config;
use crate::geocode::model::{GeocodeResponse, GeocodeResult, LatLng};

pub mod model;

const UA: &str = concat!("food-map/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the reverse geocoding provider
#[derive(Clone)]
pub struct GeocodeClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(config: &Config) -> color_eyre::Result<Self> {
        Ok(
            Self {
                client: Client::builder()
                    .default_headers(Self::default_headers())
                    .timeout(config.request_timeout)
                    .build()?,
                endpoint: config.geocode_url.clone(),
                api_key: config.map_api_key.clone(),
            }
        )
    }

    fn default_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(USER_AGENT, HeaderValue::from_static(UA));
        map
    }

    /// Reverse geocode a point, keeping only the provider's best (first) result.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, position: LatLng) -> color_eyre::Result<GeocodeResult> {
        debug!("reverse geocoding [{}]", position.to_query());
        let resp = self.client
            .get(self.endpoint.clone())
            .query(&[("latlng", position.to_query()), ("key", self.api_key.clone())])
            .send()
            .await
            .wrap_err("failed to send geocoding request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("geocoding provider returned status: {}", status);
        }
        let body: GeocodeResponse = resp.json()
            .await
            .wrap_err("failed to parse geocoding response")?;

        debug!("geocoding status [{}], [{}] results", body.status, body.results.len());
        if !body.is_ok() {
            bail!(
                "geocoding failed with status [{}]: {}",
                body.status,
                body.error_message.as_deref().unwrap_or("no error message")
            );
        }
        body.results
            .into_iter()
            .next()
            .ok_or_else(|| eyre!("no geocoding results for [{}]", position.to_query()))
    }
}

use color_eyre::eyre::{bail, WrapErr};
use log::{debug, error, info};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use crate::config::Config;

/// A record from the food-request service.
///
/// The service schema is not ours, so the record is kept as-is and only
/// `_id`/`id` and `foodName` are ever looked at.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FoodRequest(Value);

impl FoodRequest {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// `_id`, falling back to `id`
    pub fn key(&self) -> Option<String> {
        ["_id", "id"].iter()
            .filter_map(|field| self.0.get(field))
            .find(|v| is_truthy(v))
            .map(scalar_text)
    }

    /// `foodName` when it is set, the raw record otherwise
    pub fn display_name(&self) -> String {
        match self.0.get("foodName") {
            Some(name) if is_truthy(name) => scalar_text(name),
            _ => self.0.to_string(),
        }
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// HTTP client for the food-request service
#[derive(Clone)]
pub struct FoodRequestClient {
    client: Client,
    url: String,
}

impl FoodRequestClient {
    pub fn new(config: &Config) -> color_eyre::Result<Self> {
        Ok(
            Self {
                client: Client::builder()
                    .default_headers(Self::default_headers())
                    .timeout(config.request_timeout)
                    .build()?,
                url: config.requests_url(),
            }
        )
    }

    fn default_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        map
    }

    /// get every food request, in the order the service lists them
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> color_eyre::Result<Vec<FoodRequest>> {
        debug!("fetching food requests from [{}]", self.url);
        let resp = self.client
            .get(&self.url)
            .send()
            .await
            .wrap_err("failed to send food request query")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("failed to fetch food requests, status: {}", status);
        }
        let requests: Vec<FoodRequest> = resp.json()
            .await
            .wrap_err("failed to parse food requests")?;
        info!("fetched [{}] food requests", requests.len());
        Ok(requests)
    }
}

/// The last food-request list that was fetched successfully.
///
/// The list is only ever replaced as a whole. `generation` changes on every
/// replacement, even when the new list has the same content.
#[derive(Debug, Default, Clone)]
pub struct FoodRequestList {
    items: Vec<FoodRequest>,
    generation: u64,
}

impl FoodRequestList {
    pub fn items(&self) -> &[FoodRequest] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, items: Vec<FoodRequest>) {
        self.items = items;
        self.generation += 1;
    }

    /// Take the outcome of a fetch: a fetched list replaces the current one,
    /// a failure leaves it as it is and is only logged.
    ///
    /// Returns whether the list was replaced.
    pub fn settle(&mut self, fetched: color_eyre::Result<Vec<FoodRequest>>) -> bool {
        match fetched {
            Ok(items) => {
                self.replace(items);
                true
            }
            Err(e) => {
                error!("cannot fetch food requests: {:?}", e);
                false
            }
        }
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::UpstreamConfig;
use crate::constants::{USER_AGENT, limits};
use crate::models::{Collection, Photo, PhotoStatistics};

const ERROR_SNIPPET_LEN: usize = 200;

/// Errors raised while talking to the upstream photo API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream request: {0}")]
    InvalidRequest(String),

    #[error("Upstream rate limit reached (HTTP {status})")]
    RateLimited { status: u16 },

    #[error("Upstream returned an error (HTTP {status}): {}", errors.join("; "))]
    Api { status: u16, errors: Vec<String> },

    #[error("Unexpected upstream response: {0}")]
    Malformed(String),

    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl UpstreamError {
    const fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::RateLimited { .. } => "rate_limited",
            Self::Api { .. } => "api_error",
            Self::Malformed(_) => "malformed",
            Self::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the access key.
        Self::Transport(err.without_url())
    }
}

/// The upstream operations the proxy depends on.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// One page of the configured user's photos, in upstream order.
    async fn list_photos(&self, page: u32, per_page: u32) -> Result<Vec<Photo>, UpstreamError>;

    /// Statistics for a single photo. Missing counters come back as zero.
    async fn photo_statistics(&self, photo_id: &str) -> Result<PhotoStatistics, UpstreamError>;

    /// One page of the configured user's collections.
    async fn list_collections(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Collection>, UpstreamError>;
}

#[derive(Clone)]
pub struct UnsplashClient {
    client: Client,
    base_url: Url,
    access_key: String,
    username: String,
}

impl UnsplashClient {
    /// Creates a client with its own connection pool and the configured timeout.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Self::with_shared_client(client, config)
    }

    /// Creates a client on top of an existing HTTP client.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_shared_client(client: Client, config: &UpstreamConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid upstream base URL {}: {e}", config.base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("Upstream base URL cannot be a base: {}", config.base_url);
        }

        Ok(Self {
            client,
            base_url,
            access_key: config.access_key.clone(),
            username: config.username.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::InvalidRequest("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn paged_endpoint(&self, resource: &str, page: u32, per_page: u32) -> Result<Url, UpstreamError> {
        let mut url = self.endpoint(&["users", self.username.as_str(), resource])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string())
            .append_pair("client_id", &self.access_key);
        Ok(url)
    }

    async fn get_json(&self, url: Url, endpoint: &'static str) -> Result<Value, UpstreamError> {
        debug!(endpoint, path = %url.path(), "Requesting upstream");

        let result = self.send(url).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("upstream_requests_total", "endpoint" => endpoint, "outcome" => outcome)
            .increment(1);

        result
    }

    async fn send(&self, url: Url) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Version", "v1")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        classify_response(status, &body)
    }
}

#[async_trait]
impl PhotoSource for UnsplashClient {
    async fn list_photos(&self, page: u32, per_page: u32) -> Result<Vec<Photo>, UpstreamError> {
        validate_paging(page, per_page)?;
        let url = self.paged_endpoint("photos", page, per_page)?;
        let value = self.get_json(url, "list_photos").await?;
        parse_list(value)
    }

    async fn photo_statistics(&self, photo_id: &str) -> Result<PhotoStatistics, UpstreamError> {
        if photo_id.trim().is_empty() {
            return Err(UpstreamError::InvalidRequest(
                "photo id cannot be empty".to_string(),
            ));
        }

        let mut url = self.endpoint(&["photos", photo_id, "statistics"])?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.access_key);

        let value = self.get_json(url, "photo_statistics").await?;
        if !value.is_object() {
            return Err(UpstreamError::Malformed(format!(
                "expected a statistics object, got {}",
                json_kind(&value)
            )));
        }

        Ok(PhotoStatistics::from_value(&value))
    }

    async fn list_collections(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Collection>, UpstreamError> {
        validate_paging(page, per_page)?;
        let url = self.paged_endpoint("collections", page, per_page)?;
        let value = self.get_json(url, "list_collections").await?;
        parse_list(value)
    }
}

pub fn validate_paging(page: u32, per_page: u32) -> Result<(), UpstreamError> {
    if page == 0 {
        return Err(UpstreamError::InvalidRequest(
            "page must be a positive integer".to_string(),
        ));
    }

    if !(1..=limits::MAX_PER_PAGE).contains(&per_page) {
        return Err(UpstreamError::InvalidRequest(format!(
            "per_page must be between 1 and {}, got {per_page}",
            limits::MAX_PER_PAGE
        )));
    }

    Ok(())
}

/// Maps a raw upstream response onto either a JSON document or a typed error.
///
/// Throttling statuses win over everything else, then explicit `errors`
/// payloads, then any other non-success status.
pub(crate) fn classify_response(status: StatusCode, body: &str) -> Result<Value, UpstreamError> {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
        return Err(UpstreamError::RateLimited {
            status: status.as_u16(),
        });
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if status.is_success() => {
            return Err(UpstreamError::Malformed(format!(
                "response body is not JSON: {e}"
            )));
        }
        Err(_) => {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                errors: vec![status_message(status, body)],
            });
        }
    };

    if let Some(errors) = value.get("errors") {
        return Err(UpstreamError::Api {
            status: status.as_u16(),
            errors: normalize_errors(errors),
        });
    }

    if !status.is_success() {
        return Err(UpstreamError::Api {
            status: status.as_u16(),
            errors: vec![status_message(status, "")],
        });
    }

    Ok(value)
}

fn parse_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, UpstreamError> {
    if !value.is_array() {
        return Err(UpstreamError::Malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| UpstreamError::Malformed(format!("unexpected item shape: {e}")))
}

fn normalize_errors(errors: &Value) -> Vec<String> {
    match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(obj) => obj
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| item.to_string(), str::to_string),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn status_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let snippet: String = body.trim().chars().take(ERROR_SNIPPET_LEN).collect();

    if snippet.is_empty() {
        format!("{} {reason}", status.as_u16())
    } else {
        format!("{} {reason}: {snippet}", status.as_u16())
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

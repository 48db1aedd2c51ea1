use std::sync::Arc;

use crate::clients::{PhotoSource, UnsplashClient};
use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::services::{PhotoService, RequestGate};

/// Build a shared HTTP client for upstream calls.
/// Reused across requests so connections to the upstream API are pooled.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub photo_service: Arc<PhotoService>,

    pub gate: Arc<RequestGate>,
}

impl SharedState {
    /// Wires the pipeline against the real upstream API.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.upstream.request_timeout_seconds)?;
        let source = Arc::new(UnsplashClient::with_shared_client(
            http_client,
            &config.upstream,
        )?);

        Ok(Self::with_source(config, source))
    }

    /// Wires the pipeline against any [`PhotoSource`].
    #[must_use]
    pub fn with_source(config: Config, source: Arc<dyn PhotoSource>) -> Self {
        let photo_service = Arc::new(PhotoService::new(source, &config));

        let gate = if config.gate.enabled {
            RequestGate::new(config.gate.min_interval())
        } else {
            RequestGate::disabled()
        };

        Self {
            config: Arc::new(config),
            photo_service,
            gate: Arc::new(gate),
        }
    }
}

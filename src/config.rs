use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{UNSPLASH_API, cache, intervals, limits};

/// Environment variable that overrides `upstream.access_key`.
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

const ACCESS_KEY_MASK: &str = "********";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub upstream: UpstreamConfig,

    pub cache: CacheConfig,

    pub gate: GateConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub suppress_connection_errors: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            suppress_connection_errors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    /// Use `"*"` to allow any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,

    /// Sent as `client_id` on every request. Overridden by `UNSPLASH_ACCESS_KEY`.
    pub access_key: String,

    /// Account whose photos and collections are proxied.
    pub username: String,

    pub photos_per_page: u32,

    pub collections_per_page: u32,

    pub request_timeout_seconds: u64,

    /// Upper bound for a single statistics call before it is treated as zeros.
    pub stats_timeout_seconds: u64,

    /// Spacing between the start of successive statistics calls in one page.
    pub stats_spacing_ms: u64,

    /// Used as `utm_source` on credit links.
    pub app_name: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: UNSPLASH_API.to_string(),
            access_key: String::new(),
            username: "digilens".to_string(),
            photos_per_page: limits::DEFAULT_PHOTOS_PER_PAGE,
            collections_per_page: limits::DEFAULT_COLLECTIONS_PER_PAGE,
            request_timeout_seconds: 30,
            stats_timeout_seconds: intervals::STATS_TIMEOUT.as_secs(),
            stats_spacing_ms: duration_ms(intervals::STATS_SPACING),
            app_name: "photorelay".to_string(),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl UpstreamConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.stats_timeout_seconds)
    }

    #[must_use]
    pub const fn stats_spacing(&self) -> Duration {
        Duration::from_millis(self.stats_spacing_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,

    /// Upper bound on cached pages per resource kind.
    pub max_pages: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: cache::TTL.as_secs(),
            max_pages: cache::MAX_PAGES,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub enabled: bool,

    /// Minimum time between two admitted inbound requests.
    pub min_interval_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: duration_ms(intervals::GATE_MIN_INTERVAL),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads `.env`, the first config file found, then environment overrides.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ACCESS_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.upstream.access_key = key.trim().to_string();
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("photorelay").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".photorelay").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.trim().is_empty() {
            anyhow::bail!("Upstream base URL cannot be empty");
        }

        url::Url::parse(&self.upstream.base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", self.upstream.base_url))?;

        if self.upstream.username.trim().is_empty() {
            anyhow::bail!("Upstream username cannot be empty");
        }

        for (name, value) in [
            ("photos_per_page", self.upstream.photos_per_page),
            ("collections_per_page", self.upstream.collections_per_page),
        ] {
            if !(1..=limits::MAX_PER_PAGE).contains(&value) {
                anyhow::bail!(
                    "upstream.{name} must be between 1 and {}, got {value}",
                    limits::MAX_PER_PAGE
                );
            }
        }

        if self.upstream.request_timeout_seconds == 0 {
            anyhow::bail!("upstream.request_timeout_seconds must be > 0");
        }

        if self.upstream.stats_timeout_seconds == 0 {
            anyhow::bail!("upstream.stats_timeout_seconds must be > 0");
        }

        if self.cache.ttl_seconds == 0 {
            anyhow::bail!("cache.ttl_seconds must be > 0");
        }

        if self.cache.max_pages == 0 {
            anyhow::bail!("cache.max_pages must be > 0");
        }

        if self.gate.enabled && self.gate.min_interval_ms == 0 {
            anyhow::bail!("gate.min_interval_ms must be > 0 when the gate is enabled");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "general.log_format must be \"pretty\" or \"json\", got {:?}",
                self.general.log_format
            );
        }

        if self.upstream.access_key.is_empty() {
            warn!(
                "No upstream access key configured; set {} or upstream.access_key",
                ACCESS_KEY_ENV
            );
        }

        Ok(())
    }

    /// Copy safe to print or serve: the access key is replaced by a mask.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        if !config.upstream.access_key.is_empty() {
            config.upstream.access_key = ACCESS_KEY_MASK.to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.upstream.photos_per_page, 50);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.gate.min_interval(), Duration::from_millis(1500));
        assert_eq!(config.upstream.stats_spacing(), Duration::from_millis(50));
        assert!(config.gate.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[upstream]"));
        assert!(toml_str.contains("[cache]"));
        assert!(toml_str.contains("[gate]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [upstream]
            username = "someone"
            photos_per_page = 20

            [gate]
            enabled = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.upstream.username, "someone");
        assert_eq!(config.upstream.photos_per_page, 20);
        assert!(!config.gate.enabled);

        assert_eq!(config.upstream.base_url, UNSPLASH_API);
        assert_eq!(config.cache.ttl_seconds, 3600);
    }

    #[test]
    fn test_validate_rejects_out_of_range_page_size() {
        let mut config = Config::default();
        config.upstream.photos_per_page = 81;
        assert!(config.validate().is_err());

        config.upstream.photos_per_page = 0;
        assert!(config.validate().is_err());

        config.upstream.photos_per_page = 80;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_url_and_ttl() {
        let mut config = Config::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.ttl_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.upstream.stats_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.stats_timeout_seconds = 1;
        config.upstream.request_timeout_seconds = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_cache_and_zero_gate_interval() {
        let mut config = Config::default();
        config.cache.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gate.min_interval_ms = 0;
        assert!(config.validate().is_err());

        config.gate.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_masked_hides_access_key() {
        let mut config = Config::default();
        config.upstream.access_key = "secret-key".to_string();

        let masked = config.masked();
        assert_eq!(masked.upstream.access_key, ACCESS_KEY_MASK);
        assert_eq!(config.upstream.access_key, "secret-key");

        assert!(Config::default().masked().upstream.access_key.is_empty());
    }
}

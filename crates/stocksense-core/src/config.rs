//! Configuration for the analysis client

use crate::error::{Result, SenseError};
use crate::market::HistoryPeriod;
use crate::retry::PollPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stocksense_utils::{EnvError, env_parse, env_string};
use url::Url;

/// Local development backend
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Environment variables read by [`ClientConfigBuilder::from_env`]
pub mod env {
    pub const BACKEND_URL: &str = "STOCKSENSE_BACKEND_URL";
    pub const POLL_ATTEMPTS: &str = "STOCKSENSE_POLL_ATTEMPTS";
    pub const POLL_DELAY_MS: &str = "STOCKSENSE_POLL_DELAY_MS";
    pub const TRIGGER_TIMEOUT_SECS: &str = "STOCKSENSE_TRIGGER_TIMEOUT_SECS";
}

/// Configuration for backend access and bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis backend
    pub backend_url: String,

    /// Timeout for the liveness probe
    pub health_timeout: Duration,

    /// Timeout for the trigger request
    pub trigger_timeout: Duration,

    /// Timeout for each poll attempt
    pub poll_timeout: Duration,

    /// Attempt budget and delay for result polling
    pub poll_policy: PollPolicy,

    /// TTL for cached price history
    pub price_cache_ttl: Duration,

    /// Period used for key metrics
    pub metrics_period: HistoryPeriod,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            health_timeout: Duration::from_secs(5),
            trigger_timeout: Duration::from_secs(60),
            poll_timeout: Duration::from_secs(10),
            poll_policy: PollPolicy::default(),
            price_cache_ttl: Duration::from_secs(300), // 5 minutes
            metrics_period: HistoryPeriod::OneMonth,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parsed backend URL
    pub fn backend_url(&self) -> Result<Url> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| SenseError::Config(format!("Invalid backend URL '{}': {}", self.backend_url, e)))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(SenseError::Config(format!(
                "Backend URL must be an http(s) base URL: {}",
                self.backend_url
            )));
        }

        Ok(url)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.backend_url()?;

        if self.poll_policy.max_attempts == 0 {
            return Err(SenseError::Config(
                "poll max_attempts must be greater than 0".to_string(),
            ));
        }

        for (name, timeout) in [
            ("health_timeout", self.health_timeout),
            ("trigger_timeout", self.trigger_timeout),
            ("poll_timeout", self.poll_timeout),
        ] {
            if timeout.is_zero() {
                return Err(SenseError::Config(format!("{name} must be non-zero")));
            }
        }

        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    backend_url: Option<String>,
    health_timeout: Option<Duration>,
    trigger_timeout: Option<Duration>,
    poll_timeout: Option<Duration>,
    poll_max_attempts: Option<u32>,
    poll_delay: Option<Duration>,
    price_cache_ttl: Option<Duration>,
    metrics_period: Option<HistoryPeriod>,
}

impl ClientConfigBuilder {
    /// Set the backend base URL
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Set the liveness probe timeout
    pub fn health_timeout(mut self, duration: Duration) -> Self {
        self.health_timeout = Some(duration);
        self
    }

    /// Set the trigger timeout
    pub fn trigger_timeout(mut self, duration: Duration) -> Self {
        self.trigger_timeout = Some(duration);
        self
    }

    /// Set the per-attempt poll timeout
    pub fn poll_timeout(mut self, duration: Duration) -> Self {
        self.poll_timeout = Some(duration);
        self
    }

    /// Set the poll attempt budget
    pub fn poll_max_attempts(mut self, attempts: u32) -> Self {
        self.poll_max_attempts = Some(attempts);
        self
    }

    /// Set the delay between not-ready attempts
    pub fn poll_delay(mut self, duration: Duration) -> Self {
        self.poll_delay = Some(duration);
        self
    }

    /// Set price cache TTL
    pub fn price_cache_ttl(mut self, duration: Duration) -> Self {
        self.price_cache_ttl = Some(duration);
        self
    }

    /// Set the key-metrics period
    pub fn metrics_period(mut self, period: HistoryPeriod) -> Self {
        self.metrics_period = Some(period);
        self
    }

    /// Fill unset fields from `STOCKSENSE_*` environment variables
    pub fn from_env(mut self) -> Result<Self> {
        if self.backend_url.is_none() {
            self.backend_url = env_string(env::BACKEND_URL);
        }
        if self.poll_max_attempts.is_none() {
            self.poll_max_attempts = env_parse(env::POLL_ATTEMPTS).map_err(env_error)?;
        }
        if self.poll_delay.is_none() {
            self.poll_delay = env_parse::<u64>(env::POLL_DELAY_MS)
                .map_err(env_error)?
                .map(Duration::from_millis);
        }
        if self.trigger_timeout.is_none() {
            self.trigger_timeout = env_parse::<u64>(env::TRIGGER_TIMEOUT_SECS)
                .map_err(env_error)?
                .map(Duration::from_secs);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let config = ClientConfig {
            backend_url: self.backend_url.unwrap_or(defaults.backend_url),
            health_timeout: self.health_timeout.unwrap_or(defaults.health_timeout),
            trigger_timeout: self.trigger_timeout.unwrap_or(defaults.trigger_timeout),
            poll_timeout: self.poll_timeout.unwrap_or(defaults.poll_timeout),
            poll_policy: PollPolicy::new(
                self.poll_max_attempts.unwrap_or(defaults.poll_policy.max_attempts),
                self.poll_delay.unwrap_or(defaults.poll_policy.delay),
            ),
            price_cache_ttl: self.price_cache_ttl.unwrap_or(defaults.price_cache_ttl),
            metrics_period: self.metrics_period.unwrap_or(defaults.metrics_period),
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_error(err: EnvError) -> SenseError {
    SenseError::Config(err.to_string())
}

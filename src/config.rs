use std::{env, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream_api_url: String,
    pub upstream_api_token: Option<String>,
    pub upstream_timeout: Duration,
    /// `None` disables background polling.
    pub poll_interval: Option<Duration>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let upstream_api_url =
            env::var("UPSTREAM_API_URL").context("UPSTREAM_API_URL is not set")?;
        let upstream_api_token = env::var("UPSTREAM_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let upstream_timeout = Duration::from_secs(
            env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(10),
        );
        let poll_secs = env::var("ORDER_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let poll_interval = (poll_secs > 0).then(|| Duration::from_secs(poll_secs));
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            upstream_api_url,
            upstream_api_token,
            upstream_timeout,
            poll_interval,
            host,
            port,
        })
    }
}

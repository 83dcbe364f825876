use std::{fs, net::SocketAddr, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::trend::MAX_TREND_DAYS;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001/predict";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8001";

/// Client-side settings.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub endpoint: String,
    /// Unset means a hung request blocks its submission indefinitely.
    pub request_timeout_ms: Option<u64>,
    /// Days of synthetic trend history before today.
    pub trend_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: None,
            trend_days: 30,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path))?;
        let cfg: Self = serde_json::from_str(&data)
            .with_context(|| format!("invalid config JSON in {}", path))?;
        cfg.validate()
            .with_context(|| format!("invalid config in {}", path))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trend_days > MAX_TREND_DAYS {
            bail!(
                "trend_days {} exceeds the maximum of {}",
                self.trend_days,
                MAX_TREND_DAYS
            );
        }
        Ok(())
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("CHURN_API_URL") {
            cfg.endpoint = url;
        }
        if let Ok(ms) = std::env::var("CHURN_API_TIMEOUT_MS") {
            let ms = ms
                .parse()
                .with_context(|| format!("CHURN_API_TIMEOUT_MS is not an integer: {:?}", ms))?;
            cfg.request_timeout_ms = Some(ms);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Settings for the reference scoring service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Half-width of the uniform noise added to the rule score.
    pub jitter: f64,
    pub seed: Option<u64>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind))?;

        let jitter = match std::env::var("SCORING_JITTER") {
            Ok(s) => s
                .parse()
                .with_context(|| format!("SCORING_JITTER is not a number: {:?}", s))?,
            Err(_) => 0.1,
        };

        let seed = match std::env::var("SCORING_SEED") {
            Ok(s) => Some(
                s.parse()
                    .with_context(|| format!("SCORING_SEED is not an integer: {:?}", s))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            bind_addr,
            jitter,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: DashboardConfig =
            serde_json::from_str(r#"{ "endpoint": "http://scoring:9000/predict" }"#).unwrap();
        assert_eq!(cfg.endpoint, "http://scoring:9000/predict");
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.trend_days, 30);
    }

    #[test]
    fn timeout_in_millis() {
        let cfg: DashboardConfig = serde_json::from_str(r#"{ "request_timeout_ms": 1500 }"#).unwrap();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn oversized_trend_days_rejected() {
        let path = std::env::temp_dir().join(format!("churn_cfg_{}.json", std::process::id()));
        fs::write(&path, r#"{ "trend_days": 200000000 }"#).unwrap();
        let err = DashboardConfig::load(path.to_str().unwrap()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(format!("{:#}", err).contains("trend_days 200000000 exceeds"));

        let ok: DashboardConfig = serde_json::from_str(r#"{ "trend_days": 366 }"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DashboardConfig::load("/nonexistent/churn.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}

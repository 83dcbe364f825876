use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::error::PredictionError;
use crate::types::{FeatureVector, PredictionLabel, PredictionResult};

// ---------- Wire types ----------

#[derive(Serialize, Debug)]
pub struct PredictRequest {
    pub features: FeatureVector,
}

#[derive(Deserialize, Debug)]
pub struct PredictResponse {
    /// Integral or float; only a value equal to 1 means churn.
    pub prediction: f64,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl PredictResponse {
    /// Missing or null probability counts as 0. Out-of-range values are
    /// clamped into [0, 1].
    pub fn into_result(self) -> PredictionResult {
        let raw = self.probability.unwrap_or(0.0);
        let probability = raw.clamp(0.0, 1.0);
        if probability != raw {
            tracing::warn!("probability {} outside [0, 1]; clamped to {}", raw, probability);
        }
        PredictionResult {
            label: PredictionLabel::from_wire(self.prediction),
            probability,
        }
    }
}

// ---------- Client seam ----------

#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, vector: FeatureVector) -> Result<PredictionResult, PredictionError>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("client")
    }
}

/// Talks to the scoring service over HTTP. No retries.
pub struct HttpPredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(cfg: &DashboardConfig) -> anyhow::Result<Self> {
        Self::new(cfg.endpoint.clone(), cfg.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, vector: FeatureVector) -> Result<PredictionResult, PredictionError> {
        tracing::debug!("POST {} features={:?}", self.endpoint, vector.to_array());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { features: vector })
            .send()
            .await
            .map_err(|e| PredictionError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictionError::Service {
                status: status.as_u16(),
            });
        }

        let body: PredictResponse = resp
            .json()
            .await
            .map_err(|e| PredictionError::Network(format!("malformed response: {}", e)))?;

        Ok(body.into_result())
    }
}

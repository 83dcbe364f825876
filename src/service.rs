//! Reference scoring service.
//!
//! Stands in for the remote model: a fixed rule score plus uniform noise.
//! Same wire contract as the client expects.

use std::sync::Arc;

use anyhow::{bail, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::types::FeatureVector;

/// Probability above which the service answers `1` (churn).
pub const CHURN_CUTOFF: f64 = 0.6;

// ---------- Request/Response types ----------

#[derive(Deserialize, Debug)]
pub struct ScoreRequest {
    pub features: Vec<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScoreResponse {
    pub prediction: i64,
    pub probability: f64,
}

// ---------- Model ----------

pub struct RuleModel {
    jitter: f64,
    rng: Mutex<StdRng>,
}

impl RuleModel {
    pub fn new(jitter: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            jitter: jitter.abs(),
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(cfg: &ServiceConfig) -> Self {
        Self::new(cfg.jitter, cfg.seed)
    }

    /// Deterministic part of the score.
    pub fn base_score(tenure: f64, monthly_charges: f64, contract: f64) -> f64 {
        let mut score = 0.0;
        if contract == 0.0 {
            score += 0.5;
        }
        if monthly_charges > 50.0 {
            score += 0.3;
        }
        if tenure < 12.0 {
            score += 0.3;
        }
        score
    }

    pub fn score(&self, features: &[f64]) -> Result<ScoreResponse> {
        if features.len() != FeatureVector::LEN {
            bail!(
                "feature length mismatch: got {}, expected {}",
                features.len(),
                FeatureVector::LEN
            );
        }
        let (tenure, charges, contract) = (features[0], features[1], features[2]);

        let noise = if self.jitter > 0.0 {
            self.rng.lock().gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        let probability = (Self::base_score(tenure, charges, contract) + noise).clamp(0.0, 1.0);
        let prediction = i64::from(probability > CHURN_CUTOFF);

        Ok(ScoreResponse {
            prediction,
            probability,
        })
    }
}

// ---------- Handlers ----------

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "Customer Churn Prediction API is running" }))
}

async fn predict(
    State(model): State<Arc<RuleModel>>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, (StatusCode, Json<serde_json::Value>)> {
    let out = model.score(&payload.features).map_err(|e| {
        tracing::warn!("rejected request: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    tracing::debug!(
        "scored features={:?} prediction={} p={:.3}",
        payload.features,
        out.prediction,
        out.probability
    );
    Ok(Json(out))
}

pub fn router(model: Arc<RuleModel>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(model)
}

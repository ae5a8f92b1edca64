//! Clients for the hosted model-serving backends: the academic depression
//! predictor and the webcam stress predictor. Both are plain JSON relays.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::UpstreamConfig;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("predictor unreachable: {0}")]
    Network(String),
    #[error("predictor returned invalid JSON: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
pub struct DepressionPrediction {
    /// Class label, "Depression" or "No Depression".
    pub prediction: String,
    /// Probability of the adverse class, in [0, 1].
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
struct StressBody {
    stress_level: f64,
}

pub struct PredictorClient {
    http: reqwest::Client,
    academic_url: String,
    stress_url: String,
}

impl PredictorClient {
    pub fn new(upstream: &UpstreamConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            academic_url: upstream.academic_predictor_url.clone(),
            stress_url: upstream.stress_predictor_url.clone(),
        }
    }

    pub async fn predict_depression<T: Serialize>(
        &self,
        features: &T,
    ) -> Result<DepressionPrediction, PredictorError> {
        let response = self
            .http
            .post(format!("{}/api/predict-depression", self.academic_url))
            .json(features)
            .send()
            .await
            .map_err(|e| PredictorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictorError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| PredictorError::Parse(e.to_string()))
    }

    /// Stress level from one webcam frame, clamped to [0, 100] the way the
    /// model service does.
    pub async fn predict_stress(
        &self,
        user_id: &str,
        image_b64: &str,
    ) -> Result<f64, PredictorError> {
        let payload = serde_json::json!({ "user_id": user_id, "image": image_b64 });
        let response = self
            .http
            .post(format!("{}/predict-stress", self.stress_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PredictorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictorError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        let body: StressBody = response
            .json()
            .await
            .map_err(|e| PredictorError::Parse(e.to_string()))?;
        Ok(body.stress_level.clamp(0.0, 100.0))
    }
}

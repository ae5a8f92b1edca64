//! Facial-stress scoring: forward a base64 snapshot to the stress predictor.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::HIGH_RISK_THRESHOLD;

#[derive(Debug, Deserialize)]
pub struct StressForm {
    /// Base64-encoded facial image, as captured by the browser.
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct StressResponse {
    pub stress_level: f64,
    pub high_risk: bool,
}

/// POST /api/stress/predict
pub async fn predict(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<StressForm>,
) -> ApiResult<StressResponse> {
    if form.image.trim().is_empty() {
        return Err(ApiError::bad_request("No image uploaded"));
    }

    let stress_level = state
        .predictor
        .predict_stress(&user.user_id, &form.image)
        .await?;

    tracing::info!(user_id = %user.user_id, stress_level, "stress prediction complete");

    Ok(ApiResponse::success(StressResponse {
        stress_level,
        high_risk: stress_level >= HIGH_RISK_THRESHOLD,
    }))
}

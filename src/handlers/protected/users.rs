//! User-sync route: mirror the verified user's profile into the store.

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_store::UserRecord;
use crate::state::AppState;

/// POST /api/users/sync
pub async fn sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let profile = state.clerk.profile(&user.user_id).await?;

    state
        .store
        .save_user(&UserRecord {
            user_id: user.user_id.clone(),
            email: profile.email,
            auth_method: profile.auth_method,
        })
        .await?;

    tracing::info!(user_id = %user.user_id, "user profile synced");
    Ok(ApiResponse::success(json!({ "message": "User synced" })))
}

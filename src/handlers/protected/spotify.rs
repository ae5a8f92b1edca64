use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::handlers::public::spotify::SPOTIFY_COOKIE;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct SpotifyStatus {
    pub linked: bool,
}

/// GET /api/spotify/status
///
/// Linkage is cookie-based, so this only reflects the requesting browser.
pub async fn status(Extension(user): Extension<AuthUser>, jar: CookieJar) -> ApiResult<SpotifyStatus> {
    let linked = jar.get(SPOTIFY_COOKIE).is_some();
    tracing::debug!(user_id = %user.user_id, linked, "spotify status checked");
    Ok(ApiResponse::success(SpotifyStatus { linked }))
}

//! Public Spotify OAuth bridge: consent redirect and the callback that
//! performs the bounded-retry code exchange.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::error::ApiError;
use crate::oauth::exchange_with_retry;
use crate::state::AppState;

/// Cookie carrying the third-party access token for client-side calls.
/// Deliberately not HTTP-only; the frontend reads it directly.
pub const SPOTIFY_COOKIE: &str = "spotify_access_token";
const COOKIE_MAX_AGE_HOURS: i64 = 1;

/// GET /auth/spotify/login - redirect to the Spotify consent screen.
pub async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.spotify.authorize_url().map_err(|e| {
        tracing::error!(error = %e, "cannot build Spotify authorize URL");
        ApiError::configuration_error("Configuration error")
    })?;
    Ok(Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    #[allow(dead_code)]
    pub state: Option<String>,
}

/// GET /auth/spotify/callback - exchange the authorization code with up to
/// three attempts, store the token in a short-lived cookie, and bounce
/// back into the music page. Terminal failures redirect with the reason in
/// the query string.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(code) = query.code else {
        return Err(ApiError::bad_request("No authorization code"));
    };

    let frontend = &state.config.server.frontend_url;
    let retry = &state.config.retry;

    let exchange = exchange_with_retry(
        retry.max_attempts,
        Duration::from_millis(retry.delay_unit_ms),
        || state.spotify.exchange_code(&code),
    )
    .await;

    match exchange {
        Ok(Some(access_token)) => {
            let cookie = Cookie::build((SPOTIFY_COOKIE, access_token))
                .path("/")
                .max_age(time::Duration::hours(COOKIE_MAX_AGE_HOURS))
                .same_site(SameSite::Lax)
                .http_only(false)
                .build();
            Ok((jar.add(cookie), Redirect::to(&format!("{frontend}/music"))).into_response())
        }
        Ok(None) => {
            tracing::error!("Spotify answered success without an access token");
            Ok(Redirect::to(&format!("{frontend}/music?error=no-token")).into_response())
        }
        Err(e) => {
            let details: String =
                url::form_urlencoded::byte_serialize(e.to_string().as_bytes()).collect();
            Ok(Redirect::to(&format!(
                "{frontend}/music?error=callback-failed&details={details}"
            ))
            .into_response())
        }
    }
}

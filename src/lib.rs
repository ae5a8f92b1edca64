pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod mood;
pub mod oauth;
pub mod services;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router for the given state.
///
/// Tests mount this directly on an ephemeral listener; `main` serves it on
/// the configured port.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(spotify_public_routes())
        // Protected API behind the JWT gate
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spotify_public_routes() -> Router<AppState> {
    use handlers::public::spotify;

    Router::new()
        .route("/auth/spotify/login", get(spotify::login))
        .route("/auth/spotify/callback", get(spotify::callback))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{academic, essay, music, spotify, stress, users, youtube};

    Router::new()
        .route("/api/users/sync", post(users::sync))
        .route("/api/academic/predict", post(academic::predict))
        .route("/api/essay/analyze", post(essay::analyze))
        .route("/api/stress/predict", post(stress::predict))
        .route("/api/music/top-tracks", get(music::top_tracks))
        .route("/api/spotify/status", get(spotify::status))
        .route("/api/youtube/callback", post(youtube::callback))
        .route("/api/youtube/status", get(youtube::status))
        .route("/api/youtube/disconnect", post(youtube::disconnect))
        .route("/api/youtube/report", get(youtube::report))
        .route("/api/youtube/analyze", post(youtube::analyze))
        .layer(axum::middleware::from_fn_with_state(
            state,
            jwt_auth_middleware,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "MindSync API",
            "version": version,
            "description": "Mental health companion backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "spotify_oauth": "/auth/spotify/login, /auth/spotify/callback (public)",
                "users": "/api/users/sync (protected)",
                "assessments": "/api/academic/predict, /api/essay/analyze, /api/stress/predict (protected)",
                "music": "/api/music/top-tracks, /api/spotify/status (protected)",
                "youtube": "/api/youtube/* (protected)",
            },
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "user_store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "user store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "user_store_error": e.to_string()
                }
            })),
        ),
    }
}

//! Shared harness for the integration suite: the app under test and all of
//! its upstreams run in-process on ephemeral ports, driven over real HTTP.

// Not every test binary touches every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use mindsync_api::config::AppConfig;
use mindsync_api::state::AppState;

pub const TEST_SECRET: &[u8] = b"mindsync-integration-secret";
pub const TEST_KID: &str = "test-key";
pub const TEST_ISSUER: &str = "https://mindsync.test";

/// base64url(TEST_SECRET), served as a symmetric JWK by the mock key set.
const TEST_JWK_K: &str = "bWluZHN5bmMtaW50ZWdyYXRpb24tc2VjcmV0";

/// How the mock Spotify token endpoint should behave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpotifyTokenMode {
    /// Answer with a valid access token.
    Success,
    /// Answer 500 on every attempt.
    Failure,
    /// Answer 200 without a token in the body.
    Empty,
}

pub struct TestApp {
    pub base_url: String,
    pub store: StoreState,
}

/// In-memory stand-in for the user store service.
#[derive(Default, Clone)]
pub struct StoreState {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<String, Value>,
    tokens: HashMap<String, Value>,
    reports: HashMap<String, Value>,
}

impl StoreState {
    pub fn saved_user(&self, user_id: &str) -> Option<Value> {
        self.inner.lock().unwrap().users.get(user_id).cloned()
    }

    pub fn youtube_token(&self, user_id: &str) -> Option<Value> {
        self.inner.lock().unwrap().tokens.get(user_id).cloned()
    }

    pub fn seed_youtube_token(&self, user_id: &str, access_token: &str) {
        self.inner.lock().unwrap().tokens.insert(
            user_id.to_string(),
            json!({ "access_token": access_token, "refresh_token": "seeded-refresh" }),
        );
    }
}

pub fn mint_token(user_id: &str) -> String {
    sign_token(user_id, TEST_SECRET)
}

/// Well-formed token signed with the wrong secret.
pub fn mint_forged_token(user_id: &str) -> String {
    sign_token(user_id, b"not-the-real-secret")
}

fn sign_token(user_id: &str, secret: &[u8]) -> String {
    let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": user_id,
        "iss": TEST_ISSUER,
        "iat": now,
        "exp": now + 3600,
    });
    jsonwebtoken::encode(
        &header,
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret),
    )
    .expect("token signing")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Client that surfaces redirects instead of following them, for asserting
/// on OAuth callback Location headers.
pub fn client_no_redirect() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(SpotifyTokenMode::Success).await
}

pub async fn spawn_app_with(spotify_mode: SpotifyTokenMode) -> Result<TestApp> {
    let store = StoreState::default();
    let upstream_url = serve(upstream_router(store.clone(), spotify_mode)).await?;

    let mut config = AppConfig::development();
    config.identity.jwks_url = format!("{upstream_url}/jwks/.well-known/jwks.json");
    config.identity.issuer = TEST_ISSUER.to_string();
    config.identity.clerk_api_url = format!("{upstream_url}/clerk");
    config.identity.clerk_secret_key = "sk_test_mindsync".to_string();

    config.youtube.client_id = "yt-client".to_string();
    config.youtube.client_secret = "yt-secret".to_string();
    config.youtube.token_url = format!("{upstream_url}/google/token");
    config.youtube.api_url = format!("{upstream_url}/youtube");

    config.spotify.client_id = "sp-client".to_string();
    config.spotify.client_secret = "sp-secret".to_string();
    config.spotify.accounts_url = format!("{upstream_url}/spotify-accounts");
    config.spotify.api_url = format!("{upstream_url}/spotify");

    config.openrouter.api_url = format!("{upstream_url}/openrouter");
    config.openrouter.api_key = "or-test-key".to_string();

    config.upstream.user_store_url = format!("{upstream_url}/store");
    config.upstream.academic_predictor_url = format!("{upstream_url}/academic");
    config.upstream.stress_predictor_url = format!("{upstream_url}/stress");

    // Keep retry pauses short; exact backoff timing is covered by unit tests.
    config.retry.delay_unit_ms = 10;

    let state = AppState::new(config)?;
    let base_url = serve(mindsync_api::app(state)).await?;

    Ok(TestApp { base_url, store })
}

async fn serve(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

/// Every mocked upstream on one listener, namespaced by path prefix.
fn upstream_router(store: StoreState, spotify_mode: SpotifyTokenMode) -> Router {
    Router::new()
        .nest("/jwks", jwks_router())
        .nest("/clerk", clerk_router())
        .nest("/store", store_router(store))
        .nest("/academic", academic_router())
        .nest("/stress", stress_router())
        .nest("/openrouter", openrouter_router())
        .nest("/youtube", youtube_router())
        .nest("/google", google_router())
        .nest("/spotify-accounts", spotify_accounts_router(spotify_mode))
        .nest("/spotify", spotify_api_router())
}

fn jwks_router() -> Router {
    Router::new().route(
        "/.well-known/jwks.json",
        get(|| async {
            Json(json!({
                "keys": [{
                    "kty": "oct",
                    "kid": TEST_KID,
                    "alg": "HS256",
                    "k": TEST_JWK_K,
                }]
            }))
        }),
    )
}

fn clerk_router() -> Router {
    Router::new().route(
        "/v1/users/:id",
        get(|Path(id): Path<String>| async move {
            Json(json!({
                "email_addresses": [{ "email_address": format!("{id}@example.com") }],
                "password_enabled": true,
            }))
        }),
    )
}

fn store_router(store: StoreState) -> Router {
    async fn save_user(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
        store.inner.lock().unwrap().users.insert(user_id, body);
        Json(json!({ "status": "ok" }))
    }

    async fn save_token(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
        store.inner.lock().unwrap().tokens.insert(user_id, body);
        Json(json!({ "status": "ok" }))
    }

    async fn get_token(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let user_id = body["user_id"].as_str().unwrap_or_default();
        match store.inner.lock().unwrap().tokens.get(user_id) {
            Some(token) => (StatusCode::OK, Json(token.clone())),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "no token for user" })),
            ),
        }
    }

    async fn check_connected(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let user_id = body["user_id"].as_str().unwrap_or_default();
        let connected = store.inner.lock().unwrap().tokens.contains_key(user_id);
        Json(json!({ "connected": connected }))
    }

    async fn clear(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let user_id = body["user_id"].as_str().unwrap_or_default();
        let mut inner = store.inner.lock().unwrap();
        inner.tokens.remove(user_id);
        inner.reports.remove(user_id);
        Json(json!({ "status": "ok" }))
    }

    async fn save_report(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
        store.inner.lock().unwrap().reports.insert(
            user_id,
            json!({ "metrics": body["metrics"], "report": body["report"] }),
        );
        Json(json!({ "status": "ok" }))
    }

    async fn get_report(
        State(store): State<StoreState>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let user_id = body["user_id"].as_str().unwrap_or_default();
        match store.inner.lock().unwrap().reports.get(user_id) {
            Some(report) => (StatusCode::OK, Json(report.clone())),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "no report for user" })),
            ),
        }
    }

    Router::new()
        .route("/api/save-user", post(save_user))
        .route("/api/save-youtube-token", post(save_token))
        .route("/api/get-youtube-token", post(get_token))
        .route("/api/check-youtube", post(check_connected))
        .route("/api/clear-youtube-token", post(clear))
        .route("/api/save-youtube-report", post(save_report))
        .route("/api/get-youtube-report", post(get_report))
        .route("/api/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .with_state(store)
}

fn academic_router() -> Router {
    Router::new().route(
        "/api/predict-depression",
        post(|Json(_body): Json<Value>| async {
            Json(json!({ "prediction": "No Depression", "probability": 0.2 }))
        }),
    )
}

fn stress_router() -> Router {
    Router::new().route(
        "/predict-stress",
        post(|Json(_body): Json<Value>| async {
            Json(json!({ "stress_level": 42.5 }))
        }),
    )
}

/// Echoes a report tailored to the prompt so handlers can parse the
/// structured lines they asked for.
fn openrouter_router() -> Router {
    Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
            let content = if prompt.contains("Academic Stress Probability") {
                "Mock analysis of the assessment.\nAcademic Stress Probability: 35%\nTake regular breaks."
            } else if prompt.contains("Depression Probability") {
                "Mock analysis of the essays.\nDepression Probability: 20%\nStay connected with friends."
            } else {
                "Mock narrative report based on the supplied metrics."
            };
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            }))
        }),
    )
}

fn youtube_router() -> Router {
    async fn videos() -> Json<Value> {
        let recent = (Utc::now() - Duration::days(3)).to_rfc3339();
        let stale = (Utc::now() - Duration::days(90)).to_rfc3339();
        Json(json!({
            "items": [
                {
                    "id": "vid-happy",
                    "snippet": {
                        "title": "I love this wonderful happy day",
                        "description": "",
                        "categoryId": "22",
                        "publishedAt": recent,
                    }
                },
                {
                    "id": "vid-sad",
                    "snippet": {
                        "title": "bad awful hate everything",
                        "description": "",
                        "categoryId": "22",
                        "publishedAt": recent,
                    }
                },
                {
                    "id": "vid-workout",
                    "snippet": {
                        "title": "morning workout routine",
                        "description": "",
                        "categoryId": "17",
                        "publishedAt": recent,
                    }
                },
                {
                    "id": "vid-old",
                    "snippet": {
                        "title": "I love this wonderful happy day",
                        "description": "",
                        "categoryId": "22",
                        "publishedAt": stale,
                    }
                }
            ]
        }))
    }

    async fn comment_threads() -> Json<Value> {
        Json(json!({ "items": [] }))
    }

    Router::new()
        .route("/videos", get(videos))
        .route("/commentThreads", get(comment_threads))
}

fn google_router() -> Router {
    Router::new().route(
        "/token",
        post(|| async {
            Json(json!({
                "access_token": "google-access-token",
                "refresh_token": "google-refresh-token",
                "token_type": "Bearer",
            }))
        }),
    )
}

fn spotify_accounts_router(mode: SpotifyTokenMode) -> Router {
    Router::new()
        .route(
            "/api/token",
            post(move || async move {
                match mode {
                    SpotifyTokenMode::Success => (
                        StatusCode::OK,
                        Json(json!({
                            "access_token": "spotify-access-token",
                            "token_type": "Bearer",
                        })),
                    ),
                    SpotifyTokenMode::Empty => {
                        (StatusCode::OK, Json(json!({ "token_type": "Bearer" })))
                    }
                    SpotifyTokenMode::Failure => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "server_error" })),
                    ),
                }
            }),
        )
        .route("/authorize", get(|| async { "consent screen" }))
}

fn spotify_api_router() -> Router {
    Router::new().route(
        "/v1/me/top/tracks",
        get(|| async {
            Json(json!({
                "items": [
                    {
                        "id": "t1",
                        "name": "Here Comes the Sun",
                        "artists": [{ "name": "The Beatles" }],
                    },
                    {
                        "id": "t2",
                        "name": "Hurt",
                        "artists": [{ "name": "Nine Inch Nails" }, { "name": "Johnny Cash" }],
                    }
                ]
            }))
        }),
    )
}

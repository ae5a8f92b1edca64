//! YouTube integration: OAuth code exchange, connection lifecycle, and the
//! liked-video sentiment analysis pipeline.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::mood::{self, MoodMetrics, VideoMood};
use crate::services::user_store::{StoreError, StoredReport};
use crate::state::AppState;

const REPORT_MAX_TOKENS: u32 = 500;

const FALLBACK_REPORT: &str = "We were unable to generate a detailed report at this time. \
The metrics below still reflect your liked-video activity over the analysis window.";

#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub metrics: MoodMetrics,
    pub report: String,
}

/// POST /api/youtube/callback
///
/// The frontend relays the authorization code here; tokens never touch the
/// browser beyond that code.
pub async fn callback(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CallbackBody>,
) -> ApiResult<Value> {
    let code = body
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("No authorization code provided"))?;

    let tokens = state.google.exchange_code(code).await?;
    state
        .store
        .save_youtube_token(
            &user.user_id,
            &tokens.access_token,
            tokens.refresh_token.as_deref(),
        )
        .await?;

    tracing::info!(user_id = %user.user_id, "youtube account connected");
    Ok(ApiResponse::success(json!({ "message": "YouTube connected" })))
}

/// GET /api/youtube/status
///
/// Store failures read as "not connected" so the frontend can always render.
pub async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<ConnectionStatus> {
    let connected = match state.store.is_youtube_connected(&user.user_id).await {
        Ok(connected) => connected,
        Err(err) => {
            tracing::warn!(error = %err, "connection check failed, reporting disconnected");
            false
        }
    };
    Ok(ApiResponse::success(ConnectionStatus { connected }))
}

/// POST /api/youtube/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    state.store.clear_youtube(&user.user_id).await?;
    tracing::info!(user_id = %user.user_id, "youtube token cleared");
    Ok(ApiResponse::success(json!({ "message": "YouTube token cleared" })))
}

/// GET /api/youtube/report
pub async fn report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<StoredReport> {
    let stored = state.store.report(&user.user_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("No report found"),
        other => ApiError::from(other),
    })?;
    Ok(ApiResponse::success(stored))
}

fn report_prompt(metrics: &MoodMetrics) -> String {
    format!(
        "You are a mental health analyst. Based on the following analysis of a user's YouTube \
liked videos over the last 60 days, generate a detailed mental health report. The videos have \
been categorized into emotional categories: sad, happy, energetic, and calm. Here are the \
metrics:\n\
- Total videos liked: {}\n\
- Sad videos: {}\n\
- Happy videos: {}\n\
- Energetic videos: {}\n\
- Calm videos: {}\n\
Provide an analysis of the user's emotional stability and overall mental health based on \
these metrics. Highlight any potential concerns (e.g., high number of sad videos might \
indicate emotional distress) and offer suggestions for improving mental well-being. Keep the \
tone empathetic and supportive, and emphasize that this is not a professional diagnosis but a \
reflection of their social media activity.",
        metrics.total_videos,
        metrics.sad_count,
        metrics.happy_count,
        metrics.energetic_count,
        metrics.calm_count,
    )
}

/// POST /api/youtube/analyze
///
/// Scores every recent liked video (title, description, and a sample of
/// comments), buckets each into a mood, and persists the resulting report.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<AnalysisResponse> {
    let access_token = state
        .store
        .youtube_token(&user.user_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("No YouTube access token found"),
            other => ApiError::from(other),
        })?;

    let videos = state.youtube.liked_videos(&access_token).await?;
    tracing::info!(user_id = %user.user_id, count = videos.len(), "analyzing liked videos");

    let mut scored = Vec::with_capacity(videos.len());
    for video in videos {
        let comments = state.youtube.comments(&access_token, &video.id).await;
        let text = format!(
            "{} {} {}",
            video.title,
            video.description,
            comments.join(" ")
        );
        let score = mood::score_text(&text);
        scored.push(VideoMood {
            video_id: video.id,
            title: video.title,
            sentiment_score: score,
            emotional_category: mood::bucket(score, video.category_id.as_deref()),
            published_at: video.published_at,
        });
    }

    let metrics = mood::compute_metrics(scored);

    let report = match state
        .openrouter
        .chat(&report_prompt(&metrics), REPORT_MAX_TOKENS)
        .await
    {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => FALLBACK_REPORT.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "report generation failed, using fallback");
            FALLBACK_REPORT.to_string()
        }
    };

    state
        .store
        .save_report(&user.user_id, &metrics, &report)
        .await?;

    Ok(ApiResponse::success(AnalysisResponse { metrics, report }))
}

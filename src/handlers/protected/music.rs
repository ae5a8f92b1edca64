//! Spotify listening insights: top tracks plus a bullet-point read on
//! what the listening history suggests about mood.

use axum::{extract::State, Extension};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::spotify::Track;
use crate::state::AppState;

use crate::handlers::public::spotify::SPOTIFY_COOKIE;

const TOP_TRACK_LIMIT: u32 = 10;
const INSIGHT_MAX_TOKENS: u32 = 150;

const FALLBACK_INSIGHT: &str = "Listening insights are unavailable right now.";

#[derive(Debug, Serialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<Track>,
    pub llm_feedback: String,
}

fn insight_prompt(tracks: &[Track]) -> String {
    let titles: Vec<&str> = tracks.iter().map(|track| track.name.as_str()).collect();
    format!(
        "Analyze the following list of song titles to infer key insights about the user's \
mental health. Provide a concise, point-by-point report (bullet points) focusing on potential \
mental health indicators such as mood, stress, or emotional patterns. Do not adopt a humanized \
tone; present the analysis as objective observations based on the song titles. Here are the \
song titles:\n{}\n\n\
Report format:\n\
- Insight 1: [Observation based on song titles]\n\
- Insight 2: [Observation based on song titles]\n\
- Insight 3: [Observation based on song titles]\n",
        titles.join(", "),
    )
}

/// GET /api/music/top-tracks
pub async fn top_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> ApiResult<TopTracksResponse> {
    let token = jar
        .get(SPOTIFY_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("No Spotify token"))?;

    let tracks = state.spotify.top_tracks(&token, TOP_TRACK_LIMIT).await?;
    tracing::info!(user_id = %user.user_id, count = tracks.len(), "fetched top tracks");

    let llm_feedback = if tracks.is_empty() {
        "No listening history available to analyze.".to_string()
    } else {
        match state
            .openrouter
            .chat(&insight_prompt(&tracks), INSIGHT_MAX_TOKENS)
            .await
        {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => FALLBACK_INSIGHT.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "insight generation failed, using fallback");
                FALLBACK_INSIGHT.to_string()
            }
        }
    };

    Ok(ApiResponse::success(TopTracksResponse {
        tracks,
        llm_feedback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_track_titles() {
        let tracks = vec![
            Track {
                id: "1".to_string(),
                name: "Here Comes the Sun".to_string(),
                artists: "The Beatles".to_string(),
            },
            Track {
                id: "2".to_string(),
                name: "Hurt".to_string(),
                artists: "Johnny Cash".to_string(),
            },
        ];
        let prompt = insight_prompt(&tracks);
        assert!(prompt.contains("Here Comes the Sun, Hurt"));
        assert!(prompt.contains("- Insight 3:"));
    }
}

//! YouTube Data API client for the liked-video aggregation pipeline.
//!
//! Listing is strictly sequential: all liked-video pages are collected
//! before any comments are fetched, with no parallel fan-out.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::upstream_error_message;

/// Only videos published within this window are analyzed.
const LIKED_WINDOW_DAYS: i64 = 60;
/// Analysis cap; pagination stops once this many recent videos are held.
const MAX_ANALYZED_VIDEOS: usize = 50;
const PAGE_SIZE: u32 = 50;
const MAX_COMMENTS_PER_VIDEO: u32 = 20;

#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("failed to fetch liked videos: {0}")]
    Network(String),
    #[error("invalid response from YouTube: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct VideoListBody {
    #[serde(default)]
    items: Vec<VideoItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "categoryId")]
    category_id: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct CommentListBody {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay")]
    text_display: String,
}

/// A liked video with the snippet fields the pipeline consumes.
#[derive(Debug, Clone)]
pub struct LikedVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub published_at: DateTime<Utc>,
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_url: String,
}

impl YouTubeClient {
    pub fn new(api_url: String, http: reqwest::Client) -> Self {
        Self { http, api_url }
    }

    /// All liked videos published in the last 60 days, capped at 50.
    /// Pages are walked in order; items with unparsable timestamps are
    /// skipped.
    pub async fn liked_videos(&self, access_token: &str) -> Result<Vec<LikedVideo>, YouTubeError> {
        let cutoff = Utc::now() - Duration::days(LIKED_WINDOW_DAYS);
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/videos", self.api_url))
                .query(&[
                    ("part", "snippet"),
                    ("myRating", "like"),
                    ("maxResults", &PAGE_SIZE.to_string()),
                ])
                .bearer_auth(access_token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| YouTubeError::Network(e.to_string()))?;
            if !response.status().is_success() {
                return Err(YouTubeError::Upstream(
                    upstream_error_message(response).await,
                ));
            }
            let body: VideoListBody = response
                .json()
                .await
                .map_err(|e| YouTubeError::Parse(e.to_string()))?;

            for item in body.items {
                let published_at =
                    match DateTime::parse_from_rfc3339(&item.snippet.published_at) {
                        Ok(ts) => ts.with_timezone(&Utc),
                        Err(_) => {
                            tracing::warn!(video_id = %item.id, "skipping video with invalid publishedAt");
                            continue;
                        }
                    };
                if published_at < cutoff {
                    continue;
                }
                videos.push(LikedVideo {
                    id: item.id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    category_id: item.snippet.category_id,
                    published_at,
                });
            }

            page_token = body.next_page_token;
            if page_token.is_none() || videos.len() >= MAX_ANALYZED_VIDEOS {
                break;
            }
        }

        videos.truncate(MAX_ANALYZED_VIDEOS);
        Ok(videos)
    }

    /// Top-level comments for one video. Comment failures degrade to an
    /// empty list; a missing comment thread must not sink the whole
    /// analysis.
    pub async fn comments(&self, access_token: &str, video_id: &str) -> Vec<String> {
        let response = self
            .http
            .get(format!("{}/commentThreads", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", &MAX_COMMENTS_PER_VIDEO.to_string()),
            ])
            .bearer_auth(access_token)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(video_id = %video_id, status = %r.status(), "failed to fetch comments");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "failed to fetch comments");
                return Vec::new();
            }
        };

        match response.json::<CommentListBody>().await {
            Ok(body) => body
                .items
                .into_iter()
                .map(|t| t.snippet.top_level_comment.snippet.text_display)
                .collect(),
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "invalid comment response");
                Vec::new()
            }
        }
    }
}

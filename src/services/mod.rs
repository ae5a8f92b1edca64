//! Typed clients for every outbound dependency. Each upstream is treated
//! as a black box: one struct per service holding a shared `reqwest`
//! client, a `thiserror` enum for its failure modes, and serde structs for
//! the wire shapes actually consumed.

pub mod clerk;
pub mod google_oauth;
pub mod openrouter;
pub mod predictor;
pub mod spotify;
pub mod user_store;
pub mod youtube;

pub use clerk::ClerkClient;
pub use google_oauth::GoogleOAuthClient;
pub use openrouter::OpenRouterClient;
pub use predictor::PredictorClient;
pub use spotify::SpotifyClient;
pub use user_store::UserStoreClient;
pub use youtube::YouTubeClient;

/// Best-effort error message from an upstream response body: prefer the
/// conventional `{"error": "..."}` field, fall back to the raw text.
pub(crate) async fn upstream_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|e| match e {
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
        })
        .unwrap_or(body);
    if detail.is_empty() {
        format!("upstream returned {}", status)
    } else {
        format!("upstream returned {}: {}", status, detail)
    }
}

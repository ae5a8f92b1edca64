//! Spotify OAuth and Web API client: consent URL, authorization-code
//! exchange, and top-tracks listing for the music-taste flow.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::SpotifyConfig;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify misconfigured: {0}")]
    Misconfigured(String),
    #[error("Spotify unreachable: {0}")]
    Network(String),
    #[error("Spotify returned invalid JSON: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
    #[error("invalid Spotify URL: {0}")]
    BadUrl(String),
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopTracksBody {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    artists: Vec<ArtistItem>,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: String,
}

pub struct SpotifyClient {
    http: reqwest::Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Consent-screen URL the login route redirects to.
    pub fn authorize_url(&self) -> Result<String, SpotifyError> {
        if self.config.client_id.is_empty() {
            return Err(SpotifyError::Misconfigured(
                "SPOTIFY_CLIENT_ID is not set".to_string(),
            ));
        }

        let mut url = Url::parse(&format!("{}/authorize", self.config.accounts_url))
            .map_err(|e| SpotifyError::BadUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("scope", &self.config.scope)
            .append_pair("redirect_uri", &self.config.redirect_uri);
        Ok(url.into())
    }

    /// Trade an authorization code for an access token. `Ok(None)` means
    /// the provider answered success without a token; the caller treats
    /// that as terminal rather than retryable.
    pub async fn exchange_code(&self, code: &str) -> Result<Option<String>, SpotifyError> {
        if self.config.client_id.is_empty() || self.config.client_secret.is_empty() {
            return Err(SpotifyError::Misconfigured(
                "Spotify client credentials are not set".to_string(),
            ));
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/api/token", self.config.accounts_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpotifyError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        let body: TokenBody = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;
        Ok(body.access_token.filter(|t| !t.is_empty()))
    }

    /// The user's top tracks over the medium term.
    pub async fn top_tracks(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<Track>, SpotifyError> {
        let response = self
            .http
            .get(format!("{}/v1/me/top/tracks", self.config.api_url))
            .query(&[("limit", limit.to_string().as_str()), ("time_range", "medium_term")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpotifyError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        let body: TopTracksBody = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        Ok(body
            .items
            .into_iter()
            .map(|item| Track {
                id: item.id,
                name: item.name,
                artists: item
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect())
    }
}

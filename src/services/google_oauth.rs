//! Google authorization-code exchange for the YouTube connection.

use serde::Deserialize;
use thiserror::Error;

use crate::config::YoutubeOAuthConfig;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum GoogleOAuthError {
    #[error("missing environment variables: {0}")]
    Misconfigured(String),
    #[error("failed to contact Google token endpoint: {0}")]
    Network(String),
    #[error("invalid response from Google token endpoint: {0}")]
    Parse(String),
    #[error("failed to authenticate with YouTube: {0}")]
    Upstream(String),
    #[error("no access token received from Google")]
    NoAccessToken,
}

#[derive(Debug, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: YoutubeOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: YoutubeOAuthConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Trade an authorization code for access/refresh tokens. A 2xx body
    /// without an access token is an error, matching the provider contract.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, GoogleOAuthError> {
        let mut missing = Vec::new();
        if self.config.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.config.client_secret.is_empty() {
            missing.push("client_secret");
        }
        if self.config.redirect_uri.is_empty() {
            missing.push("redirect_uri");
        }
        if !missing.is_empty() {
            return Err(GoogleOAuthError::Misconfigured(missing.join(", ")));
        }

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleOAuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleOAuthError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        let body: TokenBody = response
            .json()
            .await
            .map_err(|e| GoogleOAuthError::Parse(e.to_string()))?;

        let access_token = body.access_token.ok_or(GoogleOAuthError::NoAccessToken)?;
        Ok(GoogleTokens {
            access_token,
            refresh_token: body.refresh_token,
        })
    }
}

//! Identity-provider profile API, used by the user-sync route to look up
//! the verified user's email and sign-in method.

use serde::Deserialize;
use thiserror::Error;

use crate::config::IdentityConfig;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum ClerkError {
    #[error("identity provider misconfigured: {0}")]
    Misconfigured(String),
    #[error("identity provider unreachable: {0}")]
    Network(String),
    #[error("identity provider returned invalid JSON: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct ClerkUser {
    #[serde(default)]
    email_addresses: Vec<ClerkEmail>,
    #[serde(default)]
    password_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ClerkEmail {
    email_address: String,
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub email: String,
    pub auth_method: String,
}

pub struct ClerkClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
}

impl ClerkClient {
    pub fn new(identity: &IdentityConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: identity.clerk_api_url.clone(),
            secret_key: identity.clerk_secret_key.clone(),
        }
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, ClerkError> {
        if self.secret_key.is_empty() {
            return Err(ClerkError::Misconfigured(
                "CLERK_SECRET_KEY is not set".to_string(),
            ));
        }

        let response = self
            .http
            .get(format!("{}/v1/users/{}", self.api_url, user_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| ClerkError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClerkError::Upstream(upstream_error_message(response).await));
        }

        let user: ClerkUser = response
            .json()
            .await
            .map_err(|e| ClerkError::Parse(e.to_string()))?;

        let email = user
            .email_addresses
            .first()
            .map(|e| e.email_address.clone())
            .unwrap_or_default();
        let auth_method = if user.password_enabled {
            "email_password"
        } else {
            "google"
        };

        Ok(UserProfile {
            email,
            auth_method: auth_method.to_string(),
        })
    }
}

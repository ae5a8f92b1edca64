//! Client for the user-store service: the system of record for user
//! profiles, YouTube OAuth tokens, and cached analysis reports. The store
//! is an opaque per-user key-value service; nothing is persisted locally.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::mood::MoodMetrics;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store unreachable: {0}")]
    Network(String),
    #[error("user store returned invalid JSON: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
    #[error("not found in user store")]
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub auth_method: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectedBody {
    connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReport {
    pub metrics: MoodMetrics,
    pub report: String,
}

pub struct UserStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl UserStoreClient {
    pub fn new(base_url: String, http: reqwest::Client) -> Self {
        Self { http, base_url }
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, StoreError> {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    pub async fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let body = json!({
            "user_id": user.user_id,
            "email": user.email,
            "auth_method": user.auth_method,
        });
        let response = self.post("/api/save-user", &body).await?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        Ok(())
    }

    pub async fn save_youtube_token(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let body = json!({
            "user_id": user_id,
            "access_token": access_token,
            "refresh_token": refresh_token,
        });
        let response = self.post("/api/save-youtube-token", &body).await?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        Ok(())
    }

    /// Stored YouTube access token for the user; `NotFound` when the user
    /// never connected.
    pub async fn youtube_token(&self, user_id: &str) -> Result<String, StoreError> {
        let body = json!({ "user_id": user_id });
        let response = self.post("/api/get-youtube-token", &body).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        let parsed: TokenBody = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        parsed.access_token.ok_or(StoreError::NotFound)
    }

    pub async fn is_youtube_connected(&self, user_id: &str) -> Result<bool, StoreError> {
        let body = json!({ "user_id": user_id });
        let response = self.post("/api/check-youtube", &body).await?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        let parsed: ConnectedBody = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(parsed.connected)
    }

    /// Clear tokens, metrics, and cached report for the user. The store
    /// answers success even when there was nothing to clear.
    pub async fn clear_youtube(&self, user_id: &str) -> Result<(), StoreError> {
        let body = json!({ "user_id": user_id });
        let response = self.post("/api/clear-youtube-token", &body).await?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        Ok(())
    }

    pub async fn save_report(
        &self,
        user_id: &str,
        metrics: &MoodMetrics,
        report: &str,
    ) -> Result<(), StoreError> {
        let body = json!({
            "user_id": user_id,
            "metrics": metrics,
            "report": report,
        });
        let response = self.post("/api/save-youtube-report", &body).await?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        Ok(())
    }

    pub async fn report(&self, user_id: &str) -> Result<StoredReport, StoreError> {
        let body = json!({ "user_id": user_id });
        let response = self.post("/api/get-youtube-report", &body).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    pub async fn health(&self) -> Result<(), StoreError> {
        let response = self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StoreError::Upstream(upstream_error_message(response).await));
        }
        Ok(())
    }
}

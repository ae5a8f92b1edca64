use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwksVerifier;
use crate::config::AppConfig;
use crate::services::{
    ClerkClient, GoogleOAuthClient, OpenRouterClient, PredictorClient, SpotifyClient,
    UserStoreClient, YouTubeClient,
};

/// Shared per-process state: configuration, the token verifier, and one
/// typed client per outbound dependency, all behind `Arc` so the router
/// can be cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<JwksVerifier>,
    pub store: Arc<UserStoreClient>,
    pub clerk: Arc<ClerkClient>,
    pub google: Arc<GoogleOAuthClient>,
    pub spotify: Arc<SpotifyClient>,
    pub youtube: Arc<YouTubeClient>,
    pub openrouter: Arc<OpenRouterClient>,
    pub predictor: Arc<PredictorClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mindsync-api/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            verifier: Arc::new(JwksVerifier::new(&config.identity, http.clone())),
            store: Arc::new(UserStoreClient::new(
                config.upstream.user_store_url.clone(),
                http.clone(),
            )),
            clerk: Arc::new(ClerkClient::new(&config.identity, http.clone())),
            google: Arc::new(GoogleOAuthClient::new(config.youtube.clone(), http.clone())),
            spotify: Arc::new(SpotifyClient::new(config.spotify.clone(), http.clone())),
            youtube: Arc::new(YouTubeClient::new(config.youtube.api_url.clone(), http.clone())),
            openrouter: Arc::new(OpenRouterClient::new(config.openrouter.clone(), http.clone())),
            predictor: Arc::new(PredictorClient::new(&config.upstream, http)),
            config: Arc::new(config),
        })
    }
}

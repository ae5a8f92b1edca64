use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub youtube: YoutubeOAuthConfig,
    pub spotify: SpotifyConfig,
    pub openrouter: OpenRouterConfig,
    pub upstream: UpstreamConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Base URL of the frontend, used as the redirect target after OAuth.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub jwks_url: String,
    pub issuer: String,
    pub clerk_api_url: String,
    /// Secret key for the identity provider's management API. Empty means
    /// unconfigured; affected routes answer with a configuration error.
    pub clerk_secret_key: String,
    pub key_cache_max_entries: usize,
    pub key_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub accounts_url: String,
    pub api_url: String,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub referer: String,
    pub app_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub user_store_url: String,
    pub academic_predictor_url: String,
    pub stress_predictor_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_unit_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.server.frontend_url = v;
        }

        // Identity overrides
        if let Ok(v) = env::var("IDENTITY_JWKS_URL") {
            self.identity.jwks_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_ISSUER") {
            self.identity.issuer = v;
        }
        if let Ok(v) = env::var("CLERK_API_URL") {
            self.identity.clerk_api_url = v;
        }
        if let Ok(v) = env::var("CLERK_SECRET_KEY") {
            self.identity.clerk_secret_key = v;
        }
        if let Ok(v) = env::var("IDENTITY_KEY_CACHE_MAX_ENTRIES") {
            self.identity.key_cache_max_entries =
                v.parse().unwrap_or(self.identity.key_cache_max_entries);
        }
        if let Ok(v) = env::var("IDENTITY_KEY_CACHE_TTL_SECS") {
            self.identity.key_cache_ttl_secs =
                v.parse().unwrap_or(self.identity.key_cache_ttl_secs);
        }

        // OAuth provider overrides
        if let Ok(v) = env::var("YOUTUBE_CLIENT_ID") {
            self.youtube.client_id = v;
        }
        if let Ok(v) = env::var("YOUTUBE_CLIENT_SECRET") {
            self.youtube.client_secret = v;
        }
        if let Ok(v) = env::var("YOUTUBE_REDIRECT_URI") {
            self.youtube.redirect_uri = v;
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = v;
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = v;
        }
        if let Ok(v) = env::var("SPOTIFY_REDIRECT_URI") {
            self.spotify.redirect_uri = v;
        }

        // Report generation overrides
        if let Ok(v) = env::var("OPENROUTER_API_URL") {
            self.openrouter.api_url = v;
        }
        if let Ok(v) = env::var("OPENROUTER_API_KEY") {
            self.openrouter.api_key = v;
        }
        if let Ok(v) = env::var("OPENROUTER_MODEL") {
            self.openrouter.model = v;
        }

        // Upstream service overrides
        if let Ok(v) = env::var("USER_STORE_URL") {
            self.upstream.user_store_url = v;
        }
        if let Ok(v) = env::var("ACADEMIC_PREDICTOR_URL") {
            self.upstream.academic_predictor_url = v;
        }
        if let Ok(v) = env::var("STRESS_PREDICTOR_URL") {
            self.upstream.stress_predictor_url = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3001,
                cors_origins: vec!["http://localhost:3000".to_string()],
                frontend_url: "http://localhost:3000".to_string(),
            },
            identity: IdentityConfig {
                jwks_url: "https://intimate-jaguar-48.clerk.accounts.dev/.well-known/jwks.json"
                    .to_string(),
                issuer: "https://intimate-jaguar-48.clerk.accounts.dev".to_string(),
                clerk_api_url: "https://api.clerk.dev".to_string(),
                clerk_secret_key: String::new(),
                key_cache_max_entries: 5,
                key_cache_ttl_secs: 600,
            },
            youtube: YoutubeOAuthConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: "http://localhost:3000/callback".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            },
            spotify: SpotifyConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: "http://localhost:3001/auth/spotify/callback".to_string(),
                accounts_url: "https://accounts.spotify.com".to_string(),
                api_url: "https://api.spotify.com".to_string(),
                scope: "user-read-recently-played user-top-read".to_string(),
            },
            openrouter: OpenRouterConfig {
                api_url: "https://openrouter.ai/api/v1".to_string(),
                api_key: String::new(),
                model: "meta-llama/llama-3.1-8b-instruct".to_string(),
                referer: "http://localhost:3000".to_string(),
                app_title: "Mental Health Analysis".to_string(),
            },
            upstream: UpstreamConfig {
                user_store_url: "http://localhost:5000".to_string(),
                academic_predictor_url: "http://localhost:5002".to_string(),
                stress_predictor_url: "http://localhost:5001".to_string(),
            },
            retry: RetryConfig {
                max_attempts: 3,
                delay_unit_ms: 1000,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3001,
                cors_origins: vec!["https://staging.mindsync.app".to_string()],
                frontend_url: "https://staging.mindsync.app".to_string(),
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3001,
                cors_origins: vec!["https://mindsync.app".to_string()],
                frontend_url: "https://mindsync.app".to_string(),
            },
            upstream: UpstreamConfig {
                user_store_url: "https://mindsync-store.onrender.com".to_string(),
                academic_predictor_url: "https://academic-model-backend.onrender.com".to_string(),
                stress_predictor_url: "https://stress-model-backend.onrender.com".to_string(),
            },
            ..Self::development()
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

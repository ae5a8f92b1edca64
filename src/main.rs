use mindsync_api::config;
use mindsync_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CLERK_SECRET_KEY,
    // OPENROUTER_API_KEY, USER_STORE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindsync_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting MindSync API in {:?} mode", config.environment);

    let state = AppState::new(config.clone())?;
    let app = mindsync_api::app(state);

    // Allow deployments to override port via env
    let port = std::env::var("MINDSYNC_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 MindSync API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

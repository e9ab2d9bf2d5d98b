use console_gateway::config::AppConfig;
use console_gateway::routes::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up UPSTREAM_BASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting console gateway in {:?} mode", config.environment);

    let router = app(AppState::from_config(config));

    // Allow tests or deployments to override port via env
    let port = std::env::var("GATEWAY_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 Console gateway listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

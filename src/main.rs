mod app;
mod config;
mod db;
mod error;
mod response;
mod state;
mod users;

use crate::config::AppConfig;
use crate::state::AppState;

const POOL_CLOSE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "usersvc=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr()?;
    let app_state = AppState::init(config).await?;

    let grace = app_state.config.shutdown_grace;
    let served = app::serve(app::build_app(app_state.clone()), addr, grace).await;

    // Runs whether serving ended cleanly or not. Bounded so a wedged
    // connection cannot hold the process open.
    match tokio::time::timeout(POOL_CLOSE_TIMEOUT, app_state.store.close()).await {
        Ok(()) => tracing::info!("database pool closed"),
        Err(_) => tracing::error!("database pool did not close in time; exiting anyway"),
    }

    served
}

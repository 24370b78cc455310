use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::PoolConfig;

fn pool_options(cfg: &PoolConfig) -> PgPoolOptions {
    // sqlx has no idle cap. Below the pool size, the idle limit becomes the
    // floor that `idle_timeout` reaps down to; otherwise idle connections stay.
    let (min_connections, idle_timeout) = if cfg.max_idle_connections < cfg.max_connections {
        (cfg.max_idle_connections, Some(cfg.idle_timeout))
    } else {
        (0, None)
    };

    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(min_connections)
        .max_lifetime(cfg.max_lifetime)
        .idle_timeout(idle_timeout)
        .acquire_timeout(cfg.acquire_timeout)
}

/// Open the pool and check that the database is reachable.
pub async fn connect(database_url: &str, cfg: &PoolConfig) -> anyhow::Result<PgPool> {
    let pool = pool_options(cfg)
        .connect(database_url)
        .await
        .context("connect to database")?;
    tracing::info!(
        max_connections = cfg.max_connections,
        max_idle_connections = cfg.max_idle_connections,
        max_lifetime_secs = cfg.max_lifetime.as_secs(),
        "database pool ready"
    );
    Ok(pool)
}

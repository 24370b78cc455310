use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub max_idle_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool: PoolConfig,
    pub shutdown_grace: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str, default: u32| -> u32 { parse_or(&lookup, key, default) };

        let max_connections = parsed("DB_MAX_CONNECTIONS", 25).max(1);
        let pool = PoolConfig {
            max_connections,
            max_idle_connections: parsed("DB_MAX_IDLE_CONNECTIONS", 25).min(max_connections),
            max_lifetime: Duration::from_secs(parsed("DB_MAX_LIFETIME_SECS", 300).into()),
            idle_timeout: Duration::from_secs(parsed("DB_IDLE_TIMEOUT_SECS", 60).into()),
            acquire_timeout: Duration::from_secs(parsed("DB_ACQUIRE_TIMEOUT_SECS", 30).into()),
        };

        let port = lookup("APP_PORT")
            .map(|v| v.parse::<u16>().with_context(|| format!("invalid APP_PORT {v:?}")))
            .transpose()?
            .unwrap_or(8080);

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://postgres@localhost/test?sslmode=disable".into()),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            pool,
            shutdown_grace: Duration::from_secs(parsed("SHUTDOWN_GRACE_SECS", 5).into()),
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

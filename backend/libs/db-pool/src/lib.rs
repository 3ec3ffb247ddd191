//! Database connection pool management
//!
//! Builds a verified PostgreSQL pool from environment-driven configuration and keeps
//! pool-state gauges current in the background.

pub mod env_utils;
mod metrics;

pub use metrics::PoolMetrics;

use env_utils::parse_env_with_default;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// How often pool gauges are refreshed
const METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Timeout for verifying a freshly created pool
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Create a DbConfig from environment variables.
    ///
    /// `DATABASE_URL` falls back to `default_url`; pool sizing and timeouts fall back to
    /// [`DbConfig::default`]. A minimum larger than the maximum is clamped down.
    pub fn from_env(service_name: &str, default_url: &str) -> Self {
        let defaults = Self::default();
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| default_url.to_string());

        let max_connections = parse_env_with_default("DB_MAX_CONNECTIONS", defaults.max_connections).max(1);
        let min_connections =
            parse_env_with_default("DB_MIN_CONNECTIONS", defaults.min_connections).min(max_connections);

        Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections,
            min_connections,
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: parse_env_with_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: parse_env_with_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            ),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            ),
        }
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.connect_timeout_secs,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }
}

/// Create a PostgreSQL connection pool and verify it with `SELECT 1`.
///
/// When `metrics` is supplied the pool gauges are refreshed every 30 seconds on a
/// background task for the lifetime of the pool.
pub async fn create_pool(
    config: DbConfig,
    metrics: Option<PoolMetrics>,
) -> Result<PgPool, sqlx::Error> {
    debug!(
        service = %config.service_name,
        max = config.max_connections,
        min = config.min_connections,
        "Creating database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );

            if let Some(metrics) = metrics {
                metrics.observe(&pool, &config.service_name);

                let pool_clone = pool.clone();
                let service = config.service_name.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(METRICS_INTERVAL);
                    while !pool_clone.is_closed() {
                        interval.tick().await;
                        metrics.observe(&pool_clone, &service);
                    }
                });
            }

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

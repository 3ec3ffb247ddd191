//! Prometheus metrics for the database connection pool
//!
//! Collectors are registered on a caller-supplied registry so the owning service decides
//! where they are exported.

use prometheus::{IntGaugeVec, Opts, Registry};
use sqlx::PgPool;

/// Connection pool gauges labelled by service and state (idle/active/max)
#[derive(Clone)]
pub struct PoolMetrics {
    connections: IntGaugeVec,
}

impl PoolMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let connections = IntGaugeVec::new(
            Opts::new(
                "db_pool_connections",
                "Database pool connection count by state",
            ),
            &["service", "state"],
        )?;
        registry.register(Box::new(connections.clone()))?;

        Ok(Self { connections })
    }

    /// Snapshot pool state into the gauges
    pub fn observe(&self, pool: &PgPool, service: &str) {
        let size = pool.size() as i64;
        let idle = pool.num_idle() as i64;

        self.connections
            .with_label_values(&[service, "idle"])
            .set(idle);
        self.connections
            .with_label_values(&[service, "active"])
            .set(size - idle);
        self.connections
            .with_label_values(&[service, "max"])
            .set(pool.options().get_max_connections() as i64);
    }

    #[cfg(test)]
    pub(crate) fn value(&self, service: &str, state: &str) -> i64 {
        self.connections.with_label_values(&[service, state]).get()
    }
}

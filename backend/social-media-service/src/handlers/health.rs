use crate::db::Stores;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    postgresql: ComponentCheck,
    timestamp: String,
}

/// GET /api/v1/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": crate::config::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/v1/health/ready
pub async fn readiness(stores: web::Data<Stores>) -> HttpResponse {
    let start = Instant::now();
    let result = stores.posts.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let postgresql = match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("PostgreSQL connection failed: {}", e),
            latency_ms,
        },
    };
    let ready = matches!(postgresql.status, ComponentStatus::Healthy);

    let body = ReadinessResponse {
        ready,
        postgresql,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

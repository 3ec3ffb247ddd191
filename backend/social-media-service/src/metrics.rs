//! Prometheus metrics for social-media-service.
//!
//! Collectors live on an explicit [`Registry`] and are handed to the services that use them.

use actix_web::{web, HttpResponse};
use prometheus::{
    register_histogram_vec_with_registry, register_histogram_with_registry,
    register_int_counter_vec_with_registry, Encoder, Histogram, HistogramVec, IntCounterVec,
    Registry, TextEncoder,
};

const DB_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

#[derive(Clone)]
pub struct ServiceMetrics {
    /// Ranked listing calls by outcome (`ok` or an error code)
    pub listing_requests: IntCounterVec,
    pub listing_duration: Histogram,
    /// Hard erasures by outcome (`committed` or an error code)
    pub erasures: IntCounterVec,
    pub erasure_duration: Histogram,
    /// Blob deletions during erasure (`deleted` / `absent`)
    pub erasure_blobs: IntCounterVec,
    /// Statement latency recorded by the instrumented store handle
    pub db_query_duration: HistogramVec,
}

impl ServiceMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            listing_requests: register_int_counter_vec_with_registry!(
                "ranked_listing_requests_total",
                "Ranked post listing requests segmented by outcome",
                &["outcome"],
                registry
            )?,
            listing_duration: register_histogram_with_registry!(
                "ranked_listing_duration_seconds",
                "Ranked post listing latency including comment enrichment",
                registry
            )?,
            erasures: register_int_counter_vec_with_registry!(
                "account_erasure_total",
                "Hard account erasures segmented by outcome",
                &["outcome"],
                registry
            )?,
            erasure_duration: register_histogram_with_registry!(
                "account_erasure_duration_seconds",
                "Hard account erasure latency",
                registry
            )?,
            erasure_blobs: register_int_counter_vec_with_registry!(
                "account_erasure_blobs_deleted_total",
                "Blob deletions issued by account erasure segmented by result",
                &["result"],
                registry
            )?,
            db_query_duration: register_histogram_vec_with_registry!(
                "db_query_duration_seconds",
                "Database statement latency segmented by operation",
                &["operation"],
                DB_BUCKETS.to_vec(),
                registry
            )?,
        })
    }
}

/// Actix handler that renders the registry in Prometheus text format.
pub async fn serve_metrics(registry: web::Data<Registry>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

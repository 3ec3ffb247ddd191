use actix_web::{App, HttpServer};
use anyhow::Context;
use db_pool::{create_pool, PoolMetrics};
use prometheus::Registry;
use s3_utils::S3Client;
use social_media_service::config::SERVICE_NAME;
use social_media_service::db::build_stores;
use social_media_service::handlers::AppState;
use social_media_service::metrics::ServiceMetrics;
use social_media_service::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Social Media Service
///
/// Serves the comment-ranked post listing and account deletion endpoints.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.json_logs);

    info!(
        env = %config.app.env,
        version = env!("CARGO_PKG_VERSION"),
        "Starting {}",
        SERVICE_NAME
    );

    let registry = Registry::new();
    let metrics =
        ServiceMetrics::register(&registry).context("Failed to register service metrics")?;
    let pool_metrics =
        PoolMetrics::register(&registry).context("Failed to register pool metrics")?;
    #[cfg(target_os = "linux")]
    registry
        .register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
        .context("Failed to register process metrics")?;

    config.database.log_config();
    let pool = create_pool(config.database.clone(), Some(pool_metrics))
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    let s3 = S3Client::connect(config.s3.clone()).await;
    if let Err(e) = s3.health_check().await {
        // Listing does not need the bucket; erasure fails per request until it is reachable
        warn!(bucket = %config.s3.bucket, error = %e, "S3 bucket not reachable at startup");
    }

    let stores = build_stores(
        pool.clone(),
        config.query_log.enabled,
        config.query_log.slow_threshold(),
        metrics.db_query_duration.clone(),
    );

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        stores,
        Arc::new(s3),
        config.feed,
        metrics,
        registry,
        shutdown.clone(),
    );

    let bind_addr = (config.app.host.clone(), config.app.port);
    info!(host = %bind_addr.0, port = bind_addr.1, "HTTP server listening");

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(TracingLogger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .disable_signals()
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, cancelling in-flight erasures");
        shutdown.cancel();
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;

    pool.close().await;
    info!("{} stopped", SERVICE_NAME);
    Ok(())
}

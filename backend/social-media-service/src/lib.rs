/// Social Media Service Library
///
/// Ranked post listing with cursor pagination and transactional account erasure across
/// PostgreSQL and an S3-compatible image bucket.
///
/// # Modules
///
/// - `pagination`: opaque cursor codec for the `(comment_count, created_at)` ranking
/// - `services`: ranked listing planner, resource collector, transactional eraser
/// - `db`: store traits with plain and instrumented PostgreSQL handles
/// - `storage`: blob store seam over the S3 client
/// - `handlers`: HTTP surface
/// - `models`, `config`, `error`, `metrics`
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};

/// Error types for the social media service
///
/// Every failure the listing and erasure paths can produce maps to exactly one variant,
/// and every variant maps to one HTTP status.
use crate::pagination::CursorError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Pagination token could not be decoded; rejected before any query runs
    #[error("Invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller identity missing or malformed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is not the creator of the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Erasure target does not exist (never existed or already erased)
    #[error("Account {0} not found")]
    AccountNotFound(i64),

    #[error("Database error: {0}")]
    Database(String),

    /// Owned blob keys could not be read inside the erasure transaction
    #[error("Failed to collect owned resources: {0}")]
    ResourceCollection(String),

    /// A blob deletion failed; the relational transaction was rolled back
    #[error("Failed to delete blob '{key}': {reason}")]
    BlobDeletion { key: String, reason: String },

    /// Blobs are gone but the account row survived. Needs operator attention.
    #[error("Commit failed after blob deletion: {0}")]
    CommitFailed(String),

    #[error("Erasure cancelled before commit")]
    ErasureCancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code used in responses and metric labels
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCursor(_) => "invalid_cursor",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::AccountNotFound(_) => "account_not_found",
            AppError::Database(_) => "database_error",
            AppError::ResourceCollection(_) => "resource_collection_failed",
            AppError::BlobDeletion { .. } => "blob_deletion_failed",
            AppError::CommitFailed(_) => "commit_failed",
            AppError::ErasureCancelled => "cancelled",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCursor(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ErasureCancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_)
            | AppError::ResourceCollection(_)
            | AppError::BlobDeletion { .. }
            | AppError::CommitFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

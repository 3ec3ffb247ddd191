/// S3 configuration for the image bucket
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// Region; `auto` for R2-style endpoints
    pub region: String,
    /// Static access key, otherwise the default credential chain is used
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible storage (R2, MinIO)
    pub endpoint: Option<String>,
    /// Use path-style addressing (required by most MinIO deployments)
    pub path_style: bool,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "[REDACTED]"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint", &self.endpoint)
            .field("path_style", &self.path_style)
            .finish()
    }
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "social-media".to_string()),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            access_key_id: non_empty("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty("S3_SECRET_ACCESS_KEY"),
            endpoint: non_empty("S3_ENDPOINT"),
            path_style: std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

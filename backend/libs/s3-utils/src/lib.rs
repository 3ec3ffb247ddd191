/// Shared S3 utilities
///
/// Wraps the AWS S3 client with the configuration used for post images and exposes the
/// operations the services need, with "object absent" reported as an outcome rather than
/// an error.
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::Client;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub mod config;

pub use config::S3Config;

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("S3 request for '{key}' failed: {message}")]
    Request { key: String, message: String },

    #[error("S3 health check failed: {0}")]
    Unhealthy(String),
}

/// Result of deleting a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The store acknowledged the delete
    Deleted,
    /// The store reported that no such object exists
    Absent,
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Build a client from explicit configuration.
    ///
    /// Static credentials are used when both halves are configured, otherwise the
    /// default AWS credential chain applies.
    pub async fn connect(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "social_media_s3",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.path_style)
            .build();

        Self {
            client: Arc::new(Client::from_conf(s3_config)),
            config,
        }
    }

    #[cfg(test)]
    fn from_parts(client: Client, config: S3Config) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Delete one object.
    ///
    /// A 404 or `NoSuchKey` answer is reported as [`DeleteOutcome::Absent`].
    pub async fn delete_object(&self, key: &str) -> Result<DeleteOutcome, S3Error> {
        let result = self
            .client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(key, bucket = %self.config.bucket, "Object deleted from S3");
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                if status == Some(404) || matches!(err.code(), Some("NoSuchKey" | "NotFound")) {
                    debug!(key, bucket = %self.config.bucket, "Object already absent from S3");
                    Ok(DeleteOutcome::Absent)
                } else {
                    Err(S3Error::Request {
                        key: key.to_string(),
                        message: DisplayErrorContext(&err).to_string(),
                    })
                }
            }
        }
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Unhealthy(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// Blob storage seam used by the transactional eraser and post deletion
use async_trait::async_trait;
use s3_utils::{DeleteOutcome, S3Client};
use thiserror::Error;

#[cfg(test)]
pub mod fake;

/// Successful outcome of deleting one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobDeletion {
    Deleted,
    /// Nothing stored under the key; treated as success
    Absent,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct BlobStoreError(pub String);

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn delete(&self, key: &str) -> Result<BlobDeletion, BlobStoreError>;
}

#[async_trait]
impl BlobStore for S3Client {
    async fn delete(&self, key: &str) -> Result<BlobDeletion, BlobStoreError> {
        match self.delete_object(key).await {
            Ok(DeleteOutcome::Deleted) => Ok(BlobDeletion::Deleted),
            Ok(DeleteOutcome::Absent) => Ok(BlobDeletion::Absent),
            Err(e) => Err(BlobStoreError(e.to_string())),
        }
    }
}

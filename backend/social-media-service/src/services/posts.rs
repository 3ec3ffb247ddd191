use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::PostWithComments;
use crate::services::ranked_listing::enrich;
use crate::services::resource_collector::blob_keys_for_image;
use crate::storage::BlobStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Single-post reads and deletion by the post's creator
pub struct PostService {
    store: Arc<dyn PostStore>,
    blobs: Arc<dyn BlobStore>,
    recent_comments: i64,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, blobs: Arc<dyn BlobStore>, recent_comments: i64) -> Self {
        Self {
            store,
            blobs,
            recent_comments,
        }
    }

    /// A live post with its comment count and most recent comments
    pub async fn get_post(&self, post_id: i64) -> Result<PostWithComments> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

        let mut enriched = enrich(self.store.as_ref(), vec![post], self.recent_comments).await?;
        enriched
            .pop()
            .ok_or_else(|| AppError::Internal("enrichment dropped the post".to_string()))
    }

    /// Soft-delete a post, then remove its images.
    ///
    /// Image removal is best effort: the post stays deleted when the bucket refuses, and
    /// the keys are no longer owned by the account, so erasure will not retry them.
    pub async fn soft_delete_post(&self, post_id: i64, requester_id: i64) -> Result<()> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

        if post.creator_id != requester_id {
            return Err(AppError::Forbidden(format!(
                "Post {post_id} belongs to another account"
            )));
        }

        if self.store.soft_delete_post(post_id, requester_id).await? == 0 {
            return Err(AppError::NotFound(format!("Post {post_id} not found")));
        }
        info!(post_id, creator_id = requester_id, "Post soft-deleted");

        for key in blob_keys_for_image(&post.image_path) {
            if let Err(e) = self.blobs.delete(&key).await {
                warn!(post_id, key = %key, error = %e, "Failed to delete image of deleted post");
            }
        }

        Ok(())
    }
}

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::Comment;
use std::sync::Arc;
use tracing::info;

/// Longest comment accepted, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// Comment writes. Every write changes the live comment count the ranking reads.
pub struct CommentService {
    store: Arc<dyn PostStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        creator_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let content = validate_content(content)?;

        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Post {post_id} not found")));
        }

        // The insert re-checks both rows; a post deleted since the lookup also lands here
        let comment = self
            .store
            .create_comment(post_id, creator_id, content)
            .await?
            .ok_or(AppError::AccountNotFound(creator_id))?;

        info!(comment_id = comment.id, post_id, creator_id, "Comment created");
        Ok(comment)
    }

    pub async fn soft_delete_comment(&self, comment_id: i64, requester_id: i64) -> Result<()> {
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

        if comment.creator_id != requester_id {
            return Err(AppError::Forbidden(format!(
                "Comment {comment_id} belongs to another account"
            )));
        }

        if self
            .store
            .soft_delete_comment(comment_id, requester_id)
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!("Comment {comment_id} not found")));
        }

        info!(comment_id, post_id = comment.post_id, "Comment soft-deleted");
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "content must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(content)
}

/// Data models for social-media-service
///
/// - `RankedPost`: a live post joined with its live comment count
/// - `Comment`: a comment used to enrich listed posts
/// - `PostWithComments` / `PostPage`: listing responses
/// - `CreateCommentRequest`: comment body
use crate::pagination::SortKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post row read from `posts_with_comment_count`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RankedPost {
    pub id: i64,
    pub caption: String,
    /// Processed object key in the image bucket
    pub image_path: String,
    pub image_url: String,
    pub creator_id: i64,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Aggregated at read time over live comments
    pub comment_count: i64,
}

impl RankedPost {
    pub fn sort_key(&self) -> SortKey {
        SortKey::new(self.comment_count, self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub creator_id: i64,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post decorated with its most recent comments, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: RankedPost,
    pub recent_comments: Vec<Comment>,
}

/// One page of the ranked listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostWithComments>,
    /// Present only when `has_more` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl PostPage {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankedListingQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

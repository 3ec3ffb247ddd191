//! Ranked post listing.
//!
//! Posts are ordered by `comment_count DESC, created_at DESC` and paged with an opaque
//! cursor holding the sort key of the last post served. Each page asks the store for one
//! row more than it returns so it knows whether another page exists.

use crate::config::FeedConfig;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics::ServiceMetrics;
use crate::models::{PostPage, PostWithComments, RankedPost};
use crate::pagination;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Comment lookups in flight per page
const ENRICH_CONCURRENCY: usize = 8;

pub struct RankedListingPlanner {
    store: Arc<dyn PostStore>,
    feed: FeedConfig,
    metrics: ServiceMetrics,
}

impl RankedListingPlanner {
    pub fn new(store: Arc<dyn PostStore>, feed: FeedConfig, metrics: ServiceMetrics) -> Self {
        Self {
            store,
            feed,
            metrics,
        }
    }

    /// Missing or non-positive limits use the default; large ones are capped.
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(limit) if limit > 0 => limit.min(self.feed.max_limit),
            _ => self.feed.default_limit,
        }
    }

    /// Return the page after `cursor`, or the first page when no cursor is given.
    pub async fn list(&self, cursor: Option<&str>, limit: Option<i64>) -> Result<PostPage> {
        let start = Instant::now();
        let result = self.next_page(cursor, limit).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.code(),
        };
        self.metrics
            .listing_requests
            .with_label_values(&[outcome])
            .inc();
        self.metrics
            .listing_duration
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn next_page(&self, cursor: Option<&str>, limit: Option<i64>) -> Result<PostPage> {
        let boundary = match cursor.filter(|c| !c.is_empty()) {
            Some(token) => Some(pagination::decode(token).map_err(|e| {
                warn!(error = %e, "Rejected pagination cursor");
                AppError::InvalidCursor(e)
            })?),
            None => None,
        };
        let limit = self.clamp_limit(limit);

        let mut rows = self
            .store
            .fetch_ranked(boundary, limit.saturating_add(1))
            .await?;
        let has_more = rows.len() as i64 > limit;
        rows.truncate(limit as usize);

        let cursor = if has_more {
            rows.last().map(|post| pagination::encode(&post.sort_key()))
        } else {
            None
        };

        debug!(
            limit,
            returned = rows.len(),
            has_more,
            resumed = boundary.is_some(),
            "Ranked page fetched"
        );

        let posts = enrich(self.store.as_ref(), rows, self.feed.recent_comments).await?;

        Ok(PostPage {
            posts,
            cursor,
            has_more,
        })
    }
}

/// Attach the `n` most recent comments to each post, keeping the input order.
///
/// Any failed lookup fails the whole call.
pub(crate) async fn enrich(
    store: &dyn PostStore,
    posts: Vec<RankedPost>,
    n: i64,
) -> Result<Vec<PostWithComments>> {
    if n <= 0 {
        return Ok(posts
            .into_iter()
            .map(|post| PostWithComments {
                post,
                recent_comments: Vec::new(),
            })
            .collect());
    }

    futures::stream::iter(posts)
        .map(|post| async move {
            let recent_comments = store.last_comments(post.id, n).await.map_err(|e| {
                warn!(post_id = post.id, error = %e, "Comment enrichment failed");
                AppError::from(e)
            })?;
            Ok::<_, AppError>(PostWithComments {
                post,
                recent_comments,
            })
        })
        .buffered(ENRICH_CONCURRENCY)
        .try_collect()
        .await
}

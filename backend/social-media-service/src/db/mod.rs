/// Database access layer
///
/// The listing and erasure logic only see the narrow traits below. Two concrete handles
/// implement them: [`PgStore`] talks to PostgreSQL directly and [`InstrumentedStore`]
/// wraps any store with statement timing. The variant is chosen once in [`build_stores`].
use crate::models::{Comment, RankedPost};
use crate::pagination::SortKey;
use async_trait::async_trait;
use prometheus::HistogramVec;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
pub mod fake;
pub mod instrumented;
pub mod pg;

pub use instrumented::InstrumentedStore;
pub use pg::PgStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Posts and their comments, as read by the ranked listing and written by users
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Live posts strictly after `boundary` in `comment_count DESC, created_at DESC` order
    async fn fetch_ranked(
        &self,
        boundary: Option<SortKey>,
        fetch: i64,
    ) -> StoreResult<Vec<RankedPost>>;

    /// Up to `n` live comments of a post, newest first
    async fn last_comments(&self, post_id: i64, n: i64) -> StoreResult<Vec<Comment>>;

    async fn find_post(&self, post_id: i64) -> StoreResult<Option<RankedPost>>;

    /// Round-trip used by the readiness probe
    async fn ping(&self) -> StoreResult<()>;

    /// Mark a live post of `creator_id` deleted. Returns affected rows.
    async fn soft_delete_post(&self, post_id: i64, creator_id: i64) -> StoreResult<u64>;

    /// Insert a comment on a live post by a live account; `None` when either is missing
    async fn create_comment(
        &self,
        post_id: i64,
        creator_id: i64,
        content: &str,
    ) -> StoreResult<Option<Comment>>;

    async fn find_comment(&self, comment_id: i64) -> StoreResult<Option<Comment>>;

    /// Mark a live comment of `creator_id` deleted. Returns affected rows.
    async fn soft_delete_comment(&self, comment_id: i64, creator_id: i64) -> StoreResult<u64>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Open the transaction an erasure runs in
    async fn begin_erasure(&self) -> StoreResult<Box<dyn ErasureTx>>;

    /// Mark a live account deleted. Returns affected rows.
    async fn soft_delete_account(&self, account_id: i64) -> StoreResult<u64>;
}

/// Statements that run inside one erasure transaction.
///
/// Dropping the handle without calling [`ErasureTx::commit`] rolls the transaction back.
#[async_trait]
pub trait ErasureTx: Send {
    /// Lock the account row. Soft-deleted accounts are included.
    async fn lock_account(&mut self, account_id: i64) -> StoreResult<bool>;

    /// `image_path` of every live post created by the account
    async fn owned_image_paths(&mut self, account_id: i64) -> StoreResult<Vec<String>>;

    /// Hard delete; posts and comments go with it through `ON DELETE CASCADE`
    async fn delete_account(&mut self, account_id: i64) -> StoreResult<u64>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Store handles shared by the services
#[derive(Clone)]
pub struct Stores {
    pub posts: Arc<dyn PostStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Stores {
    pub fn from_store<S>(store: S) -> Self
    where
        S: PostStore + AccountStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            posts: store.clone(),
            accounts: store,
        }
    }
}

/// Pick the store handle variant once at startup
pub fn build_stores(
    pool: PgPool,
    log_queries: bool,
    slow_query_threshold: Duration,
    query_duration: HistogramVec,
) -> Stores {
    let store = PgStore::new(pool);

    if log_queries {
        tracing::info!(
            slow_query_threshold_ms = slow_query_threshold.as_millis() as u64,
            "Using instrumented database handle"
        );
        Stores::from_store(InstrumentedStore::new(
            store,
            slow_query_threshold,
            query_duration,
        ))
    } else {
        Stores::from_store(store)
    }
}

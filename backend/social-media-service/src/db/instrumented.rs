use super::{AccountStore, ErasureTx, PostStore, StoreResult};
use crate::models::{Comment, RankedPost};
use crate::pagination::SortKey;
use async_trait::async_trait;
use prometheus::HistogramVec;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Times every statement, logs it and records `db_query_duration_seconds{operation}`
#[derive(Clone)]
struct QueryObserver {
    slow_threshold: Duration,
    histogram: HistogramVec,
}

impl QueryObserver {
    async fn observe<T, F>(&self, operation: &'static str, query: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        let start = Instant::now();
        let result = query.await;
        let elapsed = start.elapsed();

        self.histogram
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());

        let elapsed_ms = elapsed.as_millis() as u64;
        match &result {
            Err(e) => warn!(operation, elapsed_ms, error = %e, "Query failed"),
            Ok(_) if elapsed >= self.slow_threshold => warn!(
                operation,
                elapsed_ms,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow query"
            ),
            Ok(_) => debug!(operation, elapsed_ms, "Query executed"),
        }

        result
    }
}

/// Store handle that logs and times every statement of the wrapped store
pub struct InstrumentedStore<S> {
    inner: S,
    observer: QueryObserver,
}

impl<S> InstrumentedStore<S> {
    pub fn new(inner: S, slow_threshold: Duration, histogram: HistogramVec) -> Self {
        Self {
            inner,
            observer: QueryObserver {
                slow_threshold,
                histogram,
            },
        }
    }
}

#[async_trait]
impl<S: PostStore> PostStore for InstrumentedStore<S> {
    async fn fetch_ranked(
        &self,
        boundary: Option<SortKey>,
        fetch: i64,
    ) -> StoreResult<Vec<RankedPost>> {
        self.observer
            .observe("fetch_ranked", self.inner.fetch_ranked(boundary, fetch))
            .await
    }

    async fn last_comments(&self, post_id: i64, n: i64) -> StoreResult<Vec<Comment>> {
        self.observer
            .observe("last_comments", self.inner.last_comments(post_id, n))
            .await
    }

    async fn find_post(&self, post_id: i64) -> StoreResult<Option<RankedPost>> {
        self.observer
            .observe("find_post", self.inner.find_post(post_id))
            .await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.observer.observe("ping", self.inner.ping()).await
    }

    async fn soft_delete_post(&self, post_id: i64, creator_id: i64) -> StoreResult<u64> {
        self.observer
            .observe("soft_delete_post", self.inner.soft_delete_post(post_id, creator_id))
            .await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        creator_id: i64,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        self.observer
            .observe(
                "create_comment",
                self.inner.create_comment(post_id, creator_id, content),
            )
            .await
    }

    async fn find_comment(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        self.observer
            .observe("find_comment", self.inner.find_comment(comment_id))
            .await
    }

    async fn soft_delete_comment(&self, comment_id: i64, creator_id: i64) -> StoreResult<u64> {
        self.observer
            .observe(
                "soft_delete_comment",
                self.inner.soft_delete_comment(comment_id, creator_id),
            )
            .await
    }
}

#[async_trait]
impl<S: AccountStore> AccountStore for InstrumentedStore<S> {
    async fn begin_erasure(&self) -> StoreResult<Box<dyn ErasureTx>> {
        let inner = self
            .observer
            .observe("begin", self.inner.begin_erasure())
            .await?;

        Ok(Box::new(InstrumentedTx {
            inner,
            observer: self.observer.clone(),
        }))
    }

    async fn soft_delete_account(&self, account_id: i64) -> StoreResult<u64> {
        self.observer
            .observe("soft_delete_account", self.inner.soft_delete_account(account_id))
            .await
    }
}

struct InstrumentedTx {
    inner: Box<dyn ErasureTx>,
    observer: QueryObserver,
}

#[async_trait]
impl ErasureTx for InstrumentedTx {
    async fn lock_account(&mut self, account_id: i64) -> StoreResult<bool> {
        self.observer
            .observe("lock_account", self.inner.lock_account(account_id))
            .await
    }

    async fn owned_image_paths(&mut self, account_id: i64) -> StoreResult<Vec<String>> {
        self.observer
            .observe("owned_image_paths", self.inner.owned_image_paths(account_id))
            .await
    }

    async fn delete_account(&mut self, account_id: i64) -> StoreResult<u64> {
        self.observer
            .observe("delete_account", self.inner.delete_account(account_id))
            .await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let Self { inner, observer } = *self;
        observer.observe("commit", inner.commit()).await
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let Self { inner, observer } = *self;
        observer.observe("rollback", inner.rollback()).await
    }
}

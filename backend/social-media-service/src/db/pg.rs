use super::{AccountStore, ErasureTx, PostStore, StoreResult};
use crate::models::{Comment, RankedPost};
use crate::pagination::SortKey;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

/// Plain PostgreSQL handle
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn fetch_ranked(
        &self,
        boundary: Option<SortKey>,
        fetch: i64,
    ) -> StoreResult<Vec<RankedPost>> {
        // Row-value comparison keeps posts that tie on comment_count but are older.
        // id only fixes the order inside a page; the boundary stays (count, created_at).
        let posts = sqlx::query_as::<_, RankedPost>(
            r#"
            SELECT id, caption, image_path, image_url, creator_id, creator_name,
                   created_at, updated_at, comment_count
            FROM posts_with_comment_count
            WHERE $1::BIGINT IS NULL
               OR (comment_count, created_at) < ($1::BIGINT, $2::TIMESTAMPTZ)
            ORDER BY comment_count DESC, created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(boundary.map(|b| b.comment_count))
        .bind(boundary.map(|b| b.created_at))
        .bind(fetch)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn last_comments(&self, post_id: i64, n: i64) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, content, creator_id, creator_name, created_at, updated_at
            FROM comments
            WHERE post_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(post_id)
        .bind(n)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_post(&self, post_id: i64) -> StoreResult<Option<RankedPost>> {
        let post = sqlx::query_as::<_, RankedPost>(
            r#"
            SELECT id, caption, image_path, image_url, creator_id, creator_name,
                   created_at, updated_at, comment_count
            FROM posts_with_comment_count
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
    }

    async fn soft_delete_post(&self, post_id: i64, creator_id: i64) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND creator_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(post_id)
        .bind(creator_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn create_comment(
        &self,
        post_id: i64,
        creator_id: i64,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, post_id, creator_id, creator_name)
            SELECT $3, p.id, a.id, a.name
            FROM posts p, accounts a
            WHERE p.id = $1 AND p.deleted_at IS NULL
              AND a.id = $2 AND a.deleted_at IS NULL
            RETURNING id, post_id, content, creator_id, creator_name, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(creator_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, content, creator_id, creator_name, created_at, updated_at
            FROM comments
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn soft_delete_comment(&self, comment_id: i64, creator_id: i64) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND creator_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .bind(creator_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn begin_erasure(&self) -> StoreResult<Box<dyn ErasureTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgErasureTx { tx }))
    }

    async fn soft_delete_account(&self, account_id: i64) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Erasure transaction on a pooled connection
pub struct PgErasureTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ErasureTx for PgErasureTx {
    async fn lock_account(&mut self, account_id: i64) -> StoreResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(account_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.is_some())
    }

    async fn owned_image_paths(&mut self, account_id: i64) -> StoreResult<Vec<String>> {
        let paths: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT image_path
            FROM posts
            WHERE creator_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(paths.into_iter().map(|(path,)| path).collect())
    }

    async fn delete_account(&mut self, account_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await
    }
}

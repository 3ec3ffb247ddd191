//! In-memory store used by unit tests.
//!
//! Erasure transactions buffer their delete and only apply it on commit, so tests can
//! observe that a rolled-back erasure left every row in place.
//!
//! A seeded post's `comment_count` stands for comments that are not modelled; live comments
//! added through the store are counted on top of it, as the view does.

use super::{AccountStore, ErasureTx, PostStore, StoreResult};
use crate::models::{Comment, RankedPost};
use crate::pagination::SortKey;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    /// account id -> soft deleted
    accounts: BTreeMap<i64, bool>,
    /// post plus its soft-delete flag
    posts: Vec<(RankedPost, bool)>,
    /// comment plus its soft-delete flag
    comments: Vec<(Comment, bool)>,
    last_comment_id: i64,
    failing_comment_posts: Vec<i64>,
    fail_ranked: bool,
    fail_owned_paths: bool,
    fail_commit: bool,
    commits: usize,
    rollbacks: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

pub fn post(id: i64, creator_id: i64, comment_count: i64, created_secs: i64) -> RankedPost {
    let created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
    RankedPost {
        id,
        caption: format!("post {id}"),
        image_path: format!("post_{id}.jpg"),
        image_url: format!("https://cdn.example.com/post_{id}.jpg"),
        creator_id,
        creator_name: format!("user{creator_id}"),
        created_at,
        updated_at: created_at,
        comment_count,
    }
}

pub fn comment(id: i64, post_id: i64, created_secs: i64) -> Comment {
    let created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
    Comment {
        id,
        post_id,
        content: format!("comment {id}"),
        creator_id: 1,
        creator_name: "user1".to_string(),
        created_at,
        updated_at: created_at,
    }
}

fn injected(what: &str) -> sqlx::Error {
    sqlx::Error::Protocol(format!("injected {what} failure"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    pub fn insert_account(&self, id: i64) {
        self.state().accounts.insert(id, false);
    }

    pub fn insert_post(&self, post: RankedPost) {
        self.state().posts.push((post, false));
    }

    pub fn insert_comment(&self, comment: Comment) {
        let mut state = self.state();
        state.last_comment_id = state.last_comment_id.max(comment.id);
        state.comments.push((comment, false));
    }

    pub fn fail_comments_for(&self, post_id: i64) {
        self.state().failing_comment_posts.push(post_id);
    }

    pub fn fail_ranked(&self) {
        self.state().fail_ranked = true;
    }

    pub fn fail_owned_paths(&self) {
        self.state().fail_owned_paths = true;
    }

    pub fn fail_commit(&self) {
        self.state().fail_commit = true;
    }

    pub fn has_account(&self, id: i64) -> bool {
        self.state().accounts.contains_key(&id)
    }

    pub fn is_soft_deleted(&self, id: i64) -> bool {
        self.state().accounts.get(&id).copied().unwrap_or(false)
    }

    pub fn post_ids_of(&self, creator_id: i64) -> Vec<i64> {
        self.state()
            .posts
            .iter()
            .filter(|(p, _)| p.creator_id == creator_id)
            .map(|(p, _)| p.id)
            .collect()
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }

    pub fn is_comment_deleted(&self, id: i64) -> bool {
        self.state()
            .comments
            .iter()
            .any(|(c, deleted)| c.id == id && *deleted)
    }

    fn live_posts(state: &MemoryState) -> impl Iterator<Item = RankedPost> + '_ {
        state.posts.iter().filter(|(_, d)| !d).map(move |(p, _)| {
            let live = state
                .comments
                .iter()
                .filter(|(c, deleted)| c.post_id == p.id && !deleted)
                .count() as i64;
            RankedPost {
                comment_count: p.comment_count + live,
                ..p.clone()
            }
        })
    }

    fn live_account(state: &MemoryState, id: i64) -> bool {
        state.accounts.get(&id) == Some(&false)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn fetch_ranked(
        &self,
        boundary: Option<SortKey>,
        fetch: i64,
    ) -> StoreResult<Vec<RankedPost>> {
        let state = self.state();
        if state.fail_ranked {
            return Err(injected("ranked query"));
        }

        let mut rows: Vec<RankedPost> = Self::live_posts(&state)
            .filter(|p| match boundary {
                Some(b) => (p.comment_count, p.created_at) < (b.comment_count, b.created_at),
                None => true,
            })
            .collect();
        rows.sort_by(|a, b| {
            (b.comment_count, b.created_at, b.id).cmp(&(a.comment_count, a.created_at, a.id))
        });
        rows.truncate(fetch.max(0) as usize);
        Ok(rows)
    }

    async fn last_comments(&self, post_id: i64, n: i64) -> StoreResult<Vec<Comment>> {
        let state = self.state();
        if state.failing_comment_posts.contains(&post_id) {
            return Err(injected("comment lookup"));
        }

        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|(c, deleted)| c.post_id == post_id && !deleted)
            .map(|(c, _)| c.clone())
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        comments.truncate(n.max(0) as usize);
        Ok(comments)
    }

    async fn find_post(&self, post_id: i64) -> StoreResult<Option<RankedPost>> {
        let state = self.state();
        let post = Self::live_posts(&state).find(|p| p.id == post_id);
        Ok(post)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn soft_delete_post(&self, post_id: i64, creator_id: i64) -> StoreResult<u64> {
        let mut state = self.state();
        let mut affected = 0;
        for (post, deleted) in state.posts.iter_mut() {
            if post.id == post_id && post.creator_id == creator_id && !*deleted {
                *deleted = true;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn create_comment(
        &self,
        post_id: i64,
        creator_id: i64,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        let mut state = self.state();
        let post_live = state.posts.iter().any(|(p, d)| p.id == post_id && !d);
        if !post_live || !Self::live_account(&state, creator_id) {
            return Ok(None);
        }

        state.last_comment_id += 1;
        let created_at = Utc::now();
        let comment = Comment {
            id: state.last_comment_id,
            post_id,
            content: content.to_string(),
            creator_id,
            creator_name: format!("user{creator_id}"),
            created_at,
            updated_at: created_at,
        };
        state.comments.push((comment.clone(), false));
        Ok(Some(comment))
    }

    async fn find_comment(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        let state = self.state();
        Ok(state
            .comments
            .iter()
            .find(|(c, deleted)| c.id == comment_id && !deleted)
            .map(|(c, _)| c.clone()))
    }

    async fn soft_delete_comment(&self, comment_id: i64, creator_id: i64) -> StoreResult<u64> {
        let mut state = self.state();
        let mut affected = 0;
        for (comment, deleted) in state.comments.iter_mut() {
            if comment.id == comment_id && comment.creator_id == creator_id && !*deleted {
                *deleted = true;
                affected += 1;
            }
        }
        Ok(affected)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn begin_erasure(&self) -> StoreResult<Box<dyn ErasureTx>> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            pending_delete: None,
        }))
    }

    async fn soft_delete_account(&self, account_id: i64) -> StoreResult<u64> {
        let mut state = self.state();
        match state.accounts.get_mut(&account_id) {
            Some(deleted) if !*deleted => {
                *deleted = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

struct MemoryTx {
    store: MemoryStore,
    pending_delete: Option<i64>,
}

#[async_trait]
impl ErasureTx for MemoryTx {
    async fn lock_account(&mut self, account_id: i64) -> StoreResult<bool> {
        Ok(self.store.has_account(account_id))
    }

    async fn owned_image_paths(&mut self, account_id: i64) -> StoreResult<Vec<String>> {
        let state = self.store.state();
        if state.fail_owned_paths {
            return Err(injected("owned paths"));
        }

        Ok(MemoryStore::live_posts(&state)
            .filter(|p| p.creator_id == account_id)
            .map(|p| p.image_path)
            .collect())
    }

    async fn delete_account(&mut self, account_id: i64) -> StoreResult<u64> {
        if self.store.has_account(account_id) {
            self.pending_delete = Some(account_id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut state = self.store.state();
        if state.fail_commit {
            return Err(injected("commit"));
        }

        state.commits += 1;
        if let Some(id) = self.pending_delete {
            state.accounts.remove(&id);
            state.posts.retain(|(p, _)| p.creator_id != id);
            let remaining: Vec<i64> = state.posts.iter().map(|(p, _)| p.id).collect();
            state
                .comments
                .retain(|(c, _)| c.creator_id != id && remaining.contains(&c.post_id));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.store.state().rollbacks += 1;
        Ok(())
    }
}

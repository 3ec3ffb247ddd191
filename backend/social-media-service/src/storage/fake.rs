//! In-memory blob store for unit tests
use super::{BlobDeletion, BlobStore, BlobStoreError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct BlobState {
    objects: BTreeSet<String>,
    failing: HashSet<String>,
    attempts: Vec<String>,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    state: Arc<Mutex<BlobState>>,
}

impl MemoryBlobStore {
    pub fn with_objects<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let store = Self::default();
        store
            .state
            .lock()
            .unwrap()
            .objects
            .extend(keys.into_iter().map(Into::into));
        store
    }

    pub fn fail_on(&self, key: &str) {
        self.state.lock().unwrap().failing.insert(key.to_string());
    }

    /// Make every delete sleep first so a test can cancel mid-loop
    pub fn slow_down(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().unwrap().objects.contains(key)
    }

    pub fn attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().attempts.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn delete(&self, key: &str) -> Result<BlobDeletion, BlobStoreError> {
        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.attempts.push(key.to_string());
        if state.failing.contains(key) {
            return Err(BlobStoreError(format!("injected failure for {key}")));
        }
        if state.objects.remove(key) {
            Ok(BlobDeletion::Deleted)
        } else {
            Ok(BlobDeletion::Absent)
        }
    }
}

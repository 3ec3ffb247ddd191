//! Blob keys owned by an account.
//!
//! A post stores its processed image key (`post_<nanos>.jpg`). The original upload lives
//! next to it as `post_<nanos>_orig<ext>`; since the original extension is not recorded,
//! every extension the upload path has ever accepted is attempted.

use crate::db::ErasureTx;
use crate::error::{AppError, Result};
use std::collections::HashSet;
use tracing::debug;

const ORIGINAL_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp"];

/// Keys to delete for one account, in post order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedBlobSet {
    /// Live posts the keys were derived from
    pub posts: usize,
    pub keys: Vec<String>,
}

/// Read the owned blob keys through the caller's transaction.
pub async fn list_owned_blob_keys(
    tx: &mut dyn ErasureTx,
    account_id: i64,
) -> Result<OwnedBlobSet> {
    let paths = tx
        .owned_image_paths(account_id)
        .await
        .map_err(|e| AppError::ResourceCollection(e.to_string()))?;

    let capacity = paths.len() * (ORIGINAL_EXTENSIONS.len() + 1);
    let mut seen = HashSet::with_capacity(capacity);
    let mut set = OwnedBlobSet {
        posts: paths.len(),
        keys: Vec::with_capacity(capacity),
    };
    for path in &paths {
        for key in blob_keys_for_image(path) {
            if seen.insert(key.clone()) {
                set.keys.push(key);
            }
        }
    }

    debug!(account_id, posts = set.posts, keys = set.keys.len(), "Collected owned blob keys");
    Ok(set)
}

/// Processed key first, then every original variant
pub fn blob_keys_for_image(path: &str) -> Vec<String> {
    let path = path.trim();
    if path.is_empty() {
        return Vec::new();
    }

    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let stem = match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    };

    let mut keys = Vec::with_capacity(ORIGINAL_EXTENSIONS.len() + 1);
    keys.push(path.to_string());
    for ext in ORIGINAL_EXTENSIONS {
        keys.push(format!("{stem}_orig{ext}"));
    }
    keys
}

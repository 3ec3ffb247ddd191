//! Keyset pagination over the `(comment_count, created_at)` ranking.
pub mod cursor;

pub use cursor::{decode, encode, CursorError, SortKey};

//! Opaque pagination cursor for the comment-count ranking.
//!
//! A cursor carries the sort key `(comment_count, created_at)` of the last post on the
//! previous page and nothing else. The token is 24 bytes rendered as 32 characters of
//! URL-safe base64 without padding:
//!
//! | bytes  | content                                   |
//! |--------|-------------------------------------------|
//! | 0      | format version (`1`)                      |
//! | 1..9   | comment count, i64 big-endian             |
//! | 9..17  | unix seconds, i64 big-endian              |
//! | 17..21 | sub-second nanoseconds, u32 big-endian    |
//! | 21..24 | first 3 bytes of SHA-256 over bytes 0..21 |
//!
//! The fixed length makes any truncation detectable and the checksum rejects tokens that
//! were not minted by [`encode`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

const VERSION: u8 = 1;
const BODY_LEN: usize = 21;
const CHECKSUM_LEN: usize = 3;
const TOKEN_BYTES: usize = BODY_LEN + CHECKSUM_LEN;
const TOKEN_CHARS: usize = TOKEN_BYTES / 3 * 4;

/// Composite sort key of the ranked listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Live comment count; never negative
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl SortKey {
    pub fn new(comment_count: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            comment_count,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor is empty")]
    Empty,

    #[error("cursor has the wrong length")]
    Length,

    #[error("cursor is not valid base64")]
    Encoding,

    #[error("cursor uses an unsupported version")]
    UnsupportedVersion,

    #[error("cursor checksum does not match")]
    Checksum,

    #[error("cursor comment count is negative")]
    NegativeCount,

    #[error("cursor timestamp is out of range")]
    TimestampOutOfRange,
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(body);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Encode a sort key into an opaque, URL-safe token. Deterministic.
pub fn encode(key: &SortKey) -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    bytes[0] = VERSION;
    bytes[1..9].copy_from_slice(&key.comment_count.to_be_bytes());
    bytes[9..17].copy_from_slice(&key.created_at.timestamp().to_be_bytes());
    bytes[17..21].copy_from_slice(&key.created_at.timestamp_subsec_nanos().to_be_bytes());
    let sum = checksum(&bytes[..BODY_LEN]);
    bytes[BODY_LEN..].copy_from_slice(&sum);

    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a token produced by [`encode`].
///
/// Never panics; anything else yields a [`CursorError`].
pub fn decode(token: &str) -> Result<SortKey, CursorError> {
    if token.is_empty() {
        return Err(CursorError::Empty);
    }
    if token.len() != TOKEN_CHARS {
        return Err(CursorError::Length);
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CursorError::Encoding)?;
    let bytes: [u8; TOKEN_BYTES] = bytes.try_into().map_err(|_| CursorError::Length)?;

    if bytes[0] != VERSION {
        return Err(CursorError::UnsupportedVersion);
    }
    if checksum(&bytes[..BODY_LEN]) != bytes[BODY_LEN..] {
        return Err(CursorError::Checksum);
    }

    let comment_count = i64::from_be_bytes(be_array(&bytes[1..9]));
    let secs = i64::from_be_bytes(be_array(&bytes[9..17]));
    let nanos = u32::from_be_bytes(be_array(&bytes[17..21]));

    if comment_count < 0 {
        return Err(CursorError::NegativeCount);
    }
    let created_at =
        DateTime::<Utc>::from_timestamp(secs, nanos).ok_or(CursorError::TimestampOutOfRange)?;

    Ok(SortKey::new(comment_count, created_at))
}

fn be_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

/// Business logic layer
///
/// - `ranked_listing`: comment-count ranked listing with cursor pagination
/// - `posts`: single post reads and post deletion
/// - `comments`: comment creation and deletion
/// - `resource_collector`: blob keys owned by an account
/// - `erasure`: transactional hard erasure of an account
/// - `accounts`: soft deletion
pub mod accounts;
pub mod comments;
pub mod erasure;
pub mod posts;
pub mod ranked_listing;
pub mod resource_collector;

pub use accounts::AccountService;
pub use comments::CommentService;
pub use erasure::{ErasureReport, ErasureState, TransactionalEraser};
pub use posts::PostService;
pub use ranked_listing::RankedListingPlanner;
pub use resource_collector::{blob_keys_for_image, list_owned_blob_keys, OwnedBlobSet};

use crate::db::AccountStore;
use crate::error::{AppError, Result};
use std::sync::Arc;
use tracing::info;

/// Reversible account deletion. Hard erasure lives in [`super::erasure`].
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Mark the account deleted; blobs and posts are left untouched.
    pub async fn soft_delete(&self, account_id: i64) -> Result<()> {
        if self.store.soft_delete_account(account_id).await? == 0 {
            return Err(AppError::AccountNotFound(account_id));
        }

        info!(account_id, "Account soft-deleted");
        Ok(())
    }
}

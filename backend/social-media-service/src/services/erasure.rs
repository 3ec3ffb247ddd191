//! Hard account erasure across PostgreSQL and the image bucket.
//!
//! ```text
//! Started -> CollectedKeys -> BlobsDeleted -> RowsDeleted -> Committed
//!     \__________\_______________\_______________\________-> RolledBack
//! ```
//!
//! Blobs are deleted while the relational transaction is still open and the account row
//! is only removed by the commit that follows. A failure at any step rolls the transaction
//! back, so the account is either fully erased or still present. Blobs deleted before a
//! failed step stay deleted; there is no reconciliation for that window.

use crate::db::{AccountStore, ErasureTx};
use crate::error::{AppError, Result};
use crate::metrics::ServiceMetrics;
use crate::services::resource_collector::list_owned_blob_keys;
use crate::storage::{BlobDeletion, BlobStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErasureState {
    Started,
    CollectedKeys,
    BlobsDeleted,
    RowsDeleted,
    Committed,
    RolledBack,
}

/// Summary of a committed erasure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErasureReport {
    pub account_id: i64,
    /// Live posts whose images were removed
    pub posts: usize,
    pub blobs_deleted: usize,
    /// Keys that were already gone from the bucket
    pub blobs_absent: usize,
    pub state: ErasureState,
}

/// Running state of one erasure
struct Progress {
    report: ErasureReport,
    deleted_keys: Vec<String>,
}

impl Progress {
    fn new(account_id: i64) -> Self {
        Self {
            report: ErasureReport {
                account_id,
                posts: 0,
                blobs_deleted: 0,
                blobs_absent: 0,
                state: ErasureState::Started,
            },
            deleted_keys: Vec::new(),
        }
    }

    fn advance(&mut self, next: ErasureState) {
        debug!(
            account_id = self.report.account_id,
            from = ?self.report.state,
            to = ?next,
            "Erasure state transition"
        );
        self.report.state = next;
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(AppError::ErasureCancelled)
    } else {
        Ok(())
    }
}

/// Coordinates hard erasure of one account at a time per call
pub struct TransactionalEraser {
    accounts: Arc<dyn AccountStore>,
    blobs: Arc<dyn BlobStore>,
    metrics: ServiceMetrics,
}

impl TransactionalEraser {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        blobs: Arc<dyn BlobStore>,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            accounts,
            blobs,
            metrics,
        }
    }

    /// Erase `account_id` and every blob its live posts own.
    ///
    /// Cancelling `cancel` before the commit rolls the transaction back and yields
    /// [`AppError::ErasureCancelled`].
    pub async fn erase(
        &self,
        account_id: i64,
        cancel: &CancellationToken,
    ) -> Result<ErasureReport> {
        let start = Instant::now();
        let result = self.run(account_id, cancel).await;

        let outcome = match &result {
            Ok(_) => "committed",
            Err(e) => e.code(),
        };
        self.metrics.erasures.with_label_values(&[outcome]).inc();
        self.metrics
            .erasure_duration
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(report) => info!(
                account_id,
                posts = report.posts,
                blobs_deleted = report.blobs_deleted,
                blobs_absent = report.blobs_absent,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Account erased"
            ),
            Err(AppError::AccountNotFound(_)) => {
                info!(account_id, "Erasure requested for unknown account")
            }
            Err(e) => error!(account_id, code = e.code(), error = %e, "Account erasure failed"),
        }

        result
    }

    async fn run(&self, account_id: i64, cancel: &CancellationToken) -> Result<ErasureReport> {
        ensure_active(cancel)?;

        let mut tx = self.accounts.begin_erasure().await?;
        let mut progress = Progress::new(account_id);

        if let Err(err) = self.apply(tx.as_mut(), &mut progress, cancel).await {
            progress.advance(ErasureState::RolledBack);
            if let Err(rollback_err) = tx.rollback().await {
                warn!(account_id, error = %rollback_err, "Erasure rollback failed");
            }
            return Err(err);
        }

        if let Err(e) = tx.commit().await {
            error!(
                account_id,
                deleted_keys = ?progress.deleted_keys,
                error = %e,
                "Erasure commit failed after blob deletion; account row survives without its images"
            );
            return Err(AppError::CommitFailed(e.to_string()));
        }

        progress.advance(ErasureState::Committed);
        Ok(progress.report)
    }

    async fn apply(
        &self,
        tx: &mut dyn ErasureTx,
        progress: &mut Progress,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let account_id = progress.report.account_id;

        if !tx.lock_account(account_id).await? {
            return Err(AppError::AccountNotFound(account_id));
        }
        ensure_active(cancel)?;

        let owned = list_owned_blob_keys(tx, account_id).await?;
        progress.report.posts = owned.posts;
        progress.advance(ErasureState::CollectedKeys);

        for key in &owned.keys {
            let deletion = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AppError::ErasureCancelled),
                deletion = self.blobs.delete(key) => deletion,
            };

            match deletion {
                Ok(BlobDeletion::Deleted) => {
                    progress.report.blobs_deleted += 1;
                    progress.deleted_keys.push(key.clone());
                    self.metrics
                        .erasure_blobs
                        .with_label_values(&["deleted"])
                        .inc();
                }
                Ok(BlobDeletion::Absent) => {
                    progress.report.blobs_absent += 1;
                    self.metrics
                        .erasure_blobs
                        .with_label_values(&["absent"])
                        .inc();
                }
                Err(e) => {
                    error!(account_id, key = %key, error = %e, "Blob deletion failed");
                    return Err(AppError::BlobDeletion {
                        key: key.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        progress.advance(ErasureState::BlobsDeleted);
        ensure_active(cancel)?;

        if tx.delete_account(account_id).await? == 0 {
            return Err(AppError::AccountNotFound(account_id));
        }
        progress.advance(ErasureState::RowsDeleted);

        ensure_active(cancel)
    }
}

/// Account handlers - soft delete and hard erasure
use crate::error::Result;
use crate::services::{AccountService, TransactionalEraser};
use actix_web::{web, HttpResponse};
use tokio_util::sync::CancellationToken;

/// DELETE /api/v1/accounts/{id}
pub async fn soft_delete_account(
    service: web::Data<AccountService>,
    account_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service.soft_delete(account_id.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/v1/accounts/{id}/erasure
///
/// Runs under a child of the server shutdown token. A client disconnect drops this
/// future, which rolls the open transaction back.
pub async fn erase_account(
    eraser: web::Data<TransactionalEraser>,
    shutdown: web::Data<CancellationToken>,
    account_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let cancel = shutdown.child_token();
    let report = eraser.erase(account_id.into_inner(), &cancel).await?;

    Ok(HttpResponse::Ok().json(report))
}

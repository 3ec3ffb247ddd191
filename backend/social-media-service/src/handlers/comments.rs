/// Comment handlers - creation and deletion by the comment's author
use crate::error::Result;
use crate::handlers::identity::ActingAccount;
use crate::models::CreateCommentRequest;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};

/// POST /api/v1/posts/{id}/comments
pub async fn create_comment(
    service: web::Data<CommentService>,
    caller: ActingAccount,
    post_id: web::Path<i64>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .create_comment(post_id.into_inner(), caller.0, &payload.content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    service: web::Data<CommentService>,
    caller: ActingAccount,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service
        .soft_delete_comment(comment_id.into_inner(), caller.0)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Post handlers - ranked listing, single post reads and deletion
use crate::error::Result;
use crate::handlers::identity::ActingAccount;
use crate::models::RankedListingQuery;
use crate::services::{PostService, RankedListingPlanner};
use actix_web::{web, HttpResponse};

/// GET /api/v1/posts/ranked?cursor=&limit=
pub async fn list_ranked(
    planner: web::Data<RankedListingPlanner>,
    query: web::Query<RankedListingQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = planner.list(query.cursor.as_deref(), query.limit).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = service.get_post(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    service: web::Data<PostService>,
    caller: ActingAccount,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service
        .soft_delete_post(post_id.into_inner(), caller.0)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

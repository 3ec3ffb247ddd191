/// HTTP handlers for social-media-service
///
/// - Posts: ranked listing, single post reads and deletion
/// - Comments: creation and deletion
/// - Accounts: soft delete and hard erasure
/// - Health: liveness and readiness probes
pub mod accounts;
pub mod comments;
pub mod health;
pub mod identity;
pub mod posts;

use crate::config::FeedConfig;
use crate::db::Stores;
use crate::metrics::{self, ServiceMetrics};
use crate::services::{
    AccountService, CommentService, PostService, RankedListingPlanner, TransactionalEraser,
};
use crate::storage::BlobStore;
use actix_web::web;
use prometheus::Registry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared handler state, built once and cloned into every worker
#[derive(Clone)]
pub struct AppState {
    planner: web::Data<RankedListingPlanner>,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    accounts: web::Data<AccountService>,
    eraser: web::Data<TransactionalEraser>,
    stores: web::Data<Stores>,
    shutdown: web::Data<CancellationToken>,
    registry: web::Data<Registry>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        blobs: Arc<dyn BlobStore>,
        feed: FeedConfig,
        metrics: ServiceMetrics,
        registry: Registry,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            planner: web::Data::new(RankedListingPlanner::new(
                stores.posts.clone(),
                feed,
                metrics.clone(),
            )),
            posts: web::Data::new(PostService::new(
                stores.posts.clone(),
                blobs.clone(),
                feed.recent_comments,
            )),
            comments: web::Data::new(CommentService::new(stores.posts.clone())),
            accounts: web::Data::new(AccountService::new(stores.accounts.clone())),
            eraser: web::Data::new(TransactionalEraser::new(
                stores.accounts.clone(),
                blobs,
                metrics,
            )),
            stores: web::Data::new(stores),
            shutdown: web::Data::new(shutdown),
            registry: web::Data::new(registry),
        }
    }

    /// Register state and routes on an `App`
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.planner.clone())
            .app_data(self.posts.clone())
            .app_data(self.comments.clone())
            .app_data(self.accounts.clone())
            .app_data(self.eraser.clone())
            .app_data(self.stores.clone())
            .app_data(self.shutdown.clone())
            .app_data(self.registry.clone())
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health::health))
                    .route("/health/ready", web::get().to(health::readiness))
                    // Before /posts/{id}: a non-numeric id would otherwise 404 here
                    .route("/posts/ranked", web::get().to(posts::list_ranked))
                    .service(
                        web::resource("/posts/{id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .route(
                        "/posts/{id}/comments",
                        web::post().to(comments::create_comment),
                    )
                    .route(
                        "/comments/{id}",
                        web::delete().to(comments::delete_comment),
                    )
                    .route(
                        "/accounts/{id}",
                        web::delete().to(accounts::soft_delete_account),
                    )
                    .route(
                        "/accounts/{id}/erasure",
                        web::delete().to(accounts::erase_account),
                    ),
            )
            .route("/metrics", web::get().to(metrics::serve_metrics));
    }
}

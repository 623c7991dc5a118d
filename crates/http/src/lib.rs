//! HTTP API server for checkflow.

#![allow(missing_docs, reason = "consumed only by the workspace binary")]
#![allow(missing_debug_implementations, reason = "state types are never printed")]
#![allow(clippy::missing_docs_in_private_items, reason = "handlers are named by route")]
#![allow(clippy::exhaustive_structs, reason = "request/response shapes are the API contract")]
#![allow(clippy::single_call_fn, reason = "one handler per route")]

pub mod api_error;
mod api_types;
mod auth;
mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use checkflow_service::{CatalogService, ChecklistService, ReviewService};
use checkflow_storage::traits::Store;

pub use api_types::{ChecklistCreatedResponse, ReviewDecisionResponse};

/// State handed to every handler: one service per API area, all backed by
/// the same store.
pub struct AppState {
    /// Personal checklist authoring and versioning
    pub checklists: ChecklistService,
    /// Moderation queue and review decisions
    pub reviews: ReviewService,
    /// Platform catalog reads, maintenance, and adoption
    pub catalog: CatalogService,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            checklists: ChecklistService::new(Arc::clone(&store)),
            reviews: ReviewService::new(Arc::clone(&store)),
            catalog: CatalogService::new(store),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/checklists",
            post(handlers::checklists::create).get(handlers::checklists::list),
        )
        .route(
            "/api/checklists/{id}",
            get(handlers::checklists::detail)
                .put(handlers::checklists::create_version)
                .delete(handlers::checklists::delete_version),
        )
        .route("/api/checklists/{id}/content", put(handlers::checklists::update_content))
        .route("/api/checklists/{id}/lineage", delete(handlers::checklists::delete_lineage))
        .route("/api/checklists/{id}/share", post(handlers::checklists::share))
        .route("/api/reviews", get(handlers::reviews::pending).post(handlers::reviews::decide))
        .route("/api/catalog", get(handlers::catalog::list))
        .route(
            "/api/catalog/{id}",
            get(handlers::catalog::detail)
                .put(handlers::catalog::create_version)
                .delete(handlers::catalog::delete_version),
        )
        .route("/api/catalog/{id}/lineage", delete(handlers::catalog::delete_lineage))
        .route("/api/catalog/{id}/adopt", post(handlers::catalog::adopt))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

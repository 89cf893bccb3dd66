//! Router assembly.

pub mod ai;
pub mod auth;
pub mod projects;
pub mod sync;
pub mod wizard;

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the full API router.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ai/analyze-idea", post(ai::analyze_idea))
        .route("/api/ai/generate-hooks", post(ai::generate_hooks))
        .route("/api/ai/analyze-structure", post(ai::analyze_structure))
        .route("/api/ai/generate-captions", post(ai::generate_captions))
        .route("/api/ai/analyze-performance", post(ai::analyze_performance))
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route("/api/projects/current", get(projects::current_project))
        .route("/api/projects/export.jsonl", get(projects::export_jsonl))
        .route("/api/projects/import.jsonl", post(projects::import_jsonl))
        .route("/api/projects/steps/{step}", put(projects::update_step))
        .route("/api/projects/{id}/select", post(projects::select_project))
        .route("/api/projects/{id}", delete(projects::delete_project))
        .route("/api/wizard", get(wizard::get_status))
        .route("/api/wizard/next", post(wizard::next))
        .route("/api/wizard/previous", post(wizard::previous))
        .route("/api/wizard/goto", post(wizard::goto))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/sync/projects", get(sync::list_projects))
        .route(
            "/api/sync/projects/{id}",
            get(sync::get_project).put(sync::put_project).delete(sync::delete_project),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

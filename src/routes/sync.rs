//! Hosted sync routes — owner-scoped document store over Postgres.
//!
//! These endpoints let a signed-in user mirror their local collection to
//! the hosted store and pull it back from another machine. They operate on
//! whole project documents; merging stays client-side.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use crate::model::Project;
use crate::persistence::PersistenceError;
use crate::persistence::remote::RemoteStore;
use crate::routes::auth::AuthUser;
use crate::state::AppState;

pub(crate) fn persistence_error_to_status(err: &PersistenceError) -> StatusCode {
    match err {
        PersistenceError::NotFound(_) => StatusCode::NOT_FOUND,
        PersistenceError::Unavailable(_) | PersistenceError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn remote(state: &AppState, auth: &AuthUser) -> Result<RemoteStore, Response> {
    let pool = state.pool.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "PersistenceUnavailable" })),
        )
            .into_response()
    })?;
    Ok(RemoteStore::new(pool, auth.user.id))
}

/// `GET /api/sync/projects` — all of the owner's hosted projects.
pub async fn list_projects(State(state): State<AppState>, auth: AuthUser) -> Response {
    let store = match remote(&state, &auth) {
        Ok(store) => store,
        Err(response) => return response,
    };
    match store.list_by_owner().await {
        Ok(projects) => Json(projects).into_response(),
        Err(err) => persistence_error_to_status(&err).into_response(),
    }
}

/// `GET /api/sync/projects/{id}` — one hosted project.
pub async fn get_project(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> Response {
    let store = match remote(&state, &auth) {
        Ok(store) => store,
        Err(response) => return response,
    };
    match store.get_by_id(id).await {
        Ok(project) => Json(project).into_response(),
        Err(err) => persistence_error_to_status(&err).into_response(),
    }
}

/// `PUT /api/sync/projects/{id}` — upsert one project document. The path
/// id must match the document's id.
pub async fn put_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(project): Json<Project>,
) -> Response {
    if project.id != id {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "path id does not match document id" })),
        )
            .into_response();
    }
    let store = match remote(&state, &auth) {
        Ok(store) => store,
        Err(response) => return response,
    };
    match store.save_one(&project).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => persistence_error_to_status(&err).into_response(),
    }
}

/// `DELETE /api/sync/projects/{id}` — remove one hosted project.
pub async fn delete_project(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> Response {
    let store = match remote(&state, &auth) {
        Ok(store) => store,
        Err(response) => return response,
    };
    match store.delete_by_id(id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => persistence_error_to_status(&err).into_response(),
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;

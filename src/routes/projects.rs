//! Project collection and step-submission routes.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::model::{Project, now_ms};
use crate::services::steps::{self, CaptionSubmitRequest, HookSubmitRequest, StepError, StepOutcome};
use crate::services::suggest::SuggestError;
use crate::state::AppState;
use crate::store::StoreError;
use crate::wizard::WizardStep;

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn store_error_to_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::EmptyTitle => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::NoCurrentProject => StatusCode::PRECONDITION_FAILED,
        StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn step_error_to_status(err: &StepError) -> StatusCode {
    match err {
        StepError::Invalid(_) => StatusCode::BAD_REQUEST,
        StepError::NoCurrentProject => StatusCode::PRECONDITION_FAILED,
        StepError::Superseded => StatusCode::CONFLICT,
        StepError::Store(inner) => store_error_to_status(inner),
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// =============================================================================
// COLLECTION
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: Project,
    /// Completed steps out of five.
    pub progress: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project_id: Option<Uuid>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProjectBody {
    pub title: Option<String>,
}

/// `GET /api/projects` — collection snapshot with transient flags.
pub async fn list_projects(State(state): State<AppState>) -> Json<ProjectsResponse> {
    let store = state.store.read().await;
    let projects = store
        .projects()
        .iter()
        .map(|p| ProjectListItem { project: p.clone(), progress: p.progress() })
        .collect();
    Json(ProjectsResponse {
        projects,
        current_project_id: store.current_project_id(),
        loading: store.loading(),
        error: store.error().map(str::to_owned),
    })
}

/// `POST /api/projects` — create a project and select it.
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Response {
    let title = body.title.unwrap_or_default();
    let mut store = state.store.write().await;
    match store.create_project(&title).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(err) => error_body(store_error_to_status(&err), &err.to_string()),
    }
}

/// `GET /api/projects/current` — the selected project, 404 when none.
pub async fn current_project(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    match store.current_project() {
        Some(project) => Json(project.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "no project is currently selected"),
    }
}

/// `POST /api/projects/{id}/select` — move the current pointer.
pub async fn select_project(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut store = state.store.write().await;
    match store.select_project(id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => error_body(store_error_to_status(&err), &err.to_string()),
    }
}

/// `DELETE /api/projects/{id}` — remove a project.
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut store = state.store.write().await;
    match store.delete_project(id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => error_body(store_error_to_status(&err), &err.to_string()),
    }
}

// =============================================================================
// STEP SUBMISSION
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub project: Project,
    pub current_step: &'static str,
    pub degraded: bool,
}

fn step_outcome_response(outcome: StepOutcome) -> Response {
    Json(StepResponse {
        project: outcome.project,
        current_step: outcome.current_step.as_str(),
        degraded: outcome.degraded,
    })
    .into_response()
}

fn step_error_response(err: &StepError) -> Response {
    error_body(step_error_to_status(err), &err.to_string())
}

/// `PUT /api/projects/steps/{step}` — run the step controller write path.
///
/// The body shape depends on the step, so it arrives as raw JSON and is
/// deserialized per step. A malformed body maps to the same 400 as a
/// missing field.
pub async fn update_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(step) = WizardStep::from_str(&step) else {
        return error_body(StatusCode::NOT_FOUND, "unknown wizard step");
    };

    let llm = state.llm.as_ref();
    let result = match step {
        WizardStep::Idea => match serde_json::from_value(body) {
            Ok(request) => steps::submit_idea(&state.store, &state.navigator, llm, &request).await,
            Err(_) => Err(StepError::Invalid(SuggestError::MissingFields)),
        },
        WizardStep::Hook => match serde_json::from_value::<HookSubmitRequest>(body) {
            Ok(request) => steps::submit_hook(&state.store, &state.navigator, llm, &request).await,
            Err(_) => Err(StepError::Invalid(SuggestError::MissingFields)),
        },
        WizardStep::Structure => match serde_json::from_value(body) {
            Ok(request) => steps::submit_structure(&state.store, &state.navigator, llm, &request).await,
            Err(_) => Err(StepError::Invalid(SuggestError::MissingFields)),
        },
        WizardStep::Captions => match serde_json::from_value::<CaptionSubmitRequest>(body) {
            Ok(request) => steps::submit_captions(&state.store, &state.navigator, llm, &request).await,
            Err(_) => Err(StepError::Invalid(SuggestError::MissingFields)),
        },
        WizardStep::Performance => match serde_json::from_value(body) {
            Ok(request) => steps::submit_performance(&state.store, &state.navigator, llm, &request).await,
            Err(_) => Err(StepError::Invalid(SuggestError::MissingFields)),
        },
    };

    match result {
        Ok(outcome) => step_outcome_response(outcome),
        Err(err) => step_error_response(&err),
    }
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

#[derive(Serialize)]
struct ExportMetaLine<'a> {
    #[serde(rename = "type")]
    line_type: &'a str,
    version: u32,
    exported_at_ms: i64,
    project_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_project_id: Option<Uuid>,
}

#[derive(Serialize)]
struct ExportProjectLine<'a> {
    #[serde(rename = "type")]
    line_type: &'a str,
    project: &'a Project,
}

#[derive(Deserialize)]
pub struct ImportJsonlBody {
    pub jsonl: String,
}

#[derive(Serialize)]
pub struct ImportJsonlResponse {
    pub imported: usize,
    pub skipped: usize,
}

/// `GET /api/projects/export.jsonl` — NDJSON snapshot of the collection.
pub async fn export_jsonl(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let (projects, current_id) = {
        let store = state.store.read().await;
        (store.projects().to_vec(), store.current_project_id())
    };

    let mut lines = Vec::with_capacity(projects.len() + 1);
    let meta = ExportMetaLine {
        line_type: "project_export_meta",
        version: 1,
        exported_at_ms: now_ms(),
        project_count: projects.len(),
        current_project_id: current_id,
    };
    let meta_line = serde_json::to_string(&meta).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    lines.push(format!("{meta_line}\n"));

    for project in &projects {
        let line = ExportProjectLine { line_type: "project", project };
        let serialized = serde_json::to_string(&line).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        lines.push(format!("{serialized}\n"));
    }

    let stream = futures::stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<axum::body::Bytes, std::convert::Infallible>(axum::body::Bytes::from(line))),
    );
    let body = axum::body::Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "application/x-ndjson; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"projects.jsonl\""),
        ],
        body,
    )
        .into_response())
}

pub(crate) fn parse_import_project_line(line: &str) -> Option<Project> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    match value.get("type").and_then(|t| t.as_str()) {
        Some("project") => serde_json::from_value(value.get("project")?.clone()).ok(),
        // Meta lines and unknown types are skipped, not errors.
        _ => None,
    }
}

/// `POST /api/projects/import.jsonl` — merge projects into the collection.
///
/// Existing projects with the same id are replaced; unknown lines are
/// counted as skipped. The current pointer is untouched.
pub async fn import_jsonl(
    State(state): State<AppState>,
    Json(body): Json<ImportJsonlBody>,
) -> Result<Json<ImportJsonlResponse>, StatusCode> {
    let mut projects = Vec::new();
    let mut skipped = 0_usize;

    for raw_line in body.jsonl.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_import_project_line(line) {
            Some(project) => projects.push(project),
            None => skipped = skipped.saturating_add(1),
        }
    }

    let imported = projects.len();
    if imported > 0 {
        let mut store = state.store.write().await;
        store
            .import_projects(projects)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    Ok(Json(ImportJsonlResponse { imported, skipped }))
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;

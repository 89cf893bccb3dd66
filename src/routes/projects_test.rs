use axum::body::to_bytes;
use serde_json::Value;

use super::*;
use crate::persistence::PersistenceError;
use crate::state::test_helpers::{seed_project, test_app_state};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[test]
fn store_error_to_status_maps_all_variants() {
    assert_eq!(store_error_to_status(&StoreError::EmptyTitle), StatusCode::BAD_REQUEST);
    assert_eq!(store_error_to_status(&StoreError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    assert_eq!(
        store_error_to_status(&StoreError::NoCurrentProject),
        StatusCode::PRECONDITION_FAILED
    );
    assert_eq!(
        store_error_to_status(&StoreError::Persistence(PersistenceError::Unavailable("down".into()))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn step_error_to_status_maps_all_variants() {
    assert_eq!(
        step_error_to_status(&StepError::Invalid(SuggestError::MissingFields)),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(step_error_to_status(&StepError::NoCurrentProject), StatusCode::PRECONDITION_FAILED);
    assert_eq!(step_error_to_status(&StepError::Superseded), StatusCode::CONFLICT);
    assert_eq!(
        step_error_to_status(&StepError::Store(StoreError::NotFound(Uuid::nil()))),
        StatusCode::NOT_FOUND
    );
}

// =============================================================================
// COLLECTION HANDLERS
// =============================================================================

#[tokio::test]
async fn create_project_returns_201_and_selects_it() {
    let state = test_app_state();
    let body = CreateProjectBody { title: Some("My launch video".into()) };

    let response = create_project(State(state.clone()), Json(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["title"], "My launch video");

    let store = state.store.read().await;
    assert_eq!(store.current_project().unwrap().title, "My launch video");
}

#[tokio::test]
async fn create_project_with_blank_title_is_400() {
    let state = test_app_state();
    let response = create_project(State(state), Json(CreateProjectBody { title: Some("   ".into()) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_projects_reports_progress_and_pointer() {
    let state = test_app_state();
    let id = seed_project(&state, "One").await;
    seed_project(&state, "Two").await;

    let Json(list) = list_projects(State(state.clone())).await;
    assert_eq!(list.projects.len(), 2);
    assert_eq!(list.projects[0].progress, 0);
    assert!(!list.loading);

    select_project(State(state.clone()), Path(id)).await;
    let Json(list) = list_projects(State(state)).await;
    assert_eq!(list.current_project_id, Some(id));
}

#[tokio::test]
async fn current_project_is_404_when_none_selected() {
    let state = test_app_state();
    let response = current_project(State(state)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn select_unknown_project_is_404() {
    let state = test_app_state();
    let response = select_project(State(state), Path(Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_project_removes_it() {
    let state = test_app_state();
    let id = seed_project(&state, "Doomed").await;

    let response = delete_project(State(state.clone()), Path(id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.store.read().await.projects().is_empty());
}

// =============================================================================
// STEP SUBMISSION
// =============================================================================

#[tokio::test]
async fn update_step_runs_the_idea_controller() {
    let state = test_app_state();
    seed_project(&state, "Demo").await;
    let body = serde_json::json!({
        "contentIdea": "5 desk stretches",
        "targetAudience": "office workers",
        "contentGoal": "education"
    });

    let response = update_step(State(state.clone()), Path("idea".into()), Json(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["currentStep"], "hook");
    assert_eq!(json["degraded"], true);
    assert!(json["project"]["contentIdea"]["analysis"].is_object());
}

#[tokio::test]
async fn update_step_with_unknown_step_is_404() {
    let state = test_app_state();
    let response = update_step(State(state), Path("garnish".into()), Json(serde_json::json!({}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_step_without_a_project_is_412() {
    let state = test_app_state();
    let body = serde_json::json!({
        "contentIdea": "x", "targetAudience": "y", "contentGoal": "z"
    });
    let response = update_step(State(state), Path("idea".into()), Json(body)).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

#[test]
fn parse_import_skips_meta_and_unknown_lines() {
    let meta = r#"{"type":"project_export_meta","version":1,"exported_at_ms":0,"project_count":0}"#;
    assert!(parse_import_project_line(meta).is_none());
    assert!(parse_import_project_line(r#"{"type":"mystery"}"#).is_none());
    assert!(parse_import_project_line("not json").is_none());
}

#[test]
fn parse_import_reads_a_project_line() {
    let project = Project::new("Imported");
    let line = serde_json::to_string(&serde_json::json!({ "type": "project", "project": project })).unwrap();
    let parsed = parse_import_project_line(&line).unwrap();
    assert_eq!(parsed.id, project.id);
    assert_eq!(parsed.title, "Imported");
}

#[tokio::test]
async fn export_then_import_round_trips_the_collection() {
    let source = test_app_state();
    seed_project(&source, "Alpha").await;
    seed_project(&source, "Beta").await;

    let response = export_jsonl(State(source)).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let jsonl = String::from_utf8(bytes.to_vec()).unwrap();

    let target = test_app_state();
    let Json(result) = import_jsonl(State(target.clone()), Json(ImportJsonlBody { jsonl }))
        .await
        .unwrap();
    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 1); // the meta line
    assert_eq!(target.store.read().await.projects().len(), 2);
}

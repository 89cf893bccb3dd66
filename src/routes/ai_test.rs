use axum::body::to_bytes;
use serde_json::Value;

use super::*;
use crate::state::test_helpers::{test_app_state, test_app_state_with_llm};
use crate::state::test_helpers::FixedLlm;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn suggest_error_response_is_400_with_message() {
    let response = suggest_error_response(&SuggestError::MissingFields);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = suggest_error_response(&SuggestError::MissingMetric("watchTime"));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_metric_error_names_the_field() {
    let response = suggest_error_response(&SuggestError::MissingMetric("watchTime"));
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required metric: watchTime");
}

#[tokio::test]
async fn analyze_idea_rejects_missing_fields_with_400() {
    let state = test_app_state();
    let body = IdeaRequest { content_idea: Some("idea".into()), ..IdeaRequest::default() };

    let response = analyze_idea(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn analyze_idea_marks_model_replies_as_not_degraded() {
    let llm = FixedLlm::arc(r#"{"score": 8, "strengths": [], "weaknesses": [], "improvements": [], "analysis": "ok"}"#);
    let state = test_app_state_with_llm(llm);
    let body = IdeaRequest {
        content_idea: Some("desk stretches".into()),
        target_audience: Some("office workers".into()),
        content_goal: Some("education".into()),
    };

    let response = analyze_idea(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["score"], 8);
    assert_eq!(json["degraded"], false);
}

#[tokio::test]
async fn analyze_idea_marks_canned_replies_as_degraded() {
    let state = test_app_state();
    let body = IdeaRequest {
        content_idea: Some("desk stretches".into()),
        target_audience: Some("office workers".into()),
        content_goal: Some("education".into()),
    };

    let response = analyze_idea(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["degraded"], true);
    assert!(json["score"].is_number());
}

#[tokio::test]
async fn generate_hooks_returns_hook_list() {
    let state = test_app_state();
    let body = HookRequest {
        content_idea: Some("desk stretches".into()),
        hook_type: Some("question".into()),
        target_audience: Some("office workers".into()),
    };

    let response = generate_hooks(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["hooks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn analyze_performance_missing_metric_is_400() {
    let state = test_app_state();
    let body: PerformanceRequest = serde_json::from_value(serde_json::json!({
        "metrics": {
            "views": 1000, "likes": 50, "comments": 5, "shares": 2,
            "saves": 10, "followersGained": 3, "profileVisits": 8
        },
        "contentCategory": "fitness",
        "platform": "TikTok",
        "timeFrame": "24 hours"
    }))
    .unwrap();

    let response = analyze_performance(State(state), Json(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required metric: watchTime");
}

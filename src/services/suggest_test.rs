use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::llm::types::{ChatResponse, LlmError};

// =============================================================================
// TEST HELPERS
// =============================================================================

struct MockLlm {
    reply: Result<String, ()>,
}

impl MockLlm {
    fn replying(text: &str) -> Arc<dyn LlmChat> {
        Arc::new(Self { reply: Ok(text.to_owned()) })
    }

    fn failing() -> Arc<dyn LlmChat> {
        Arc::new(Self { reply: Err(()) })
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, _max_tokens: u32, _system: &str, _messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.reply {
            Ok(text) => Ok(ChatResponse {
                text: text.clone(),
                model: "mock".into(),
                stop_reason: "end_turn".into(),
                input_tokens: 1,
                output_tokens: 1,
            }),
            Err(()) => Err(LlmError::ApiRequest("mock failure".into())),
        }
    }
}

fn idea_input() -> IdeaInput {
    IdeaRequest {
        content_idea: Some("5 desk stretches".into()),
        target_audience: Some("office workers".into()),
        content_goal: Some("education".into()),
    }
    .validate()
    .unwrap()
}

fn performance_request() -> PerformanceRequest {
    PerformanceRequest {
        metrics: Some(MetricsRequest {
            views: Some(10_000),
            likes: Some(500),
            comments: Some(60),
            shares: Some(40),
            saves: Some(250),
            watch_time: Some(72.0),
            followers_gained: Some(30),
            profile_visits: Some(120),
        }),
        content_category: Some("education".into()),
        platform: Some("TikTok".into()),
        time_frame: Some("48 hours".into()),
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn idea_request_rejects_missing_and_blank_fields() {
    let missing = IdeaRequest { content_idea: None, ..IdeaRequest::default() };
    assert_eq!(missing.validate().unwrap_err(), SuggestError::MissingFields);

    let blank = IdeaRequest {
        content_idea: Some("   ".into()),
        target_audience: Some("devs".into()),
        content_goal: Some("growth".into()),
    };
    assert_eq!(blank.validate().unwrap_err(), SuggestError::MissingFields);
}

#[test]
fn idea_request_trims_fields() {
    let req = IdeaRequest {
        content_idea: Some("  my idea  ".into()),
        target_audience: Some("devs".into()),
        content_goal: Some("growth".into()),
    };
    assert_eq!(req.validate().unwrap().content_idea, "my idea");
}

#[test]
fn caption_request_requires_key_points() {
    let base = CaptionRequest {
        content_summary: Some("summary".into()),
        key_points: Some(vec![]),
        caption_style: Some("casual".into()),
        cta_type: Some("follow".into()),
        content_niche: Some("fitness".into()),
    };
    assert_eq!(base.validate().unwrap_err(), SuggestError::MissingFields);

    let whitespace_only = CaptionRequest { key_points: Some(vec!["  ".into()]), ..base };
    assert_eq!(whitespace_only.validate().unwrap_err(), SuggestError::MissingFields);
}

#[test]
fn performance_request_names_the_missing_metric() {
    let mut req = performance_request();
    req.metrics.as_mut().unwrap().watch_time = None;
    assert_eq!(req.validate().unwrap_err(), SuggestError::MissingMetric("watchTime"));

    let no_metrics = PerformanceRequest { metrics: None, ..performance_request() };
    assert_eq!(no_metrics.validate().unwrap_err(), SuggestError::MissingFields);
}

// =============================================================================
// JSON EXTRACTION
// =============================================================================

#[test]
fn extract_json_object_handles_code_fences_and_prose() {
    let fenced = "```json\n{\"score\": 8}\n```";
    assert_eq!(extract_json_object(fenced).unwrap(), json!({"score": 8}));

    let prose = "Here is my analysis:\n{\"score\": 7}\nHope that helps!";
    assert_eq!(extract_json_object(prose).unwrap(), json!({"score": 7}));
}

#[test]
fn extract_json_object_rejects_non_objects() {
    assert!(extract_json_object("no json here").is_none());
    assert!(extract_json_object("[1, 2, 3]").is_none());
    assert!(extract_json_object("{not valid json}").is_none());
}

// =============================================================================
// SUGGESTION OUTCOMES
// =============================================================================

#[tokio::test]
async fn analyze_idea_passes_model_json_through() {
    let llm = MockLlm::replying(r#"{"score": 8, "strengths": ["clear"], "weaknesses": [], "improvements": [], "analysis": "solid"}"#);
    let outcome = analyze_idea(Some(&llm), &idea_input()).await;
    assert!(!outcome.degraded);
    assert_eq!(outcome.payload["score"], 8);
    assert_eq!(outcome.payload["analysis"], "solid");
}

#[tokio::test]
async fn analyze_idea_degrades_without_a_client() {
    let outcome = analyze_idea(None, &idea_input()).await;
    assert!(outcome.degraded);
    let score = outcome.payload["score"].as_i64().unwrap();
    assert!((6..=9).contains(&score));
    assert!(outcome.payload["strengths"].as_array().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn analyze_idea_degrades_on_transport_failure() {
    let llm = MockLlm::failing();
    let outcome = analyze_idea(Some(&llm), &idea_input()).await;
    assert!(outcome.degraded);
}

#[tokio::test]
async fn analyze_idea_degrades_on_unparseable_reply() {
    let llm = MockLlm::replying("I am sorry, I cannot produce JSON today.");
    let outcome = analyze_idea(Some(&llm), &idea_input()).await;
    assert!(outcome.degraded);
}

#[tokio::test]
async fn generate_hooks_fallback_has_three_ranked_hooks() {
    let input = HookRequest {
        content_idea: Some("desk stretches".into()),
        hook_type: Some("question".into()),
        target_audience: Some("office workers".into()),
    }
    .validate()
    .unwrap();
    let outcome = generate_hooks(None, &input).await;
    assert!(outcome.degraded);
    let hooks = outcome.payload["hooks"].as_array().unwrap();
    assert_eq!(hooks.len(), 3);
    assert_eq!(hooks[0]["effectiveness"], 9);
}

#[tokio::test]
async fn generate_captions_fallback_interpolates_the_niche() {
    let input = CaptionRequest {
        content_summary: Some("Morning routine for focus".into()),
        key_points: Some(vec!["wake early".into(), "no phone".into()]),
        caption_style: Some("casual".into()),
        cta_type: Some("follow".into()),
        content_niche: Some("productivity".into()),
    }
    .validate()
    .unwrap();
    let outcome = generate_captions(None, &input).await;
    assert!(outcome.degraded);
    let high_reach = outcome.payload["hashtags"]["highReach"].as_array().unwrap();
    assert_eq!(high_reach[0], "#productivity");
    let first_caption = outcome.payload["captions"][0]["text"].as_str().unwrap();
    assert!(first_caption.contains("Morning routine for focus"));
    assert!(first_caption.contains("Follow for more tips!"));
}

#[tokio::test]
async fn analyze_performance_fallback_computes_rates() {
    let input = performance_request().validate().unwrap();
    let outcome = analyze_performance(None, &input).await;
    assert!(outcome.degraded);
    // (500 + 60 + 40) / 10000 * 100 = 6.0
    assert_eq!(outcome.payload["metrics"]["engagementRate"]["value"], 6.0);
    assert_eq!(outcome.payload["rating"], "Above Expected");
    assert_eq!(outcome.payload["metrics"]["watchTime"]["comparison"], "Above average");
}

#[test]
fn comparison_thresholds() {
    assert_eq!(comparison(8.0, 5.0), "Significantly above average");
    assert_eq!(comparison(5.5, 5.0), "Above average");
    assert_eq!(comparison(4.2, 5.0), "Average");
    assert_eq!(comparison(2.0, 5.0), "Below average");
}

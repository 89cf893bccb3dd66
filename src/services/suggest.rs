//! AI-suggestion service — per-step prompts, response parsing, fallbacks.
//!
//! DESIGN
//! ======
//! One request contract per wizard step: validate required fields, send the
//! templated prompt in a single round trip, and hand back the model's JSON
//! verbatim as an opaque payload. There is no streaming, no retry, no
//! cancellation.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures are returned to the caller before any network call.
//! Transport and parse failures never propagate: the service logs them and
//! serves a canned response instead, marked `degraded: true` so callers and
//! tests can always tell fallback data from a real model reply. The same
//! path serves requests when no LLM is configured at all.

use std::sync::Arc;

use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::llm::LlmChat;
use crate::llm::types::Message;
use crate::model::PerformanceMetrics;

const DEFAULT_SUGGEST_MAX_TOKENS: u32 = 4096;

fn suggest_max_tokens() -> u32 {
    std::env::var("SUGGEST_MAX_TOKENS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SUGGEST_MAX_TOKENS)
}

// =============================================================================
// ERROR
// =============================================================================

/// Validation failures caught before any network call.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SuggestError {
    /// One or more required request fields are absent or empty.
    #[error("Missing required fields")]
    MissingFields,

    /// A required performance metric is absent, named for the caller.
    #[error("Missing required metric: {0}")]
    MissingMetric(&'static str),
}

/// A suggestion payload plus whether it came from the canned fallback.
#[derive(Debug)]
pub struct SuggestOutcome {
    /// Opaque JSON object in the step's documented response shape.
    pub payload: Value,
    /// `true` when the LLM was unavailable or returned garbage and the
    /// canned response was substituted.
    pub degraded: bool,
}

fn required(field: Option<&str>) -> Result<String, SuggestError> {
    let trimmed = field.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(SuggestError::MissingFields);
    }
    Ok(trimmed.to_owned())
}

// =============================================================================
// REQUEST CONTRACTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRequest {
    pub content_idea: Option<String>,
    pub target_audience: Option<String>,
    pub content_goal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdeaInput {
    pub content_idea: String,
    pub target_audience: String,
    pub content_goal: String,
}

impl IdeaRequest {
    /// # Errors
    ///
    /// `SuggestError::MissingFields` when any field is absent or empty.
    pub fn validate(&self) -> Result<IdeaInput, SuggestError> {
        Ok(IdeaInput {
            content_idea: required(self.content_idea.as_deref())?,
            target_audience: required(self.target_audience.as_deref())?,
            content_goal: required(self.content_goal.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookRequest {
    pub content_idea: Option<String>,
    pub hook_type: Option<String>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HookInput {
    pub content_idea: String,
    pub hook_type: String,
    pub target_audience: String,
}

impl HookRequest {
    /// # Errors
    ///
    /// `SuggestError::MissingFields` when any field is absent or empty.
    pub fn validate(&self) -> Result<HookInput, SuggestError> {
        Ok(HookInput {
            content_idea: required(self.content_idea.as_deref())?,
            hook_type: required(self.hook_type.as_deref())?,
            target_audience: required(self.target_audience.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRequest {
    pub hook: Option<String>,
    pub middle: Option<String>,
    pub ending: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StructureInput {
    pub hook: String,
    pub middle: String,
    pub ending: String,
    pub content_type: String,
}

impl StructureRequest {
    /// # Errors
    ///
    /// `SuggestError::MissingFields` when any field is absent or empty.
    pub fn validate(&self) -> Result<StructureInput, SuggestError> {
        Ok(StructureInput {
            hook: required(self.hook.as_deref())?,
            middle: required(self.middle.as_deref())?,
            ending: required(self.ending.as_deref())?,
            content_type: required(self.content_type.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    pub content_summary: Option<String>,
    pub key_points: Option<Vec<String>>,
    pub caption_style: Option<String>,
    pub cta_type: Option<String>,
    pub content_niche: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaptionInput {
    pub content_summary: String,
    pub key_points: Vec<String>,
    pub caption_style: String,
    pub cta_type: String,
    pub content_niche: String,
}

impl CaptionRequest {
    /// # Errors
    ///
    /// `SuggestError::MissingFields` when any field is absent or empty,
    /// including an empty `keyPoints` list.
    pub fn validate(&self) -> Result<CaptionInput, SuggestError> {
        let key_points = self
            .key_points
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>();
        if key_points.is_empty() {
            return Err(SuggestError::MissingFields);
        }
        Ok(CaptionInput {
            content_summary: required(self.content_summary.as_deref())?,
            key_points,
            caption_style: required(self.caption_style.as_deref())?,
            cta_type: required(self.cta_type.as_deref())?,
            content_niche: required(self.content_niche.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
    pub saves: Option<u64>,
    pub watch_time: Option<f64>,
    pub followers_gained: Option<u64>,
    pub profile_visits: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRequest {
    pub metrics: Option<MetricsRequest>,
    pub content_category: Option<String>,
    pub platform: Option<String>,
    pub time_frame: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PerformanceInput {
    pub metrics: PerformanceMetrics,
    pub content_category: String,
    pub platform: String,
    pub time_frame: String,
}

impl PerformanceRequest {
    /// # Errors
    ///
    /// `SuggestError::MissingMetric` naming the first absent metric field;
    /// `SuggestError::MissingFields` for absent context fields.
    pub fn validate(&self) -> Result<PerformanceInput, SuggestError> {
        let metrics = self.metrics.as_ref().ok_or(SuggestError::MissingFields)?;
        let metrics = PerformanceMetrics {
            views: metrics.views.ok_or(SuggestError::MissingMetric("views"))?,
            likes: metrics.likes.ok_or(SuggestError::MissingMetric("likes"))?,
            comments: metrics.comments.ok_or(SuggestError::MissingMetric("comments"))?,
            shares: metrics.shares.ok_or(SuggestError::MissingMetric("shares"))?,
            saves: metrics.saves.ok_or(SuggestError::MissingMetric("saves"))?,
            watch_time: metrics.watch_time.ok_or(SuggestError::MissingMetric("watchTime"))?,
            followers_gained: metrics
                .followers_gained
                .ok_or(SuggestError::MissingMetric("followersGained"))?,
            profile_visits: metrics
                .profile_visits
                .ok_or(SuggestError::MissingMetric("profileVisits"))?,
        };
        Ok(PerformanceInput {
            metrics,
            content_category: required(self.content_category.as_deref())?,
            platform: required(self.platform.as_deref())?,
            time_frame: required(self.time_frame.as_deref())?,
        })
    }
}

// =============================================================================
// SUGGESTION CALLS
// =============================================================================

/// Analyze a content idea for viral potential.
pub async fn analyze_idea(llm: Option<&Arc<dyn LlmChat>>, input: &IdeaInput) -> SuggestOutcome {
    let system = "You are an expert viral content strategist who specializes in short-form video content \
                  for platforms like TikTok, Instagram Reels, and YouTube Shorts. You understand algorithm \
                  patterns, viewer psychology, and what makes content go viral.";
    let prompt = format!(
        "As a viral content strategist, analyze this short-form video idea:\n\n\
         Content Idea: {}\nTarget Audience: {}\nContent Goal: {}\n\n\
         Provide a detailed analysis including:\n\
         1. Viral potential score (1-10)\n\
         2. Strengths of this idea\n\
         3. Weaknesses or challenges\n\
         4. Specific improvement suggestions\n\
         5. Why each suggestion would improve viral potential\n\n\
         Format your response as JSON with the following structure:\n\
         {{\"score\": number, \"strengths\": string[], \"weaknesses\": string[], \
         \"improvements\": {{\"suggestion\": string, \"reasoning\": string}}[], \"analysis\": string}}",
        input.content_idea, input.target_audience, input.content_goal
    );

    match request_json(llm, system, prompt).await {
        Some(payload) => SuggestOutcome { payload, degraded: false },
        None => SuggestOutcome { payload: fallback_idea(), degraded: true },
    }
}

/// Generate three hooks for a content idea.
pub async fn generate_hooks(llm: Option<&Arc<dyn LlmChat>>, input: &HookInput) -> SuggestOutcome {
    let system = "You are an expert viral content strategist who specializes in creating powerful hooks \
                  for short-form videos. You understand what grabs attention in the first few seconds \
                  and how to prevent viewers from scrolling past.";
    let prompt = format!(
        "Generate 3 powerful hooks for a short-form video with this idea:\n\n\
         Content Idea: {}\nHook Type: {}\nTarget Audience: {}\n\n\
         For each hook, explain why it would be effective for this audience and content type.\n\n\
         Format your response as JSON with the following structure:\n\
         {{\"hooks\": [{{\"hook\": string, \"explanation\": string, \"effectiveness\": number}}]}}",
        input.content_idea, input.hook_type, input.target_audience
    );

    match request_json(llm, system, prompt).await {
        Some(payload) => SuggestOutcome { payload, degraded: false },
        None => SuggestOutcome { payload: fallback_hooks(), degraded: true },
    }
}

/// Analyze a hook/middle/ending video structure.
pub async fn analyze_structure(llm: Option<&Arc<dyn LlmChat>>, input: &StructureInput) -> SuggestOutcome {
    let system = "You are an expert viral content strategist who specializes in optimizing content \
                  structure for short-form videos. You understand pacing, transitions, and how to \
                  maintain viewer attention throughout a video.";
    let prompt = format!(
        "Analyze this short-form video structure:\n\n\
         Hook: {}\nMiddle/Value: {}\nEnding/CTA: {}\nContent Type: {}\n\n\
         Provide feedback on:\n\
         1. Structure effectiveness score (1-10)\n\
         2. Pacing suggestions\n\
         3. Transition improvements\n\
         4. Specific strengths of this structure\n\
         5. Areas for improvement\n\n\
         Format your response as JSON with the following structure:\n\
         {{\"score\": number, \"pacing\": string, \"transitions\": string, \
         \"strengths\": string[], \"improvements\": string[], \"analysis\": string}}",
        input.hook, input.middle, input.ending, input.content_type
    );

    match request_json(llm, system, prompt).await {
        Some(payload) => SuggestOutcome { payload, degraded: false },
        None => SuggestOutcome { payload: fallback_structure(), degraded: true },
    }
}

/// Generate captions and strategic hashtags.
pub async fn generate_captions(llm: Option<&Arc<dyn LlmChat>>, input: &CaptionInput) -> SuggestOutcome {
    let system = "You are an expert viral content strategist who specializes in creating engaging \
                  captions and strategic hashtags for short-form videos. You understand platform \
                  algorithms and how to maximize reach and engagement.";
    let prompt = format!(
        "Generate 3 engaging captions and strategic hashtags for this content:\n\n\
         Content Summary: {}\nKey Points: {}\nCaption Style: {}\nCall-to-Action Type: {}\nContent Niche: {}\n\n\
         For each caption, explain why it would be effective. Also provide hashtags in these categories:\n\
         - High-reach hashtags (1M+ posts)\n\
         - Niche-targeted hashtags (100K-1M posts)\n\
         - Trending hashtags\n\
         - Low-competition hashtags (under 100K posts)\n\n\
         Format your response as JSON with the following structure:\n\
         {{\"captions\": [{{\"text\": string, \"explanation\": string}}], \
         \"hashtags\": {{\"highReach\": string[], \"nicheFocused\": string[], \
         \"trending\": string[], \"lowCompetition\": string[]}}, \"engagementTips\": string[]}}",
        input.content_summary,
        input.key_points.join(", "),
        input.caption_style,
        input.cta_type,
        input.content_niche
    );

    match request_json(llm, system, prompt).await {
        Some(payload) => SuggestOutcome { payload, degraded: false },
        None => SuggestOutcome { payload: fallback_captions(input), degraded: true },
    }
}

/// Analyze performance metrics against platform benchmarks.
pub async fn analyze_performance(llm: Option<&Arc<dyn LlmChat>>, input: &PerformanceInput) -> SuggestOutcome {
    let m = &input.metrics;
    let system = "You are an expert viral content strategist who specializes in analyzing performance \
                  metrics for short-form videos. You understand platform benchmarks, algorithm \
                  patterns, and how to interpret metrics to improve future content.";
    let prompt = format!(
        "Analyze these performance metrics for a short-form video:\n\n\
         Views: {}\nLikes: {}\nComments: {}\nShares: {}\nSaves: {}\nWatch Time: {}%\n\
         New Followers: {}\nProfile Visits: {}\n\n\
         Content Category: {}\nPlatform: {}\nTime Since Posting: {}\n\n\
         Provide analysis including:\n\
         1. Overall performance rating (Above Expected, Average, Below Expected)\n\
         2. Key metrics comparison to benchmarks\n\
         3. Content strengths based on metrics\n\
         4. Areas for improvement\n\
         5. Actionable recommendations for future content\n\
         6. Learning insights about what worked and why\n\n\
         Format your response as JSON with the following structure:\n\
         {{\"rating\": string, \"metrics\": {{\"engagementRate\": {{\"value\": number, \"comparison\": string}}, \
         \"saveRate\": {{\"value\": number, \"comparison\": string}}, \"watchTime\": {{\"value\": number, \
         \"comparison\": string}}, \"commentRate\": {{\"value\": number, \"comparison\": string}}}}, \
         \"strengths\": [{{\"title\": string, \"explanation\": string}}], \
         \"weaknesses\": [{{\"title\": string, \"explanation\": string}}], \
         \"actionPlan\": string[], \"insights\": [{{\"title\": string, \"content\": string}}]}}",
        m.views,
        m.likes,
        m.comments,
        m.shares,
        m.saves,
        m.watch_time,
        m.followers_gained,
        m.profile_visits,
        input.content_category,
        input.platform,
        input.time_frame
    );

    match request_json(llm, system, prompt).await {
        Some(payload) => SuggestOutcome { payload, degraded: false },
        None => SuggestOutcome { payload: fallback_performance(input), degraded: true },
    }
}

async fn request_json(llm: Option<&Arc<dyn LlmChat>>, system: &str, prompt: String) -> Option<Value> {
    let llm = llm?;
    match llm.chat(suggest_max_tokens(), system, &[Message::user(prompt)]).await {
        Ok(response) => match extract_json_object(&response.text) {
            Some(payload) => Some(payload),
            None => {
                warn!(model = %response.model, "suggestion reply was not a JSON object; serving canned response");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "suggestion request failed; serving canned response");
            None
        }
    }
}

/// Pull the first JSON object out of a model reply, tolerating markdown
/// code fences and prose around it.
pub(crate) fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let candidate = &text[start..=end];
    let value = serde_json::from_str::<Value>(candidate).ok()?;
    value.is_object().then_some(value)
}

// =============================================================================
// CANNED FALLBACKS (degraded mode)
// =============================================================================

fn fallback_idea() -> Value {
    let score = rand::rng().random_range(6..=9);
    json!({
        "score": score,
        "strengths": [
            "Your idea is concise and focused on a specific audience",
            "The content has potential for high engagement",
            "The concept is timely and relevant"
        ],
        "weaknesses": [
            "Could benefit from more emotional hooks",
            "May need more unique differentiators"
        ],
        "improvements": [
            {
                "suggestion": "Add a surprising statistic or fact at the beginning",
                "reasoning": "This creates immediate curiosity and makes viewers want to learn more"
            },
            {
                "suggestion": "Include a specific pain point for your target audience",
                "reasoning": "This increases relatability and makes viewers feel understood"
            }
        ],
        "analysis": "This content idea has good viral potential with some refinements."
    })
}

fn fallback_hooks() -> Value {
    json!({
        "hooks": [
            {
                "hook": "Did you know 80% of people are doing this wrong? Here's what the pros don't want you to know...",
                "explanation": "This hook creates immediate curiosity by suggesting insider knowledge and plays on the fear of missing out or doing something incorrectly.",
                "effectiveness": 9
            },
            {
                "hook": "I tried every trending method for 30 days. Only this one actually worked...",
                "explanation": "This hook leverages personal experience and the promise of a solution that's been tested, creating authority and trust.",
                "effectiveness": 8
            },
            {
                "hook": "This 10-second trick changed everything for me (and it will for you too)...",
                "explanation": "This hook promises a quick, easy solution with guaranteed results, appealing to the audience's desire for simple fixes.",
                "effectiveness": 7
            }
        ]
    })
}

fn fallback_structure() -> Value {
    let score = rand::rng().random_range(7..=9);
    json!({
        "score": score,
        "pacing": "Good pacing with clear transitions between sections",
        "transitions": "Natural flow between hook, middle, and ending",
        "strengths": [
            "Strong hook that immediately grabs attention",
            "Clear and concise main content",
            "Effective call-to-action that prompts engagement"
        ],
        "improvements": [
            "Consider making the middle section slightly shorter for better retention",
            "Add a pattern interrupt in the middle to re-engage viewers"
        ],
        "analysis": "The structure is well-designed for short-form video. The hook effectively captures attention, the middle delivers value, and the ending has a clear call-to-action."
    })
}

fn fallback_captions(input: &CaptionInput) -> Value {
    let niche = &input.content_niche;
    let cta = match input.cta_type.as_str() {
        "comment" => "Comment your thoughts below!",
        "follow" => "Follow for more tips!",
        _ => "Save this for later!",
    };
    let share_cta = match input.cta_type.as_str() {
        "share" => "Share with someone who needs to see this!",
        "link" => "Link in bio for more!",
        _ => "Save this to reference later!",
    };
    json!({
        "captions": [
            {
                "text": format!("✨ {}\n\n{}\n\n👇 {cta}", input.content_summary, input.key_points.join("\n")),
                "explanation": "This caption is concise, uses emojis effectively, and has a clear call-to-action."
            },
            {
                "text": format!(
                    "I discovered something game-changing about {niche}...\n\n{}\n\n{share_cta}",
                    input.key_points.join("\n")
                ),
                "explanation": "This caption creates curiosity with an intriguing opening and clearly lists all key points."
            },
            {
                "text": format!(
                    "The {niche} hack nobody is talking about 🤫\n\n{}\n\nAgree or disagree? Drop your thoughts 👇",
                    input.key_points.join("\n\n")
                ),
                "explanation": "This caption uses exclusivity to create interest and ends with an engaging question."
            }
        ],
        "hashtags": {
            "highReach": [format!("#{niche}"), format!("#{niche}Tips"), format!("#{niche}Hack"), "#Viral", "#ForYou", "#FYP"],
            "nicheFocused": [format!("#{niche}Advice"), format!("#{niche}Creator"), format!("#{niche}Community"), format!("#{niche}Growth")],
            "trending": [format!("#Trending{niche}"), format!("#{niche}Challenge")],
            "lowCompetition": [format!("#{niche}Secrets"), format!("#{niche}ForBeginners"), format!("#Daily{niche}"), format!("#{niche}LifeHack")]
        },
        "engagementTips": [
            "Respond to comments within the first hour for maximum algorithm boost",
            "Pin your best comment to encourage more engagement",
            "Ask a question in your first comment to start a conversation",
            "Post when your audience is most active (check your analytics)"
        ]
    })
}

/// Rate-vs-benchmark comparison text.
fn comparison(rate: f64, benchmark: f64) -> &'static str {
    if rate >= benchmark * 1.5 {
        "Significantly above average"
    } else if rate >= benchmark {
        "Above average"
    } else if rate >= benchmark * 0.8 {
        "Average"
    } else {
        "Below average"
    }
}

#[allow(clippy::cast_precision_loss)]
fn fallback_performance(input: &PerformanceInput) -> Value {
    let m = &input.metrics;
    let views = m.views.max(1) as f64;
    let engagement_rate = ((m.likes + m.comments + m.shares) as f64 / views * 100.0).round();
    let save_rate = (m.saves as f64 / views * 100.0).round();
    let comment_rate = (m.comments as f64 / views * 100.0).round();

    let rating = if engagement_rate > 5.0 {
        "Above Expected"
    } else if engagement_rate > 3.0 {
        "Average"
    } else {
        "Below Expected"
    };

    json!({
        "rating": rating,
        "metrics": {
            "engagementRate": { "value": engagement_rate, "comparison": comparison(engagement_rate, 5.0) },
            "saveRate": { "value": save_rate, "comparison": comparison(save_rate, 3.0) },
            "watchTime": { "value": m.watch_time, "comparison": comparison(m.watch_time, 60.0) },
            "commentRate": { "value": comment_rate, "comparison": comparison(comment_rate, 2.0) }
        },
        "strengths": [
            {
                "title": if m.watch_time > 70.0 { "Exceptional Watch Time" } else { "Good Watch Time" },
                "explanation": "Your content is holding viewer attention, which is highly valued by the algorithm."
            },
            {
                "title": if save_rate > 2.0 { "Strong Save Rate" } else { "Decent Save Rate" },
                "explanation": "Saves indicate your content is valuable enough for viewers to want to reference later."
            }
        ],
        "weaknesses": [
            {
                "title": if comment_rate < 1.0 { "Low Comment Engagement" } else { "Average Comment Engagement" },
                "explanation": "Increasing comment engagement would help boost algorithmic distribution."
            },
            {
                "title": "Potential for Higher Shares",
                "explanation": "Increasing share rate would expand your reach to new audiences."
            }
        ],
        "actionPlan": [
            "Add a direct question in your hook to encourage more comments",
            "Test a controversial or surprising statement to increase shares",
            "Optimize your first 3 seconds to improve watch time further",
            "Create more content in your highest-performing content category"
        ],
        "insights": [
            {
                "title": "Algorithm Insight",
                "content": format!(
                    "{} prioritizes watch time and saves in its algorithm. Your content is performing well in these areas.",
                    input.platform
                )
            },
            {
                "title": "Audience Behavior",
                "content": "Your audience engages more with your content than the average for your niche, indicating strong audience alignment."
            }
        ]
    })
}

#[cfg(test)]
#[path = "suggest_test.rs"]
mod tests;

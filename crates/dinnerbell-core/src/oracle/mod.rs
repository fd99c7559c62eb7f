//! Planning oracle: prompt construction and response parsing around an
//! opaque text-completion call.

mod anthropic;
mod prompt;

pub use anthropic::{AnthropicConfig, AnthropicOracle};
pub use prompt::{PROMPT_RECIPE_LIMIT, build_prompt};

use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use dinnerbell_db::models::MealAssignment;

/// A text-in, text-out completion service.
#[async_trait]
pub trait PlanningOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// The structured draft the oracle is asked to return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanDraft {
    pub meal_plan: Vec<DraftMeal>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftMeal {
    pub day: String,
    pub recipe_name: String,
    pub reason: String,
}

impl From<DraftMeal> for MealAssignment {
    fn from(meal: DraftMeal) -> Self {
        Self {
            day: meal.day,
            recipe_name: meal.recipe_name,
            reason: meal.reason,
            recipe_id: None,
        }
    }
}

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*\})\s*```").expect("fenced JSON pattern is valid")
});

/// Pull the JSON object out of a fenced block when the text has one.
///
/// Text without a fence, or with a fence that does not wrap an object, is
/// returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.contains("```") {
        return trimmed;
    }
    FENCED_JSON
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str())
}

/// Parse an oracle response into a [`PlanDraft`].
///
/// The number of meals is not checked.
pub fn parse_plan_response(raw: &str) -> Result<PlanDraft, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"meal_plan":[{"day":"Monday","recipe_name":"Tacos","reason":"quick"}],"notes":"n"}"#;

    #[test]
    fn plain_json_parses() {
        let draft = parse_plan_response(&format!("  {BODY}\n")).unwrap();
        assert_eq!(draft.meal_plan.len(), 1);
        assert_eq!(draft.meal_plan[0].recipe_name, "Tacos");
        assert_eq!(draft.notes.as_deref(), Some("n"));
    }

    #[test]
    fn json_tagged_fence_is_stripped() {
        let raw = format!("Here you go:\n```json\n{BODY}\n```\nEnjoy!");
        assert_eq!(strip_code_fence(&raw), BODY);
        assert!(parse_plan_response(&raw).is_ok());
    }

    #[test]
    fn untagged_fence_is_stripped() {
        let raw = format!("```\n{BODY}\n```");
        assert_eq!(strip_code_fence(&raw), BODY);
    }

    #[test]
    fn fence_without_object_falls_back_to_whole_text() {
        let raw = "```\nnot json\n```";
        assert_eq!(strip_code_fence(raw), raw);
        assert!(parse_plan_response(raw).is_err());
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(parse_plan_response(r#"{"meals":[]}"#).is_err());
        assert!(parse_plan_response(r#"{"meal_plan":[{"day":"Monday"}]}"#).is_err());
    }

    #[test]
    fn meal_without_reason_is_rejected() {
        let err = parse_plan_response(r#"{"meal_plan":[{"day":"Monday","recipe_name":"Tacos"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("reason"), "{err}");
    }

    #[test]
    fn missing_notes_is_allowed() {
        let draft = parse_plan_response(r#"{"meal_plan":[]}"#).unwrap();
        assert!(draft.meal_plan.is_empty());
        assert!(draft.notes.is_none());
    }
}

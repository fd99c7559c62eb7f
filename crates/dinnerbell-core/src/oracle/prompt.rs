use dinnerbell_db::models::{Feedback, Preferences};

use crate::recipes::RecipeSummary;

/// How many catalog entries the prompt lists.
pub const PROMPT_RECIPE_LIMIT: usize = 50;

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(", ")
    }
}

/// Build the planning prompt. Same inputs always give the same text.
///
/// `recipes` is cut to the first [`PROMPT_RECIPE_LIMIT`]; `feedback` is used
/// as given (the caller passes the recent tail).
pub fn build_prompt(prefs: &Preferences, recipes: &[RecipeSummary], feedback: &[Feedback]) -> String {
    let family = prefs
        .family_members
        .iter()
        .map(|m| {
            format!(
                "- {}: Allergies: {}, Dislikes: {}, Preferences: {}",
                m.name,
                list_or_none(&m.allergies),
                list_or_none(&m.dislikes),
                list_or_none(&m.likes),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let catalog = recipes
        .iter()
        .take(PROMPT_RECIPE_LIMIT)
        .map(|r| {
            let description = r
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("No description");
            format!("- {}: {}", r.name, description)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let history = if feedback.is_empty() {
        "No previous feedback".to_owned()
    } else {
        feedback
            .iter()
            .map(|f| {
                format!(
                    "Previous feedback: Liked: {}, Disliked: {}. Notes: {}",
                    f.liked_meals.join(", "),
                    f.disliked_meals.join(", "),
                    f.suggestions,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let budget = prefs
        .budget_per_week
        .map_or_else(|| "No limit".to_owned(), |b| format!("${b}"));
    let notes = prefs
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("none");

    format!(
        "You are a meal planning assistant. Create a 7-day meal plan (dinner only) for this family.

FAMILY INFORMATION:
{family}

DIETARY RESTRICTIONS: {restrictions}
MAX COOKING TIME: {minutes} minutes
BUDGET: {budget}
ADDITIONAL NOTES: {notes}

AVAILABLE RECIPES:
{catalog}

PAST FEEDBACK:
{history}

Please create a meal plan that:
1. Avoids ALL allergens completely
2. Minimizes disliked foods
3. Incorporates preferences when possible
4. Provides variety (no repeating meals)
5. Balances nutrition across the week
6. Stays within cooking time limits
7. Learns from past feedback

Respond with a JSON object in this exact format:
{{
  \"meal_plan\": [
    {{
      \"day\": \"Monday\",
      \"recipe_name\": \"Recipe Name\",
      \"reason\": \"Why this meal works for the family (one sentence)\"
    }}
  ],
  \"notes\": \"Any important notes about this week's plan\"
}}

CRITICAL: Your entire response must be ONLY a valid JSON object. DO NOT include any text before or after the JSON.",
        restrictions = list_or_none(&prefs.dietary_restrictions),
        minutes = prefs.cooking_time_max,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use dinnerbell_db::models::FamilyMember;
    use uuid::Uuid;

    use super::*;

    fn prefs() -> Preferences {
        Preferences {
            family_members: vec![FamilyMember {
                name: "Sam".into(),
                allergies: vec!["peanuts".into()],
                dislikes: vec![],
                likes: vec!["pasta".into(), "rice".into()],
            }],
            dietary_restrictions: vec![],
            cooking_time_max: 40,
            budget_per_week: Some(120.0),
            notes: None,
        }
    }

    fn recipe(i: usize, description: Option<&str>) -> RecipeSummary {
        RecipeSummary {
            id: i.to_string(),
            name: format!("Recipe {i}"),
            slug: format!("recipe-{i}"),
            description: description.map(str::to_owned),
        }
    }

    #[test]
    fn family_lines_fill_in_none() {
        let prompt = build_prompt(&prefs(), &[], &[]);
        assert!(prompt.contains("- Sam: Allergies: peanuts, Dislikes: none, Preferences: pasta, rice"));
        assert!(prompt.contains("DIETARY RESTRICTIONS: none"));
        assert!(prompt.contains("MAX COOKING TIME: 40 minutes"));
        assert!(prompt.contains("BUDGET: $120"));
        assert!(prompt.contains("ADDITIONAL NOTES: none"));
        assert!(prompt.contains("No previous feedback"));
    }

    #[test]
    fn catalog_is_capped_and_descriptions_default() {
        let recipes: Vec<_> = (0..60).map(|i| recipe(i, None)).collect();
        let prompt = build_prompt(&prefs(), &recipes, &[]);
        assert!(prompt.contains("- Recipe 49: No description"));
        assert!(!prompt.contains("Recipe 50"));
    }

    #[test]
    fn feedback_is_rendered_in_order() {
        let entry = |s: &str| Feedback {
            id: Uuid::new_v4(),
            plan_id: None,
            liked_meals: vec!["Tacos".into()],
            disliked_meals: vec!["Liver".into()],
            suggestions: s.into(),
            created_at: Utc::now(),
        };
        let prompt = build_prompt(&prefs(), &[], &[entry("first"), entry("second")]);
        let first = prompt.find("Notes: first").unwrap();
        let second = prompt.find("Notes: second").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Liked: Tacos, Disliked: Liver."));
    }

    #[test]
    fn prompt_is_deterministic() {
        let recipes = vec![recipe(1, Some("hearty"))];
        assert_eq!(
            build_prompt(&prefs(), &recipes, &[]),
            build_prompt(&prefs(), &recipes, &[])
        );
    }
}

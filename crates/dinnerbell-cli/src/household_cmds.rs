//! CLI handlers for `dinnerbell preferences` and `dinnerbell feedback`.

use anyhow::Result;

use dinnerbell_core::MealPlanner;
use dinnerbell_core::planner::NewFeedback;
use dinnerbell_db::models::Preferences;

use crate::input::{parse_id, read_document};
use crate::{FeedbackCommands, PreferenceCommands};

// -----------------------------------------------------------------------
// Preferences
// -----------------------------------------------------------------------

pub async fn run_preference_command(command: PreferenceCommands, planner: &MealPlanner) -> Result<()> {
    match command {
        PreferenceCommands::Set { file } => {
            let prefs: Preferences = read_document(&file)?;
            planner.save_preferences(&prefs).await?;
            println!(
                "Preferences saved ({} family members).",
                prefs.family_members.len()
            );
            Ok(())
        }
        PreferenceCommands::Show => {
            match planner.preferences().await? {
                Some(prefs) => print_preferences(&prefs),
                None => println!("No preferences saved. Use `dinnerbell preferences set <file>`."),
            }
            Ok(())
        }
    }
}

fn print_preferences(prefs: &Preferences) {
    println!("Family:");
    for member in &prefs.family_members {
        println!("  {}", member.name);
        if !member.allergies.is_empty() {
            println!("    allergies: {}", member.allergies.join(", "));
        }
        if !member.dislikes.is_empty() {
            println!("    dislikes:  {}", member.dislikes.join(", "));
        }
        if !member.likes.is_empty() {
            println!("    likes:     {}", member.likes.join(", "));
        }
    }
    if !prefs.dietary_restrictions.is_empty() {
        println!("Dietary restrictions: {}", prefs.dietary_restrictions.join(", "));
    }
    println!("Max cooking time: {} minutes", prefs.cooking_time_max);
    if let Some(budget) = prefs.budget_per_week {
        println!("Weekly budget: ${budget:.2}");
    }
    if let Some(notes) = &prefs.notes {
        println!("Notes: {notes}");
    }
}

// -----------------------------------------------------------------------
// Feedback
// -----------------------------------------------------------------------

pub async fn run_feedback_command(command: FeedbackCommands, planner: &MealPlanner) -> Result<()> {
    match command {
        FeedbackCommands::Add {
            plan_id,
            liked,
            disliked,
            suggestions,
        } => {
            let plan_id = plan_id.as_deref().map(|id| parse_id("plan", id)).transpose()?;
            let entry = planner
                .record_feedback(NewFeedback {
                    plan_id,
                    liked_meals: liked,
                    disliked_meals: disliked,
                    suggestions: suggestions.unwrap_or_default(),
                })
                .await?;
            println!("Feedback {} recorded.", entry.id);
            Ok(())
        }
        FeedbackCommands::List => {
            let entries = planner.feedback().await?;
            if entries.is_empty() {
                println!("No feedback recorded.");
                return Ok(());
            }
            for entry in &entries {
                let plan = entry
                    .plan_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  plan {plan}", entry.created_at.format("%Y-%m-%d %H:%M"));
                if !entry.liked_meals.is_empty() {
                    println!("  liked:    {}", entry.liked_meals.join(", "));
                }
                if !entry.disliked_meals.is_empty() {
                    println!("  disliked: {}", entry.disliked_meals.join(", "));
                }
                if !entry.suggestions.is_empty() {
                    println!("  {}", entry.suggestions);
                }
            }
            Ok(())
        }
    }
}

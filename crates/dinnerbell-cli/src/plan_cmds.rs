//! CLI handlers for `dinnerbell plan` subcommands.
//!
//! Implements:
//! - `dinnerbell plan generate`                  -- draft next week's plan
//! - `dinnerbell plan current`                   -- show the open plan
//! - `dinnerbell plan list`                      -- list all plans
//! - `dinnerbell plan show <plan-id>`            -- show one plan
//! - `dinnerbell plan approve <plan-id> [--meals <file>]`
//! - `dinnerbell plan sync <plan-id>`            -- re-push an approved plan

use anyhow::Result;
use serde::Deserialize;

use dinnerbell_core::MealPlanner;
use dinnerbell_core::planner::SyncReport;
use dinnerbell_db::models::{MealAssignment, MealPlan};

use crate::PlanCommands;
use crate::input::{parse_id, read_document};

/// Replacement meals for `plan approve --meals`.
#[derive(Debug, Deserialize)]
struct MealsFile {
    #[serde(alias = "meal_plan")]
    meals: Vec<MealAssignment>,
}

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_plan_command(command: PlanCommands, planner: &MealPlanner) -> Result<()> {
    match command {
        PlanCommands::Generate => cmd_generate(planner).await,
        PlanCommands::Current => match planner.current_plan().await? {
            Some(plan) => {
                print_plan(&plan);
                Ok(())
            }
            None => {
                println!("No open plan. Use `dinnerbell plan generate` to draft one.");
                Ok(())
            }
        },
        PlanCommands::List => cmd_list(planner).await,
        PlanCommands::Show { plan_id } => {
            let plan = planner.plan(parse_id("plan", &plan_id)?).await?;
            print_plan(&plan);
            Ok(())
        }
        PlanCommands::Approve { plan_id, meals } => {
            cmd_approve(planner, &plan_id, meals.as_deref()).await
        }
        PlanCommands::Sync { plan_id } => {
            let report = planner.sync(parse_id("plan", &plan_id)?).await?;
            print_sync_report(&report);
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// dinnerbell plan generate
// -----------------------------------------------------------------------

async fn cmd_generate(planner: &MealPlanner) -> Result<()> {
    let plan = planner.generate().await?;
    println!("Plan generated.");
    println!();
    print_plan(&plan);
    println!();
    println!("Next: `dinnerbell plan approve {}`", plan.id);
    Ok(())
}

// -----------------------------------------------------------------------
// dinnerbell plan list
// -----------------------------------------------------------------------

async fn cmd_list(planner: &MealPlanner) -> Result<()> {
    let plans = planner.plans().await?;
    if plans.is_empty() {
        println!("No plans found. Use `dinnerbell plan generate` to draft one.");
        return Ok(());
    }

    // ID is always 36 chars (UUID). Status max is 8 (approved).
    println!(
        "{:<36}  {:<10}  {:<8}  {:>5}  CREATED",
        "ID", "WEEK", "STATUS", "MEALS"
    );
    for plan in &plans {
        println!(
            "{:<36}  {:<10}  {:<8}  {:>5}  {}",
            plan.id,
            plan.week_start,
            plan.status,
            plan.meals.len(),
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// dinnerbell plan approve
// -----------------------------------------------------------------------

async fn cmd_approve(planner: &MealPlanner, plan_id: &str, meals_file: Option<&str>) -> Result<()> {
    let id = parse_id("plan", plan_id)?;
    let overrides = match meals_file {
        Some(path) => Some(read_document::<MealsFile>(path)?.meals),
        None => None,
    };

    let approval = planner.approve(id, overrides).await?;

    println!("Plan {} approved.", approval.plan.id);
    println!();
    print_shopping_list(&approval.plan);
    if !approval.unresolved_meals.is_empty() {
        println!();
        println!("Not found in the recipe catalog (no ingredients added):");
        for name in &approval.unresolved_meals {
            println!("  - {name}");
        }
    }
    println!();
    print_sync_report(&approval.sync);
    Ok(())
}

// -----------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------

fn print_plan(plan: &MealPlan) {
    println!("Plan:   {}", plan.id);
    println!("Week:   {}", plan.week_start);
    println!("Status: {}", plan.status);
    if let Some(approved_at) = plan.approved_at {
        println!("Approved: {}", approved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();

    let day_w = plan.meals.iter().map(|m| m.day.len()).max().unwrap_or(3).max(3);
    for meal in &plan.meals {
        println!("  {:<day_w$}  {}", meal.day, meal.recipe_name);
        if !meal.reason.is_empty() {
            println!("  {:<day_w$}    {}", "", meal.reason);
        }
    }
    if let Some(notes) = &plan.notes {
        println!();
        println!("Notes: {notes}");
    }
    if !plan.shopping_list.is_empty() {
        println!();
        print_shopping_list(plan);
    }
}

fn print_shopping_list(plan: &MealPlan) {
    println!("Shopping list ({} items):", plan.shopping_list.len());
    for item in &plan.shopping_list {
        let unit = if item.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", item.unit)
        };
        println!("  {} x{}{unit}  ({})", item.name, item.quantity, item.recipe);
    }
}

fn print_sync_report(report: &SyncReport) {
    let meals = &report.meal_plan;
    println!(
        "Meal plan sync: {} created, {} already present, {} failed",
        meals.created.len(),
        meals.skipped.len(),
        meals.failed.len()
    );
    for date in &meals.failed {
        println!("  failed: {date}");
    }

    match &report.shopping_list {
        Some(list) => {
            let origin = if list.is_existing { "existing" } else { "new" };
            println!(
                "Shopping list \"{}\" ({origin}): {} added, {} already present, {} failed",
                list.list_name,
                list.added.len(),
                list.skipped.len(),
                list.failed.len()
            );
            for recipe_id in &list.failed {
                println!("  failed: recipe {recipe_id}");
            }
        }
        None => println!("Shopping list sync skipped: no meal matched a catalog recipe."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meals_file_accepts_oracle_shape() {
        let doc = r#"{"meal_plan": [{"day": "Monday", "recipe_name": "Chili"}]}"#;
        let parsed: MealsFile = serde_json::from_str(doc).unwrap();
        assert_eq!(parsed.meals.len(), 1);
        assert_eq!(parsed.meals[0].recipe_name, "Chili");
        assert_eq!(parsed.meals[0].reason, "");
    }

    #[test]
    fn meals_file_in_toml() {
        let doc = "[[meals]]\nday = \"Tuesday\"\nrecipe_name = \"Tacos\"\nreason = \"quick\"\n";
        let parsed: MealsFile = toml::from_str(doc).unwrap();
        assert_eq!(parsed.meals[0].day, "Tuesday");
        assert!(parsed.meals[0].recipe_id.is_none());
    }
}

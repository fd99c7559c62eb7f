//! Database query functions for the `meal_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::MealPlan;

/// Insert a plan, or overwrite every mutable column if the id already exists.
pub async fn upsert_plan(pool: &PgPool, plan: &MealPlan) -> Result<()> {
    sqlx::query(
        "INSERT INTO meal_plans \
             (id, week_start, meals, notes, shopping_list, status, created_at, approved_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             meals = EXCLUDED.meals, \
             notes = EXCLUDED.notes, \
             shopping_list = EXCLUDED.shopping_list, \
             status = EXCLUDED.status, \
             approved_at = EXCLUDED.approved_at",
    )
    .bind(plan.id)
    .bind(plan.week_start)
    .bind(Json(&plan.meals))
    .bind(&plan.notes)
    .bind(Json(&plan.shopping_list))
    .bind(plan.status)
    .bind(plan.created_at)
    .bind(plan.approved_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to save meal plan {}", plan.id))?;

    Ok(())
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<MealPlan>> {
    let plan = sqlx::query_as::<_, MealPlan>("SELECT * FROM meal_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch meal plan")?;

    Ok(plan)
}

/// List all plans, newest first.
pub async fn list_plans(pool: &PgPool) -> Result<Vec<MealPlan>> {
    let plans = sqlx::query_as::<_, MealPlan>("SELECT * FROM meal_plans ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list meal plans")?;

    Ok(plans)
}

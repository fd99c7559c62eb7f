//! Database query functions for the singleton `preferences` row.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::Preferences;

/// Fetch the household preferences, if any have been saved.
pub async fn get_preferences(pool: &PgPool) -> Result<Option<Preferences>> {
    let prefs = sqlx::query_as::<_, Preferences>(
        "SELECT family_members, dietary_restrictions, cooking_time_max, budget_per_week, notes \
         FROM preferences WHERE id = 1",
    )
    .fetch_optional(pool)
    .await
    .context("failed to fetch preferences")?;

    Ok(prefs)
}

/// Replace the household preferences wholesale.
pub async fn upsert_preferences(pool: &PgPool, prefs: &Preferences) -> Result<()> {
    sqlx::query(
        "INSERT INTO preferences \
             (id, family_members, dietary_restrictions, cooking_time_max, budget_per_week, notes, updated_at) \
         VALUES (1, $1, $2, $3, $4, $5, now()) \
         ON CONFLICT (id) DO UPDATE SET \
             family_members = EXCLUDED.family_members, \
             dietary_restrictions = EXCLUDED.dietary_restrictions, \
             cooking_time_max = EXCLUDED.cooking_time_max, \
             budget_per_week = EXCLUDED.budget_per_week, \
             notes = EXCLUDED.notes, \
             updated_at = now()",
    )
    .bind(Json(&prefs.family_members))
    .bind(&prefs.dietary_restrictions)
    .bind(prefs.cooking_time_max)
    .bind(prefs.budget_per_week)
    .bind(&prefs.notes)
    .execute(pool)
    .await
    .context("failed to save preferences")?;

    Ok(())
}

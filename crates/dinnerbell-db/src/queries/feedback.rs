//! Database query functions for the append-only `feedback` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Feedback;

/// Append a feedback entry.
pub async fn insert_feedback(pool: &PgPool, feedback: &Feedback) -> Result<()> {
    sqlx::query(
        "INSERT INTO feedback (id, plan_id, liked_meals, disliked_meals, suggestions, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(feedback.id)
    .bind(feedback.plan_id)
    .bind(&feedback.liked_meals)
    .bind(&feedback.disliked_meals)
    .bind(&feedback.suggestions)
    .bind(feedback.created_at)
    .execute(pool)
    .await
    .context("failed to insert feedback")?;

    Ok(())
}

/// All feedback, oldest first.
pub async fn list_feedback(pool: &PgPool) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>("SELECT * FROM feedback ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
        .context("failed to list feedback")?;

    Ok(rows)
}

/// The `limit` most recent feedback entries, returned oldest first.
pub async fn list_recent_feedback(pool: &PgPool, limit: i64) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(
        "SELECT * FROM ( \
             SELECT * FROM feedback ORDER BY created_at DESC LIMIT $1 \
         ) recent ORDER BY created_at ASC",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to list recent feedback")?;

    Ok(rows)
}

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dinnerbell_db::models::{Feedback, MealPlan, Order, Preferences};
use dinnerbell_db::queries::{feedback, orders, plans, preferences};

use super::{FeedbackStore, OrderStore, PlanStore, PreferenceStore};

/// [`super::Store`] backed by the dinnerbell PostgreSQL schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn get_preferences(&self) -> Result<Option<Preferences>> {
        preferences::get_preferences(&self.pool).await
    }

    async fn put_preferences(&self, prefs: &Preferences) -> Result<()> {
        preferences::upsert_preferences(&self.pool, prefs).await
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn append_feedback(&self, entry: &Feedback) -> Result<()> {
        feedback::insert_feedback(&self.pool, entry).await
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        feedback::list_feedback(&self.pool).await
    }

    async fn recent_feedback(&self, limit: usize) -> Result<Vec<Feedback>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        feedback::list_recent_feedback(&self.pool, limit).await
    }
}

#[async_trait]
impl PlanStore for PgStore {
    async fn get_plan(&self, id: Uuid) -> Result<Option<MealPlan>> {
        plans::get_plan(&self.pool, id).await
    }

    async fn list_plans(&self) -> Result<Vec<MealPlan>> {
        plans::list_plans(&self.pool).await
    }

    async fn put_plan(&self, plan: &MealPlan) -> Result<()> {
        plans::upsert_plan(&self.pool, plan).await
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        orders::list_orders(&self.pool).await
    }

    async fn find_in_flight_order(&self, plan_id: Uuid) -> Result<Option<Order>> {
        orders::find_in_flight_order(&self.pool, plan_id).await
    }

    async fn put_order(&self, order: &Order) -> Result<()> {
        orders::upsert_order(&self.pool, order).await
    }

    async fn delete_order(&self, id: Uuid) -> Result<()> {
        orders::delete_order(&self.pool, id).await
    }
}

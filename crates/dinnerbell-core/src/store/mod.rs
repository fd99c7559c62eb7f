//! Repository interface over the locally-owned records.
//!
//! The planner only ever talks to a [`Store`]; [`PgStore`] backs it with
//! PostgreSQL and [`MemoryStore`] keeps everything in process.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use dinnerbell_db::models::{Feedback, MealPlan, Order, Preferences};

/// How many feedback entries the planning prompt sees.
pub const RECENT_FEEDBACK_LIMIT: usize = 5;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_preferences(&self) -> Result<Option<Preferences>>;

    /// Replace the stored preferences wholesale.
    async fn put_preferences(&self, prefs: &Preferences) -> Result<()>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append_feedback(&self, feedback: &Feedback) -> Result<()>;

    /// All feedback, oldest first.
    async fn list_feedback(&self) -> Result<Vec<Feedback>>;

    /// The last `limit` entries, oldest first.
    async fn recent_feedback(&self, limit: usize) -> Result<Vec<Feedback>>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_plan(&self, id: Uuid) -> Result<Option<MealPlan>>;

    /// All plans, newest first by creation time.
    async fn list_plans(&self) -> Result<Vec<MealPlan>>;

    /// Insert or overwrite a plan.
    async fn put_plan(&self, plan: &MealPlan) -> Result<()>;

    /// The most recently created plan that is still pending or approved.
    async fn current_plan(&self) -> Result<Option<MealPlan>> {
        Ok(self
            .list_plans()
            .await?
            .into_iter()
            .find(|p| p.status.is_open()))
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders, oldest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// The `checkout_pending` order for a plan, if one was left behind.
    async fn find_in_flight_order(&self, plan_id: Uuid) -> Result<Option<Order>>;

    async fn put_order(&self, order: &Order) -> Result<()>;

    async fn delete_order(&self, id: Uuid) -> Result<()>;
}

/// Everything the planner needs from persistence.
pub trait Store: PreferenceStore + FeedbackStore + PlanStore + OrderStore {}

impl<T> Store for T where T: PreferenceStore + FeedbackStore + PlanStore + OrderStore {}

const _: () = {
    fn _assert_object_safe(_: &dyn Store) {}
};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use dinnerbell_db::models::{Feedback, MealPlan, Order, OrderStatus, Preferences};

use super::{FeedbackStore, OrderStore, PlanStore, PreferenceStore};

#[derive(Debug, Default)]
struct Records {
    preferences: Option<Preferences>,
    feedback: Vec<Feedback>,
    plans: Vec<MealPlan>,
    orders: Vec<Order>,
}

/// In-process [`super::Store`]. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_preferences(&self) -> Result<Option<Preferences>> {
        Ok(self.records.read().await.preferences.clone())
    }

    async fn put_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.records.write().await.preferences = Some(prefs.clone());
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn append_feedback(&self, entry: &Feedback) -> Result<()> {
        self.records.write().await.feedback.push(entry.clone());
        Ok(())
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let mut all = self.records.read().await.feedback.clone();
        all.sort_by_key(|f| f.created_at);
        Ok(all)
    }

    async fn recent_feedback(&self, limit: usize) -> Result<Vec<Feedback>> {
        let all = self.list_feedback().await?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn get_plan(&self, id: Uuid) -> Result<Option<MealPlan>> {
        let records = self.records.read().await;
        Ok(records.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<MealPlan>> {
        let mut plans = self.records.read().await.plans.clone();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn put_plan(&self, plan: &MealPlan) -> Result<()> {
        let mut records = self.records.write().await;
        match records.plans.iter_mut().find(|p| p.id == plan.id) {
            Some(existing) => *existing = plan.clone(),
            None => records.plans.push(plan.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.records.read().await.orders.clone();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn find_in_flight_order(&self, plan_id: Uuid) -> Result<Option<Order>> {
        let records = self.records.read().await;
        Ok(records
            .orders
            .iter()
            .find(|o| o.plan_id == plan_id && o.status == OrderStatus::CheckoutPending)
            .cloned())
    }

    async fn put_order(&self, order: &Order) -> Result<()> {
        let mut records = self.records.write().await;
        match records.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order.clone(),
            None => records.orders.push(order.clone()),
        }
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<()> {
        self.records.write().await.orders.retain(|o| o.id != id);
        Ok(())
    }
}

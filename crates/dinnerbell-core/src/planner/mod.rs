//! Plan lifecycle orchestrator.
//!
//! [`MealPlanner`] owns the local records and drives every remote call in
//! sequence: generate a draft from the oracle, approve it (consolidate and
//! sync to the household), then place a grocery order.

mod order;

pub use order::PlacedOrder;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use dinnerbell_db::models::{Feedback, MealAssignment, MealPlan, Order, PlanStatus, Preferences};

use crate::consolidate;
use crate::error::{PlannerError, Result};
use crate::grocery::GroceryApi;
use crate::oracle::{self, PlanningOracle};
use crate::recipes::{CATALOG_PAGE_SIZE, RecipeCatalog, RecipeService};
use crate::state::PlanStateMachine;
use crate::store::{
    FeedbackStore, OrderStore, PlanStore, PreferenceStore, RECENT_FEEDBACK_LIMIT, Store,
};
use crate::sync::{self, HouseholdSync, MealPlanSyncReport, ShoppingListSyncReport};
use crate::week;

/// Outcome of pushing a plan to the household.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub meal_plan: MealPlanSyncReport,
    /// `None` when no meal resolved to a catalog recipe.
    pub shopping_list: Option<ShoppingListSyncReport>,
}

/// Outcome of [`MealPlanner::approve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub plan: MealPlan,
    /// Recipe names with no catalog match; they contribute no ingredients.
    pub unresolved_meals: Vec<String>,
    pub sync: SyncReport,
}

/// A feedback entry as submitted, before it is stamped and stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewFeedback {
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub liked_meals: Vec<String>,
    #[serde(default)]
    pub disliked_meals: Vec<String>,
    #[serde(default)]
    pub suggestions: String,
}

pub struct MealPlanner {
    store: Arc<dyn Store>,
    oracle: Arc<dyn PlanningOracle>,
    recipes: Arc<dyn RecipeService>,
    grocery: Arc<dyn GroceryApi>,
    household: HouseholdSync,
}

impl MealPlanner {
    pub fn new(
        store: Arc<dyn Store>,
        oracle: Arc<dyn PlanningOracle>,
        recipes: Arc<dyn RecipeService>,
        grocery: Arc<dyn GroceryApi>,
    ) -> Self {
        let household = HouseholdSync::new(Arc::clone(&recipes));
        Self {
            store,
            oracle,
            recipes,
            grocery,
            household,
        }
    }

    async fn require_plan(&self, id: Uuid) -> Result<MealPlan> {
        self.store
            .get_plan(id)
            .await?
            .ok_or(PlannerError::NotFound { kind: "plan", id })
    }

    // -----------------------------------------------------------------------
    // Generate
    // -----------------------------------------------------------------------

    /// Draft a new `pending` plan for next week.
    pub async fn generate(&self) -> Result<MealPlan> {
        self.generate_at(Utc::now()).await
    }

    /// [`Self::generate`] as if run at `now`.
    ///
    /// Other plans are left untouched; the new plan becomes current because
    /// it is the newest.
    pub async fn generate_at(&self, now: DateTime<Utc>) -> Result<MealPlan> {
        let prefs = self.store.get_preferences().await?.ok_or_else(|| {
            PlannerError::Configuration("no household preferences have been saved".into())
        })?;
        let feedback = self.store.recent_feedback(RECENT_FEEDBACK_LIMIT).await?;
        let recipes = self.recipes.list_recipes(CATALOG_PAGE_SIZE).await?;

        let prompt = oracle::build_prompt(&prefs, &recipes, &feedback);
        let raw = self.oracle.complete(&prompt).await?;
        let draft = oracle::parse_plan_response(&raw).map_err(|e| {
            PlannerError::PlanningOracle(format!("response is not a valid meal plan: {e}"))
        })?;

        let plan = MealPlan {
            id: Uuid::new_v4(),
            week_start: week::next_monday(now.date_naive()),
            meals: draft.meal_plan.into_iter().map(MealAssignment::from).collect(),
            notes: draft.notes,
            shopping_list: Vec::new(),
            status: PlanStatus::Pending,
            created_at: now,
            approved_at: None,
        };
        self.store.put_plan(&plan).await?;

        info!(
            plan_id = %plan.id,
            week_start = %plan.week_start,
            meals = plan.meals.len(),
            "meal plan generated"
        );
        Ok(plan)
    }

    // -----------------------------------------------------------------------
    // Approve and sync
    // -----------------------------------------------------------------------

    /// Approve a plan, optionally replacing its meals first.
    ///
    /// The shopping list is rebuilt from the catalog and the approval is
    /// saved before the household sync runs. A sync failure is returned but
    /// the saved approval stands.
    pub async fn approve(
        &self,
        plan_id: Uuid,
        meals: Option<Vec<MealAssignment>>,
    ) -> Result<Approval> {
        let mut plan = self.require_plan(plan_id).await?;
        PlanStateMachine::ensure_transition(&plan, PlanStatus::Approved, "approve")?;

        if let Some(meals) = meals {
            plan.meals = meals;
        }

        let consolidation = consolidate::build_shopping_list(&*self.recipes, &plan.meals).await?;
        for (meal, recipe_id) in plan.meals.iter_mut().zip(consolidation.recipe_ids) {
            meal.recipe_id = recipe_id;
        }
        plan.shopping_list = consolidation.items;
        plan.status = PlanStatus::Approved;
        plan.approved_at = Some(Utc::now());
        self.store.put_plan(&plan).await?;

        info!(
            plan_id = %plan.id,
            items = plan.shopping_list.len(),
            unresolved = consolidation.unresolved_meals.len(),
            "meal plan approved"
        );

        let sync = self.push_to_household(&plan).await?;
        Ok(Approval {
            plan,
            unresolved_meals: consolidation.unresolved_meals,
            sync,
        })
    }

    /// Re-run the household sync for an approved plan.
    pub async fn sync(&self, plan_id: Uuid) -> Result<SyncReport> {
        let plan = self.require_plan(plan_id).await?;
        if plan.status != PlanStatus::Approved {
            return Err(PlannerError::InvalidState {
                plan_id,
                status: plan.status,
                operation: "sync",
            });
        }
        self.push_to_household(&plan).await
    }

    async fn push_to_household(&self, plan: &MealPlan) -> Result<SyncReport> {
        let meal_plan = self.household.push_meal_plan(plan).await?;
        let shopping_list = if sync::plan_recipe_ids(plan).is_empty() {
            warn!(plan_id = %plan.id, "no meal resolved to a recipe, skipping shopping list");
            None
        } else {
            Some(self.household.push_shopping_list(plan).await?)
        };
        Ok(SyncReport {
            meal_plan,
            shopping_list,
        })
    }

    // -----------------------------------------------------------------------
    // Preferences and feedback
    // -----------------------------------------------------------------------

    pub async fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.store.put_preferences(prefs).await?;
        info!(members = prefs.family_members.len(), "preferences saved");
        Ok(())
    }

    pub async fn preferences(&self) -> Result<Option<Preferences>> {
        Ok(self.store.get_preferences().await?)
    }

    /// Store a feedback entry. A referenced plan must exist.
    pub async fn record_feedback(&self, input: NewFeedback) -> Result<Feedback> {
        if let Some(plan_id) = input.plan_id {
            self.require_plan(plan_id).await?;
        }
        let entry = Feedback {
            id: Uuid::new_v4(),
            plan_id: input.plan_id,
            liked_meals: input.liked_meals,
            disliked_meals: input.disliked_meals,
            suggestions: input.suggestions,
            created_at: Utc::now(),
        };
        self.store.append_feedback(&entry).await?;
        info!(feedback_id = %entry.id, "feedback recorded");
        Ok(entry)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The newest plan that is still pending or approved.
    pub async fn current_plan(&self) -> Result<Option<MealPlan>> {
        Ok(self.store.current_plan().await?)
    }

    pub async fn plan(&self, id: Uuid) -> Result<MealPlan> {
        self.require_plan(id).await
    }

    /// All plans, newest first.
    pub async fn plans(&self) -> Result<Vec<MealPlan>> {
        Ok(self.store.list_plans().await?)
    }

    pub async fn feedback(&self) -> Result<Vec<Feedback>> {
        Ok(self.store.list_feedback().await?)
    }

    pub async fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.list_orders().await?)
    }

    pub async fn store_availability(&self) -> Result<serde_json::Value> {
        Ok(self.grocery.store_availability().await?)
    }
}

//! Idempotent push of an approved plan into the recipe service's household
//! meal plan and shopping lists.
//!
//! Both pushes read the remote state first and only create what is missing,
//! so re-running after a partial failure converges without duplicates.
//! Nothing remote is ever edited or deleted.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use dinnerbell_db::models::MealPlan;

use crate::error::{PlannerError, Result};
use crate::recipes::{
    DINNER_ENTRY_TYPE, HouseholdApi, NewMealPlanEntry, RecipeCatalog, RecipeService,
};
use crate::week;

/// Household and user the sync writes as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdIdentity {
    pub household_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealPlanSyncReport {
    pub created: Vec<NaiveDate>,
    /// Dates that already had a dinner entry.
    pub skipped: Vec<NaiveDate>,
    pub failed: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingListSyncReport {
    pub list_id: String,
    pub list_name: String,
    pub is_existing: bool,
    /// Recipe ids added to the list.
    pub added: Vec<String>,
    /// Recipe ids the list already referenced.
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Name of the shopping list created for a week.
pub fn shopping_list_name(week_start: NaiveDate) -> String {
    format!("Weekly Shopping - {week_start}")
}

/// Unique recipe ids of a plan's resolved meals, in first-seen order.
pub fn plan_recipe_ids(plan: &MealPlan) -> Vec<String> {
    let mut seen = HashSet::new();
    plan.meals
        .iter()
        .filter_map(|m| m.recipe_id.as_deref())
        .filter(|id| seen.insert(*id))
        .map(str::to_owned)
        .collect()
}

pub struct HouseholdSync {
    recipes: Arc<dyn RecipeService>,
    identity: OnceCell<HouseholdIdentity>,
}

impl HouseholdSync {
    pub fn new(recipes: Arc<dyn RecipeService>) -> Self {
        Self {
            recipes,
            identity: OnceCell::new(),
        }
    }

    /// Resolve household and user identity once; later calls reuse it.
    /// Failures are not cached.
    pub async fn identity(&self) -> Result<&HouseholdIdentity> {
        self.identity
            .get_or_try_init(|| async {
                let household_id = self
                    .recipes
                    .household_id()
                    .await
                    .map_err(|e| {
                        PlannerError::HouseholdResolution(format!(
                            "failed to look up household: {e:#}"
                        ))
                    })?
                    .ok_or_else(|| {
                        PlannerError::HouseholdResolution(
                            "no household is visible to the configured token".into(),
                        )
                    })?;
                let user_id = self
                    .recipes
                    .user_id()
                    .await
                    .map_err(|e| {
                        PlannerError::HouseholdResolution(format!(
                            "failed to look up current user: {e:#}"
                        ))
                    })?
                    .ok_or_else(|| {
                        PlannerError::HouseholdResolution("current user has no id".into())
                    })?;
                debug!(%household_id, %user_id, "household identity resolved");
                Ok(HouseholdIdentity {
                    household_id,
                    user_id,
                })
            })
            .await
    }

    /// Create one dinner entry per meal whose date has none yet.
    ///
    /// A failed create is logged and reported; the rest of the week still
    /// goes through.
    pub async fn push_meal_plan(&self, plan: &MealPlan) -> Result<MealPlanSyncReport> {
        let identity = self.identity().await?;
        let end = week::week_end(plan.week_start);

        let remote = self
            .recipes
            .list_meal_plan_entries(plan.week_start, end)
            .await?;
        let mut taken: HashSet<NaiveDate> = remote
            .into_iter()
            .filter(|e| e.entry_type == DINNER_ENTRY_TYPE)
            .map(|e| e.date)
            .collect();

        let mut report = MealPlanSyncReport::default();
        for (position, meal) in plan.meals.iter().enumerate() {
            let date = week::date_for_day(plan.week_start, &meal.day, position);
            if taken.contains(&date) {
                debug!(%date, recipe = %meal.recipe_name, "dinner entry exists, skipping");
                report.skipped.push(date);
                continue;
            }

            let entry = NewMealPlanEntry {
                date,
                entry_type: DINNER_ENTRY_TYPE.to_owned(),
                recipe_id: meal.recipe_id.clone(),
                title: meal.recipe_name.clone(),
                text: meal.reason.clone(),
                group_id: identity.household_id.clone(),
                user_id: identity.user_id.clone(),
            };
            match self.recipes.create_meal_plan_entry(&entry).await {
                Ok(()) => {
                    taken.insert(date);
                    report.created.push(date);
                }
                Err(e) => {
                    warn!(%date, recipe = %meal.recipe_name, error = %e, "failed to create meal plan entry");
                    report.failed.push(date);
                }
            }
        }

        info!(
            plan_id = %plan.id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "meal plan pushed"
        );
        Ok(report)
    }

    /// Add each resolved recipe to the week's shopping list, creating the
    /// list if no list name carries the week-start date.
    pub async fn push_shopping_list(&self, plan: &MealPlan) -> Result<ShoppingListSyncReport> {
        self.identity().await?;
        let token = plan.week_start.to_string();

        let lists = self.recipes.list_shopping_lists().await?;
        let (list, is_existing) = match lists.into_iter().find(|l| l.name.contains(&token)) {
            Some(list) => (list, true),
            None => {
                let name = shopping_list_name(plan.week_start);
                (self.recipes.create_shopping_list(&name).await?, false)
            }
        };

        let already: HashSet<String> = if is_existing {
            self.recipes
                .shopping_list_recipe_ids(&list.id)
                .await?
                .into_iter()
                .collect()
        } else {
            HashSet::new()
        };

        let mut report = ShoppingListSyncReport {
            list_id: list.id.clone(),
            list_name: list.name.clone(),
            is_existing,
            ..Default::default()
        };

        for recipe_id in plan_recipe_ids(plan) {
            if already.contains(&recipe_id) {
                report.skipped.push(recipe_id);
                continue;
            }

            let added = match self.recipes.get_recipe(&recipe_id).await {
                Ok(detail) => {
                    self.recipes
                        .add_recipe_to_shopping_list(&list.id, &detail)
                        .await
                }
                Err(e) => Err(e),
            };
            match added {
                Ok(()) => report.added.push(recipe_id),
                Err(e) => {
                    warn!(list_id = %list.id, %recipe_id, error = %e, "failed to add recipe to shopping list");
                    report.failed.push(recipe_id);
                }
            }
        }

        info!(
            plan_id = %plan.id,
            list_id = %report.list_id,
            is_existing,
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "shopping list pushed"
        );
        Ok(report)
    }
}

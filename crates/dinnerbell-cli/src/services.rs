//! Wire a [`MealPlanner`] from resolved config.
//!
//! Services without credentials are replaced by [`Unconfigured`], which fails
//! on first use, so local commands (preferences, feedback, listings) work
//! before every API key is in place.

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use dinnerbell_core::MealPlanner;
use dinnerbell_core::grocery::{Cart, CartItem, CheckoutReceipt, GroceryApi, InstacartClient, Product};
use dinnerbell_core::oracle::{AnthropicOracle, PlanningOracle};
use dinnerbell_core::recipes::{
    HouseholdApi, MealPlanEntry, MealieClient, NewMealPlanEntry, RecipeCatalog, RecipeDetail,
    RecipeService, RecipeSummary, ShoppingListSummary,
};
use dinnerbell_core::store::PgStore;

use crate::config::DinnerbellConfig;

/// Stand-in for a service whose credentials were not configured.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured {
    service: &'static str,
    hint: &'static str,
}

impl Unconfigured {
    const MEALIE: Self = Self {
        service: "Mealie",
        hint: "MEALIE_TOKEN",
    };
    const ANTHROPIC: Self = Self {
        service: "Anthropic",
        hint: "ANTHROPIC_API_KEY",
    };
    const INSTACART: Self = Self {
        service: "Instacart",
        hint: "INSTACART_ACCESS_TOKEN, INSTACART_RETAILER_ID and INSTACART_STORE_ID",
    };

    fn fail<T>(&self) -> Result<T> {
        bail!(
            "{} is not configured; set {} or run `dinnerbell init`",
            self.service,
            self.hint
        )
    }
}

#[async_trait]
impl PlanningOracle for Unconfigured {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.fail()
    }
}

#[async_trait]
impl RecipeCatalog for Unconfigured {
    async fn list_recipes(&self, _limit: usize) -> Result<Vec<RecipeSummary>> {
        self.fail()
    }

    async fn get_recipe(&self, _id: &str) -> Result<RecipeDetail> {
        self.fail()
    }
}

#[async_trait]
impl HouseholdApi for Unconfigured {
    async fn household_id(&self) -> Result<Option<String>> {
        self.fail()
    }

    async fn user_id(&self) -> Result<Option<String>> {
        self.fail()
    }

    async fn list_meal_plan_entries(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<MealPlanEntry>> {
        self.fail()
    }

    async fn create_meal_plan_entry(&self, _entry: &NewMealPlanEntry) -> Result<()> {
        self.fail()
    }

    async fn list_shopping_lists(&self) -> Result<Vec<ShoppingListSummary>> {
        self.fail()
    }

    async fn create_shopping_list(&self, _name: &str) -> Result<ShoppingListSummary> {
        self.fail()
    }

    async fn shopping_list_recipe_ids(&self, _list_id: &str) -> Result<Vec<String>> {
        self.fail()
    }

    async fn add_recipe_to_shopping_list(
        &self,
        _list_id: &str,
        _recipe: &RecipeDetail,
    ) -> Result<()> {
        self.fail()
    }
}

#[async_trait]
impl GroceryApi for Unconfigured {
    async fn search_products(&self, _query: &str) -> Result<Vec<Product>> {
        self.fail()
    }

    async fn create_cart(&self) -> Result<Cart> {
        self.fail()
    }

    async fn add_items(&self, _cart_id: &str, _items: &[CartItem]) -> Result<()> {
        self.fail()
    }

    async fn checkout(
        &self,
        _cart_id: &str,
        _pickup_time: DateTime<Utc>,
        _idempotency_key: Uuid,
    ) -> Result<CheckoutReceipt> {
        self.fail()
    }

    async fn store_availability(&self) -> Result<serde_json::Value> {
        self.fail()
    }
}

/// Build the planner over PostgreSQL and whichever services are configured.
pub fn build_planner(config: &DinnerbellConfig, pool: PgPool) -> Result<MealPlanner> {
    let oracle: Arc<dyn PlanningOracle> = match &config.anthropic {
        Some(cfg) => Arc::new(AnthropicOracle::new(cfg.clone())?),
        None => {
            debug!("anthropic not configured");
            Arc::new(Unconfigured::ANTHROPIC)
        }
    };
    let recipes: Arc<dyn RecipeService> = match &config.mealie {
        Some(cfg) => Arc::new(MealieClient::new(cfg.clone())?),
        None => {
            debug!("mealie not configured");
            Arc::new(Unconfigured::MEALIE)
        }
    };
    let grocery: Arc<dyn GroceryApi> = match &config.instacart {
        Some(cfg) => Arc::new(InstacartClient::new(cfg.clone())?),
        None => {
            debug!("instacart not configured");
            Arc::new(Unconfigured::INSTACART)
        }
    };

    Ok(MealPlanner::new(
        Arc::new(PgStore::new(pool)),
        oracle,
        recipes,
        grocery,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_service_names_the_missing_setting() {
        let err = Unconfigured::INSTACART.create_cart().await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Instacart is not configured"), "{msg}");
        assert!(msg.contains("INSTACART_STORE_ID"), "{msg}");
    }

    #[tokio::test]
    async fn unconfigured_recipe_service_fails_every_call() {
        let recipes: Arc<dyn RecipeService> = Arc::new(Unconfigured::MEALIE);
        assert!(recipes.list_recipes(10).await.is_err());
        assert!(recipes.household_id().await.is_err());
    }
}

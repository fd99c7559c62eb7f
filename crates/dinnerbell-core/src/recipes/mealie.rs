//! HTTP client for a Mealie recipe server.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{
    HouseholdApi, MealPlanEntry, NewMealPlanEntry, RecipeCatalog, RecipeDetail, RecipeSummary,
    ShoppingListSummary,
};
use crate::http;

/// Connection settings for a Mealie server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealieConfig {
    pub base_url: String,
    pub token: String,
}

impl MealieConfig {
    pub const DEFAULT_URL: &'static str = "http://localhost:9000";
}

/// A list endpoint answers either with a page or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Page { items: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page { items } | Self::Bare(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

/// Households come back paginated, as a bare array, or as one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Households {
    Page { items: Vec<IdOnly> },
    Bare(Vec<IdOnly>),
    Single(IdOnly),
}

impl Households {
    fn first_id(self) -> Option<String> {
        match self {
            Self::Page { items } | Self::Bare(items) => items.into_iter().next().map(|h| h.id),
            Self::Single(h) => Some(h.id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecipeReference {
    #[serde(rename = "recipeId")]
    recipe_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShoppingListItem {
    #[serde(default)]
    recipe_id: Option<String>,
    #[serde(default)]
    recipe_references: Vec<RecipeReference>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShoppingListDetail {
    #[serde(default)]
    list_items: Vec<ShoppingListItem>,
}

/// Mealie REST client. Bearer-token auth, one request per call.
pub struct MealieClient {
    client: Client,
    config: MealieConfig,
}

impl MealieClient {
    pub fn new(config: MealieConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        http::join_url(&self.config.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        debug!(path, "mealie GET");
        let request = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.token);
        http::send_json(request, what).await
    }
}

#[async_trait]
impl RecipeCatalog for MealieClient {
    async fn list_recipes(&self, limit: usize) -> Result<Vec<RecipeSummary>> {
        let request = self
            .client
            .get(self.url("/api/recipes"))
            .bearer_auth(&self.config.token)
            .query(&[("perPage", limit)]);
        let listing: Listing<RecipeSummary> = http::send_json(request, "list recipes").await?;
        Ok(listing.into_vec())
    }

    async fn get_recipe(&self, id: &str) -> Result<RecipeDetail> {
        self.get(&format!("/api/recipes/{id}"), "get recipe").await
    }
}

#[async_trait]
impl HouseholdApi for MealieClient {
    async fn household_id(&self) -> Result<Option<String>> {
        let households: Households = self
            .get("/api/groups/households", "list households")
            .await?;
        Ok(households.first_id())
    }

    async fn user_id(&self) -> Result<Option<String>> {
        let user: IdOnly = self.get("/api/users/self", "get current user").await?;
        Ok(Some(user.id).filter(|id| !id.is_empty()))
    }

    async fn list_meal_plan_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MealPlanEntry>> {
        let request = self
            .client
            .get(self.url("/api/households/mealplans"))
            .bearer_auth(&self.config.token)
            .query(&[
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
            ]);
        let listing: Listing<MealPlanEntry> =
            http::send_json(request, "list meal plan entries").await?;
        Ok(listing.into_vec())
    }

    async fn create_meal_plan_entry(&self, entry: &NewMealPlanEntry) -> Result<()> {
        let request = self
            .client
            .post(self.url("/api/households/mealplans"))
            .bearer_auth(&self.config.token)
            .json(entry);
        http::send(request, "create meal plan entry").await?;
        Ok(())
    }

    async fn list_shopping_lists(&self) -> Result<Vec<ShoppingListSummary>> {
        let listing: Listing<ShoppingListSummary> = self
            .get("/api/households/shopping/lists", "list shopping lists")
            .await?;
        Ok(listing.into_vec())
    }

    async fn create_shopping_list(&self, name: &str) -> Result<ShoppingListSummary> {
        let request = self
            .client
            .post(self.url("/api/households/shopping/lists"))
            .bearer_auth(&self.config.token)
            .json(&json!({ "name": name }));
        http::send_json(request, "create shopping list").await
    }

    async fn shopping_list_recipe_ids(&self, list_id: &str) -> Result<Vec<String>> {
        let detail: ShoppingListDetail = self
            .get(
                &format!("/api/households/shopping/lists/{list_id}"),
                "get shopping list",
            )
            .await?;

        let mut ids = Vec::new();
        for item in detail.list_items {
            let referenced = item
                .recipe_references
                .into_iter()
                .filter_map(|r| r.recipe_id);
            for id in item.recipe_id.into_iter().chain(referenced) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    async fn add_recipe_to_shopping_list(
        &self,
        list_id: &str,
        recipe: &RecipeDetail,
    ) -> Result<()> {
        let body = json!([{
            "recipeId": recipe.id,
            "recipeIncrementQuantity": 1,
            "recipeIngredients": recipe.ingredients,
        }]);
        let request = self
            .client
            .post(self.url(&format!(
                "/api/households/shopping/lists/{list_id}/recipe"
            )))
            .bearer_auth(&self.config.token)
            .json(&body);
        http::send(request, "add recipe to shopping list").await?;
        Ok(())
    }
}

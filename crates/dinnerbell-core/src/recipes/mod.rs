//! Recipe service boundary: the read-only catalog and the household
//! meal-plan and shopping-list resources.

mod mealie;

pub use mealie::{MealieClient, MealieConfig};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// How many recipes a catalog listing asks for.
pub const CATALOG_PAGE_SIZE: usize = 100;

/// Meal-plan entry type this system writes and reconciles against.
pub const DINNER_ENTRY_TYPE: &str = "dinner";

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A `{name, ...}` reference such as an ingredient's food or unit.
///
/// Unknown fields are kept so the record can be forwarded unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One ingredient line of a recipe, as the recipe service reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[serde(default)]
    pub food: Option<NamedRef>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, rename = "originalText", alias = "original_text")]
    pub original_text: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<NamedRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        default,
        rename = "recipeIngredient",
        deserialize_with = "null_as_default"
    )]
    pub ingredients: Vec<RecipeIngredient>,
}

// ---------------------------------------------------------------------------
// Household types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry_type: String,
    #[serde(default)]
    pub recipe_id: Option<String>,
}

/// Body of a meal-plan entry create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMealPlanEntry {
    pub date: NaiveDate,
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub title: String,
    pub text: String,
    pub group_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-only recipe listing and detail. No caching.
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    async fn list_recipes(&self, limit: usize) -> Result<Vec<RecipeSummary>>;

    async fn get_recipe(&self, id: &str) -> Result<RecipeDetail>;
}

/// Household-scoped resources on the recipe service.
///
/// Implementations only create; nothing here edits or deletes remote state.
#[async_trait]
pub trait HouseholdApi: Send + Sync {
    /// The first household visible to the token, if any.
    async fn household_id(&self) -> Result<Option<String>>;

    async fn user_id(&self) -> Result<Option<String>>;

    /// Meal-plan entries with dates in `start..=end`.
    async fn list_meal_plan_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MealPlanEntry>>;

    async fn create_meal_plan_entry(&self, entry: &NewMealPlanEntry) -> Result<()>;

    async fn list_shopping_lists(&self) -> Result<Vec<ShoppingListSummary>>;

    async fn create_shopping_list(&self, name: &str) -> Result<ShoppingListSummary>;

    /// Recipe ids already referenced by items on a shopping list.
    async fn shopping_list_recipe_ids(&self, list_id: &str) -> Result<Vec<String>>;

    /// Add a recipe, with its full ingredient data, to a shopping list.
    async fn add_recipe_to_shopping_list(&self, list_id: &str, recipe: &RecipeDetail)
    -> Result<()>;
}

/// Both halves of the recipe service.
pub trait RecipeService: RecipeCatalog + HouseholdApi {}

impl<T> RecipeService for T where T: RecipeCatalog + HouseholdApi {}

//! In-process fakes for the remote services the planner drives.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use uuid::Uuid;

use dinnerbell_core::MealPlanner;
use dinnerbell_core::grocery::{Cart, CartItem, CheckoutReceipt, GroceryApi, Product};
use dinnerbell_core::http::HttpStatusError;
use dinnerbell_core::oracle::PlanningOracle;
use dinnerbell_core::recipes::{
    HouseholdApi, MealPlanEntry, NamedRef, NewMealPlanEntry, RecipeCatalog, RecipeDetail,
    RecipeIngredient, RecipeSummary, ShoppingListSummary,
};
use dinnerbell_core::store::MemoryStore;
use dinnerbell_db::models::{FamilyMember, Preferences};

// ---------------------------------------------------------------------------
// Recipe service
// ---------------------------------------------------------------------------

pub fn ingredient(food: &str, quantity: Option<f64>, unit: &str) -> RecipeIngredient {
    RecipeIngredient {
        food: Some(NamedRef {
            name: Some(food.into()),
            ..Default::default()
        }),
        quantity,
        unit: Some(NamedRef {
            name: Some(unit.into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
pub struct RemoteList {
    pub summary: ShoppingListSummary,
    pub recipe_ids: Vec<String>,
}

#[derive(Default)]
pub struct FakeRecipeService {
    pub catalog: Mutex<Vec<RecipeSummary>>,
    pub details: Mutex<HashMap<String, RecipeDetail>>,
    pub household: Mutex<Option<String>>,
    pub household_unreachable: AtomicBool,
    pub entries: Mutex<Vec<MealPlanEntry>>,
    pub created_entries: Mutex<Vec<NewMealPlanEntry>>,
    pub lists: Mutex<Vec<RemoteList>>,
    pub failing_dates: Mutex<HashSet<NaiveDate>>,
    pub failing_recipe_adds: Mutex<HashSet<String>>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub household_calls: AtomicUsize,
}

impl FakeRecipeService {
    pub fn new() -> Self {
        let fake = Self::default();
        *fake.household.lock().unwrap() = Some("household-1".into());
        fake
    }

    pub fn add_recipe(&self, id: &str, name: &str, ingredients: Vec<RecipeIngredient>) {
        self.catalog.lock().unwrap().push(RecipeSummary {
            id: id.into(),
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
        });
        self.details.lock().unwrap().insert(
            id.into(),
            RecipeDetail {
                id: id.into(),
                name: name.into(),
                ingredients,
            },
        );
    }

    pub fn add_list(&self, id: &str, name: &str, recipe_ids: &[&str]) {
        self.lists.lock().unwrap().push(RemoteList {
            summary: ShoppingListSummary {
                id: id.into(),
                name: name.into(),
            },
            recipe_ids: recipe_ids.iter().map(|s| s.to_string()).collect(),
        });
    }

    pub fn dinner_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.entry_type == "dinner")
            .map(|e| e.date)
            .collect();
        dates.sort();
        dates
    }
}

#[async_trait]
impl RecipeCatalog for FakeRecipeService {
    async fn list_recipes(&self, limit: usize) -> Result<Vec<RecipeSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn get_recipe(&self, id: &str) -> Result<RecipeDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("recipe {id} not found"))
    }
}

#[async_trait]
impl HouseholdApi for FakeRecipeService {
    async fn household_id(&self) -> Result<Option<String>> {
        self.household_calls.fetch_add(1, Ordering::SeqCst);
        if self.household_unreachable.load(Ordering::SeqCst) {
            bail!("HTTP 503 Service Unavailable");
        }
        Ok(self.household.lock().unwrap().clone())
    }

    async fn user_id(&self) -> Result<Option<String>> {
        Ok(Some("user-1".into()))
    }

    async fn list_meal_plan_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MealPlanEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect())
    }

    async fn create_meal_plan_entry(&self, entry: &NewMealPlanEntry) -> Result<()> {
        if self.failing_dates.lock().unwrap().contains(&entry.date) {
            bail!("HTTP 500 creating entry for {}", entry.date);
        }
        self.entries.lock().unwrap().push(MealPlanEntry {
            date: entry.date,
            entry_type: entry.entry_type.clone(),
            recipe_id: entry.recipe_id.clone(),
        });
        self.created_entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_shopping_lists(&self) -> Result<Vec<ShoppingListSummary>> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.summary.clone())
            .collect())
    }

    async fn create_shopping_list(&self, name: &str) -> Result<ShoppingListSummary> {
        let mut lists = self.lists.lock().unwrap();
        let summary = ShoppingListSummary {
            id: format!("list-{}", lists.len() + 1),
            name: name.into(),
        };
        lists.push(RemoteList {
            summary: summary.clone(),
            recipe_ids: Vec::new(),
        });
        Ok(summary)
    }

    async fn shopping_list_recipe_ids(&self, list_id: &str) -> Result<Vec<String>> {
        self.lists
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.summary.id == list_id)
            .map(|l| l.recipe_ids.clone())
            .ok_or_else(|| anyhow!("list {list_id} not found"))
    }

    async fn add_recipe_to_shopping_list(
        &self,
        list_id: &str,
        recipe: &RecipeDetail,
    ) -> Result<()> {
        if self.failing_recipe_adds.lock().unwrap().contains(&recipe.id) {
            bail!("HTTP 500 adding recipe {}", recipe.id);
        }
        let mut lists = self.lists.lock().unwrap();
        let list = lists
            .iter_mut()
            .find(|l| l.summary.id == list_id)
            .ok_or_else(|| anyhow!("list {list_id} not found"))?;
        list.recipe_ids.push(recipe.id.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Grocery service
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeGrocery {
    /// Products returned per lowercase query.
    pub products: Mutex<HashMap<String, Vec<Product>>>,
    pub failing_searches: Mutex<HashSet<String>>,
    /// Checkout times out with no answer.
    pub fail_checkout: AtomicBool,
    /// Checkout is refused with a 422.
    pub reject_checkout: AtomicBool,
    pub carts_created: AtomicUsize,
    pub added: Mutex<Vec<(String, Vec<CartItem>)>>,
    pub checkouts: Mutex<Vec<(String, DateTime<Utc>, Uuid)>>,
}

impl FakeGrocery {
    pub fn stock(&self, query: &str, product_id: &str) {
        self.products
            .lock()
            .unwrap()
            .entry(query.to_lowercase())
            .or_default()
            .push(Product {
                id: product_id.into(),
                name: query.into(),
            });
    }
}

#[async_trait]
impl GroceryApi for FakeGrocery {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let key = query.to_lowercase();
        if self.failing_searches.lock().unwrap().contains(&key) {
            bail!("HTTP 502 searching {query}");
        }
        Ok(self
            .products
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_cart(&self) -> Result<Cart> {
        let n = self.carts_created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Cart {
            id: format!("cart-{n}"),
        })
    }

    async fn add_items(&self, cart_id: &str, items: &[CartItem]) -> Result<()> {
        self.added
            .lock()
            .unwrap()
            .push((cart_id.into(), items.to_vec()));
        Ok(())
    }

    async fn checkout(
        &self,
        cart_id: &str,
        pickup_time: DateTime<Utc>,
        idempotency_key: Uuid,
    ) -> Result<CheckoutReceipt> {
        self.checkouts
            .lock()
            .unwrap()
            .push((cart_id.into(), pickup_time, idempotency_key));
        if self.fail_checkout.load(Ordering::SeqCst) {
            bail!("checkout: request failed: operation timed out");
        }
        if self.reject_checkout.load(Ordering::SeqCst) {
            return Err(HttpStatusError {
                what: "checkout".into(),
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: "pickup window unavailable".into(),
            }
            .into());
        }
        Ok(CheckoutReceipt {
            id: format!("order-for-{cart_id}"),
            status: Some("confirmed".into()),
        })
    }

    async fn store_availability(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "available": true }))
    }
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

pub struct ScriptedOracle {
    pub response: Mutex<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PlanningOracle for ScriptedOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(self.response.lock().unwrap().clone())
    }
}

/// A seven-dinner oracle response, Monday through Sunday.
pub fn week_response(recipes: &[&str; 7]) -> String {
    let days = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let meals: Vec<_> = days
        .iter()
        .zip(recipes)
        .map(|(day, recipe)| {
            serde_json::json!({"day": day, "recipe_name": recipe, "reason": "fits the week"})
        })
        .collect();
    format!(
        "```json\n{}\n```",
        serde_json::json!({"meal_plan": meals, "notes": "balanced week"})
    )
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub fn preferences() -> Preferences {
    Preferences {
        family_members: vec![
            FamilyMember {
                name: "Ada".into(),
                allergies: vec!["peanuts".into()],
                dislikes: vec!["mushrooms".into()],
                likes: vec!["pasta".into()],
            },
            FamilyMember {
                name: "Ben".into(),
                allergies: vec![],
                dislikes: vec![],
                likes: vec![],
            },
        ],
        dietary_restrictions: vec![],
        cooking_time_max: 45,
        budget_per_week: None,
        notes: None,
    }
}

pub struct Harness {
    pub planner: MealPlanner,
    pub store: Arc<MemoryStore>,
    pub recipes: Arc<FakeRecipeService>,
    pub grocery: Arc<FakeGrocery>,
    pub oracle: Arc<ScriptedOracle>,
}

impl Harness {
    pub fn new(oracle_response: impl Into<String>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let recipes = Arc::new(FakeRecipeService::new());
        let grocery = Arc::new(FakeGrocery::default());
        let oracle = Arc::new(ScriptedOracle::new(oracle_response));
        let planner = MealPlanner::new(
            store.clone(),
            oracle.clone(),
            recipes.clone(),
            grocery.clone(),
        );
        Self {
            planner,
            store,
            recipes,
            grocery,
            oracle,
        }
    }
}

//! Ingredient consolidation: recipe ingredient records in, one shopping
//! list line per distinct ingredient out.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use dinnerbell_db::models::{MealAssignment, ShoppingListItem};

use crate::recipes::{CATALOG_PAGE_SIZE, RecipeCatalog, RecipeIngredient, RecipeSummary};

/// An ingredient attributed to the recipe it came from, before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub recipe: String,
}

/// Result of [`build_shopping_list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consolidation {
    pub items: Vec<ShoppingListItem>,
    /// Recipe names that had no catalog match.
    pub unresolved_meals: Vec<String>,
    /// Catalog recipe id for each meal, by position; `None` when unresolved.
    pub recipe_ids: Vec<Option<String>>,
}

/// Display name of an ingredient: food name, then note, then original text.
///
/// Blank candidates are skipped; `None` means the ingredient has no usable
/// name.
pub fn ingredient_name(ing: &RecipeIngredient) -> Option<String> {
    let food = ing.food.as_ref().and_then(|f| f.name.as_deref());
    [food, ing.note.as_deref(), ing.original_text.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Quantity of an ingredient. Absent, zero, or non-finite counts as one.
pub fn ingredient_quantity(ing: &RecipeIngredient) -> f64 {
    match ing.quantity {
        Some(q) if q.is_finite() && q != 0.0 => q,
        _ => 1.0,
    }
}

/// Turn a recipe ingredient into a line attributed to `recipe`.
pub fn ingredient_line(ing: &RecipeIngredient, recipe: &str) -> Option<IngredientLine> {
    let name = ingredient_name(ing)?;
    let unit = ing
        .unit
        .as_ref()
        .and_then(|u| u.name.clone())
        .unwrap_or_default();
    Some(IngredientLine {
        name,
        quantity: ingredient_quantity(ing),
        unit,
        recipe: recipe.to_owned(),
    })
}

/// Merge lines by case-insensitive name.
///
/// The first occurrence fixes the item's name, unit and recipe; later ones
/// only add to its quantity. Items come out in first-seen order.
pub fn consolidate<I>(lines: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = IngredientLine>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<ShoppingListItem> = Vec::new();

    for line in lines {
        let key = line.name.to_lowercase();
        match index.get(&key) {
            Some(&i) => items[i].quantity += line.quantity,
            None => {
                index.insert(key, items.len());
                items.push(ShoppingListItem {
                    name: line.name,
                    quantity: line.quantity,
                    unit: line.unit,
                    recipe: line.recipe,
                });
            }
        }
    }

    items
}

/// Find a recipe by case-insensitive exact name.
pub fn find_recipe<'a>(catalog: &'a [RecipeSummary], name: &str) -> Option<&'a RecipeSummary> {
    let wanted = name.to_lowercase();
    catalog.iter().find(|r| r.name.to_lowercase() == wanted)
}

/// Resolve meals against the catalog and consolidate their ingredients.
///
/// The catalog is listed once per call. Recipe detail is fetched for every
/// meal occurrence, so a recipe used twice contributes twice. Remote errors
/// propagate; unresolved meals are reported, not errors.
pub async fn build_shopping_list<C>(catalog: &C, meals: &[MealAssignment]) -> Result<Consolidation>
where
    C: RecipeCatalog + ?Sized,
{
    let recipes = catalog.list_recipes(CATALOG_PAGE_SIZE).await?;

    let mut lines = Vec::new();
    let mut unresolved_meals = Vec::new();
    let mut recipe_ids = Vec::with_capacity(meals.len());

    for meal in meals {
        let Some(summary) = find_recipe(&recipes, &meal.recipe_name) else {
            debug!(recipe = %meal.recipe_name, "meal has no catalog match");
            unresolved_meals.push(meal.recipe_name.clone());
            recipe_ids.push(None);
            continue;
        };

        let detail = catalog.get_recipe(&summary.id).await?;
        lines.extend(
            detail
                .ingredients
                .iter()
                .filter_map(|ing| ingredient_line(ing, &meal.recipe_name)),
        );
        recipe_ids.push(Some(summary.id.clone()));
    }

    let items = consolidate(lines);
    info!(
        meals = meals.len(),
        items = items.len(),
        unresolved = unresolved_meals.len(),
        "shopping list consolidated"
    );

    Ok(Consolidation {
        items,
        unresolved_meals,
        recipe_ids,
    })
}

//! Grocery service boundary and the cart-filling policy.

mod instacart;

pub use instacart::{InstacartClient, InstacartConfig};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use dinnerbell_db::models::ShoppingListItem;

/// Remote identities arrive as strings or bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait GroceryApi: Send + Sync {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>>;

    async fn create_cart(&self) -> Result<Cart>;

    async fn add_items(&self, cart_id: &str, items: &[CartItem]) -> Result<()>;

    /// Submit a cart for pickup. Repeating a call with the same
    /// `idempotency_key` must not produce a second order.
    async fn checkout(
        &self,
        cart_id: &str,
        pickup_time: DateTime<Utc>,
        idempotency_key: Uuid,
    ) -> Result<CheckoutReceipt>;

    /// Raw availability document for the configured store.
    async fn store_availability(&self) -> Result<serde_json::Value>;
}

/// Whole units to order for a consolidated quantity; never less than one.
pub fn order_quantity(quantity: f64) -> u32 {
    let floored = quantity.floor();
    if floored.is_nan() || floored < 1.0 {
        1
    } else if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        // In range and integral after the checks above.
        floored as u32
    }
}

/// What [`OrderAdapter::fill_cart`] put in the cart and what it could not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartFill {
    pub lines: Vec<CartItem>,
    /// Items whose search returned no products.
    pub unmatched: Vec<String>,
    /// Items whose search failed remotely. Also counted as unmatched.
    pub search_failures: Vec<String>,
}

/// Matches shopping-list items to products and fills a cart.
pub struct OrderAdapter<'a> {
    api: &'a dyn GroceryApi,
}

impl<'a> OrderAdapter<'a> {
    pub fn new(api: &'a dyn GroceryApi) -> Self {
        Self { api }
    }

    /// Search for a product by name. A remote failure reads as no results.
    async fn search(&self, query: &str) -> (Vec<Product>, bool) {
        match self.api.search_products(query).await {
            Ok(products) => (products, false),
            Err(e) => {
                warn!(query, error = %e, "product search failed");
                (Vec::new(), true)
            }
        }
    }

    /// Search every item, take the first product, and add all matches in a
    /// single call. Nothing is added when nothing matched.
    pub async fn fill_cart(&self, cart_id: &str, items: &[ShoppingListItem]) -> Result<CartFill> {
        let mut fill = CartFill::default();

        for item in items {
            let (products, failed) = self.search(&item.name).await;
            if failed {
                fill.search_failures.push(item.name.clone());
            }
            match products.into_iter().next() {
                Some(product) => {
                    debug!(item = %item.name, product_id = %product.id, "matched product");
                    fill.lines.push(CartItem {
                        product_id: product.id,
                        quantity: order_quantity(item.quantity),
                    });
                }
                None => fill.unmatched.push(item.name.clone()),
            }
        }

        if !fill.lines.is_empty() {
            self.api.add_items(cart_id, &fill.lines).await?;
        }

        info!(
            cart_id,
            matched = fill.lines.len(),
            unmatched = fill.unmatched.len(),
            search_failures = fill.search_failures.len(),
            "cart filled"
        );
        Ok(fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_quantity_floors_with_minimum_one() {
        assert_eq!(order_quantity(0.25), 1);
        assert_eq!(order_quantity(1.0), 1);
        assert_eq!(order_quantity(2.9), 2);
        assert_eq!(order_quantity(3.0), 3);
        assert_eq!(order_quantity(-4.0), 1);
        assert_eq!(order_quantity(f64::NAN), 1);
    }

    #[test]
    fn ids_accept_numbers_and_strings() {
        let p: Product = serde_json::from_str(r#"{"id": 42, "name": "Onion"}"#).unwrap();
        assert_eq!(p.id, "42");
        let c: Cart = serde_json::from_str(r#"{"id": "cart-7"}"#).unwrap();
        assert_eq!(c.id, "cart-7");
    }
}

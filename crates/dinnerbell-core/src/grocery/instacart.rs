//! HTTP client for the Instacart Connect API.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::{Cart, CartItem, CheckoutReceipt, GroceryApi, Product};
use crate::http;

/// Results requested per product search.
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstacartConfig {
    pub access_token: String,
    pub retailer_id: String,
    pub store_id: String,
    pub base_url: String,
}

impl InstacartConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://connect.instacart.com/v2";
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

pub struct InstacartClient {
    client: Client,
    config: InstacartConfig,
}

impl InstacartClient {
    pub fn new(config: InstacartConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        http::join_url(&self.config.base_url, path)
    }

    fn location_path(&self) -> String {
        format!(
            "/retailers/{}/locations/{}",
            self.config.retailer_id, self.config.store_id
        )
    }
}

#[async_trait]
impl GroceryApi for InstacartClient {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        debug!(query, "instacart product search");
        let request = self
            .client
            .get(self.url(&format!("{}/products/search", self.location_path())))
            .bearer_auth(&self.config.access_token)
            .query(&[("q", query.to_owned()), ("limit", SEARCH_LIMIT.to_string())]);
        let response: SearchResponse = http::send_json(request, "search products").await?;
        Ok(response.products)
    }

    async fn create_cart(&self) -> Result<Cart> {
        let request = self
            .client
            .post(self.url("/carts"))
            .bearer_auth(&self.config.access_token)
            .json(&json!({
                "retailer_id": self.config.retailer_id,
                "location_id": self.config.store_id,
            }));
        http::send_json(request, "create cart").await
    }

    async fn add_items(&self, cart_id: &str, items: &[CartItem]) -> Result<()> {
        let request = self
            .client
            .post(self.url(&format!("/carts/{cart_id}/items")))
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "items": items }));
        http::send(request, "add cart items").await?;
        Ok(())
    }

    async fn checkout(
        &self,
        cart_id: &str,
        pickup_time: DateTime<Utc>,
        idempotency_key: Uuid,
    ) -> Result<CheckoutReceipt> {
        let request = self
            .client
            .post(self.url(&format!("/carts/{cart_id}/checkout")))
            .bearer_auth(&self.config.access_token)
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(&json!({
                "service_option": {
                    "type": "pickup",
                    "requested_start_at": pickup_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                }
            }));
        http::send_json(request, "checkout").await
    }

    async fn store_availability(&self) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(self.url(&format!("{}/availability", self.location_path())))
            .bearer_auth(&self.config.access_token);
        http::send_json(request, "store availability").await
    }
}

//! Database query functions for the `orders` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Order, OrderStatus};

/// Insert an order, or update its status and external identity if the id
/// already exists.
pub async fn upsert_order(pool: &PgPool, order: &Order) -> Result<()> {
    sqlx::query(
        "INSERT INTO orders \
             (id, plan_id, status, idempotency_key, external_order_id, cart_id, pickup_time, created_at, placed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (id) DO UPDATE SET \
             status = EXCLUDED.status, \
             external_order_id = EXCLUDED.external_order_id, \
             cart_id = EXCLUDED.cart_id, \
             pickup_time = EXCLUDED.pickup_time, \
             placed_at = EXCLUDED.placed_at",
    )
    .bind(order.id)
    .bind(order.plan_id)
    .bind(order.status)
    .bind(order.idempotency_key)
    .bind(&order.external_order_id)
    .bind(&order.cart_id)
    .bind(order.pickup_time)
    .bind(order.created_at)
    .bind(order.placed_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to save order {}", order.id))?;

    Ok(())
}

/// All orders, oldest first.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
        .context("failed to list orders")?;

    Ok(orders)
}

/// The checkout left in flight for a plan, if any.
pub async fn find_in_flight_order(pool: &PgPool, plan_id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE plan_id = $1 AND status = $2",
    )
    .bind(plan_id)
    .bind(OrderStatus::CheckoutPending)
    .fetch_optional(pool)
    .await
    .context("failed to look up in-flight order")?;

    Ok(order)
}

/// Delete an order record. Deleting a missing id is not an error.
pub async fn delete_order(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete order {id}"))?;

    Ok(())
}

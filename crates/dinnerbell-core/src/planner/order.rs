use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use dinnerbell_db::models::{Order, OrderStatus, PlanStatus};

use super::MealPlanner;
use crate::error::Result;
use crate::grocery::{CartFill, CheckoutReceipt, GroceryApi, OrderAdapter};
use crate::http::HttpStatusError;
use crate::state::PlanStateMachine;
use crate::store::{OrderStore, PlanStore};

/// Outcome of [`MealPlanner::place_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub receipt: CheckoutReceipt,
    pub fill: CartFill,
    /// The idempotency key came from a checkout left in flight earlier.
    pub resumed: bool,
}

impl MealPlanner {
    /// Order an approved plan's shopping list for pickup.
    ///
    /// A `checkout_pending` order is saved before the checkout call and
    /// carries the key the grocery service deduplicates on. If an earlier
    /// attempt left one behind, its key is reused. A failed checkout leaves
    /// the plan approved. The record stays in flight unless the grocery
    /// service outright rejected a fresh key, since a timed-out or resumed
    /// checkout may already have gone through remotely.
    pub async fn place_order(
        &self,
        plan_id: Uuid,
        pickup_time: DateTime<Utc>,
    ) -> Result<PlacedOrder> {
        let mut plan = self.require_plan(plan_id).await?;
        PlanStateMachine::ensure_transition(&plan, PlanStatus::Ordered, "place an order for")?;

        let in_flight = self.store.find_in_flight_order(plan_id).await?;
        let resumed = in_flight.is_some();
        if let Some(prior) = &in_flight {
            info!(%plan_id, order_id = %prior.id, "resuming in-flight checkout");
        }

        let cart = self.grocery.create_cart().await?;
        let fill = OrderAdapter::new(&*self.grocery)
            .fill_cart(&cart.id, &plan.shopping_list)
            .await?;

        let mut order = match in_flight {
            Some(prior) => Order {
                cart_id: cart.id.clone(),
                pickup_time,
                ..prior
            },
            None => Order {
                id: Uuid::new_v4(),
                plan_id,
                status: OrderStatus::CheckoutPending,
                idempotency_key: Uuid::new_v4(),
                external_order_id: None,
                cart_id: cart.id.clone(),
                pickup_time,
                created_at: Utc::now(),
                placed_at: None,
            },
        };
        self.store.put_order(&order).await?;

        let receipt = match self
            .grocery
            .checkout(&cart.id, pickup_time, order.idempotency_key)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                let rejected = e
                    .downcast_ref::<HttpStatusError>()
                    .is_some_and(HttpStatusError::is_rejection);
                if rejected && !resumed {
                    if let Err(cleanup) = self.store.delete_order(order.id).await {
                        warn!(order_id = %order.id, error = %cleanup, "failed to remove rejected order");
                    }
                } else {
                    warn!(
                        %plan_id,
                        order_id = %order.id,
                        error = %e,
                        "checkout outcome unknown, keeping in-flight order for retry"
                    );
                }
                return Err(e.context(format!("checkout failed for plan {plan_id}")).into());
            }
        };

        order.status = OrderStatus::Placed;
        order.external_order_id = Some(receipt.id.clone());
        order.placed_at = Some(Utc::now());
        self.store.put_order(&order).await?;

        plan.status = PlanStatus::Ordered;
        self.store.put_plan(&plan).await?;

        info!(
            %plan_id,
            order_id = %order.id,
            external_order_id = %receipt.id,
            lines = fill.lines.len(),
            unmatched = fill.unmatched.len(),
            "grocery order placed"
        );
        Ok(PlacedOrder {
            order,
            receipt,
            fill,
            resumed,
        })
    }
}

//! CLI handlers for `dinnerbell order` subcommands.

use anyhow::Result;

use dinnerbell_core::MealPlanner;

use crate::OrderCommands;
use crate::input::{parse_id, parse_pickup};

pub async fn run_order_command(command: OrderCommands, planner: &MealPlanner) -> Result<()> {
    match command {
        OrderCommands::Place { plan_id, pickup } => {
            let id = parse_id("plan", &plan_id)?;
            let pickup_time = parse_pickup(&pickup)?;
            let placed = planner.place_order(id, pickup_time).await?;

            if placed.resumed {
                println!("Resumed an earlier checkout for this plan.");
            }
            println!("Order placed.");
            println!("  Order ID:       {}", placed.order.id);
            println!("  Grocery order:  {}", placed.receipt.id);
            if let Some(status) = &placed.receipt.status {
                println!("  Status:         {status}");
            }
            println!(
                "  Pickup:         {}",
                placed.order.pickup_time.format("%Y-%m-%d %H:%M UTC")
            );
            println!("  Cart lines:     {}", placed.fill.lines.len());
            if !placed.fill.unmatched.is_empty() {
                println!();
                println!("No product found for:");
                for name in &placed.fill.unmatched {
                    println!("  - {name}");
                }
            }
            if !placed.fill.search_failures.is_empty() {
                println!();
                println!("Product search failed for:");
                for name in &placed.fill.search_failures {
                    println!("  - {name}");
                }
            }
            Ok(())
        }
        OrderCommands::List => {
            let orders = planner.orders().await?;
            if orders.is_empty() {
                println!("No orders placed.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<36}  {:<16}  {:<16}  EXTERNAL",
                "ID", "PLAN", "STATUS", "PICKUP"
            );
            for order in &orders {
                println!(
                    "{:<36}  {:<36}  {:<16}  {:<16}  {}",
                    order.id,
                    order.plan_id,
                    order.status,
                    order.pickup_time.format("%Y-%m-%d %H:%M").to_string(),
                    order.external_order_id.as_deref().unwrap_or("-"),
                );
            }
            Ok(())
        }
        OrderCommands::Availability => {
            let availability = planner.store_availability().await?;
            println!("{}", serde_json::to_string_pretty(&availability)?);
            Ok(())
        }
    }
}

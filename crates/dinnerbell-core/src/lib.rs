//! Weekly dinner planning: the plan lifecycle and the adapters it drives.

pub mod consolidate;
pub mod error;
pub mod grocery;
pub mod http;
pub mod oracle;
pub mod planner;
pub mod recipes;
pub mod state;
pub mod store;
pub mod sync;
pub mod week;

pub use error::PlannerError;
pub use planner::MealPlanner;

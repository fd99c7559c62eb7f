//! Meal plan status transitions.

use dinnerbell_db::models::{MealPlan, PlanStatus};

use crate::error::{PlannerError, Result};

/// The plan state machine.
///
/// ```text
/// pending  -> approved
/// approved -> approved  (re-approval re-runs consolidation and sync)
/// approved -> ordered
/// ```
///
/// `ordered` is terminal.
pub struct PlanStateMachine;

impl PlanStateMachine {
    pub fn is_valid_transition(from: PlanStatus, to: PlanStatus) -> bool {
        matches!(
            (from, to),
            (PlanStatus::Pending, PlanStatus::Approved)
                | (PlanStatus::Approved, PlanStatus::Approved)
                | (PlanStatus::Approved, PlanStatus::Ordered)
        )
    }

    /// Fail with [`PlannerError::InvalidState`] unless `plan` may move to `to`.
    pub fn ensure_transition(plan: &MealPlan, to: PlanStatus, operation: &'static str) -> Result<()> {
        if Self::is_valid_transition(plan.status, to) {
            Ok(())
        } else {
            Err(PlannerError::InvalidState {
                plan_id: plan.id,
                status: plan.status,
                operation,
            })
        }
    }
}

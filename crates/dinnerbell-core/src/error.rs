//! Errors surfaced by the plan lifecycle operations.

use dinnerbell_db::models::PlanStatus;
use uuid::Uuid;

/// Failure of a [`crate::MealPlanner`] operation.
///
/// The named variants are the conditions a caller can act on; everything
/// else (store or remote-service failures) travels as [`PlannerError::Other`].
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Required local configuration is missing, e.g. no preferences saved.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The planning oracle returned something that is not a usable plan.
    #[error("planning oracle error: {0}")]
    PlanningOracle(String),

    /// Household or user identity could not be resolved on the recipe service.
    #[error("household resolution error: {0}")]
    HouseholdResolution(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("plan {plan_id} is {status}: cannot {operation}")]
    InvalidState {
        plan_id: Uuid,
        status: PlanStatus,
        operation: &'static str,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_operation_and_status() {
        let id = Uuid::nil();
        let err = PlannerError::InvalidState {
            plan_id: id,
            status: PlanStatus::Ordered,
            operation: "approve",
        };
        assert_eq!(
            err.to_string(),
            format!("plan {id} is ordered: cannot approve")
        );
    }

    #[test]
    fn anyhow_errors_pass_through_transparently() {
        let err: PlannerError = anyhow::anyhow!("connection refused").into();
        assert!(matches!(err, PlannerError::Other(_)));
        assert_eq!(err.to_string(), "connection refused");
    }
}

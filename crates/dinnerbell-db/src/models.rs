use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a meal plan.
///
/// Moves strictly forward: `pending -> approved -> ordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Approved,
    Ordered,
}

impl PlanStatus {
    /// Whether a plan in this status is eligible to be the "current" plan.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Ordered => "ordered",
        };
        f.pad(s)
    }
}

impl FromStr for PlanStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "ordered" => Ok(Self::Ordered),
            other => Err(StatusParseError {
                kind: "plan",
                value: other.to_owned(),
            }),
        }
    }
}

/// Status of a grocery order record.
///
/// A `checkout_pending` record is written before the remote checkout call
/// and promoted to `placed` once the grocery service confirms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    CheckoutPending,
    Placed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CheckoutPending => "checkout_pending",
            Self::Placed => "placed",
        };
        f.pad(s)
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout_pending" => Ok(Self::CheckoutPending),
            "placed" => Ok(Self::Placed),
            other => Err(StatusParseError {
                kind: "order",
                value: other.to_owned(),
            }),
        }
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {kind} status: {value:?}")]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Embedded (JSONB) value types
// ---------------------------------------------------------------------------

/// One member of the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub name: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    /// Foods this member likes.
    #[serde(default, alias = "preferences")]
    pub likes: Vec<String>,
}

/// A single dinner slot in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAssignment {
    pub day: String,
    pub recipe_name: String,
    #[serde(default)]
    pub reason: String,
    /// Recipe-service identity, filled in when the meal resolves against the
    /// catalog during approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
}

/// One consolidated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    /// First recipe that contributed this ingredient. Display only.
    #[serde(default)]
    pub recipe: String,
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// Household preferences. There is at most one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Preferences {
    #[sqlx(json)]
    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Maximum cooking time in minutes.
    pub cooking_time_max: i32,
    #[serde(default)]
    pub budget_per_week: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A feedback entry left by the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub plan_id: Option<Uuid>,
    pub liked_meals: Vec<String>,
    pub disliked_meals: Vec<String>,
    pub suggestions: String,
    pub created_at: DateTime<Utc>,
}

/// A week of dinners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealPlan {
    pub id: Uuid,
    pub week_start: NaiveDate,
    #[sqlx(json)]
    pub meals: Vec<MealAssignment>,
    pub notes: Option<String>,
    #[sqlx(json)]
    pub shopping_list: Vec<ShoppingListItem>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// A grocery pickup order placed for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub status: OrderStatus,
    /// Client-generated key sent with the checkout request.
    pub idempotency_key: Uuid,
    pub external_order_id: Option<String>,
    pub cart_id: String,
    pub pickup_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub placed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_status_display_roundtrip() {
        for v in [PlanStatus::Pending, PlanStatus::Approved, PlanStatus::Ordered] {
            let parsed: PlanStatus = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn order_status_uses_snake_case() {
        assert_eq!(OrderStatus::CheckoutPending.to_string(), "checkout_pending");
        assert_eq!(
            "checkout_pending".parse::<OrderStatus>().unwrap(),
            OrderStatus::CheckoutPending
        );
    }

    #[test]
    fn status_parse_error_names_kind() {
        let err = "shipped".parse::<PlanStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid plan status: \"shipped\"");
    }

    #[test]
    fn only_pending_and_approved_are_open() {
        assert!(PlanStatus::Pending.is_open());
        assert!(PlanStatus::Approved.is_open());
        assert!(!PlanStatus::Ordered.is_open());
    }

    #[test]
    fn family_member_accepts_preferences_alias() {
        let m: FamilyMember = serde_json::from_str(
            r#"{"name":"Ada","allergies":["peanuts"],"preferences":["pasta"]}"#,
        )
        .unwrap();
        assert_eq!(m.likes, vec!["pasta".to_string()]);
        assert!(m.dislikes.is_empty());
    }

    #[test]
    fn meal_assignment_omits_unresolved_recipe_id() {
        let meal = MealAssignment {
            day: "Monday".into(),
            recipe_name: "Tacos".into(),
            reason: "quick".into(),
            recipe_id: None,
        };
        let json = serde_json::to_value(&meal).unwrap();
        assert!(json.get("recipe_id").is_none());
    }
}

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Calendar month that usage is accounted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// 1-12
    pub month: i32,
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(month: i32, year: i32) -> Self {
        Self { month, year }
    }

    /// The period containing `instant`
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            month: instant.month() as i32,
            year: instant.year(),
        }
    }

    /// The current UTC month
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }
}

/// Per-user, per-month spending and scan counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub user_id: String,
    pub month: i32,
    pub year: i32,
    pub total_cost_cents: i64,
    pub monthly_limit_cents: i64,
    pub is_limit_reached: bool,
    pub food_scans_count: i64,
    pub food_scans_cached_count: i64,
    pub meal_plans_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Cents left before the ceiling; zero once it has been reached
    pub fn remaining_cents(&self) -> i64 {
        (self.monthly_limit_cents - self.total_cost_cents).max(0)
    }
}

/// What kind of billable event is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    FoodScan,
    CachedFoodScan,
    MealPlan,
}

/// Additive change applied to a usage record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageDelta {
    pub kind: UsageKind,
    pub cost_cents: i64,
}

impl UsageDelta {
    /// A scan answered by the AI gateway
    pub fn food_scan(cost_cents: i64) -> Self {
        Self {
            kind: UsageKind::FoodScan,
            cost_cents,
        }
    }

    /// A scan served from the cache; never costs anything
    pub fn cached_food_scan() -> Self {
        Self {
            kind: UsageKind::CachedFoodScan,
            cost_cents: 0,
        }
    }

    pub fn meal_plan(cost_cents: i64) -> Self {
        Self {
            kind: UsageKind::MealPlan,
            cost_cents,
        }
    }
}

//! Monthly budget gate for paid AI calls
//!
//! The gate only reads. It is consulted before every call that costs money
//! and answers from the user's usage record for the current month. Lookup
//! failures let the request through: a broken accounting table must not
//! take the scanner down with it.

use tracing::{debug, warn};

use crate::database::repositories::AiUsageSeaOrmRepository;
use crate::errors::BudgetDenial;
use crate::models::{BillingPeriod, Language, UsageRecord};

const LIMIT_REACHED_PT: &str =
    "Você atingiu o limite mensal de análises com IA. O limite será renovado no próximo mês.";
const LIMIT_REACHED_EN: &str =
    "You have reached your monthly AI analysis limit. It will reset next month.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetDecision {
    Allowed,
    Denied(BudgetDenial),
}

impl BudgetDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Clone)]
pub struct BudgetGate {
    usage_repository: AiUsageSeaOrmRepository,
}

impl BudgetGate {
    pub fn new(usage_repository: AiUsageSeaOrmRepository) -> Self {
        Self { usage_repository }
    }

    /// Decide whether `user_id` may spend `cost_cents` more this month
    pub async fn check(&self, user_id: &str, cost_cents: i64) -> BudgetDecision {
        self.check_in_period(user_id, cost_cents, BillingPeriod::current())
            .await
    }

    pub async fn check_in_period(
        &self,
        user_id: &str,
        cost_cents: i64,
        period: BillingPeriod,
    ) -> BudgetDecision {
        match self.usage_repository.find(user_id, period).await {
            Ok(Some(record)) => Self::evaluate(&record, cost_cents),
            Ok(None) => {
                debug!("No usage recorded yet for {} this month", user_id);
                BudgetDecision::Allowed
            }
            Err(e) => {
                warn!("Budget lookup failed for {}, allowing request: {}", user_id, e);
                BudgetDecision::Allowed
            }
        }
    }

    /// Apply the limit rules to an existing record
    pub fn evaluate(record: &UsageRecord, cost_cents: i64) -> BudgetDecision {
        let over_limit = record.is_limit_reached
            || record.total_cost_cents + cost_cents > record.monthly_limit_cents;

        if over_limit {
            BudgetDecision::Denied(BudgetDenial {
                user_id: record.user_id.clone(),
                total_cost_cents: record.total_cost_cents,
                monthly_limit_cents: record.monthly_limit_cents,
                message_pt: LIMIT_REACHED_PT.to_string(),
                message_en: LIMIT_REACHED_EN.to_string(),
            })
        } else {
            BudgetDecision::Allowed
        }
    }
}

impl BudgetDenial {
    /// The user-facing message in the requested language
    pub fn message(&self, language: Language) -> &str {
        language.pick(&self.message_pt, &self.message_en)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::models::UsageDelta;
    use chrono::Utc;
    use tracing_test::traced_test;
    use uuid::Uuid;

    const PERIOD: BillingPeriod = BillingPeriod { month: 3, year: 2026 };

    fn record(total: i64, limit: i64, reached: bool) -> UsageRecord {
        UsageRecord {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            month: PERIOD.month,
            year: PERIOD.year,
            total_cost_cents: total,
            monthly_limit_cents: limit,
            is_limit_reached: reached,
            food_scans_count: 0,
            food_scans_cached_count: 0,
            meal_plans_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn spending_up_to_the_limit_is_allowed() {
        assert!(BudgetGate::evaluate(&record(99, 100, false), 1).is_allowed());
    }

    #[test]
    fn spending_past_the_limit_is_denied() {
        let decision = BudgetGate::evaluate(&record(100, 100, false), 1);
        let BudgetDecision::Denied(denial) = decision else {
            panic!("expected denial");
        };
        assert_eq!(denial.total_cost_cents, 100);
        assert!(denial.message(Language::Pt).contains("limite"));
        assert!(denial.message(Language::En).contains("limit"));
    }

    #[test]
    fn flag_denies_even_with_room_left() {
        assert!(!BudgetGate::evaluate(&record(0, 100, true), 0).is_allowed());
    }

    #[tokio::test]
    async fn unknown_user_is_allowed() {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let gate = BudgetGate::new(AiUsageSeaOrmRepository::new(database.connection()));

        assert!(gate.check_in_period("nobody", 1, PERIOD).await.is_allowed());
    }

    #[tokio::test]
    async fn recorded_usage_is_enforced() {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let repo = AiUsageSeaOrmRepository::new(database.connection());
        repo.record("user-1", PERIOD, UsageDelta::food_scan(9), 10)
            .await
            .unwrap();
        let gate = BudgetGate::new(repo);

        assert!(gate.check_in_period("user-1", 1, PERIOD).await.is_allowed());
        assert!(!gate.check_in_period("user-1", 2, PERIOD).await.is_allowed());
    }

    #[tokio::test]
    #[traced_test]
    async fn lookup_errors_fail_open() {
        // No migrations: the table does not exist, so every lookup errors
        let database = Database::new_in_memory().await.unwrap();
        let gate = BudgetGate::new(AiUsageSeaOrmRepository::new(database.connection()));

        assert!(gate.check_in_period("user-1", 1_000_000, PERIOD).await.is_allowed());
        assert!(logs_contain("Budget lookup failed"));
    }
}

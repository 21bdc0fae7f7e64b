//! Fire-and-forget usage accounting
//!
//! Writes are detached from the request: a slow or failing usage table
//! never delays or fails the response. Accounting is best effort and
//! at-most-once. Spawned writes are tracked so shutdown and tests can wait
//! for them with [`UsageRecorder::flush`].

use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use crate::config::BudgetConfig;
use crate::database::repositories::AiUsageSeaOrmRepository;
use crate::models::{BillingPeriod, UsageDelta};

#[derive(Clone)]
pub struct UsageRecorder {
    repository: AiUsageSeaOrmRepository,
    budget: BudgetConfig,
    tracker: TaskTracker,
}

impl UsageRecorder {
    pub fn new(repository: AiUsageSeaOrmRepository, budget: BudgetConfig) -> Self {
        Self {
            repository,
            budget,
            tracker: TaskTracker::new(),
        }
    }

    /// Account for a finished scan; cached scans are free
    pub fn record_scan(&self, user_id: &str, cached: bool) {
        let delta = if cached {
            UsageDelta::cached_food_scan()
        } else {
            UsageDelta::food_scan(self.budget.scan_cost_cents)
        };
        self.spawn_record(user_id, delta);
    }

    /// Account for a generated family meal plan
    pub fn record_meal_plan(&self, user_id: &str) {
        self.spawn_record(user_id, UsageDelta::meal_plan(self.budget.meal_plan_cost_cents));
    }

    fn spawn_record(&self, user_id: &str, delta: UsageDelta) {
        let repository = self.repository.clone();
        let user_id = user_id.to_string();
        let monthly_limit_cents = self.budget.monthly_limit_cents;
        let period = BillingPeriod::current();

        self.tracker.spawn(async move {
            match repository
                .record(&user_id, period, delta, monthly_limit_cents)
                .await
            {
                Ok(record) => debug!(
                    "Recorded {:?} for {}: total {} cents",
                    delta.kind, user_id, record.total_cost_cents
                ),
                Err(e) => error!("Failed to record usage for {}: {}", user_id, e),
            }
        });
    }

    /// Wait until every write spawned so far has finished
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Number of writes still in flight
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    async fn create_recorder(budget: BudgetConfig) -> (UsageRecorder, AiUsageSeaOrmRepository) {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let repository = AiUsageSeaOrmRepository::new(database.connection());
        (UsageRecorder::new(repository.clone(), budget), repository)
    }

    #[tokio::test]
    async fn flush_waits_for_detached_writes() {
        let (recorder, repository) = create_recorder(BudgetConfig {
            scan_cost_cents: 4,
            meal_plan_cost_cents: 7,
            monthly_limit_cents: 100,
        })
        .await;

        recorder.record_scan("user-1", false);
        recorder.record_scan("user-1", true);
        recorder.record_meal_plan("user-1");
        recorder.flush().await;

        assert_eq!(recorder.pending(), 0);
        let record = repository
            .find("user-1", BillingPeriod::current())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.total_cost_cents, 11);
        assert_eq!(record.food_scans_count, 1);
        assert_eq!(record.food_scans_cached_count, 1);
        assert_eq!(record.meal_plans_count, 1);
    }

    #[tokio::test]
    async fn recorder_is_usable_after_flush() {
        let (recorder, repository) = create_recorder(BudgetConfig::default()).await;

        recorder.record_scan("user-1", true);
        recorder.flush().await;
        recorder.record_scan("user-1", true);
        recorder.flush().await;

        let record = repository
            .find("user-1", BillingPeriod::current())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.food_scans_cached_count, 2);
        assert_eq!(record.total_cost_cents, 0);
    }
}

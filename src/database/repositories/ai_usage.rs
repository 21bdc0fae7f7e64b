//! SeaORM-based AI usage repository
//!
//! One row per (user, month, year). Rows are created lazily on the first
//! billable event of a month and only ever grow: costs and counters are
//! added in SQL, and the limit flag is set but never cleared.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::{Expr, OnConflict},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::entities::{ai_usage, prelude::AiUsage};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{BillingPeriod, UsageDelta, UsageKind, UsageRecord};

/// SeaORM-based repository for monthly usage records
#[derive(Clone)]
pub struct AiUsageSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl AiUsageSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Find the usage record of a user for a billing period
    pub async fn find(
        &self,
        user_id: &str,
        period: BillingPeriod,
    ) -> RepositoryResult<Option<UsageRecord>> {
        let model = AiUsage::find()
            .filter(ai_usage::Column::UserId.eq(user_id))
            .filter(ai_usage::Column::Month.eq(period.month))
            .filter(ai_usage::Column::Year.eq(period.year))
            .one(&*self.connection)
            .await?;

        Ok(model.map(Self::model_to_domain))
    }

    /// Apply a billable event to the user's record for `period`
    ///
    /// Creates the row with `monthly_limit_cents` as its ceiling when it does
    /// not exist yet. Existing rows keep their own ceiling.
    pub async fn record(
        &self,
        user_id: &str,
        period: BillingPeriod,
        delta: UsageDelta,
        monthly_limit_cents: i64,
    ) -> RepositoryResult<UsageRecord> {
        if delta.cost_cents < 0 {
            return Err(RepositoryError::query_failed(
                "ai_usage.record",
                format!("negative cost {} would decrease the total", delta.cost_cents),
            ));
        }

        self.ensure_row(user_id, period, monthly_limit_cents).await?;

        let counter = match delta.kind {
            UsageKind::FoodScan => ai_usage::Column::FoodScansCount,
            UsageKind::CachedFoodScan => ai_usage::Column::FoodScansCachedCount,
            UsageKind::MealPlan => ai_usage::Column::MealPlansCount,
        };

        AiUsage::update_many()
            .col_expr(
                ai_usage::Column::TotalCostCents,
                Expr::col(ai_usage::Column::TotalCostCents).add(delta.cost_cents),
            )
            .col_expr(counter, Expr::col(counter).add(1))
            .col_expr(ai_usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(ai_usage::Column::UserId.eq(user_id))
            .filter(ai_usage::Column::Month.eq(period.month))
            .filter(ai_usage::Column::Year.eq(period.year))
            .exec(&*self.connection)
            .await?;

        // Flip the flag in a second statement so it sees the new total
        AiUsage::update_many()
            .col_expr(ai_usage::Column::IsLimitReached, Expr::value(true))
            .filter(ai_usage::Column::UserId.eq(user_id))
            .filter(ai_usage::Column::Month.eq(period.month))
            .filter(ai_usage::Column::Year.eq(period.year))
            .filter(ai_usage::Column::IsLimitReached.eq(false))
            .filter(
                Expr::col(ai_usage::Column::TotalCostCents)
                    .gte(Expr::col(ai_usage::Column::MonthlyLimitCents)),
            )
            .exec(&*self.connection)
            .await?;

        let record = self.find(user_id, period).await?.ok_or_else(|| {
            RepositoryError::record_not_found("ai_usage", "user_id", user_id)
        })?;

        debug!(
            "Usage for {} in {}/{}: {} of {} cents",
            user_id, period.month, period.year, record.total_cost_cents, record.monthly_limit_cents
        );
        Ok(record)
    }

    /// Insert an empty row for the period unless one exists
    async fn ensure_row(
        &self,
        user_id: &str,
        period: BillingPeriod,
        monthly_limit_cents: i64,
    ) -> RepositoryResult<()> {
        let now = Utc::now();
        let active_model = ai_usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            month: Set(period.month),
            year: Set(period.year),
            total_cost_cents: Set(0),
            monthly_limit_cents: Set(monthly_limit_cents),
            is_limit_reached: Set(false),
            food_scans_count: Set(0),
            food_scans_cached_count: Set(0),
            meal_plans_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        AiUsage::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    ai_usage::Column::UserId,
                    ai_usage::Column::Month,
                    ai_usage::Column::Year,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&*self.connection)
            .await?;

        Ok(())
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(model: ai_usage::Model) -> UsageRecord {
        UsageRecord {
            id: model.id,
            user_id: model.user_id,
            month: model.month,
            year: model.year,
            total_cost_cents: model.total_cost_cents,
            monthly_limit_cents: model.monthly_limit_cents,
            is_limit_reached: model.is_limit_reached,
            food_scans_count: model.food_scans_count,
            food_scans_cached_count: model.food_scans_cached_count,
            meal_plans_count: model.meal_plans_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

//! SeaORM-based food scan cache repository
//!
//! Rows are keyed by (image_hash, language). They are created after a
//! successful AI answer, touched on every hit, and never deleted here.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
    sea_query::{Expr, OnConflict},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::entities::{food_scan_cache, prelude::FoodScanCache};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{CacheEntry, CacheStats, Language, NutritionAnalysis};

/// SeaORM-based repository for cached nutrition estimates
#[derive(Clone)]
pub struct FoodScanCacheSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl FoodScanCacheSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Look up the cached estimate for a photo in a language
    pub async fn find(
        &self,
        image_hash: &str,
        language: Language,
    ) -> RepositoryResult<Option<CacheEntry>> {
        let model = FoodScanCache::find()
            .filter(food_scan_cache::Column::ImageHash.eq(image_hash))
            .filter(food_scan_cache::Column::Language.eq(language.as_ref()))
            .one(&*self.connection)
            .await?;

        model.map(Self::model_to_domain).transpose()
    }

    /// Count one more hit on an entry
    ///
    /// The increment is done in SQL so concurrent hits are never lost.
    pub async fn record_hit(&self, id: Uuid) -> RepositoryResult<()> {
        let result = FoodScanCache::update_many()
            .col_expr(
                food_scan_cache::Column::HitCount,
                Expr::col(food_scan_cache::Column::HitCount).add(1),
            )
            .col_expr(food_scan_cache::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(food_scan_cache::Column::Id.eq(id))
            .exec(&*self.connection)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::record_not_found(
                "food_scan_cache",
                "id",
                id.to_string(),
            ));
        }
        Ok(())
    }

    /// Store a fresh estimate with a zero hit count
    ///
    /// When another request stored the same (image_hash, language) first, the
    /// existing row wins and is returned unchanged.
    pub async fn insert(
        &self,
        image_hash: &str,
        language: Language,
        analysis: &NutritionAnalysis,
    ) -> RepositoryResult<CacheEntry> {
        let now = Utc::now();
        let active_model = food_scan_cache::ActiveModel {
            id: Set(Uuid::new_v4()),
            image_hash: Set(image_hash.to_string()),
            language: Set(language.to_string()),
            dish_name: Set(analysis.dish_name.clone()),
            foods_identified: Set(serde_json::to_string(&analysis.foods_identified)?),
            portion_estimate: Set(analysis.portion_estimate.clone()),
            calories: Set(analysis.calories),
            protein: Set(analysis.protein),
            carbs: Set(analysis.carbs),
            fat: Set(analysis.fat),
            fiber: Set(analysis.fiber),
            confidence: Set(analysis.confidence.clone()),
            notes: Set(analysis.notes.clone()),
            hit_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        FoodScanCache::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    food_scan_cache::Column::ImageHash,
                    food_scan_cache::Column::Language,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&*self.connection)
            .await?;

        debug!("Cached nutrition estimate for image {} ({})", image_hash, language);

        self.find(image_hash, language).await?.ok_or_else(|| {
            RepositoryError::record_not_found("food_scan_cache", "image_hash", image_hash)
        })
    }

    /// Entry count and the sum of all hit counters
    pub async fn stats(&self) -> RepositoryResult<CacheStats> {
        let entries = FoodScanCache::find().count(&*self.connection).await?;

        // SUM() result types differ per backend, so add up in Rust
        let total_hits: i64 = FoodScanCache::find()
            .select_only()
            .column(food_scan_cache::Column::HitCount)
            .into_tuple::<i64>()
            .all(&*self.connection)
            .await?
            .into_iter()
            .sum();

        Ok(CacheStats {
            entries,
            total_hits,
        })
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(model: food_scan_cache::Model) -> RepositoryResult<CacheEntry> {
        let foods_identified: Vec<String> = serde_json::from_str(&model.foods_identified)
            .map_err(RepositoryError::SerializationFailed)?;

        Ok(CacheEntry {
            id: model.id,
            image_hash: model.image_hash,
            language: Language::from_tag(&model.language),
            analysis: NutritionAnalysis {
                dish_name: model.dish_name,
                foods_identified,
                portion_estimate: model.portion_estimate,
                calories: model.calories,
                protein: model.protein,
                carbs: model.carbs,
                fat: model.fat,
                fiber: model.fiber,
                confidence: model.confidence,
                notes: model.notes,
            },
            hit_count: model.hit_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

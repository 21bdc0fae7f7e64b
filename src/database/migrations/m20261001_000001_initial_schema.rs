use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_food_scan_cache_table(manager).await?;
        self.create_ai_usage_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiUsage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FoodScanCache::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    fn create_id_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    async fn create_food_scan_cache_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FoodScanCache::Table)
                    .if_not_exists()
                    .col(
                        self.create_id_column(manager, FoodScanCache::Id)
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FoodScanCache::ImageHash).string().not_null())
                    .col(ColumnDef::new(FoodScanCache::Language).string().not_null())
                    .col(ColumnDef::new(FoodScanCache::DishName).string().not_null())
                    .col(
                        ColumnDef::new(FoodScanCache::FoodsIdentified)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FoodScanCache::PortionEstimate).string())
                    .col(
                        ColumnDef::new(FoodScanCache::Calories)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(FoodScanCache::Protein)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(FoodScanCache::Carbs)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(FoodScanCache::Fat)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(FoodScanCache::Fiber)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(FoodScanCache::Confidence).string())
                    .col(ColumnDef::new(FoodScanCache::Notes).text())
                    .col(
                        ColumnDef::new(FoodScanCache::HitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(self.create_timestamp_column(manager, FoodScanCache::CreatedAt))
                    .col(self.create_timestamp_column(manager, FoodScanCache::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_ai_usage_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiUsage::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, AiUsage::Id).primary_key())
                    .col(ColumnDef::new(AiUsage::UserId).string().not_null())
                    .col(ColumnDef::new(AiUsage::Month).integer().not_null())
                    .col(ColumnDef::new(AiUsage::Year).integer().not_null())
                    .col(
                        ColumnDef::new(AiUsage::TotalCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AiUsage::MonthlyLimitCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AiUsage::IsLimitReached)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AiUsage::FoodScansCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AiUsage::FoodScansCachedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AiUsage::MealPlansCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(self.create_timestamp_column(manager, AiUsage::CreatedAt))
                    .col(self.create_timestamp_column(manager, AiUsage::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // One cached estimate per photo and language
        manager
            .create_index(
                Index::create()
                    .name("idx_food_scan_cache_hash_language")
                    .table(FoodScanCache::Table)
                    .col(FoodScanCache::ImageHash)
                    .col(FoodScanCache::Language)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One usage row per user and calendar month
        manager
            .create_index(
                Index::create()
                    .name("idx_ai_usage_user_period")
                    .table(AiUsage::Table)
                    .col(AiUsage::UserId)
                    .col(AiUsage::Month)
                    .col(AiUsage::Year)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum FoodScanCache {
    Table,
    Id,
    ImageHash,
    Language,
    DishName,
    FoodsIdentified,
    PortionEstimate,
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Confidence,
    Notes,
    HitCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AiUsage {
    Table,
    Id,
    UserId,
    Month,
    Year,
    TotalCostCents,
    MonthlyLimitCents,
    IsLimitReached,
    FoodScansCount,
    FoodScansCachedCount,
    MealPlansCount,
    CreatedAt,
    UpdatedAt,
}

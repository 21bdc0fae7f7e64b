//! SeaORM repository implementations
//!
//! This module provides repository implementations using SeaORM that work across
//! SQLite, PostgreSQL, and MySQL databases.

pub mod ai_usage;
pub mod food_scan_cache;

// Re-export for convenience
pub use ai_usage::AiUsageSeaOrmRepository;
pub use food_scan_cache::FoodScanCacheSeaOrmRepository;

pub use super::ai_usage::Entity as AiUsage;
pub use super::food_scan_cache::Entity as FoodScanCache;

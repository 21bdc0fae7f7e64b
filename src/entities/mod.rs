//! SeaORM entity definitions

pub mod prelude;

pub mod ai_usage;
pub mod food_scan_cache;

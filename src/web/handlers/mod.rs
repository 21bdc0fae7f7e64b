//! HTTP handlers grouped by resource

pub mod food_scan;
pub mod health;
pub mod meal_plan;
pub mod usage;

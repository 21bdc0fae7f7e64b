//! Business services sitting between the web handlers and the repositories

pub mod budget_gate;
pub mod family_meal_plan;
pub mod food_scan;
pub mod usage_recorder;

pub use budget_gate::{BudgetDecision, BudgetGate};
pub use family_meal_plan::FamilyMealPlanService;
pub use food_scan::FoodScanService;
pub use usage_recorder::UsageRecorder;

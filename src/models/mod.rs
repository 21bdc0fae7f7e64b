//! Domain models shared by the repositories, services and web layer

pub mod food_scan;
pub mod language;
pub mod meal_plan;
pub mod usage;

pub use food_scan::{CacheEntry, CacheStats, FoodScanOutcome, FoodScanRequest, NutritionAnalysis};
pub use language::Language;
pub use meal_plan::{
    FamilyMealPlan, FamilyMealPlanRequest, FamilyMember, HouseholdProfile, MemberAdaptation,
    PlannedMeal,
};
pub use usage::{BillingPeriod, UsageDelta, UsageKind, UsageRecord};

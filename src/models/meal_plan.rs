//! Family meal planning types
//!
//! A household shares one plan generated by the AI gateway. Each member then
//! gets an adaptation of every meal: a portion multiplier derived from their
//! calorie target plus ingredient swaps for their restrictions.

use serde::{Deserialize, Serialize};

use super::Language;

/// One person in the household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub daily_calorie_target: Option<f64>,
    #[serde(default)]
    pub goal: Option<String>,
    /// Diets and allergies, e.g. "vegetarian", "lactose-free"
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub disliked_foods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMealPlanRequest {
    #[serde(default)]
    pub members: Vec<FamilyMember>,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_days() -> u32 {
    1
}

/// Preferences of all members merged into one set of constraints
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HouseholdProfile {
    pub member_count: usize,
    /// Sorted, de-duplicated, lowercase
    pub dietary_restrictions: Vec<String>,
    /// Sorted, de-duplicated, lowercase
    pub avoided_foods: Vec<String>,
    /// Mean of the members that declared a target
    pub average_calorie_target: Option<f64>,
    pub goals: Vec<String>,
}

/// How one member eats a shared meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAdaptation {
    pub member: String,
    pub portion_multiplier: f64,
    #[serde(default)]
    pub adjusted_calories: f64,
    #[serde(default)]
    pub swaps: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub day: u32,
    pub meal_type: String,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub base_calories: f64,
    pub adaptations: Vec<MemberAdaptation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyMealPlan {
    pub household: HouseholdProfile,
    pub days: u32,
    pub language: Language,
    pub meals: Vec<PlannedMeal>,
}

/// Raw shape the model is asked to answer with
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMealPlan {
    pub meals: Vec<RawMeal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMeal {
    pub day: Option<u32>,
    pub meal_type: String,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    #[serde(deserialize_with = "super::food_scan::lenient_number")]
    pub base_calories: f64,
    pub adaptations: Vec<RawAdaptation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAdaptation {
    pub member: String,
    pub portion_multiplier: Option<f64>,
    pub swaps: Vec<String>,
    pub notes: Option<String>,
}

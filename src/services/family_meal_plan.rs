//! Family meal plan generation
//!
//! Members' preferences are merged into a household profile, the AI gateway
//! proposes shared meals, and every meal is decomposed into one adaptation
//! per member. Adaptations the model left out are filled in from calorie
//! targets so the result is always complete.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::ai::{AiGateway, extract_json_object, prompts::family_meal_plan_prompt};
use crate::config::BudgetConfig;
use crate::errors::{AppError, AppResult};
use crate::models::meal_plan::{RawAdaptation, RawMealPlan};
use crate::models::{
    FamilyMealPlan, FamilyMealPlanRequest, FamilyMember, HouseholdProfile, MemberAdaptation,
    PlannedMeal,
};

use super::{BudgetDecision, BudgetGate, UsageRecorder};

pub const MAX_PLAN_DAYS: u32 = 7;
pub const MAX_MEMBERS: usize = 12;
pub const MIN_PORTION_MULTIPLIER: f64 = 0.5;
pub const MAX_PORTION_MULTIPLIER: f64 = 2.0;

#[derive(Clone)]
pub struct FamilyMealPlanService {
    budget_gate: BudgetGate,
    usage_recorder: UsageRecorder,
    ai_gateway: Arc<dyn AiGateway>,
    budget_config: BudgetConfig,
}

impl FamilyMealPlanService {
    pub fn new(
        budget_gate: BudgetGate,
        usage_recorder: UsageRecorder,
        ai_gateway: Arc<dyn AiGateway>,
        budget_config: BudgetConfig,
    ) -> Self {
        Self {
            budget_gate,
            usage_recorder,
            ai_gateway,
            budget_config,
        }
    }

    pub async fn generate(&self, request: FamilyMealPlanRequest) -> AppResult<FamilyMealPlan> {
        validate_request(&request)?;

        let user_id = request
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        if let Some(user_id) = user_id {
            if let BudgetDecision::Denied(denial) = self
                .budget_gate
                .check(user_id, self.budget_config.meal_plan_cost_cents)
                .await
            {
                info!("Denied family meal plan for {}", user_id);
                return Err(AppError::BudgetExceeded(denial));
            }
        }

        let household = aggregate_household(&request.members);
        debug!(
            "Planning {} day(s) for {} members",
            request.days, household.member_count
        );

        let prompt =
            family_meal_plan_prompt(request.language, &household, &request.members, request.days);
        let completion = self.ai_gateway.complete(prompt).await?;
        let raw: RawMealPlan = extract_json_object(&completion)?;
        let meals = decompose_meals(raw, &request.members, &household, request.days);

        // Checked after decomposition, which drops meals without a name
        if meals.is_empty() {
            return Err(AppError::invalid_ai_response(
                "meal plan contained no usable meals",
                completion,
            ));
        }

        if let Some(user_id) = user_id {
            self.usage_recorder.record_meal_plan(user_id);
        }

        info!(
            "Generated family meal plan with {} meals for {} members",
            meals.len(),
            household.member_count
        );

        Ok(FamilyMealPlan {
            household,
            days: request.days,
            language: request.language,
            meals,
        })
    }
}

fn validate_request(request: &FamilyMealPlanRequest) -> AppResult<()> {
    if request.members.is_empty() {
        return Err(AppError::validation("at least one family member is required"));
    }
    if request.members.len() > MAX_MEMBERS {
        return Err(AppError::validation(format!(
            "at most {MAX_MEMBERS} family members are supported"
        )));
    }
    if request.days == 0 || request.days > MAX_PLAN_DAYS {
        return Err(AppError::validation(format!(
            "days must be between 1 and {MAX_PLAN_DAYS}"
        )));
    }

    let mut seen = BTreeSet::new();
    for member in &request.members {
        let name = member.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("every family member needs a name"));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(AppError::validation(format!("duplicate family member '{name}'")));
        }
        if let Some(target) = member.daily_calorie_target {
            if !target.is_finite() || target <= 0.0 {
                return Err(AppError::validation(format!(
                    "calorie target of '{name}' must be positive"
                )));
            }
        }
    }
    Ok(())
}

/// Merge every member's constraints into one household profile
pub fn aggregate_household(members: &[FamilyMember]) -> HouseholdProfile {
    let normalize = |values: &[String]| -> Vec<String> {
        values
            .iter()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .collect()
    };

    let dietary_restrictions: BTreeSet<String> = members
        .iter()
        .flat_map(|member| normalize(&member.dietary_restrictions))
        .collect();
    let avoided_foods: BTreeSet<String> = members
        .iter()
        .flat_map(|member| normalize(&member.disliked_foods))
        .collect();

    let targets: Vec<f64> = members
        .iter()
        .filter_map(|member| member.daily_calorie_target)
        .collect();
    let average_calorie_target = if targets.is_empty() {
        None
    } else {
        Some(targets.iter().sum::<f64>() / targets.len() as f64)
    };

    let mut goals = Vec::new();
    for goal in members.iter().filter_map(|member| member.goal.as_deref()) {
        let goal = goal.trim();
        if !goal.is_empty() && !goals.iter().any(|known: &String| known.eq_ignore_ascii_case(goal)) {
            goals.push(goal.to_string());
        }
    }

    HouseholdProfile {
        member_count: members.len(),
        dietary_restrictions: dietary_restrictions.into_iter().collect(),
        avoided_foods: avoided_foods.into_iter().collect(),
        average_calorie_target,
        goals,
    }
}

/// Portion relative to the household average, clamped to a sane range
pub fn default_portion_multiplier(member: &FamilyMember, household: &HouseholdProfile) -> f64 {
    match (member.daily_calorie_target, household.average_calorie_target) {
        (Some(target), Some(average)) if average > 0.0 => clamp_multiplier(target / average),
        _ => 1.0,
    }
}

fn clamp_multiplier(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_PORTION_MULTIPLIER, MAX_PORTION_MULTIPLIER)
    } else {
        1.0
    }
}

/// Turn the model's meals into complete per-member adaptations
///
/// Every meal ends up with exactly one adaptation per member, in member
/// order. Adaptations for names that are not household members are dropped.
pub fn decompose_meals(
    raw: RawMealPlan,
    members: &[FamilyMember],
    household: &HouseholdProfile,
    days: u32,
) -> Vec<PlannedMeal> {
    raw.meals
        .into_iter()
        .filter(|meal| !meal.name.trim().is_empty())
        .map(|meal| {
            let mut by_member: HashMap<String, RawAdaptation> = meal
                .adaptations
                .into_iter()
                .map(|adaptation| (adaptation.member.trim().to_lowercase(), adaptation))
                .collect();

            let base_calories = meal.base_calories.max(0.0);
            let adaptations = members
                .iter()
                .map(|member| {
                    let suggested = by_member.remove(&member.name.trim().to_lowercase());
                    let portion_multiplier = suggested
                        .as_ref()
                        .and_then(|adaptation| adaptation.portion_multiplier)
                        .map(clamp_multiplier)
                        .unwrap_or_else(|| default_portion_multiplier(member, household));
                    let (swaps, notes) = suggested
                        .map(|adaptation| (adaptation.swaps, adaptation.notes))
                        .unwrap_or_default();

                    MemberAdaptation {
                        member: member.name.trim().to_string(),
                        portion_multiplier,
                        adjusted_calories: (base_calories * portion_multiplier).round(),
                        swaps,
                        notes,
                    }
                })
                .collect();

            PlannedMeal {
                day: meal.day.unwrap_or(1).clamp(1, days),
                meal_type: meal.meal_type,
                name: meal.name,
                description: meal.description,
                ingredients: meal.ingredients,
                base_calories,
                adaptations,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meal_plan::RawMeal;
    use crate::models::Language;

    fn member(name: &str, target: Option<f64>) -> FamilyMember {
        FamilyMember {
            name: name.to_string(),
            age: None,
            daily_calorie_target: target,
            goal: None,
            dietary_restrictions: vec![],
            disliked_foods: vec![],
        }
    }

    #[test]
    fn household_merges_constraints() {
        let mut ana = member("Ana", Some(1800.0));
        ana.dietary_restrictions = vec!["Lactose-free".to_string(), " vegetarian ".to_string()];
        ana.goal = Some("lose weight".to_string());
        let mut leo = member("Leo", Some(2200.0));
        leo.dietary_restrictions = vec!["vegetarian".to_string()];
        leo.disliked_foods = vec!["Broccoli".to_string()];
        leo.goal = Some("Lose Weight".to_string());
        let bia = member("Bia", None);

        let household = aggregate_household(&[ana, leo, bia]);

        assert_eq!(household.member_count, 3);
        assert_eq!(household.dietary_restrictions, vec!["lactose-free", "vegetarian"]);
        assert_eq!(household.avoided_foods, vec!["broccoli"]);
        assert_eq!(household.average_calorie_target, Some(2000.0));
        assert_eq!(household.goals, vec!["lose weight"]);
    }

    #[test]
    fn portion_follows_calorie_target() {
        let household = HouseholdProfile {
            average_calorie_target: Some(2000.0),
            ..Default::default()
        };
        assert_eq!(default_portion_multiplier(&member("A", Some(1500.0)), &household), 0.75);
        assert_eq!(default_portion_multiplier(&member("B", Some(8000.0)), &household), 2.0);
        assert_eq!(default_portion_multiplier(&member("C", None), &household), 1.0);
    }

    #[test]
    fn decomposition_yields_one_adaptation_per_member_and_meal() {
        let members = vec![member("Ana", Some(1500.0)), member("Leo", Some(2500.0))];
        let household = aggregate_household(&members);
        let raw = RawMealPlan {
            meals: vec![
                RawMeal {
                    day: Some(1),
                    meal_type: "lunch".to_string(),
                    name: "Grilled chicken".to_string(),
                    base_calories: 600.0,
                    adaptations: vec![
                        RawAdaptation {
                            member: "ana".to_string(),
                            portion_multiplier: Some(0.8),
                            swaps: vec!["rice -> salad".to_string()],
                            notes: None,
                        },
                        RawAdaptation {
                            member: "Stranger".to_string(),
                            portion_multiplier: Some(1.5),
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                },
                RawMeal {
                    day: Some(9),
                    meal_type: "dinner".to_string(),
                    name: "Soup".to_string(),
                    base_calories: 400.0,
                    ..Default::default()
                },
            ],
        };

        let meals = decompose_meals(raw, &members, &household, 2);

        assert_eq!(meals.len(), 2);
        for meal in &meals {
            assert_eq!(meal.adaptations.len(), 2);
            assert_eq!(meal.adaptations[0].member, "Ana");
            assert_eq!(meal.adaptations[1].member, "Leo");
        }

        let lunch = &meals[0];
        assert_eq!(lunch.adaptations[0].portion_multiplier, 0.8);
        assert_eq!(lunch.adaptations[0].adjusted_calories, 480.0);
        assert_eq!(lunch.adaptations[0].swaps, vec!["rice -> salad"]);
        assert_eq!(lunch.adaptations[1].portion_multiplier, 1.25);

        // Day outside the requested range is clamped
        assert_eq!(meals[1].day, 2);
        assert_eq!(meals[1].adaptations[0].adjusted_calories, 300.0);
    }

    #[test]
    fn meals_without_a_name_are_dropped() {
        let members = vec![member("Ana", Some(1800.0))];
        let household = aggregate_household(&members);
        let raw = RawMealPlan {
            meals: vec![RawMeal {
                name: "   ".to_string(),
                base_calories: 500.0,
                ..Default::default()
            }],
        };

        assert!(decompose_meals(raw, &members, &household, 1).is_empty());
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let request = |members: Vec<FamilyMember>, days: u32| FamilyMealPlanRequest {
            members,
            days,
            language: Language::En,
            user_id: None,
        };

        assert!(validate_request(&request(vec![], 1)).is_err());
        assert!(validate_request(&request(vec![member("Ana", None)], 0)).is_err());
        assert!(validate_request(&request(vec![member("Ana", None)], 8)).is_err());
        assert!(
            validate_request(&request(vec![member("Ana", None), member("ana", None)], 1)).is_err()
        );
        assert!(validate_request(&request(vec![member("Ana", Some(-5.0))], 1)).is_err());
        assert!(validate_request(&request(vec![member("Ana", Some(1800.0))], 7)).is_ok());
    }
}

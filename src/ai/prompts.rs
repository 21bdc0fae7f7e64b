//! Prompt templates for the food scan and family meal plan flows

use crate::models::{FamilyMember, HouseholdProfile, Language};

use super::{ChatMessage, ChatPrompt};

const FOOD_SCAN_SYSTEM_PT: &str = "Você é um nutricionista especialista em análise de alimentos por imagem. \
Identifique os alimentos da foto, estime a porção e os valores nutricionais. \
Responda APENAS com um objeto JSON, sem texto adicional, neste formato: \
{\"dish_name\": string, \"foods_identified\": [string], \"portion_estimate\": string, \
\"calories\": number, \"protein\": number, \"carbs\": number, \"fat\": number, \"fiber\": number, \
\"confidence\": \"high\" | \"medium\" | \"low\", \"notes\": string}. \
Valores de macronutrientes em gramas. Escreva os textos em português do Brasil.";

const FOOD_SCAN_SYSTEM_EN: &str = "You are a nutritionist specialised in analysing food from photos. \
Identify the foods in the picture, estimate the portion and the nutritional values. \
Answer ONLY with a JSON object, no extra text, in this format: \
{\"dish_name\": string, \"foods_identified\": [string], \"portion_estimate\": string, \
\"calories\": number, \"protein\": number, \"carbs\": number, \"fat\": number, \"fiber\": number, \
\"confidence\": \"high\" | \"medium\" | \"low\", \"notes\": string}. \
Macronutrients in grams. Write all text in English.";

/// Multimodal prompt asking for a nutrition estimate of one photo
pub fn food_scan_prompt(language: Language, image_data_url: &str) -> ChatPrompt {
    let system = language.pick(FOOD_SCAN_SYSTEM_PT, FOOD_SCAN_SYSTEM_EN);
    let instruction = language.pick(
        "Analise esta refeição e retorne o JSON.",
        "Analyse this meal and return the JSON.",
    );

    ChatPrompt::new(vec![
        ChatMessage::system(system),
        ChatMessage::user_with_image(instruction, image_data_url),
    ])
    .with_temperature(0.2)
}

/// Prompt asking for a shared plan plus per-member adaptations
pub fn family_meal_plan_prompt(
    language: Language,
    household: &HouseholdProfile,
    members: &[FamilyMember],
    days: u32,
) -> ChatPrompt {
    let system = language.pick(
        "Você é um nutricionista que planeja refeições para famílias. \
         Crie um cardápio único que toda a família possa comer junta e adapte cada refeição \
         para cada membro. Responda APENAS com JSON.",
        "You are a nutritionist who plans meals for families. \
         Create one menu the whole family can eat together and adapt each meal \
         for every member. Answer ONLY with JSON.",
    );

    let member_lines = members
        .iter()
        .map(describe_member)
        .collect::<Vec<_>>()
        .join("\n");

    let none = language.pick("nenhuma", "none");
    let restrictions = join_or(&household.dietary_restrictions, none);
    let avoided = join_or(&household.avoided_foods, none);
    let average = household
        .average_calorie_target
        .map(|kcal| format!("{kcal:.0} kcal"))
        .unwrap_or_else(|| none.to_string());

    let body = format!(
        "{header}\n{member_lines}\n\n\
         restrictions: {restrictions}\n\
         avoid: {avoided}\n\
         household average target: {average}\n\
         days: {days}\n\n\
         {format_hint}",
        header = language.pick("Membros da família:", "Family members:"),
        format_hint = language.pick(
            "Formato: {\"meals\": [{\"day\": number, \"meal_type\": string, \"name\": string, \
             \"description\": string, \"ingredients\": [string], \"base_calories\": number, \
             \"adaptations\": [{\"member\": string, \"portion_multiplier\": number, \
             \"swaps\": [string], \"notes\": string}]}]}. Inclua café da manhã, almoço e jantar \
             para cada dia. Textos em português do Brasil.",
            "Format: {\"meals\": [{\"day\": number, \"meal_type\": string, \"name\": string, \
             \"description\": string, \"ingredients\": [string], \"base_calories\": number, \
             \"adaptations\": [{\"member\": string, \"portion_multiplier\": number, \
             \"swaps\": [string], \"notes\": string}]}]}. Include breakfast, lunch and dinner \
             for each day. Text in English.",
        ),
    );

    ChatPrompt::new(vec![ChatMessage::system(system), ChatMessage::user(body)])
        .with_temperature(0.7)
}

fn describe_member(member: &FamilyMember) -> String {
    let mut parts = vec![format!("- {}", member.name)];
    if let Some(age) = member.age {
        parts.push(format!("age {age}"));
    }
    if let Some(target) = member.daily_calorie_target {
        parts.push(format!("{target:.0} kcal/day"));
    }
    if let Some(goal) = &member.goal {
        parts.push(format!("goal: {goal}"));
    }
    if !member.dietary_restrictions.is_empty() {
        parts.push(format!("restrictions: {}", member.dietary_restrictions.join(", ")));
    }
    if !member.disliked_foods.is_empty() {
        parts.push(format!("dislikes: {}", member.disliked_foods.join(", ")));
    }
    parts.join("; ")
}

fn join_or(values: &[String], fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

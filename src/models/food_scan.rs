use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Language;

/// Inbound food photo analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodScanRequest {
    #[serde(default)]
    pub image_base64: String,
    #[serde(default)]
    pub language: Language,
    /// Owner of the scan; anonymous scans skip budget accounting
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Nutrition estimate produced by the AI gateway
///
/// Every field has a default so that a partially filled answer still parses.
/// Models also answer `null` or `"450 kcal"` for numbers; both are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub dish_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub foods_identified: Vec<String>,
    pub portion_estimate: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub fat: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub fiber: f64,
    pub confidence: Option<String>,
    pub notes: Option<String>,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A number, a numeric string with an optional unit, or null (zero)
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(value)) => value,
        Some(Loose::Text(text)) => parse_leading_number(&text).unwrap_or(0.0),
        None => 0.0,
    })
}

fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    text[..end]
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// A stored nutrition estimate keyed by (image_hash, language)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: Uuid,
    pub image_hash: String,
    pub language: Language,
    pub analysis: NutritionAnalysis,
    pub hit_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a scan, served from the cache or freshly computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodScanOutcome {
    pub analysis: NutritionAnalysis,
    pub cached: bool,
    pub image_hash: String,
}

/// Aggregate numbers about the cache table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub total_hits: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_fields() {
        let request: FoodScanRequest = serde_json::from_str(
            r#"{"imageBase64":"abcd","language":"en","userId":"user-1"}"#,
        )
        .unwrap();

        assert_eq!(request.image_base64, "abcd");
        assert_eq!(request.language, Language::En);
        assert_eq!(request.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn partial_analysis_fills_defaults() {
        let analysis: NutritionAnalysis =
            serde_json::from_str(r#"{"dish_name":"Feijoada","calories":650}"#).unwrap();

        assert_eq!(analysis.dish_name, "Feijoada");
        assert_eq!(analysis.calories, 650.0);
        assert!(analysis.foods_identified.is_empty());
        assert_eq!(analysis.fiber, 0.0);
        assert!(analysis.notes.is_none());
    }

    #[test]
    fn null_and_textual_numbers_are_tolerated() {
        let analysis: NutritionAnalysis = serde_json::from_str(
            r#"{"dish_name":"Salad","foods_identified":null,"calories":"120 kcal",
                "protein":"3,5","carbs":null,"fat":2,"fiber":"unknown"}"#,
        )
        .unwrap();

        assert_eq!(analysis.dish_name, "Salad");
        assert!(analysis.foods_identified.is_empty());
        assert_eq!(analysis.calories, 120.0);
        assert_eq!(analysis.protein, 3.5);
        assert_eq!(analysis.carbs, 0.0);
        assert_eq!(analysis.fat, 2.0);
        assert_eq!(analysis.fiber, 0.0);
    }
}

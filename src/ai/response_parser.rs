//! Extraction of JSON payloads from free-form completions
//!
//! Models wrap their JSON in prose or markdown fences. The outermost
//! `{ ... }` span is taken greedily and parsed; anything else is an
//! [`AppError::InvalidAiResponse`] carrying the raw text for diagnostics.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use crate::errors::{AppError, AppResult};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("static regex is valid"));

/// Parse the first-to-last brace span of `text` as `T`
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    let Some(found) = JSON_OBJECT.find(text) else {
        return Err(AppError::invalid_ai_response("no JSON object in completion", text));
    };

    serde_json::from_str(found.as_str())
        .map_err(|e| AppError::invalid_ai_response(e.to_string(), text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutritionAnalysis;

    #[test]
    fn json_inside_markdown_fence_is_found() {
        let text = "Here you go:\n```json\n{\"dish_name\": \"Salad\", \"calories\": 120}\n```";
        let analysis: NutritionAnalysis = extract_json_object(text).unwrap();
        assert_eq!(analysis.dish_name, "Salad");
        assert_eq!(analysis.calories, 120.0);
    }

    #[test]
    fn null_nutrients_still_parse() {
        let analysis: NutritionAnalysis =
            extract_json_object(r#"{"dish_name":"Salad","calories":120,"fiber":null}"#).unwrap();
        assert_eq!(analysis.calories, 120.0);
        assert_eq!(analysis.fiber, 0.0);
    }

    #[test]
    fn nested_objects_are_kept_whole() {
        let text = r#"{"outer": {"inner": 1}}"#;
        let value: serde_json::Value = extract_json_object(text).unwrap();
        assert_eq!(value["outer"]["inner"], 1);
    }

    #[test]
    fn text_without_braces_is_invalid() {
        let result: AppResult<serde_json::Value> = extract_json_object("I cannot see any food.");
        match result {
            Err(AppError::InvalidAiResponse { raw, .. }) => {
                assert_eq!(raw, "I cannot see any food.")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn broken_json_is_invalid() {
        let result: AppResult<serde_json::Value> = extract_json_object("{\"calories\": }");
        assert!(matches!(result, Err(AppError::InvalidAiResponse { .. })));
    }
}

//! AI Response Extraction
//!
//! Turns the text an image-analysis model returned for a photographed triage
//! report into a [`NewRecord`]. The model is asked for a bare JSON object
//!
//! ```json
//! {"dia": "YYYY-MM-DD", "vermelho": 0, "laranja": 0, "amarelo": 0, "verde": 0, "azul": 0}
//! ```
//!
//! but replies often arrive wrapped in markdown fences or prose, with counts
//! as strings, so parsing is lenient about everything except the date.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::board::{CategoryCounts, NewRecord, RiskCategory};

/// Errors that can occur while reading an AI response
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    /// No JSON object found in the text
    #[error("No JSON object found in response")]
    NoJson,

    /// JSON was found but does not parse
    #[error("Invalid JSON in response: {0}")]
    Json(String),

    /// Parsed JSON is not an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(String),

    /// `dia` is present but not a `YYYY-MM-DD` date
    #[error("Invalid day {0:?}, expected YYYY-MM-DD")]
    InvalidDay(String),
}

/// Strip markdown code fences the model tends to add
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the cleaned text, or the outermost `{...}` span inside it
fn find_object(text: &str) -> Result<Value, ExtractError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let span = regex::Regex::new(r"(?s)\{.*\}")
        .ok()
        .and_then(|re| re.find(text))
        .ok_or(ExtractError::NoJson)?;

    serde_json::from_str(span.as_str()).map_err(|e| ExtractError::Json(e.to_string()))
}

/// Numeric coercion in the manner of JavaScript's `Number(x) || 0`,
/// then clamped to a non-negative whole count
fn coerce_count(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn read_day(object: &Map<String, Value>, today: NaiveDate) -> Result<NaiveDate, ExtractError> {
    match object.get("dia") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(today),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(today),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ExtractError::InvalidDay(s.clone())),
        Some(other) => Err(ExtractError::InvalidDay(other.to_string())),
    }
}

/// Build a new record from a model response
///
/// A missing or empty `dia` means `today`. Missing or non-numeric counts are
/// zero, negatives become zero and fractions are truncated.
pub fn parse_ai_response(text: &str, today: NaiveDate) -> Result<NewRecord, ExtractError> {
    let cleaned = strip_fences(text);
    if cleaned.is_empty() {
        return Err(ExtractError::NoJson);
    }

    let value = find_object(&cleaned)?;
    let object = match value {
        Value::Object(object) => object,
        other => {
            let kind = match other {
                Value::Array(_) => "array",
                Value::String(_) => "string",
                Value::Number(_) => "number",
                Value::Bool(_) => "boolean",
                _ => "null",
            };
            return Err(ExtractError::NotAnObject(kind.to_string()));
        }
    };

    let day = read_day(&object, today)?;

    let mut counts = CategoryCounts::default();
    for category in RiskCategory::ALL {
        counts.set(category, coerce_count(object.get(category.key())));
    }

    tracing::debug!(day = %day, total = counts.sum(), "Extracted record from AI response");
    Ok(NewRecord::new(day, counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_plain_json() {
        let record = parse_ai_response(
            r#"{"dia":"2023-10-06","vermelho":1,"laranja":2,"amarelo":3,"verde":4,"azul":5}"#,
            today(),
        )
        .unwrap();

        assert_eq!(record.day, NaiveDate::from_ymd_opt(2023, 10, 6).unwrap());
        assert_eq!(record.counts, CategoryCounts::new(1, 2, 3, 4, 5));
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\n  \"dia\": \"2023-10-07\",\n  \"vermelho\": 3,\n  \"verde\": 12\n}\n```";
        let record = parse_ai_response(text, today()).unwrap();
        assert_eq!(record.counts, CategoryCounts::new(3, 0, 0, 12, 0));
    }

    #[test]
    fn test_json_inside_prose() {
        let text = "Aqui estão os dados extraídos: {\"dia\": \"2023-10-08\", \"azul\": 9}. Verifique.";
        let record = parse_ai_response(text, today()).unwrap();
        assert_eq!(record.counts.blue, 9);
    }

    #[test]
    fn test_missing_day_defaults_to_today() {
        let record = parse_ai_response(r#"{"vermelho": 1}"#, today()).unwrap();
        assert_eq!(record.day, today());

        let record = parse_ai_response(r#"{"dia": "", "vermelho": 1}"#, today()).unwrap();
        assert_eq!(record.day, today());
    }

    #[test]
    fn test_count_coercion() {
        let record = parse_ai_response(
            r#"{"vermelho":"7","laranja":"abc","amarelo":-4,"verde":2.9,"azul":true}"#,
            today(),
        )
        .unwrap();
        assert_eq!(record.counts, CategoryCounts::new(7, 0, 0, 2, 1));
    }

    #[test]
    fn test_invalid_day() {
        let err = parse_ai_response(r#"{"dia":"06/10/2023"}"#, today()).unwrap_err();
        assert_eq!(err, ExtractError::InvalidDay("06/10/2023".to_string()));
    }

    #[test]
    fn test_rejects_non_objects() {
        assert_eq!(
            parse_ai_response("[1, 2, 3]", today()).unwrap_err(),
            ExtractError::NotAnObject("array".to_string())
        );
        assert_eq!(parse_ai_response("", today()).unwrap_err(), ExtractError::NoJson);
        assert_eq!(
            parse_ai_response("Não consegui ler a imagem.", today()).unwrap_err(),
            ExtractError::NoJson
        );
        assert!(matches!(
            parse_ai_response("{\"dia\": ", today()).unwrap_err(),
            ExtractError::NoJson | ExtractError::Json(_)
        ));
    }
}

//! Request validation: per-field rules checked against the raw JSON body before it becomes a model.

use crate::error::AppError;
use crate::model::CampModel;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Rules for a CampModel body, keyed by wire field name.
pub fn camp_rules() -> HashMap<String, ValidationRule> {
    let mut rules = HashMap::new();
    rules.insert(
        "name".to_string(),
        ValidationRule {
            required: true,
            max_length: Some(100),
            ..ValidationRule::default()
        },
    );
    rules.insert(
        "moniker".to_string(),
        ValidationRule {
            required: true,
            ..ValidationRule::default()
        },
    );
    rules.insert(
        "length".to_string(),
        ValidationRule {
            minimum: Some(1.0),
            maximum: Some(100.0),
            ..ValidationRule::default()
        },
    );
    rules
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against per-field rules. All required fields must be present and non-blank.
    pub fn validate(body: &Map<String, Value>, rules: &HashMap<String, ValidationRule>) -> Result<(), AppError> {
        let mut fields: Vec<&String> = rules.keys().collect();
        fields.sort();
        for field in fields {
            let rule = &rules[field];
            let val = body.get(field.as_str());
            if rule.required && is_blank(val) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
            if let Some(v) = val {
                validate_field(field, v, rule)?;
            }
        }
        Ok(())
    }

    /// Check a JSON body against the camp rules and deserialize it.
    pub fn camp_model(body: Value) -> Result<CampModel, AppError> {
        let Value::Object(map) = body else {
            return Err(AppError::Validation("body must be a JSON object".into()));
        };
        Self::validate(&map, &camp_rules())?;
        serde_json::from_value(Value::Object(map)).map_err(|e| AppError::Validation(e.to_string()))
    }
}

fn is_blank(val: Option<&Value>) -> bool {
    match val {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_field(field: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max {
                return Err(AppError::Validation(format!("{} must be at most {} characters", field, max)));
            }
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", field, min)));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", field, max)));
            }
        }
    }
    Ok(())
}

//! Dynamic custom-field validation.
//!
//! Organizations attach extra fields to a category (checked at ticket
//! creation) or an area (checked at transfer time). Field ids are
//! scope-unique, so changing area re-runs validation against the new area's
//! fields only; nothing carries over.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

/// Declared data type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Textarea,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "select" => Ok(FieldType::Select),
            "textarea" => Ok(FieldType::Textarea),
            other => Err(CoreError::Validation(format!(
                "Invalid field type '{other}'. Must be one of: text, number, date, \
                 select, textarea"
            ))),
        }
    }
}

/// A custom field definition as seen by the validator.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub id: DbId,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
}

/// Validate a field definition itself: `select` must declare options.
pub fn validate_definition(field_type: FieldType, options: &[String]) -> Result<(), CoreError> {
    if field_type == FieldType::Select && options.iter().all(|o| o.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Field type 'select' requires a non-empty option list".to_string(),
        ));
    }
    Ok(())
}

/// Coerce a submitted JSON value to its trimmed string form.
///
/// Null and absent values coerce to the empty string, which is what the
/// required-field check tests against.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Validate submitted values against the field specs for one scope.
///
/// - Unknown field ids are rejected outright rather than silently accepted.
/// - Every `required` spec must have a value that is non-empty after
///   coercion; unmet ids are collected into `MissingRequiredFields`.
/// - Present values are structurally checked per declared type. `select`
///   values accept any non-empty string; option membership is enforced
///   upstream by the field directory that presented the options.
pub fn validate_values(
    specs: &[FieldSpec],
    values: &BTreeMap<DbId, Value>,
) -> Result<(), CoreError> {
    let unknown: Vec<DbId> = values
        .keys()
        .filter(|id| !specs.iter().any(|s| s.id == **id))
        .copied()
        .collect();
    if !unknown.is_empty() {
        return Err(CoreError::Validation(format!(
            "Unknown custom field ids for this scope: {}",
            unknown
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    let mut unmet: Vec<DbId> = Vec::new();
    for spec in specs {
        let coerced = values.get(&spec.id).map(coerce_to_string).unwrap_or_default();
        if coerced.is_empty() {
            if spec.required {
                unmet.push(spec.id);
            }
            continue;
        }
        check_value_shape(spec, &coerced)?;
    }

    if !unmet.is_empty() {
        return Err(CoreError::MissingRequiredFields(unmet));
    }
    Ok(())
}

/// Structural type check for a non-empty coerced value.
fn check_value_shape(spec: &FieldSpec, value: &str) -> Result<(), CoreError> {
    match spec.field_type {
        FieldType::Text | FieldType::Textarea | FieldType::Select => Ok(()),
        FieldType::Number => {
            if value.parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err(CoreError::Validation(format!(
                    "Field '{}' expects a number, got '{value}'",
                    spec.label
                )))
            }
        }
        FieldType::Date => {
            if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                Ok(())
            } else {
                Err(CoreError::Validation(format!(
                    "Field '{}' expects an ISO date (YYYY-MM-DD), got '{value}'",
                    spec.label
                )))
            }
        }
    }
}

//! Checks assigned literals against declared field types and converts them to
//! stored values.
//!
//! Temporal, UUID, BLOB and JSON values are validated and normalized here so
//! that both store backends and both reference strategies persist the same
//! text form. Condition literals bypass this module and are used as written.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use uuid::Uuid;

use super::errors::SemanticError;
use crate::dsl_parser::ast::{AssignValue, Literal, PrimitiveType};
use crate::dsl_parser::literal::unescape;
use crate::graph_catalog::{FieldSchema, FieldType};
use crate::store::value::Value;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Value of a literal taken as written.
pub fn literal_value(literal: &Literal<'_>) -> Value {
    match literal {
        Literal::Integer(value) => Value::Int(*value),
        Literal::Float(value) => Value::Float(*value),
        Literal::Boolean(value) => Value::Bool(*value),
        Literal::String(body) => Value::String(unescape(body)),
        Literal::Null => Value::Null,
    }
}

/// Short description of an assigned value for error messages.
pub fn describe(value: &AssignValue<'_>) -> String {
    match value {
        AssignValue::Literal(Literal::Integer(_)) => "an integer".to_string(),
        AssignValue::Literal(Literal::Float(_)) => "a float".to_string(),
        AssignValue::Literal(Literal::Boolean(_)) => "a boolean".to_string(),
        AssignValue::Literal(Literal::String(_)) => "a string".to_string(),
        AssignValue::Literal(Literal::Null) => "NULL".to_string(),
        AssignValue::Reference(name) => format!("alias `{}`", name),
        AssignValue::Array(_) => "an array".to_string(),
    }
}

/// Converts a value assigned to a primitive or primitive-array field.
/// Reference fields are handled by the reference strategy instead.
pub fn typed_value(
    owner: &str,
    field: &FieldSchema,
    value: &AssignValue<'_>,
) -> Result<Value, SemanticError> {
    let mismatch = || SemanticError::TypeMismatch {
        owner: owner.to_string(),
        field: field.name.clone(),
        expected: field.field_type.to_string(),
        found: describe(value),
    };

    match (&field.field_type, value) {
        (_, AssignValue::Literal(Literal::Null)) => Ok(Value::Null),
        (FieldType::Primitive(kind), AssignValue::Literal(literal)) => {
            coerce_literal(&field.name, *kind, literal).ok_or_else(mismatch)?
        }
        (FieldType::PrimitiveArray(kind), AssignValue::Array(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                let AssignValue::Literal(literal) = item else {
                    return Err(mismatch());
                };
                if matches!(literal, Literal::Null) {
                    values.push(Value::Null);
                    continue;
                }
                values.push(coerce_literal(&field.name, *kind, literal).ok_or_else(mismatch)??);
            }
            Ok(Value::List(values))
        }
        _ => Err(mismatch()),
    }
}

/// Converts a value assigned without a known target type (UPDATE by numeric
/// id). Literals are stored as written; aliases are not values.
pub fn untyped_value(field: &str, value: &AssignValue<'_>) -> Result<Value, SemanticError> {
    match value {
        AssignValue::Literal(literal) => Ok(literal_value(literal)),
        AssignValue::Array(items) => items
            .iter()
            .map(|item| untyped_value(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        AssignValue::Reference(name) => Err(SemanticError::InvalidValue {
            field: field.to_string(),
            expected: "literal".to_string(),
            reason: format!("`{}` cannot be resolved without the element's type", name),
        }),
    }
}

/// `None` when the literal's kind does not fit `kind` at all; `Some(Err(..))`
/// when it fits but its content is malformed.
fn coerce_literal(
    field: &str,
    kind: PrimitiveType,
    literal: &Literal<'_>,
) -> Option<Result<Value, SemanticError>> {
    let invalid = |reason: String| SemanticError::InvalidValue {
        field: field.to_string(),
        expected: kind.keyword().to_string(),
        reason,
    };

    let value = match (kind, literal) {
        (PrimitiveType::String, Literal::String(body)) => Ok(Value::String(unescape(body))),
        (PrimitiveType::Int, Literal::Integer(value)) => Ok(Value::Int(*value)),
        (PrimitiveType::Float, Literal::Integer(value)) => Ok(Value::Float(*value as f64)),
        (PrimitiveType::Float, Literal::Float(value)) => Ok(Value::Float(*value)),
        (PrimitiveType::Bool, Literal::Boolean(value)) => Ok(Value::Bool(*value)),
        (PrimitiveType::Date, Literal::String(body)) => {
            normalize_date(&unescape(body)).map_err(invalid)
        }
        (PrimitiveType::DateTime, Literal::String(body)) => {
            normalize_datetime(&unescape(body)).map_err(invalid)
        }
        (PrimitiveType::Uuid, Literal::String(body)) => Uuid::parse_str(&unescape(body))
            .map(|uuid| Value::String(uuid.hyphenated().to_string()))
            .map_err(|e| invalid(e.to_string())),
        (PrimitiveType::Blob, Literal::String(body)) => STANDARD
            .decode(unescape(body))
            .map(|bytes| Value::String(STANDARD.encode(bytes)))
            .map_err(|e| invalid(e.to_string())),
        (PrimitiveType::Json, Literal::String(body)) => {
            serde_json::from_str::<serde_json::Value>(&unescape(body))
                .map(|json| Value::String(json.to_string()))
                .map_err(|e| invalid(e.to_string()))
        }
        _ => return None,
    };
    Some(value)
}

fn normalize_date(text: &str) -> Result<Value, String> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .map_err(|e| format!("`{}` is not a YYYY-MM-DD date ({})", text, e))
}

/// RFC 3339 input keeps its offset; a date-time without offset is taken as
/// UTC.
fn normalize_datetime(text: &str) -> Result<Value, String> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Value::String(
            parsed.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        ));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| {
            Value::String(
                Utc.from_utc_datetime(&naive)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            )
        })
        .ok_or_else(|| format!("`{}` is not an ISO-8601 date-time", text))
}

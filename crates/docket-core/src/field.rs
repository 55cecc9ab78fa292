//! Single-field validation: one value against one compiled schema entry.
//!
//! Checks run in a fixed order (type, format, membership, range) and the
//! first failure is returned. Everything here is pure; the caller supplies
//! the reference date.

use crate::dates;
use crate::schema::{CompiledField, FieldType};
use crate::uri;
use crate::value::FieldValue;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Type,
    Format,
    Enum,
    Range,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldErrorKind::Type => "type",
            FieldErrorKind::Format => "format",
            FieldErrorKind::Enum => "enum",
            FieldErrorKind::Range => "range",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("field '{field}': {message}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(field: &CompiledField, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.name.clone(),
            kind,
            message: message.into(),
        }
    }
}

type Check = Result<(), FieldError>;

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .unwrap()
    })
}

pub fn is_valid_email(s: &str) -> bool {
    email_re().is_match(s)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate `value` against `field`, returning the first violation.
pub fn validate_field(value: &FieldValue, field: &CompiledField, today: NaiveDate) -> Check {
    check_type(value, field)?;
    check_format(value, field)?;
    check_membership(value, field)?;
    check_range(value, field, today)
}

// ---------------------------------------------------------------------------
// 1. Type
// ---------------------------------------------------------------------------

fn check_type(value: &FieldValue, field: &CompiledField) -> Check {
    let expected = field.field_type();
    let ok = match (expected, value) {
        (FieldType::String | FieldType::Date | FieldType::Enum, FieldValue::String(_)) => true,
        (FieldType::Number, FieldValue::Number(_)) => true,
        (FieldType::Array, FieldValue::Sequence(_)) => true,
        (FieldType::Email, FieldValue::String(s)) => {
            if !is_valid_email(s) {
                return Err(FieldError::new(
                    field,
                    FieldErrorKind::Type,
                    format!("invalid email address '{s}'"),
                ));
            }
            true
        }
        (FieldType::Url, FieldValue::String(s)) => {
            if let Err(reason) = uri::parse_url(s) {
                return Err(FieldError::new(
                    field,
                    FieldErrorKind::Type,
                    format!("invalid URL '{s}': {reason}"),
                ));
            }
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(FieldError::new(
            field,
            FieldErrorKind::Type,
            format!("expected {expected}, found {}", value.type_name()),
        ))
    }
}

// ---------------------------------------------------------------------------
// 2. Format
// ---------------------------------------------------------------------------

fn check_format(value: &FieldValue, field: &CompiledField) -> Check {
    let Some(s) = value.as_str() else {
        return Ok(());
    };
    match field.field_type() {
        FieldType::String => {
            if let Some(pattern) = &field.pattern {
                if !pattern.is_match(s) {
                    return Err(FieldError::new(
                        field,
                        FieldErrorKind::Format,
                        format!("value '{s}' does not match format '{}'", pattern.as_str()),
                    ));
                }
            }
        }
        FieldType::Date => {
            if dates::parse_date(s, &field.date_format).is_none() {
                return Err(FieldError::new(
                    field,
                    FieldErrorKind::Format,
                    format!("invalid date '{s}' (expected format '{}')", field.date_format),
                ));
            }
        }
        FieldType::Url if !field.config.schemes.is_empty() => {
            let scheme = uri::parse_url(s)
                .map(|u| u.scheme_lower())
                .unwrap_or_default();
            if !field.config.schemes.contains(&scheme) {
                return Err(FieldError::new(
                    field,
                    FieldErrorKind::Format,
                    format!(
                        "URL scheme '{scheme}' is not allowed (allowed: {})",
                        field.config.schemes.join(", ")
                    ),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Membership
// ---------------------------------------------------------------------------

fn check_membership(value: &FieldValue, field: &CompiledField) -> Check {
    if field.field_type() != FieldType::Enum {
        return Ok(());
    }
    let Some(s) = value.as_str() else {
        return Ok(());
    };
    if field.allowed_match(s).is_none() {
        return Err(FieldError::new(
            field,
            FieldErrorKind::Enum,
            format!(
                "value '{s}' is not one of [{}]",
                field.config.allowed_values.join(", ")
            ),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Range
// ---------------------------------------------------------------------------

fn check_range(value: &FieldValue, field: &CompiledField, today: NaiveDate) -> Check {
    match (field.field_type(), value) {
        (FieldType::String, FieldValue::String(s)) => {
            check_length(field, s.chars().count(), "string")
        }
        (FieldType::Number, FieldValue::Number(n)) => check_number(field, n.as_f64()),
        (FieldType::Date, FieldValue::String(s)) => check_date(field, s, today),
        (FieldType::Array, FieldValue::Sequence(items)) => check_array(field, items),
        _ => Ok(()),
    }
}

fn range_error(field: &CompiledField, message: String) -> FieldError {
    FieldError::new(field, FieldErrorKind::Range, message)
}

fn check_length(field: &CompiledField, len: usize, what: &str) -> Check {
    if let Some(min) = field.config.min_length {
        if len < min {
            return Err(range_error(
                field,
                format!("{what} length {len} is below minimum {min}"),
            ));
        }
    }
    if let Some(max) = field.config.max_length {
        if len > max {
            return Err(range_error(
                field,
                format!("{what} length {len} exceeds maximum {max}"),
            ));
        }
    }
    Ok(())
}

fn check_number(field: &CompiledField, n: f64) -> Check {
    if let Some(min) = field.config.min_value {
        if n < min {
            return Err(range_error(field, format!("value {n} is below minimum {min}")));
        }
    }
    if let Some(max) = field.config.max_value {
        if n > max {
            return Err(range_error(field, format!("value {n} exceeds maximum {max}")));
        }
    }
    Ok(())
}

fn check_date(field: &CompiledField, s: &str, today: NaiveDate) -> Check {
    let Some(date) = dates::parse_date(s, &field.date_format) else {
        return Ok(());
    };
    if let Some(lower) = field.min_date.and_then(|b| b.lower(today)) {
        if date < lower {
            return Err(range_error(
                field,
                format!(
                    "date '{s}' is before the earliest allowed date {}",
                    dates::format_date(lower, &field.date_format)
                ),
            ));
        }
    }
    if let Some(upper) = field.max_date.and_then(|b| b.upper(today)) {
        if date > upper {
            return Err(range_error(
                field,
                format!(
                    "date '{s}' is after the latest allowed date {}",
                    dates::format_date(upper, &field.date_format)
                ),
            ));
        }
    }
    Ok(())
}

fn check_array(field: &CompiledField, items: &[FieldValue]) -> Check {
    check_length(field, items.len(), "array")?;

    if let Some(item_type) = field.config.item_type {
        for (i, item) in items.iter().enumerate() {
            let ok = match (item_type, item) {
                (FieldType::Number, FieldValue::Number(_)) => true,
                (FieldType::String | FieldType::Enum, FieldValue::String(_)) => true,
                _ => false,
            };
            if !ok {
                return Err(range_error(
                    field,
                    format!(
                        "element {i}: expected {item_type}, found {}",
                        item.type_name()
                    ),
                ));
            }
            if item_type == FieldType::Enum {
                let s = item.as_str().unwrap_or_default();
                if field.allowed_match(s).is_none() {
                    return Err(range_error(
                        field,
                        format!(
                            "element {i}: value '{s}' is not one of [{}]",
                            field.config.allowed_values.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    if field.config.unique {
        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item.identity_key()) {
                return Err(range_error(field, format!("duplicate value '{item}' in array")));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

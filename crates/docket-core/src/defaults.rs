use crate::dates;
use crate::error::{DocketError, Result};
use crate::frontmatter::WorkItem;
use crate::schema::{is_hardcoded, CompiledField, FieldType, Schema};
use crate::value::{FieldValue, Number};
use chrono::NaiveDate;

/// Resolve a field's configured default into its native type.
///
/// Returns `Ok(None)` when no default is configured. A default that cannot
/// be coerced (an out-of-enum value, an unparseable date or number) is a
/// configuration error.
pub fn resolve_default(field: &CompiledField, today: NaiveDate) -> Result<Option<FieldValue>> {
    let Some(raw) = field.config.default.clone() else {
        return Ok(None);
    };
    let raw = FieldValue::from(raw);
    if raw.is_empty_equivalent() {
        return Ok(None);
    }
    let invalid = |msg: String| {
        DocketError::Config(format!("invalid default for field '{}': {msg}", field.name))
    };
    let scalar_text = |v: &FieldValue| -> Result<String> {
        if v.is_scalar() {
            Ok(v.to_string())
        } else {
            Err(invalid(format!("expected a scalar, found {}", v.type_name())))
        }
    };

    let value = match field.field_type() {
        FieldType::String | FieldType::Email | FieldType::Url => match raw {
            FieldValue::String(_) => raw,
            other => FieldValue::String(scalar_text(&other)?),
        },
        FieldType::Date => {
            let text = scalar_text(&raw)?;
            if text.trim().eq_ignore_ascii_case(dates::TODAY) {
                FieldValue::String(dates::format_date(today, &field.date_format))
            } else if dates::parse_date(&text, &field.date_format).is_some() {
                FieldValue::String(text)
            } else {
                return Err(invalid(format!(
                    "'{text}' does not match date format '{}'",
                    field.date_format
                )));
            }
        }
        FieldType::Number => match raw {
            FieldValue::Number(_) => raw,
            FieldValue::String(s) => Number::parse(&s)
                .map(FieldValue::Number)
                .ok_or_else(|| invalid(format!("'{s}' is not a number")))?,
            other => return Err(invalid(format!("expected a number, found {}", other.type_name()))),
        },
        FieldType::Array => match raw {
            FieldValue::Sequence(_) => raw,
            FieldValue::Mapping(_) => {
                return Err(invalid("expected a sequence, found mapping".into()))
            }
            scalar => FieldValue::Sequence(vec![scalar]),
        },
        FieldType::Enum => {
            let text = scalar_text(&raw)?;
            let canonical = field.allowed_match(&text).ok_or_else(|| {
                invalid(format!(
                    "'{text}' is not one of [{}]",
                    field.config.allowed_values.join(", ")
                ))
            })?;
            FieldValue::String(canonical.to_string())
        }
    };
    Ok(Some(value))
}

/// Resolve every configured default once, so a bad default stops a run
/// before any file is touched.
pub fn check_defaults(schema: &Schema, today: NaiveDate) -> Result<()> {
    for field in schema.fields() {
        resolve_default(field, today)?;
    }
    Ok(())
}

/// Fill missing or empty configurable fields from their defaults. Returns
/// the names of the fields that were added. Non-empty values and hardcoded
/// fields are never touched.
pub fn apply_defaults(item: &mut WorkItem, schema: &Schema, today: NaiveDate) -> Result<Vec<String>> {
    let mut added = Vec::new();
    for field in schema.fields() {
        if is_hardcoded(&field.name) {
            continue;
        }
        if item
            .field(&field.name)
            .is_some_and(|v| !v.is_empty_equivalent())
        {
            continue;
        }
        if let Some(value) = resolve_default(field, today)? {
            item.set_field(&field.name, value);
            added.push(field.name.clone());
        }
    }
    Ok(added)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::FieldConfig;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn field(yaml: &str) -> CompiledField {
        let cfg: FieldConfig = serde_yaml::from_str(yaml).unwrap();
        CompiledField::compile("f", &cfg).unwrap()
    }

    fn resolve(yaml: &str) -> Result<Option<FieldValue>> {
        resolve_default(&field(yaml), today())
    }

    #[test]
    fn resolves_native_types() {
        assert_eq!(resolve("type: string").unwrap(), None);
        assert_eq!(
            resolve("type: string\ndefault: 42").unwrap(),
            Some(FieldValue::from("42"))
        );
        assert_eq!(
            resolve("type: date\ndefault: today").unwrap(),
            Some(FieldValue::from("2024-06-10"))
        );
        assert_eq!(
            resolve("type: date\nformat: '%d/%m/%Y'\ndefault: today").unwrap(),
            Some(FieldValue::from("10/06/2024"))
        );
        assert_eq!(
            resolve("type: number\ndefault: '3'").unwrap(),
            Some(FieldValue::from(3_i64))
        );
        assert_eq!(
            resolve("type: number\ndefault: 2.5").unwrap(),
            Some(FieldValue::from(2.5_f64))
        );
        assert_eq!(
            resolve("type: array\ndefault: backend").unwrap(),
            Some(FieldValue::from(vec!["backend"]))
        );
        assert_eq!(
            resolve("type: enum\nallowed_values: [low, medium]\ncase_sensitive: false\ndefault: MEDIUM")
                .unwrap(),
            Some(FieldValue::from("medium"))
        );
    }

    #[test]
    fn invalid_defaults_are_config_errors() {
        for yaml in [
            "type: enum\nallowed_values: [low, medium]\ndefault: urgent",
            "type: date\ndefault: tomorrow",
            "type: number\ndefault: lots",
            "type: array\ndefault: {a: b}",
        ] {
            let err = resolve(yaml).unwrap_err();
            assert!(err.is_fatal(), "{yaml}");
        }
    }

    fn schema() -> Schema {
        let mut cfg = Config::new("test");
        let mut priority = FieldConfig::new(FieldType::Enum);
        priority.allowed_values = vec!["low".into(), "medium".into()];
        priority.default = Some("medium".into());
        cfg.fields.insert("priority".into(), priority);
        let mut due = FieldConfig::new(FieldType::Date);
        due.default = Some("today".into());
        cfg.fields.insert("due".into(), due);
        let mut title = FieldConfig::new(FieldType::String);
        title.default = Some("Untitled".into());
        cfg.fields.insert("title".into(), title);
        cfg.fields.insert("notes".into(), FieldConfig::new(FieldType::String));
        cfg.schema().unwrap()
    }

    #[test]
    fn applies_missing_and_empty_only() {
        let mut item = WorkItem::default();
        item.set_field("priority", FieldValue::from("low"));
        item.set_field("due", FieldValue::from(""));
        let added = apply_defaults(&mut item, &schema(), today()).unwrap();
        assert_eq!(added, vec!["due".to_string()]);
        assert_eq!(item.field("priority"), Some(&FieldValue::from("low")));
        assert_eq!(item.field("due"), Some(&FieldValue::from("2024-06-10")));
        assert!(item.field("notes").is_none());
    }

    #[test]
    fn hardcoded_fields_are_exempt() {
        let mut item = WorkItem::default();
        apply_defaults(&mut item, &schema(), today()).unwrap();
        assert_eq!(item.title, "");
        assert!(item.field("title").is_none());
    }

    #[test]
    fn check_defaults_surfaces_bad_default() {
        let mut cfg = Config::new("test");
        let mut size = FieldConfig::new(FieldType::Enum);
        size.allowed_values = vec!["s".into(), "m".into()];
        size.default = Some("xl".into());
        cfg.fields.insert("size".into(), size);
        let schema = cfg.schema().unwrap();
        assert!(check_defaults(&schema, today()).is_err());
        assert!(apply_defaults(&mut WorkItem::default(), &schema, today()).is_err());
    }
}

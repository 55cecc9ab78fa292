//! Deterministic, semantics-preserving repairs of field values.
//!
//! A fixer only ever rewrites a value into an equivalent canonical form.
//! Anything it cannot repair is left for the validator to report.

use crate::dates;
use crate::field::is_valid_email;
use crate::frontmatter::WorkItem;
use crate::schema::{CompiledField, FieldType, Schema};
use crate::value::FieldValue;

fn fixed(name: &str, old: &str, new: &str) -> String {
    format!("fixed field '{name}': '{old}' -> '{new}'")
}

/// Canonicalize configurable field values in place. Returns one message per
/// value changed.
pub fn fix_values(item: &mut WorkItem, schema: &Schema) -> Vec<String> {
    let mut changes = Vec::new();
    for (name, value) in item.fields.iter_mut() {
        let Some(field) = schema.field(name) else {
            continue;
        };
        let FieldValue::String(current) = value else {
            continue;
        };
        if current.trim().is_empty() {
            continue;
        }
        if let Some(new) = canonical(field, current) {
            if new != *current {
                changes.push(fixed(name, current, &new));
                *current = new;
            }
        }
    }
    changes
}

fn canonical(field: &CompiledField, current: &str) -> Option<String> {
    match field.field_type() {
        FieldType::Date => {
            if dates::parse_date(current, &field.date_format).is_some() {
                return None;
            }
            dates::parse_alternate(current).map(|d| dates::format_date(d, &field.date_format))
        }
        FieldType::Enum => field.allowed_match(current.trim()).map(str::to_string),
        FieldType::Email => {
            let trimmed = current.trim();
            let lower = trimmed.to_lowercase();
            if lower != trimmed && is_valid_email(&lower) {
                Some(lower)
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Rewrite a `created` value in any known encoding to strict `YYYY-MM-DD`.
pub fn fix_created(item: &mut WorkItem) -> Option<String> {
    let current = item.created.as_str();
    if current.trim().is_empty() || dates::parse_iso_date(current).is_some() {
        return None;
    }
    let new = dates::parse_alternate(current)?.format(dates::DEFAULT_DATE_FORMAT).to_string();
    let message = fixed("created", current, &new);
    item.created = new;
    Some(message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::FieldConfig;

    fn schema() -> Schema {
        let mut cfg = Config::new("test");
        let mut priority = FieldConfig::new(FieldType::Enum);
        priority.allowed_values = vec!["low".into(), "medium".into(), "high".into()];
        priority.case_sensitive = Some(false);
        cfg.fields.insert("priority".into(), priority);
        let mut size = FieldConfig::new(FieldType::Enum);
        size.allowed_values = vec!["S".into(), "M".into()];
        cfg.fields.insert("size".into(), size);
        cfg.fields.insert("due".into(), FieldConfig::new(FieldType::Date));
        let mut review = FieldConfig::new(FieldType::Date);
        review.format = Some("%d.%m.%Y".into());
        cfg.fields.insert("review".into(), review);
        cfg.fields.insert("assignee".into(), FieldConfig::new(FieldType::Email));
        cfg.fields.insert("notes".into(), FieldConfig::new(FieldType::String));
        cfg.schema().unwrap()
    }

    fn item_with(name: &str, value: &str) -> WorkItem {
        let mut item = WorkItem::default();
        item.set_field(name, FieldValue::from(value));
        item
    }

    #[test]
    fn case_insensitive_enum_gets_canonical_case() {
        let schema = schema();
        let mut item = item_with("priority", "MEDIUM");
        let changes = fix_values(&mut item, &schema);
        assert_eq!(changes, vec!["fixed field 'priority': 'MEDIUM' -> 'medium'".to_string()]);
        assert_eq!(item.field("priority"), Some(&FieldValue::from("medium")));

        let mut item = item_with("priority", "medium");
        assert!(fix_values(&mut item, &schema).is_empty());
    }

    #[test]
    fn case_sensitive_enum_is_only_trimmed() {
        let schema = schema();
        let mut item = item_with("size", "m");
        assert!(fix_values(&mut item, &schema).is_empty());
        assert_eq!(item.field("size"), Some(&FieldValue::from("m")));

        let mut item = item_with("size", " M ");
        assert_eq!(fix_values(&mut item, &schema).len(), 1);
        assert_eq!(item.field("size"), Some(&FieldValue::from("M")));
    }

    #[test]
    fn dates_are_rewritten_to_configured_format() {
        let schema = schema();
        for (raw, expected) in [
            ("2024/03/05", "2024-03-05"),
            ("03/05/2024", "2024-03-05"),
            ("2024-03-05T10:30:00Z", "2024-03-05"),
            ("2024-03-05T10:30:00.123+02:00", "2024-03-05"),
        ] {
            let mut item = item_with("due", raw);
            assert_eq!(fix_values(&mut item, &schema).len(), 1, "{raw}");
            assert_eq!(item.field("due"), Some(&FieldValue::from(expected)));
        }

        let mut item = item_with("review", "2024-03-05");
        fix_values(&mut item, &schema);
        assert_eq!(item.field("review"), Some(&FieldValue::from("05.03.2024")));

        let mut item = item_with("due", "next tuesday");
        assert!(fix_values(&mut item, &schema).is_empty());
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        let schema = schema();
        let mut item = item_with("assignee", "  Ada@Example.COM ");
        let changes = fix_values(&mut item, &schema);
        assert_eq!(changes.len(), 1);
        assert_eq!(item.field("assignee"), Some(&FieldValue::from("ada@example.com")));

        let mut item = item_with("assignee", "not-an-email");
        assert!(fix_values(&mut item, &schema).is_empty());
    }

    #[test]
    fn unfixable_types_and_unknown_fields_are_untouched() {
        let schema = schema();
        let mut item = item_with("notes", "  padded  ");
        item.set_field("extra", FieldValue::from("WHATEVER"));
        assert!(fix_values(&mut item, &schema).is_empty());
        assert_eq!(item.field("notes"), Some(&FieldValue::from("  padded  ")));
    }

    #[test]
    fn created_is_normalized() {
        let mut item = WorkItem {
            created: "2024/01/15".into(),
            ..WorkItem::default()
        };
        assert_eq!(
            fix_created(&mut item).as_deref(),
            Some("fixed field 'created': '2024/01/15' -> '2024-01-15'")
        );
        assert_eq!(item.created, "2024-01-15");
        assert!(fix_created(&mut item).is_none());

        item.created = "someday".into();
        assert!(fix_created(&mut item).is_none());
        assert_eq!(item.created, "someday");
    }
}

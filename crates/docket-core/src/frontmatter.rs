//! Work item documents: a YAML front-matter block between two `---` lines,
//! followed by a markdown body that is carried through byte-for-byte.

use crate::error::{DocketError, Result};
use crate::schema::is_hardcoded;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub status: String,
    pub kind: String,
    pub created: String,
    /// Configurable fields. Never contains a hardcoded field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl WorkItem {
    /// Hardcoded fields in canonical order.
    pub fn hardcoded(&self) -> [(&'static str, &str); 5] {
        [
            ("id", &self.id),
            ("title", &self.title),
            ("status", &self.status),
            ("kind", &self.kind),
            ("created", &self.created),
        ]
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Assign a configurable field. Hardcoded names are refused.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        if is_hardcoded(name) {
            return false;
        }
        self.fields.insert(name.to_string(), value);
        true
    }
}

/// Raw hardcoded scalars. Deserializing straight into `String` keeps the
/// scalar text as written, so `id: 001` stays `"001"`.
#[derive(Debug, Default, Deserialize)]
struct HardcodedScalars {
    id: Option<String>,
    title: Option<String>,
    status: Option<String>,
    kind: Option<String>,
    created: Option<String>,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub item: WorkItem,
    /// Everything after the closing delimiter line, unmodified.
    pub body: String,
}

impl Document {
    pub fn new(item: WorkItem, body: impl Into<String>) -> Self {
        Self {
            item,
            body: body.into(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DocketError::parse(path, format!("unreadable: {e}")))?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self> {
        let (yaml, body) = split(raw).map_err(|msg| DocketError::parse(path, msg))?;
        let item = parse_item(yaml).map_err(|msg| DocketError::parse(path, msg))?;
        Ok(Self::new(item, body))
    }

    pub fn render(&self) -> Result<String> {
        crate::writer::render(&self.item, &self.body)
    }
}

/// Split a document into its YAML block and body.
fn split(raw: &str) -> std::result::Result<(&str, &str), &'static str> {
    let mut offset = 0;
    let mut lines = raw.split_inclusive('\n');
    let mut yaml_start = None;

    for line in lines.by_ref() {
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            continue;
        }
        if content == DELIMITER {
            yaml_start = Some(offset);
            break;
        }
        return Err("missing front matter: first line is not '---'");
    }
    let yaml_start = yaml_start.ok_or("missing front matter")?;

    for line in lines {
        let line_start = offset;
        offset += line.len();
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            return Ok((&raw[yaml_start..line_start], &raw[offset..]));
        }
    }
    Err("unterminated front matter: no closing '---'")
}

fn parse_item(yaml: &str) -> std::result::Result<WorkItem, String> {
    if yaml.trim().is_empty() {
        return Ok(WorkItem::default());
    }
    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| format!("malformed YAML: {e}"))?;
    let mapping = match value {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => return Ok(WorkItem::default()),
        other => {
            return Err(format!(
                "front matter must be a mapping, found {}",
                FieldValue::from(other).type_name()
            ))
        }
    };
    let scalars: HardcodedScalars = serde_yaml::from_str(yaml)
        .map_err(|e| format!("hardcoded fields must be scalars: {e}"))?;

    let mut item = WorkItem {
        id: scalars.id.unwrap_or_default(),
        title: scalars.title.unwrap_or_default(),
        status: scalars.status.unwrap_or_default(),
        kind: scalars.kind.unwrap_or_default(),
        created: scalars.created.unwrap_or_default(),
        fields: BTreeMap::new(),
    };
    for (key, value) in mapping {
        let name = FieldValue::from(key).to_string();
        if !is_hardcoded(&name) {
            item.fields.insert(name, FieldValue::from(value));
        }
    }
    Ok(item)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

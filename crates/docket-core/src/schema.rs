use crate::config::Config;
use crate::dates::{self, DateBound};
use crate::error::{DocketError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Fields every work item carries, in canonical write order.
pub const HARDCODED_FIELDS: [&str; 5] = ["id", "title", "status", "kind", "created"];

pub fn is_hardcoded(name: &str) -> bool {
    HARDCODED_FIELDS.contains(&name)
}

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    String,
    Date,
    Email,
    Url,
    Number,
    Array,
    Enum,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Array => "array",
            FieldType::Enum => "enum",
        }
    }

    /// Types allowed as the element type of an `array` field.
    pub fn is_item_type(self) -> bool {
        matches!(self, FieldType::String | FieldType::Number | FieldType::Enum)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = DocketError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "date" => Ok(FieldType::Date),
            "email" => Ok(FieldType::Email),
            "url" => Ok(FieldType::Url),
            "number" => Ok(FieldType::Number),
            "array" => Ok(FieldType::Array),
            "enum" => Ok(FieldType::Enum),
            _ => Err(DocketError::Config(format!("unknown field type '{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldConfig
// ---------------------------------------------------------------------------

/// One schema entry as written in `.docket/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Seed value; for dates the token `today` means the current date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
    /// Regex for strings, strftime pattern for dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
}

impl FieldConfig {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// CompiledField
// ---------------------------------------------------------------------------

/// A schema entry with its patterns compiled and bounds resolved.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub config: FieldConfig,
    pub pattern: Option<Regex>,
    pub date_format: String,
    pub min_date: Option<DateBound>,
    pub max_date: Option<DateBound>,
}

impl CompiledField {
    pub fn compile(name: &str, config: &FieldConfig) -> Result<Self> {
        let err = |msg: String| DocketError::Config(format!("field '{name}': {msg}"));
        let date_format = dates::effective_format(config.format.as_deref()).to_string();

        let mut pattern = None;
        match config.field_type {
            FieldType::String => {
                if let Some(f) = config.format.as_deref().filter(|f| !f.is_empty()) {
                    pattern = Some(
                        Regex::new(f).map_err(|e| err(format!("invalid format regex: {e}")))?,
                    );
                }
            }
            FieldType::Date => dates::check_format(&date_format).map_err(err)?,
            FieldType::Enum => {
                if config.allowed_values.is_empty() {
                    return Err(err("enum field has no allowed_values".into()));
                }
            }
            FieldType::Array => {
                if let Some(item) = config.item_type {
                    if !item.is_item_type() {
                        return Err(err(format!("unsupported array item_type '{item}'")));
                    }
                    if item == FieldType::Enum && config.allowed_values.is_empty() {
                        return Err(err("enum array has no allowed_values".into()));
                    }
                }
            }
            FieldType::Email | FieldType::Url | FieldType::Number => {}
        }

        if let (Some(min), Some(max)) = (config.min_length, config.max_length) {
            if min > max {
                return Err(err(format!("min_length {min} exceeds max_length {max}")));
            }
        }
        if let (Some(min), Some(max)) = (config.min_value, config.max_value) {
            if min > max {
                return Err(err(format!("min_value {min} exceeds max_value {max}")));
            }
        }

        let bound = |raw: &Option<String>| -> Result<Option<DateBound>> {
            raw.as_deref()
                .filter(|r| !r.trim().is_empty())
                .map(|r| DateBound::parse(r, &date_format).map_err(err))
                .transpose()
        };
        let min_date = bound(&config.min_date)?;
        let max_date = bound(&config.max_date)?;
        if let (Some(DateBound::Absolute(min)), Some(DateBound::Absolute(max))) = (min_date, max_date)
        {
            if min > max {
                return Err(err(format!("min_date {min} is after max_date {max}")));
            }
        }

        let mut config = config.clone();
        for scheme in &mut config.schemes {
            *scheme = scheme.to_ascii_lowercase();
        }

        Ok(Self {
            name: name.to_string(),
            config,
            pattern,
            date_format,
            min_date,
            max_date,
        })
    }

    pub fn field_type(&self) -> FieldType {
        self.config.field_type
    }

    /// Enum matching is case-sensitive unless explicitly disabled.
    pub fn case_sensitive(&self) -> bool {
        self.config.case_sensitive.unwrap_or(true)
    }

    /// The allowed value `candidate` matches, honouring case sensitivity.
    pub fn allowed_match(&self, candidate: &str) -> Option<&str> {
        let values = &self.config.allowed_values;
        let exact = values.iter().find(|v| v.as_str() == candidate);
        if exact.is_some() || self.case_sensitive() {
            return exact.map(String::as_str);
        }
        values
            .iter()
            .find(|v| v.to_lowercase() == candidate.to_lowercase())
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The immutable, compiled schema shared by every validator, resolver and
/// fixer for the duration of a run.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: BTreeMap<String, CompiledField>,
    required: BTreeSet<String>,
    id_format: String,
    id_pattern: Regex,
    status_values: Vec<String>,
    strict: bool,
    status_folders: BTreeMap<String, String>,
    active_status: String,
}

impl Schema {
    pub fn compile(config: &Config) -> Result<Self> {
        let mut fields = BTreeMap::new();
        for (name, field) in &config.fields {
            fields.insert(name.clone(), CompiledField::compile(name, field)?);
        }

        let mut required: BTreeSet<String> = config
            .validation
            .required_fields
            .iter()
            .filter(|f| !is_hardcoded(f))
            .cloned()
            .collect();
        required.extend(
            fields
                .values()
                .filter(|f| f.config.required && !is_hardcoded(&f.name))
                .map(|f| f.name.clone()),
        );

        let id_format = config.validation.id_format.clone();
        let id_pattern = Regex::new(&id_format)
            .map_err(|e| DocketError::Config(format!("invalid id_format '{id_format}': {e}")))?;

        Ok(Self {
            fields,
            required,
            id_format,
            id_pattern,
            status_values: config.validation.status_values.clone(),
            strict: config.validation.strict,
            status_folders: config.status_folders.clone(),
            active_status: config.active_status.clone(),
        })
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.values()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn id_format(&self) -> &str {
        &self.id_format
    }

    pub fn id_matches(&self, id: &str) -> bool {
        self.id_pattern.is_match(id)
    }

    pub fn status_values(&self) -> &[String] {
        &self.status_values
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Folder name that holds the single active work item, if configured.
    pub fn active_folder(&self) -> Option<&str> {
        self.status_folders
            .get(&self.active_status)
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

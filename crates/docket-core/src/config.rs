use crate::error::{DocketError, Result};
use crate::paths;
use crate::schema::{is_hardcoded, FieldConfig, FieldType, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(default = "default_id_format")]
    pub id_format: String,
    #[serde(default = "default_status_values")]
    pub status_values: Vec<String>,
    /// Report fields that have no schema entry.
    #[serde(default)]
    pub strict: bool,
}

fn default_id_format() -> String {
    r"^\d{3}$".to_string()
}

fn default_status_values() -> Vec<String> {
    vec!["todo".to_string(), "doing".to_string(), "done".to_string()]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            id_format: default_id_format(),
            status_values: default_status_values(),
            strict: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldConfig>,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default = "default_status_folders")]
    pub status_folders: BTreeMap<String, String>,
    #[serde(default = "default_active_status")]
    pub active_status: String,
}

fn default_version() -> u32 {
    1
}

fn default_status_folders() -> BTreeMap<String, String> {
    default_status_values()
        .into_iter()
        .map(|s| (s.clone(), s))
        .collect()
}

fn default_active_status() -> String {
    "doing".to_string()
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            fields: BTreeMap::new(),
            validation: ValidationConfig::default(),
            status_folders: default_status_folders(),
            active_status: default_active_status(),
        }
    }

    /// A new config with a small starter schema, written by `docket init`.
    pub fn starter(project_name: impl Into<String>) -> Self {
        let mut cfg = Self::new(project_name);

        let mut priority = FieldConfig::new(FieldType::Enum);
        priority.allowed_values = vec!["low".into(), "medium".into(), "high".into()];
        priority.case_sensitive = Some(false);
        priority.default = Some(serde_yaml::Value::String("medium".into()));
        cfg.fields.insert("priority".into(), priority);

        let mut tags = FieldConfig::new(FieldType::Array);
        tags.item_type = Some(FieldType::String);
        tags.unique = true;
        cfg.fields.insert("tags".into(), tags);

        cfg.fields
            .insert("assignee".into(), FieldConfig::new(FieldType::Email));

        let mut due = FieldConfig::new(FieldType::Date);
        due.min_date = Some("today".into());
        cfg.fields.insert("due".into(), due);

        cfg
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(DocketError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&data)
            .map_err(|e| DocketError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Compile the schema. Any error here is fatal for a run.
    pub fn schema(&self) -> Result<Schema> {
        Schema::compile(self)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = self.schema() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        for name in &self.validation.required_fields {
            if !is_hardcoded(name) && !self.fields.contains_key(name) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "required field '{name}' has no schema entry; only presence is checked"
                    ),
                });
            }
        }

        for name in self.fields.keys().filter(|n| is_hardcoded(n)) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "field '{name}' is hardcoded; its schema entry is ignored by validation and defaults"
                ),
            });
        }

        if !self.status_folders.contains_key(&self.active_status) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "active status '{}' has no entry in status_folders; the workflow check is disabled",
                    self.active_status
                ),
            });
        }

        for status in self.status_folders.keys() {
            if !self.validation.status_values.contains(status) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "status folder '{status}' is not listed in validation.status_values"
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

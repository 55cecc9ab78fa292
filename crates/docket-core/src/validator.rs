//! Whole-item and whole-tree validation.
//!
//! Each file is checked on its own (hardcoded fields, then every
//! configurable field against the schema). Cross-file rules run once after
//! every file has been parsed: duplicate IDs and the single-active-item
//! workflow rule.

use crate::dates;
use crate::error::{DocketError, Result};
use crate::field::validate_field;
use crate::frontmatter::{Document, WorkItem};
use crate::paths;
use crate::report::Report;
use crate::schema::Schema;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A discovered file and the outcome of reading and parsing it.
pub type Parsed = (PathBuf, Result<Document>);

pub struct Validator<'a> {
    schema: &'a Schema,
    today: NaiveDate,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema, today: NaiveDate) -> Self {
        Self { schema, today }
    }

    /// Every violation in a single item, in a stable order.
    pub fn validate_item(&self, item: &WorkItem) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in item.hardcoded() {
            if value.trim().is_empty() {
                errors.push(format!("missing required field '{name}'"));
            }
        }
        if !item.id.trim().is_empty() && !self.schema.id_matches(&item.id) {
            errors.push(format!(
                "invalid id '{}': must match '{}'",
                item.id,
                self.schema.id_format()
            ));
        }
        let statuses = self.schema.status_values();
        if !item.status.trim().is_empty() && !statuses.is_empty() && !statuses.contains(&item.status)
        {
            errors.push(format!(
                "invalid status '{}': must be one of [{}]",
                item.status,
                statuses.join(", ")
            ));
        }
        if !item.created.trim().is_empty() && dates::parse_iso_date(&item.created).is_none() {
            errors.push(format!(
                "invalid created date '{}': expected YYYY-MM-DD",
                item.created
            ));
        }

        for name in self.schema.required_fields() {
            if item.field(name).map_or(true, |v| v.is_empty_equivalent()) {
                errors.push(format!("missing required field '{name}'"));
            }
        }

        for (name, value) in &item.fields {
            match self.schema.field(name) {
                Some(field) => {
                    if value.is_empty_equivalent() {
                        continue;
                    }
                    if let Err(e) = validate_field(value, field, self.today) {
                        errors.push(e.to_string());
                    }
                }
                None if self.schema.strict() => {
                    errors.push(format!("unknown field '{name}' (strict mode)"));
                }
                None => {}
            }
        }

        errors
    }

    /// Validate already-read documents. `docs` should be in discovery order;
    /// the first file of a duplicate-ID group carries the error.
    pub fn validate_documents(&self, root: &Path, docs: &[Parsed]) -> Report {
        let mut report = Report::new();
        let mut by_id: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();

        for (path, parsed) in docs {
            match parsed {
                Ok(doc) => {
                    debug!(path = %path.display(), "validating");
                    for message in self.validate_item(&doc.item) {
                        report.push(path, message);
                    }
                    let id = doc.item.id.trim();
                    if !id.is_empty() {
                        by_id.entry(id).or_default().push(path);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse");
                    report.push(path, parse_message(e));
                }
            }
        }

        for (id, owners) in &by_id {
            if owners.len() > 1 {
                let names: Vec<String> =
                    owners.iter().map(|p| paths::display_path(root, p)).collect();
                report.push(
                    owners[0],
                    format!(
                        "duplicate id '{id}' used by {} files: {}",
                        owners.len(),
                        names.join(", ")
                    ),
                );
            }
        }

        if let Some(folder) = self.schema.active_folder() {
            let active_dir = paths::status_dir(root, folder);
            let active: Vec<String> = docs
                .iter()
                .filter(|(p, _)| p.parent() == Some(active_dir.as_path()))
                .map(|(p, _)| paths::display_path(root, p))
                .collect();
            if active.len() > 1 {
                report.push(
                    &active_dir,
                    format!(
                        "workflow violation: {} items in '{}' (at most 1 allowed): {}",
                        active.len(),
                        folder,
                        active.join(", ")
                    ),
                );
            }
        }

        report
    }
}

pub(crate) fn parse_message(e: &DocketError) -> String {
    match e {
        DocketError::Parse { message, .. } => format!("parse error: {message}"),
        other => other.to_string(),
    }
}

/// Read every work item under `root`.
pub fn read_tree(root: &Path) -> Result<Vec<Parsed>> {
    Ok(paths::discover(root)?
        .into_iter()
        .map(|path| {
            let doc = Document::read(&path);
            (path, doc)
        })
        .collect())
}

/// Discover, parse and validate every work item under `root`. Only a
/// failure to walk the tree is an `Err`; everything per-file is reported.
pub fn validate_tree(root: &Path, schema: &Schema, today: NaiveDate) -> Result<Report> {
    let docs = read_tree(root)?;
    debug!(files = docs.len(), "discovered work items");
    Ok(Validator::new(schema, today).validate_documents(root, &docs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

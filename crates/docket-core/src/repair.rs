//! Repair runs: fill defaults, canonicalize values and renumber duplicate
//! IDs, rewriting only the files that actually changed.

use crate::defaults::{apply_defaults, check_defaults};
use crate::error::Result;
use crate::fixer::{fix_created, fix_values};
use crate::frontmatter::Document;
use crate::io;
use crate::paths;
use crate::report::Report;
use crate::schema::Schema;
use crate::validator::{parse_message, read_tree};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// New IDs are zero-padded to at least this many digits.
const MIN_ID_WIDTH: usize = 3;
/// Candidates tried by [`next_id`] before giving up on the ID format.
const MAX_ID_ATTEMPTS: u64 = 1000;

#[derive(Debug, Clone, Copy, Default)]
pub struct RepairOptions {
    /// Report what would change without writing anything.
    pub dry_run: bool,
}

/// Apply defaults, value fixes and the `created` fix to one document.
/// Returns one message per change; an empty list means nothing changed.
pub fn repair_document(doc: &mut Document, schema: &Schema, today: NaiveDate) -> Result<Vec<String>> {
    let mut changes = Vec::new();
    for name in apply_defaults(&mut doc.item, schema, today)? {
        let value = doc
            .item
            .field(&name)
            .map(ToString::to_string)
            .unwrap_or_default();
        changes.push(format!("added default for field '{name}': {value}"));
    }
    changes.extend(fix_values(&mut doc.item, schema));
    changes.extend(fix_created(&mut doc.item));
    Ok(changes)
}

/// Render `doc` and atomically replace `path`, which must lie under `root`.
pub fn write_document(root: &Path, path: &Path, doc: &Document) -> Result<()> {
    let target = paths::ensure_within_root(root, path)?;
    let text = doc.render()?;
    io::atomic_write(&target, text.as_bytes())
}

/// Repair every work item under `root`.
///
/// A bad configured default aborts before any file is read. Parse and
/// write failures are recorded against their file and the run continues.
pub fn repair_tree(
    root: &Path,
    schema: &Schema,
    today: NaiveDate,
    opts: RepairOptions,
) -> Result<Report> {
    check_defaults(schema, today)?;
    let mut report = Report::new();

    for (path, parsed) in read_tree(root)? {
        let mut doc = match parsed {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse");
                report.push(&path, parse_message(&e));
                continue;
            }
        };
        let changes = repair_document(&mut doc, schema, today)?;
        if changes.is_empty() {
            continue;
        }
        if let Err(message) = persist(root, &path, &doc, changes.len(), opts) {
            report.push(&path, message);
            continue;
        }
        for change in changes {
            report.push(&path, change);
        }
    }
    Ok(report)
}

fn persist(
    root: &Path,
    path: &Path,
    doc: &Document,
    changes: usize,
    opts: RepairOptions,
) -> std::result::Result<(), String> {
    let shown = paths::display_path(root, path);
    if opts.dry_run {
        debug!(path = %shown, changes, "dry run, not writing");
        return Ok(());
    }
    match write_document(root, path, doc) {
        Ok(()) => {
            info!(path = %shown, changes, "rewrote work item");
            Ok(())
        }
        Err(e) => {
            warn!(path = %shown, error = %e, "write failed");
            Err(format!("write failed: {e}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Duplicate IDs
// ---------------------------------------------------------------------------

/// Smallest unused ID above the highest numbered one. The numeric suffix is
/// zero-padded to the widest existing one (at least three digits) and the
/// result must match the configured ID format.
pub fn next_id<'a>(existing: impl IntoIterator<Item = &'a str>, schema: &Schema) -> Option<String> {
    let taken: BTreeSet<&str> = existing
        .into_iter()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();

    let mut width = MIN_ID_WIDTH;
    let mut highest: Option<(&str, u64)> = None;
    for id in &taken {
        let split = id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let Ok(n) = id[split..].parse::<u64>() else {
            continue;
        };
        width = width.max(id.len() - split);
        if highest.map_or(true, |(_, max)| n > max) {
            highest = Some((&id[..split], n));
        }
    }
    let (prefix, max) = highest.unwrap_or(("", 0));

    (1..=MAX_ID_ATTEMPTS)
        .filter_map(|step| max.checked_add(step))
        .map(|n| format!("{prefix}{n:0width$}"))
        .find(|candidate| !taken.contains(candidate.as_str()) && schema.id_matches(candidate))
}

/// Give every file that shares an ID with an earlier file (in sorted path
/// order) a fresh ID from [`next_id`].
pub fn fix_duplicate_ids(root: &Path, schema: &Schema, opts: RepairOptions) -> Result<Report> {
    let docs = read_tree(root)?;
    let mut report = Report::new();
    let mut taken: Vec<String> = docs
        .iter()
        .filter_map(|(_, parsed)| parsed.as_ref().ok())
        .map(|doc| doc.item.id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let mut owners: BTreeMap<String, PathBuf> = BTreeMap::new();

    for (path, parsed) in docs {
        let mut doc = match parsed {
            Ok(doc) => doc,
            Err(e) => {
                report.push(&path, parse_message(&e));
                continue;
            }
        };
        let id = doc.item.id.trim().to_string();
        if id.is_empty() {
            continue;
        }
        let owner = match owners.get(&id) {
            Some(owner) => paths::display_path(root, owner),
            None => {
                owners.insert(id, path);
                continue;
            }
        };

        let Some(new_id) = next_id(taken.iter().map(String::as_str), schema) else {
            report.push(
                &path,
                format!(
                    "cannot renumber duplicate id '{id}': no free id matches '{}'",
                    schema.id_format()
                ),
            );
            continue;
        };
        debug!(path = %path.display(), duplicate_of = %owner, new_id = %new_id, "renumbering");
        let message = format!("fixed field 'id': '{}' -> '{new_id}'", doc.item.id);
        doc.item.id = new_id.clone();
        if let Err(e) = persist(root, &path, &doc, 1, opts) {
            report.push(&path, e);
            continue;
        }
        taken.push(new_id);
        report.push(&path, message);
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::output::{print_json, print_report, report_json};
use anyhow::Context;
use docket_core::config::Config;
use docket_core::repair::{self, RepairOptions};
use docket_core::report::Report;
use docket_core::{dates, schema::Schema};
use std::path::Path;

fn load_schema(root: &Path) -> anyhow::Result<Schema> {
    let config = Config::load(root).context("failed to load config")?;
    config.schema().context("invalid schema")
}

/// `docket fix`: defaults and value repairs.
pub fn run(root: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let schema = load_schema(root)?;
    let report = repair::repair_tree(root, &schema, dates::today(), RepairOptions { dry_run })
        .context("repair failed")?;
    show(root, &report, dry_run, json)
}

/// `docket fix-ids`: renumber duplicate IDs.
pub fn run_ids(root: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let schema = load_schema(root)?;
    let report = repair::fix_duplicate_ids(root, &schema, RepairOptions { dry_run })
        .context("renumbering failed")?;
    show(root, &report, dry_run, json)
}

fn show(root: &Path, report: &Report, dry_run: bool, json: bool) -> anyhow::Result<()> {
    if json {
        let mut value = report_json(root, report);
        value["dry_run"] = serde_json::Value::Bool(dry_run);
        return print_json(&value);
    }
    if report.is_empty() {
        println!("Nothing to fix.");
        return Ok(());
    }
    print_report(root, report);
    let state = if dry_run { "pending" } else { "applied" };
    println!("\n{} change(s) {state} in {} file(s)", report.len(), report.file_count());
    Ok(())
}

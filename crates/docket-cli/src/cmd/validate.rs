use crate::output::{print_json, print_report, report_json};
use anyhow::Context;
use docket_core::{config::Config, dates, validator};
use std::path::Path;

pub fn run(root: &Path, strict: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut schema = config.schema().context("invalid schema")?;
    if strict {
        schema = schema.with_strict(true);
    }

    let report = validator::validate_tree(root, &schema, dates::today())
        .context("failed to validate work items")?;

    if json {
        print_json(&report_json(root, &report))?;
    } else if report.is_empty() {
        println!("All work items are valid.");
    } else {
        print_report(root, &report);
        println!(
            "\n{} error(s) in {} file(s)",
            report.len(),
            report.file_count()
        );
    }

    if report.has_errors() {
        anyhow::bail!("validation found {} error(s)", report.len());
    }
    Ok(())
}

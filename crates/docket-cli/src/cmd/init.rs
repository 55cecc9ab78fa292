use anyhow::Context;
use docket_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string()),
    };

    println!("Initializing docket in: {}", root.display());

    let dir = paths::docket_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config = if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load existing config")?
    } else {
        let cfg = Config::starter(project_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    for folder in config.status_folders.values() {
        let p = paths::status_dir(root, folder);
        if p.is_dir() {
            println!("  exists:  {folder}/");
        } else {
            io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
            println!("  created: {folder}/");
        }
    }

    Ok(())
}

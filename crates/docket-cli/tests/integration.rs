#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn docket(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docket").unwrap();
    cmd.current_dir(dir.path())
        .env("DOCKET_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(dir: &TempDir) {
    docket(dir).arg("init").assert().success();
}

fn write_item(root: &Path, rel: &str, front: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!("---\n{front}---\n\nBody stays put.\n")).unwrap();
}

fn item(id: &str, status: &str) -> String {
    format!("id: {id}\ntitle: Item {id}\nstatus: {status}\nkind: task\ncreated: 2024-01-15\npriority: low\n")
}

// ---------------------------------------------------------------------------
// docket init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_folders() {
    let dir = TempDir::new().unwrap();
    docket(&dir)
        .args(["init", "--name", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .docket/config.yaml"));

    assert!(dir.path().join(".docket/config.yaml").exists());
    for folder in ["todo", "doing", "done"] {
        assert!(dir.path().join(folder).is_dir(), "{folder}");
    }
    let config = std::fs::read_to_string(dir.path().join(".docket/config.yaml")).unwrap();
    assert!(config.contains("name: demo"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    docket(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .docket/config.yaml"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    docket(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("docket init"));
}

// ---------------------------------------------------------------------------
// docket validate
// ---------------------------------------------------------------------------

#[test]
fn validate_clean_tree_succeeds() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "todo/001.md", &item("001", "todo"));
    docket(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All work items are valid."));
}

#[test]
fn validate_reports_errors_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "todo/001.md", &item("001", "todo"));
    write_item(dir.path(), "todo/002.md", &item("001", "todo"));
    write_item(
        dir.path(),
        "todo/003.md",
        "id: 003\ntitle: Bad\nstatus: todo\nkind: task\ncreated: 2024-01-15\npriority: urgent\n",
    );

    docket(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("todo/001.md: duplicate id '001' used by 2 files"))
        .stdout(predicate::str::contains("todo/003.md: field 'priority'"))
        .stderr(predicate::str::contains("error: validation found 2 error(s)"));
}

#[test]
fn validate_workflow_violation() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "doing/001.md", &item("001", "doing"));
    write_item(dir.path(), "doing/002.md", &item("002", "doing"));

    docket(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("workflow violation: 2 items in 'doing'"));
}

#[test]
fn validate_strict_flag_rejects_unknown_fields() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let mut front = item("001", "todo");
    front.push_str("sprint: 7\n");
    write_item(dir.path(), "todo/001.md", &front);

    docket(&dir).arg("validate").assert().success();
    docket(&dir)
        .args(["validate", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown field 'sprint' (strict mode)"));
}

#[test]
fn validate_json_output() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "todo/001.md", "id: 1\ntitle: T\nstatus: todo\nkind: task\ncreated: 2024-01-15\n");

    let out = docket(&dir)
        .args(["--json", "validate"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["has_errors"], true);
    assert_eq!(value["entries"][0]["path"], "todo/001.md");
    assert_eq!(value["entries"][0]["message"], r"invalid id '1': must match '^\d{3}$'");
}

// ---------------------------------------------------------------------------
// docket fix / fix-ids
// ---------------------------------------------------------------------------

#[test]
fn fix_applies_defaults_and_repairs() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(
        dir.path(),
        "todo/001.md",
        "id: 001\ntitle: T\nstatus: todo\nkind: task\ncreated: 2024/01/15\nassignee: ' Ada@Example.com'\n",
    );

    docket(&dir)
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("added default for field 'priority': medium"))
        .stdout(predicate::str::contains("fixed field 'created'"))
        .stdout(predicate::str::contains("fixed field 'assignee'"));

    let text = std::fs::read_to_string(dir.path().join("todo/001.md")).unwrap();
    assert_eq!(
        text,
        "---\nid: 001\ntitle: T\nstatus: todo\nkind: task\ncreated: 2024-01-15\nassignee: ada@example.com\npriority: medium\n---\n\nBody stays put.\n"
    );

    docket(&dir).arg("validate").assert().success();
    docket(&dir)
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to fix."));
}

#[test]
fn fix_dry_run_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "todo/001.md", "id: 001\ntitle: T\nstatus: todo\nkind: task\ncreated: 2024-01-15\npriority: HIGH\n");
    let before = std::fs::read_to_string(dir.path().join("todo/001.md")).unwrap();

    docket(&dir)
        .args(["fix", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fixed field 'priority': 'HIGH' -> 'high'"))
        .stdout(predicate::str::contains("1 change(s) pending in 1 file(s)"));
    assert_eq!(std::fs::read_to_string(dir.path().join("todo/001.md")).unwrap(), before);
}

#[test]
fn fix_ids_resolves_duplicates() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    write_item(dir.path(), "todo/a.md", &item("001", "todo"));
    write_item(dir.path(), "todo/b.md", &item("001", "todo"));

    docket(&dir).arg("validate").assert().failure();
    docket(&dir)
        .arg("fix-ids")
        .assert()
        .success()
        .stdout(predicate::str::contains("todo/b.md: fixed field 'id': '001' -> '002'"));
    docket(&dir).arg("validate").assert().success();

    let b = std::fs::read_to_string(dir.path().join("todo/b.md")).unwrap();
    assert!(b.starts_with("---\nid: 002\n"));
    assert!(b.ends_with("---\n\nBody stays put.\n"));
}

// ---------------------------------------------------------------------------
// docket config
// ---------------------------------------------------------------------------

#[test]
fn config_show_and_validate() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    docket(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("priority:"));
    docket(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid."));
}

#[test]
fn broken_schema_is_fatal() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".docket/config.yaml"),
        "project:\n  name: demo\nfields:\n  code:\n    type: string\n    format: '(['\n",
    )
    .unwrap();
    write_item(dir.path(), "todo/001.md", &item("001", "todo"));

    docket(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
    docket(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid schema"));
}

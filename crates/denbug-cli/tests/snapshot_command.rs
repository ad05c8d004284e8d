mod common;

use common::{denbug, fixture, stdout_of};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn test_snapshot_show_plain() {
    let out = stdout_of(denbug().args(["snapshot", "show"]).arg(fixture("snapshot.json")));

    insta::assert_snapshot!(out, @r"
    DOMAIN        LOCAL  EFFECTIVE
    app           on     on
    app:echo      on     on
    app:ui        off    off
    app:ui:echo   on     off
    app:api       on     on
    app:api:echo  on     on
    db            on     on
    db:echo       on     on
    ");
}

#[test]
fn test_snapshot_show_json() {
    let out = stdout_of(
        denbug()
            .args(["--format", "json", "snapshot", "show"])
            .arg(fixture("snapshot.json")),
    );

    let rows: Vec<Value> = serde_json::from_str(&out).unwrap();
    let echo = rows.iter().find(|r| r["name"] == "app:ui:echo").unwrap();
    assert_eq!(echo["localState"], true);
    assert_eq!(echo["effectiveState"], false);
}

#[test]
fn test_snapshot_apply_writes_toml() {
    let temp = TempDir::new().unwrap();
    let out_path = temp.path().join("edited.toml");

    denbug()
        .args(["snapshot", "apply", "--out"])
        .arg(&out_path)
        .arg(fixture("snapshot.json"))
        .args(["app:**", "-db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 pattern(s)"));

    let shown = stdout_of(
        denbug()
            .args(["--format", "json", "snapshot", "show"])
            .arg(&out_path),
    );
    let rows: Vec<Value> = serde_json::from_str(&shown).unwrap();
    let state = |name: &str| {
        let row = rows.iter().find(|r| r["name"] == name).unwrap();
        (row["localState"].clone(), row["effectiveState"].clone())
    };

    assert_eq!(state("app:ui"), (Value::Bool(true), Value::Bool(true)));
    assert_eq!(state("db"), (Value::Bool(false), Value::Bool(false)));
    assert_eq!(state("db:echo"), (Value::Bool(true), Value::Bool(false)));
}

#[test]
fn test_snapshot_show_rejects_malformed_shape() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, r#"{"domains": [{"name": 5}]}"#).unwrap();

    denbug()
        .args(["snapshot", "show"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}

#[test]
fn test_snapshot_apply_requires_patterns() {
    denbug()
        .args(["snapshot", "apply"])
        .arg(fixture("snapshot.json"))
        .assert()
        .failure();
}

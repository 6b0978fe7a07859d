//! End-to-end tests of the `solution-templatize` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use solution_templatize::test_utils::{
    HOSPITAL_ITEM_ID, hospital_catalog, sample_dashboard, write_json_file,
};
use std::fs;
use tempfile::TempDir;

/// A command isolated from the user's config and log settings.
fn command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("solution-templatize").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("SOLUTION_TEMPLATIZE_CONFIG");
    cmd
}

fn write_fixtures(temp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let dashboard = write_json_file(temp.path(), "dashboard.json", &sample_dashboard()).unwrap();
    let catalog =
        write_json_file(temp.path(), "catalog.json", &serde_json::to_value(hospital_catalog()).unwrap())
            .unwrap();
    (dashboard, catalog)
}

#[test]
fn test_templatize_dashboard_to_stdout() {
    let temp = TempDir::new().unwrap();
    let (dashboard, catalog) = write_fixtures(&temp);

    let output = command(&temp)
        .arg("--quiet")
        .arg("templatize")
        .arg(&dashboard)
        .arg("--catalog")
        .arg(&catalog)
        .args(["--kind", "dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{{{{{HOSPITAL_ITEM_ID}.layer2.fields.numbeds.name}}}}"
        )))
        .get_output()
        .stdout
        .clone();

    let template: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(template["datasources"].as_array().unwrap().len(), 2);
    assert_eq!(template["datasources"][1]["references"], json!(["map0", "gauge0", "selector0"]));
}

#[test]
fn test_templatize_then_resolve_round_trip() {
    let temp = TempDir::new().unwrap();
    let (dashboard, catalog) = write_fixtures(&temp);
    let template = temp.path().join("out").join("template.json");
    let resolved = temp.path().join("resolved.json");

    command(&temp)
        .arg("templatize")
        .arg(&dashboard)
        .arg("--catalog")
        .arg(&catalog)
        .args(["--kind", "dashboard", "-o"])
        .arg(&template)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));

    command(&temp)
        .arg("-q")
        .arg("resolve")
        .arg(&template)
        .arg("--catalog")
        .arg(&catalog)
        .arg("-o")
        .arg(&resolved)
        .assert()
        .success();

    let resolved: Value = serde_json::from_str(&fs::read_to_string(&resolved).unwrap()).unwrap();
    assert_eq!(resolved["data"], sample_dashboard());
}

#[test]
fn test_resolve_strict_reports_suggestions() {
    let temp = TempDir::new().unwrap();
    let template = write_json_file(
        temp.path(),
        "template.json",
        &json!({"field": "{{svc.layer0.fields.nmae.name}}"}),
    )
    .unwrap();
    let settings = write_json_file(
        temp.path(),
        "settings.json",
        &json!({"svc": {"layer0": {"fields": {"name": {"name": "NAME"}}}}}),
    )
    .unwrap();

    command(&temp)
        .arg("resolve")
        .arg(&template)
        .arg("--settings")
        .arg(&settings)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unresolved placeholder"))
        .stderr(predicate::str::contains("Did you mean: svc.layer0.fields.name.name?"));

    // lenient resolution keeps the placeholder
    command(&temp)
        .arg("-q")
        .arg("resolve")
        .arg(&template)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("{{svc.layer0.fields.nmae.name}}"));
}

#[test]
fn test_resolve_requires_a_source() {
    let temp = TempDir::new().unwrap();
    let template = write_json_file(temp.path(), "template.json", &json!({})).unwrap();

    command(&temp).arg("resolve").arg(&template).assert().failure();
}

#[test]
fn test_references_referenced_only() {
    let temp = TempDir::new().unwrap();
    let mut dashboard = sample_dashboard();
    dashboard["desktopView"]["widgets"].as_array_mut().unwrap().remove(0);
    let dashboard = write_json_file(temp.path(), "trimmed.json", &dashboard).unwrap();
    let (_, catalog) = write_fixtures(&temp);

    let output = command(&temp)
        .arg("-q")
        .arg("references")
        .arg(&dashboard)
        .arg("--catalog")
        .arg(&catalog)
        .arg("--referenced-only")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let datasources: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        datasources,
        json!([{
            "itemId": HOSPITAL_ITEM_ID,
            "layerId": 2,
            "url": format!("{{{{{HOSPITAL_ITEM_ID}.url}}}}"),
            "basePath": format!("{HOSPITAL_ITEM_ID}.layer2.fields"),
            "fields": [
                {"name": "OBJECTID"},
                {"name": "NAME"},
                {"name": "NUMBEDS"},
                {"name": "FACILITYID"}
            ],
            "ids": ["Hospitals_5140"],
            "references": ["gauge0", "selector0"]
        }])
    );
}

#[test]
fn test_invalid_raw_pattern_and_escaped_override() {
    let temp = TempDir::new().unwrap();
    let input = write_json_file(temp.path(), "item.json", &json!({"layer": "layer[1]", "f": "NAME"}))
        .unwrap();
    let catalog = write_json_file(
        temp.path(),
        "catalog.json",
        &json!([{"basePath": "svc.layer1.fields", "ids": ["layer[1"], "fields": [{"name": "NAME"}]}]),
    )
    .unwrap();

    command(&temp)
        .arg("templatize")
        .arg(&input)
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid match pattern"))
        .stderr(predicate::str::contains("--pattern-mode escaped"));

    command(&temp)
        .arg("-q")
        .arg("templatize")
        .arg(&input)
        .arg("--catalog")
        .arg(&catalog)
        .args(["--pattern-mode", "escaped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{{svc.layer1.fields.name.name}}"));
}

#[test]
fn test_config_file_sets_pattern_mode() {
    let temp = TempDir::new().unwrap();
    let input = write_json_file(temp.path(), "item.json", &json!({"layer": "layer[1]", "f": "NAME"}))
        .unwrap();
    let catalog = write_json_file(
        temp.path(),
        "catalog.json",
        &json!([{"basePath": "svc.layer1.fields", "ids": ["layer[1"], "fields": [{"name": "NAME"}]}]),
    )
    .unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "pattern_mode = \"escaped\"\nlog_level = \"warn\"\n").unwrap();

    command(&temp)
        .arg("--config")
        .arg(&config)
        .arg("templatize")
        .arg(&input)
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("{{svc.layer1.fields.name.name}}"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let (dashboard, catalog) = write_fixtures(&temp);
    let config = temp.path().join("config.toml");
    fs::write(&config, "pattern_mode = [").unwrap();

    command(&temp)
        .arg("--config")
        .arg(&config)
        .arg("references")
        .arg(&dashboard)
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_missing_input_file() {
    let temp = TempDir::new().unwrap();
    let (_, catalog) = write_fixtures(&temp);

    command(&temp)
        .arg("templatize")
        .arg(temp.path().join("absent.json"))
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_catalog_must_be_an_array() {
    let temp = TempDir::new().unwrap();
    let (dashboard, _) = write_fixtures(&temp);
    let catalog = write_json_file(temp.path(), "catalog.json", &json!({"basePath": "x"})).unwrap();

    command(&temp)
        .arg("references")
        .arg(&dashboard)
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid datasource catalog"));
}

//! Integration tests for `contratos analyze`.
#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::process::Command;

/// Path to the compiled `contratos` binary.
fn contratos_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("contratos");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

#[test]
fn analyze_json_maps_every_header() {
    let out = Command::new(contratos_bin())
        .args([
            "analyze",
            fixture("contratos_portal.csv").to_str().expect("path"),
            "-f",
            "json",
        ])
        .output()
        .expect("run contratos analyze");
    assert_eq!(out.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout is JSON");
    let sheet = &value[0];
    assert_eq!(sheet["sheet"], "contratos_portal");
    let fields: Vec<&str> = sheet["columns"]
        .as_array()
        .expect("columns array")
        .iter()
        .map(|c| c["field"].as_str().unwrap_or("-"))
        .collect();
    assert_eq!(
        fields,
        [
            "numero",
            "objeto",
            "contratante",
            "contratada",
            "valor",
            "dataInicio",
            "dataTermino",
            "modalidade"
        ]
    );
    assert_eq!(sheet["columns"][5]["dataType"], "date");
    assert_eq!(sheet["report"]["isValid"], true);
}

#[test]
fn analyze_human_lists_headers() {
    let out = Command::new(contratos_bin())
        .args([
            "analyze",
            fixture("sem_orgao.csv").to_str().expect("path"),
            "--no-color",
        ])
        .output()
        .expect("run contratos analyze");
    // analyze reports but never fails on a missing field
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("sem_orgao\n"), "stdout: {stdout}");
    assert!(stdout.contains("Fornecedor"), "stdout: {stdout}");
    assert!(stdout.contains("contratada"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[E] sem_orgao"), "stderr: {stderr}");
}

//! E2E tests for single-log conversion and the `tree` preview.
//!
//! Test coverage:
//! - `convert` writes result, container and raw log into the output dir
//! - Start-time anchoring and history keys in the written result
//! - JSON summaries on stdout with `--json`
//! - `tree` text and JSON rendering
//! - Config precedence (project YAML < env < CLI)
//! - Remote sources fetched over HTTP with Basic auth

mod common;

use common::cli::{Workspace, run, run_with_env};
use common::fixtures::{login_log, passing_log};
use common::mock_server::{MockServer, Response};
use std::collections::HashMap;
use std::fs;
use uuid::Uuid;

const ANCHOR_MS: i64 = 1_747_748_315_000;

#[test]
fn convert_writes_result_container_and_attachment() {
    common::init_test_logging();
    let workspace = Workspace::new();
    workspace.write("login.log", &login_log());

    let out = run(
        &workspace,
        [
            "convert",
            "login.log",
            "--test",
            "Login",
            "--start-time",
            "2025-05-20 13:38:35 +0000",
        ],
    );
    assert!(out.status.success(), "convert failed: {}", out.stderr);
    assert!(out.stdout.contains("Wrote Allure results to: ./allure-results"));
    assert!(
        out.stdout
            .contains("Test: Login | Steps: 3 (passed: 1, failed: 2) | Duration: 3.300s"),
        "unexpected stdout: {}",
        out.stdout
    );

    let dir = workspace.out_dir();
    let files = Workspace::list(&dir);
    assert_eq!(files.len(), 3, "files: {files:?}");
    assert!(files.contains(&"_raw_maestro_log.txt".to_string()));
    assert_eq!(
        fs::read_to_string(dir.join("_raw_maestro_log.txt")).unwrap(),
        login_log()
    );

    let results = Workspace::documents(&dir, "-result.json");
    let result = &results[0];
    assert_eq!(result["name"], "Login");
    assert_eq!(result["fullName"], "Maestro / Android: Login");
    assert_eq!(result["status"], "failed");
    assert_eq!(result["stage"], "finished");
    assert_eq!(result["start"], ANCHOR_MS);
    assert_eq!(result["stop"], ANCHOR_MS + 3300);

    let expected_history = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"Maestro / Android:Login");
    assert_eq!(result["historyId"], expected_history.to_string());

    let root = &result["steps"][0];
    assert_eq!(root["name"], "Login flow");
    assert_eq!(root["steps"][0]["name"], "Launch app");
    assert_eq!(root["steps"][0]["status"], "passed");
    assert_eq!(root["steps"][0]["start"], ANCHOR_MS + 200);
    assert_eq!(root["steps"][1]["name"], "Tap on \"Sign in\"");
    assert_eq!(root["steps"][1]["status"], "failed");

    let labels = result["labels"].as_array().unwrap();
    assert!(labels.contains(&serde_json::json!({"name": "framework", "value": "maestro"})));
    assert_eq!(result["attachments"][0]["source"], "_raw_maestro_log.txt");

    let containers = Workspace::documents(&dir, "-container.json");
    assert_eq!(containers[0]["name"], "Maestro / Android");
    assert_eq!(containers[0]["children"][0], result["uuid"]);
}

#[test]
fn convert_json_summary() {
    let workspace = Workspace::new();
    workspace.write("ok.log", &passing_log());

    let out = run(&workspace, ["convert", "ok.log", "--json", "--out-dir", "out"]);
    assert!(out.status.success(), "convert failed: {}", out.stderr);

    let summary: serde_json::Value = serde_json::from_str(&out.stdout).expect("JSON stdout");
    assert_eq!(summary["out_dir"], "out");
    let test = &summary["tests"][0];
    assert_eq!(test["name"], "Maestro Scenario");
    assert_eq!(test["status"], "passed");
    assert_eq!(test["steps"], 2);
    assert_eq!(test["duration_ms"], 2000);
    assert!(workspace.root.join("out").is_dir());
}

#[test]
fn tree_prints_nested_steps() {
    let workspace = Workspace::new();
    workspace.write("login.log", &login_log());

    let out = run(&workspace, ["tree", "login.log"]);
    assert!(out.status.success(), "tree failed: {}", out.stderr);
    assert_eq!(
        out.stdout,
        "✗ Login flow (3.300s)\n  ✓ Launch app (1.300s)\n  ✗ Tap on \"Sign in\" (1.250s)\n"
    );
    assert!(!workspace.out_dir().exists(), "tree must not write results");
}

#[test]
fn tree_json_output() {
    let workspace = Workspace::new();
    workspace.write("login.log", &login_log());

    let out = run(&workspace, ["tree", "login.log", "--json"]);
    assert!(out.status.success(), "tree failed: {}", out.stderr);

    let tree: serde_json::Value = serde_json::from_str(&out.stdout).expect("JSON stdout");
    assert_eq!(tree["status"], "failed");
    assert_eq!(tree["first_ms"], 1000);
    assert_eq!(tree["last_ms"], 4300);
    assert_eq!(tree["stats"]["total"], 3);
    assert_eq!(tree["steps"][0]["children"].as_array().unwrap().len(), 2);
}

#[test]
fn tree_empty_log() {
    let workspace = Workspace::new();
    workspace.write("empty.log", "no maestro lines here\n");

    let out = run(&workspace, ["tree", "empty.log"]);
    assert!(out.status.success());
    assert_eq!(out.stdout.trim(), "No steps found.");
}

#[test]
fn config_precedence_yaml_env_cli() {
    let workspace = Workspace::new();
    workspace.write("ok.log", &passing_log());
    workspace.write(".maestro-allure.yaml", "suite: FromYaml\nout-dir: reports\n");

    let out = run(&workspace, ["convert", "ok.log"]);
    assert!(out.status.success(), "convert failed: {}", out.stderr);
    let containers = Workspace::documents(&workspace.root.join("reports"), "-container.json");
    assert_eq!(containers[0]["name"], "FromYaml");

    let out = run_with_env(
        &workspace,
        ["convert", "ok.log", "--out-dir", "env-run"],
        [("MAESTRO_ALLURE_SUITE", "FromEnv")],
    );
    assert!(out.status.success(), "convert failed: {}", out.stderr);
    let containers = Workspace::documents(&workspace.root.join("env-run"), "-container.json");
    assert_eq!(containers[0]["name"], "FromEnv");

    let out = run_with_env(
        &workspace,
        ["convert", "ok.log", "--out-dir", "cli-run", "--suite", "FromCli"],
        [("MAESTRO_ALLURE_SUITE", "FromEnv")],
    );
    assert!(out.status.success(), "convert failed: {}", out.stderr);
    let containers = Workspace::documents(&workspace.root.join("cli-run"), "-container.json");
    assert_eq!(containers[0]["name"], "FromCli");
}

#[test]
fn convert_remote_log_with_basic_auth() {
    let server = MockServer::start(HashMap::from([(
        "/logs/1".to_string(),
        Response::text(&passing_log()),
    )]));
    let workspace = Workspace::new();

    let out = run(
        &workspace,
        [
            "convert",
            &server.url("/logs/1"),
            "--username",
            "alice",
            "--access-key",
            "s3cret",
        ],
    );
    assert!(out.status.success(), "convert failed: {}", out.stderr);
    assert_eq!(
        fs::read_to_string(workspace.out_dir().join("_raw_maestro_log.txt")).unwrap(),
        passing_log()
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic YWxpY2U6czNjcmV0")
    );
    assert!(
        requests[0]
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.starts_with("maestro-allure/"))
    );
}

#[test]
fn version_json() {
    let workspace = Workspace::new();
    let out = run(&workspace, ["version", "--json"]);
    assert!(out.status.success());
    let version: serde_json::Value = serde_json::from_str(&out.stdout).expect("JSON stdout");
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
}

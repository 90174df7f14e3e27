//! Integration tests for the `fwedit` CLI binary.
//!
//! Fixtures are written to a temp directory per test, and the config
//! directory points into it so tests never touch the user's real
//! configuration.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

const RULES: &str = r#"{
  "inbound": [
    {"action": "ACCEPT", "protocol": "TCP", "ports": "22", "label": "ssh",
     "addresses": {"ipv4": ["0.0.0.0/0"], "ipv6": ["::/0"]}},
    {"action": "ACCEPT", "protocol": "TCP", "ports": "80", "label": "web",
     "addresses": {"ipv4": ["0.0.0.0/0"]}},
    {"action": "ACCEPT", "protocol": "ICMP", "ports": "", "label": "ping",
     "addresses": {"ipv4": ["10.0.0.0/8"]}}
  ],
  "outbound": [
    {"action": "DROP", "protocol": "UDP", "ports": "53", "label": "dns"}
  ],
  "inbound_policy": "DROP",
  "outbound_policy": "ACCEPT"
}"#;

const DELETE_SSH: &str = r#"[
  {"category": "inbound", "action": {"type": "DELETE_RULE", "idx": 0}}
]"#;

/// Build a [`Command`] for the `fwedit` binary with env isolation.
fn fwedit_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fwedit");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("FWEDIT_OUTPUT")
        .env_remove("FWEDIT_DEFAULTS__OUTPUT")
        .env_remove("FWEDIT_DEFAULTS__COLOR")
        .env_remove("FWEDIT_EDITOR__STRICT_INDICES")
        .env_remove("FWEDIT_EDITOR__ENFORCE_IP_MASKS")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = fwedit_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("show")
            .and(predicate::str::contains("edit"))
            .and(predicate::str::contains("reconcile"))
            .and(predicate::str::contains("validate")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwedit"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── show ────────────────────────────────────────────────────────────

#[test]
fn test_show_json_lists_unmodified_rules() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);

    let output = fwedit_cmd(dir.path())
        .args(["show", "-o", "json"])
        .arg(&rules)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v = stdout_json(&output);
    assert_eq!(v["inbound_policy"], "DROP");
    assert_eq!(v["unsaved_changes"], false);
    assert_eq!(v["inbound"].as_array().unwrap().len(), 3);
    assert_eq!(v["inbound"][2]["status"], "NOT_MODIFIED");
    assert_eq!(v["outbound"][0]["label"], "dns");
}

#[test]
fn test_show_table_filters_category() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);

    fwedit_cmd(dir.path())
        .args(["show", "--color", "never", "--category", "outbound"])
        .arg(&rules)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Outbound rules (default policy: ACCEPT)")
                .and(predicate::str::contains("dns"))
                .and(predicate::str::contains("Inbound").not()),
        );
}

#[test]
fn test_show_missing_file_exits_not_found() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path())
        .args(["show", "does-not-exist.json"])
        .assert()
        .code(4);
}

#[test]
fn test_show_malformed_document_exits_usage() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", "{ \"inbound\": [");
    fwedit_cmd(dir.path())
        .arg("show")
        .arg(&rules)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rule document"));
}

// ── edit ────────────────────────────────────────────────────────────

#[test]
fn test_edit_marks_pending_deletion() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(&dir, "script.json", DELETE_SSH);

    let output = fwedit_cmd(dir.path())
        .args(["edit", "-o", "json", "--script"])
        .arg(&script)
        .arg(&rules)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v = stdout_json(&output);
    assert_eq!(v["unsaved_changes"], true);
    assert_eq!(v["inbound"][0]["status"], "PENDING_DELETION");
    assert_eq!(v["inbound"][1]["status"], "NOT_MODIFIED");
}

#[test]
fn test_edit_payload_omits_deleted_rules_and_bookkeeping() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(&dir, "script.json", DELETE_SSH);

    let output = fwedit_cmd(dir.path())
        .args(["edit", "--payload", "-o", "json", "--script"])
        .arg(&script)
        .arg(&rules)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v = stdout_json(&output);
    let inbound = v["inbound"].as_array().unwrap();
    assert_eq!(inbound.len(), 2);
    assert_eq!(inbound[0]["label"], "web");
    assert!(inbound[0].get("status").is_none());
    assert!(inbound[0].get("original_index").is_none());
    // ICMP loses its empty ports value.
    assert!(inbound[1].get("ports").is_none());
    assert_eq!(v["outbound_policy"], "ACCEPT");
}

#[test]
fn test_edit_yaml_script_with_reorder_and_new_rule() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(
        &dir,
        "script.yaml",
        "- category: inbound\n  action:\n    type: REORDER\n    start_idx: 2\n    end_idx: 0\n\
         - category: outbound\n  action:\n    type: NEW_RULE\n    rule:\n      action: ACCEPT\n      \
         protocol: TCP\n      ports: \"443\"\n      label: https-out\n",
    );

    let output = fwedit_cmd(dir.path())
        .args(["edit", "-o", "plain", "--script"])
        .arg(&script)
        .arg(&rules)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "inbound\t0\tNOT_MODIFIED\tping");
    assert_eq!(lines[4], "outbound\t1\tNEW\thttps-out");
}

#[test]
fn test_edit_lenient_skips_bad_indices() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(
        &dir,
        "script.json",
        r#"[{"category": "outbound", "action": {"type": "UNDO", "idx": 7}}]"#,
    );

    fwedit_cmd(dir.path())
        .args(["edit", "-o", "json", "--script"])
        .arg(&script)
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unsaved_changes\": false"));
}

#[test]
fn test_edit_strict_reports_bad_indices() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(
        &dir,
        "script.json",
        r#"[{"category": "outbound", "action": {"type": "UNDO", "idx": 7}}]"#,
    );

    fwedit_cmd(dir.path())
        .args(["edit", "--strict", "--script"])
        .arg(&script)
        .arg(&rules)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("step 1"));
}

#[test]
fn test_edit_strict_refuses_modifying_deleted_rule() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(
        &dir,
        "script.json",
        r#"[
          {"category": "inbound", "action": {"type": "DELETE_RULE", "idx": 1}},
          {"category": "inbound", "action": {"type": "MODIFY_RULE", "idx": 1, "rule": {"ports": "8080"}}}
        ]"#,
    );

    fwedit_cmd(dir.path())
        .args(["edit", "--strict", "--script"])
        .arg(&script)
        .arg(&rules)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("step 2"));
}

// ── reconcile ───────────────────────────────────────────────────────

#[test]
fn test_reconcile_attaches_errors_past_deleted_rules() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(&dir, "script.json", DELETE_SSH);
    let errors = fixture(
        &dir,
        "errors.json",
        r#"{"errors": [
          {"field": "rules.inbound[0].ports", "reason": "Port 80 is reserved"},
          {"reason": "Too many rules"}
        ]}"#,
    );

    let output = fwedit_cmd(dir.path())
        .args(["reconcile", "-o", "json", "--script"])
        .arg(&script)
        .arg("--errors")
        .arg(&errors)
        .arg(&rules)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v = stdout_json(&output);
    // Submitted rule 0 is "web" in slot 1, because slot 0 was deleted.
    let web = &v["rules"]["inbound"][1];
    assert_eq!(web["label"], "web");
    assert_eq!(web["errors"][0]["form_field"], "ports");
    assert_eq!(web["errors"][0]["reason"], "Port 80 is reserved");
    assert!(v["rules"]["inbound"][0].get("errors").is_none());
    assert_eq!(v["general_errors"][0]["reason"], "Too many rules");
}

#[test]
fn test_reconcile_table_marks_offending_address() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let errors = fixture(
        &dir,
        "errors.yaml",
        "- field: rules.inbound[2].addresses.ipv4[0]\n  reason: Invalid address\n",
    );

    fwedit_cmd(dir.path())
        .args(["reconcile", "--color", "never", "--errors"])
        .arg(&errors)
        .arg(&rules)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Rule errors:")
                .and(predicate::str::contains("inbound slot 2 (ping):"))
                .and(predicate::str::contains(
                    "address 10.0.0.0/8: Must be a valid IPv4 or IPv6 range.",
                )),
        );
}

// ── validate ────────────────────────────────────────────────────────

#[test]
fn test_validate_accepts_good_rule() {
    let dir = TempDir::new().unwrap();
    let rule = fixture(
        &dir,
        "rule.json",
        r#"{"action": "ACCEPT", "protocol": "TCP", "ports": "22, 80-90", "label": "office",
            "addresses": {"ipv4": ["192.168.1.1"]}}"#,
    );

    fwedit_cmd(dir.path())
        .args(["validate", "-o", "plain"])
        .arg(&rule)
        .assert()
        .success()
        .stdout(predicate::str::diff("valid\n"));
}

#[test]
fn test_validate_rejects_bad_rule() {
    let dir = TempDir::new().unwrap();
    let rule = fixture(
        &dir,
        "rule.json",
        r#"{"action": "ACCEPT", "protocol": "ICMP", "ports": "22", "label": "1bad",
            "addresses": {"ipv4": ["0.0.0.0/0"], "ipv6": ["::/0"]}}"#,
    );

    fwedit_cmd(dir.path())
        .args(["validate", "-o", "plain"])
        .arg(&rule)
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("label: Label must begin with a letter.")
                .and(predicate::str::contains("ports: Ports are not allowed")),
        );
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fwedit").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path()).args(["config", "init"]).assert().success();
    fwedit_cmd(dir.path())
        .args(["config", "init"])
        .assert()
        .code(2);
    fwedit_cmd(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_strict_indices_applies_to_edit() {
    let dir = TempDir::new().unwrap();
    let rules = fixture(&dir, "rules.json", RULES);
    let script = fixture(
        &dir,
        "script.json",
        r#"[{"category": "inbound", "action": {"type": "DELETE_RULE", "idx": 9}}]"#,
    );

    fwedit_cmd(dir.path())
        .args(["config", "set", "editor.strict_indices", "true"])
        .assert()
        .success();
    fwedit_cmd(dir.path())
        .args(["config", "show", "-o", "plain"])
        .assert()
        .success();

    fwedit_cmd(dir.path())
        .args(["edit", "--script"])
        .arg(&script)
        .arg(&rules)
        .assert()
        .code(4);
}

#[test]
fn test_config_set_unknown_key_exits_usage() {
    let dir = TempDir::new().unwrap();
    fwedit_cmd(dir.path())
        .args(["config", "set", "editor.colour", "red"])
        .assert()
        .code(2);
}

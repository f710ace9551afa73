//! Integration tests for the resolve_attributes CLI.
//!
//! Runs the built binary against the JSON fixtures in tests/integration/.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("integration")
    .join(name)
}

/// Runs the CLI with `args` and extra env vars. Both override variables are cleared first.
fn run_cli(args: &[&str], env: &[(&str, &str)]) -> Output {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_resolve_attributes"));
  cmd
    .args(args)
    .env_remove("ATTRIBUTE_RESOLVER_CONFIG")
    .env_remove("ATTRIBUTE_RESOLVER_PRINCIPAL");
  for (k, v) in env {
    cmd.env(k, v);
  }
  cmd.output().expect("run resolve_attributes")
}

fn stdout_json(out: &Output) -> Value {
  assert!(
    out.status.success(),
    "stderr: {}",
    String::from_utf8_lossy(&out.stderr)
  );
  serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn string_values(released: &Value, id: &str) -> Vec<String> {
  released[id]["values"]
    .as_array()
    .unwrap_or_else(|| panic!("no values for {}", id))
    .iter()
    .map(|v| v["value"].as_str().unwrap_or_default().to_string())
    .collect()
}

#[test]
fn prints_released_attributes() {
  let config = fixture("resolver.json");
  let out = run_cli(
    &["--config", config.to_str().unwrap(), "--principal", "alice"],
    &[],
  );
  let released = stdout_json(&out);
  assert_eq!(string_values(&released, "uid"), ["alice"]);
  assert_eq!(string_values(&released, "displayName"), ["Alice Smith"]);
  assert_eq!(
    released["eduPersonPrincipalName"]["values"][0]["scope"],
    "example.org"
  );
  assert!(released.get("localId").is_none());
}

#[test]
fn attribute_flag_restricts_output() {
  let config = fixture("resolver.json");
  let out = run_cli(
    &[
      "--config",
      config.to_str().unwrap(),
      "--principal",
      "alice",
      "--attribute",
      "mail",
    ],
    &[],
  );
  let released = stdout_json(&out);
  assert_eq!(released.as_object().map(|m| m.len()), Some(1));
  assert_eq!(string_values(&released, "mail"), ["alice@example.org"]);
}

#[test]
fn env_overrides_flags() {
  let config = fixture("resolver.json");
  let out = run_cli(
    &[
      "--config",
      "/nonexistent/resolver.json",
      "--principal",
      "ignored",
      "--recipient",
      "https://partner.example.org/sp",
      "--attribute",
      "partnerId",
    ],
    &[
      ("ATTRIBUTE_RESOLVER_CONFIG", config.to_str().unwrap()),
      ("ATTRIBUTE_RESOLVER_PRINCIPAL", "bob"),
    ],
  );
  let released = stdout_json(&out);
  assert_eq!(released["partnerId"]["values"][0]["value"], "bob");
}

#[test]
fn missing_config_exits_1() {
  let out = run_cli(&["--principal", "alice"], &[]);
  assert_eq!(out.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("no configuration given"), "stderr: {}", stderr);

  let out = run_cli(&["--config", "/nonexistent/resolver.json"], &[]);
  assert_eq!(out.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&out.stderr).contains("Error loading"));
}

#[test]
fn invalid_graph_exits_1() {
  let config = fixture("cycle.json");
  let out = run_cli(&["--config", config.to_str().unwrap()], &[]);
  assert_eq!(out.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("circular dependency"), "stderr: {}", stderr);
}

#[test]
fn resolution_failure_exits_1() {
  let config = fixture("failing.json");
  let out = run_cli(
    &["--config", config.to_str().unwrap(), "--principal", "alice"],
    &[],
  );
  assert_eq!(out.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&out.stderr).contains("Resolution error"));
}

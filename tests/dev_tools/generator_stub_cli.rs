//! Integration tests for the generator-stub CLI binary
//!
//! These tests execute the compiled generator-stub binary directly using
//! `assert_cmd`, feeding it instructions over stdin the way the pipeline
//! does. They are gated behind the `dev-tools` feature.
//!
//! Run with: `cargo test --features dev-tools --test generator_stub_cli`

use assert_cmd::Command;
use predicates::prelude::*;

const MANIFEST: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: web
spec:
  containers:
    - name: web
      image: nginx:1.27
      securityContext:
        runAsUser: 0
        privileged: true
";

fn instruction() -> String {
    format!(
        "Analyze the finding.\n\nManifest:\n```yaml\n{MANIFEST}```\n\n\
         Finding to analyze, cited as [2]:\n\
         - Rule: KSV017\n\
         - Severity: High\n\
         - Title: Privileged container\n\
         - Detail: Container 'web' should not be privileged\n"
    )
}

fn repair_instruction() -> String {
    format!(
        "{}\nYour previous answer violated the contract.\n\nViolations to fix:\n\
         1. required section missing: ## References\n",
        instruction()
    )
}

fn stub_cmd(scenario: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("generator-stub"));
    cmd.args(["--scenario", scenario]);
    cmd
}

#[test]
fn version_output() {
    let version_predicate =
        predicate::str::is_match(r"\b\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?\b").unwrap();
    Command::new(assert_cmd::cargo::cargo_bin!("generator-stub"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("generator-stub"))
        .stdout(version_predicate);
}

#[test]
fn success_scenario_emits_patch_report() {
    stub_cmd("success")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("## Findings"))
        .stdout(predicate::str::contains(
            "- [SCANNER] KSV017: Privileged container (High) [2]",
        ))
        .stdout(predicate::str::contains(
            "Target: `spec.containers[web].securityContext`",
        ))
        .stdout(predicate::str::contains("privileged: false"))
        .stdout(predicate::str::contains("- [2] [SCANNER] scanner: KSV017"));
}

#[test]
fn success_without_instruction_is_advisory() {
    stub_cmd("success")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("KSV000"))
        .stdout(predicate::str::contains("No code change required."));
}

#[test]
fn no_change_scenario_skips_the_patch() {
    stub_cmd("no-change")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("No code change required."))
        .stdout(predicate::str::contains("- [2] [SCANNER] scanner: KSV017"))
        .stdout(predicate::str::contains("```yaml").not());
}

#[test]
fn missing_section_scenario_drops_references() {
    stub_cmd("missing-section")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("## Additional Guidance"))
        .stdout(predicate::str::contains("## References").not());
}

#[test]
fn missing_section_scenario_answers_repairs_correctly() {
    stub_cmd("missing-section")
        .write_stdin(repair_instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("## References"))
        .stdout(predicate::str::contains("- [2] [SCANNER] scanner: KSV017"));
}

#[test]
fn bad_citation_scenario_cites_outside_the_table() {
    stub_cmd("bad-citation")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("[99]"))
        .stdout(predicate::str::contains("[2]").not());
}

#[test]
fn stale_before_scenario_rewrites_the_snippet() {
    stub_cmd("stale-before")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("allowPrivilegeEscalation: true"))
        .stdout(predicate::str::contains("privileged: false"));
}

#[test]
fn tabs_scenario_indents_with_a_tab() {
    stub_cmd("tabs")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("\tprivileged: false"));
}

#[test]
fn fail_scenario_truncates_and_exits_nonzero() {
    stub_cmd("fail")
        .write_stdin(instruction())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("## Findings"))
        .stderr(predicate::str::contains("model backend refused the request"));
}

#[test]
fn empty_scenario_produces_no_output() {
    stub_cmd("empty")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn hang_scenario_respects_duration_override() {
    stub_cmd("hang")
        .env("GENERATOR_STUB_HANG_SECS", "0")
        .write_stdin(instruction())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hang scenario completed"));
}

//! Stub remediation generator for development testing
//!
//! This binary mimics a model CLI for exercising groundcheck without real
//! generation calls. It reads the instruction from stdin, answers with a
//! five-section report derived from the embedded manifest and finding, and
//! supports scenarios that produce contract violations, transport failures,
//! and hangs.

use clap::{Arg, Command};
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Read, Write};
use std::thread;
use std::time::Duration;

/// Scanner finding fields recovered from the instruction text.
struct FindingContext {
    rule_id: String,
    severity: String,
    title: String,
    citation: usize,
    manifest: String,
}

/// A `privileged: true` line located in the manifest, expressed as the
/// subtree the recommendation should rewrite.
struct PatchSite {
    target: String,
    before: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("generator-stub")
        .version("0.4.2")
        .about("Stub remediation generator for testing")
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .value_name("SCENARIO")
                .help("Test scenario to simulate")
                .default_value("success"),
        )
        .get_matches();

    let scenario = matches.get_one::<String>("scenario").unwrap();

    let instruction = read_instruction();
    let context = parse_context(&instruction);
    let repair = instruction.contains("Violations to fix:");
    let response = build_response(&context);

    match scenario.as_str() {
        "success" => emit_report(&response)?,
        "no-change" => emit_report(&advisory_report(&context))?,
        "missing-section" => {
            handle_flawed_scenario(&response, &drop_references(&response), repair)?;
        }
        "bad-citation" => {
            let flawed = hallucinate_citation(&response, context.citation);
            handle_flawed_scenario(&response, &flawed, repair)?;
        }
        "stale-before" => {
            let flawed = response.replacen("privileged: true", "allowPrivilegeEscalation: true", 1);
            handle_flawed_scenario(&response, &flawed, repair)?;
        }
        "tabs" => {
            let flawed = response.replacen("privileged: false", "\tprivileged: false", 1);
            handle_flawed_scenario(&response, &flawed, repair)?;
        }
        "empty" => {}
        "fail" | "error" => handle_failure_scenario(&response)?,
        "hang" | "block" => handle_hang_scenario()?,
        _ => emit_report(&response)?,
    }

    Ok(())
}

fn read_instruction() -> String {
    if io::stdin().is_terminal() {
        return String::new();
    }

    let mut instruction = String::new();
    let _ = io::stdin().read_to_string(&mut instruction);
    instruction
}

fn parse_context(instruction: &str) -> FindingContext {
    FindingContext {
        rule_id: field_after(instruction, "- Rule: ")
            .unwrap_or("KSV000")
            .to_string(),
        severity: field_after(instruction, "- Severity: ")
            .unwrap_or("High")
            .to_string(),
        title: field_after(instruction, "- Title: ")
            .unwrap_or("Unspecified finding")
            .to_string(),
        citation: parse_citation(instruction),
        manifest: parse_manifest(instruction),
    }
}

/// The rest of the line following the first occurrence of `marker`.
fn field_after<'a>(instruction: &'a str, marker: &str) -> Option<&'a str> {
    let start = instruction.find(marker)? + marker.len();
    let line = instruction[start..].lines().next().unwrap_or("");
    Some(line.trim())
}

fn parse_citation(instruction: &str) -> usize {
    let Some(start) = instruction.find("cited as [") else {
        return 1;
    };
    let digits: String = instruction[start + "cited as [".len()..]
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(1)
}

fn parse_manifest(instruction: &str) -> String {
    const OPEN: &str = "Manifest:\n```yaml\n";
    let Some(start) = instruction.find(OPEN) else {
        return String::new();
    };
    let body = &instruction[start + OPEN.len()..];
    match body.find("\n```") {
        Some(end) => body[..end].to_string(),
        None => String::new(),
    }
}

/// A patch report when the manifest contains a privileged container, an
/// advisory no-change report otherwise.
fn build_response(context: &FindingContext) -> String {
    match locate_patch_site(&context.manifest) {
        Some(site) => patch_report(context, &site),
        None => advisory_report(context),
    }
}

/// Walks the manifest's indentation to the first `privileged: true` line
/// and records the dotted path of its parent mapping plus that mapping's
/// body. Sequence items are addressed by their `name` field.
fn locate_patch_site(manifest: &str) -> Option<PatchSite> {
    let lines: Vec<&str> = manifest.lines().collect();
    let mut stack: Vec<(usize, String)> = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = raw.len() - trimmed.len();
        while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
            stack.pop();
        }

        if trimmed == "privileged: true" {
            if stack.is_empty() {
                return None;
            }
            return Some(PatchSite {
                target: join_path(&stack),
                before: subtree_around(&lines, index, indent),
            });
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some(name) = item.strip_prefix("name: ") {
                stack.push((indent, format!("[{}]", name.trim())));
            }
            continue;
        }
        if let Some(key) = trimmed.strip_suffix(':') {
            stack.push((indent, key.to_string()));
        }
    }

    None
}

fn join_path(stack: &[(usize, String)]) -> String {
    let mut path = String::new();
    for (_, segment) in stack {
        if !path.is_empty() && !segment.starts_with('[') {
            path.push('.');
        }
        path.push_str(segment);
    }
    path
}

/// The contiguous block of lines at `child_indent` or deeper surrounding
/// the anchor line, dedented to column zero.
fn subtree_around(lines: &[&str], anchor: usize, child_indent: usize) -> String {
    let inside = |line: &str| {
        let trimmed = line.trim_start();
        !trimmed.is_empty() && line.len() - trimmed.len() >= child_indent
    };

    let mut start = anchor;
    while start > 0 && inside(lines[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < lines.len() && inside(lines[end]) {
        end += 1;
    }

    lines[start..end]
        .iter()
        .map(|line| line.get(child_indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

fn advisory_report(context: &FindingContext) -> String {
    let n = context.citation;
    let mut out = String::new();
    let _ = writeln!(out, "## Findings");
    let _ = writeln!(
        out,
        "- [SCANNER] {}: {} ({}) [{n}]",
        context.rule_id, context.title, context.severity
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Current Issues");
    let _ = writeln!(
        out,
        "- The cluster scanner reported {} and the manifest already satisfies the hardened form [{n}]",
        context.title
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Recommendation");
    let _ = writeln!(out, "No code change required.");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Additional Guidance");
    let _ = writeln!(
        out,
        "- Keep the admission policy that rejects privileged workloads enabled. [{n}]"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## References");
    let _ = writeln!(out, "- [{n}] [SCANNER] scanner: {}", context.rule_id);
    out
}

fn patch_report(context: &FindingContext, site: &PatchSite) -> String {
    let after = site
        .before
        .replacen("privileged: true", "privileged: false", 1);
    let n = context.citation;
    let mut out = String::new();
    let _ = writeln!(out, "## Findings");
    let _ = writeln!(
        out,
        "- [SCANNER] {}: {} ({}) [{n}]",
        context.rule_id, context.title, context.severity
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Current Issues");
    let _ = writeln!(
        out,
        "- `{}.privileged`=`true` grants the container full access to the host [{n}]",
        site.target
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Recommendation");
    let _ = writeln!(out, "Target: `{}`", site.target);
    let _ = writeln!(out);
    let _ = writeln!(out, "```yaml");
    let _ = writeln!(out, "{}", site.before);
    let _ = writeln!(out, "```");
    let _ = writeln!(out);
    let _ = writeln!(out, "```yaml");
    let _ = writeln!(out, "{after}");
    let _ = writeln!(out, "```");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Additional Guidance");
    let _ = writeln!(
        out,
        "- Pair the change with an admission policy that blocks privileged containers. [{n}]"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## References");
    let _ = writeln!(out, "- [{n}] [SCANNER] scanner: {}", context.rule_id);
    out
}

/// Truncates the report just before its References section.
fn drop_references(report: &str) -> String {
    match report.find("\n## References") {
        Some(index) => report[..index + 1].to_string(),
        None => report.to_string(),
    }
}

/// Rewrites every citation of the analyzed finding to a number outside
/// the evidence table.
fn hallucinate_citation(report: &str, citation: usize) -> String {
    report.replace(&format!("[{citation}]"), "[99]")
}

fn emit_report(content: &str) -> Result<(), Box<dyn std::error::Error>> {
    print!("{content}");
    io::stdout().flush()?;
    Ok(())
}

/// First drafts carry the scenario's defect; repair rounds answer correctly.
fn handle_flawed_scenario(
    correct: &str,
    flawed: &str,
    repair: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if repair {
        emit_report(correct)
    } else {
        emit_report(flawed)
    }
}

/// Emits a truncated report, reports a backend error, and exits nonzero.
fn handle_failure_scenario(content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let partial: Vec<&str> = content.lines().take(4).collect();
    print!("{}", partial.join("\n"));
    io::stdout().flush()?;
    eprintln!("Error: model backend refused the request\nCheck the generator credentials and retry");
    std::process::exit(1);
}

/// Blocks for a configurable duration to test timeout handling.
/// Duration is read from GENERATOR_STUB_HANG_SECS env var (default: 10 seconds).
fn handle_hang_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let hang_secs: u64 = std::env::var("GENERATOR_STUB_HANG_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);

    thread::sleep(Duration::from_secs(hang_secs));

    // After hanging, return success (though the caller should have killed us by now)
    println!("Hang scenario completed after {hang_secs} seconds");
    Ok(())
}

//! Command-line interface for groundcheck
//!
//! This module provides the CLI commands and argument parsing for the
//! groundcheck tool: pipeline runs, evidence table inspection, and offline
//! report checking.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};

// Stable public API imports from crate root
use crate::{
    AcceptedReport, CommandGenerator, DiffOp, EvidenceDoc, EvidenceTable, ExitCode,
    GroundcheckError, GroundingValidator, GroundingWarning, Pipeline, PipelineConfig, RejectedRun,
    ReportRequest, RunOutcome, ScannerFinding, Violation, check, emit_jcs, extract_fragment,
    findings_from_trivy, parse, parse_report, verify_fragment,
};

// Internal module imports (not part of the stable public API)
use crate::error::{ConfigError, EvidenceError};
use crate::logging::init_tracing;

/// groundcheck - grounded security reports for Kubernetes manifests
#[derive(Parser)]
#[command(name = "groundcheck")]
#[command(about = "A CLI tool for generating citation-grounded security reports from scanner findings")]
#[command(long_about = r#"
groundcheck drives an external text generator through a validate-and-repair
loop until its security report is grounded: every claim cites a numbered
evidence item, every path reference resolves against the manifest, and every
proposed fix verifies against the manifest state it claims to edit.

EXAMPLES:
  # Generate a grounded report for a manifest
  groundcheck run pod.yaml --docs evidence/docs.json --scanner trivy.json

  # Use retrieved policy facts as a second evidence feed
  groundcheck run pod.yaml --docs docs.json --facts facts.json --scanner trivy.json

  # Override the configured generator command
  groundcheck run pod.yaml --scanner trivy.json --generator-cmd ollama --generator-arg run --generator-arg llama3

  # Print the numbered evidence table without calling a generator
  groundcheck evidence --docs docs.json --scanner trivy.json

  # Check an existing report against its evidence and manifest
  groundcheck check report.md pod.yaml --docs docs.json --scanner trivy.json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is groundcheck.toml in the working directory
  Use --config to specify an explicit config file path

EXIT CODES:
  0   report accepted (or check passed)
  2   invalid CLI arguments or configuration
  3   manifest or evidence input unreadable
  4   run rejected after exhausting repair attempts
  70  generator invocation failed

For more information, see: https://github.com/groundcheck/groundcheck
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a grounded security report for a manifest
    ///
    /// Runs one analysis round per failed scanner check, validates every
    /// draft against the format and grounding rules, and repairs rejected
    /// drafts until the budget runs out. Accepted runs write report.md,
    /// merged.yaml, and summary.json into the output directory; rejected
    /// runs write summary.json only.
    ///
    /// EXAMPLES:
    ///   groundcheck run pod.yaml --docs docs.json --scanner trivy.json
    ///   groundcheck run pod.yaml --scanner trivy.json --max-repairs 1 --json
    Run {
        /// Manifest file to analyze
        manifest: Utf8PathBuf,

        /// Retrieved guideline documents, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        docs: Vec<Utf8PathBuf>,

        /// Retrieved policy facts, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        facts: Vec<Utf8PathBuf>,

        /// Scanner report (Trivy JSON or a plain findings array)
        #[arg(long, value_name = "FILE")]
        scanner: Option<Utf8PathBuf>,

        /// Generator command to run (overrides config)
        #[arg(long, value_name = "CMD")]
        generator_cmd: Option<String>,

        /// Argument passed to the generator command (repeatable)
        #[arg(long = "generator-arg", value_name = "ARG", allow_hyphen_values = true)]
        generator_args: Vec<String>,

        /// Per-call generation budget in seconds (overrides config)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Repair attempts after the initial generation (overrides config)
        #[arg(long, value_name = "N")]
        max_repairs: Option<usize>,

        /// Directory run artifacts are written into (overrides config)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<Utf8PathBuf>,

        /// Output the run summary as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the numbered evidence table for a set of feeds
    ///
    /// Assigns citation numbers exactly as a run would: documents first,
    /// then facts, then scanner findings, with repeated (source, ID) pairs
    /// collapsed to their first number.
    ///
    /// EXAMPLES:
    ///   groundcheck evidence --docs docs.json --scanner trivy.json
    ///   groundcheck evidence --docs docs.json --json
    Evidence {
        /// Retrieved guideline documents, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        docs: Vec<Utf8PathBuf>,

        /// Retrieved policy facts, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        facts: Vec<Utf8PathBuf>,

        /// Scanner report (Trivy JSON or a plain findings array)
        #[arg(long, value_name = "FILE")]
        scanner: Option<Utf8PathBuf>,

        /// Output the table as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an existing report against its evidence and manifest
    ///
    /// Applies the same format, grounding, and patch checks a pipeline run
    /// applies to generator output, without calling a generator. Exits 0
    /// when the report is clean, 4 when it has violations.
    ///
    /// EXAMPLES:
    ///   groundcheck check report.md pod.yaml --docs docs.json --scanner trivy.json
    ///   groundcheck check report.md pod.yaml --docs docs.json --json
    Check {
        /// Report file to check
        report: Utf8PathBuf,

        /// Manifest file the report was generated against
        manifest: Utf8PathBuf,

        /// Retrieved guideline documents, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        docs: Vec<Utf8PathBuf>,

        /// Retrieved policy facts, a JSON array (repeatable)
        #[arg(long, value_name = "FILE")]
        facts: Vec<Utf8PathBuf>,

        /// Scanner report (Trivy JSON or a plain findings array)
        #[arg(long, value_name = "FILE")]
        scanner: Option<Utf8PathBuf>,

        /// Output violations and warnings as canonical JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build the CLI command structure for introspection and testing.
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}

/// Pipeline settings taken from `run` flags; unset flags keep the config
/// file's values.
#[derive(Debug, Default)]
struct RunOverrides {
    generator_cmd: Option<String>,
    generator_args: Vec<String>,
    timeout: Option<u64>,
    max_repairs: Option<usize>,
    output_dir: Option<Utf8PathBuf>,
}

impl RunOverrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(command) = self.generator_cmd {
            config.generator_command = command;
        }
        if !self.generator_args.is_empty() {
            config.generator_args = self.generator_args;
        }
        if let Some(secs) = self.timeout {
            config.generator_timeout_secs = secs;
        }
        if let Some(attempts) = self.max_repairs {
            config.max_repair_attempts = attempts;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
    }
}

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns
/// `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it
/// does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A failed init means a subscriber is already installed; keep it
    let _ = init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("✗ Failed to create async runtime: {err}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let config_path = cli.config.clone();
    let result = rt.block_on(async {
        match cli.command {
            Commands::Run {
                manifest,
                docs,
                facts,
                scanner,
                generator_cmd,
                generator_args,
                timeout,
                max_repairs,
                output_dir,
                json,
            } => {
                execute_run(
                    config_path.as_deref(),
                    &manifest,
                    &docs,
                    &facts,
                    scanner.as_deref(),
                    RunOverrides {
                        generator_cmd,
                        generator_args,
                        timeout,
                        max_repairs,
                        output_dir,
                    },
                    json,
                )
                .await
            }
            Commands::Evidence {
                docs,
                facts,
                scanner,
                json,
            } => execute_evidence(&docs, &facts, scanner.as_deref(), json),
            Commands::Check {
                report,
                manifest,
                docs,
                facts,
                scanner,
                json,
            } => execute_check(&report, &manifest, &docs, &facts, scanner.as_deref(), json),
        }
    });

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(err) => {
            eprintln!("{}", err.display_for_user());
            Err(err.to_exit_code())
        }
    }
}

/// Execute the report generation command
async fn execute_run(
    config_path: Option<&Utf8Path>,
    manifest_path: &Utf8Path,
    doc_paths: &[Utf8PathBuf],
    fact_paths: &[Utf8PathBuf],
    scanner_path: Option<&Utf8Path>,
    overrides: RunOverrides,
    json: bool,
) -> Result<ExitCode, GroundcheckError> {
    let mut config = PipelineConfig::discover(config_path)?;
    overrides.apply(&mut config);
    config.validate().map_err(GroundcheckError::Config)?;

    let manifest_text = read_input(manifest_path)?;
    let docs = load_docs(doc_paths)?;
    let facts = load_docs(fact_paths)?;
    let findings = load_scanner(scanner_path)?;

    // With no findings there is nothing to generate; an empty command is
    // only an error once a generator call would actually happen.
    if !findings.is_empty() && config.generator_command.is_empty() {
        return Err(GroundcheckError::Config(ConfigError::InvalidValue {
            field: "generator_command".to_string(),
            reason: "no generator command configured; set it in groundcheck.toml or pass --generator-cmd"
                .to_string(),
        }));
    }

    let generator = CommandGenerator::new(
        config.generator_command.as_str(),
        config.generator_args.clone(),
    );
    let pipeline = Pipeline::new(&config, &generator);
    let request = ReportRequest {
        manifest_text,
        docs,
        facts,
        findings,
    };
    let outcome = pipeline.run(&request).await?;

    // summary.json is written for both outcomes; report.md and merged.yaml
    // only exist for accepted runs
    std::fs::create_dir_all(&config.output_dir)?;
    let summary_json = outcome.summary().to_jcs()?;
    std::fs::write(config.output_dir.join("summary.json"), &summary_json)?;

    match outcome {
        RunOutcome::Accepted(accepted) => {
            std::fs::write(config.output_dir.join("report.md"), &accepted.text)?;
            std::fs::write(
                config.output_dir.join("merged.yaml"),
                &accepted.merged_manifest,
            )?;

            if json {
                println!("{summary_json}");
            } else {
                print_accepted(&accepted, &config.output_dir);
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Rejected(rejected) => {
            print_rejected(&rejected);
            if json {
                println!("{summary_json}");
            }
            Ok(ExitCode::REJECTED)
        }
    }
}

fn print_accepted(accepted: &AcceptedReport, output_dir: &Utf8Path) {
    let summary = &accepted.summary;
    println!("✓ Report accepted");
    println!("  Findings analyzed: {}", summary.finding_count);
    println!("  Repair attempts: {}", summary.repair_attempts);
    if !summary.citations_used.is_empty() {
        let citations = summary
            .citations_used
            .iter()
            .map(|number| format!("[{number}]"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  Citations used: {citations}");
    }
    if !accepted.warnings.is_empty() {
        println!("  Warnings: {}", accepted.warnings.len());
        for warning in &accepted.warnings {
            println!("    - {warning}");
        }
    }
    if !accepted.conflicts.is_empty() {
        println!("  Superseded edits: {}", accepted.conflicts.len());
        for conflict in &accepted.conflicts {
            println!(
                "    - `{}` superseded by `{}`",
                conflict.path, conflict.superseded_by
            );
        }
    }
    if accepted.diff.is_empty() {
        println!("  Manifest changes: none");
    } else {
        println!("  Manifest changes: {}", accepted.diff.len());
        for entry in &accepted.diff {
            println!("    - {} {}", diff_verb(entry.op), entry.path);
        }
    }
    println!();
    println!("  Report:  {}", output_dir.join("report.md"));
    println!("  Merged:  {}", output_dir.join("merged.yaml"));
    println!("  Summary: {}", output_dir.join("summary.json"));
}

const fn diff_verb(op: DiffOp) -> &'static str {
    match op {
        DiffOp::Added => "added",
        DiffOp::Removed => "removed",
        DiffOp::Modified => "modified",
    }
}

fn print_rejected(rejected: &RejectedRun) {
    eprintln!(
        "✗ Run rejected: rule {} exhausted its repair budget after {} attempt(s)",
        rejected.rule_id, rejected.attempts
    );
    for (index, violation) in rejected.violations.iter().enumerate() {
        eprintln!("  {}. [{}] {}", index + 1, violation.code(), violation);
    }
}

/// Execute the evidence table command
fn execute_evidence(
    doc_paths: &[Utf8PathBuf],
    fact_paths: &[Utf8PathBuf],
    scanner_path: Option<&Utf8Path>,
    json: bool,
) -> Result<ExitCode, GroundcheckError> {
    let docs = load_docs(doc_paths)?;
    let facts = load_docs(fact_paths)?;
    let findings = load_scanner(scanner_path)?;
    let table = EvidenceTable::build(&docs, &facts, &findings);

    if json {
        let payload = serde_json::json!({
            "digest": table.digest()?,
            "items": table.items(),
        });
        println!("{}", emit_jcs(&payload)?);
        return Ok(ExitCode::SUCCESS);
    }

    if table.is_empty() {
        println!("No evidence items.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Evidence table ({} item(s)):", table.len());
    println!();
    println!("{}", table.context_block());
    println!();
    println!("Digest: {}", table.digest()?);
    Ok(ExitCode::SUCCESS)
}

/// Execute the offline report check command
fn execute_check(
    report_path: &Utf8Path,
    manifest_path: &Utf8Path,
    doc_paths: &[Utf8PathBuf],
    fact_paths: &[Utf8PathBuf],
    scanner_path: Option<&Utf8Path>,
    json: bool,
) -> Result<ExitCode, GroundcheckError> {
    let report_text = read_input(report_path)?;
    let manifest_text = read_input(manifest_path)?;
    let docs = load_docs(doc_paths)?;
    let facts = load_docs(fact_paths)?;
    let findings = load_scanner(scanner_path)?;

    let tree = parse(&manifest_text)?;
    let table = EvidenceTable::build(&docs, &facts, &findings);
    let report = parse_report(&report_text);

    // Same checks a pipeline round applies to a draft
    let mut violations = check(&report);
    let grounding = GroundingValidator::validate(&report, &table, &tree);
    extend_unique(&mut violations, grounding.violations);
    match extract_fragment(&report, 0) {
        Ok(Some(fragment)) => extend_unique(&mut violations, verify_fragment(&fragment, &tree)),
        Ok(None) => {}
        Err(extraction) => extend_unique(&mut violations, extraction),
    }

    if json {
        let payload = serde_json::json!({
            "violations": violations,
            "warnings": grounding.warnings,
        });
        println!("{}", emit_jcs(&payload)?);
    } else if violations.is_empty() {
        println!("✓ Report is grounded");
        print_warnings(&grounding.warnings);
    } else {
        println!("✗ Report has {} violation(s):", violations.len());
        for (index, violation) in violations.iter().enumerate() {
            println!("  {}. [{}] {}", index + 1, violation.code(), violation);
        }
        print_warnings(&grounding.warnings);
    }

    if violations.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::REJECTED)
    }
}

fn print_warnings(warnings: &[GroundingWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("  Warnings: {}", warnings.len());
    for warning in warnings {
        println!("    - {warning}");
    }
}

fn read_input(path: &Utf8Path) -> Result<String, GroundcheckError> {
    std::fs::read_to_string(path).map_err(|err| GroundcheckError::InputRead {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

/// Load evidence docs from JSON array files, concatenated in flag order.
fn load_docs(paths: &[Utf8PathBuf]) -> Result<Vec<EvidenceDoc>, GroundcheckError> {
    let mut docs = Vec::new();
    for path in paths {
        let text = read_input(path)?;
        let mut batch: Vec<EvidenceDoc> =
            serde_json::from_str(&text).map_err(|err| EvidenceError::Feed {
                path: path.to_string(),
                reason: err.to_string(),
            })?;
        docs.append(&mut batch);
    }
    Ok(docs)
}

/// Read scanner findings from a Trivy JSON report or a plain findings array.
fn load_findings(path: &Utf8Path) -> Result<Vec<ScannerFinding>, GroundcheckError> {
    let text = read_input(path)?;
    if let Ok(findings) = serde_json::from_str::<Vec<ScannerFinding>>(&text) {
        return Ok(findings);
    }
    Ok(findings_from_trivy(&text)?)
}

fn load_scanner(path: Option<&Utf8Path>) -> Result<Vec<ScannerFinding>, GroundcheckError> {
    match path {
        Some(path) => load_findings(path),
        None => Ok(Vec::new()),
    }
}

/// Append violations not already recorded, preserving first-seen order.
fn extend_unique(violations: &mut Vec<Violation>, extra: Vec<Violation>) {
    for violation in extra {
        if !violations.contains(&violation) {
            violations.push(violation);
        }
    }
}

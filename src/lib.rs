//! groundcheck - Grounded remediation reports with citation receipts and
//! verifiable manifest patches
//!
//! groundcheck turns a Kubernetes manifest, a set of retrieved hardening
//! evidence, and a scanner report into a single validated remediation
//! report. Every claim in the report must cite supplied evidence, every
//! path reference must resolve against the manifest, and every proposed
//! edit must reproduce the current manifest state before it is applied.
//! Output that breaks those rules is sent back to the generator with
//! repair diagnostics; output that keeps breaking them is rejected.
//!
//! groundcheck can be used in two ways:
//! - **CLI**: Install via `cargo install groundcheck` and run from the
//!   command line
//! - **Library**: Add as a dependency and drive [`Pipeline`] directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Generate a grounded report for a manifest
//! groundcheck run pod.yaml --docs evidence/docs.json --scanner trivy.json
//!
//! # Inspect the citation numbers a run would assign
//! groundcheck evidence --docs evidence/docs.json --scanner trivy.json
//!
//! # Re-validate an existing report without calling a generator
//! groundcheck check report.md pod.yaml --docs evidence/docs.json --scanner trivy.json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use groundcheck::{Pipeline, PipelineConfig, ReportRequest, RunOutcome};
//! use groundcheck::ScriptedGenerator;
//!
//! # async fn example() -> Result<(), groundcheck::GroundcheckError> {
//! let config = PipelineConfig::default();
//! let generator = ScriptedGenerator::default();
//! let pipeline = Pipeline::new(&config, &generator);
//!
//! let request = ReportRequest {
//!     manifest_text: "kind: Pod\n".to_string(),
//!     ..ReportRequest::default()
//! };
//! match pipeline.run(&request).await? {
//!     RunOutcome::Accepted(report) => println!("{}", report.text),
//!     RunOutcome::Rejected(rejected) => eprintln!("{:?}", rejected.violations),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # JSON Contracts
//!
//! Run summaries are emitted in JCS (RFC 8785) canonical form
//! (`schema_version: "run-summary.v1"`), with BLAKE3 digests binding the
//! evidence table and the merged manifest. Use [`emit_jcs`] for your own
//! integrations.
//!
//! # Stable Public API
//!
//! - [`Pipeline`], [`ReportRequest`], [`RunOutcome`] - driving a report run
//! - [`PipelineConfig`] - configuration management
//! - [`GroundcheckError`] and [`Violation`] - error taxonomy
//! - [`ExitCode`] - CLI exit codes
//! - [`RunSummary`] - machine-readable run receipts
//! - [`emit_jcs`] - JCS canonical JSON emission
//!
//! Internal modules remain accessible via module paths but are marked
//! `#[doc(hidden)]` and carry no stability guarantees.

// ============================================================================
// Stable Public API
// ============================================================================

/// The report generation pipeline.
///
/// One [`Pipeline::run`] call drives one generation round per scanner
/// finding, repairs or rejects rule-breaking output, and assembles the
/// accepted analyses into a single validated report with a unified patch.
pub use groundcheck_engine::{
    AcceptedReport, Pipeline, RejectedRun, ReportRequest, RoundAnalysis, RunOutcome,
};

/// Pipeline configuration with serde defaults.
///
/// Loaded from `groundcheck.toml` via [`PipelineConfig::discover`], with
/// CLI flags overlaid on top.
pub use groundcheck_engine::{CONFIG_FILE_NAME, DEFAULT_MAX_REPAIR_ATTEMPTS, PipelineConfig};

/// Per-round repair loop state, carried in rejection output.
pub use groundcheck_engine::{Round, RoundState};

/// Machine-readable run receipt, emitted as JCS canonical JSON.
pub use groundcheck_engine::{RunSummary, SCHEMA_VERSION, SummaryOutcome};

/// Library-level error type with rich context.
///
/// `GroundcheckError` provides user-friendly messages via
/// [`display_for_user()`](GroundcheckError::display_for_user) and exit code
/// mapping via [`to_exit_code()`](GroundcheckError::to_exit_code). Library
/// code returns `GroundcheckError` and does NOT call `std::process::exit()`.
pub use groundcheck_utils::error::GroundcheckError;

/// One repairable defect found in generated output.
pub use groundcheck_utils::error::Violation;

/// Trait for providing user-friendly error reporting.
pub use groundcheck_utils::error::{ErrorCategory, UserFriendlyError};

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the public API.
pub use groundcheck_utils::exit_codes::ExitCode;

/// JCS (RFC 8785) canonical JSON emission for JSON contracts.
pub use groundcheck_utils::canonicalization::{content_digest, emit_jcs};

/// Shared enums: evidence source types and scanner severities.
pub use groundcheck_utils::types::{Severity, SourceType};

/// Evidence feeds and the per-run citation table.
pub use groundcheck_evidence::{
    EvidenceDoc, EvidenceItem, EvidenceTable, ScannerFinding, findings_from_trivy,
};

/// Addressable manifest tree with byte-faithful rendering.
pub use groundcheck_manifest::{DiffEntry, DiffOp, ManifestPath, ManifestTree, parse};

/// Report parsing and the five-section format contract.
pub use groundcheck_report::{FinalReport, NO_CHANGE_MARKER, ParsedReport, check, parse_report};

/// Grounding validation of claims against evidence and manifest.
pub use groundcheck_validation::{GroundingValidator, GroundingWarning, ValidationReport};

/// Patch fragments, verification, and merging.
pub use groundcheck_patch::{
    Conflict, MergedPatch, PatchFragment, extract_fragment, merge, verify_fragment,
};

/// Generator backends: the trait, the subprocess backend, and the scripted
/// backend for tests and development.
pub use groundcheck_llm::{
    CommandGenerator, DEFAULT_TIMEOUT_SECS, Generated, GenerationRequest, Generator,
    ScriptedGenerator, ScriptedReply,
};

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use groundcheck_utils::{canonicalization, error, exit_codes, logging, types};

#[doc(hidden)]
pub use groundcheck_engine as engine;

#[doc(hidden)]
pub use groundcheck_llm as llm;

#[doc(hidden)]
pub use groundcheck_manifest as manifest;

#[doc(hidden)]
pub use groundcheck_evidence as evidence;

#[doc(hidden)]
pub use groundcheck_report as report;

#[doc(hidden)]
pub use groundcheck_validation as validation;

#[doc(hidden)]
pub use groundcheck_patch as patch;

// CLI module - internal implementation detail, not part of stable public API.
// Exported with #[doc(hidden)] to allow white-box testing of flag parsing.
#[doc(hidden)]
pub mod cli;

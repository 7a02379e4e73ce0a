//! Pipeline orchestration for groundcheck
//!
//! Wires the manifest tree, evidence table, format and grounding checks,
//! and the patch merger around a generator backend. The engine owns the
//! draft/validate/repair state machine, per-call deadlines, final report
//! assembly, and the machine-readable run summary.

pub mod config;
pub mod instruction;
pub mod pipeline;
pub mod round;
pub mod summary;

pub use config::{CONFIG_FILE_NAME, DEFAULT_MAX_REPAIR_ATTEMPTS, PipelineConfig};
pub use instruction::InstructionBuilder;
pub use pipeline::{
    AcceptedReport, Pipeline, RejectedRun, ReportRequest, RoundAnalysis, RunOutcome,
};
pub use round::{Round, RoundState};
pub use summary::{RunSummary, SCHEMA_VERSION, SummaryOutcome};

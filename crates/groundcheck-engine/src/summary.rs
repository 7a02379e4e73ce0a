//! Machine-readable run summary
//!
//! Emitted alongside the human-readable report as one JCS line, so two runs
//! over the same inputs can be compared byte for byte (modulo the
//! completion timestamp).

use chrono::{DateTime, Utc};
use serde::Serialize;

use groundcheck_utils::canonicalization::emit_jcs;
use groundcheck_utils::error::GroundcheckError;

/// Identifies the summary layout for downstream consumers.
pub const SCHEMA_VERSION: &str = "run-summary.v1";

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    Accepted,
    Rejected,
}

/// Counters and digests describing one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub schema_version: String,
    pub outcome: SummaryOutcome,
    /// Scanner findings that got a generation round
    pub finding_count: usize,
    /// Rounds actually started (equals `finding_count` unless a rejection
    /// stopped the run early)
    pub round_count: usize,
    /// Regeneration attempts consumed across all rounds
    pub repair_attempts: usize,
    /// Every citation number used by accepted analyses, sorted, deduplicated
    pub citations_used: Vec<usize>,
    pub warning_count: usize,
    pub conflict_count: usize,
    /// Digest of the canonical evidence table the run saw
    pub evidence_digest: String,
    /// Digest of the merged manifest; absent when the run was rejected
    pub merged_manifest_digest: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    /// Serialize to one canonical JSON line.
    pub fn to_jcs(&self) -> Result<String, GroundcheckError> {
        emit_jcs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_serializes_canonically() {
        let summary = RunSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            outcome: SummaryOutcome::Accepted,
            finding_count: 1,
            round_count: 1,
            repair_attempts: 0,
            citations_used: vec![2],
            warning_count: 0,
            conflict_count: 0,
            evidence_digest: "abc".to_string(),
            merged_manifest_digest: Some("def".to_string()),
            completed_at: fixed_instant(),
        };
        assert_eq!(
            summary.to_jcs().unwrap(),
            "{\"citations_used\":[2],\"completed_at\":\"2025-06-01T12:00:00Z\",\
             \"conflict_count\":0,\"evidence_digest\":\"abc\",\"finding_count\":1,\
             \"merged_manifest_digest\":\"def\",\"outcome\":\"accepted\",\
             \"repair_attempts\":0,\"round_count\":1,\
             \"schema_version\":\"run-summary.v1\",\"warning_count\":0}"
        );
    }

    #[test]
    fn test_rejected_summary_has_no_manifest_digest() {
        let summary = RunSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            outcome: SummaryOutcome::Rejected,
            finding_count: 2,
            round_count: 1,
            repair_attempts: 2,
            citations_used: vec![],
            warning_count: 0,
            conflict_count: 0,
            evidence_digest: "abc".to_string(),
            merged_manifest_digest: None,
            completed_at: fixed_instant(),
        };
        let line = summary.to_jcs().unwrap();
        assert!(line.contains("\"merged_manifest_digest\":null"));
        assert!(line.contains("\"outcome\":\"rejected\""));
    }
}

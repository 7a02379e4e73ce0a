//! Input shapes for the three evidence feeds
//!
//! Guideline documents and policy facts arrive pre-retrieved with a source
//! name, control ID, snippet, and source-type tag. Scanner findings arrive
//! as a Trivy JSON report; only failed misconfiguration checks become
//! evidence.

use serde::{Deserialize, Serialize};
use tracing::debug;

use groundcheck_utils::error::EvidenceError;
use groundcheck_utils::types::{Severity, SourceType};

/// One retrieved guideline document or policy fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceDoc {
    /// Source name, e.g. `cis-kubernetes-benchmark`
    pub source: String,
    /// Control or section ID within the source, e.g. `CIS 5.2.7`
    pub id: String,
    /// The excerpt the claim must be traceable to
    pub snippet: String,
    pub source_type: SourceType,
}

impl EvidenceDoc {
    pub fn new(
        source: impl Into<String>,
        id: impl Into<String>,
        snippet: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
            snippet: snippet.into(),
            source_type,
        }
    }
}

/// One failed scanner check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerFinding {
    /// Scanner rule ID, e.g. `KSV017`
    pub rule_id: String,
    pub title: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Affected location hint as reported by the scanner, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_hint: Option<String>,
}

impl ScannerFinding {
    /// Text form used when the finding becomes an evidence item
    #[must_use]
    pub fn evidence_text(&self) -> String {
        let mut text = format!("{}. {}", self.title.trim_end_matches('.'), self.description);
        if let Some(resolution) = &self.resolution {
            text.push_str(" Resolution: ");
            text.push_str(resolution);
        }
        text
    }
}

#[derive(Debug, Deserialize)]
struct TrivyReport {
    #[serde(default, rename = "Results")]
    results: Vec<TrivyResult>,
}

#[derive(Debug, Deserialize)]
struct TrivyResult {
    #[serde(default, rename = "Misconfigurations")]
    misconfigurations: Vec<TrivyMisconfiguration>,
}

#[derive(Debug, Deserialize)]
struct TrivyMisconfiguration {
    #[serde(rename = "ID")]
    id: String,
    #[serde(default, rename = "Title")]
    title: String,
    #[serde(default, rename = "Severity")]
    severity: String,
    #[serde(default, rename = "Message")]
    message: String,
    #[serde(default, rename = "Resolution")]
    resolution: Option<String>,
    #[serde(default, rename = "Status")]
    status: String,
    #[serde(default, rename = "CauseMetadata")]
    cause: Option<TrivyCause>,
}

#[derive(Debug, Deserialize)]
struct TrivyCause {
    #[serde(default, rename = "Resource")]
    resource: Option<String>,
}

/// Extract failed misconfiguration checks from a Trivy `--format json`
/// report. Passing checks and non-misconfiguration results are ignored.
pub fn findings_from_trivy(json: &str) -> Result<Vec<ScannerFinding>, EvidenceError> {
    let report: TrivyReport = serde_json::from_str(json).map_err(|err| EvidenceError::ScannerReport {
        reason: err.to_string(),
    })?;

    let mut findings = Vec::new();
    for result in report.results {
        for misconfig in result.misconfigurations {
            if misconfig.status != "FAIL" {
                continue;
            }
            findings.push(ScannerFinding {
                rule_id: misconfig.id,
                title: misconfig.title,
                severity: Severity::parse_lenient(&misconfig.severity),
                description: misconfig.message,
                resolution: misconfig.resolution,
                path_hint: misconfig.cause.and_then(|cause| cause.resource),
            });
        }
    }
    debug!(count = findings.len(), "extracted failed scanner checks");
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIVY_REPORT: &str = r#"{
        "SchemaVersion": 2,
        "Results": [
            {
                "Target": "pod.yaml",
                "Misconfigurations": [
                    {
                        "ID": "KSV017",
                        "Title": "Privileged container",
                        "Severity": "HIGH",
                        "Message": "Container 'web' should not be privileged",
                        "Resolution": "Set securityContext.privileged to false",
                        "Status": "FAIL",
                        "CauseMetadata": {"Resource": "containers[web]"}
                    },
                    {
                        "ID": "KSV014",
                        "Title": "Root file system is not read-only",
                        "Severity": "LOW",
                        "Message": "ok here",
                        "Status": "PASS"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_only_failed_checks_become_findings() {
        let findings = findings_from_trivy(TRIVY_REPORT).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "KSV017");
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].path_hint.as_deref(), Some("containers[web]"));
    }

    #[test]
    fn test_unknown_severity_is_lenient() {
        let json = r#"{"Results":[{"Misconfigurations":[
            {"ID":"KSV999","Title":"T","Severity":"WHATEVER","Message":"m","Status":"FAIL"}
        ]}]}"#;
        let findings = findings_from_trivy(json).unwrap();
        assert_eq!(findings[0].severity, Severity::Unknown);
    }

    #[test]
    fn test_malformed_report_is_scanner_report_error() {
        let err = findings_from_trivy("not json").unwrap_err();
        assert!(matches!(err, EvidenceError::ScannerReport { .. }));
    }

    #[test]
    fn test_report_without_results_yields_no_findings() {
        let findings = findings_from_trivy(r#"{"SchemaVersion": 2}"#).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_evidence_text_includes_resolution() {
        let findings = findings_from_trivy(TRIVY_REPORT).unwrap();
        let text = findings[0].evidence_text();
        assert!(text.starts_with("Privileged container."));
        assert!(text.contains("Resolution: Set securityContext.privileged to false"));
    }
}

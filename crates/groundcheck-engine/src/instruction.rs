//! Generator instruction assembly
//!
//! One instruction per generation attempt: the report contract, the full
//! evidence table, the manifest, and the single scanner finding under
//! analysis. Repair attempts carry the previous draft and a numbered
//! diagnostic list so the generator can fix exactly what was rejected.

use std::fmt::Write as _;

use groundcheck_evidence::{EvidenceTable, ScannerFinding};
use groundcheck_utils::error::Violation;

/// The output contract restated inside every instruction.
const CONTRACT: &str = "\
Answer with a Markdown report containing exactly these five `##` sections in
this order: Findings, Current Issues, Recommendation, Additional Guidance,
References.
- Findings: bullet items, each beginning with the bracketed source-type tag
  of its evidence ([CIS], [NIST], [ENISA], [NSA], [KISA], [SCANNER]) and
  ending with at least one citation such as [1].
- Current Issues: bullet items citing evidence; name each affected manifest
  location as a backtick-quoted path such as
  `spec.containers[web].securityContext.privileged`.
- Recommendation: a `Target:` line naming the subtree path to edit, one
  blank line, a fenced yaml block reproducing the current subtree at that
  path exactly, one blank line, then a second fenced yaml block with the
  proposed subtree. Exactly one pair. Indent in two-space steps, never tabs.
  Write `No code change required.` instead when nothing needs to change.
- Additional Guidance: bullet items; citations optional.
- References: one bullet per cited evidence item, `- [n] [TAG] source: id`,
  in citation-number order, listing exactly the items you cited.
Cite only numbers that appear in the evidence table. Do not invent evidence,
paths, or settings.";

/// Builds per-round instructions over one request's manifest and evidence.
pub struct InstructionBuilder<'a> {
    manifest_text: &'a str,
    evidence: &'a EvidenceTable,
}

impl<'a> InstructionBuilder<'a> {
    #[must_use]
    pub fn new(manifest_text: &'a str, evidence: &'a EvidenceTable) -> Self {
        Self {
            manifest_text,
            evidence,
        }
    }

    /// Instruction for the first draft of a finding's analysis.
    #[must_use]
    pub fn initial(&self, finding: &ScannerFinding, citation: usize) -> String {
        let mut out = String::new();
        out.push_str(
            "You are a Kubernetes security analyst. Analyze one scanner finding \
             against the manifest below and propose a remediation grounded in \
             the supplied evidence.\n\n",
        );
        out.push_str(CONTRACT);
        out.push_str("\n\nEvidence table:\n");
        out.push_str(&self.evidence.context_block());
        out.push_str("\n\nManifest:\n```yaml\n");
        out.push_str(self.manifest_text);
        if !self.manifest_text.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
        let _ = writeln!(out, "Finding to analyze, cited as [{citation}]:");
        let _ = writeln!(out, "- Rule: {}", finding.rule_id);
        let _ = writeln!(out, "- Severity: {}", finding.severity);
        let _ = writeln!(out, "- Title: {}", finding.title);
        let _ = writeln!(out, "- Detail: {}", finding.description);
        if let Some(resolution) = &finding.resolution {
            let _ = writeln!(out, "- Resolution hint: {resolution}");
        }
        if let Some(hint) = &finding.path_hint {
            let _ = writeln!(out, "- Affected location hint: `{hint}`");
        }
        out
    }

    /// Repair instruction: the initial instruction, the rejected draft when
    /// one exists, and a numbered diagnostic per outstanding violation.
    #[must_use]
    pub fn repair(
        &self,
        finding: &ScannerFinding,
        citation: usize,
        previous: Option<&str>,
        violations: &[Violation],
    ) -> String {
        let mut out = self.initial(finding, citation);
        out.push('\n');
        match previous {
            Some(previous) => {
                out.push_str(
                    "Your previous answer violated the contract. Previous answer:\n\n",
                );
                out.push_str(previous.trim_end());
                out.push_str("\n\nViolations to fix:\n");
            }
            None => {
                out.push_str("Your previous attempt produced no usable answer.\n\nViolations to fix:\n");
            }
        }
        for (index, violation) in violations.iter().enumerate() {
            let _ = writeln!(out, "{}. {violation}", index + 1);
            let _ = writeln!(out, "   Rule: {}", contract_clause(violation));
        }
        out.push_str(
            "\nRegenerate the complete five-section analysis with every violation corrected.\n",
        );
        out
    }
}

/// The contract clause a violation breaks, restated verbatim in repair
/// diagnostics.
fn contract_clause(violation: &Violation) -> &'static str {
    match violation {
        Violation::MissingSection { .. }
        | Violation::DuplicateSection { .. }
        | Violation::SectionOrder { .. } => {
            "the report contains exactly five `##` sections in order: Findings, \
             Current Issues, Recommendation, Additional Guidance, References"
        }
        Violation::MissingSourceTag { .. } => {
            "every findings item begins with a recognized source-type tag such as [CIS]"
        }
        Violation::MissingCitation { .. } => {
            "every findings, current-issues, and references item carries at least one citation"
        }
        Violation::FenceSpacing { .. } | Violation::UnclosedFence { .. } => {
            "yaml blocks are fenced and surrounded by exactly one blank line on each side"
        }
        Violation::TabIndentation { .. } | Violation::IndentationStep { .. } => {
            "yaml block indentation increases in two-space steps and never uses tabs"
        }
        Violation::MissingTarget
        | Violation::ExtraPatchPair { .. }
        | Violation::MissingPatchPair => {
            "the recommendation names one `Target:` path and presents exactly one \
             before/after pair of fenced yaml blocks"
        }
        Violation::HallucinatedCitation { .. } => {
            "citations use only numbers present in the evidence table"
        }
        Violation::InvalidPath { .. } => {
            "path references name locations that exist in the manifest"
        }
        Violation::StaleContext { .. } => {
            "the before block reproduces the current manifest content at the target path"
        }
        Violation::InvalidSnippet { .. } => "both fenced blocks are valid YAML",
        Violation::GeneratorFailure { .. } => {
            "the answer is one complete five-section analysis"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundcheck_evidence::EvidenceDoc;
    use groundcheck_utils::types::{Severity, SourceType};

    fn finding() -> ScannerFinding {
        ScannerFinding {
            rule_id: "KSV017".to_string(),
            title: "Privileged container".to_string(),
            severity: Severity::High,
            description: "Container 'web' should not be privileged".to_string(),
            resolution: Some("Set securityContext.privileged to false".to_string()),
            path_hint: Some("containers[web]".to_string()),
        }
    }

    fn table() -> EvidenceTable {
        let docs = vec![EvidenceDoc::new(
            "cis-kubernetes-benchmark",
            "CIS 5.2.2",
            "Minimize the admission of privileged containers.",
            SourceType::Cis,
        )];
        EvidenceTable::build(&docs, &[], &[finding()])
    }

    #[test]
    fn test_initial_instruction_carries_all_inputs() {
        let table = table();
        let builder = InstructionBuilder::new("spec:\n  hostNetwork: true\n", &table);
        let instruction = builder.initial(&finding(), 2);

        assert!(instruction.contains("exactly these five `##` sections"));
        assert!(instruction.contains("[1] [CIS] cis-kubernetes-benchmark CIS 5.2.2"));
        assert!(instruction.contains("spec:\n  hostNetwork: true"));
        assert!(instruction.contains("Finding to analyze, cited as [2]:"));
        assert!(instruction.contains("- Rule: KSV017"));
        assert!(instruction.contains("- Severity: High"));
        assert!(instruction.contains("- Resolution hint: Set securityContext.privileged to false"));
        assert!(instruction.contains("- Affected location hint: `containers[web]`"));
    }

    #[test]
    fn test_optional_finding_fields_omitted() {
        let table = table();
        let builder = InstructionBuilder::new("kind: Pod\n", &table);
        let mut bare = finding();
        bare.resolution = None;
        bare.path_hint = None;
        let instruction = builder.initial(&bare, 2);
        assert!(!instruction.contains("Resolution hint"));
        assert!(!instruction.contains("Affected location hint"));
    }

    #[test]
    fn test_repair_appends_numbered_diagnostics() {
        let table = table();
        let builder = InstructionBuilder::new("kind: Pod\n", &table);
        let violations = vec![
            Violation::MissingSection {
                heading: "References".to_string(),
            },
            Violation::MissingTarget,
        ];
        let instruction = builder.repair(&finding(), 2, Some("## Findings\nbad draft\n"), &violations);

        assert!(instruction.contains("Previous answer:"));
        assert!(instruction.contains("bad draft"));
        assert!(instruction.contains("1. required section `References` is missing"));
        assert!(instruction.contains("2. recommendation section has no `Target:` line"));
        assert!(instruction.contains("   Rule: the report contains exactly five"));
        assert!(instruction.contains("Regenerate the complete five-section analysis"));
    }

    #[test]
    fn test_repair_without_previous_draft() {
        let table = table();
        let builder = InstructionBuilder::new("kind: Pod\n", &table);
        let violations = vec![Violation::GeneratorFailure {
            detail: "generation timed out after 120s".to_string(),
        }];
        let instruction = builder.repair(&finding(), 2, None, &violations);
        assert!(instruction.contains("produced no usable answer"));
        assert!(!instruction.contains("Previous answer:"));
    }
}

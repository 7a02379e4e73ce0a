//! The report generation pipeline
//!
//! One run takes a manifest plus evidence feeds, drives one generation
//! round per scanner finding in citation order, repairs or rejects
//! rule-breaking output, and assembles the accepted analyses into a single
//! validated report with a unified patch. A manifest with no scanner
//! findings short-circuits to a no-violation report without any generator
//! call.

use chrono::Utc;
use tracing::{error, info, warn};

use groundcheck_evidence::{EvidenceDoc, EvidenceTable, ScannerFinding};
use groundcheck_llm::{Generated, GenerationRequest, Generator};
use groundcheck_manifest::{DiffEntry, DiffOp, ManifestTree, parse};
use groundcheck_patch::{Conflict, PatchFragment, extract_fragment, merge, verify_fragment};
use groundcheck_report::{FinalReport, ParsedReport, check, parse_report};
use groundcheck_utils::canonicalization::content_digest;
use groundcheck_utils::error::{GeneratorError, GroundcheckError, Violation};
use groundcheck_utils::types::SourceType;
use groundcheck_validation::{GroundingValidator, GroundingWarning};

use crate::config::PipelineConfig;
use crate::instruction::InstructionBuilder;
use crate::round::{Round, RoundState};
use crate::summary::{RunSummary, SCHEMA_VERSION, SummaryOutcome};

/// Inputs for one report run.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    /// The submitted manifest, exactly as received
    pub manifest_text: String,
    /// Retrieved hardening-guide documents
    pub docs: Vec<EvidenceDoc>,
    /// Cluster policy facts
    pub facts: Vec<EvidenceDoc>,
    /// Scanner findings driving the generation rounds
    pub findings: Vec<ScannerFinding>,
}

/// One accepted per-finding analysis.
#[derive(Debug, Clone)]
pub struct RoundAnalysis {
    pub rule_id: String,
    /// Citation number of the finding in the evidence table
    pub citation: usize,
    pub report: ParsedReport,
    /// The proposed edit, `None` for a no-change analysis
    pub fragment: Option<PatchFragment>,
    pub warnings: Vec<GroundingWarning>,
    /// Generation attempts this analysis took, including the accepted one
    pub attempts: usize,
    /// Backend that produced the accepted text
    pub backend: String,
}

/// A fully assembled, validated report.
#[derive(Debug, Clone)]
pub struct AcceptedReport {
    /// The final five-section Markdown document
    pub text: String,
    pub analyses: Vec<RoundAnalysis>,
    /// Citation numbers used across accepted analyses, sorted, deduplicated
    pub citations_used: Vec<usize>,
    /// Manifest paths referenced by accepted claims, first-seen order
    pub path_references: Vec<String>,
    pub warnings: Vec<GroundingWarning>,
    pub conflicts: Vec<Conflict>,
    pub diff: Vec<DiffEntry>,
    /// Full manifest text with every accepted edit applied
    pub merged_manifest: String,
    pub summary: RunSummary,
}

/// A run stopped by a round that exhausted its repair budget.
#[derive(Debug, Clone)]
pub struct RejectedRun {
    /// Violations outstanding after the final attempt
    pub violations: Vec<Violation>,
    /// Rule whose round was rejected
    pub rule_id: String,
    /// Attempts the rejected round consumed
    pub attempts: usize,
    /// Full state history of the rejected round
    pub state_history: Vec<RoundState>,
    pub summary: RunSummary,
}

/// Terminal result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Accepted(AcceptedReport),
    Rejected(RejectedRun),
}

impl RunOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Accepted(accepted) => &accepted.summary,
            Self::Rejected(rejected) => &rejected.summary,
        }
    }
}

/// Outcome of one finding's round.
enum RoundResult {
    Accepted(RoundAnalysis),
    Rejected { violations: Vec<Violation>, round: Round },
}

/// A generated draft with its check results.
struct Candidate {
    report: ParsedReport,
    fragment: Option<PatchFragment>,
    warnings: Vec<GroundingWarning>,
    violations: Vec<Violation>,
}

/// Drives generation rounds against a configured backend.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    generator: &'a dyn Generator,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a PipelineConfig, generator: &'a dyn Generator) -> Self {
        Self { config, generator }
    }

    /// Run the full pipeline over one request.
    ///
    /// Errors are fatal input or IO problems only; rule-breaking generator
    /// output is handled by the repair loop and surfaces as a
    /// [`RunOutcome::Rejected`].
    pub async fn run(&self, request: &ReportRequest) -> Result<RunOutcome, GroundcheckError> {
        let tree = parse(&request.manifest_text)?;
        let evidence = EvidenceTable::build(&request.docs, &request.facts, &request.findings);

        // One round per scanner item, in citation-number order. Duplicate
        // rules collapsed at table build time stay collapsed here.
        let rounds: Vec<(usize, &ScannerFinding)> = evidence
            .items()
            .iter()
            .filter(|item| item.source_type == SourceType::Scanner)
            .filter_map(|item| {
                request
                    .findings
                    .iter()
                    .find(|finding| finding.rule_id == item.source_id)
                    .map(|finding| (item.number, finding))
            })
            .collect();

        info!(
            findings = rounds.len(),
            evidence_items = evidence.len(),
            "starting report run"
        );

        if rounds.is_empty() {
            return self.accept_no_violations(&tree, &evidence);
        }

        let builder = InstructionBuilder::new(&request.manifest_text, &evidence);
        let mut analyses: Vec<RoundAnalysis> = Vec::with_capacity(rounds.len());
        let mut repair_attempts = 0;

        for (index, (citation, finding)) in rounds.iter().copied().enumerate() {
            match self
                .run_round(&builder, &tree, &evidence, finding, citation, index)
                .await
            {
                RoundResult::Accepted(analysis) => {
                    repair_attempts += analysis.attempts.saturating_sub(1);
                    analyses.push(analysis);
                }
                RoundResult::Rejected { violations, round } => {
                    repair_attempts += round.attempts().saturating_sub(1);
                    let summary = RunSummary {
                        schema_version: SCHEMA_VERSION.to_string(),
                        outcome: SummaryOutcome::Rejected,
                        finding_count: rounds.len(),
                        round_count: index + 1,
                        repair_attempts,
                        citations_used: collect_citations(&analyses),
                        warning_count: analyses.iter().map(|a| a.warnings.len()).sum(),
                        conflict_count: 0,
                        evidence_digest: evidence.digest()?,
                        merged_manifest_digest: None,
                        completed_at: Utc::now(),
                    };
                    return Ok(RunOutcome::Rejected(RejectedRun {
                        violations,
                        rule_id: round.rule_id().to_string(),
                        attempts: round.attempts(),
                        state_history: round.history().to_vec(),
                        summary,
                    }));
                }
            }
        }

        self.assemble(&tree, &evidence, analyses, rounds.len(), repair_attempts)
    }

    /// Draft, validate, and repair one finding's analysis until it is
    /// accepted or the budget runs out. A failed generator call consumes an
    /// attempt like any other rejected draft.
    async fn run_round(
        &self,
        builder: &InstructionBuilder<'_>,
        tree: &ManifestTree,
        evidence: &EvidenceTable,
        finding: &ScannerFinding,
        citation: usize,
        order: usize,
    ) -> RoundResult {
        let mut round = Round::new(&finding.rule_id, citation, self.config.max_repair_attempts);
        let mut outstanding: Vec<Violation> = Vec::new();
        let mut last_text: Option<String> = None;

        loop {
            let instruction = if round.attempts() == 0 {
                builder.initial(finding, citation)
            } else {
                builder.repair(finding, citation, last_text.as_deref(), &outstanding)
            };
            round.begin_attempt();
            let request = GenerationRequest::new(instruction, &finding.rule_id)
                .with_attempt(round.attempts() - 1)
                .with_timeout(self.config.generator_timeout());

            match self.generate_bounded(request).await {
                Ok(generated) => {
                    round.validated();
                    let candidate = validate_candidate(&generated.text, evidence, tree, order);
                    if candidate.violations.is_empty() {
                        round.accept();
                        info!(
                            rule = %finding.rule_id,
                            citation,
                            attempts = round.attempts(),
                            warnings = candidate.warnings.len(),
                            "analysis accepted"
                        );
                        return RoundResult::Accepted(RoundAnalysis {
                            rule_id: finding.rule_id.clone(),
                            citation,
                            report: candidate.report,
                            fragment: candidate.fragment,
                            warnings: candidate.warnings,
                            attempts: round.attempts(),
                            backend: generated.backend,
                        });
                    }
                    for violation in &candidate.violations {
                        warn!(
                            rule = %finding.rule_id,
                            code = violation.code(),
                            "violation: {violation}"
                        );
                    }
                    outstanding = candidate.violations;
                    last_text = Some(generated.text);
                }
                Err(err) => {
                    warn!(
                        rule = %finding.rule_id,
                        attempt = round.attempts(),
                        "generation failed: {err}"
                    );
                    outstanding = vec![Violation::GeneratorFailure {
                        detail: err.to_string(),
                    }];
                    last_text = None;
                }
            }

            if round.can_repair() {
                info!(
                    rule = %finding.rule_id,
                    attempt = round.attempts(),
                    violations = outstanding.len(),
                    "granting repair attempt"
                );
                round.repair();
            } else {
                error!(
                    rule = %finding.rule_id,
                    attempts = round.attempts(),
                    violations = outstanding.len(),
                    "repair budget exhausted"
                );
                round.reject();
                return RoundResult::Rejected {
                    violations: outstanding,
                    round,
                };
            }
        }
    }

    /// Bound one generator call with the configured deadline. An elapsed
    /// deadline drops the backend future, which reaps a spawned process via
    /// its kill-on-drop handle.
    async fn generate_bounded(
        &self,
        request: GenerationRequest,
    ) -> Result<Generated, GeneratorError> {
        let seconds = request.timeout.as_secs();
        match tokio::time::timeout(request.timeout, self.generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout { seconds }),
        }
    }

    /// Assemble accepted analyses into the final report, the merged
    /// manifest, and the run summary.
    fn assemble(
        &self,
        tree: &ManifestTree,
        evidence: &EvidenceTable,
        analyses: Vec<RoundAnalysis>,
        finding_count: usize,
        repair_attempts: usize,
    ) -> Result<RunOutcome, GroundcheckError> {
        let fragments: Vec<PatchFragment> = analyses
            .iter()
            .filter_map(|analysis| analysis.fragment.clone())
            .collect();
        let merged = merge(&fragments, tree)?;

        let mut findings = Vec::new();
        let mut issues = Vec::new();
        let mut guidance = Vec::new();
        let mut path_references = Vec::new();
        for analysis in &analyses {
            extend_unique(
                &mut findings,
                analysis.report.findings.iter().map(|b| b.text.clone()),
            );
            extend_unique(
                &mut issues,
                analysis.report.issues.iter().map(|b| b.text.clone()),
            );
            extend_unique(
                &mut guidance,
                analysis.report.guidance.iter().map(|b| b.text.clone()),
            );
            extend_unique(
                &mut path_references,
                analysis
                    .report
                    .claim_bullets()
                    .flat_map(|bullet| bullet.path_references()),
            );
        }

        let citations_used = collect_citations(&analyses);
        let mut references = Vec::with_capacity(citations_used.len());
        for number in &citations_used {
            let item = evidence.lookup(*number)?;
            references.push(format!(
                "[{}] {} {}: {}",
                number,
                item.source_type.tag(),
                item.source,
                item.source_id
            ));
        }

        let warnings: Vec<GroundingWarning> = analyses
            .iter()
            .flat_map(|analysis| analysis.warnings.clone())
            .collect();
        let conflict_lines: Vec<String> = merged
            .conflicts
            .iter()
            .map(|conflict| {
                format!(
                    "`{}`: superseded by the later edit at `{}`",
                    conflict.path, conflict.superseded_by
                )
            })
            .collect();
        let change_lines: Vec<String> = merged.diff.iter().map(describe_change).collect();

        let (target, before, after) = if fragments.is_empty() {
            (None, None, None)
        } else {
            (
                Some(merged.root.raw().to_string()),
                Some(merged.before_subtree.clone()),
                Some(merged.after_subtree.clone()),
            )
        };

        let text = FinalReport {
            findings,
            issues,
            target,
            before,
            after,
            conflicts: conflict_lines,
            changes: change_lines,
            guidance,
            references,
        }
        .to_markdown();

        let summary = RunSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            outcome: SummaryOutcome::Accepted,
            finding_count,
            round_count: analyses.len(),
            repair_attempts,
            citations_used: citations_used.clone(),
            warning_count: warnings.len(),
            conflict_count: merged.conflicts.len(),
            evidence_digest: evidence.digest()?,
            merged_manifest_digest: Some(content_digest(&merged.after_text)),
            completed_at: Utc::now(),
        };

        info!(
            rounds = analyses.len(),
            citations = citations_used.len(),
            conflicts = merged.conflicts.len(),
            changes = merged.diff.len(),
            "run accepted"
        );

        Ok(RunOutcome::Accepted(AcceptedReport {
            text,
            analyses,
            citations_used,
            path_references,
            warnings,
            conflicts: merged.conflicts,
            diff: merged.diff,
            merged_manifest: merged.after_text,
            summary,
        }))
    }

    /// Zero scanner findings: emit the no-violation report directly.
    fn accept_no_violations(
        &self,
        tree: &ManifestTree,
        evidence: &EvidenceTable,
    ) -> Result<RunOutcome, GroundcheckError> {
        info!("no scanner findings; emitting no-violation report");
        let merged_manifest = tree.render();
        let summary = RunSummary {
            schema_version: SCHEMA_VERSION.to_string(),
            outcome: SummaryOutcome::Accepted,
            finding_count: 0,
            round_count: 0,
            repair_attempts: 0,
            citations_used: Vec::new(),
            warning_count: 0,
            conflict_count: 0,
            evidence_digest: evidence.digest()?,
            merged_manifest_digest: Some(content_digest(&merged_manifest)),
            completed_at: Utc::now(),
        };
        Ok(RunOutcome::Accepted(AcceptedReport {
            text: FinalReport::no_violations().to_markdown(),
            analyses: Vec::new(),
            citations_used: Vec::new(),
            path_references: Vec::new(),
            warnings: Vec::new(),
            conflicts: Vec::new(),
            diff: Vec::new(),
            merged_manifest,
            summary,
        }))
    }
}

/// Parse and run every check over one generated draft. The format checker
/// and the fragment extractor report overlapping structural defects, so
/// exact duplicates collapse to one entry.
fn validate_candidate(
    text: &str,
    evidence: &EvidenceTable,
    tree: &ManifestTree,
    order: usize,
) -> Candidate {
    let report = parse_report(text);
    let mut violations = check(&report);
    let grounding = GroundingValidator::validate(&report, evidence, tree);
    violations.extend(grounding.violations);

    let fragment = match extract_fragment(&report, order) {
        Ok(Some(fragment)) => {
            violations.extend(verify_fragment(&fragment, tree));
            Some(fragment)
        }
        Ok(None) => None,
        Err(extraction) => {
            violations.extend(extraction);
            None
        }
    };

    let mut unique: Vec<Violation> = Vec::with_capacity(violations.len());
    for violation in violations {
        if !unique.contains(&violation) {
            unique.push(violation);
        }
    }

    Candidate {
        report,
        fragment,
        warnings: grounding.warnings,
        violations: unique,
    }
}

fn collect_citations(analyses: &[RoundAnalysis]) -> Vec<usize> {
    let mut numbers: Vec<usize> = analyses
        .iter()
        .flat_map(|analysis| {
            analysis
                .report
                .claim_bullets()
                .flat_map(|bullet| bullet.citations())
        })
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

fn extend_unique(target: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

fn describe_change(entry: &DiffEntry) -> String {
    let path = &entry.path;
    match entry.op {
        DiffOp::Added => match &entry.new {
            Some(new) => format!("added `{path}`: `{new}`"),
            None => format!("added `{path}`"),
        },
        DiffOp::Removed => match &entry.old {
            Some(old) => format!("removed `{path}` (was `{old}`)"),
            None => format!("removed `{path}`"),
        },
        DiffOp::Modified => match (&entry.old, &entry.new) {
            (Some(old), Some(new)) => format!("modified `{path}`: `{old}` to `{new}`"),
            _ => format!("modified `{path}`"),
        },
    }
}

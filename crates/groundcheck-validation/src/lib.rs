//! Grounding validation
//!
//! Cross-checks a parsed report against the evidence table and the manifest
//! tree: every citation must resolve to an evidence item, every path
//! reference and the patch target must resolve to a manifest node, and every
//! security phrase in a claim must appear in the text of its cited evidence.
//! The first two produce hard [`Violation`]s; the phrase check produces
//! [`GroundingWarning`]s because natural-language matching is approximate.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use groundcheck_evidence::EvidenceTable;
use groundcheck_manifest::{ManifestPath, ManifestTree};
use groundcheck_report::{Bullet, ParsedReport};
use groundcheck_utils::error::{ManifestError, Violation};

pub mod phrases;

pub use phrases::{SECURITY_PHRASES, SecurityPhrase};

/// A claim phrase with no support in its cited evidence. Warnings ride
/// along with accepted output instead of blocking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingWarning {
    /// 1-based report line of the claim
    pub line: usize,
    /// Canonical phrase name from the table
    pub phrase: String,
    /// Citation numbers the claim carries
    pub citations: Vec<usize>,
    /// The claim text
    pub sentence: String,
}

impl fmt::Display for GroundingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cited = self
            .citations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "line {}: `{}` does not appear in cited evidence [{}]: {}",
            self.line, self.phrase, cited, self.sentence
        )
    }
}

/// Outcome of one grounding pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub warnings: Vec<GroundingWarning>,
}

impl ValidationReport {
    /// True when no hard violation was found; warnings do not count.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates citations, path references, and claim support.
pub struct GroundingValidator;

impl GroundingValidator {
    /// Run every grounding check over the report's claim bullets and the
    /// recommendation target.
    #[must_use]
    pub fn validate(
        report: &ParsedReport,
        evidence: &EvidenceTable,
        manifest: &ManifestTree,
    ) -> ValidationReport {
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        for bullet in report.claim_bullets() {
            Self::check_citations(bullet, evidence, &mut violations);
            Self::check_paths(bullet, manifest, &mut violations);
            Self::check_support(bullet, evidence, &mut warnings);
        }

        if let Some((_, target)) = &report.recommendation.target
            && let Err(err) = resolve_raw(manifest, target)
        {
            violations.push(Violation::InvalidPath {
                path: target.clone(),
                reason: err.to_string(),
            });
        }

        // Identical references in different bullets collapse to one entry
        let mut unique: Vec<Violation> = Vec::with_capacity(violations.len());
        for violation in violations {
            if !unique.contains(&violation) {
                unique.push(violation);
            }
        }

        debug!(
            violations = unique.len(),
            warnings = warnings.len(),
            "grounding validation complete"
        );
        ValidationReport {
            violations: unique,
            warnings,
        }
    }

    fn check_citations(bullet: &Bullet, evidence: &EvidenceTable, violations: &mut Vec<Violation>) {
        for number in bullet.citations() {
            if evidence.lookup(number).is_err() {
                violations.push(Violation::HallucinatedCitation {
                    number,
                    sentence: bullet.text.clone(),
                });
            }
        }
    }

    fn check_paths(bullet: &Bullet, manifest: &ManifestTree, violations: &mut Vec<Violation>) {
        for path in bullet.path_references() {
            if let Err(err) = resolve_raw(manifest, &path) {
                violations.push(Violation::InvalidPath {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    fn check_support(
        bullet: &Bullet,
        evidence: &EvidenceTable,
        warnings: &mut Vec<GroundingWarning>,
    ) {
        let citations = bullet.citations();
        let cited_texts: Vec<&str> = citations
            .iter()
            .filter_map(|number| evidence.lookup(*number).ok())
            .map(|item| item.text.as_str())
            .collect();
        // An uncited claim has nothing to check against; the format checker
        // owns citation presence
        if cited_texts.is_empty() {
            return;
        }
        for phrase in SECURITY_PHRASES.iter() {
            if phrase.mentioned_in(&bullet.text)
                && !cited_texts.iter().any(|text| phrase.mentioned_in(text))
            {
                warnings.push(GroundingWarning {
                    line: bullet.line,
                    phrase: phrase.name().to_string(),
                    citations: citations.clone(),
                    sentence: bullet.text.clone(),
                });
            }
        }
    }
}

fn resolve_raw(manifest: &ManifestTree, raw: &str) -> Result<(), ManifestError> {
    let path = ManifestPath::parse(raw)?;
    manifest.resolve(&path)?;
    Ok(())
}

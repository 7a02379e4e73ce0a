//! Structural checks against the report contract
//!
//! Every deviation becomes a [`Violation`] with the line it was found on.
//! The checker never mutates or repairs; the engine decides whether the
//! violations trigger a regeneration round.

use groundcheck_utils::error::Violation;

use crate::model::{ParsedReport, SectionKind};

/// Check a parsed report against the five-section contract.
#[must_use]
pub fn check(report: &ParsedReport) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_sections(report, &mut violations);
    check_findings(report, &mut violations);
    check_issues(report, &mut violations);
    check_references(report, &mut violations);
    check_fences(report, &mut violations);
    check_recommendation(report, &mut violations);
    violations
}

fn check_sections(report: &ParsedReport, violations: &mut Vec<Violation>) {
    let recognized: Vec<SectionKind> = report
        .sections
        .iter()
        .filter_map(|section| section.kind)
        .collect();

    for kind in SectionKind::ALL {
        let count = recognized.iter().filter(|seen| **seen == kind).count();
        if count == 0 {
            violations.push(Violation::MissingSection {
                heading: kind.title().to_string(),
            });
        } else if count > 1 {
            violations.push(Violation::DuplicateSection {
                heading: kind.title().to_string(),
            });
        }
    }

    // First occurrences must appear in contract order; report the first
    // section found out of place.
    let mut first_seen: Vec<SectionKind> = Vec::new();
    for kind in &recognized {
        if !first_seen.contains(kind) {
            first_seen.push(*kind);
        }
    }
    let expected: Vec<SectionKind> = SectionKind::ALL
        .into_iter()
        .filter(|kind| first_seen.contains(kind))
        .collect();
    for (found, wanted) in first_seen.iter().zip(&expected) {
        if found != wanted {
            violations.push(Violation::SectionOrder {
                heading: found.title().to_string(),
                position: found.position(),
            });
            break;
        }
    }
}

fn check_findings(report: &ParsedReport, violations: &mut Vec<Violation>) {
    for bullet in &report.findings {
        if bullet.leading_tag().is_none() {
            violations.push(Violation::MissingSourceTag {
                line: bullet.line,
                text: bullet.text.clone(),
            });
        }
        if bullet.citations().is_empty() {
            violations.push(Violation::MissingCitation {
                line: bullet.line,
                text: bullet.text.clone(),
            });
        }
    }
}

fn check_issues(report: &ParsedReport, violations: &mut Vec<Violation>) {
    for bullet in &report.issues {
        if bullet.citations().is_empty() {
            violations.push(Violation::MissingCitation {
                line: bullet.line,
                text: bullet.text.clone(),
            });
        }
    }
}

fn check_references(report: &ParsedReport, violations: &mut Vec<Violation>) {
    for bullet in &report.references {
        // Reference entries open with their citation number
        if !bullet.text.starts_with('[')
            || crate::model::extract_citations(&bullet.text).is_empty()
        {
            violations.push(Violation::MissingCitation {
                line: bullet.line,
                text: bullet.text.clone(),
            });
        }
    }
}

fn check_fences(report: &ParsedReport, violations: &mut Vec<Violation>) {
    let lines: Vec<&str> = report.raw.lines().collect();
    // 1-based; out-of-range counts as a blank boundary
    let blank = |line_no: usize| {
        lines
            .get(line_no.wrapping_sub(1))
            .is_none_or(|line| line.trim().is_empty())
    };

    for fence in &report.fences {
        let Some(close_line) = fence.close_line else {
            violations.push(Violation::UnclosedFence {
                line: fence.open_line,
            });
            continue;
        };

        if fence.open_line > 1 && !blank(fence.open_line - 1) {
            violations.push(Violation::FenceSpacing {
                line: fence.open_line,
                detail: "expected one blank line before the fence".to_string(),
            });
        } else if fence.open_line > 2 && blank(fence.open_line - 1) && blank(fence.open_line - 2) {
            violations.push(Violation::FenceSpacing {
                line: fence.open_line,
                detail: "more than one blank line before the fence".to_string(),
            });
        }

        if close_line < report.line_count && !blank(close_line + 1) {
            violations.push(Violation::FenceSpacing {
                line: close_line,
                detail: "expected one blank line after the fence".to_string(),
            });
        } else if close_line + 1 < report.line_count
            && blank(close_line + 1)
            && blank(close_line + 2)
        {
            violations.push(Violation::FenceSpacing {
                line: close_line,
                detail: "more than one blank line after the fence".to_string(),
            });
        }

        if fence.info == "yaml" || fence.info.is_empty() {
            check_yaml_body(fence.open_line, &fence.body, violations);
        }
    }
}

fn check_yaml_body(open_line: usize, body: &[String], violations: &mut Vec<Violation>) {
    let mut previous_indent: Option<usize> = None;
    for (offset, line) in body.iter().enumerate() {
        let line_no = open_line + 1 + offset;
        if line.trim().is_empty() {
            continue;
        }
        let leading: String = line.chars().take_while(|ch| ch.is_whitespace()).collect();
        if leading.contains('\t') {
            violations.push(Violation::TabIndentation { line: line_no });
            continue;
        }
        let indent = leading.len();
        let step_violation = match previous_indent {
            None => indent != 0,
            Some(previous) => indent % 2 != 0 || (indent > previous && indent - previous != 2),
        };
        if step_violation {
            violations.push(Violation::IndentationStep {
                line: line_no,
                width: indent,
            });
        }
        previous_indent = Some(indent);
    }
}

fn check_recommendation(report: &ParsedReport, violations: &mut Vec<Violation>) {
    if report.section(SectionKind::Recommendation).is_none() {
        // Missing section is already reported
        return;
    }
    let recommendation = &report.recommendation;
    if recommendation.no_change {
        return;
    }
    if recommendation.target.is_none() {
        violations.push(Violation::MissingTarget);
    }
    match recommendation.fence_indices.len() {
        2 => {}
        0 | 1 => violations.push(Violation::MissingPatchPair),
        n => violations.push(Violation::ExtraPatchPair { pairs: n.div_ceil(2) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_report;

    const VALID: &str = "\
## Findings
- [CIS] CIS 5.2.2: privileged container admitted (High) [1]

## Current Issues
- `spec.securityContext.privileged`=`true` grants host access [1]

## Recommendation
Target: `spec.securityContext`

```yaml
privileged: true
```

```yaml
privileged: false
```

## Additional Guidance
- Review pod security admission settings. [1]

## References
- [1] [CIS] cis-kubernetes-benchmark: CIS 5.2.2
";

    #[test]
    fn test_valid_report_has_no_violations() {
        let report = parse_report(VALID);
        let violations = check(&report);
        assert!(violations.is_empty(), "unexpected: {violations:?}");
    }

    #[test]
    fn test_missing_section_reported() {
        let text = VALID.replace("## References\n- [1] [CIS] cis-kubernetes-benchmark: CIS 5.2.2\n", "");
        let violations = check(&parse_report(&text));
        assert!(violations.iter().any(|violation| matches!(
            violation,
            Violation::MissingSection { heading } if heading == "References"
        )));
    }

    #[test]
    fn test_section_order_reported() {
        let text = "\
## Current Issues
- `a.b`=`true` is bad [1]

## Findings
- [CIS] CIS 1: x [1]

## Recommendation
No code change required.

## Additional Guidance
- None worth adding. [1]

## References
- [1] [CIS] source: CIS 1
";
        let violations = check(&parse_report(text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::SectionOrder { .. })));
    }

    #[test]
    fn test_untagged_finding_reported() {
        let text = VALID.replace("- [CIS] CIS 5.2.2", "- CIS 5.2.2");
        let violations = check(&parse_report(&text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::MissingSourceTag { line: 2, .. })));
    }

    #[test]
    fn test_uncited_issue_reported() {
        let text = VALID.replace(
            "- `spec.securityContext.privileged`=`true` grants host access [1]",
            "- `spec.securityContext.privileged`=`true` grants host access",
        );
        let violations = check(&parse_report(&text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::MissingCitation { .. })));
    }

    #[test]
    fn test_fence_spacing_violations() {
        let crowded = VALID.replace("Target: `spec.securityContext`\n\n```yaml", "Target: `spec.securityContext`\n```yaml");
        let violations = check(&parse_report(&crowded));
        assert!(violations.iter().any(|violation| matches!(
            violation,
            Violation::FenceSpacing { detail, .. } if detail.contains("before")
        )));
    }

    #[test]
    fn test_tab_indentation_reported() {
        let text = VALID.replace("```yaml\nprivileged: false\n```", "```yaml\nsecurityContext:\n\tprivileged: false\n```");
        let violations = check(&parse_report(&text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::TabIndentation { .. })));
    }

    #[test]
    fn test_odd_indentation_reported() {
        let text = VALID.replace(
            "```yaml\nprivileged: false\n```",
            "```yaml\nsecurityContext:\n   privileged: false\n```",
        );
        let violations = check(&parse_report(&text));
        assert!(violations.iter().any(|violation| {
            matches!(violation, Violation::IndentationStep { width: 3, .. })
        }));
    }

    #[test]
    fn test_wide_indent_step_reported() {
        let text = VALID.replace(
            "```yaml\nprivileged: false\n```",
            "```yaml\nsecurityContext:\n    privileged: false\n```",
        );
        let violations = check(&parse_report(&text));
        assert!(violations.iter().any(|violation| {
            matches!(violation, Violation::IndentationStep { width: 4, .. })
        }));
    }

    #[test]
    fn test_missing_target_reported() {
        let text = VALID.replace("Target: `spec.securityContext`\n\n", "");
        let violations = check(&parse_report(&text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::MissingTarget)));
    }

    #[test]
    fn test_extra_patch_pair_reported() {
        let extra = VALID.replace(
            "## Additional Guidance",
            "```yaml\na: 1\n```\n\n```yaml\na: 2\n```\n\n## Additional Guidance",
        );
        let violations = check(&parse_report(&extra));
        assert!(violations.iter().any(|violation| {
            matches!(violation, Violation::ExtraPatchPair { pairs: 2 })
        }));
    }

    #[test]
    fn test_single_fence_is_missing_pair() {
        let text = VALID.replace("```yaml\nprivileged: false\n```\n\n", "");
        let violations = check(&parse_report(&text));
        assert!(violations
            .iter()
            .any(|violation| matches!(violation, Violation::MissingPatchPair)));
    }

    #[test]
    fn test_no_change_marker_skips_patch_checks() {
        let text = "\
## Findings
- [CIS] CIS 1: informational only [1]

## Current Issues
- `metadata.name`=`web` is fine but listed for context [1]

## Recommendation
No code change required.

## Additional Guidance
- None required. [1]

## References
- [1] [CIS] source: CIS 1
";
        let violations = check(&parse_report(text));
        assert!(violations.is_empty(), "unexpected: {violations:?}");
    }
}

//! Tolerant report parsing
//!
//! Parsing never fails: whatever the generator produced is captured with
//! line positions, and the format checker decides what is a violation. This
//! keeps repair diagnostics specific ("missing heading X" rather than
//! "unparseable report").

use tracing::trace;

use crate::model::{
    Bullet, FencedBlock, NO_CHANGE_MARKER, ParsedReport, Recommendation, Section, SectionKind,
};

use std::sync::LazyLock;

use regex::Regex;

/// Optional `N.` ordinal between `##` and the section title
static ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

/// Parse generated report text into its structural parts.
#[must_use]
pub fn parse_report(text: &str) -> ParsedReport {
    let lines: Vec<&str> = text.lines().collect();
    let line_count = lines.len();

    // Pass 1: fenced blocks. Any ``` line closes an open fence.
    let mut fences: Vec<FencedBlock> = Vec::new();
    let mut open: Option<(usize, String, Vec<String>)> = None;
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if let Some(info) = trimmed.strip_prefix("```") {
            match open.take() {
                None => open = Some((idx, info.trim().to_string(), Vec::new())),
                Some((open_idx, open_info, body)) => fences.push(FencedBlock {
                    open_line: open_idx + 1,
                    close_line: Some(idx + 1),
                    info: open_info,
                    body,
                }),
            }
        } else if let Some((_, _, body)) = open.as_mut() {
            body.push((*line).to_string());
        }
    }
    if let Some((open_idx, info, body)) = open {
        fences.push(FencedBlock {
            open_line: open_idx + 1,
            close_line: None,
            info,
            body,
        });
    }

    // Lines covered by a fence, including the fence markers
    let mut fenced = vec![false; line_count];
    for fence in &fences {
        let end = fence.close_line.unwrap_or(line_count);
        for flag in fenced
            .iter_mut()
            .take(end)
            .skip(fence.open_line.saturating_sub(1))
        {
            *flag = true;
        }
    }

    // Pass 2: headings
    let mut sections: Vec<Section> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if fenced[idx] {
            continue;
        }
        if let Some(rest) = line.strip_prefix("## ") {
            let title_raw = rest.trim();
            let title = ORDINAL.replace(title_raw, "").to_string();
            sections.push(Section {
                kind: SectionKind::from_title(&title),
                line: idx + 1,
                title,
                body_start: idx + 2,
                body_end: line_count + 1,
            });
        }
    }
    for idx in 0..sections.len() {
        if idx + 1 < sections.len() {
            sections[idx].body_end = sections[idx + 1].line;
        }
    }

    // Pass 3: bullets and recommendation content per recognized section
    let mut findings = Vec::new();
    let mut issues = Vec::new();
    let mut guidance = Vec::new();
    let mut references = Vec::new();
    let mut recommendation = Recommendation::default();

    for section in &sections {
        let Some(kind) = section.kind else {
            continue;
        };
        let body_lines = collect_body(&lines, &fenced, section);
        match kind {
            SectionKind::Findings => findings.extend(bullets(&body_lines)),
            SectionKind::CurrentIssues => issues.extend(bullets(&body_lines)),
            SectionKind::AdditionalGuidance => guidance.extend(bullets(&body_lines)),
            SectionKind::References => references.extend(bullets(&body_lines)),
            SectionKind::Recommendation => {
                if recommendation.target.is_none() {
                    fill_recommendation(&mut recommendation, &body_lines, &fences, section);
                }
            }
        }
    }

    trace!(
        sections = sections.len(),
        fences = fences.len(),
        "parsed generated report"
    );

    ParsedReport {
        sections,
        findings,
        issues,
        guidance,
        references,
        recommendation,
        fences,
        line_count,
        raw: text.to_string(),
    }
}

/// Unfenced body lines of a section as (1-based line, text)
fn collect_body<'a>(
    lines: &[&'a str],
    fenced: &[bool],
    section: &Section,
) -> Vec<(usize, &'a str)> {
    let mut out = Vec::new();
    for line_no in section.body_start..section.body_end {
        let idx = line_no - 1;
        if idx >= lines.len() || fenced[idx] {
            continue;
        }
        out.push((line_no, lines[idx]));
    }
    out
}

fn bullets(body: &[(usize, &str)]) -> Vec<Bullet> {
    let mut out: Vec<Bullet> = Vec::new();
    for (line_no, line) in body {
        if let Some(rest) = line.strip_prefix("- ") {
            out.push(Bullet {
                line: *line_no,
                text: rest.trim().to_string(),
            });
        } else if line.trim().is_empty() {
            continue;
        } else if line.starts_with(' ')
            && let Some(last) = out.last_mut()
        {
            // Indented continuation of the previous item
            last.text.push(' ');
            last.text.push_str(line.trim());
        }
    }
    out
}

fn fill_recommendation(
    recommendation: &mut Recommendation,
    body: &[(usize, &str)],
    fences: &[FencedBlock],
    section: &Section,
) {
    for (line_no, line) in body {
        let trimmed = line.trim();
        if let Some(value) = trimmed.strip_prefix("Target:") {
            if recommendation.target.is_none() {
                let value = value.trim().trim_matches('`').to_string();
                recommendation.target = Some((*line_no, value));
            }
        } else if trimmed.contains(NO_CHANGE_MARKER.trim_end_matches('.'))
            || trimmed == NO_CHANGE_MARKER
        {
            recommendation.no_change = true;
        }
    }
    for (idx, fence) in fences.iter().enumerate() {
        if fence.open_line >= section.body_start && fence.open_line < section.body_end {
            recommendation.fence_indices.push(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
## 1. Findings
- [CIS] CIS 5.2.2: privileged container admitted (High) [1]
- [CIS] CIS 5.2.7: container runs as root user (High) [2]

## 2. Current Issues
- `spec.containers[web-server-container].securityContext.privileged`=`true` grants full host access [1]
- `spec.containers[web-server-container].securityContext.runAsUser`=`0` runs the workload as root [2]

## 3. Recommendation
Target: `spec.containers[web-server-container].securityContext`

```yaml
privileged: true
runAsUser: 0
```

```yaml
privileged: false
runAsUser: 1000
runAsNonRoot: true
allowPrivilegeEscalation: false
```

## 4. Additional Guidance
- Prefer dropping all capabilities and adding back only what is required. [1]

## 5. References
- [1] [CIS] cis-kubernetes-benchmark: CIS 5.2.2
- [2] [CIS] cis-kubernetes-benchmark: CIS 5.2.7
";

    #[test]
    fn test_sections_recognized_with_ordinals() {
        let report = parse_report(REPORT);
        let kinds: Vec<Option<SectionKind>> =
            report.sections.iter().map(|section| section.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some(SectionKind::Findings),
                Some(SectionKind::CurrentIssues),
                Some(SectionKind::Recommendation),
                Some(SectionKind::AdditionalGuidance),
                Some(SectionKind::References),
            ]
        );
    }

    #[test]
    fn test_bullets_collected_per_section() {
        let report = parse_report(REPORT);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.guidance.len(), 1);
        assert_eq!(report.references.len(), 2);
        assert_eq!(report.findings[0].citations(), vec![1]);
    }

    #[test]
    fn test_recommendation_target_and_pair() {
        let report = parse_report(REPORT);
        let (line, target) = report.recommendation.target.clone().unwrap();
        assert_eq!(line, 10);
        assert_eq!(target, "spec.containers[web-server-container].securityContext");
        let (before, after) = report.patch_pair().unwrap();
        assert!(before.body_text().contains("privileged: true"));
        assert!(after.body_text().contains("runAsNonRoot: true"));
    }

    #[test]
    fn test_heading_inside_fence_is_ignored() {
        let text = "## Findings\n- [CIS] item [1]\n\n```yaml\n## References\nkey: value\n```\n";
        let report = parse_report(text);
        assert_eq!(report.sections.len(), 1);
    }

    #[test]
    fn test_unclosed_fence_recorded() {
        let text = "## Recommendation\nTarget: `a.b`\n\n```yaml\nkey: value\n";
        let report = parse_report(text);
        assert_eq!(report.fences.len(), 1);
        assert!(report.fences[0].close_line.is_none());
    }

    #[test]
    fn test_no_change_marker_detected() {
        let text = "## Recommendation\nNo code change required.\n";
        let report = parse_report(text);
        assert!(report.recommendation.no_change);
        assert!(report.recommendation.fence_indices.is_empty());
    }

    #[test]
    fn test_continuation_lines_join_bullets() {
        let text = "## Findings\n- [CIS] a long finding\n  that wraps onto a second line [1]\n";
        let report = parse_report(text);
        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0].text.ends_with("second line [1]"));
    }
}

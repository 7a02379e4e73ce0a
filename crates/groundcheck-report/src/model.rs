//! Parsed report structure

use std::sync::LazyLock;

use regex::Regex;

use groundcheck_utils::types::SourceType;

/// Literal a generator uses in the recommendation section when a finding
/// needs no manifest edit
pub const NO_CHANGE_MARKER: &str = "No code change required.";

/// Citations are `[n]` or `[n, m]`; a bracket preceded by an identifier
/// character or `]` is a path index, not a citation
static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w\]])\[(\d+(?:\s*,\s*\d+)*)\]").unwrap());

/// Leading `[TAG]` on a findings bullet
static LEADING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([A-Z]+)\]").unwrap());

static BACKTICK_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Extract citation numbers from a line of analysis, in order of
/// appearance. Duplicates are preserved.
#[must_use]
pub fn extract_citations(text: &str) -> Vec<usize> {
    let mut numbers = Vec::new();
    for capture in CITATION.captures_iter(text) {
        for part in capture[1].split(',') {
            if let Ok(number) = part.trim().parse::<usize>() {
                numbers.push(number);
            }
        }
    }
    numbers
}

/// The five report sections, in contract order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Findings,
    CurrentIssues,
    Recommendation,
    AdditionalGuidance,
    References,
}

impl SectionKind {
    pub const ALL: [Self; 5] = [
        Self::Findings,
        Self::CurrentIssues,
        Self::Recommendation,
        Self::AdditionalGuidance,
        Self::References,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Findings => "Findings",
            Self::CurrentIssues => "Current Issues",
            Self::Recommendation => "Recommendation",
            Self::AdditionalGuidance => "Additional Guidance",
            Self::References => "References",
        }
    }

    /// Recognize a heading title, ignoring case
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        let normalized = title.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.title().to_ascii_lowercase() == normalized)
    }

    /// Position in the contract order, 1-based
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(0, |idx| idx + 1)
    }
}

/// One `##` heading and its body extent
#[derive(Debug, Clone)]
pub struct Section {
    /// Recognized kind, or `None` for an unknown heading
    pub kind: Option<SectionKind>,
    /// 1-based line of the heading
    pub line: usize,
    pub title: String,
    /// Body line range (1-based, exclusive end)
    pub body_start: usize,
    pub body_end: usize,
}

/// One bullet item with its source line
#[derive(Debug, Clone)]
pub struct Bullet {
    /// 1-based line the bullet starts on
    pub line: usize,
    /// Item text without the `- ` marker, continuations joined
    pub text: String,
}

impl Bullet {
    /// Citation numbers attached to this item
    #[must_use]
    pub fn citations(&self) -> Vec<usize> {
        extract_citations(&self.text)
    }

    /// The recognized `[TAG]` prefix, when present
    #[must_use]
    pub fn leading_tag(&self) -> Option<SourceType> {
        let capture = LEADING_TAG.captures(self.text.trim_start())?;
        SourceType::from_tag(&format!("[{}]", &capture[1]))
    }

    /// Backtick-quoted spans that look like manifest path references.
    /// A span qualifies when it uses path syntax with at least one `.` or
    /// bracket selector; bare words are treated as quoted values.
    #[must_use]
    pub fn path_references(&self) -> Vec<String> {
        BACKTICK_SPAN
            .captures_iter(&self.text)
            .map(|capture| capture[1].to_string())
            .filter(|span| {
                (span.contains('.') || span.contains('['))
                    && !span.contains(' ')
                    && span
                        .chars()
                        .all(|ch| ch.is_alphanumeric() || "._-[]/".contains(ch))
            })
            .collect()
    }
}

/// One fenced code block
#[derive(Debug, Clone)]
pub struct FencedBlock {
    /// 1-based line of the opening fence
    pub open_line: usize,
    /// 1-based line of the closing fence, if the block is closed
    pub close_line: Option<usize>,
    /// Info string after the opening fence, e.g. `yaml`
    pub info: String,
    /// Raw body lines
    pub body: Vec<String>,
}

impl FencedBlock {
    #[must_use]
    pub fn body_text(&self) -> String {
        let mut text = self.body.join("\n");
        text.push('\n');
        text
    }
}

/// The recommendation section's structured content
#[derive(Debug, Clone, Default)]
pub struct Recommendation {
    /// `Target:` line value with its 1-based line number
    pub target: Option<(usize, String)>,
    /// Indices into [`ParsedReport::fences`] for blocks in this section
    pub fence_indices: Vec<usize>,
    /// Section contains the no-change marker instead of a patch pair
    pub no_change: bool,
}

/// A tolerantly-parsed report; deviations surface via
/// [`check`](crate::format::check)
#[derive(Debug, Clone)]
pub struct ParsedReport {
    pub sections: Vec<Section>,
    pub findings: Vec<Bullet>,
    pub issues: Vec<Bullet>,
    pub guidance: Vec<Bullet>,
    pub references: Vec<Bullet>,
    pub recommendation: Recommendation,
    /// Every fenced block in the document, in order
    pub fences: Vec<FencedBlock>,
    /// Total line count of the source text
    pub line_count: usize,
    /// The text as received, for line-level checks and diagnostics
    pub raw: String,
}

impl ParsedReport {
    /// All analysis bullets whose citations must resolve: findings, current
    /// issues, and additional guidance.
    #[must_use]
    pub fn claim_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.findings
            .iter()
            .chain(&self.issues)
            .chain(&self.guidance)
    }

    /// First section of the given kind
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.kind == Some(kind))
    }

    /// The recommendation's before/after fence pair, when exactly one pair
    /// is present
    #[must_use]
    pub fn patch_pair(&self) -> Option<(&FencedBlock, &FencedBlock)> {
        match self.recommendation.fence_indices.as_slice() {
            [before, after] => Some((&self.fences[*before], &self.fences[*after])),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_extraction() {
        assert_eq!(extract_citations("privileged is forbidden [1]"), vec![1]);
        assert_eq!(extract_citations("see [1, 3] for details"), vec![1, 3]);
        assert_eq!(extract_citations("at start [2]. later [4]"), vec![2, 4]);
    }

    #[test]
    fn test_path_index_is_not_a_citation() {
        assert_eq!(extract_citations("`containers[0]` is ambiguous"), Vec::<usize>::new());
        assert_eq!(extract_citations("matrix[0][1] style"), Vec::<usize>::new());
    }

    #[test]
    fn test_citation_after_path_still_found() {
        let text = "`spec.containers[web-server-container].securityContext.privileged`=true is risky [2]";
        assert_eq!(extract_citations(text), vec![2]);
    }

    #[test]
    fn test_leading_tag_recognition() {
        let bullet = Bullet {
            line: 3,
            text: "[CIS] CIS 5.2.2: privileged containers (High) [1]".to_string(),
        };
        assert_eq!(bullet.leading_tag(), Some(SourceType::Cis));

        let untagged = Bullet {
            line: 4,
            text: "CIS 5.2.2: privileged containers [1]".to_string(),
        };
        assert_eq!(untagged.leading_tag(), None);
    }

    #[test]
    fn test_unrecognized_tag_is_none() {
        let bullet = Bullet {
            line: 1,
            text: "[BOGUS] something [1]".to_string(),
        };
        assert_eq!(bullet.leading_tag(), None);
    }

    #[test]
    fn test_path_reference_filtering() {
        let bullet = Bullet {
            line: 1,
            text: "`spec.containers[web].securityContext.privileged`=`true` is set [1]".to_string(),
        };
        assert_eq!(
            bullet.path_references(),
            vec!["spec.containers[web].securityContext.privileged".to_string()]
        );
    }

    #[test]
    fn test_section_title_round_trip() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_title(kind.title()), Some(kind));
        }
        assert_eq!(SectionKind::from_title("current issues"), Some(SectionKind::CurrentIssues));
        assert_eq!(SectionKind::from_title("Summary"), None);
    }
}

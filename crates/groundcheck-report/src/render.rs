//! Final report assembly
//!
//! The engine collects accepted per-finding analyses and the merged patch,
//! then renders one five-section document through [`FinalReport`]. The
//! renderer owns the layout (headings, fence spacing, fallbacks) so the
//! assembled text satisfies [`crate::check`] by construction.

use crate::model::NO_CHANGE_MARKER;

/// Assembled content for the final five-section report.
///
/// Bullet lists carry item text without the leading `- `. `conflicts`,
/// `changes`, and `references` are pre-formatted lines; the renderer only
/// adds the bullet prefix.
#[derive(Debug, Clone, Default)]
pub struct FinalReport {
    pub findings: Vec<String>,
    pub issues: Vec<String>,
    /// Path of the unified patch target. `None` means no code change.
    pub target: Option<String>,
    /// Rendered subtree before the patch, as YAML text.
    pub before: Option<String>,
    /// Rendered subtree after the patch, as YAML text.
    pub after: Option<String>,
    pub conflicts: Vec<String>,
    pub changes: Vec<String>,
    pub guidance: Vec<String>,
    pub references: Vec<String>,
}

impl FinalReport {
    /// Report for a run that surfaced nothing to fix.
    #[must_use]
    pub fn no_violations() -> Self {
        Self::default()
    }

    /// Render the report as contract-conforming Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("## Findings\n");
        push_bullets(
            &mut out,
            &self.findings,
            "No security violations were identified in the supplied manifest.",
        );
        out.push('\n');

        out.push_str("## Current Issues\n");
        push_bullets(&mut out, &self.issues, "None.");
        out.push('\n');

        out.push_str("## Recommendation\n");
        if let (Some(target), Some(before), Some(after)) =
            (&self.target, &self.before, &self.after)
        {
            out.push_str("Target: `");
            out.push_str(target);
            out.push_str("`\n\n");
            push_fence(&mut out, before);
            out.push('\n');
            push_fence(&mut out, after);
            if !self.conflicts.is_empty() {
                out.push_str("\nConflicts recorded:\n");
                push_plain_bullets(&mut out, &self.conflicts);
            }
            if !self.changes.is_empty() {
                out.push_str("\nChanges:\n");
                push_plain_bullets(&mut out, &self.changes);
            }
        } else {
            out.push_str(NO_CHANGE_MARKER);
            out.push('\n');
        }
        out.push('\n');

        out.push_str("## Additional Guidance\n");
        push_bullets(&mut out, &self.guidance, "None.");
        out.push('\n');

        out.push_str("## References\n");
        push_bullets(&mut out, &self.references, "None.");

        out
    }
}

/// Bullet list body, or a plain fallback sentence when the list is empty.
/// The fallback is deliberately not a bullet so empty sections do not trip
/// the per-item checks.
fn push_bullets(out: &mut String, items: &[String], fallback: &str) {
    if items.is_empty() {
        out.push_str(fallback);
        out.push('\n');
        return;
    }
    push_plain_bullets(out, items);
}

fn push_plain_bullets(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
}

fn push_fence(out: &mut String, body: &str) {
    out.push_str("```yaml\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
}

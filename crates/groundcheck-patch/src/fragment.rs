//! Fragment extraction and before-verification
//!
//! An analysis proposes one edit: replace the subtree at the `Target:` path
//! with the second fenced block. Before any fragment is merged, its "before"
//! block must match the manifest subtree it claims to replace, so the model
//! can never edit state that was not actually present.

use groundcheck_manifest::{ManifestPath, ManifestTree, Node};
use groundcheck_report::ParsedReport;
use groundcheck_utils::canonicalization::canonical_yaml;
use groundcheck_utils::error::Violation;

/// One proposed edit: replace the subtree at `path` with `after`.
#[derive(Debug, Clone)]
pub struct PatchFragment {
    pub path: ManifestPath,
    /// The subtree the analysis claims is currently present
    pub before: String,
    /// The proposed replacement subtree
    pub after: String,
    /// Citation-order rank of the analysis that proposed the edit; the
    /// later fragment wins when targets overlap
    pub order: usize,
}

/// Pull the before/after pair out of an analysis.
///
/// Returns `Ok(None)` for a no-change analysis. Structural problems surface
/// as the same violations the format checker reports, so direct callers of
/// the merger get identical diagnostics.
pub fn extract_fragment(
    report: &ParsedReport,
    order: usize,
) -> Result<Option<PatchFragment>, Vec<Violation>> {
    if report.recommendation.no_change {
        return Ok(None);
    }
    let mut violations = Vec::new();

    let path = match &report.recommendation.target {
        None => {
            violations.push(Violation::MissingTarget);
            None
        }
        Some((_, raw)) => match ManifestPath::parse(raw) {
            Ok(path) => Some(path),
            Err(err) => {
                violations.push(Violation::InvalidPath {
                    path: raw.clone(),
                    reason: err.to_string(),
                });
                None
            }
        },
    };

    let pair = match report.recommendation.fence_indices.len() {
        2 => report.patch_pair(),
        0 | 1 => {
            violations.push(Violation::MissingPatchPair);
            None
        }
        n => {
            violations.push(Violation::ExtraPatchPair {
                pairs: n.div_ceil(2),
            });
            None
        }
    };

    match (path, pair) {
        (Some(path), Some((before, after))) if violations.is_empty() => Ok(Some(PatchFragment {
            path,
            before: before.body_text(),
            after: after.body_text(),
            order,
        })),
        _ => Err(violations),
    }
}

/// Verify a fragment against the manifest it will be applied to.
///
/// The before block must equal the rendered subtree at the fragment's path
/// up to whitespace-insignificant formatting, and both blocks must be
/// parseable YAML so the merge itself cannot fail later.
#[must_use]
pub fn verify_fragment(fragment: &PatchFragment, tree: &ManifestTree) -> Vec<Violation> {
    let path = fragment.path.raw().to_string();

    let node = match tree.resolve(&fragment.path) {
        Ok(node) => node,
        Err(err) => {
            return vec![Violation::InvalidPath {
                path,
                reason: err.to_string(),
            }];
        }
    };

    let mut violations = Vec::new();

    let current = tree.render_node(node);
    match canonical_yaml(&fragment.before) {
        Ok(snippet) => {
            // The rendered subtree came out of the parsed tree, so it
            // canonicalizes unless the fragment targets something the
            // comparison cannot represent
            match canonical_yaml(&current) {
                Ok(rendered) if snippet == rendered => {}
                Ok(_) => violations.push(Violation::StaleContext {
                    path: path.clone(),
                    detail: "the before block differs from the current subtree".to_string(),
                }),
                Err(err) => violations.push(Violation::StaleContext {
                    path: path.clone(),
                    detail: format!("current subtree could not be canonicalized: {err}"),
                }),
            }
        }
        Err(err) => violations.push(Violation::InvalidSnippet {
            path: path.clone(),
            reason: err.to_string(),
        }),
    }

    match serde_yaml::from_str::<serde_yaml::Value>(&fragment.after) {
        Ok(value) => {
            if let Err(reason) = Node::from_yaml_value(&value) {
                violations.push(Violation::InvalidSnippet { path, reason });
            }
        }
        Err(err) => violations.push(Violation::InvalidSnippet {
            path,
            reason: err.to_string(),
        }),
    }

    violations
}

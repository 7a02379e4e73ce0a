//! Deterministic fragment merge
//!
//! Verified fragments from all accepted analyses are combined onto one
//! cloned tree. Overlapping targets never race: the fragment with the later
//! citation order wins and the superseded one is recorded as a conflict.
//! Application order is shallow-to-deep so a parent replacement can never
//! orphan a deeper edit.

use serde::Serialize;
use tracing::info;

use groundcheck_manifest::{
    DiffEntry, ManifestPath, ManifestTree, Node, PathSegment, structural_diff,
};
use groundcheck_utils::error::PatchError;

use crate::fragment::PatchFragment;

/// An earlier edit superseded by a later overlapping one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// Target of the edit that lost
    pub path: String,
    /// Target of the edit that won
    pub superseded_by: String,
    /// Order rank of the losing fragment
    pub order: usize,
    /// Order rank of the winning fragment
    pub winner_order: usize,
}

/// Every accepted fragment merged onto one tree.
#[derive(Debug, Clone)]
pub struct MergedPatch {
    /// Lowest common ancestor of the applied fragment targets
    pub root: ManifestPath,
    /// Rendered original subtree at `root`
    pub before_subtree: String,
    /// Rendered merged subtree at `root`
    pub after_subtree: String,
    /// Full manifest text after the merge
    pub after_text: String,
    /// Structural diff between the original and merged trees
    pub diff: Vec<DiffEntry>,
    /// Superseded fragments, ordered by losing rank
    pub conflicts: Vec<Conflict>,
}

/// Merge fragments onto a clone of `tree`.
///
/// Fragments are expected to have passed
/// [`verify_fragment`](crate::fragment::verify_fragment); merge failures on
/// verified input are hard errors, not repairable violations. The result is
/// independent of the slice order of `fragments`: supersession and
/// application order depend only on each fragment's rank and path.
pub fn merge(fragments: &[PatchFragment], tree: &ManifestTree) -> Result<MergedPatch, PatchError> {
    let mut conflicts = Vec::new();
    let mut winners: Vec<&PatchFragment> = Vec::new();
    for fragment in fragments {
        let winner = fragments
            .iter()
            .filter(|other| {
                other.order > fragment.order && other.path.overlaps(&fragment.path)
            })
            .max_by_key(|other| other.order);
        match winner {
            Some(winner) => conflicts.push(Conflict {
                path: fragment.path.raw().to_string(),
                superseded_by: winner.path.raw().to_string(),
                order: fragment.order,
                winner_order: winner.order,
            }),
            None => winners.push(fragment),
        }
    }
    conflicts.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.path.cmp(&b.path)));
    winners.sort_by(|a, b| {
        a.path
            .depth()
            .cmp(&b.path.depth())
            .then_with(|| a.order.cmp(&b.order))
    });

    let mut merged = tree.clone();
    for fragment in &winners {
        let path = fragment.path.raw().to_string();
        let value: serde_yaml::Value =
            serde_yaml::from_str(&fragment.after).map_err(|err| PatchError::Snippet {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        let node = Node::from_yaml_value(&value).map_err(|reason| PatchError::Snippet {
            path: path.clone(),
            reason,
        })?;
        merged
            .replace(&fragment.path, node)
            .map_err(|err| PatchError::Apply {
                path,
                reason: err.to_string(),
            })?;
    }

    let root = common_ancestor(&winners);
    let before_subtree = render_at(tree, &root)?;
    let after_subtree = render_at(&merged, &root)?;
    let after_text = merged.render();
    let diff = structural_diff(tree.root(), merged.root(), "");

    info!(
        fragments = fragments.len(),
        applied = winners.len(),
        conflicts = conflicts.len(),
        changes = diff.len(),
        root = %root,
        "fragments merged"
    );

    Ok(MergedPatch {
        root,
        before_subtree,
        after_subtree,
        after_text,
        diff,
        conflicts,
    })
}

/// Longest shared segment prefix; empty input or no shared prefix address
/// the document root.
fn common_ancestor(fragments: &[&PatchFragment]) -> ManifestPath {
    let mut iter = fragments.iter();
    let Some(first) = iter.next() else {
        return ManifestPath::from_segments(Vec::new());
    };
    let mut prefix: Vec<PathSegment> = first.path.segments().to_vec();
    for fragment in iter {
        let shared = prefix
            .iter()
            .zip(fragment.path.segments())
            .take_while(|(ours, theirs)| ours == theirs)
            .count();
        prefix.truncate(shared);
    }
    ManifestPath::from_segments(prefix)
}

fn render_at(tree: &ManifestTree, path: &ManifestPath) -> Result<String, PatchError> {
    if path.segments().is_empty() {
        return Ok(tree.render());
    }
    let node = tree.resolve(path).map_err(|err| PatchError::Apply {
        path: path.raw().to_string(),
        reason: err.to_string(),
    })?;
    Ok(tree.render_node(node))
}

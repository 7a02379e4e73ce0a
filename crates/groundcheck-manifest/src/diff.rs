//! Structural diff between two manifest subtrees
//!
//! Mappings are aligned by key, sequences of named elements by their `name`
//! field, and plain sequences by position. The result is a flat list of
//! per-path changes in document order, suitable for run summaries.

use serde::Serialize;

use crate::path::{join_key, join_select};
use crate::tree::{Node, NodeContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOp {
    Added,
    Removed,
    Modified,
}

/// One changed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub op: DiffOp,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

/// Diff two subtrees rooted at `base_path`.
#[must_use]
pub fn structural_diff(before: &Node, after: &Node, base_path: &str) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    walk(before, after, base_path, &mut out);
    out
}

fn walk(before: &Node, after: &Node, path: &str, out: &mut Vec<DiffEntry>) {
    match (&before.content, &after.content) {
        (NodeContent::Mapping { entries: a, .. }, NodeContent::Mapping { entries: b, .. }) => {
            for entry in a {
                let child_path = join_key(path, &entry.key);
                match b.iter().find(|other| other.key == entry.key) {
                    Some(other) => walk(&entry.value, &other.value, &child_path, out),
                    None => out.push(DiffEntry {
                        op: DiffOp::Removed,
                        path: child_path,
                        old: Some(summary(&entry.value)),
                        new: None,
                    }),
                }
            }
            for other in b {
                if !a.iter().any(|entry| entry.key == other.key) {
                    out.push(DiffEntry {
                        op: DiffOp::Added,
                        path: join_key(path, &other.key),
                        old: None,
                        new: Some(summary(&other.value)),
                    });
                }
            }
        }
        (NodeContent::Sequence(a), NodeContent::Sequence(b)) => {
            let a_names: Vec<Option<String>> = a.iter().map(|item| item.node.name_field()).collect();
            let b_names: Vec<Option<String>> = b.iter().map(|item| item.node.name_field()).collect();
            let fully_named = !a.is_empty()
                && a_names.iter().all(Option::is_some)
                && b_names.iter().all(Option::is_some);
            if fully_named {
                for (item, name) in a.iter().zip(&a_names) {
                    let name = name.as_deref().unwrap_or_default();
                    let child_path = join_select(path, name);
                    match b_names.iter().position(|other| other.as_deref() == Some(name)) {
                        Some(idx) => walk(&item.node, &b[idx].node, &child_path, out),
                        None => out.push(DiffEntry {
                            op: DiffOp::Removed,
                            path: child_path,
                            old: Some(summary(&item.node)),
                            new: None,
                        }),
                    }
                }
                for (item, name) in b.iter().zip(&b_names) {
                    let name = name.as_deref().unwrap_or_default();
                    if !a_names.iter().any(|other| other.as_deref() == Some(name)) {
                        out.push(DiffEntry {
                            op: DiffOp::Added,
                            path: join_select(path, name),
                            old: None,
                            new: Some(summary(&item.node)),
                        });
                    }
                }
            } else {
                let shared = a.len().min(b.len());
                for index in 0..shared {
                    let child_path = join_select(path, &index.to_string());
                    walk(&a[index].node, &b[index].node, &child_path, out);
                }
                for (index, item) in a.iter().enumerate().skip(shared) {
                    out.push(DiffEntry {
                        op: DiffOp::Removed,
                        path: join_select(path, &index.to_string()),
                        old: Some(summary(&item.node)),
                        new: None,
                    });
                }
                for (index, item) in b.iter().enumerate().skip(shared) {
                    out.push(DiffEntry {
                        op: DiffOp::Added,
                        path: join_select(path, &index.to_string()),
                        old: None,
                        new: Some(summary(&item.node)),
                    });
                }
            }
        }
        (NodeContent::Scalar(a), NodeContent::Scalar(b)) => {
            if a.value_text() != b.value_text() {
                out.push(DiffEntry {
                    op: DiffOp::Modified,
                    path: path.to_string(),
                    old: Some(a.text.clone()),
                    new: Some(b.text.clone()),
                });
            }
        }
        _ => {
            out.push(DiffEntry {
                op: DiffOp::Modified,
                path: path.to_string(),
                old: Some(summary(before)),
                new: Some(summary(after)),
            });
        }
    }
}

fn summary(node: &Node) -> String {
    match &node.content {
        NodeContent::Scalar(scalar) => scalar.text.clone(),
        NodeContent::Mapping { entries, .. } => format!("mapping({} keys)", entries.len()),
        NodeContent::Sequence(items) => format!("sequence({} items)", items.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn diff_docs(before: &str, after: &str) -> Vec<DiffEntry> {
        let a = parse(before).unwrap();
        let b = parse(after).unwrap();
        structural_diff(a.root(), b.root(), "")
    }

    #[test]
    fn test_scalar_modification() {
        let entries = diff_docs("privileged: true\n", "privileged: false\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, DiffOp::Modified);
        assert_eq!(entries[0].path, "privileged");
        assert_eq!(entries[0].old.as_deref(), Some("true"));
        assert_eq!(entries[0].new.as_deref(), Some("false"));
    }

    #[test]
    fn test_added_and_removed_keys() {
        let entries = diff_docs(
            "privileged: true\nhostPID: true\n",
            "privileged: true\nrunAsNonRoot: true\n",
        );
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|entry| {
            entry.op == DiffOp::Removed && entry.path == "hostPID"
        }));
        assert!(entries.iter().any(|entry| {
            entry.op == DiffOp::Added && entry.path == "runAsNonRoot"
        }));
    }

    #[test]
    fn test_named_sequence_aligns_by_name() {
        let before = "\
containers:
  - name: web
    image: nginx:1.24
  - name: sidecar
    image: envoy:1.30
";
        let after = "\
containers:
  - name: sidecar
    image: envoy:1.30
  - name: web
    image: nginx:1.25
";
        let entries = diff_docs(before, after);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "containers[web].image");
        assert_eq!(entries[0].op, DiffOp::Modified);
    }

    #[test]
    fn test_unnamed_sequence_aligns_by_position() {
        let entries = diff_docs("args:\n  - a\n  - b\n", "args:\n  - a\n  - c\n  - d\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "args[1]");
        assert_eq!(entries[0].op, DiffOp::Modified);
        assert_eq!(entries[1].path, "args[2]");
        assert_eq!(entries[1].op, DiffOp::Added);
    }

    #[test]
    fn test_kind_change_is_modification() {
        let entries = diff_docs("value: scalar\n", "value:\n  nested: true\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, DiffOp::Modified);
        assert_eq!(entries[0].new.as_deref(), Some("mapping(1 keys)"));
    }

    #[test]
    fn test_identical_trees_produce_no_entries() {
        let doc = "spec:\n  replicas: 2\n";
        assert!(diff_docs(doc, doc).is_empty());
    }

    #[test]
    fn test_nested_path_reporting() {
        let before = "spec:\n  template:\n    spec:\n      hostNetwork: true\n";
        let after = "spec:\n  template:\n    spec:\n      hostNetwork: false\n";
        let entries = diff_docs(before, after);
        assert_eq!(entries[0].path, "spec.template.spec.hostNetwork");
    }
}

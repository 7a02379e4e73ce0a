//! The manifest tree and its rendering rules
//!
//! Nodes parsed from source carry the line span they occupy; rendering an
//! untouched node copies those lines verbatim. Replacing a subtree marks it
//! synthetic, and only synthetic regions are re-emitted canonically with
//! two-space indentation. The tree as a whole therefore renders with the
//! smallest possible textual difference from the input.

use groundcheck_utils::error::ManifestError;

use crate::path::{ManifestPath, PathSegment};

/// Half-open line range into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub(crate) const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) const fn empty() -> Self {
        Self { start: 0, end: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    Source,
    Synthetic,
}

/// Scalar leaf: the comment-stripped value text as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    /// Value text; for block scalars this is the `|`/`>` header
    pub text: String,
    /// True when the scalar is a `|` or `>` block with an indented body
    pub(crate) block: bool,
}

impl Scalar {
    /// Decoded value for comparisons and name lookup: quotes removed,
    /// double-quote escapes resolved.
    #[must_use]
    pub fn value_text(&self) -> String {
        let text = self.text.trim();
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            let inner = &text[1..text.len() - 1];
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(ch) = chars.next() {
                if ch == '\\' {
                    match chars.next() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some(other) => out.push(other),
                        None => out.push('\\'),
                    }
                } else {
                    out.push(ch);
                }
            }
            out
        } else if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
            text[1..text.len() - 1].replace("''", "'")
        } else {
            text.to_string()
        }
    }
}

/// One mapping entry; key order is document order
#[derive(Debug, Clone)]
pub struct MapEntry {
    /// Decoded key name
    pub key: String,
    /// Key as written, including quotes
    pub(crate) key_raw: String,
    /// Entry extent including preceding comment lines
    pub(crate) span_start: usize,
    pub(crate) span_end: usize,
    pub value: Node,
}

/// One sequence item
#[derive(Debug, Clone)]
pub struct SeqItem {
    pub(crate) span_start: usize,
    pub(crate) span_end: usize,
    pub(crate) dash_line: usize,
    pub node: Node,
}

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeContent {
    Mapping {
        entries: Vec<MapEntry>,
        /// First entry shares the physical line with a sequence dash
        inline_start: bool,
    },
    Sequence(Vec<SeqItem>),
    Scalar(Scalar),
}

/// A tree node with its byte-layout bookkeeping
#[derive(Debug, Clone)]
pub struct Node {
    pub content: NodeContent,
    pub(crate) origin: Origin,
    pub(crate) span: Span,
    pub(crate) start_col: usize,
    pub(crate) indent: usize,
}

impl Node {
    pub(crate) fn source(content: NodeContent, span: Span, start_col: usize, indent: usize) -> Self {
        Self {
            content,
            origin: Origin::Source,
            span,
            start_col,
            indent,
        }
    }

    fn synthetic(content: NodeContent) -> Self {
        Self {
            content,
            origin: Origin::Synthetic,
            span: Span::empty(),
            start_col: 0,
            indent: 0,
        }
    }

    /// First line covered by rendering this node entry by entry. Entry and
    /// item spans carry their leading filler, so in-place rendering of a
    /// container begins at its first child's span rather than at the
    /// container's own first content line.
    pub(crate) fn coverage_start(&self) -> usize {
        match &self.content {
            NodeContent::Mapping { entries, .. } if !entries.is_empty() => entries[0].span_start,
            NodeContent::Sequence(items) if !items.is_empty() => items[0].span_start,
            _ => self.span.start,
        }
    }

    /// True when this subtree contains no synthetic node
    #[must_use]
    pub fn is_clean(&self) -> bool {
        if self.origin == Origin::Synthetic {
            return false;
        }
        match &self.content {
            NodeContent::Mapping { entries, .. } => {
                entries.iter().all(|entry| entry.value.is_clean())
            }
            NodeContent::Sequence(items) => items.iter().all(|item| item.node.is_clean()),
            NodeContent::Scalar(_) => true,
        }
    }

    /// Scalar view of this node, when it is one
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.content {
            NodeContent::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Mapping entries, when this node is a mapping
    #[must_use]
    pub fn entries(&self) -> Option<&[MapEntry]> {
        match &self.content {
            NodeContent::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Sequence items, when this node is a sequence
    #[must_use]
    pub fn items(&self) -> Option<&[SeqItem]> {
        match &self.content {
            NodeContent::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The `name` field text of a mapping element, when present
    #[must_use]
    pub fn name_field(&self) -> Option<String> {
        let entries = self.entries()?;
        entries
            .iter()
            .find(|entry| entry.key == "name")
            .and_then(|entry| entry.value.as_scalar())
            .map(Scalar::value_text)
    }

    /// Build a synthetic node from parsed YAML.
    ///
    /// Used for "after" snippets: the snippet is parsed leniently and
    /// re-emitted canonically when the tree renders.
    pub fn from_yaml_value(value: &serde_yaml::Value) -> Result<Self, String> {
        match value {
            serde_yaml::Value::Null => Ok(Self::synthetic(NodeContent::Scalar(Scalar {
                text: "null".to_string(),
                block: false,
            }))),
            serde_yaml::Value::Bool(b) => Ok(Self::synthetic(NodeContent::Scalar(Scalar {
                text: b.to_string(),
                block: false,
            }))),
            serde_yaml::Value::Number(n) => Ok(Self::synthetic(NodeContent::Scalar(Scalar {
                text: n.to_string(),
                block: false,
            }))),
            serde_yaml::Value::String(s) => Ok(Self::synthetic(NodeContent::Scalar(Scalar {
                text: scalar_literal(s),
                block: false,
            }))),
            serde_yaml::Value::Sequence(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(SeqItem {
                        span_start: 0,
                        span_end: 0,
                        dash_line: 0,
                        node: Self::from_yaml_value(value)?,
                    });
                }
                Ok(Self::synthetic(NodeContent::Sequence(items)))
            }
            serde_yaml::Value::Mapping(mapping) => {
                let mut entries = Vec::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = match key {
                        serde_yaml::Value::String(s) => s.clone(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        _ => return Err("unsupported mapping key type".to_string()),
                    };
                    entries.push(MapEntry {
                        key_raw: quote_key(&key),
                        key,
                        span_start: 0,
                        span_end: 0,
                        value: Self::from_yaml_value(value)?,
                    });
                }
                Ok(Self::synthetic(NodeContent::Mapping {
                    entries,
                    inline_start: false,
                }))
            }
            serde_yaml::Value::Tagged(_) => Err("tagged values are not supported".to_string()),
        }
    }
}

/// Parsed manifest with its source layout
#[derive(Debug, Clone)]
pub struct ManifestTree {
    pub(crate) lines: Vec<String>,
    pub(crate) final_newline: bool,
    pub(crate) preamble: Span,
    pub(crate) trailing: Span,
    pub(crate) root: Node,
}

impl ManifestTree {
    /// Root node of the document
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Resolve a path to the node it addresses.
    ///
    /// Mapping keys must match exactly. Bracket selectors over sequences
    /// whose elements carry a `name` field match that name; a numeric
    /// selector over such a sequence is refused (`Ambiguous` when more than
    /// one element exists, `NotFound` otherwise). Sequences without named
    /// elements accept numeric selectors.
    pub fn resolve(&self, path: &ManifestPath) -> Result<&Node, ManifestError> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = step(current, segment, path)?;
        }
        Ok(current)
    }

    /// Replace the subtree at `path` with a synthetic node.
    ///
    /// The original layout of everything outside the replaced subtree is
    /// preserved on render.
    pub fn replace(&mut self, path: &ManifestPath, replacement: Node) -> Result<(), ManifestError> {
        let target = resolve_mut(&mut self.root, path)?;
        let mut replacement = replacement;
        replacement.indent = target.indent;
        replacement.start_col = target.start_col;
        *target = replacement;
        Ok(())
    }

    /// Render the whole document.
    ///
    /// A tree produced purely by parsing renders byte-identically to its
    /// input. Replaced subtrees are emitted canonically in place.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out: Vec<String> = Vec::new();
        out.extend_from_slice(&self.lines[self.preamble.start..self.preamble.end]);
        self.render_in_place(&self.root, self.root.indent, &mut out);
        out.extend_from_slice(&self.lines[self.trailing.start..self.trailing.end]);
        let mut text = out.join("\n");
        if self.final_newline {
            text.push('\n');
        }
        text
    }

    /// Render one subtree, dedented to column zero.
    ///
    /// This is the text a report's "before" snippet is checked against.
    #[must_use]
    pub fn render_node(&self, node: &Node) -> String {
        let mut rendered = if node.is_clean() {
            match &node.content {
                NodeContent::Scalar(scalar) if !scalar.block => scalar.text.clone(),
                _ => self.slice_dedented(node),
            }
        } else {
            let mut out = Vec::new();
            self.render_canonical(node, 0, &mut out);
            out.join("\n")
        };
        while rendered.ends_with('\n') {
            rendered.pop();
        }
        rendered.push('\n');
        rendered
    }

    fn slice_dedented(&self, node: &Node) -> String {
        let mut out = Vec::new();
        // The first span line is always content, so a hard cut at the start
        // column is safe; interior lines (which may be comments at any
        // column) only lose leading spaces.
        let first = &self.lines[node.span.start];
        out.push(slice_at(first, node.start_col).to_string());
        for line in &self.lines[node.span.start + 1..node.span.end] {
            out.push(dedent(line, node.indent).to_string());
        }
        out.join("\n")
    }

    /// Render a node that sits at its original document position
    fn render_in_place(&self, node: &Node, indent: usize, out: &mut Vec<String>) {
        if node.is_clean() {
            out.extend_from_slice(&self.lines[node.span.start..node.span.end]);
            return;
        }
        match &node.content {
            NodeContent::Mapping { entries, .. } => {
                for entry in entries {
                    self.render_entry(entry, indent, out);
                }
            }
            NodeContent::Sequence(items) => {
                for item in items {
                    self.render_item(item, indent, out);
                }
            }
            NodeContent::Scalar(_) => {
                self.render_canonical(node, indent, out);
            }
        }
    }

    fn render_entry(&self, entry: &MapEntry, indent: usize, out: &mut Vec<String>) {
        let value = &entry.value;
        if value.origin == Origin::Source && value.is_clean() {
            out.extend_from_slice(&self.lines[entry.span_start..entry.span_end]);
        } else if value.origin == Origin::Source {
            // Dirty below: keep the key line and any leading comments, then
            // descend. Source values that start on the key line are scalars
            // and scalars cannot be dirty, so the value block starts below.
            out.extend_from_slice(&self.lines[entry.span_start..value.coverage_start()]);
            self.render_in_place(value, value.indent, out);
        } else {
            self.emit_entry(&entry.key_raw, value, indent, out);
        }
    }

    fn render_item(&self, item: &SeqItem, indent: usize, out: &mut Vec<String>) {
        let node = &item.node;
        if node.origin == Origin::Source && node.is_clean() {
            out.extend_from_slice(&self.lines[item.span_start..item.span_end]);
        } else if node.origin == Origin::Source && node.span.start > item.dash_line {
            // `-` on its own line with the value block below it
            out.extend_from_slice(&self.lines[item.span_start..node.coverage_start()]);
            self.render_in_place(node, node.indent, out);
        } else {
            // Items that share the dash line are re-emitted whole
            self.emit_item(node, indent, out);
        }
    }

    /// Canonical emission: two-space steps, no comments
    fn render_canonical(&self, node: &Node, indent: usize, out: &mut Vec<String>) {
        match &node.content {
            NodeContent::Scalar(scalar) => {
                if node.is_clean() && scalar.block {
                    for line in self.slice_dedented(node).lines() {
                        out.push(format!("{}{}", pad(indent), line));
                    }
                } else {
                    for line in scalar.text.lines() {
                        out.push(format!("{}{}", pad(indent), line));
                    }
                }
            }
            NodeContent::Mapping { entries, .. } => {
                for entry in entries {
                    self.emit_entry(&entry.key_raw, &entry.value, indent, out);
                }
            }
            NodeContent::Sequence(items) => {
                for item in items {
                    self.emit_item(&item.node, indent, out);
                }
            }
        }
    }

    fn emit_entry(&self, key_raw: &str, value: &Node, indent: usize, out: &mut Vec<String>) {
        match &value.content {
            NodeContent::Scalar(scalar) => {
                if value.is_clean() && scalar.block {
                    let body = self.slice_dedented(value);
                    let mut lines = body.lines();
                    let header = lines.next().unwrap_or("|");
                    out.push(format!("{}{}: {}", pad(indent), key_raw, header));
                    for line in lines {
                        out.push(format!("{}{}", pad(indent), line));
                    }
                } else if scalar.text.contains('\n') {
                    let header = if scalar.text.ends_with('\n') { "|" } else { "|-" };
                    out.push(format!("{}{}: {}", pad(indent), key_raw, header));
                    for line in scalar.text.lines() {
                        out.push(format!("{}{}", pad(indent + 2), line));
                    }
                } else if scalar.text.is_empty() {
                    out.push(format!("{}{}:", pad(indent), key_raw));
                } else {
                    out.push(format!("{}{}: {}", pad(indent), key_raw, scalar.text));
                }
            }
            NodeContent::Mapping { entries, .. } => {
                if entries.is_empty() {
                    out.push(format!("{}{}: {{}}", pad(indent), key_raw));
                } else {
                    out.push(format!("{}{}:", pad(indent), key_raw));
                    self.render_canonical(value, indent + 2, out);
                }
            }
            NodeContent::Sequence(items) => {
                if items.is_empty() {
                    out.push(format!("{}{}: []", pad(indent), key_raw));
                } else {
                    out.push(format!("{}{}:", pad(indent), key_raw));
                    self.render_canonical(value, indent + 2, out);
                }
            }
        }
    }

    fn emit_item(&self, node: &Node, indent: usize, out: &mut Vec<String>) {
        match &node.content {
            NodeContent::Scalar(scalar) => {
                if !scalar.block && scalar.text.contains('\n') {
                    let header = if scalar.text.ends_with('\n') { "|" } else { "|-" };
                    out.push(format!("{}- {}", pad(indent), header));
                    for line in scalar.text.lines() {
                        out.push(format!("{}{}", pad(indent + 2), line));
                    }
                    return;
                }
                let mut scalar_lines = Vec::new();
                self.render_canonical(node, 0, &mut scalar_lines);
                let mut lines = scalar_lines.into_iter();
                if let Some(first) = lines.next() {
                    out.push(format!("{}- {}", pad(indent), first));
                }
                for line in lines {
                    out.push(format!("{}{}", pad(indent + 2), line));
                }
            }
            NodeContent::Mapping { entries, .. } => {
                if entries.is_empty() {
                    out.push(format!("{}- {{}}", pad(indent)));
                    return;
                }
                let mut entry_lines = Vec::new();
                for entry in entries {
                    self.emit_entry(&entry.key_raw, &entry.value, 0, &mut entry_lines);
                }
                let mut lines = entry_lines.into_iter();
                if let Some(first) = lines.next() {
                    out.push(format!("{}- {}", pad(indent), first));
                }
                for line in lines {
                    out.push(format!("{}{}", pad(indent + 2), line));
                }
            }
            NodeContent::Sequence(items) => {
                if items.is_empty() {
                    out.push(format!("{}- []", pad(indent)));
                    return;
                }
                out.push(format!("{}-", pad(indent)));
                self.render_canonical(node, indent + 2, out);
            }
        }
    }
}

fn step<'tree>(
    current: &'tree Node,
    segment: &PathSegment,
    path: &ManifestPath,
) -> Result<&'tree Node, ManifestError> {
    let not_found = |segment: &str| ManifestError::NotFound {
        path: path.raw().to_string(),
        segment: segment.to_string(),
    };
    match segment {
        PathSegment::Key(key) => match &current.content {
            NodeContent::Mapping { entries, .. } => entries
                .iter()
                .find(|entry| entry.key == *key)
                .map(|entry| &entry.value)
                .ok_or_else(|| not_found(key)),
            _ => Err(not_found(key)),
        },
        PathSegment::Select(selector) => match &current.content {
            NodeContent::Sequence(items) => {
                let named = items.iter().any(|item| item.node.name_field().is_some());
                if named {
                    let matches: Vec<&SeqItem> = items
                        .iter()
                        .filter(|item| item.node.name_field().as_deref() == Some(selector))
                        .collect();
                    match matches.len() {
                        1 => Ok(&matches[0].node),
                        0 => {
                            if selector.parse::<usize>().is_ok() && items.len() > 1 {
                                Err(ManifestError::Ambiguous {
                                    path: path.raw().to_string(),
                                    segment: format!("[{selector}]"),
                                    candidates: items.len(),
                                })
                            } else {
                                Err(not_found(&format!("[{selector}]")))
                            }
                        }
                        n => Err(ManifestError::Ambiguous {
                            path: path.raw().to_string(),
                            segment: format!("[{selector}]"),
                            candidates: n,
                        }),
                    }
                } else {
                    let index: usize = selector
                        .parse()
                        .map_err(|_| not_found(&format!("[{selector}]")))?;
                    items
                        .get(index)
                        .map(|item| &item.node)
                        .ok_or_else(|| not_found(&format!("[{selector}]")))
                }
            }
            _ => Err(not_found(&format!("[{selector}]"))),
        },
    }
}

fn resolve_mut<'tree>(
    root: &'tree mut Node,
    path: &ManifestPath,
) -> Result<&'tree mut Node, ManifestError> {
    let mut current = root;
    for segment in path.segments() {
        // Borrow-checker friendly: locate the child index immutably first
        let index = locate(current, segment, path)?;
        current = match &mut current.content {
            NodeContent::Mapping { entries, .. } => &mut entries[index].value,
            NodeContent::Sequence(items) => &mut items[index].node,
            NodeContent::Scalar(_) => unreachable!("locate rejects scalar traversal"),
        };
    }
    Ok(current)
}

fn locate(current: &Node, segment: &PathSegment, path: &ManifestPath) -> Result<usize, ManifestError> {
    match segment {
        PathSegment::Key(key) => match &current.content {
            NodeContent::Mapping { entries, .. } => entries
                .iter()
                .position(|entry| entry.key == *key)
                .ok_or_else(|| ManifestError::NotFound {
                    path: path.raw().to_string(),
                    segment: key.clone(),
                }),
            _ => Err(ManifestError::NotFound {
                path: path.raw().to_string(),
                segment: key.clone(),
            }),
        },
        PathSegment::Select(_) => {
            // Reuse the immutable resolution rules, then find the index
            let target = step(current, segment, path)? as *const Node;
            match &current.content {
                NodeContent::Sequence(items) => Ok(items
                    .iter()
                    .position(|item| std::ptr::eq(&item.node as *const Node, target))
                    .unwrap_or_default()),
                _ => unreachable!("step only selects within sequences"),
            }
        }
    }
}

fn pad(width: usize) -> String {
    " ".repeat(width)
}

/// Slice at an exact character column
fn slice_at(line: &str, col: usize) -> &str {
    match line.char_indices().nth(col) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

/// Strip up to `n` leading spaces
fn dedent(line: &str, n: usize) -> &str {
    let mut count = 0;
    for (idx, ch) in line.char_indices() {
        if count == n || ch != ' ' {
            return &line[idx..];
        }
        count += 1;
    }
    ""
}

/// Quote a string scalar when plain style would change its meaning
fn scalar_literal(s: &str) -> String {
    if s.contains('\n') {
        // Emitted as a block scalar by the renderer
        return s.to_string();
    }
    if needs_quotes(s) {
        let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        s.to_string()
    }
}

fn quote_key(key: &str) -> String {
    if needs_quotes(key) {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        key.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    let first = s.chars().next().unwrap_or(' ');
    if "!&*?|>%@`\"'#{}[],:".contains(first) {
        return true;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return true;
    }
    let lowered = s.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return true;
    }
    s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    const POD: &str = "\
apiVersion: v1
kind: Pod
metadata:
  name: web
spec:
  containers:
    - name: web-server-container
      image: nginx:1.25
      securityContext:
        privileged: true
        runAsUser: 0
    - name: sidecar
      image: envoy:1.30
";

    #[test]
    fn test_resolve_by_container_name() {
        let tree = parse(POD).unwrap();
        let path =
            ManifestPath::parse("spec.containers[web-server-container].securityContext.privileged")
                .unwrap();
        let node = tree.resolve(&path).unwrap();
        assert_eq!(node.as_scalar().unwrap().text, "true");
    }

    #[test]
    fn test_numeric_select_over_named_sequence_is_ambiguous() {
        let tree = parse(POD).unwrap();
        let path = ManifestPath::parse("spec.containers[0].securityContext").unwrap();
        let err = tree.resolve(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Ambiguous { candidates: 2, .. }));
    }

    #[test]
    fn test_unknown_container_name_is_not_found() {
        let tree = parse(POD).unwrap();
        let path = ManifestPath::parse("spec.containers[db].securityContext").unwrap();
        let err = tree.resolve(&path).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_numeric_select_over_single_named_element_is_not_found() {
        let manifest = "\
spec:
  containers:
    - name: only
      image: nginx
";
        let tree = parse(manifest).unwrap();
        let path = ManifestPath::parse("spec.containers[0]").unwrap();
        let err = tree.resolve(&path).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_numeric_select_over_plain_sequence() {
        let manifest = "\
spec:
  args:
    - --verbose
    - --port=8080
";
        let tree = parse(manifest).unwrap();
        let path = ManifestPath::parse("spec.args[1]").unwrap();
        let node = tree.resolve(&path).unwrap();
        assert_eq!(node.as_scalar().unwrap().text, "--port=8080");
    }

    #[test]
    fn test_render_node_dedents_subtree() {
        let tree = parse(POD).unwrap();
        let path =
            ManifestPath::parse("spec.containers[web-server-container].securityContext").unwrap();
        let node = tree.resolve(&path).unwrap();
        assert_eq!(tree.render_node(node), "privileged: true\nrunAsUser: 0\n");
    }

    #[test]
    fn test_render_node_of_sequence_item() {
        let tree = parse(POD).unwrap();
        let path = ManifestPath::parse("spec.containers[sidecar]").unwrap();
        let node = tree.resolve(&path).unwrap();
        assert_eq!(
            tree.render_node(node),
            "name: sidecar\nimage: envoy:1.30\n"
        );
    }

    #[test]
    fn test_replace_scalar_renders_minimal_change() {
        let mut tree = parse(POD).unwrap();
        let path =
            ManifestPath::parse("spec.containers[web-server-container].securityContext.privileged")
                .unwrap();
        let replacement = Node::from_yaml_value(&serde_yaml::Value::Bool(false)).unwrap();
        tree.replace(&path, replacement).unwrap();
        let rendered = tree.render();
        assert!(rendered.contains("        privileged: false"));
        assert!(rendered.contains("        runAsUser: 0"));
        assert!(rendered.contains("image: nginx:1.25"));
        assert!(!rendered.contains("privileged: true"));
    }

    #[test]
    fn test_replace_subtree_keeps_surrounding_layout() {
        let mut tree = parse(POD).unwrap();
        let path =
            ManifestPath::parse("spec.containers[web-server-container].securityContext").unwrap();
        let after: serde_yaml::Value = serde_yaml::from_str(
            "privileged: false\nrunAsUser: 1000\nrunAsNonRoot: true\n",
        )
        .unwrap();
        tree.replace(&path, Node::from_yaml_value(&after).unwrap()).unwrap();
        let rendered = tree.render();
        assert!(rendered.contains("      securityContext:"));
        assert!(rendered.contains("        runAsNonRoot: true"));
        // Untouched sibling container is byte-identical
        assert!(rendered.contains("    - name: sidecar\n      image: envoy:1.30"));
    }

    #[test]
    fn test_scalar_literal_quoting() {
        assert_eq!(scalar_literal("nginx"), "nginx");
        assert_eq!(scalar_literal("true"), "\"true\"");
        assert_eq!(scalar_literal("8080"), "\"8080\"");
        assert_eq!(scalar_literal("a: b"), "\"a: b\"");
        assert_eq!(scalar_literal("plain-value"), "plain-value");
    }

    #[test]
    fn test_value_text_decodes_quotes() {
        let double = Scalar {
            text: "\"a \\\"b\\\"\"".to_string(),
            block: false,
        };
        assert_eq!(double.value_text(), "a \"b\"");
        let single = Scalar {
            text: "'it''s'".to_string(),
            block: false,
        };
        assert_eq!(single.value_text(), "it's");
    }
}

//! Line-oriented parser for the block-YAML subset
//!
//! The parser walks the document once, line by line, and records for every
//! node the exact line range it came from. Comment and blank lines between
//! entries attach forward to the entry that follows them, so the spans of a
//! block's entries tile the block with no gaps. That tiling is what lets
//! [`ManifestTree::render`](crate::tree::ManifestTree::render) reproduce the
//! input byte for byte.
//!
//! Rejected constructs (all reported as [`ManifestError::Parse`]):
//! anchors, aliases, tags, multi-document streams, multi-line flow
//! collections, multi-line plain scalars, and tab indentation.

use groundcheck_utils::error::ManifestError;

use crate::tree::{ManifestTree, MapEntry, Node, NodeContent, Scalar, SeqItem, Span};

/// Parse manifest text into a [`ManifestTree`].
pub fn parse(text: &str) -> Result<ManifestTree, ManifestError> {
    let final_newline = text.ends_with('\n');
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if final_newline {
        lines.pop();
    }

    let mut parser = Parser {
        lines: &lines,
        pos: 0,
    };

    // Preamble: leading blanks, comments, and at most one `---` marker
    let mut saw_doc_start = false;
    while parser.pos < parser.lines.len() {
        let logical = parser.logical(parser.pos);
        if is_filler(logical) {
            parser.pos += 1;
        } else if logical.trim() == "---" && !saw_doc_start {
            saw_doc_start = true;
            parser.pos += 1;
        } else {
            break;
        }
    }
    let preamble = Span::new(0, parser.pos);

    let Some(first_content) = parser.peek_content(parser.pos) else {
        return Err(ManifestError::Parse {
            line: parser.lines.len().max(1),
            reason: "document contains no content".to_string(),
        });
    };
    let root_indent = parser.indent_of(first_content)?;
    let root = parser.parse_block(root_indent)?;

    // Trailing: blanks, comments, and at most one `...` marker
    let trailing_start = parser.pos;
    let mut saw_doc_end = false;
    while parser.pos < parser.lines.len() {
        let logical = parser.logical(parser.pos);
        let trimmed = logical.trim();
        if is_filler(logical) {
            parser.pos += 1;
        } else if trimmed == "..." && !saw_doc_end {
            saw_doc_end = true;
            parser.pos += 1;
        } else if trimmed == "---" || trimmed == "..." {
            return Err(ManifestError::Parse {
                line: parser.pos + 1,
                reason: "multiple YAML documents are not supported".to_string(),
            });
        } else {
            return Err(ManifestError::Parse {
                line: parser.pos + 1,
                reason: "content after end of document".to_string(),
            });
        }
    }
    let trailing = Span::new(trailing_start, parser.lines.len());

    Ok(ManifestTree {
        lines,
        final_newline,
        preamble,
        trailing,
        root,
    })
}

struct Parser<'a> {
    lines: &'a [String],
    pos: usize,
}

impl Parser<'_> {
    fn logical(&self, pos: usize) -> &str {
        self.lines[pos].strip_suffix('\r').unwrap_or(&self.lines[pos])
    }

    /// Next non-filler line at or after `from`
    fn peek_content(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&pos| !is_filler(self.logical(pos)))
    }

    fn indent_of(&self, pos: usize) -> Result<usize, ManifestError> {
        let mut indent = 0;
        for ch in self.logical(pos).chars() {
            match ch {
                ' ' => indent += 1,
                '\t' => {
                    return Err(ManifestError::Parse {
                        line: pos + 1,
                        reason: "tab character in indentation".to_string(),
                    });
                }
                _ => break,
            }
        }
        Ok(indent)
    }

    /// Parse the block starting at the next content line, which the caller
    /// has established sits at `indent`.
    fn parse_block(&mut self, indent: usize) -> Result<Node, ManifestError> {
        let content = self.peek_content(self.pos).ok_or(ManifestError::Parse {
            line: self.pos.max(1),
            reason: "expected content".to_string(),
        })?;
        let logical = self.logical(content);
        let trimmed = logical.trim();
        if trimmed == "-" || trimmed.starts_with("- ") {
            self.parse_sequence(indent)
        } else if find_colon(strip_comment(char_slice(logical, indent))).is_some() {
            self.parse_mapping(indent)
        } else {
            // Single-line scalar block
            let rest = strip_comment(char_slice(logical, indent)).trim_end().to_string();
            self.pos = content;
            self.parse_scalar_rest(content, &rest, indent, indent)
        }
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<Node, ManifestError> {
        let mut entries: Vec<MapEntry> = Vec::new();
        let mut first_key_line = 0;
        loop {
            let filler_start = self.pos;
            let Some(content) = self.peek_content(filler_start) else {
                break;
            };
            let line_indent = self.indent_of(content)?;
            if line_indent < indent {
                break;
            }
            if line_indent > indent {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "unexpected indentation".to_string(),
                });
            }
            let trimmed = self.logical(content).trim().to_string();
            if trimmed == "---" || trimmed == "..." {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "multiple YAML documents are not supported".to_string(),
                });
            }
            if trimmed == "-" || trimmed.starts_with("- ") {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "sequence item outside a sequence".to_string(),
                });
            }
            if entries.is_empty() {
                first_key_line = content;
            }
            self.pos = content;
            let entry = self.parse_entry(filler_start, indent)?;
            if entries.iter().any(|existing| existing.key == entry.key) {
                return Err(ManifestError::Structural {
                    line: content + 1,
                    detail: format!("duplicate mapping key '{}'", entry.key),
                });
            }
            entries.push(entry);
        }
        // Span starts at the first key line; filler before it belongs to the
        // enclosing entry.
        let span = Span::new(first_key_line, entries[entries.len() - 1].span_end);
        Ok(Node::source(
            NodeContent::Mapping {
                entries,
                inline_start: false,
            },
            span,
            indent,
            indent,
        ))
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<Node, ManifestError> {
        let mut items: Vec<SeqItem> = Vec::new();
        let mut first_dash_line = 0;
        loop {
            let filler_start = self.pos;
            let Some(content) = self.peek_content(filler_start) else {
                break;
            };
            let line_indent = self.indent_of(content)?;
            if line_indent < indent {
                break;
            }
            if line_indent > indent {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "unexpected indentation".to_string(),
                });
            }
            let logical = self.logical(content).to_string();
            let trimmed = logical.trim();
            if !(trimmed == "-" || trimmed.starts_with("- ")) {
                // Next key of the enclosing mapping (same-indent sequence)
                break;
            }

            if items.is_empty() {
                first_dash_line = content;
            }
            let dash_line = content;
            let after_dash = char_slice(&logical, indent + 1);
            let rest_raw = after_dash.trim_start();
            let rest = strip_comment(rest_raw).trim_end().to_string();

            let node = if rest.is_empty() {
                // Dash on its own line
                self.pos = content + 1;
                let child_indent = match self.peek_content(self.pos) {
                    Some(child) => Some(self.indent_of(child)?),
                    None => None,
                };
                match child_indent {
                    Some(deeper) if deeper > indent => self.parse_block(deeper)?,
                    _ => Node::source(
                        NodeContent::Scalar(Scalar {
                            text: String::new(),
                            block: false,
                        }),
                        Span::new(content, content + 1),
                        indent + 1,
                        indent + 2,
                    ),
                }
            } else {
                let item_col = indent + 1 + leading_spaces(after_dash);
                if rest == "-" || rest.starts_with("- ") {
                    return Err(ManifestError::Parse {
                        line: content + 1,
                        reason: "nested sequence on one line is not supported".to_string(),
                    });
                }
                if find_colon(&rest).is_some() {
                    self.parse_inline_mapping(content, item_col)?
                } else {
                    self.pos = content;
                    self.parse_scalar_rest(content, &rest, item_col, indent)?
                }
            };

            items.push(SeqItem {
                span_start: filler_start,
                span_end: self.pos,
                dash_line,
                node,
            });
        }
        let span = Span::new(first_dash_line, items[items.len() - 1].span_end);
        Ok(Node::source(NodeContent::Sequence(items), span, indent, indent))
    }

    /// Mapping whose first entry shares the line with a sequence dash
    fn parse_inline_mapping(&mut self, dash_line: usize, item_col: usize) -> Result<Node, ManifestError> {
        self.pos = dash_line;
        let first = self.parse_entry(dash_line, item_col)?;
        let mut entries = vec![first];
        loop {
            let filler_start = self.pos;
            let Some(content) = self.peek_content(filler_start) else {
                break;
            };
            let line_indent = self.indent_of(content)?;
            if line_indent < item_col {
                break;
            }
            if line_indent > item_col {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "unexpected indentation".to_string(),
                });
            }
            let trimmed = self.logical(content).trim().to_string();
            if trimmed == "-" || trimmed.starts_with("- ") {
                return Err(ManifestError::Parse {
                    line: content + 1,
                    reason: "sequence item outside a sequence".to_string(),
                });
            }
            self.pos = content;
            let entry = self.parse_entry(filler_start, item_col)?;
            if entries.iter().any(|existing| existing.key == entry.key) {
                return Err(ManifestError::Structural {
                    line: content + 1,
                    detail: format!("duplicate mapping key '{}'", entry.key),
                });
            }
            entries.push(entry);
        }
        let span = Span::new(dash_line, self.pos);
        Ok(Node::source(
            NodeContent::Mapping {
                entries,
                inline_start: true,
            },
            span,
            item_col,
            item_col,
        ))
    }

    /// Parse one `key: value` entry whose key starts at column `key_col` on
    /// the current line, consuming the value. `span_start` is the first line
    /// of the entry's extent, including any comment lines attached to it.
    fn parse_entry(&mut self, span_start: usize, key_col: usize) -> Result<MapEntry, ManifestError> {
        let line_pos = self.pos;
        let logical = self.logical(line_pos).to_string();
        let stripped = strip_comment(char_slice(&logical, key_col)).to_string();
        let colon = find_colon(&stripped).ok_or(ManifestError::Parse {
            line: line_pos + 1,
            reason: "expected 'key: value'".to_string(),
        })?;
        let key_raw = stripped[..colon].trim_end().to_string();
        if key_raw.is_empty() {
            return Err(ManifestError::Parse {
                line: line_pos + 1,
                reason: "empty mapping key".to_string(),
            });
        }
        if key_raw.starts_with('?') {
            return Err(ManifestError::Parse {
                line: line_pos + 1,
                reason: "complex mapping keys are not supported".to_string(),
            });
        }
        let key = decode_key(&key_raw);

        let rest_region = &stripped[colon + 1..];
        let rest = rest_region.trim_start().trim_end().to_string();
        let value_col = key_col + char_count(&stripped[..colon + 1]) + leading_spaces(rest_region);

        let value = if rest.is_empty() {
            self.pos = line_pos + 1;
            match self.peek_content(self.pos) {
                Some(child) => {
                    let child_indent = self.indent_of(child)?;
                    let child_trimmed = self.logical(child).trim().to_string();
                    if child_indent > key_col {
                        self.parse_block(child_indent)?
                    } else if child_indent == key_col
                        && (child_trimmed == "-" || child_trimmed.starts_with("- "))
                    {
                        // Sequence written at the key's own indent
                        self.parse_sequence(key_col)?
                    } else {
                        empty_scalar(line_pos, value_col, key_col)
                    }
                }
                None => empty_scalar(line_pos, value_col, key_col),
            }
        } else {
            self.pos = line_pos;
            self.parse_scalar_rest(line_pos, &rest, value_col, key_col)?
        };

        Ok(MapEntry {
            key,
            key_raw,
            span_start,
            span_end: self.pos,
            value,
        })
    }

    /// Parse a value that begins on the current line with text `rest` at
    /// column `value_col`. Block scalar bodies are consumed while they remain
    /// deeper than `indent_ctx`.
    fn parse_scalar_rest(
        &mut self,
        line_pos: usize,
        rest: &str,
        value_col: usize,
        indent_ctx: usize,
    ) -> Result<Node, ManifestError> {
        if let Some(first) = rest.chars().next() {
            match first {
                '&' => {
                    return Err(ManifestError::Parse {
                        line: line_pos + 1,
                        reason: "anchors are not supported".to_string(),
                    });
                }
                '*' => {
                    return Err(ManifestError::Parse {
                        line: line_pos + 1,
                        reason: "aliases are not supported".to_string(),
                    });
                }
                '!' => {
                    return Err(ManifestError::Parse {
                        line: line_pos + 1,
                        reason: "tags are not supported".to_string(),
                    });
                }
                _ => {}
            }
        }

        if is_block_header(rest) {
            let mut end = line_pos + 1;
            let mut scan = line_pos + 1;
            while scan < self.lines.len() {
                let logical = self.logical(scan);
                if logical.trim().is_empty() {
                    scan += 1;
                    continue;
                }
                if self.indent_of(scan)? > indent_ctx {
                    scan += 1;
                    end = scan;
                } else {
                    break;
                }
            }
            self.pos = end;
            return Ok(Node::source(
                NodeContent::Scalar(Scalar {
                    text: rest.to_string(),
                    block: true,
                }),
                Span::new(line_pos, end),
                value_col,
                indent_ctx,
            ));
        }

        if rest.starts_with('{') || rest.starts_with('[') {
            if !flow_balanced(rest) {
                return Err(ManifestError::Parse {
                    line: line_pos + 1,
                    reason: "flow collection must open and close on one line".to_string(),
                });
            }
            // Balanced single-line flow is kept as opaque scalar text
        }

        self.pos = line_pos + 1;
        Ok(Node::source(
            NodeContent::Scalar(Scalar {
                text: rest.to_string(),
                block: false,
            }),
            Span::new(line_pos, line_pos + 1),
            value_col,
            indent_ctx,
        ))
    }
}

fn empty_scalar(line_pos: usize, value_col: usize, indent_ctx: usize) -> Node {
    Node::source(
        NodeContent::Scalar(Scalar {
            text: String::new(),
            block: false,
        }),
        Span::new(line_pos, line_pos + 1),
        value_col,
        indent_ctx,
    )
}

fn is_filler(logical: &str) -> bool {
    let trimmed = logical.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Byte slice at a character offset; safe here because leading columns are
/// always spaces
fn char_slice(line: &str, col: usize) -> &str {
    match line.char_indices().nth(col) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

fn leading_spaces(s: &str) -> usize {
    s.chars().take_while(|&ch| ch == ' ').count()
}

/// Cut a `#` comment, honoring single and double quotes
fn strip_comment(text: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            prev = Some(ch);
            continue;
        }
        match ch {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                if prev.is_none() || prev == Some(' ') || prev == Some('\t') {
                    return text[..idx].trim_end();
                }
            }
            _ => {}
        }
        prev = Some(ch);
    }
    text
}

/// Position of the key-terminating colon: a `:` followed by a space or the
/// end of the (comment-stripped) line, outside quotes
fn find_colon(text: &str) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    for (i, &(idx, ch)) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ':' if !in_single && !in_double => {
                let next = chars.get(i + 1).map(|&(_, c)| c);
                if next.is_none() || next == Some(' ') {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_key(raw: &str) -> String {
    Scalar {
        text: raw.to_string(),
        block: false,
    }
    .value_text()
}

fn is_block_header(rest: &str) -> bool {
    let mut chars = rest.chars();
    if !matches!(chars.next(), Some('|' | '>')) {
        return false;
    }
    rest.len() <= 4 && chars.all(|ch| matches!(ch, '+' | '-' | '0'..='9'))
}

fn flow_balanced(text: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '{' | '[' if !in_single && !in_double => depth += 1,
            '}' | ']' if !in_single && !in_double => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_single && !in_double
}


#[cfg(test)]
mod round_trip_properties {
    use super::parse;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Val {
        Scalar(String),
        Seq(Vec<Val>),
        Map(Vec<(String, Val)>),
    }

    fn scalar_text() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-z0-9-]{0,8}",
            "(0|[1-9][0-9]{0,3})",
            Just("true".to_string()),
            Just("nginx:1.25".to_string()),
        ]
    }

    fn key_name() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9]{0,10}"
    }

    fn val_strategy() -> impl Strategy<Value = Val> {
        let leaf = scalar_text().prop_map(Val::Scalar);
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Val::Seq),
                prop::collection::vec((key_name(), inner), 1..4).prop_map(|pairs| {
                    let mut seen = Vec::new();
                    let mut unique = Vec::new();
                    for (key, value) in pairs {
                        if !seen.contains(&key) {
                            seen.push(key.clone());
                            unique.push((key, value));
                        }
                    }
                    Val::Map(unique)
                }),
            ]
        })
    }

    fn emit(value: &Val, indent: usize, out: &mut String) {
        let pad = " ".repeat(indent);
        match value {
            Val::Scalar(_) => unreachable!("scalars emit inline"),
            Val::Seq(items) => {
                for item in items {
                    match item {
                        Val::Scalar(text) => out.push_str(&format!("{pad}- {text}\n")),
                        Val::Map(pairs) if !pairs.is_empty() => {
                            let mut first = true;
                            for (key, child) in pairs {
                                let lead = if first {
                                    format!("{pad}- ")
                                } else {
                                    format!("{pad}  ")
                                };
                                first = false;
                                emit_pair(key, child, &lead, indent + 2, out);
                            }
                        }
                        _ => {
                            out.push_str(&format!("{pad}-\n"));
                            emit(item, indent + 2, out);
                        }
                    }
                }
            }
            Val::Map(pairs) => {
                for (key, child) in pairs {
                    emit_pair(key, child, &pad, indent, out);
                }
            }
        }
    }

    fn emit_pair(key: &str, child: &Val, lead: &str, indent: usize, out: &mut String) {
        match child {
            Val::Scalar(text) => out.push_str(&format!("{lead}{key}: {text}\n")),
            Val::Seq(items) if items.is_empty() => {
                out.push_str(&format!("{lead}{key}: []\n"));
            }
            Val::Map(pairs) if pairs.is_empty() => {
                out.push_str(&format!("{lead}{key}: {{}}\n"));
            }
            _ => {
                out.push_str(&format!("{lead}{key}:\n"));
                emit(child, indent + 2, out);
            }
        }
    }

    proptest! {
        #[test]
        fn parse_then_render_reproduces_input(value in val_strategy()) {
            let root = match value {
                Val::Scalar(text) => Val::Map(vec![("value".to_string(), Val::Scalar(text))]),
                other => other,
            };
            let mut text = String::new();
            emit(&root, 0, &mut text);
            prop_assume!(!text.is_empty());
            let tree = parse(&text).unwrap();
            prop_assert_eq!(tree.render(), text);
        }
    }
}

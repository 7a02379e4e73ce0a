//! Path expressions into the manifest tree
//!
//! A path is dotted segments with bracket selectors:
//! `spec.template.spec.containers[web-server-container].securityContext`.
//! Bracket selectors address sequence elements; whether the selector text is
//! treated as a name or an index is decided at resolution time against the
//! addressed sequence.

use std::fmt;
use std::str::FromStr;

use groundcheck_utils::error::ManifestError;

/// One step in a path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key (`securityContext`)
    Key(String),
    /// Bracket selector into a sequence (`[web]`, `[0]`)
    Select(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Select(selector) => write!(f, "[{selector}]"),
        }
    }
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl ManifestPath {
    /// Parse a path expression.
    ///
    /// Dots separate keys, brackets select sequence elements, and brackets
    /// may chain (`matrix[0][1]`). Dots inside brackets are literal.
    pub fn parse(raw: &str) -> Result<Self, ManifestError> {
        let expression = |reason: &str| ManifestError::Expression {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(expression("empty path"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        // Tracks whether a key segment may start here; false right after `]`
        let mut key_open = true;
        let mut chars = raw.trim().chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if key_open {
                        if current.is_empty() {
                            return Err(expression("empty segment"));
                        }
                        segments.push(PathSegment::Key(std::mem::take(&mut current)));
                    } else if !current.is_empty() {
                        return Err(expression("unexpected text after `]`"));
                    }
                    key_open = true;
                }
                '[' => {
                    if key_open {
                        if current.is_empty() && segments.is_empty() {
                            return Err(expression("path cannot start with a selector"));
                        }
                        if !current.is_empty() {
                            segments.push(PathSegment::Key(std::mem::take(&mut current)));
                        }
                    } else if !current.is_empty() {
                        return Err(expression("unexpected text after `]`"));
                    }
                    let mut selector = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == ']' {
                            closed = true;
                            break;
                        }
                        if inner == '[' {
                            return Err(expression("nested `[` in selector"));
                        }
                        selector.push(inner);
                    }
                    if !closed {
                        return Err(expression("unclosed `[`"));
                    }
                    let selector = selector.trim().to_string();
                    if selector.is_empty() {
                        return Err(expression("empty selector"));
                    }
                    segments.push(PathSegment::Select(selector));
                    key_open = false;
                    current.clear();
                }
                ']' => return Err(expression("unmatched `]`")),
                _ => {
                    if !key_open {
                        return Err(expression("expected `.` or `[` after `]`"));
                    }
                    current.push(ch);
                }
            }
        }

        if key_open {
            if current.is_empty() {
                return Err(expression("trailing `.`"));
            }
            segments.push(PathSegment::Key(current));
        } else if !current.is_empty() {
            return Err(expression("unexpected text after `]`"));
        }

        Ok(Self {
            raw: raw.trim().to_string(),
            segments,
        })
    }

    /// Build a path from already-parsed segments. An empty segment list
    /// addresses the document root.
    #[must_use]
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let mut raw = String::new();
        for segment in &segments {
            match segment {
                PathSegment::Key(key) => {
                    if !raw.is_empty() {
                        raw.push('.');
                    }
                    raw.push_str(key);
                }
                PathSegment::Select(selector) => {
                    raw.push('[');
                    raw.push_str(selector);
                    raw.push(']');
                }
            }
        }
        Self { raw, segments }
    }

    /// The expression as written
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed segments, outermost first
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments; the merge order sorts shallow paths first
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True when `self` addresses `other` or an ancestor of `other`
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// True when one path addresses a node inside the other's subtree
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for ManifestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for ManifestPath {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Extend a display path with a mapping key
#[must_use]
pub fn join_key(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

/// Extend a display path with a sequence selector
#[must_use]
pub fn join_select(base: &str, selector: &str) -> String {
    format!("{base}[{selector}]")
}

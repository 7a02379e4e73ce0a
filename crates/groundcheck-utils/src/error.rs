use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `GroundcheckError` is the primary error type returned by groundcheck
/// library operations. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - A stable split between fatal input errors and repairable violations
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Manifest` | Manifest parse, structure, or path resolution failures |
/// | `Evidence` | Evidence feed ingestion and citation lookup failures |
/// | `Patch` | Patch fragment verification and merge failures |
/// | `Generator` | External generator invocation failures |
/// | `Config` | Configuration file or CLI argument errors |
///
/// Manifest parse and structural errors are fatal: no downstream stage can
/// proceed without a valid tree. Everything the repair loop can act on is
/// carried as a [`Violation`] value instead, so rejection output and repair
/// diagnostics share one representation.
///
/// Library code returns `GroundcheckError` and does NOT call
/// `std::process::exit()`; the CLI maps errors to exit codes.
#[derive(Error, Debug)]
pub enum GroundcheckError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Evidence error: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read input file {path}: {reason}")]
    InputRead { path: String, reason: String },

    #[error("Canonicalization failed: {reason}")]
    Canonicalization { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error messages with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ManifestInput,
    Evidence,
    Grounding,
    PatchApplication,
    Generator,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::ManifestInput => write!(f, "Manifest Input"),
            Self::Evidence => write!(f, "Evidence"),
            Self::Grounding => write!(f, "Grounding"),
            Self::PatchApplication => write!(f, "Patch Application"),
            Self::Generator => write!(f, "Generator"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Manifest parsing and path resolution errors.
///
/// `Parse` and `Structural` describe malformed manifest input and abort the
/// run immediately. `NotFound`, `Ambiguous`, and `Expression` describe bad
/// path references; the pipeline surfaces those as repairable violations on
/// the reference that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The manifest text is not parseable YAML
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The manifest parsed but violates a structural rule (duplicate keys)
    #[error("structural error at line {line}: {detail}")]
    Structural { line: usize, detail: String },

    /// A path segment matched no node
    #[error("path `{path}`: segment `{segment}` matches no node")]
    NotFound { path: String, segment: String },

    /// A path segment matched more than one node
    #[error("path `{path}`: segment `{segment}` is ambiguous ({candidates} candidates)")]
    Ambiguous {
        path: String,
        segment: String,
        candidates: usize,
    },

    /// The path expression itself is malformed
    #[error("invalid path expression `{path}`: {reason}")]
    Expression { path: String, reason: String },
}

/// Evidence feed ingestion and citation lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvidenceError {
    /// A citation number is outside the assigned table
    #[error("unknown citation [{number}]: table holds {table_len} item(s)")]
    UnknownCitation { number: usize, table_len: usize },

    /// A scanner report could not be parsed into findings
    #[error("scanner report unreadable: {reason}")]
    ScannerReport { reason: String },

    /// An evidence feed file could not be parsed
    #[error("evidence feed {path} unreadable: {reason}")]
    Feed { path: String, reason: String },
}

/// Patch fragment verification and merge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The before snippet does not match the manifest subtree at its path
    #[error("stale context at `{path}`: {detail}")]
    Stale { path: String, detail: String },

    /// A snippet is not well-formed YAML
    #[error("snippet at `{path}` is not valid YAML: {reason}")]
    Snippet { path: String, reason: String },

    /// Applying a verified fragment failed against the cloned tree
    #[error("apply failed at `{path}`: {reason}")]
    Apply { path: String, reason: String },
}

/// External generator invocation errors
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The call did not complete within the caller-supplied timeout
    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The configured generator command could not be started
    #[error("failed to spawn generator command `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The generator process exited with a failure code
    #[error("generator command `{command}` exited with code {code}: {stderr_tail}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr_tail: String,
    },

    /// The generator produced no usable text
    #[error("generator returned empty output")]
    Empty,

    /// IO failure while talking to the generator process
    #[error("generator IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    TomlParse { path: String, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// One repairable defect found in generated output.
///
/// Violations are produced by the format checker, the grounding validator,
/// and the patch verifier. They are serializable so a rejected run can carry
/// them verbatim to the caller, and they render as the diagnostic lines
/// appended to repair instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A required section heading is absent
    MissingSection { heading: String },
    /// A section heading appears more than once
    DuplicateSection { heading: String },
    /// Sections are present but not in the required order
    SectionOrder { heading: String, position: usize },
    /// A findings item does not begin with a recognized source-type tag
    MissingSourceTag { line: usize, text: String },
    /// A findings item carries no citation
    MissingCitation { line: usize, text: String },
    /// A fenced block is not surrounded by exactly one blank line
    FenceSpacing { line: usize, detail: String },
    /// A fenced block opened but never closed
    UnclosedFence { line: usize },
    /// A tab character appears inside a YAML block
    TabIndentation { line: usize },
    /// YAML block indentation does not step by two spaces
    IndentationStep { line: usize, width: usize },
    /// The recommendation section has no Target: line
    MissingTarget,
    /// The recommendation presents more than one before/after pair
    ExtraPatchPair { pairs: usize },
    /// The recommendation presents no complete before/after pair
    MissingPatchPair,
    /// A claim cites a number with no evidence table entry
    HallucinatedCitation { number: usize, sentence: String },
    /// A path reference does not resolve against the manifest
    InvalidPath { path: String, reason: String },
    /// A before snippet describes manifest state that is not present
    StaleContext { path: String, detail: String },
    /// A fenced snippet is not parseable YAML
    InvalidSnippet { path: String, reason: String },
    /// The generator call itself failed for this attempt
    GeneratorFailure { detail: String },
}

impl Violation {
    /// Line the violation anchors to, when one exists
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingSourceTag { line, .. }
            | Self::MissingCitation { line, .. }
            | Self::FenceSpacing { line, .. }
            | Self::UnclosedFence { line }
            | Self::TabIndentation { line }
            | Self::IndentationStep { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Stable label used in summaries and logs
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingSection { .. } => "missing_section",
            Self::DuplicateSection { .. } => "duplicate_section",
            Self::SectionOrder { .. } => "section_order",
            Self::MissingSourceTag { .. } => "missing_source_tag",
            Self::MissingCitation { .. } => "missing_citation",
            Self::FenceSpacing { .. } => "fence_spacing",
            Self::UnclosedFence { .. } => "unclosed_fence",
            Self::TabIndentation { .. } => "tab_indentation",
            Self::IndentationStep { .. } => "indentation_step",
            Self::MissingTarget => "missing_target",
            Self::ExtraPatchPair { .. } => "extra_patch_pair",
            Self::MissingPatchPair => "missing_patch_pair",
            Self::HallucinatedCitation { .. } => "hallucinated_citation",
            Self::InvalidPath { .. } => "invalid_path",
            Self::StaleContext { .. } => "stale_context",
            Self::InvalidSnippet { .. } => "invalid_snippet",
            Self::GeneratorFailure { .. } => "generator_failure",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSection { heading } => {
                write!(f, "required section `{heading}` is missing")
            }
            Self::DuplicateSection { heading } => {
                write!(f, "section `{heading}` appears more than once")
            }
            Self::SectionOrder { heading, position } => {
                write!(
                    f,
                    "section `{heading}` is out of order (found at position {position})"
                )
            }
            Self::MissingSourceTag { line, text } => {
                write!(
                    f,
                    "line {line}: findings item must begin with a source-type tag: {text}"
                )
            }
            Self::MissingCitation { line, text } => {
                write!(f, "line {line}: item carries no citation: {text}")
            }
            Self::FenceSpacing { line, detail } => {
                write!(
                    f,
                    "line {line}: fenced block must be surrounded by exactly one blank line ({detail})"
                )
            }
            Self::UnclosedFence { line } => {
                write!(f, "line {line}: fenced block is never closed")
            }
            Self::TabIndentation { line } => {
                write!(f, "line {line}: tab character in YAML block indentation")
            }
            Self::IndentationStep { line, width } => {
                write!(
                    f,
                    "line {line}: indentation must increase in two-space steps, found a step of {width}"
                )
            }
            Self::MissingTarget => {
                write!(f, "recommendation section has no `Target:` line")
            }
            Self::ExtraPatchPair { pairs } => {
                write!(
                    f,
                    "recommendation must present exactly one before/after pair, found {pairs}"
                )
            }
            Self::MissingPatchPair => {
                write!(f, "recommendation presents no complete before/after pair")
            }
            Self::HallucinatedCitation { number, sentence } => {
                write!(
                    f,
                    "citation [{number}] has no evidence table entry, in: {sentence}"
                )
            }
            Self::InvalidPath { path, reason } => {
                write!(f, "path reference `{path}` does not resolve: {reason}")
            }
            Self::StaleContext { path, detail } => {
                write!(
                    f,
                    "before snippet at `{path}` does not match the manifest: {detail}"
                )
            }
            Self::InvalidSnippet { path, reason } => {
                write!(f, "snippet at `{path}` is not valid YAML: {reason}")
            }
            Self::GeneratorFailure { detail } => {
                write!(f, "generator attempt failed: {detail}")
            }
        }
    }
}

impl std::error::Error for Violation {}

impl UserFriendlyError for ManifestError {
    fn user_message(&self) -> String {
        match self {
            Self::Parse { line, reason } => {
                format!("The manifest could not be parsed at line {line}: {reason}")
            }
            Self::Structural { line, detail } => {
                format!("The manifest is structurally invalid at line {line}: {detail}")
            }
            Self::NotFound { path, segment } => {
                format!("No manifest field matches `{segment}` in the path `{path}`")
            }
            Self::Ambiguous {
                path,
                segment,
                candidates,
            } => {
                format!(
                    "The segment `{segment}` in `{path}` could refer to {candidates} different elements"
                )
            }
            Self::Expression { path, reason } => {
                format!("The path expression `{path}` is malformed: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Parse { .. } | Self::Structural { .. } => Some(
                "No validation can run without a well-formed manifest tree".to_string(),
            ),
            Self::Ambiguous { .. } => Some(
                "Sequence elements with a name field are addressed by that name, not by position"
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Parse { .. } => vec![
                "Check the manifest for broken indentation or stray tab characters".to_string(),
                "Validate the file with a YAML linter before submitting it".to_string(),
            ],
            Self::Structural { .. } => {
                vec!["Remove or rename the duplicated mapping key".to_string()]
            }
            Self::NotFound { .. } => vec![
                "Check the spelling of each path segment against the manifest".to_string(),
            ],
            Self::Ambiguous { .. } => vec![
                "Address the element by its name field, e.g. containers[web-server]".to_string(),
            ],
            Self::Expression { .. } => vec![
                "Use dotted segments with bracket selectors, e.g. spec.containers[web]".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::ManifestInput
    }
}

impl UserFriendlyError for EvidenceError {
    fn user_message(&self) -> String {
        match self {
            Self::UnknownCitation { number, table_len } => {
                format!(
                    "Citation [{number}] does not exist; the evidence table holds {table_len} item(s)"
                )
            }
            Self::ScannerReport { reason } => {
                format!("The scanner report could not be read: {reason}")
            }
            Self::Feed { path, reason } => {
                format!("The evidence feed {path} could not be read: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UnknownCitation { .. } => Some(
                "Citation numbers are assigned once per run, in feed order, starting at 1"
                    .to_string(),
            ),
            Self::ScannerReport { .. } | Self::Feed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownCitation { .. } => vec![
                "List the evidence table with `groundcheck evidence` to see assigned numbers"
                    .to_string(),
            ],
            Self::ScannerReport { .. } => vec![
                "Expected a Trivy-style JSON report or a plain findings array".to_string(),
            ],
            Self::Feed { .. } => vec![
                "Evidence feeds are JSON arrays of objects with source, id, and text fields"
                    .to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Evidence
    }
}

impl UserFriendlyError for PatchError {
    fn user_message(&self) -> String {
        match self {
            Self::Stale { path, detail } => {
                format!("The proposed fix at `{path}` edits manifest state that is not present: {detail}")
            }
            Self::Snippet { path, reason } => {
                format!("The snippet at `{path}` is not valid YAML: {reason}")
            }
            Self::Apply { path, reason } => {
                format!("The fix at `{path}` could not be applied: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Stale { .. } => Some(
                "Before snippets must match the current subtree so every edit is verifiable"
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Stale { .. } => vec![
                "Regenerate the report against the manifest actually submitted".to_string(),
            ],
            Self::Snippet { .. } => vec![
                "Check the snippet for tabs or inconsistent indentation".to_string(),
            ],
            Self::Apply { .. } => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::PatchApplication
    }
}

impl UserFriendlyError for GeneratorError {
    fn user_message(&self) -> String {
        match self {
            Self::Timeout { seconds } => {
                format!("The generator did not answer within {seconds} seconds")
            }
            Self::Spawn { command, reason } => {
                format!("The generator command `{command}` could not be started: {reason}")
            }
            Self::NonZeroExit { command, code, .. } => {
                format!("The generator command `{command}` failed with exit code {code}")
            }
            Self::Empty => "The generator returned empty output".to_string(),
            Self::Io(err) => format!("IO failure while talking to the generator: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Timeout { .. } => {
                Some("A timed-out call consumes one repair attempt".to_string())
            }
            Self::NonZeroExit { stderr_tail, .. } if !stderr_tail.is_empty() => {
                Some(format!("Last error output: {stderr_tail}"))
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Timeout { .. } => vec![
                "Raise generator_timeout_secs in groundcheck.toml for slow backends".to_string(),
            ],
            Self::Spawn { .. } => vec![
                "Check that the configured generator command is installed and on PATH".to_string(),
            ],
            Self::NonZeroExit { .. } => vec![
                "Run the generator command by hand with the same instruction to reproduce"
                    .to_string(),
            ],
            Self::Empty => vec![
                "Check the generator command writes its answer to stdout".to_string(),
            ],
            Self::Io(_) => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Generator
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::FileRead { path, reason } => {
                format!("Could not read the config file {path}: {reason}")
            }
            Self::TomlParse { path, reason } => {
                format!("The config file {path} is not valid TOML: {reason}")
            }
            Self::InvalidValue { field, reason } => {
                format!("The config value {field} is invalid: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        None
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FileRead { .. } => vec![
                "Pass an explicit path with --config or create groundcheck.toml".to_string(),
            ],
            Self::TomlParse { .. } => vec!["Check the file for TOML syntax errors".to_string()],
            Self::InvalidValue { .. } => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for GroundcheckError {
    fn user_message(&self) -> String {
        match self {
            Self::Manifest(err) => err.user_message(),
            Self::Evidence(err) => err.user_message(),
            Self::Patch(err) => err.user_message(),
            Self::Generator(err) => err.user_message(),
            Self::Config(err) => err.user_message(),
            Self::InputRead { path, reason } => {
                format!("Could not read the input file {path}: {reason}")
            }
            Self::Canonicalization { reason } => {
                format!("Canonical output could not be produced: {reason}")
            }
            Self::Io(err) => format!("File system error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Manifest(err) => err.context(),
            Self::Evidence(err) => err.context(),
            Self::Patch(err) => err.context(),
            Self::Generator(err) => err.context(),
            Self::Config(err) => err.context(),
            Self::InputRead { .. } | Self::Canonicalization { .. } | Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Manifest(err) => err.suggestions(),
            Self::Evidence(err) => err.suggestions(),
            Self::Patch(err) => err.suggestions(),
            Self::Generator(err) => err.suggestions(),
            Self::Config(err) => err.suggestions(),
            Self::InputRead { .. } => vec![
                "Check the path exists and is readable".to_string(),
            ],
            Self::Canonicalization { .. } | Self::Io(_) => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Manifest(err) => err.category(),
            Self::Evidence(err) => err.category(),
            Self::Patch(err) => err.category(),
            Self::Generator(err) => err.category(),
            Self::Config(err) => err.category(),
            Self::Canonicalization { .. } => ErrorCategory::PatchApplication,
            Self::InputRead { .. } | Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl GroundcheckError {
    /// Format the error for end users: message, context, suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut out = format!("Error: {}", self.user_message());
        if let Some(context) = self.context() {
            out.push_str(&format!("\n\nContext: {context}"));
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\n\nSuggestions:");
            for suggestion in suggestions {
                out.push_str(&format!("\n  - {suggestion}"));
            }
        }
        out
    }

    /// True when no downstream stage can run and no repair is attempted
    #[must_use]
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Self::Manifest(ManifestError::Parse { .. })
                | Self::Manifest(ManifestError::Structural { .. })
                | Self::Evidence(EvidenceError::ScannerReport { .. })
                | Self::Evidence(EvidenceError::Feed { .. })
                | Self::InputRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_display() {
        let err = ManifestError::Structural {
            line: 7,
            detail: "duplicate mapping key `name`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "structural error at line 7: duplicate mapping key `name`"
        );
    }

    #[test]
    fn test_ambiguous_display_includes_candidates() {
        let err = ManifestError::Ambiguous {
            path: "spec.containers[0]".to_string(),
            segment: "[0]".to_string(),
            candidates: 2,
        };
        assert!(err.to_string().contains("2 candidates"));
    }

    #[test]
    fn test_violation_serializes_with_kind_tag() {
        let violation = Violation::HallucinatedCitation {
            number: 3,
            sentence: "Privileged mode is enabled [3]".to_string(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "hallucinated_citation");
        assert_eq!(json["number"], 3);
    }

    #[test]
    fn test_violation_line_anchors() {
        let violation = Violation::TabIndentation { line: 12 };
        assert_eq!(violation.line(), Some(12));
        assert_eq!(Violation::MissingTarget.line(), None);
    }

    #[test]
    fn test_violation_codes_are_stable() {
        assert_eq!(
            Violation::MissingSection {
                heading: "References".to_string()
            }
            .code(),
            "missing_section"
        );
        assert_eq!(
            Violation::StaleContext {
                path: "spec".to_string(),
                detail: String::new()
            }
            .code(),
            "stale_context"
        );
    }

    #[test]
    fn test_user_friendly_error_has_suggestions() {
        let err = GroundcheckError::Manifest(ManifestError::Parse {
            line: 3,
            reason: "tab character in indentation".to_string(),
        });
        let display = err.display_for_user();
        assert!(display.starts_with("Error:"));
        assert!(display.contains("Suggestions:"));
        assert!(err.is_fatal_input());
    }

    #[test]
    fn test_resolution_errors_are_not_fatal() {
        let err = GroundcheckError::Manifest(ManifestError::NotFound {
            path: "spec.missing".to_string(),
            segment: "missing".to_string(),
        });
        assert!(!err.is_fatal_input());
    }

    #[test]
    fn test_unreadable_inputs_are_fatal() {
        let read_err = GroundcheckError::InputRead {
            path: "pod.yaml".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(read_err.is_fatal_input());
        assert_eq!(read_err.category(), ErrorCategory::FileSystem);

        let feed_err = GroundcheckError::Evidence(EvidenceError::Feed {
            path: "docs.json".to_string(),
            reason: "expected value at line 1".to_string(),
        });
        assert!(feed_err.is_fatal_input());
        assert!(feed_err.to_string().contains("docs.json"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::ManifestInput.to_string(), "Manifest Input");
        assert_eq!(
            ErrorCategory::PatchApplication.to_string(),
            "Patch Application"
        );
    }
}

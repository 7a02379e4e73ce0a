//! Canonical forms and digests
//!
//! Snippet comparison and run receipts both depend on deterministic byte
//! representations: YAML snippets are compared in canonical serialized form,
//! and JSON receipts are emitted as JCS (RFC 8785) so digests are stable
//! regardless of struct field order.

use serde::Serialize;

use crate::error::GroundcheckError;

/// Emit a value as JCS-canonical JSON (RFC 8785).
///
/// This is the standard way to emit JSON for run summaries and any other
/// machine-read contract. JCS ensures deterministic output regardless of
/// field ordering in the source struct.
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String, GroundcheckError> {
    let json_value =
        serde_json::to_value(value).map_err(|err| GroundcheckError::Canonicalization {
            reason: format!("serialize to JSON failed: {err}"),
        })?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value).map_err(|err| {
        GroundcheckError::Canonicalization {
            reason: format!("JCS canonicalization failed: {err}"),
        }
    })?;
    String::from_utf8(json_bytes).map_err(|err| GroundcheckError::Canonicalization {
        reason: format!("JCS output contained invalid UTF-8: {err}"),
    })
}

/// Canonicalize a YAML snippet for whitespace-insensitive comparison.
///
/// Parses the snippet and re-serializes it, then normalizes line endings,
/// strips trailing spaces, and enforces a final newline. Two snippets that
/// differ only in formatting canonicalize to identical strings; snippets
/// that differ in structure, key order, or scalar values do not.
pub fn canonical_yaml(content: &str) -> Result<String, GroundcheckError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|err| GroundcheckError::Canonicalization {
            reason: format!("YAML parse failed: {err}"),
        })?;
    let serialized =
        serde_yaml::to_string(&value).map_err(|err| GroundcheckError::Canonicalization {
            reason: format!("YAML serialize failed: {err}"),
        })?;

    let mut output = normalize_line_endings(&serialized);
    let cleaned: Vec<&str> = output.lines().map(str::trim_end).collect();
    output = cleaned.join("\n");
    output.push('\n');
    Ok(output)
}

/// Normalize CRLF and lone CR line endings to LF
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// blake3 hex digest of raw content
#[must_use]
pub fn content_digest(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// blake3 hex digest of a value's JCS-canonical JSON form
pub fn digest_jcs<T: Serialize>(value: &T) -> Result<String, GroundcheckError> {
    let canonical = emit_jcs(value)?;
    Ok(content_digest(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_jcs_sorts_object_keys() {
        #[derive(Serialize)]
        struct Sample {
            zebra: u32,
            apple: u32,
        }
        let json = emit_jcs(&Sample { zebra: 1, apple: 2 }).unwrap();
        assert_eq!(json, r#"{"apple":2,"zebra":1}"#);
    }

    #[test]
    fn test_canonical_yaml_ignores_formatting() {
        let spaced = "privileged:    false\nrunAsUser: 1000\n";
        let tight = "privileged: false\nrunAsUser: 1000";
        assert_eq!(
            canonical_yaml(spaced).unwrap(),
            canonical_yaml(tight).unwrap()
        );
    }

    #[test]
    fn test_canonical_yaml_distinguishes_values() {
        let a = canonical_yaml("privileged: true\n").unwrap();
        let b = canonical_yaml("privileged: false\n").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_canonical_yaml_preserves_key_order() {
        let ab = canonical_yaml("a: 1\nb: 2\n").unwrap();
        let ba = canonical_yaml("b: 2\na: 1\n").unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_content_digest_is_stable() {
        let first = content_digest("kind: Pod\n");
        let second = content_digest("kind: Pod\n");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_digest_jcs_ignores_field_order() {
        let a = serde_json::json!({"x": 1, "y": [1, 2]});
        let b = serde_json::json!({"y": [1, 2], "x": 1});
        assert_eq!(digest_jcs(&a).unwrap(), digest_jcs(&b).unwrap());
    }
}

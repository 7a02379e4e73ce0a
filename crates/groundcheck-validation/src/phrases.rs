//! Security noun-phrase table for the closed-world grounding check
//!
//! Each entry pairs a canonical phrase with one pattern covering its
//! manifest-field spelling and common prose variants. The same pattern is
//! used on both sides: a phrase "mentioned" in a claim must also match the
//! text of at least one cited evidence item, otherwise the claim is flagged
//! as possibly unsupported. Extending the table is a code change.

use std::sync::LazyLock;

use regex::Regex;

/// One recognized security phrase with its match pattern.
pub struct SecurityPhrase {
    name: &'static str,
    pattern: Regex,
}

impl SecurityPhrase {
    /// Canonical name used in warnings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True when any spelling of the phrase occurs in `text`.
    #[must_use]
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// The fixed phrase table, in stable order.
pub static SECURITY_PHRASES: LazyLock<Vec<SecurityPhrase>> = LazyLock::new(|| {
    [
        ("privileged mode", r"(?i)\bprivileged\b"),
        (
            "root user",
            r"(?i)\broot\s+user\b|\buid\s*0\b|\brun(?:ning|s)?\s+as\s+root\b|\brunAsUser\b|\brunAsNonRoot\b",
        ),
        (
            "privilege escalation",
            r"(?i)\bprivilege\s+escalation\b|\ballowPrivilegeEscalation\b|\bescalat\w*\s+privileges?\b",
        ),
        (
            "read-only root filesystem",
            r"(?i)\bread[-\s]?only\s+root\s+file\s?system\b|\breadOnlyRootFilesystem\b|\bwritable\s+root\s+file\s?system\b",
        ),
        ("host network", r"(?i)\bhost\s+network\b|\bhostNetwork\b"),
        ("host PID namespace", r"(?i)\bhost\s+pid\b|\bhostPID\b"),
        (
            "Linux capabilities",
            r"(?i)\bcapabilit(?:y|ies)\b|\bCAP_[A-Z_]+\b",
        ),
        ("seccomp profile", r"(?i)\bseccomp\b"),
        (
            "service account token",
            r"(?i)\bservice\s?account\s+tokens?\b|\bautomountServiceAccountToken\b",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| SecurityPhrase {
        name,
        pattern: Regex::new(pattern).unwrap(),
    })
    .collect()
});

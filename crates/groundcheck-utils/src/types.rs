//! Shared enums used across the groundcheck crates

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Standards body or feed a piece of evidence came from.
///
/// Rendered as the bracketed tag that prefixes findings items and reference
/// entries (`[CIS]`, `[NIST]`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SourceType {
    Cis,
    Nist,
    Enisa,
    Nsa,
    Kisa,
    Scanner,
}

impl SourceType {
    /// Static string form, matching the serialized representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cis => "CIS",
            Self::Nist => "NIST",
            Self::Enisa => "ENISA",
            Self::Nsa => "NSA",
            Self::Kisa => "KISA",
            Self::Scanner => "SCANNER",
        }
    }

    /// Bracketed tag form used in report text
    #[must_use]
    pub fn tag(&self) -> String {
        format!("[{}]", self.as_str())
    }

    /// Parse a bracketed tag such as `[CIS]`; case-insensitive
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let inner = tag.trim().strip_prefix('[')?.strip_suffix(']')?;
        Self::from_str(inner.trim()).ok()
    }
}

/// Scanner finding severity.
///
/// Declaration order is the sort order: `Critical` sorts first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    /// Lenient parse accepting scanner casing (`CRITICAL`, `high`, ...);
    /// anything unrecognized maps to `Unknown`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_str(value.trim()).unwrap_or(Self::Unknown)
    }
}

//! The per-run citation table

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use groundcheck_utils::canonicalization::digest_jcs;
use groundcheck_utils::error::{EvidenceError, GroundcheckError};
use groundcheck_utils::types::SourceType;

use crate::feeds::{EvidenceDoc, ScannerFinding};

/// Source name assigned to scanner findings in the table
const SCANNER_SOURCE: &str = "scanner";

/// One numbered, citable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceItem {
    /// Citation number, 1-based, stable for the whole run
    pub number: usize,
    pub source: String,
    pub source_id: String,
    pub source_type: SourceType,
    pub text: String,
}

/// Immutable citation table for one report run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceTable {
    items: Vec<EvidenceItem>,
}

impl EvidenceTable {
    /// Number the three feeds sequentially from 1: retrieved documents,
    /// then policy facts, then scanner findings. An item repeating an
    /// already-seen (source, ID) pair collapses to the first number.
    #[must_use]
    pub fn build(docs: &[EvidenceDoc], facts: &[EvidenceDoc], findings: &[ScannerFinding]) -> Self {
        let mut items: Vec<EvidenceItem> = Vec::new();
        let mut seen: HashMap<(String, String), usize> = HashMap::new();

        let mut insert = |source: &str, id: &str, source_type: SourceType, text: String| {
            let key = (source.to_string(), id.to_string());
            if seen.contains_key(&key) {
                return;
            }
            let number = items.len() + 1;
            seen.insert(key, number);
            items.push(EvidenceItem {
                number,
                source: source.to_string(),
                source_id: id.to_string(),
                source_type,
                text,
            });
        };

        for doc in docs.iter().chain(facts) {
            insert(&doc.source, &doc.id, doc.source_type, doc.snippet.clone());
        }
        for finding in findings {
            insert(
                SCANNER_SOURCE,
                &finding.rule_id,
                SourceType::Scanner,
                finding.evidence_text(),
            );
        }

        debug!(items = items.len(), "built evidence table");
        Self { items }
    }

    /// Resolve a citation number.
    pub fn lookup(&self, number: usize) -> Result<&EvidenceItem, EvidenceError> {
        if number == 0 || number > self.items.len() {
            return Err(EvidenceError::UnknownCitation {
                number,
                table_len: self.items.len(),
            });
        }
        Ok(&self.items[number - 1])
    }

    /// Source type of a citation, used to stamp `[CIS]`-style prefixes.
    pub fn source_type_of(&self, number: usize) -> Result<SourceType, EvidenceError> {
        self.lookup(number).map(|item| item.source_type)
    }

    /// Bracketed tag of a citation, e.g. `[NIST]`.
    pub fn tag_of(&self, number: usize) -> Result<String, EvidenceError> {
        self.source_type_of(number).map(|source_type| source_type.tag())
    }

    #[must_use]
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evidence section of the generator instruction: every item with its
    /// number, tag, origin, and text.
    #[must_use]
    pub fn context_block(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            out.push_str(&format!(
                "[{}] {} {} {}\n{}\n\n",
                item.number,
                item.source_type.tag(),
                item.source,
                item.source_id,
                item.text.trim_end()
            ));
        }
        out.trim_end().to_string()
    }

    /// Canonical digest of the table, used to assert citation determinism.
    pub fn digest(&self) -> Result<String, GroundcheckError> {
        digest_jcs(&self.items)
    }
}

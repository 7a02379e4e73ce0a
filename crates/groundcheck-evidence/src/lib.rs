//! Evidence feeds and the per-run citation table
//!
//! Three ordered feeds contribute citable items: retrieved guideline
//! documents, policy facts, and scanner findings. [`EvidenceTable::build`]
//! numbers them sequentially from 1 in that fixed order, collapsing
//! duplicates to their first number, so identical inputs always produce an
//! identical table. The table is request-scoped; nothing here persists
//! across runs.

pub mod feeds;
pub mod index;

pub use feeds::{EvidenceDoc, ScannerFinding, findings_from_trivy};
pub use index::{EvidenceItem, EvidenceTable};

//! Report structure for groundcheck
//!
//! A generated report is Markdown with five fixed sections: findings,
//! current issues, recommendation, additional guidance, references. Parsing
//! here is deliberately tolerant; it records what is present and where, and
//! [`check`] turns deviations from the contract into
//! [`Violation`](groundcheck_utils::error::Violation)s for the repair loop.
//! [`FinalReport`] renders the assembled, validated output in the same
//! shape.

pub mod format;
pub mod model;
pub mod parse;
pub mod render;

pub use format::check;
pub use model::{
    Bullet, FencedBlock, NO_CHANGE_MARKER, ParsedReport, Recommendation, Section, SectionKind,
    extract_citations,
};
pub use parse::parse_report;
pub use render::FinalReport;

//! Patch extraction, verification, and merging
//!
//! One analysis proposes one before/after pair. This crate turns those pairs
//! into [`PatchFragment`]s, proves each "before" against the manifest tree,
//! and merges all accepted fragments into a single unified patch with
//! recorded conflicts and a structural diff.

pub mod fragment;
pub mod merge;

pub use fragment::{PatchFragment, extract_fragment, verify_fragment};
pub use merge::{Conflict, MergedPatch, merge};

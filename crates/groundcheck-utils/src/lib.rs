//! Foundation utilities for groundcheck
//!
//! Shared error taxonomy, violation values, canonicalization helpers, and
//! logging setup used by every other groundcheck crate.

pub mod canonicalization;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

//! Exit code constants and error mapping for groundcheck.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `FATAL_INPUT` | Manifest or scanner report unreadable |
//! | 4 | `REJECTED` | Run rejected after exhausting repair attempts |
//! | 70 | `GENERATOR_FAILURE` | Generator invocation failed |

use crate::error::{EvidenceError, GroundcheckError, ManifestError};

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for common exit codes, or
/// [`as_i32()`](Self::as_i32) to get the numeric value for
/// `std::process::exit()`. The numeric values are part of the public API.
///
/// # Example
///
/// ```rust
/// use groundcheck_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::SUCCESS;
/// assert_eq!(code.as_i32(), 0);
///
/// assert_eq!(ExitCode::REJECTED, ExitCode::from_i32(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Fatal input - manifest or scanner report unreadable, nothing ran
    pub const FATAL_INPUT: ExitCode = ExitCode(3);

    /// Rejected - a finding exhausted its repair budget
    pub const REJECTED: ExitCode = ExitCode(4);

    /// Generator failure - the external generator could not be invoked
    pub const GENERATOR_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl GroundcheckError {
    /// Map this error to its process exit code.
    ///
    /// Fatal input errors (unparseable manifest, unreadable scanner report)
    /// get their own code so callers can distinguish "your input is broken"
    /// from "the run failed".
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            GroundcheckError::Config(_) => ExitCode::CLI_ARGS,

            GroundcheckError::Manifest(
                ManifestError::Parse { .. } | ManifestError::Structural { .. },
            ) => ExitCode::FATAL_INPUT,
            GroundcheckError::Manifest(_) => ExitCode::INTERNAL,

            GroundcheckError::Evidence(
                EvidenceError::ScannerReport { .. } | EvidenceError::Feed { .. },
            ) => ExitCode::FATAL_INPUT,
            GroundcheckError::Evidence(_) => ExitCode::INTERNAL,

            GroundcheckError::InputRead { .. } => ExitCode::FATAL_INPUT,

            GroundcheckError::Generator(_) => ExitCode::GENERATOR_FAILURE,

            GroundcheckError::Patch(_)
            | GroundcheckError::Canonicalization { .. }
            | GroundcheckError::Io(_) => ExitCode::INTERNAL,
        }
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes (BSD `sysexits.h` conventions) for every
//! entry point the bootstrap crate serves. The cron-facing tick command
//! uses its own narrower 0/1/2 contract (§6), reported directly by
//! [`crate::map_error_to_exit_code`]'s caller rather than through this
//! richer enum; `ExitCode` is for the other subcommands (rollback,
//! history, query-cache) where a finer-grained signal to the operator is
//! useful.

use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0).
    #[default]
    Success = 0,

    /// General error (1).
    Error = 1,

    /// Command line usage error (64): invalid or missing arguments.
    UsageError = 64,

    /// Data format error (65): malformed package, delta, or config.
    DataError = 65,

    /// Cannot open input (66): file not found, permission denied on input.
    NoInput = 66,

    /// Service unavailable (69): object store or registry unreachable.
    Unavailable = 69,

    /// Internal software error (70): unexpected invariant violation.
    Software = 70,

    /// I/O error (74): read/write/network I/O failure.
    IoError = 74,

    /// Temporary failure, retry (75): transient transport error exhausted
    /// its retry budget.
    TempFail = 75,

    /// Remote error in protocol (76): malformed object-store response.
    Protocol = 76,

    /// Permission denied (77): unauthorized against the object store.
    NoPerm = 77,

    /// Configuration error (78): missing or invalid `VKP_*` configuration.
    Config = 78,

    /// Interrupted by signal (SIGINT / Ctrl+C) (130).
    Interrupted = 130,

    /// Terminated by signal (SIGTERM) (143).
    Terminated = 143,
}

impl ExitCode {
    /// Convert to `i32` for use with `std::process::exit`.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Human-readable description of the exit code.
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

/// Maps a boxed error's message to an approximate [`ExitCode`], for
/// commands that surface a single terminal error rather than a tally.
pub fn map_error_to_exit_code(error: &dyn std::error::Error) -> ExitCode {
    let message = error.to_string().to_lowercase();

    if message.contains("unauthorized") || message.contains("permission") {
        ExitCode::NoPerm
    } else if message.contains("not found") {
        ExitCode::NoInput
    } else if message.contains("unreachable") || message.contains("unavailable") {
        ExitCode::Unavailable
    } else if message.contains("timeout") || message.contains("gave up") {
        ExitCode::TempFail
    } else if message.contains("seal") || message.contains("corrupt") || message.contains("malformed") {
        ExitCode::DataError
    } else if message.contains("config") {
        ExitCode::Config
    } else if message.contains("protocol") {
        ExitCode::Protocol
    } else {
        ExitCode::Error
    }
}

/// Maps a `Result` to a process exit code, success to `0`.
pub fn result_to_exit_code<T>(result: Result<T, impl std::error::Error>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::Success,
        Err(e) => map_error_to_exit_code(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_match_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Error.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn is_success_and_is_error_agree() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::Success.is_error());
        assert!(ExitCode::Error.is_error());
        assert!(!ExitCode::Error.is_success());
    }

    #[test]
    fn is_signal_flags_only_signal_codes() {
        assert!(ExitCode::Interrupted.is_signal());
        assert!(ExitCode::Terminated.is_signal());
        assert!(!ExitCode::Success.is_signal());
    }

    #[test]
    fn maps_not_found_message_to_no_input() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "key not found");
        assert_eq!(map_error_to_exit_code(&err), ExitCode::NoInput);
    }

    #[test]
    fn maps_unreachable_message_to_unavailable() {
        let err = std::io::Error::other("bucket unreachable");
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Unavailable);
    }

    #[test]
    fn display_includes_code_and_description() {
        let rendered = format!("{}", ExitCode::Config);
        assert!(rendered.contains("Configuration error"));
        assert!(rendered.contains("78"));
    }

    #[test]
    fn default_is_success() {
        assert_eq!(ExitCode::default(), ExitCode::Success);
    }
}

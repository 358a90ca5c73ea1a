// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Toolkit
//!
//! Sits **outside** the enterprise layers (domain, application,
//! infrastructure) that live in `vkp-domain` and `vkp`, and provides the
//! scaffolding every entry point needs regardless of what it's wiring up:
//!
//! - **CLI parsing** - secure argument validation ahead of the puller
//!   binary's composition root
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - graceful shutdown on SIGTERM/SIGINT/SIGHUP
//! - **Exit codes** - Unix exit code conventions for the cron entry point
//! - **Shutdown coordination** - cancellation tokens with a grace period
//!
//! This crate knows nothing about packages, triples, or versions: it has no
//! dependency on `vkp-domain` or `vkp`. The binary in `vkp` is the
//! composition root that imports both this crate and the domain/application
//! layers and wires them together.
//!
//! Configuration loading lives in `vkp::infrastructure::config` instead of
//! here, since the core's configuration surface (bucket, region, database
//! URL, cache backend, ...) is domain-specific; a generic bootstrap-layer
//! `AppConfig` would just be a second, competing source of truth.

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Parses and validates CLI arguments.
///
/// The caller is responsible for running the requested command and mapping
/// its result to a process exit code (`result_to_exit_code`, or the puller
/// tick's own 0/1/2 cron contract for `ValidatedCommand::Tick`).
///
/// # Errors
///
/// Returns `cli::ParseError` if parsing or validation fails. Clap handles
/// `--help`/`--version` itself and exits the process before returning.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "vkp")]
#[command(about = concat!("VKP Distribution Core v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Config layer name: selects `config/{env}.toml` as an override on top
    /// of `config/default.toml`, then `VKP_*` environment variables.
    #[arg(short = 'e', long, default_value = "production")]
    pub env: String,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one distribution tick: probe, enumerate, fetch, verify, install.
    ///
    /// Intended to be invoked by cron or a systemd timer. Exit code follows
    /// the cron contract: 0 on success or an offline no-op, 1 if any
    /// candidate failed, 2 if enumeration itself could not run.
    Tick,

    /// Reactivate a previously-installed version for a (subject, grade,
    /// semester) triple and flush the response cache.
    Rollback {
        /// Subject identifier, e.g. "matematika"
        #[arg(long)]
        subject: String,

        /// Grade level, 1-12
        #[arg(long)]
        grade: u8,

        /// Semester, 1 or 2
        #[arg(long)]
        semester: u8,

        /// Version to roll back to, e.g. "1.4.0"
        #[arg(long)]
        target_version: String,
    },

    /// Print the install history for a (subject, grade, semester) triple,
    /// most recent first.
    History {
        /// Subject identifier, e.g. "matematika"
        #[arg(long)]
        subject: String,

        /// Grade level, 1-12
        #[arg(long)]
        grade: u8,

        /// Semester, 1 or 2
        #[arg(long)]
        semester: u8,
    },

    /// Resolve a cache key for the active version of a triple and report
    /// whether a cached response exists.
    QueryCache {
        /// Subject identifier, e.g. "matematika"
        #[arg(long)]
        subject: String,

        /// Grade level, 1-12
        #[arg(long)]
        grade: u8,

        /// Semester, 1 or 2
        #[arg(long)]
        semester: u8,

        /// The question text to resolve a cache key for
        #[arg(long)]
        question: String,
    },
}

/// Parse CLI arguments.
///
/// Clap exits the process with a usage message if parsing fails, or prints
/// help/version and exits on `--help`/`--version`.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

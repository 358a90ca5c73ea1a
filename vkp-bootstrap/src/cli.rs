// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse()                 │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::validate()           │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration.
///
/// Holds every argument after security validation: subject/version/question
/// strings go through [`SecureArgParser::validate_argument`]; grade and
/// semester are range-checked against §3's domain (`grade ∈ [1,12]`,
/// `semester ∈ {1,2}`).
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub env: String,
}

/// Validated command variants, one per [`Commands`] subcommand.
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    /// Run one puller tick (§4.7).
    Tick,

    /// Roll a triple back to a prior installed version (§4.5).
    Rollback {
        subject: String,
        grade: u8,
        semester: u8,
        target_version: String,
    },

    /// Print a triple's install history, most recent first (§4.5).
    History {
        subject: String,
        grade: u8,
        semester: u8,
    },

    /// Resolve the query-side cache key for a question against a triple's
    /// active version (§4.9).
    QueryCache {
        subject: String,
        grade: u8,
        semester: u8,
        question: String,
    },
}

/// Parse and validate CLI arguments.
///
/// Combines clap parsing with [`SecureArgParser`] validation of every
/// user-supplied string before it reaches the composition root.
///
/// # Errors
///
/// Returns `ParseError` if any validation fails. Clap itself handles
/// `--help`/`--version` and malformed flags, exiting the process before
/// this function is reached.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

/// Validate parsed CLI arguments: dangerous-pattern and length checks on
/// every string, range checks on grade/semester.
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    SecureArgParser::validate_argument(&cli.env)?;

    let command = match cli.command {
        Commands::Tick => ValidatedCommand::Tick,
        Commands::Rollback { subject, grade, semester, target_version } => {
            SecureArgParser::validate_argument(&subject)?;
            SecureArgParser::validate_argument(&target_version)?;
            validate_grade(grade)?;
            validate_semester(semester)?;
            ValidatedCommand::Rollback { subject, grade, semester, target_version }
        }
        Commands::History { subject, grade, semester } => {
            SecureArgParser::validate_argument(&subject)?;
            validate_grade(grade)?;
            validate_semester(semester)?;
            ValidatedCommand::History { subject, grade, semester }
        }
        Commands::QueryCache { subject, grade, semester, question } => {
            SecureArgParser::validate_argument(&subject)?;
            SecureArgParser::validate_argument(&question)?;
            validate_grade(grade)?;
            validate_semester(semester)?;
            ValidatedCommand::QueryCache { subject, grade, semester, question }
        }
    };

    Ok(ValidatedCli { command, verbose: cli.verbose, env: cli.env })
}

fn validate_grade(grade: u8) -> Result<(), ParseError> {
    if !(1..=12).contains(&grade) {
        return Err(ParseError::InvalidValue {
            arg: "grade".to_string(),
            reason: "must be between 1 and 12".to_string(),
        });
    }
    Ok(())
}

fn validate_semester(semester: u8) -> Result<(), ParseError> {
    if semester != 1 && semester != 2 {
        return Err(ParseError::InvalidValue {
            arg: "semester".to_string(),
            reason: "must be 1 or 2".to_string(),
        });
    }
    Ok(())
}

/// Validates an on-disk config path, e.g. an override file passed outside
/// the `VKP_*` env layering. Not reached by any current subcommand, kept
/// for composition roots that add a `--config <path>` flag.
pub fn validate_config_path(path: &str) -> Result<PathBuf, ParseError> {
    SecureArgParser::validate_path(path)
}

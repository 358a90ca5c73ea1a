// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Version Value Object
//!
//! A semantic `MAJOR.MINOR.PATCH` version, ordered lexicographically on the
//! `(major, minor, patch)` tuple. Two packages with the same identity
//! [`Triple`] and different versions form a version line; the [`Version`]
//! decides which one is newer.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

fn version_re() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("valid regex"))
}

/// A semantic `MAJOR.MINOR.PATCH` version.
///
/// # Ordering
///
/// Ordering is lexicographic on the `(major, minor, patch)` tuple, matching
/// the registry's `compare` operation and the delta engine's
/// `new.version > old.version` precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parses a version string of the form `MAJOR.MINOR.PATCH`.
    ///
    /// # Errors
    /// Returns [`PipelineError::MalformedVersion`] if the string does not
    /// match `^\d+\.\d+\.\d+$`.
    pub fn parse(s: &str) -> Result<Self, PipelineError> {
        let caps = version_re()
            .captures(s)
            .ok_or_else(|| PipelineError::MalformedVersion(s.to_string()))?;
        let major = caps[1].parse().map_err(|_| PipelineError::MalformedVersion(s.to_string()))?;
        let minor = caps[2].parse().map_err(|_| PipelineError::MalformedVersion(s.to_string()))?;
        let patch = caps[3].parse().map_err(|_| PipelineError::MalformedVersion(s.to_string()))?;
        Ok(Self { major, minor, patch })
    }

    /// True if `s` matches the version shape, without constructing a `Version`.
    pub fn is_well_formed(s: &str) -> bool {
        version_re().is_match(s)
    }

    pub fn as_tuple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_tuple().cmp(&other.as_tuple())
    }
}

/// The identity triple `(subject, grade, semester)` naming one version line.
///
/// Two packages sharing a triple are different versions of the same
/// curriculum bundle; the [`crate::repositories::VersionRegistry`] tracks at
/// most one active version per triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub grade: u8,
    pub semester: u8,
}

impl Triple {
    pub fn new(subject: impl Into<String>, grade: u8, semester: u8) -> Result<Self, PipelineError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(PipelineError::InvalidTriple("subject must not be empty".to_string()));
        }
        if !(1..=12).contains(&grade) {
            return Err(PipelineError::InvalidTriple(format!("grade {grade} out of range [1,12]")));
        }
        if semester != 1 && semester != 2 {
            return Err(PipelineError::InvalidTriple(format!("semester {semester} not in {{1,2}}")));
        }
        Ok(Self { subject, grade, semester })
    }

    /// The vector index collection name for this triple: `{subject}_grade{grade}_sem{semester}`.
    pub fn collection_name(&self) -> String {
        format!("{}_grade{}_sem{}", self.subject, self.grade, self.semester)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/kelas_{}/sem{}", self.subject, self.grade, self.semester)
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Seal Value Object
//!
//! A checksum of the form `sha256:<64 lower-hex>`. The seal is the one
//! integrity guarantee the system makes: no encryption, no signature, just
//! a content hash over the canonical form of everything else in a package
//! (see `vkp-domain::services::checksum_service`).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

fn seal_re() -> &'static Regex {
    static SEAL_RE: OnceLock<Regex> = OnceLock::new();
    SEAL_RE.get_or_init(|| Regex::new(r"^sha256:[0-9a-f]{64}$").expect("valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seal(String);

impl Seal {
    /// Wraps a raw hex digest (without the `sha256:` prefix) into a `Seal`.
    pub fn from_hex_digest(hex_digest: impl AsRef<str>) -> Self {
        Self(format!("sha256:{}", hex_digest.as_ref()))
    }

    /// Parses and shape-validates a seal string, rule 8 of `Package::validate`.
    ///
    /// # Errors
    /// Returns [`PipelineError::MalformedChecksum`] if the string is not
    /// `sha256:` followed by exactly 64 lowercase hex characters.
    pub fn parse(s: impl Into<String>) -> Result<Self, PipelineError> {
        let s = s.into();
        if seal_re().is_match(&s) {
            Ok(Self(s))
        } else {
            Err(PipelineError::MalformedChecksum(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(s: &str) -> bool {
        seal_re().is_match(s)
    }
}

impl fmt::Display for Seal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_seal() {
        let digest = "a".repeat(64);
        let seal = Seal::from_hex_digest(&digest);
        assert!(Seal::parse(seal.as_str()).is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Seal::parse(format!("sha256:{}", "a".repeat(63))).is_err());
        assert!(Seal::parse(format!("sha256:{}", "a".repeat(65))).is_err());
    }

    #[test]
    fn rejects_wrong_prefix_or_case() {
        assert!(Seal::parse(format!("sha512:{}", "a".repeat(64))).is_err());
        assert!(Seal::parse(format!("sha256:{}", "A".repeat(64))).is_err());
    }
}

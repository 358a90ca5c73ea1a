// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Package Entity (VKP)
//!
//! The immutable, checksum-sealed bundle that moves from the cloud object
//! store to an edge node: a curriculum's chunked embeddings for one
//! `(subject, grade, semester)` version line.
//!
//! # Design Principles
//!
//! - **Immutability**: a `Package` is never mutated in place; the delta
//!   engine and codec always produce a new instance.
//! - **Self-Validation**: `validate()` runs the eight ordered rules from the
//!   package model before anything downstream trusts the data.
//! - **Value Semantics for the Seal**: two packages with byte-identical
//!   fields (including chunk order) produce byte-identical seals; see
//!   `crate::services::checksum_service`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChunkConfig, Seal, Version};
use crate::{Chunk, PipelineError};

/// Top-level JSON keys, in the canonical order mandated by §6 of the spec:
/// `checksum, chunk_config{...}, chunks[...], created_at, embedding_model,
/// grade, semester, source_files[], subject, total_chunks, version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub checksum: Seal,
    pub chunk_config: ChunkConfig,
    pub chunks: Vec<Chunk>,
    pub created_at: DateTime<Utc>,
    pub embedding_model: String,
    pub grade: u8,
    pub semester: u8,
    pub source_files: Vec<String>,
    pub subject: String,
    pub total_chunks: usize,
    #[serde(with = "version_as_string")]
    pub version: Version,
}

impl Package {
    /// Validates the package against the eight ordered rules of §4.1. The
    /// first offending rule is returned; callers get a typed failure, not
    /// just "invalid".
    ///
    /// Rule 8 (seal shape) is checked here; numeric equality of the seal to
    /// the canonical hash is `crate::services::checksum_service::verify`'s
    /// job, not this method's.
    pub fn validate(&self) -> Result<(), PipelineError> {
        // Rule 1: version shape already guaranteed by the `Version` type itself,
        // but re-assert here since a package can be hand-built without going
        // through the parser.
        if !Version::is_well_formed(&self.version.to_string()) {
            return Err(PipelineError::MalformedVersion(self.version.to_string()));
        }

        // Rule 2
        if self.subject.trim().is_empty() {
            return Err(PipelineError::ValidationError("subject must not be empty".to_string()));
        }

        // Rule 3
        if !(1..=12).contains(&self.grade) {
            return Err(PipelineError::ValidationError(format!("grade {} out of range [1,12]", self.grade)));
        }
        if self.semester != 1 && self.semester != 2 {
            return Err(PipelineError::ValidationError(format!(
                "semester {} not in {{1,2}}",
                self.semester
            )));
        }

        // Rule 4: created_at is already a parsed `DateTime<Utc>` by construction
        // (serde rejects non-ISO-8601 input at decode time), so this rule is
        // satisfied structurally once we hold a `Package` at all.

        // Rule 5: chunk_config fields are integers by type; nothing further to check.

        // Rule 6
        if self.chunks.len() != self.total_chunks {
            return Err(PipelineError::ValidationError(format!(
                "declared total_chunks {} does not match chunk count {}",
                self.total_chunks,
                self.chunks.len()
            )));
        }

        // Rule 7
        for chunk in &self.chunks {
            chunk.validate()?;
        }
        let mut seen = std::collections::HashSet::with_capacity(self.chunks.len());
        for chunk in &self.chunks {
            if !seen.insert(&chunk.chunk_id) {
                return Err(PipelineError::ValidationError(format!(
                    "duplicate chunk_id {} within package",
                    chunk.chunk_id
                )));
            }
        }

        // Rule 8
        if !Seal::is_well_formed(self.checksum.as_str()) {
            return Err(PipelineError::MalformedChecksum(self.checksum.as_str().to_string()));
        }

        Ok(())
    }

    /// The `(subject, grade, semester)` identity triple for this package.
    pub fn triple(&self) -> Result<crate::value_objects::Triple, PipelineError> {
        crate::value_objects::Triple::new(self.subject.clone(), self.grade, self.semester)
    }

    pub fn find_chunk(&self, chunk_id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }
}

mod version_as_string {
    use super::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(version: &Version, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&version.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Version, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Package {
        let chunks = vec![
            Chunk::new("c_0", "hello world", vec![0.1, 0.2]).unwrap(),
            Chunk::new("c_1", "goodbye world", vec![0.3, 0.4]).unwrap(),
        ];
        Package {
            checksum: Seal::from_hex_digest("a".repeat(64)),
            chunk_config: ChunkConfig::new(512, 64),
            chunks: chunks.clone(),
            created_at: Utc::now(),
            embedding_model: "text-embedding-3".to_string(),
            grade: 10,
            semester: 1,
            source_files: vec!["bab1.pdf".to_string()],
            subject: "matematika".to_string(),
            total_chunks: chunks.len(),
            version: Version::new(1, 0, 0),
        }
    }

    #[test]
    fn valid_package_passes() {
        assert!(sample_package().validate().is_ok());
    }

    #[test]
    fn rejects_total_chunks_mismatch() {
        let mut pkg = sample_package();
        pkg.total_chunks = 99;
        assert!(matches!(pkg.validate(), Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn rejects_grade_out_of_range() {
        let mut pkg = sample_package();
        pkg.grade = 13;
        assert!(pkg.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_chunk_ids() {
        let mut pkg = sample_package();
        pkg.chunks.push(pkg.chunks[0].clone());
        pkg.total_chunks = pkg.chunks.len();
        assert!(pkg.validate().is_err());
    }

    #[test]
    fn rejects_malformed_checksum_shape() {
        let mut pkg = sample_package();
        pkg.checksum = Seal::from_hex_digest("not-hex");
        assert!(matches!(pkg.validate(), Err(PipelineError::MalformedChecksum(_))));
    }
}

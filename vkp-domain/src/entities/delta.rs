// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Delta Entity
//!
//! A change set from a base version to a target version over a fixed
//! identity triple, produced by [`crate::services::delta_service::diff`] and
//! consumed by [`crate::services::delta_service::apply`].

use serde::{Deserialize, Serialize};

use crate::value_objects::{ChunkConfig, Version};
use crate::Chunk;

/// Provenance carried by a delta for the *target* version, mirrored onto the
/// reconstructed package when the delta is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaMetadata {
    pub chunk_config: ChunkConfig,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub embedding_model: String,
    pub source_files: Vec<String>,
    pub total_chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub added_chunks: Vec<Chunk>,
    #[serde(with = "version_as_string")]
    pub base_version: Version,
    pub grade: u8,
    pub metadata: DeltaMetadata,
    pub removed_chunk_ids: Vec<String>,
    pub semester: u8,
    pub subject: String,
    #[serde(with = "version_as_string")]
    pub version: Version,
}

impl Delta {
    /// All chunks this delta introduces or overwrites (added ∪ modified, per
    /// §3's classification — the wire schema calls this field
    /// `added_chunks` but it carries both).
    pub fn present_chunks(&self) -> &[Chunk] {
        &self.added_chunks
    }

    pub fn triple(&self) -> Result<crate::value_objects::Triple, crate::PipelineError> {
        crate::value_objects::Triple::new(self.subject.clone(), self.grade, self.semester)
    }
}

mod version_as_string {
    use crate::value_objects::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(version: &Version, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&version.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Version, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

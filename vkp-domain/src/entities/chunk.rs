// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Entity
//!
//! The atomic unit of content carried by a [`crate::entities::Package`].
//!
//! # Developer Notes
//! - Identity is the producer-chosen `chunk_id`, not a generated UUID: the
//!   delta engine classifies chunks across versions by this id.
//! - Two chunks are *equal* (for delta purposes) iff `chunk_id`, `text`, and
//!   `vector` all match; metadata differences never count as a modification
//!   (`payload_eq` below implements this, `PartialEq` implements full
//!   structural equality for round-trip assertions).
pub use crate::value_objects::ChunkMetadata;

use serde::{Deserialize, Serialize};

use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
    pub embedding: Vec<f64>,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Validates a single chunk: non-empty id, non-empty text, non-empty vector.
    pub fn new(chunk_id: impl Into<String>, text: impl Into<String>, embedding: Vec<f64>) -> Result<Self, PipelineError> {
        let chunk = Self {
            chunk_id: chunk_id.into(),
            text: text.into(),
            embedding,
            metadata: ChunkMetadata::default(),
        };
        chunk.validate()?;
        Ok(chunk)
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Rule 7 of `Package::validate`, applied per chunk.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_id.trim().is_empty() {
            return Err(PipelineError::EmptyChunkField("chunk_id must not be empty".to_string()));
        }
        if self.text.is_empty() {
            return Err(PipelineError::EmptyChunkField(format!(
                "chunk {} has empty text",
                self.chunk_id
            )));
        }
        if self.embedding.is_empty() {
            return Err(PipelineError::EmptyChunkField(format!(
                "chunk {} has empty embedding vector",
                self.chunk_id
            )));
        }
        Ok(())
    }

    /// Payload equality per §3: `chunk_id`, `text`, and `vector` all equal.
    /// Metadata differences do not count as a modification.
    pub fn payload_eq(&self, other: &Chunk) -> bool {
        self.chunk_id == other.chunk_id && self.text == other.text && self.embedding == other.embedding
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vector Index Adapter Port
//!
//! Repository interface for ingesting chunks into a named vector collection
//! (C8). Upserts are idempotent; the spec's chosen strategy for delta-apply
//! removals is a *union* — stale chunks are allowed to linger, because the
//! registry alone gates which version's chunks the query plane consults, so
//! `remove` exists for completeness but is not required on the delta path.

use async_trait::async_trait;

use crate::entities::ChunkMetadata;
use crate::PipelineError;

#[async_trait]
pub trait VectorIndexAdapter: Send + Sync {
    /// Idempotent upsert: a repeated id overwrites the prior entry.
    async fn upsert_collection(
        &self,
        name: &str,
        ids: &[String],
        texts: &[String],
        vectors: &[Vec<f64>],
        metadatas: &[ChunkMetadata],
    ) -> Result<(), PipelineError>;

    async fn remove(&self, name: &str, ids: &[String]) -> Result<(), PipelineError>;

    /// Number of chunks currently stored in the named collection (used by
    /// seed-test assertions; not part of the production query path).
    async fn count(&self, name: &str) -> Result<usize, PipelineError>;
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Object-Store Client Port
//!
//! Repository interface for the remote namespace (C6): listing, head, and
//! ranged/full GET of packages and deltas. The concrete implementation in
//! `vkp::infrastructure::object_store` talks to an S3-compatible bucket over
//! HTTP and owns the retry/backoff policy described in §4.6; this trait
//! exposes only the already-retried outcome.

use async_trait::async_trait;

use crate::PipelineError;

/// One entry from a bucket listing: a key plus its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectListing {
    pub key: String,
    pub size: u64,
}

#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Flat listing of every object under the bucket.
    async fn list_all(&self) -> Result<Vec<ObjectListing>, PipelineError>;

    /// Existence/metadata check without transferring the body.
    async fn head(&self, key: &str) -> Result<Option<ObjectListing>, PipelineError>;

    /// Fetches the full object body.
    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError>;

    /// Fetches the object body starting at byte `start`, for resumable reads.
    async fn get_range(&self, key: &str, start: u64) -> Result<Vec<u8>, PipelineError>;
}

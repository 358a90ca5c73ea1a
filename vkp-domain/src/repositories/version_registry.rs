// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Version Registry Port
//!
//! Repository interface for the per-triple version history and active-version
//! election (C5). The concrete implementation lives in
//! `vkp::infrastructure::registry` and is backed by SQLite via `sqlx`; this
//! trait keeps the puller state machine free of any storage-technology
//! dependency.
//!
//! # Concurrency
//!
//! Implementations must run `register` and `rollback` as a single
//! transaction: clearing `active` across a triple and setting it on one
//! entry must be atomic, so a concurrent reader never observes a moment
//! with zero active entries for a triple that has one.

use async_trait::async_trait;

use crate::entities::RegistryEntry;
use crate::value_objects::{Seal, Triple, Version};
use crate::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering3 {
    Lt,
    Eq,
    Gt,
}

#[async_trait]
pub trait VersionRegistry: Send + Sync {
    /// Atomically clears `active` across `triple`, then upserts
    /// `(triple, version)` as the active entry, preserving the install
    /// timestamp if the entry already existed.
    async fn register(
        &self,
        triple: &Triple,
        version: Version,
        chunk_count: usize,
        checksum: Seal,
    ) -> Result<(), PipelineError>;

    /// The version of the unique active entry for `triple`, if any.
    async fn installed(&self, triple: &Triple) -> Result<Option<Version>, PipelineError>;

    /// Most-recent-first history for `triple`.
    async fn history(&self, triple: &Triple) -> Result<Vec<RegistryEntry>, PipelineError>;

    /// Atomically clears `active` across `triple` and sets it on
    /// `(triple, target_version)`. Fails with `PipelineError::NotFound` if
    /// no such entry exists. Does not change the install timestamp.
    async fn rollback(&self, triple: &Triple, target_version: Version) -> Result<(), PipelineError>;

    /// Tuple-lexicographic comparison, exposed for callers that only hold
    /// version strings (e.g. the CLI).
    fn compare(&self, v1: Version, v2: Version) -> Ordering3 {
        match v1.cmp(&v2) {
            std::cmp::Ordering::Less => Ordering3::Lt,
            std::cmp::Ordering::Equal => Ordering3::Eq,
            std::cmp::Ordering::Greater => Ordering3::Gt,
        }
    }
}

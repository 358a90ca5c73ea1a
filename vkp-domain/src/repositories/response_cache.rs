// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Response Cache Port
//!
//! Repository interface for the query-side response cache (C9). Two
//! interchangeable backends implement this trait in
//! `vkp::infrastructure::cache`: a Redis-backed remote cache and an
//! in-process LRU cache, selected at startup by whether `redis_url` is
//! configured.
//!
//! Key derivation (`key_of`) is a pure function of `(question, subject,
//! version)`, defined once here so both backends, and every caller, derive
//! identical keys for identical inputs.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::PipelineError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Lower-cases and trims surrounding whitespace, per §4.9.
pub fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

/// `key_of(question, subject, version) = "resp:" + hex(sha256(normalize(question) ⊕ subject ⊕ version))`.
///
/// The `resp:` prefix is the response scope (§9's "open question"
/// resolution): the whole prefix is what `delete_matching` flushes on every
/// successful registration, since the hash itself does not admit
/// subject-scoped prefix matching.
pub fn key_of(question: &str, subject_id: &str, version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(question).as_bytes());
    hasher.update(b"\0");
    hasher.update(subject_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(version.as_bytes());
    format!("resp:{:x}", hasher.finalize())
}

/// The response-scope prefix pattern passed to `delete_matching` after every
/// successful `VersionRegistry::register`.
pub const RESPONSE_SCOPE_PATTERN: &str = "resp:*";

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError>;

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), PipelineError>;

    async fn delete(&self, key: &str) -> Result<(), PipelineError>;

    /// Deletes every key matching `pattern` (a `*`-suffixed prefix, e.g.
    /// `"resp:*"`).
    async fn delete_matching(&self, pattern: &str) -> Result<u64, PipelineError>;

    async fn stats(&self) -> Result<CacheStats, PipelineError>;

    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_invariant_same_inputs_same_key() {
        let a = key_of("What is 2+2?", "matematika", "1.0.0");
        let b = key_of("  What is 2+2?  ", "matematika", "1.0.0");
        assert_eq!(a, b, "normalization should make equivalent questions collide");
    }

    #[test]
    fn key_changes_with_subject_or_version() {
        let base = key_of("What is 2+2?", "matematika", "1.0.0");
        let diff_subject = key_of("What is 2+2?", "fisika", "1.0.0");
        let diff_version = key_of("What is 2+2?", "matematika", "1.1.0");
        assert_ne!(base, diff_subject);
        assert_ne!(base, diff_version);
    }

    #[test]
    fn keys_share_the_response_scope_prefix() {
        let key = key_of("q", "s", "1.0.0");
        assert!(key.starts_with("resp:"));
    }
}

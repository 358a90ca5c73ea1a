// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Query-path helper that resolves a response-cache key against the
//! registry's currently active version, so callers never have to thread a
//! version string through by hand.

use vkp_domain::repositories::{key_of, VersionRegistry};
use vkp_domain::{PipelineError, Triple};

/// Resolves `(question, triple)` to a response-cache key keyed by the
/// triple's *currently active* version. Returns `None` when nothing is
/// installed for the triple yet (nothing to serve from cache either way).
pub async fn resolve_cache_key(
    registry: &dyn VersionRegistry,
    question: &str,
    triple: &Triple,
) -> Result<Option<String>, PipelineError> {
    let active = registry.installed(triple).await?;
    Ok(active.map(|version| key_of(question, &triple.subject, &version.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry::schema;
    use crate::infrastructure::registry::SqliteVersionRegistry;
    use tempfile::NamedTempFile;
    use vkp_domain::{Seal, Version};

    async fn registry() -> SqliteVersionRegistry {
        let temp = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite://{}", temp.path().to_str().unwrap());
        drop(temp);
        let pool = schema::initialize_database(&db_url).await.unwrap();
        SqliteVersionRegistry::new(pool)
    }

    #[tokio::test]
    async fn resolves_none_when_nothing_installed() {
        let registry = registry().await;
        let triple = Triple::new("matematika", 10, 1).unwrap();
        let key = resolve_cache_key(&registry, "2+2?", &triple).await.unwrap();
        assert_eq!(key, None);
    }

    #[tokio::test]
    async fn resolves_key_scoped_to_active_version() {
        let registry = registry().await;
        let triple = Triple::new("matematika", 10, 1).unwrap();
        registry
            .register(&triple, Version::new(1, 0, 0), 3, Seal::from_hex_digest("a".repeat(64)))
            .await
            .unwrap();

        let key = resolve_cache_key(&registry, "2+2?", &triple).await.unwrap();
        assert!(key.unwrap().starts_with("resp:"));
    }
}

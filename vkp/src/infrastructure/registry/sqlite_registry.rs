// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Version Registry
//!
//! `VersionRegistry` implementation backed by the `vkp_versions` table.
//! `register` and `rollback` both run as a single `sqlx` transaction so the
//! "clear active, set active" sequence is atomic: a failed transaction
//! leaves the table byte-identical to its pre-call state (§8.8), and a
//! concurrent reader never observes a triple with zero active rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use vkp_domain::repositories::VersionRegistry;
use vkp_domain::{PipelineError, RegistryEntry, Seal, Triple, Version};

pub struct SqliteVersionRegistry {
    pool: SqlitePool,
}

impl SqliteVersionRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_sqlx_err(context: &str, err: sqlx::Error) -> PipelineError {
        PipelineError::RegistryConflict(format!("{context}: {err}"))
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<RegistryEntry, PipelineError> {
        let subject: String = row.try_get("subject").map_err(|e| Self::map_sqlx_err("subject", e))?;
        let grade: i64 = row.try_get("grade").map_err(|e| Self::map_sqlx_err("grade", e))?;
        let semester: i64 = row.try_get("semester").map_err(|e| Self::map_sqlx_err("semester", e))?;
        let version: String = row.try_get("version").map_err(|e| Self::map_sqlx_err("version", e))?;
        let installed_at: String = row
            .try_get("installed_at")
            .map_err(|e| Self::map_sqlx_err("installed_at", e))?;
        let chunk_count: i64 = row
            .try_get("chunk_count")
            .map_err(|e| Self::map_sqlx_err("chunk_count", e))?;
        let checksum: String = row.try_get("checksum").map_err(|e| Self::map_sqlx_err("checksum", e))?;
        let is_active: i64 = row.try_get("is_active").map_err(|e| Self::map_sqlx_err("is_active", e))?;

        Ok(RegistryEntry {
            triple: Triple::new(subject, grade as u8, semester as u8)?,
            version: Version::parse(&version)?,
            installed_at: installed_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| PipelineError::InternalError(format!("bad installed_at timestamp: {e}")))?,
            chunk_count: chunk_count as usize,
            checksum: Seal::parse(checksum)?,
            active: is_active != 0,
        })
    }
}

#[async_trait]
impl VersionRegistry for SqliteVersionRegistry {
    async fn register(
        &self,
        triple: &Triple,
        version: Version,
        chunk_count: usize,
        checksum: Seal,
    ) -> Result<(), PipelineError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::map_sqlx_err("begin register tx", e))?;

        sqlx::query(
            "UPDATE vkp_versions SET is_active = 0 WHERE subject = ? AND grade = ? AND semester = ?",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_sqlx_err("clear active", e))?;

        let version_str = version.to_string();
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT installed_at FROM vkp_versions WHERE subject = ? AND grade = ? AND semester = ? AND version = ?",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .bind(&version_str)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Self::map_sqlx_err("lookup existing entry", e))?;

        let checksum_str = checksum.as_str().to_string();
        match existing {
            Some(_) => {
                sqlx::query(
                    "UPDATE vkp_versions SET chunk_count = ?, checksum = ?, is_active = 1 \
                     WHERE subject = ? AND grade = ? AND semester = ? AND version = ?",
                )
                .bind(chunk_count as i64)
                .bind(&checksum_str)
                .bind(&triple.subject)
                .bind(triple.grade as i64)
                .bind(triple.semester as i64)
                .bind(&version_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| Self::map_sqlx_err("upsert (update)", e))?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO vkp_versions \
                     (subject, grade, semester, version, installed_at, chunk_count, checksum, is_active) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, 1)",
                )
                .bind(&triple.subject)
                .bind(triple.grade as i64)
                .bind(triple.semester as i64)
                .bind(&version_str)
                .bind(Utc::now().to_rfc3339())
                .bind(chunk_count as i64)
                .bind(&checksum_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| Self::map_sqlx_err("upsert (insert)", e))?;
            }
        }

        tx.commit().await.map_err(|e| Self::map_sqlx_err("commit register tx", e))?;
        Ok(())
    }

    async fn installed(&self, triple: &Triple) -> Result<Option<Version>, PipelineError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT version FROM vkp_versions WHERE subject = ? AND grade = ? AND semester = ? AND is_active = 1",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_sqlx_err("installed", e))?;

        row.map(|(v,)| Version::parse(&v)).transpose()
    }

    async fn history(&self, triple: &Triple) -> Result<Vec<RegistryEntry>, PipelineError> {
        let rows = sqlx::query(
            "SELECT subject, grade, semester, version, installed_at, chunk_count, checksum, is_active \
             FROM vkp_versions WHERE subject = ? AND grade = ? AND semester = ? \
             ORDER BY installed_at DESC",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::map_sqlx_err("history", e))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn rollback(&self, triple: &Triple, target_version: Version) -> Result<(), PipelineError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::map_sqlx_err("begin rollback tx", e))?;

        let target_str = target_version.to_string();
        let exists: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM vkp_versions WHERE subject = ? AND grade = ? AND semester = ? AND version = ?",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .bind(&target_str)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Self::map_sqlx_err("check target exists", e))?;

        if exists.is_none() {
            // Rolling back, not commit: transaction drops and rolls back on scope exit.
            return Err(PipelineError::not_found(format!(
                "no entry for {triple} at version {target_version}"
            )));
        }

        sqlx::query("UPDATE vkp_versions SET is_active = 0 WHERE subject = ? AND grade = ? AND semester = ?")
            .bind(&triple.subject)
            .bind(triple.grade as i64)
            .bind(triple.semester as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_sqlx_err("clear active", e))?;

        sqlx::query(
            "UPDATE vkp_versions SET is_active = 1 \
             WHERE subject = ? AND grade = ? AND semester = ? AND version = ?",
        )
        .bind(&triple.subject)
        .bind(triple.grade as i64)
        .bind(triple.semester as i64)
        .bind(&target_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_sqlx_err("set active", e))?;

        tx.commit().await.map_err(|e| Self::map_sqlx_err("commit rollback tx", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry::schema;
    use tempfile::NamedTempFile;

    async fn test_pool() -> SqlitePool {
        let temp = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite://{}", temp.path().to_str().unwrap());
        drop(temp);
        schema::initialize_database(&db_url).await.unwrap()
    }

    #[tokio::test]
    async fn register_activates_and_history_is_most_recent_first() {
        let pool = test_pool().await;
        let registry = SqliteVersionRegistry::new(pool);
        let triple = Triple::new("matematika", 10, 1).unwrap();

        registry
            .register(&triple, Version::new(1, 0, 0), 3, Seal::from_hex_digest("a".repeat(64)))
            .await
            .unwrap();
        assert_eq!(registry.installed(&triple).await.unwrap(), Some(Version::new(1, 0, 0)));

        registry
            .register(&triple, Version::new(1, 1, 0), 5, Seal::from_hex_digest("b".repeat(64)))
            .await
            .unwrap();
        assert_eq!(registry.installed(&triple).await.unwrap(), Some(Version::new(1, 1, 0)));

        let history = registry.history(&triple).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].active);
        assert_eq!(history[0].version, Version::new(1, 1, 0));
        assert!(!history[1].active);
    }

    #[tokio::test]
    async fn at_most_one_active_entry_per_triple() {
        let pool = test_pool().await;
        let registry = SqliteVersionRegistry::new(pool);
        let triple = Triple::new("matematika", 10, 1).unwrap();

        for v in [(1, 0, 0), (1, 1, 0), (1, 2, 0)] {
            registry
                .register(&triple, Version::new(v.0, v.1, v.2), 1, Seal::from_hex_digest("a".repeat(64)))
                .await
                .unwrap();
        }

        let history = registry.history(&triple).await.unwrap();
        let active_count = history.iter().filter(|e| e.active).count();
        assert_eq!(active_count, 1);
    }

    #[tokio::test]
    async fn rollback_reactivates_prior_version() {
        let pool = test_pool().await;
        let registry = SqliteVersionRegistry::new(pool);
        let triple = Triple::new("matematika", 10, 1).unwrap();

        registry
            .register(&triple, Version::new(1, 0, 0), 3, Seal::from_hex_digest("a".repeat(64)))
            .await
            .unwrap();
        registry
            .register(&triple, Version::new(1, 1, 0), 5, Seal::from_hex_digest("b".repeat(64)))
            .await
            .unwrap();

        registry.rollback(&triple, Version::new(1, 0, 0)).await.unwrap();
        assert_eq!(registry.installed(&triple).await.unwrap(), Some(Version::new(1, 0, 0)));

        let history = registry.history(&triple).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().filter(|e| e.active).count(), 1);
    }

    #[tokio::test]
    async fn rollback_to_missing_version_is_not_found_and_untouched() {
        let pool = test_pool().await;
        let registry = SqliteVersionRegistry::new(pool);
        let triple = Triple::new("matematika", 10, 1).unwrap();
        registry
            .register(&triple, Version::new(1, 0, 0), 3, Seal::from_hex_digest("a".repeat(64)))
            .await
            .unwrap();

        let result = registry.rollback(&triple, Version::new(9, 9, 9)).await;
        assert!(matches!(result, Err(PipelineError::NotFound(_))));
        assert_eq!(registry.installed(&triple).await.unwrap(), Some(Version::new(1, 0, 0)));
    }
}

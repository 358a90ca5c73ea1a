// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! File-backed `VectorIndexAdapter`: one JSON-lines file per collection under
//! `persist_dir`. This is the edge-node's local vector store — no external
//! vector database dependency is assumed (none of the retrieved corpus
//! carries one the teacher uses, so the simplest persistent structure that
//! satisfies the upsert/remove/count contract is used).
//!
//! Single-writer-per-collection (§5) is enforced with a `parking_lot::Mutex`
//! keyed by collection name; readers are unbounded because each read opens
//! its own file handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use vkp_domain::entities::ChunkMetadata;
use vkp_domain::repositories::VectorIndexAdapter;
use vkp_domain::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    id: String,
    text: String,
    vector: Vec<f64>,
    metadata: ChunkMetadata,
}

pub struct FileVectorIndex {
    root: PathBuf,
    locks: Mutex<HashMap<String, ()>>,
}

impl FileVectorIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), locks: Mutex::new(HashMap::new()) }
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.jsonl"))
    }

    fn read_all(path: &Path) -> Result<Vec<StoredChunk>, PipelineError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path)?;
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<StoredChunk>(line)
                    .map_err(|e| PipelineError::SerializationError(format!("corrupt vector index record: {e}")))
            })
            .collect()
    }

    fn write_all(path: &Path, chunks: &[StoredChunk]) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut body = String::new();
        for chunk in chunks {
            body.push_str(&serde_json::to_string(chunk)?);
            body.push('\n');
        }
        std::fs::write(path, body)?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndexAdapter for FileVectorIndex {
    async fn upsert_collection(
        &self,
        name: &str,
        ids: &[String],
        texts: &[String],
        vectors: &[Vec<f64>],
        metadatas: &[ChunkMetadata],
    ) -> Result<(), PipelineError> {
        if ids.len() != texts.len() || ids.len() != vectors.len() || ids.len() != metadatas.len() {
            return Err(PipelineError::validation(
                "upsert_collection: ids/texts/vectors/metadatas length mismatch",
            ));
        }

        let path = self.collection_path(name);
        let _guard = self.locks.lock();

        let mut existing = Self::read_all(&path)?;
        let mut by_id: HashMap<String, usize> =
            existing.iter().enumerate().map(|(i, c)| (c.id.clone(), i)).collect();

        for i in 0..ids.len() {
            let record = StoredChunk {
                id: ids[i].clone(),
                text: texts[i].clone(),
                vector: vectors[i].clone(),
                metadata: metadatas[i].clone(),
            };
            if let Some(&pos) = by_id.get(&ids[i]) {
                existing[pos] = record;
            } else {
                by_id.insert(ids[i].clone(), existing.len());
                existing.push(record);
            }
        }

        Self::write_all(&path, &existing)
    }

    async fn remove(&self, name: &str, ids: &[String]) -> Result<(), PipelineError> {
        let path = self.collection_path(name);
        let _guard = self.locks.lock();

        let existing = Self::read_all(&path)?;
        let retained: Vec<StoredChunk> =
            existing.into_iter().filter(|c| !ids.contains(&c.id)).collect();
        Self::write_all(&path, &retained)
    }

    async fn count(&self, name: &str) -> Result<usize, PipelineError> {
        let path = self.collection_path(name);
        Ok(Self::read_all(&path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta() -> ChunkMetadata {
        ChunkMetadata::new()
    }

    #[tokio::test]
    async fn upsert_then_count_round_trips() {
        let dir = TempDir::new().unwrap();
        let index = FileVectorIndex::new(dir.path());

        index
            .upsert_collection(
                "matematika_grade10_sem1",
                &["c1".to_string(), "c2".to_string()],
                &["text one".to_string(), "text two".to_string()],
                &[vec![0.1, 0.2], vec![0.3, 0.4]],
                &[meta(), meta()],
            )
            .await
            .unwrap();

        assert_eq!(index.count("matematika_grade10_sem1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_repeated_id() {
        let dir = TempDir::new().unwrap();
        let index = FileVectorIndex::new(dir.path());

        index
            .upsert_collection(
                "c",
                &["c1".to_string()],
                &["v1".to_string()],
                &[vec![0.1]],
                &[meta()],
            )
            .await
            .unwrap();
        index
            .upsert_collection(
                "c",
                &["c1".to_string()],
                &["v2".to_string()],
                &[vec![0.2]],
                &[meta()],
            )
            .await
            .unwrap();

        assert_eq!(index.count("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_drops_named_ids_only() {
        let dir = TempDir::new().unwrap();
        let index = FileVectorIndex::new(dir.path());

        index
            .upsert_collection(
                "c",
                &["c1".to_string(), "c2".to_string()],
                &["t1".to_string(), "t2".to_string()],
                &[vec![0.1], vec![0.2]],
                &[meta(), meta()],
            )
            .await
            .unwrap();

        index.remove("c", &["c1".to_string()]).await.unwrap();
        assert_eq!(index.count("c").await.unwrap(), 1);
    }
}

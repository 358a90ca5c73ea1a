// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory `VectorIndexAdapter` test double. Used by puller integration
//! tests so they don't need a filesystem fixture to exercise install logic.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use vkp_domain::entities::ChunkMetadata;
use vkp_domain::repositories::VectorIndexAdapter;
use vkp_domain::PipelineError;

#[derive(Debug, Clone)]
struct StoredChunk {
    text: String,
    vector: Vec<f64>,
    metadata: ChunkMetadata,
}

#[derive(Default)]
pub struct InMemoryVectorIndex {
    collections: Mutex<HashMap<String, HashMap<String, StoredChunk>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndexAdapter for InMemoryVectorIndex {
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
        let mut collections = self.collections.lock();
        let collection = collections.entry(name.to_string()).or_default();
        for i in 0..ids.len() {
            collection.insert(
                ids[i].clone(),
                StoredChunk { text: texts[i].clone(), vector: vectors[i].clone(), metadata: metadatas[i].clone() },
            );
        }
        Ok(())
    }

    async fn remove(&self, name: &str, ids: &[String]) -> Result<(), PipelineError> {
        let mut collections = self.collections.lock();
        if let Some(collection) = collections.get_mut(name) {
            for id in ids {
                collection.remove(id);
            }
        }
        Ok(())
    }

    async fn count(&self, name: &str) -> Result<usize, PipelineError> {
        Ok(self.collections.lock().get(name).map(|c| c.len()).unwrap_or(0))
    }
}

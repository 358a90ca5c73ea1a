// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Delta Engine
//!
//! Computes and applies chunk-level diffs between two versions of a package
//! over the same identity triple, so an edge node can move from `V` to `V′`
//! by transferring only the chunks that changed.

use std::collections::HashMap;

use crate::entities::{Chunk, Delta, DeltaMetadata, Package};
use crate::services::checksum_service;
use crate::PipelineError;

/// Observability for the bandwidth property: `diff.encoded_len <<
/// full.encoded_len` when the symmetric difference is small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReduction {
    pub full_bytes: usize,
    pub delta_bytes: usize,
}

impl SizeReduction {
    /// `delta_bytes / full_bytes`, as a ratio in `[0.0, 1.0]` (lower is better).
    pub fn ratio(&self) -> f64 {
        if self.full_bytes == 0 {
            0.0
        } else {
            self.delta_bytes as f64 / self.full_bytes as f64
        }
    }
}

/// `diff(old, new) -> Delta`.
///
/// Requires identical triples and `new.version > old.version`; otherwise
/// fails with [`PipelineError::IncompatibleDiff`].
pub fn diff(old: &Package, new: &Package) -> Result<Delta, PipelineError> {
    let old_triple = old.triple()?;
    let new_triple = new.triple()?;
    if old_triple != new_triple {
        return Err(PipelineError::incompatible_diff(format!(
            "triple mismatch: {old_triple} vs {new_triple}"
        )));
    }
    if !(new.version > old.version) {
        return Err(PipelineError::incompatible_diff(format!(
            "new version {} is not greater than old version {}",
            new.version, old.version
        )));
    }

    let old_by_id: HashMap<&str, &Chunk> = old.chunks.iter().map(|c| (c.chunk_id.as_str(), c)).collect();
    let new_by_id: HashMap<&str, &Chunk> = new.chunks.iter().map(|c| (c.chunk_id.as_str(), c)).collect();

    let mut present_chunks = Vec::new();
    // Added or modified: present in new, classified against old.
    for chunk in &new.chunks {
        match old_by_id.get(chunk.chunk_id.as_str()) {
            None => present_chunks.push(chunk.clone()), // added
            Some(old_chunk) => {
                if !old_chunk.payload_eq(chunk) {
                    present_chunks.push(chunk.clone()); // modified
                }
                // identical payload: omitted
            }
        }
    }

    // Removed: present in old, absent from new.
    let removed_chunk_ids: Vec<String> = old
        .chunks
        .iter()
        .filter(|c| !new_by_id.contains_key(c.chunk_id.as_str()))
        .map(|c| c.chunk_id.clone())
        .collect();

    Ok(Delta {
        added_chunks: present_chunks,
        base_version: old.version,
        grade: new.grade,
        metadata: DeltaMetadata {
            chunk_config: new.chunk_config,
            created_at: new.created_at,
            embedding_model: new.embedding_model.clone(),
            source_files: new.source_files.clone(),
            total_chunks: new.total_chunks,
        },
        removed_chunk_ids,
        semester: new.semester,
        subject: new.subject.clone(),
        version: new.version,
    })
}

/// `apply(old, delta) -> new`.
///
/// Requires `old.version == delta.base_version` and identical triples;
/// otherwise fails with [`PipelineError::DeltaBaseMismatch`]. The result is
/// sealed and must pass `checksum_service::verify`.
pub fn apply(old: &Package, delta: &Delta) -> Result<Package, PipelineError> {
    let old_triple = old.triple()?;
    let delta_triple = delta.triple()?;
    if old_triple != delta_triple {
        return Err(PipelineError::delta_base_mismatch(format!(
            "triple mismatch: {old_triple} vs {delta_triple}"
        )));
    }
    if old.version != delta.base_version {
        return Err(PipelineError::delta_base_mismatch(format!(
            "package is at {} but delta's base is {}",
            old.version, delta.base_version
        )));
    }

    let removed: std::collections::HashSet<&str> = delta.removed_chunk_ids.iter().map(String::as_str).collect();
    let mut by_id: HashMap<String, Chunk> = old
        .chunks
        .iter()
        .filter(|c| !removed.contains(c.chunk_id.as_str()))
        .map(|c| (c.chunk_id.clone(), c.clone()))
        .collect();

    // Upsert present chunks, preserving the target's chunk ordering: new
    // chunks appended in delta order, existing ids keep the base ordering
    // but with refreshed payloads.
    let mut order: Vec<String> = old
        .chunks
        .iter()
        .filter(|c| !removed.contains(c.chunk_id.as_str()))
        .map(|c| c.chunk_id.clone())
        .collect();

    for chunk in &delta.added_chunks {
        if !by_id.contains_key(&chunk.chunk_id) {
            order.push(chunk.chunk_id.clone());
        }
        by_id.insert(chunk.chunk_id.clone(), chunk.clone());
    }

    let chunks: Vec<Chunk> = order.into_iter().map(|id| by_id.remove(&id).expect("id from order")).collect();

    let unsealed = Package {
        checksum: old.checksum.clone(), // placeholder, replaced by `sealed` below
        chunk_config: delta.metadata.chunk_config,
        total_chunks: chunks.len(),
        chunks,
        created_at: delta.metadata.created_at,
        embedding_model: delta.metadata.embedding_model.clone(),
        grade: delta.grade,
        semester: delta.semester,
        source_files: delta.metadata.source_files.clone(),
        subject: delta.subject.clone(),
        version: delta.version,
    };

    checksum_service::sealed(unsealed)
}

/// Exposes the full-vs-delta size difference for observability, per §4.4's
/// bandwidth property.
pub fn size_reduction(old: &Package, new: &Package) -> Result<SizeReduction, PipelineError> {
    let delta = diff(old, new)?;
    let full_bytes = serde_json::to_vec(new)?.len();
    let delta_bytes = serde_json::to_vec(&delta)?.len();
    Ok(SizeReduction { full_bytes, delta_bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Chunk;
    use crate::value_objects::{ChunkConfig, Version};
    use chrono::Utc;

    fn pkg(version: Version, chunks: Vec<Chunk>) -> Package {
        let pkg = Package {
            checksum: crate::value_objects::Seal::from_hex_digest("0".repeat(64)),
            chunk_config: ChunkConfig::new(512, 64),
            total_chunks: chunks.len(),
            chunks,
            created_at: Utc::now(),
            embedding_model: "text-embedding-3".to_string(),
            grade: 10,
            semester: 1,
            source_files: vec!["bab1.pdf".to_string()],
            subject: "matematika".to_string(),
            version,
        };
        checksum_service::sealed(pkg).unwrap()
    }

    fn c(id: &str, text: &str) -> Chunk {
        Chunk::new(id, text, vec![0.1, 0.2]).unwrap()
    }

    #[test]
    fn diff_classifies_added_modified_removed() {
        let old = pkg(Version::new(1, 0, 0), vec![c("c_0", "a"), c("c_1", "b"), c("c_2", "c")]);
        let new = pkg(
            Version::new(1, 1, 0),
            vec![c("c_0", "a"), c("c_1", "b-modified"), c("c_3", "d")],
        );
        let delta = diff(&old, &new).unwrap();
        let present_ids: Vec<_> = delta.added_chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert!(present_ids.contains(&"c_1")); // modified
        assert!(present_ids.contains(&"c_3")); // added
        assert!(!present_ids.contains(&"c_0")); // unchanged, omitted
        assert_eq!(delta.removed_chunk_ids, vec!["c_2".to_string()]);
    }

    #[test]
    fn diff_locality_matches_symmetric_difference() {
        let old = pkg(Version::new(1, 0, 0), vec![c("c_0", "a"), c("c_1", "b"), c("c_2", "c")]);
        let new = pkg(
            Version::new(1, 1, 0),
            vec![c("c_0", "a"), c("c_1", "b-modified"), c("c_3", "d")],
        );
        let delta = diff(&old, &new).unwrap();
        // k = 3: c_1 modified, c_3 added, c_2 removed.
        assert_eq!(delta.added_chunks.len() + delta.removed_chunk_ids.len(), 3);
    }

    #[test]
    fn diff_rejects_non_increasing_version() {
        let old = pkg(Version::new(1, 0, 0), vec![c("c_0", "a")]);
        let same = pkg(Version::new(1, 0, 0), vec![c("c_0", "a")]);
        assert!(diff(&old, &same).is_err());
        let older = pkg(Version::new(0, 9, 0), vec![c("c_0", "a")]);
        assert!(diff(&old, &older).is_err());
    }

    #[test]
    fn apply_inverts_diff() {
        let old = pkg(Version::new(1, 0, 0), vec![c("c_0", "a"), c("c_1", "b"), c("c_2", "c")]);
        let new = pkg(
            Version::new(1, 1, 0),
            vec![c("c_0", "a"), c("c_1", "b-modified"), c("c_3", "d")],
        );
        let delta = diff(&old, &new).unwrap();
        let reconstructed = apply(&old, &delta).unwrap();

        assert_eq!(reconstructed.version, new.version);
        assert_eq!(reconstructed.checksum, new.checksum);
        let mut rec_ids: Vec<_> = reconstructed.chunks.iter().map(|c| c.chunk_id.clone()).collect();
        let mut new_ids: Vec<_> = new.chunks.iter().map(|c| c.chunk_id.clone()).collect();
        rec_ids.sort();
        new_ids.sort();
        assert_eq!(rec_ids, new_ids);
        assert!(checksum_service::verify(&reconstructed).unwrap());
    }

    #[test]
    fn apply_rejects_base_mismatch() {
        let old = pkg(Version::new(1, 0, 0), vec![c("c_0", "a")]);
        let new = pkg(Version::new(1, 1, 0), vec![c("c_0", "a"), c("c_1", "b")]);
        let delta = diff(&old, &new).unwrap();
        let wrong_base = pkg(Version::new(2, 0, 0), vec![c("c_0", "a")]);
        assert!(apply(&wrong_base, &delta).is_err());
    }

    #[test]
    fn size_reduction_is_smaller_for_small_diffs() {
        let chunks: Vec<Chunk> = (0..50).map(|i| c(&format!("c_{i}"), "same text every time")).collect();
        let old = pkg(Version::new(1, 0, 0), chunks.clone());
        let mut new_chunks = chunks;
        new_chunks[0] = c("c_0", "the only chunk that changed");
        let new = pkg(Version::new(1, 0, 1), new_chunks);

        let reduction = size_reduction(&old, &new).unwrap();
        assert!(reduction.delta_bytes < reduction.full_bytes);
        assert!(reduction.ratio() < 0.5);
    }
}

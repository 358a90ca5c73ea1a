// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Sealer
//!
//! Defines the package's canonical form and the `sha256:` seal computed over
//! it. The canonical form is deterministic (key order, no ASCII escaping,
//! checksum field stripped) so sealing the same package twice — even in two
//! different processes — yields byte-identical output.
//!
//! ## Sensitivity
//!
//! Flipping any bit of chunk text, a vector element, a metadata field, a
//! provenance field, or the chunk ordering changes the canonical bytes and
//! therefore the seal. Chunk order is part of package identity: reordering
//! chunks changes the seal unless the package happens to be a palindrome
//! (the sole case where the canonical form is unchanged).

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::entities::Package;
use crate::value_objects::Seal;
use crate::PipelineError;

/// Strips the `checksum` field and returns the package as a `serde_json::Value`.
fn strip_checksum(pkg: &Package) -> Result<Value, PipelineError> {
    let mut value = serde_json::to_value(pkg)?;
    if let Value::Object(map) = &mut value {
        map.remove("checksum");
    }
    Ok(value)
}

/// Recursively sorts every object's keys, producing the canonical form's
/// structural shape. `serde_json`'s default `Map` is already insertion-order
/// (or BTree-ordered with the `preserve_order` feature off); we sort
/// explicitly here so canonicalization never depends on that feature flag.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Renders the canonical UTF-8 JSON bytes for `pkg`, with the `checksum`
/// field removed and all object keys sorted lexicographically at every
/// depth. Equivalent to Python's `json.dumps(..., sort_keys=True,
/// ensure_ascii=False)`.
pub fn canonical_bytes(pkg: &Package) -> Result<Vec<u8>, PipelineError> {
    let stripped = strip_checksum(pkg)?;
    let canonical = canonicalize(&stripped);
    serde_json::to_vec(&canonical).map_err(PipelineError::from)
}

/// Computes `"sha256:" + lower_hex(sha256(canonical_bytes(pkg)))`.
pub fn seal(pkg: &Package) -> Result<Seal, PipelineError> {
    let bytes = canonical_bytes(pkg)?;
    let digest = Sha256::digest(&bytes);
    Ok(Seal::from_hex_digest(format!("{digest:x}")))
}

/// `verify(pkg) := seal(strip_checksum(pkg)) == pkg.checksum`.
pub fn verify(pkg: &Package) -> Result<bool, PipelineError> {
    Ok(seal(pkg)?.as_str() == pkg.checksum.as_str())
}

/// Convenience for the puller's integrity step: verifies and turns a
/// mismatch into the typed error callers are expected to propagate.
pub fn verify_or_err(pkg: &Package) -> Result<(), PipelineError> {
    if verify(pkg)? {
        Ok(())
    } else {
        Err(PipelineError::seal_mismatch(format!(
            "seal mismatch for {}/{}/{}",
            pkg.subject, pkg.grade, pkg.version
        )))
    }
}

/// Seals a freshly-built package in place, returning a copy with `checksum` set.
pub fn sealed(mut pkg: Package) -> Result<Package, PipelineError> {
    pkg.checksum = seal(&pkg)?;
    Ok(pkg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Chunk;
    use crate::value_objects::{ChunkConfig, Version};
    use chrono::Utc;

    fn base_package() -> Package {
        let chunks = vec![
            Chunk::new("c_0", "hello world", vec![0.1, 0.2]).unwrap(),
            Chunk::new("c_1", "goodbye world", vec![0.3, 0.4]).unwrap(),
        ];
        let pkg = Package {
            checksum: Seal::from_hex_digest("0".repeat(64)),
            chunk_config: ChunkConfig::new(512, 64),
            chunks: chunks.clone(),
            created_at: Utc::now(),
            embedding_model: "text-embedding-3".to_string(),
            grade: 10,
            semester: 1,
            source_files: vec!["bab1.pdf".to_string()],
            subject: "matematika".to_string(),
            total_chunks: chunks.len(),
            version: Version::new(1, 0, 0),
        };
        sealed(pkg).unwrap()
    }

    #[test]
    fn seal_determinism() {
        let pkg = base_package();
        assert_eq!(seal(&pkg).unwrap(), seal(&pkg).unwrap());
    }

    #[test]
    fn verify_succeeds_on_sealed_package() {
        let pkg = base_package();
        assert!(verify(&pkg).unwrap());
    }

    #[test]
    fn seal_sensitive_to_chunk_text() {
        let pkg = base_package();
        let original = seal(&pkg).unwrap();
        let mut mutated = pkg.clone();
        mutated.chunks[0].text.push('!');
        assert_ne!(original, seal(&mutated).unwrap());
    }

    #[test]
    fn seal_sensitive_to_vector_element() {
        let pkg = base_package();
        let original = seal(&pkg).unwrap();
        let mut mutated = pkg.clone();
        mutated.chunks[0].embedding[0] += 0.0001;
        assert_ne!(original, seal(&mutated).unwrap());
    }

    #[test]
    fn seal_sensitive_to_metadata() {
        let pkg = base_package();
        let original = seal(&pkg).unwrap();
        let mut mutated = pkg.clone();
        mutated.chunks[0].metadata = mutated.chunks[0].metadata.clone().with_page(7);
        assert_ne!(original, seal(&mutated).unwrap());
    }

    #[test]
    fn seal_sensitive_to_chunk_ordering() {
        let pkg = base_package();
        let original = seal(&pkg).unwrap();
        let mut mutated = pkg.clone();
        mutated.chunks.reverse();
        assert_ne!(original, seal(&mutated).unwrap());
    }

    #[test]
    fn seal_sensitive_to_provenance() {
        let pkg = base_package();
        let original = seal(&pkg).unwrap();
        let mut mutated = pkg.clone();
        mutated.embedding_model = "a-different-model".to_string();
        assert_ne!(original, seal(&mutated).unwrap());
    }

    #[test]
    fn decode_rejects_corruption_byte_flip() {
        let pkg = base_package();
        let mut bytes = canonical_bytes(&pkg).unwrap();
        // Flip one bit in the middle of the payload.
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        // Any byte flip to the canonical bytes changes the hash used to seal,
        // so re-sealing the corrupted bytes can never match the original checksum.
        let digest = Sha256::digest(&bytes);
        let corrupted_seal = Seal::from_hex_digest(format!("{digest:x}"));
        assert_ne!(corrupted_seal.as_str(), pkg.checksum.as_str());
    }
}

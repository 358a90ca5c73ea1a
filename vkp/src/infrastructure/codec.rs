// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Wire codec (C3): canonical JSON encode/decode for `Package` and `Delta`.
//!
//! Object bodies carry no compression wrapper (§6). Per §4.3, `decode`
//! parses, runs §4.1 validation, then verifies the seal (§4.2), so a
//! corrupted body is rejected by `decode_package` itself rather than by
//! whatever caller happens to fetch it next — each stage keeps its own
//! named error (`SerializationError` for a malformed body,
//! `ValidationError`/`MalformedVersion`/etc. for a structurally invalid one,
//! `SealMismatch` for a structurally valid one whose content was tampered
//! with). The puller's own §4.7 Verify step re-runs `validate`/`verify_or_err`
//! on the package it ends up with regardless of path, since the
//! delta-reconstructed package (built by `delta_service::apply`, not this
//! codec) never passes through here.
use vkp_domain::services::checksum_service;
use vkp_domain::{Delta, Package, PipelineError};

/// Serializes a package to its canonical on-wire JSON form, one line, no
/// extra whitespace.
pub fn encode_package(package: &Package) -> Result<Vec<u8>, PipelineError> {
    serde_json::to_vec(package).map_err(|e| PipelineError::SerializationError(format!("encode package: {e}")))
}

/// Decodes a package body fetched from the object store or read back from
/// the local blob store. Enforces the full §4.3 contract: parse, then
/// `Package::validate`, then `checksum_service::verify_or_err` — a single
/// flipped byte anywhere in the body, not just in the `checksum` field,
/// causes this to fail.
pub fn decode_package(bytes: &[u8]) -> Result<Package, PipelineError> {
    let package: Package = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::SerializationError(format!("decode package: {e}")))?;
    package.validate()?;
    checksum_service::verify_or_err(&package)?;
    Ok(package)
}

pub fn encode_delta(delta: &Delta) -> Result<Vec<u8>, PipelineError> {
    serde_json::to_vec(delta).map_err(|e| PipelineError::SerializationError(format!("encode delta: {e}")))
}

pub fn decode_delta(bytes: &[u8]) -> Result<Delta, PipelineError> {
    serde_json::from_slice(bytes).map_err(|e| PipelineError::SerializationError(format!("decode delta: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkp_domain::{Chunk, ChunkConfig, Seal, Version};

    fn sample_package() -> Package {
        let chunks = vec![Chunk::new("c_0", "hello world", vec![0.1, 0.2]).unwrap()];
        let unsealed = Package {
            checksum: Seal::from_hex_digest("a".repeat(64)), // placeholder, replaced below
            chunk_config: ChunkConfig::new(512, 64),
            chunks: chunks.clone(),
            created_at: chrono::Utc::now(),
            embedding_model: "text-embedding-3".to_string(),
            grade: 10,
            semester: 1,
            source_files: vec!["bab1.pdf".to_string()],
            subject: "matematika".to_string(),
            total_chunks: chunks.len(),
            version: Version::new(1, 0, 0),
        };
        checksum_service::sealed(unsealed).unwrap()
    }

    #[test]
    fn package_round_trips_through_the_wire_codec() {
        let package = sample_package();
        let bytes = encode_package(&package).unwrap();
        let decoded = decode_package(&bytes).unwrap();
        assert_eq!(decoded.subject, package.subject);
        assert_eq!(decoded.version, package.version);
        assert_eq!(decoded.chunks.len(), package.chunks.len());
    }

    #[test]
    fn decode_package_rejects_garbage_bytes() {
        let result = decode_package(b"not json");
        assert!(matches!(result, Err(PipelineError::SerializationError(_))));
    }

    #[test]
    fn decode_package_rejects_truncated_json() {
        let package = sample_package();
        let bytes = encode_package(&package).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_package(truncated).is_err());
    }

    /// §8.4: flipping *any* byte of a validly encoded package must cause
    /// decode to fail — not just a bit flipped inside the `checksum` field
    /// itself. Here the flip lands inside chunk text, far from `checksum`.
    #[test]
    fn decode_package_rejects_a_flipped_payload_byte() {
        let package = sample_package();
        let mut bytes = encode_package(&package).unwrap();

        let needle = b"hello world";
        let at = bytes
            .windows(needle.len())
            .position(|w| w == needle)
            .expect("chunk text must be present verbatim in the encoded body");
        bytes[at] ^= 0x02; // 'h' -> 'j': stays a valid UTF-8 letter, keeps the JSON well-formed

        let result = decode_package(&bytes);
        assert!(
            matches!(result, Err(PipelineError::SealMismatch(_))),
            "a flipped payload byte must surface as a seal mismatch, not decode successfully: {result:?}"
        );
    }
}

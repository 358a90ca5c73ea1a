// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunking Parameters Value Object
//!
//! The `chunk_size`/`chunk_overlap` pair recorded in a package's provenance
//! block. These describe how the cloud ingestion pipeline split source
//! documents into chunks; the edge core never re-chunks anything, it only
//! carries these numbers through for observability and validation (rule 5
//! of `Package::validate`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub chunk_size: u64,
    pub chunk_overlap: u64,
}

impl ChunkConfig {
    pub fn new(chunk_size: u64, chunk_overlap: u64) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

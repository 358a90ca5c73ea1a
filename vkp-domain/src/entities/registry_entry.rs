// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Version Registry Entry
//!
//! One row per `(triple, version)`, as persisted by
//! `vkp::infrastructure::registry::SqliteVersionRegistry` in the
//! `vkp_versions` table (§6). The registry invariant — at most one active
//! entry per triple — is enforced by the registry implementation, not by
//! this type; the entry itself is a plain record.

use chrono::{DateTime, Utc};

use crate::value_objects::{Seal, Triple, Version};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub triple: Triple,
    pub version: Version,
    pub installed_at: DateTime<Utc>,
    pub chunk_count: usize,
    pub checksum: Seal,
    pub active: bool,
}

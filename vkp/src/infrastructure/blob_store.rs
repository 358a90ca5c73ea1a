// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Local full-package blob store — the resolution of the delta-reconstruction
//! open question (SPEC_FULL.md §9): rather than re-downloading the previous
//! full package from the object store to apply a delta against (which would
//! defeat most of the bandwidth saving §4.4 promises), the puller keeps the
//! most recently installed full package per triple on local disk and reads
//! it back as the delta's `old` side.
//!
//! One file per triple under `persist_dir/blobs/`, written only after a
//! candidate's integrity is verified and it has been installed; this mirrors
//! `FileVectorIndex`'s one-file-per-partition layout and mutex discipline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use vkp_domain::{Package, PipelineError, Triple};

use crate::infrastructure::codec;

pub struct PackageBlobStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, ()>>,
}

impl PackageBlobStore {
    pub fn new(persist_dir: impl Into<PathBuf>) -> Self {
        Self { root: persist_dir.into().join("blobs"), locks: Mutex::new(HashMap::new()) }
    }

    fn blob_path(&self, triple: &Triple) -> PathBuf {
        self.root.join(format!("{}.vkp", triple.collection_name()))
    }

    /// Reads the locally retained full package for `triple`, if any.
    pub fn read(&self, triple: &Triple) -> Result<Option<Package>, PipelineError> {
        let path = self.blob_path(triple);
        let _guard = self.locks.lock();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        codec::decode_package(&bytes).map(Some)
    }

    /// Persists `package` as the new locally retained full package for
    /// `triple`, replacing whatever was there before.
    ///
    /// `triple` is taken explicitly rather than derived from `package` itself:
    /// the puller may install a package under a triple other than the one its
    /// own fields would decode to (semester is pinned to 1 regardless of the
    /// package's declared semester, per [`crate::application::puller`]'s
    /// resolution of SPEC_FULL.md §9 Open Question (a)), and `read` must be
    /// able to find what `write` stored using that same pinned triple.
    pub fn write(&self, triple: &Triple, package: &Package) -> Result<(), PipelineError> {
        let path = self.blob_path(triple);
        let _guard = self.locks.lock();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = codec::encode_package(package)?;
        std::fs::write(&path, bytes)?;
        Ok(())
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Repositories (Ports)
//!
//! Interfaces that define the contracts between the domain and the outside
//! world: the version registry (C5), the object-store client (C6), the
//! vector index adapter (C8), and the response cache (C9). All four are
//! I/O-bound and therefore `async_trait`, unlike the synchronous services in
//! `crate::services`. Concrete implementations live in `vkp::infrastructure`.

pub mod object_store;
pub mod response_cache;
pub mod vector_index;
pub mod version_registry;

pub use object_store::{ObjectListing, ObjectStoreClient};
pub use response_cache::{key_of, normalize, CacheStats, ResponseCache, RESPONSE_SCOPE_PATTERN};
pub use vector_index::VectorIndexAdapter;
pub use version_registry::{Ordering3, VersionRegistry};

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Query Cache Use Case
//!
//! Only the cache *contract* for the query path is part of this core (§3.2
//! of the data flow): resolving a cache key against the active version and
//! returning a hit or miss. Invoking the external inference engine on a
//! miss is outside this crate's scope.

use std::sync::Arc;

use vkp_domain::repositories::{ResponseCache, VersionRegistry};
use vkp_domain::PipelineError;

use crate::application::commands::QueryCacheCommand;
use crate::infrastructure::cache::resolve_cache_key;

pub struct QueryCacheUseCase {
    registry: Arc<dyn VersionRegistry>,
    cache: Arc<dyn ResponseCache>,
}

impl QueryCacheUseCase {
    pub fn new(registry: Arc<dyn VersionRegistry>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { registry, cache }
    }

    /// Returns `Ok(Some(response))` on a cache hit, `Ok(None)` on a miss or
    /// when nothing is installed for the triple yet.
    pub async fn execute(&self, command: QueryCacheCommand) -> Result<Option<String>, PipelineError> {
        let key = resolve_cache_key(self.registry.as_ref(), &command.question, &command.triple).await?;
        match key {
            Some(key) => self.cache.get(&key).await,
            None => Ok(None),
        }
    }
}

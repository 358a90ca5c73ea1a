// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Rollback Use Case
//!
//! Reactivates a previously-installed version for a triple and flushes the
//! response cache's scope, mirroring the invalidation step the puller runs
//! after a forward install (§4.9).

use std::sync::Arc;

use tracing::info;

use vkp_domain::repositories::{ResponseCache, VersionRegistry, RESPONSE_SCOPE_PATTERN};
use vkp_domain::PipelineError;

use crate::application::commands::RollbackCommand;

pub struct RollbackUseCase {
    registry: Arc<dyn VersionRegistry>,
    cache: Arc<dyn ResponseCache>,
}

impl RollbackUseCase {
    pub fn new(registry: Arc<dyn VersionRegistry>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { registry, cache }
    }

    pub async fn execute(&self, command: RollbackCommand) -> Result<(), PipelineError> {
        self.registry.rollback(&command.triple, command.target_version).await?;
        let deleted = self.cache.delete_matching(RESPONSE_SCOPE_PATTERN).await?;
        info!(
            subject = %command.triple.subject,
            target_version = %command.target_version,
            invalidated = deleted,
            "rolled back"
        );
        Ok(())
    }
}

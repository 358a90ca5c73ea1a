// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # History Use Case
//!
//! Thin pass-through to [`vkp_domain::repositories::VersionRegistry::history`]
//! for the CLI's `history` subcommand.

use std::sync::Arc;

use vkp_domain::repositories::VersionRegistry;
use vkp_domain::{PipelineError, RegistryEntry};

use crate::application::commands::HistoryCommand;

pub struct HistoryUseCase {
    registry: Arc<dyn VersionRegistry>,
}

impl HistoryUseCase {
    pub fn new(registry: Arc<dyn VersionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, command: HistoryCommand) -> Result<Vec<RegistryEntry>, PipelineError> {
        self.registry.history(&command.triple).await
    }
}

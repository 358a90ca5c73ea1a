// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Check-and-Install Use Case
//!
//! Wraps a single [`crate::application::puller::Puller::tick`] call with the
//! metrics bookkeeping the bootstrap entry point needs to decide its exit
//! code (§6).

use std::sync::Arc;

use tracing::info;

use vkp_domain::PipelineError;

use crate::application::commands::RunTickCommand;
use crate::application::puller::{Puller, TickReport};
use crate::infrastructure::MetricsCollector;

pub struct CheckAndInstallUseCase {
    puller: Arc<Puller>,
    metrics: Arc<MetricsCollector>,
}

impl CheckAndInstallUseCase {
    pub fn new(puller: Arc<Puller>, metrics: Arc<MetricsCollector>) -> Self {
        Self { puller, metrics }
    }

    /// Runs one tick and records per-candidate outcomes. Returns `None` when
    /// the tick was an offline no-op.
    pub async fn execute(&self, _command: RunTickCommand) -> Result<Option<TickReport>, PipelineError> {
        self.metrics.ticks_total.inc();
        let report = self.puller.tick().await?;

        if let Some(report) = &report {
            for _ in 0..report.successful {
                self.metrics.record_candidate("installed");
            }
            for _ in 0..report.failed {
                self.metrics.record_candidate("failed");
            }
            for _ in 0..report.skipped {
                self.metrics.record_candidate("skipped");
            }
            info!(
                successful = report.successful,
                failed = report.failed,
                skipped = report.skipped,
                "tick complete"
            );
        } else {
            info!("tick skipped: offline");
        }

        Ok(report)
    }
}

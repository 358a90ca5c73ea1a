// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics for the puller tick and the response cache. This is
//! local instrumentation only — the core never ships telemetry to an
//! external collector; a `/metrics` scrape endpoint, if wired up, is the
//! bootstrap crate's concern, not this one's.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use vkp_domain::PipelineError;

pub struct MetricsCollector {
    pub registry: Registry,
    pub candidates_total: IntCounterVec,
    pub ticks_total: IntCounter,
    pub cache_hits_total: IntCounter,
    pub cache_misses_total: IntCounter,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();

        let candidates_total = IntCounterVec::new(
            Opts::new("vkp_puller_candidates_total", "Puller candidates by outcome"),
            &["outcome"],
        )
        .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;

        let ticks_total = IntCounter::new("vkp_puller_ticks_total", "Puller ticks run")
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;

        let cache_hits_total = IntCounter::new("vkp_cache_hits_total", "Response cache hits")
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;

        let cache_misses_total = IntCounter::new("vkp_cache_misses_total", "Response cache misses")
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;

        registry
            .register(Box::new(candidates_total.clone()))
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;
        registry
            .register(Box::new(ticks_total.clone()))
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;
        registry
            .register(Box::new(cache_hits_total.clone()))
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;
        registry
            .register(Box::new(cache_misses_total.clone()))
            .map_err(|e| PipelineError::internal(format!("metric registration: {e}")))?;

        Ok(Self { registry, candidates_total, ticks_total, cache_hits_total, cache_misses_total })
    }

    pub fn record_candidate(&self, outcome: &str) {
        self.candidates_total.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_candidate_outcomes_by_label() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.record_candidate("installed");
        metrics.record_candidate("installed");
        metrics.record_candidate("failed");

        let installed = metrics.candidates_total.with_label_values(&["installed"]).get();
        let failed = metrics.candidates_total.with_label_values(&["failed"]).get();
        assert_eq!(installed, 2);
        assert_eq!(failed, 1);
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # `vkp` Binary
//!
//! The composition root: parses and validates CLI arguments (`vkp_bootstrap`),
//! loads configuration, wires the concrete infrastructure adapters behind
//! `vkp_domain`'s repository ports, and dispatches to the matching use case.
//!
//! Exit codes for `tick` follow the cron contract in §6 (0/1/2); every other
//! subcommand follows the richer `vkp_bootstrap::exit_code::ExitCode`
//! mapping.

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use vkp::application::use_cases::{CheckAndInstallUseCase, HistoryUseCase, QueryCacheUseCase, RollbackUseCase};
use vkp::application::{commands, Puller};
use vkp::infrastructure::cache::{LruResponseCache, RedisResponseCache};
use vkp::infrastructure::object_store::{HttpObjectStoreClient, RetryPolicy};
use vkp::infrastructure::registry::{schema, SqliteVersionRegistry};
use vkp::infrastructure::vector_index::FileVectorIndex;
use vkp::infrastructure::{logging, MetricsCollector, PackageBlobStore, VkpConfig};
use vkp_domain::repositories::{ObjectStoreClient, ResponseCache, VersionRegistry};
use vkp_domain::{PipelineError, Triple, Version};

use vkp_bootstrap::cli::ValidatedCommand;
use vkp_bootstrap::exit_code::ExitCode;

struct CompositionRoot {
    object_store: Arc<dyn ObjectStoreClient>,
    registry: Arc<dyn VersionRegistry>,
    cache: Arc<dyn ResponseCache>,
    metrics: Arc<MetricsCollector>,
}

impl CompositionRoot {
    async fn build(config: &VkpConfig) -> Result<Self, PipelineError> {
        let retry_policy = RetryPolicy::new(config.max_retries, Duration::from_secs(config.retry_delay_s));
        let object_store: Arc<dyn ObjectStoreClient> = Arc::new(HttpObjectStoreClient::new(
            &config.region,
            config.bucket_name.clone(),
            Duration::from_secs(5),
            Duration::from_secs(5),
            retry_policy,
        )?);

        let pool = schema::initialize_database(&config.db_url)
            .await
            .map_err(|e| PipelineError::RegistryConflict(format!("schema init: {e}")))?;
        let registry: Arc<dyn VersionRegistry> = Arc::new(SqliteVersionRegistry::new(pool));

        let cache: Arc<dyn ResponseCache> = match &config.redis_url {
            Some(url) => Arc::new(RedisResponseCache::connect(url).await?),
            None => Arc::new(LruResponseCache::new(config.cache_max_entries)),
        };

        let metrics = Arc::new(MetricsCollector::new()?);

        Ok(Self { object_store, registry, cache, metrics })
    }

    fn vector_index(&self, persist_dir: &str) -> Arc<dyn vkp_domain::repositories::VectorIndexAdapter> {
        Arc::new(FileVectorIndex::new(persist_dir))
    }

    fn blob_store(&self, persist_dir: &str) -> Arc<PackageBlobStore> {
        Arc::new(PackageBlobStore::new(persist_dir))
    }
}

#[tokio::main]
async fn main() {
    logging::init();

    let validated = match vkp_bootstrap::bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("argument error: {err}");
            std::process::exit(ExitCode::UsageError.as_i32());
        }
    };

    let exit_code = run(validated).await;
    std::process::exit(exit_code);
}

async fn run(validated: vkp_bootstrap::cli::ValidatedCli) -> i32 {
    let config = match VkpConfig::load(&validated.env) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            return ExitCode::Config.as_i32();
        }
    };

    let root = match CompositionRoot::build(&config).await {
        Ok(root) => root,
        Err(err) => {
            error!(error = %err, "failed to build composition root");
            return ExitCode::Unavailable.as_i32();
        }
    };

    match validated.command {
        ValidatedCommand::Tick => run_tick(&root, &config).await,
        ValidatedCommand::Rollback { subject, grade, semester, target_version } => {
            run_rollback(&root, subject, grade, semester, target_version).await
        }
        ValidatedCommand::History { subject, grade, semester } => run_history(&root, subject, grade, semester).await,
        ValidatedCommand::QueryCache { subject, grade, semester, question } => {
            run_query_cache(&root, subject, grade, semester, question).await
        }
    }
}

/// Cron contract (§6): 0 success or offline no-op, 1 partial failure, 2 fatal.
async fn run_tick(root: &CompositionRoot, config: &VkpConfig) -> i32 {
    let vector_index = root.vector_index(&config.persist_dir);
    let blob_store = root.blob_store(&config.persist_dir);
    let puller = Arc::new(Puller::new(
        root.object_store.clone(),
        root.registry.clone(),
        vector_index,
        root.cache.clone(),
        blob_store,
    ));
    let use_case = CheckAndInstallUseCase::new(puller, root.metrics.clone());

    match use_case.execute(commands::RunTickCommand).await {
        Ok(None) => 0,
        Ok(Some(report)) => {
            println!(
                "tick complete: {} installed, {} failed, {} skipped",
                report.successful, report.failed, report.skipped
            );
            for err in &report.errors {
                eprintln!("  - {err}");
            }
            if report.failed > 0 {
                1
            } else {
                0
            }
        }
        Err(err) => {
            error!(error = %err, "tick enumeration failed");
            2
        }
    }
}

async fn run_rollback(root: &CompositionRoot, subject: String, grade: u8, semester: u8, target_version: String) -> i32 {
    let triple = match Triple::new(subject, grade, semester) {
        Ok(t) => t,
        Err(err) => return report_error(&err),
    };
    let target_version = match Version::parse(&target_version) {
        Ok(v) => v,
        Err(err) => return report_error(&err),
    };

    let use_case = RollbackUseCase::new(root.registry.clone(), root.cache.clone());
    match use_case.execute(commands::RollbackCommand { triple, target_version }).await {
        Ok(()) => {
            println!("rolled back to {target_version}");
            0
        }
        Err(err) => report_error(&err),
    }
}

async fn run_history(root: &CompositionRoot, subject: String, grade: u8, semester: u8) -> i32 {
    let triple = match Triple::new(subject, grade, semester) {
        Ok(t) => t,
        Err(err) => return report_error(&err),
    };

    let use_case = HistoryUseCase::new(root.registry.clone());
    match use_case.execute(commands::HistoryCommand { triple }).await {
        Ok(entries) => {
            if entries.is_empty() {
                println!("no install history for this triple");
            }
            for entry in entries {
                println!(
                    "{} installed_at={} chunks={} active={}",
                    entry.version, entry.installed_at, entry.chunk_count, entry.active
                );
            }
            0
        }
        Err(err) => report_error(&err),
    }
}

async fn run_query_cache(root: &CompositionRoot, subject: String, grade: u8, semester: u8, question: String) -> i32 {
    let triple = match Triple::new(subject, grade, semester) {
        Ok(t) => t,
        Err(err) => return report_error(&err),
    };

    let use_case = QueryCacheUseCase::new(root.registry.clone(), root.cache.clone());
    match use_case.execute(commands::QueryCacheCommand { question, triple }).await {
        Ok(Some(response)) => {
            println!("cache hit: {response}");
            0
        }
        Ok(None) => {
            println!("cache miss");
            0
        }
        Err(err) => report_error(&err),
    }
}

fn report_error(err: &PipelineError) -> i32 {
    error!(error = %err, "command failed");
    vkp_bootstrap::exit_code::map_error_to_exit_code(err).as_i32()
}

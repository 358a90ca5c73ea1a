// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration
//!
//! Loads the core's configuration surface (§6) from a layered TOML + env
//! source: a base file, an optional environment-named override file, then
//! `VKP_`-prefixed environment variables, in that precedence order — the
//! same layering style the `config` crate is built for.

use config::{Config, Environment, File};
use serde::Deserialize;

use vkp_domain::PipelineError;

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_s() -> u64 {
    5
}

fn default_cache_ttl_s() -> u64 {
    86_400
}

fn default_cache_max_entries() -> usize {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct VkpConfig {
    pub bucket_name: String,
    pub region: String,
    pub persist_dir: String,
    pub db_url: String,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_s")]
    pub retry_delay_s: u64,
    #[serde(default = "default_cache_ttl_s")]
    pub cache_ttl_s: u64,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl VkpConfig {
    /// Loads configuration from `config/default.toml`, an optional
    /// `config/{run_mode}.toml` override, then `VKP_*` environment
    /// variables (e.g. `VKP_BUCKET_NAME`, `VKP_MAX_RETRIES`).
    pub fn load(run_mode: &str) -> Result<Self, PipelineError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("VKP").separator("__"));

        let config = builder
            .build()
            .map_err(|e| PipelineError::internal(format!("failed to build configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| PipelineError::internal(format!("failed to parse configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_env_supplies_required_fields() {
        std::env::set_var("VKP_BUCKET_NAME", "curricula");
        std::env::set_var("VKP_REGION", "us-east-1");
        std::env::set_var("VKP_PERSIST_DIR", "/tmp/vkp");
        std::env::set_var("VKP_DB_URL", "sqlite://vkp.db");

        let cfg = VkpConfig::load("test").unwrap();
        assert_eq!(cfg.bucket_name, "curricula");
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.cache_ttl_s, 86_400);
        assert!(cfg.redis_url.is_none());

        std::env::remove_var("VKP_BUCKET_NAME");
        std::env::remove_var("VKP_REGION");
        std::env::remove_var("VKP_PERSIST_DIR");
        std::env::remove_var("VKP_DB_URL");
    }
}

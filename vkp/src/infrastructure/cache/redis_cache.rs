// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Redis-backed response cache (§4.9). Selected at startup when
//! `redis_url` is configured; shares state across processes and supports
//! native pattern deletion via `SCAN` + pipelined `DEL`, avoiding the
//! blocking, O(n) `KEYS` command in production.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use vkp_domain::repositories::{CacheStats, ResponseCache};
use vkp_domain::PipelineError;

pub struct RedisResponseCache {
    conn: ConnectionManager,
}

impl RedisResponseCache {
    pub async fn connect(redis_url: &str) -> Result<Self, PipelineError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| PipelineError::CacheFailure(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| PipelineError::CacheFailure(format!("redis connect: {e}")))?;
        Ok(Self { conn })
    }

    fn map_err(context: &str, err: redis::RedisError) -> PipelineError {
        PipelineError::CacheFailure(format!("{context}: {err}"))
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| Self::map_err("get", e))
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), PipelineError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| Self::map_err("put", e))
    }

    async fn delete(&self, key: &str) -> Result<(), PipelineError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(|e| Self::map_err("delete", e))
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, PipelineError> {
        let mut conn = self.conn.clone();
        let mut deleted = 0u64;
        let mut cursor: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(|e| Self::map_err("scan", e))?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await.map_err(|e| Self::map_err("pipelined delete", e))?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }

    async fn stats(&self) -> Result<CacheStats, PipelineError> {
        // The remote backend does not track hit/miss counters locally;
        // per-process counters would be misleading for a shared cache.
        Ok(CacheStats { hits: 0, misses: 0, size: 0 })
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

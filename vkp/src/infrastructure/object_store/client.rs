// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! HTTP client for an S3-compatible, path-style object store.
//!
//! Key layout (bit-exact, §6): full package at
//! `{subject}/kelas_{grade}/v{MAJOR}.{MINOR}.{PATCH}.vkp`, delta at the same
//! key with `.delta.vkp`. Semester is not encoded in the key; the puller
//! resolves it from the decoded package's own `semester` field once fetched
//! (Open Question (a), see SPEC_FULL.md §9).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use vkp_domain::repositories::{ObjectListing, ObjectStoreClient};
use vkp_domain::PipelineError;

use super::retry::{with_retry, RetryPolicy};

#[derive(Debug, serde::Deserialize)]
struct ListBucketResult {
    #[serde(default)]
    contents: Vec<BucketEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct BucketEntry {
    key: String,
    size: u64,
}

/// Talks to a single-tenant, path-style S3-compatible bucket over HTTP(S).
pub struct HttpObjectStoreClient {
    http: Client,
    base_url: Url,
    bucket: String,
    retry_policy: RetryPolicy,
}

impl HttpObjectStoreClient {
    pub fn new(
        endpoint: &str,
        bucket: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, PipelineError> {
        let base_url = Url::parse(endpoint)
            .map_err(|e| PipelineError::internal(format!("invalid object store endpoint: {e}")))?;
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| PipelineError::internal(format!("failed to build http client: {e}")))?;
        Ok(Self { http, base_url, bucket: bucket.into(), retry_policy })
    }

    fn object_url(&self, key: &str) -> Result<Url, PipelineError> {
        self.base_url
            .join(&format!("{}/{}", self.bucket, key))
            .map_err(|e| PipelineError::internal(format!("bad object key {key}: {e}")))
    }

    fn classify_status(status: StatusCode, context: &str) -> PipelineError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                PipelineError::Unauthorized(format!("{context}: {status}"))
            }
            StatusCode::NOT_FOUND => PipelineError::NotFound(context.to_string()),
            s if s.is_server_error() => PipelineError::ServerError(format!("{context}: {s}")),
            s => PipelineError::ServerError(format!("{context}: unexpected status {s}")),
        }
    }

    fn classify_transport(context: &str, err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            PipelineError::Timeout(format!("{context}: {err}"))
        } else if err.is_connect() {
            PipelineError::Unreachable(format!("{context}: {err}"))
        } else {
            PipelineError::ServerError(format!("{context}: {err}"))
        }
    }
}

#[async_trait]
impl ObjectStoreClient for HttpObjectStoreClient {
    async fn list_all(&self) -> Result<Vec<ObjectListing>, PipelineError> {
        with_retry(self.retry_policy, || async {
            let url = self.object_url("")?;
            debug!(%url, "listing bucket");
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| Self::classify_transport("list_all", e))?;

            if !response.status().is_success() {
                return Err(Self::classify_status(response.status(), "list_all"));
            }

            let parsed: ListBucketResult = response
                .json()
                .await
                .map_err(|e| Self::classify_transport("list_all body", e))?;

            Ok(parsed
                .contents
                .into_iter()
                .map(|entry| ObjectListing { key: entry.key, size: entry.size })
                .collect())
        })
        .await
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectListing>, PipelineError> {
        let result = with_retry(self.retry_policy, || async {
            let url = self.object_url(key)?;
            let response = self
                .http
                .head(url)
                .send()
                .await
                .map_err(|e| Self::classify_transport("head", e))?;

            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(Self::classify_status(response.status(), key));
            }

            let size = response
                .content_length()
                .ok_or_else(|| PipelineError::internal("head response missing content-length"))?;
            Ok(Some(ObjectListing { key: key.to_string(), size }))
        })
        .await;

        match result {
            Ok(listing) => Ok(listing),
            Err(PipelineError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        with_retry(self.retry_policy, || async {
            let url = self.object_url(key)?;
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| Self::classify_transport("get", e))?;

            if !response.status().is_success() {
                return Err(Self::classify_status(response.status(), key));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| Self::classify_transport("get body", e))
        })
        .await
    }

    async fn get_range(&self, key: &str, start: u64) -> Result<Vec<u8>, PipelineError> {
        with_retry(self.retry_policy, || async {
            let url = self.object_url(key)?;
            let response = self
                .http
                .get(url)
                .header("Range", format!("bytes={start}-"))
                .send()
                .await
                .map_err(|e| Self::classify_transport("get_range", e))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(PipelineError::NotFound(key.to_string()));
            }
            if !(status.is_success() || status == StatusCode::PARTIAL_CONTENT) {
                if status == StatusCode::RANGE_NOT_SATISFIABLE {
                    warn!(key, start, "range not satisfiable, server ignored offset");
                }
                return Err(Self::classify_status(status, key));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| Self::classify_transport("get_range body", e))
        })
        .await
    }
}

/// Builds the bit-exact full-package key for a triple's subject/grade/version.
pub fn full_package_key(subject: &str, grade: u8, version: &vkp_domain::Version) -> String {
    format!("{subject}/kelas_{grade}/v{version}.vkp")
}

/// Builds the bit-exact delta key for a triple's subject/grade/version.
pub fn delta_key(subject: &str, grade: u8, version: &vkp_domain::Version) -> String {
    format!("{subject}/kelas_{grade}/v{version}.delta.vkp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkp_domain::Version;

    #[test]
    fn package_key_matches_bit_exact_layout() {
        let key = full_package_key("matematika", 10, &Version::new(1, 2, 0));
        assert_eq!(key, "matematika/kelas_10/v1.2.0.vkp");
    }

    #[test]
    fn delta_key_matches_bit_exact_layout() {
        let key = delta_key("matematika", 10, &Version::new(1, 2, 0));
        assert_eq!(key, "matematika/kelas_10/v1.2.0.delta.vkp");
    }
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Puller State Machine (C7)
//!
//! Orchestrates one distribution tick: probe connectivity, enumerate
//! candidates newer than what's installed, and for each candidate try a
//! delta before falling back to a full fetch, verify, install, register,
//! and invalidate the response cache. One failed candidate does not abort
//! the batch (§4.7).
//!
//! `tick()` guards against re-entrancy with an `AtomicBool`: the spec treats
//! the state machine itself as non-reentrant, trusting an external
//! scheduler for at-most-one-instance-per-edge, but a defensive in-process
//! guard costs nothing and catches a misconfigured scheduler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use vkp_domain::repositories::{ObjectStoreClient, ResponseCache, VectorIndexAdapter, VersionRegistry, RESPONSE_SCOPE_PATTERN};
use vkp_domain::services::{checksum_service, delta_service};
use vkp_domain::{Package, PipelineError, Triple, Version};

use crate::infrastructure::blob_store::PackageBlobStore;
use crate::infrastructure::codec;
use crate::infrastructure::object_store::{delta_key, full_package_key};

/// A `.vkp` key parsed from a bucket listing: `{subject}/kelas_{grade}/v{version}.vkp`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CandidateKey {
    subject: String,
    grade: u8,
    version: Version,
    size: u64,
}

/// The only triple a listing-derived [`CandidateKey`] can ever name: this
/// key layout has no semester segment, so every candidate is pinned to
/// semester 1 (§9 Open Question (a); see [`Puller::enumerate_candidates`]).
fn semester_one_triple(candidate: &CandidateKey) -> Result<Triple, PipelineError> {
    Triple::new(candidate.subject.clone(), candidate.grade, 1)
}

fn parse_full_package_key(key: &str, size: u64) -> Option<CandidateKey> {
    if !key.ends_with(".vkp") || key.ends_with(".delta.vkp") {
        return None;
    }
    let mut parts = key.splitn(3, '/');
    let subject = parts.next()?.to_string();
    let grade_segment = parts.next()?;
    let version_segment = parts.next()?;

    let grade = grade_segment.strip_prefix("kelas_")?.parse::<u8>().ok()?;
    let version_str = version_segment.strip_prefix('v')?.strip_suffix(".vkp")?;
    let version = Version::parse(version_str).ok()?;

    Some(CandidateKey { subject, grade, version, size })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub successful: u32,
    pub failed: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

impl TickReport {
    /// Exit-code mapping for the cron entry point (§6): 0 all-successful or
    /// offline no-op, 1 partial failure, 2 fatal (enumeration never ran).
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

pub struct Puller {
    object_store: Arc<dyn ObjectStoreClient>,
    registry: Arc<dyn VersionRegistry>,
    vector_index: Arc<dyn VectorIndexAdapter>,
    cache: Arc<dyn ResponseCache>,
    blob_store: Arc<PackageBlobStore>,
    running: AtomicBool,
}

impl Puller {
    pub fn new(
        object_store: Arc<dyn ObjectStoreClient>,
        registry: Arc<dyn VersionRegistry>,
        vector_index: Arc<dyn VectorIndexAdapter>,
        cache: Arc<dyn ResponseCache>,
        blob_store: Arc<PackageBlobStore>,
    ) -> Self {
        Self { object_store, registry, vector_index, cache, blob_store, running: AtomicBool::new(false) }
    }

    /// Probe: a connectivity check cheap enough to run every tick. A
    /// listing failure classified `Unreachable` means "go offline", not
    /// "candidate failed" — the whole tick becomes a no-op.
    async fn check_internet_connectivity(&self) -> Result<Vec<vkp_domain::repositories::ObjectListing>, PipelineError> {
        self.object_store.list_all().await
    }

    /// Runs one full tick. Returns `Ok(None)` when offline (non-error
    /// no-op); `Ok(Some(report))` otherwise.
    pub async fn tick(&self) -> Result<Option<TickReport>, PipelineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PipelineError::internal("puller tick already in progress"));
        }
        let result = self.run_tick().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_tick(&self) -> Result<Option<TickReport>, PipelineError> {
        let listing = match self.check_internet_connectivity().await {
            Ok(listing) => listing,
            Err(PipelineError::Unreachable(reason)) => {
                info!(reason, "offline, skipping tick");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let candidates = self.enumerate_candidates(listing).await?;
        let mut report = TickReport::default();

        for candidate in candidates {
            match self.process_candidate(&candidate).await {
                Ok(CandidateOutcome::Installed) => report.successful += 1,
                Ok(CandidateOutcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    warn!(subject = %candidate.subject, version = %candidate.version, error = %err, "candidate failed");
                    report.failed += 1;
                    report.errors.push(format!("{}/{}: {err}", candidate.subject, candidate.version));
                }
            }
        }

        Ok(Some(report))
    }

    /// Enumerate: parse every `.vkp` key, keep the highest-versioned full
    /// package per (subject, grade), filter to strictly-newer-than-installed.
    ///
    /// The object-store key space (§4.6) carries no semester segment, so
    /// every triple this puller can ever discover from a listing is pinned
    /// to semester 1 — the spec's own resolution of Open Question (a) (§9:
    /// "semester... defaults to 1 on discovery"). `process_candidate` pins
    /// the same triple when it registers and invalidates, so this filter and
    /// the registration it gates always agree on which triple is newer.
    async fn enumerate_candidates(
        &self,
        listing: Vec<vkp_domain::repositories::ObjectListing>,
    ) -> Result<Vec<CandidateKey>, PipelineError> {
        let mut latest_per_subject_grade: HashMap<(String, u8), CandidateKey> = HashMap::new();

        for entry in listing {
            let Some(candidate) = parse_full_package_key(&entry.key, entry.size) else {
                continue;
            };
            let key = (candidate.subject.clone(), candidate.grade);
            match latest_per_subject_grade.get(&key) {
                Some(existing) if existing.version >= candidate.version => {}
                _ => {
                    latest_per_subject_grade.insert(key, candidate);
                }
            }
        }

        let mut candidates = Vec::new();
        for candidate in latest_per_subject_grade.into_values() {
            let triple = semester_one_triple(&candidate)?;
            let installed = self.registry.installed(&triple).await?;
            if installed.map(|v| candidate.version > v).unwrap_or(true) {
                candidates.push(candidate);
            }
        }

        Ok(candidates)
    }

    async fn process_candidate(&self, candidate: &CandidateKey) -> Result<CandidateOutcome, PipelineError> {
        let package = self.fetch_package(candidate).await?;

        package.validate()?;
        checksum_service::verify_or_err(&package)?;

        // Pin to semester 1 rather than trusting the decoded package's own
        // `semester` field: this key layout cannot address semester 2 (§9
        // Open Question (a)), so every candidate discovered via `list_all`
        // is, and must stay, registered under the same semester-1 triple
        // `enumerate_candidates` filtered it against. Trusting a decoded
        // semester of 2 here would desync that filter from what actually
        // gets registered, making the puller re-fetch and re-install this
        // candidate on every subsequent tick.
        let triple = semester_one_triple(candidate)?;
        if package.semester != 1 {
            warn!(
                subject = %triple.subject,
                grade = triple.grade,
                declared_semester = package.semester,
                "package declares a semester other than 1; this object-store key layout has no semester \
                 segment, so it is installed under the semester-1 line regardless"
            );
        }

        // The candidate may have been superseded (e.g. a rollback, or a
        // concurrent install of this same triple) between enumeration and
        // now; re-check before upserting so a stale fetch is tallied as
        // skipped rather than silently reinstalling an old version.
        if let Some(installed) = self.registry.installed(&triple).await? {
            if package.version <= installed {
                return Ok(CandidateOutcome::Skipped);
            }
        }

        let ids: Vec<String> = package.chunks.iter().map(|c| c.chunk_id.clone()).collect();
        let texts: Vec<String> = package.chunks.iter().map(|c| c.text.clone()).collect();
        let vectors: Vec<Vec<f64>> = package.chunks.iter().map(|c| c.embedding.clone()).collect();
        let metadatas: Vec<_> = package.chunks.iter().map(|c| c.metadata.clone()).collect();

        self.vector_index
            .upsert_collection(&triple.collection_name(), &ids, &texts, &vectors, &metadatas)
            .await?;

        self.registry
            .register(&triple, package.version, package.chunks.len(), package.checksum.clone())
            .await?;

        // Retain the freshly installed full package locally so the next
        // delta for this triple can be reconstructed without a second
        // network round trip to re-fetch the base (SPEC_FULL.md §9).
        self.blob_store.write(&triple, &package)?;

        let deleted = self.cache.delete_matching(RESPONSE_SCOPE_PATTERN).await?;
        info!(subject = %triple.subject, version = %package.version, invalidated = deleted, "installed new version");

        Ok(CandidateOutcome::Installed)
    }

    /// TryDelta then FullFetch (§4.7 steps 1-2).
    async fn fetch_package(&self, candidate: &CandidateKey) -> Result<Package, PipelineError> {
        let triple = semester_one_triple(candidate)?;
        if let Some(base_version) = self.registry.installed(&triple).await? {
            match self.try_delta(candidate, base_version).await {
                Ok(package) => return Ok(package),
                Err(err) => {
                    warn!(subject = %candidate.subject, error = %err, "delta unavailable, falling back to full fetch");
                }
            }
        }

        let key = full_package_key(&candidate.subject, candidate.grade, &candidate.version);
        let bytes = self.object_store.get(&key).await?;
        codec::decode_package(&bytes)
    }

    async fn try_delta(&self, candidate: &CandidateKey, base_version: Version) -> Result<Package, PipelineError> {
        let key = delta_key(&candidate.subject, candidate.grade, &candidate.version);
        let head = self.object_store.head(&key).await?;
        if head.is_none() {
            return Err(PipelineError::not_found(key));
        }

        let bytes = self.object_store.get(&key).await?;
        let delta = codec::decode_delta(&bytes)?;

        // Reconstruct against the locally retained full package rather than
        // re-downloading it — the whole point of taking the delta path.
        let triple = semester_one_triple(candidate)?;
        let base_package = self
            .blob_store
            .read(&triple)?
            .ok_or_else(|| PipelineError::not_found(format!("no locally retained base package for {triple}")))?;
        if base_package.version != base_version {
            return Err(PipelineError::DeltaBaseMismatch(format!(
                "locally retained base is {} but registry reports installed {}",
                base_package.version, base_version
            )));
        }

        delta_service::apply(&base_package, &delta)
    }
}

enum CandidateOutcome {
    Installed,
    Skipped,
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cross-component seed-test scenarios (spec.md §8, S1-S6).
//!
//! Each test builds a full `Puller` against real adapters: an
//! `HttpObjectStoreClient` pointed at a `wiremock` server standing in for
//! the remote bucket, a `SqliteVersionRegistry` over a temp-file database, a
//! `FileVectorIndex` and `PackageBlobStore` over a temp directory, and an
//! `LruResponseCache`. Only the network the object store talks to is
//! mocked; everything downstream is the production adapter.

use std::sync::Arc;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vkp::application::puller::Puller;
use vkp::infrastructure::cache::LruResponseCache;
use vkp::infrastructure::object_store::{delta_key, full_package_key, HttpObjectStoreClient, RetryPolicy};
use vkp::infrastructure::registry::{schema, SqliteVersionRegistry};
use vkp::infrastructure::vector_index::FileVectorIndex;
use vkp::infrastructure::{codec, PackageBlobStore};
use vkp_domain::repositories::{ObjectStoreClient, ResponseCache, VectorIndexAdapter, VersionRegistry};
use vkp_domain::services::delta_service;
use vkp_domain::{Chunk, ChunkConfig, Package, Seal, Triple, Version};

const BUCKET: &str = "vkp-bucket";

/// Everything a scenario needs: the live `Puller` plus handles to every
/// adapter it was built from, so assertions can inspect state directly.
struct Harness {
    puller: Puller,
    registry: Arc<dyn VersionRegistry>,
    vector_index: Arc<dyn VectorIndexAdapter>,
    cache: Arc<dyn ResponseCache>,
    _db_file: NamedTempFile,
    _persist_dir: TempDir,
}

async fn harness(server: &MockServer) -> Harness {
    let retry_policy = RetryPolicy::new(3, Duration::from_millis(1));
    let object_store: Arc<dyn ObjectStoreClient> = Arc::new(
        HttpObjectStoreClient::new(
            &format!("{}/", server.uri()),
            BUCKET,
            Duration::from_secs(5),
            Duration::from_secs(5),
            retry_policy,
        )
        .unwrap(),
    );

    let db_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", db_file.path().to_str().unwrap());
    let pool = schema::initialize_database(&db_url).await.unwrap();
    let registry: Arc<dyn VersionRegistry> = Arc::new(SqliteVersionRegistry::new(pool));

    let persist_dir = TempDir::new().unwrap();
    let vector_index: Arc<dyn VectorIndexAdapter> = Arc::new(FileVectorIndex::new(persist_dir.path()));
    let blob_store = Arc::new(PackageBlobStore::new(persist_dir.path()));

    let cache: Arc<dyn ResponseCache> = Arc::new(LruResponseCache::new(100));

    let puller = Puller::new(object_store.clone(), registry.clone(), vector_index.clone(), cache.clone(), blob_store);

    Harness { puller, registry, vector_index, cache, _db_file: db_file, _persist_dir: persist_dir }
}

fn chunk(id: &str, text: &str, value: f64) -> Chunk {
    Chunk::new(id, text, vec![value, value + 0.1]).unwrap()
}

fn package(version: Version, chunks: Vec<Chunk>) -> Package {
    let unsealed = Package {
        checksum: Seal::from_hex_digest("0".repeat(64)),
        chunk_config: ChunkConfig::new(512, 64),
        total_chunks: chunks.len(),
        chunks,
        created_at: chrono::Utc::now(),
        embedding_model: "text-embedding-3".to_string(),
        grade: 10,
        semester: 1,
        source_files: vec!["bab1.pdf".to_string()],
        subject: "matematika".to_string(),
        version,
    };
    vkp_domain::services::checksum_service::sealed(unsealed).unwrap()
}

fn triple() -> Triple {
    Triple::new("matematika", 10, 1).unwrap()
}

/// Mounts a bucket listing containing exactly the given full-package
/// versions (delta keys are never part of a listing, per §6).
async fn mount_listing(server: &MockServer, versions: &[(&Version, u64)]) {
    let contents: Vec<_> = versions
        .iter()
        .map(|(v, size)| {
            serde_json::json!({
                "key": full_package_key("matematika", 10, v),
                "size": size,
            })
        })
        .collect();
    let body = serde_json::json!({ "contents": contents });

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_full_package(server: &MockServer, version: &Version, bytes: &[u8]) {
    let key = full_package_key("matematika", 10, version);
    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

async fn mount_delta(server: &MockServer, version: &Version, bytes: &[u8]) {
    let key = delta_key("matematika", 10, version);
    Mock::given(method("HEAD"))
        .and(path(format!("/{BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// S1. Fresh install: a single v1.0.0 full package, empty registry.
#[tokio::test]
async fn s1_fresh_install() {
    let server = MockServer::start().await;

    let v1 = package(
        Version::new(1, 0, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body", 0.2), chunk("c_2", "outro", 0.3)],
    );
    let v1_bytes = codec::encode_package(&v1).unwrap();

    mount_listing(&server, &[(&v1.version, v1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1.version, &v1_bytes).await;

    let harness = harness(&server).await;
    let report = harness.puller.tick().await.unwrap().expect("online tick");

    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 0);

    let installed = harness.registry.installed(&triple()).await.unwrap();
    assert_eq!(installed, Some(Version::new(1, 0, 0)));

    let count = harness.vector_index.count("matematika_grade10_sem1").await.unwrap();
    assert_eq!(count, 3);
}

/// S2. Delta update after S1: modify c_1, add c_3, remove c_2. The full
/// v1.1.0 key is never fetched — the delta path is taken instead.
#[tokio::test]
async fn s2_delta_update_takes_the_delta_path() {
    let server = MockServer::start().await;

    let v1 = package(
        Version::new(1, 0, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body", 0.2), chunk("c_2", "outro", 0.3)],
    );
    let v1_bytes = codec::encode_package(&v1).unwrap();

    let v1_1 = package(
        Version::new(1, 1, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body-revised", 0.25), chunk("c_3", "appendix", 0.4)],
    );
    let v1_1_bytes = codec::encode_package(&v1_1).unwrap();
    let delta = delta_service::diff(&v1, &v1_1).unwrap();
    let delta_bytes = codec::encode_delta(&delta).unwrap();
    assert!(delta_bytes.len() < v1_1_bytes.len(), "delta must be smaller than the full target package");

    mount_listing(&server, &[(&v1.version, v1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1.version, &v1_bytes).await;

    let harness = harness(&server).await;
    let first = harness.puller.tick().await.unwrap().expect("online tick");
    assert_eq!(first.successful, 1);

    // Now the remote advertises v1.1.0 with a delta; the full v1.1.0 body is
    // deliberately never mounted, so fetching it would 404.
    mount_listing(&server, &[(&v1_1.version, v1_1_bytes.len() as u64)]).await;
    mount_delta(&server, &v1_1.version, &delta_bytes).await;

    let second = harness.puller.tick().await.unwrap().expect("online tick");
    assert_eq!(second.successful, 1, "errors: {:?}", second.errors);
    assert_eq!(second.failed, 0);

    let installed = harness.registry.installed(&triple()).await.unwrap();
    assert_eq!(installed, Some(Version::new(1, 1, 0)));

    let full_v1_1_key = full_package_key("matematika", 10, &v1_1.version);
    let requests = server.received_requests().await.unwrap();
    let fetched_full_target =
        requests.iter().any(|r| r.method.as_str() == "GET" && r.url.path() == format!("/{BUCKET}/{full_v1_1_key}"));
    assert!(!fetched_full_target, "the full v1.1.0 package must never be downloaded when a delta applies cleanly");
}

/// S3. Corrupted full fallback: v1.2.0 full with a flipped checksum byte and
/// no delta. The candidate is rejected and the prior version stays active.
#[tokio::test]
async fn s3_corrupted_full_fallback_is_rejected() {
    let server = MockServer::start().await;

    let v1_1 = package(
        Version::new(1, 1, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body-revised", 0.25), chunk("c_3", "appendix", 0.4)],
    );
    let v1_1_bytes = codec::encode_package(&v1_1).unwrap();

    mount_listing(&server, &[(&v1_1.version, v1_1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1_1.version, &v1_1_bytes).await;

    let harness = harness(&server).await;
    let first = harness.puller.tick().await.unwrap().expect("online tick");
    assert_eq!(first.successful, 1);

    let mut v1_2 = package(
        Version::new(1, 2, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body-revised", 0.25), chunk("c_3", "appendix-revised", 0.45)],
    );
    // Flip one hex character of the seal: still shape-valid, numerically wrong.
    let corrupted_hex = {
        let hex = v1_2.checksum.as_str().strip_prefix("sha256:").unwrap();
        let mut chars: Vec<char> = hex.chars().collect();
        chars[0] = if chars[0] == '0' { '1' } else { '0' };
        chars.into_iter().collect::<String>()
    };
    v1_2.checksum = Seal::from_hex_digest(corrupted_hex);
    let v1_2_bytes = codec::encode_package(&v1_2).unwrap();

    mount_listing(&server, &[(&v1_2.version, v1_2_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1_2.version, &v1_2_bytes).await;
    // No delta mounted: HEAD on the delta key 404s, forcing the full path.

    let second = harness.puller.tick().await.unwrap().expect("online tick");
    assert_eq!(second.successful, 0);
    assert_eq!(second.failed, 1);

    let installed = harness.registry.installed(&triple()).await.unwrap();
    assert_eq!(installed, Some(Version::new(1, 1, 0)), "a rejected candidate must not move the active version");
}

/// S4. Rollback: after two installs, rolling back reactivates the earlier
/// version and history still lists both entries.
#[tokio::test]
async fn s4_rollback_reactivates_prior_version() {
    let server = MockServer::start().await;

    let v1 = package(Version::new(1, 0, 0), vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body", 0.2)]);
    let v1_bytes = codec::encode_package(&v1).unwrap();
    mount_listing(&server, &[(&v1.version, v1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1.version, &v1_bytes).await;

    let harness = harness(&server).await;
    harness.puller.tick().await.unwrap().unwrap();

    let v1_1 = package(
        Version::new(1, 1, 0),
        vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body-revised", 0.25)],
    );
    let v1_1_bytes = codec::encode_package(&v1_1).unwrap();
    mount_listing(&server, &[(&v1_1.version, v1_1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1_1.version, &v1_1_bytes).await;
    harness.puller.tick().await.unwrap().unwrap();

    assert_eq!(harness.registry.installed(&triple()).await.unwrap(), Some(Version::new(1, 1, 0)));

    harness.registry.rollback(&triple(), Version::new(1, 0, 0)).await.unwrap();
    assert_eq!(harness.registry.installed(&triple()).await.unwrap(), Some(Version::new(1, 0, 0)));

    let history = harness.registry.history(&triple()).await.unwrap();
    assert_eq!(history.len(), 2);
    let active_entries: Vec<_> = history.iter().filter(|e| e.active).collect();
    assert_eq!(active_entries.len(), 1);
    assert_eq!(active_entries[0].version, Version::new(1, 0, 0));

    let key_before = vkp_domain::repositories::key_of("2+2?", "matematika", "1.1.0");
    let key_after = vkp_domain::repositories::key_of("2+2?", "matematika", "1.0.0");
    assert_ne!(key_before, key_after, "rollback must change the active-version-scoped cache key");
}

/// S5. Cache hit then invalidation: a cached response survives a repeat
/// query under the same version, then misses once a new version installs.
#[tokio::test]
async fn s5_cache_hit_then_post_install_invalidation() {
    let server = MockServer::start().await;

    let v1 = package(Version::new(1, 0, 0), vec![chunk("c_0", "intro", 0.1), chunk("c_1", "body", 0.2)]);
    let v1_bytes = codec::encode_package(&v1).unwrap();
    mount_listing(&server, &[(&v1.version, v1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1.version, &v1_bytes).await;

    let harness = harness(&server).await;
    harness.puller.tick().await.unwrap().unwrap();

    let question = "what is photosynthesis?";
    let key_v1 = vkp_domain::repositories::key_of(question, "matematika", "1.0.0");

    assert_eq!(harness.cache.get(&key_v1).await.unwrap(), None, "first ask is a miss");
    harness.cache.put(&key_v1, "a one-sentence answer", 3600).await.unwrap();
    assert_eq!(harness.cache.get(&key_v1).await.unwrap(), Some("a one-sentence answer".to_string()));

    let v1_1 = package(
        Version::new(1, 1, 0),
        vec![chunk("c_0", "intro-revised", 0.15), chunk("c_1", "body", 0.2)],
    );
    let v1_1_bytes = codec::encode_package(&v1_1).unwrap();
    mount_listing(&server, &[(&v1_1.version, v1_1_bytes.len() as u64)]).await;
    mount_full_package(&server, &v1_1.version, &v1_1_bytes).await;

    let report = harness.puller.tick().await.unwrap().unwrap();
    assert_eq!(report.successful, 1);

    // The old key is gone (whole-response-scope flush, §4.9), and the newly
    // active version scopes a different key for the same question.
    assert_eq!(harness.cache.get(&key_v1).await.unwrap(), None, "install must invalidate the prior version's entry");
    let key_v1_1 = vkp_domain::repositories::key_of(question, "matematika", "1.1.0");
    assert_ne!(key_v1, key_v1_1);
    assert_eq!(harness.cache.get(&key_v1_1).await.unwrap(), None, "nothing cached yet under the new version");
}

/// S6. Offline tick: with the object store entirely unreachable, the tick
/// completes as a no-op and the registry is left untouched.
#[tokio::test]
async fn s6_offline_tick_is_a_no_op() {
    // An endpoint nothing listens on: every call classifies as `Unreachable`.
    let object_store: Arc<dyn ObjectStoreClient> = Arc::new(
        HttpObjectStoreClient::new(
            "http://127.0.0.1:1/",
            BUCKET,
            Duration::from_millis(50),
            Duration::from_millis(50),
            RetryPolicy::new(1, Duration::from_millis(1)),
        )
        .unwrap(),
    );

    let db_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", db_file.path().to_str().unwrap());
    let pool = schema::initialize_database(&db_url).await.unwrap();
    let registry: Arc<dyn VersionRegistry> = Arc::new(SqliteVersionRegistry::new(pool));

    let persist_dir = TempDir::new().unwrap();
    let vector_index: Arc<dyn VectorIndexAdapter> = Arc::new(FileVectorIndex::new(persist_dir.path()));
    let blob_store = Arc::new(PackageBlobStore::new(persist_dir.path()));
    let cache: Arc<dyn ResponseCache> = Arc::new(LruResponseCache::new(100));

    let puller = Puller::new(object_store, registry.clone(), vector_index, cache, blob_store);

    let result = puller.tick().await.unwrap();
    assert!(result.is_none(), "an unreachable store must surface as an offline no-op, not a report");
    assert_eq!(registry.installed(&triple()).await.unwrap(), None);
}

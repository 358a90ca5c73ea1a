//! Integration Tests
//!
//! Aggregates the cross-component seed-test scenarios (S1-S6, spec.md §8)
//! for the VKP distribution core. Each scenario drives the real `Puller`
//! state machine against an HTTP mock object store, a SQLite-backed version
//! registry, a file-backed vector index, a local package blob store, and an
//! in-process response cache — no component is faked out at this layer.

#[path = "integration/scenarios.rs"]
mod scenarios;

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # VKP Domain
//!
//! Pure, reusable business logic for the Versioned Knowledge Package
//! distribution core, following Domain-Driven Design principles. This crate
//! has no I/O of its own: it defines the package/delta data model, the
//! checksum sealer, the delta engine, and the repository *interfaces* that
//! `vkp`'s infrastructure layer implements.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                Entities                      │
//! │   Chunk · Package · Delta · RegistryEntry    │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │              Domain Services                 │
//! │  checksum_service (C2) · delta_service (C4)  │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │          Repository Ports (async)            │
//! │  VersionRegistry · ObjectStoreClient ·       │
//! │  VectorIndexAdapter · ResponseCache          │
//! └─────────────────────────────────────────────┘
//! ```

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{Chunk, ChunkMetadata, Delta, DeltaMetadata, Package, RegistryEntry};
pub use error::PipelineError;
pub use value_objects::{ChunkConfig, Seal, Triple, Version};

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete adapters for every repository port `vkp-domain` defines, plus
//! the ambient stack (config, logging, metrics) and the wire codec.

pub mod blob_store;
pub mod cache;
pub mod codec;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod object_store;
pub mod registry;
pub mod vector_index;

pub use blob_store::PackageBlobStore;
pub use config::VkpConfig;
pub use metrics::MetricsCollector;

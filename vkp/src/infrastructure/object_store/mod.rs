// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Object-store infrastructure: HTTP client against an S3-compatible bucket
//! plus the retry/backoff policy that wraps every remote call (C6).

pub mod client;
pub mod retry;

pub use client::{delta_key, full_package_key, HttpObjectStoreClient};
pub use retry::RetryPolicy;

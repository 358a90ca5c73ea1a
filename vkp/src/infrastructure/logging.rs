// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tracing subscriber setup. The puller and the bootstrap CLI both call
//! `init()` once at process start; library code below this point just emits
//! `tracing` spans/events and never touches a subscriber directly.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber. `RUST_LOG` (or `VKP_LOG`, checked
/// first) controls verbosity; defaults to `info` when neither is set.
pub fn init() {
    let filter = EnvFilter::try_from_env("VKP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Version registry infrastructure: SQLite-backed `VersionRegistry` (C5).

pub mod schema;
pub mod sqlite_registry;

pub use sqlite_registry::SqliteVersionRegistry;

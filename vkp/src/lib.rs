// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # VKP Distribution Core
//!
//! The application and infrastructure layers of the Versioned Knowledge
//! Package distribution core: the puller state machine that drives a
//! distribution tick, and the concrete adapters (object store, version
//! registry, vector index, response cache) it's built on. Domain types and
//! logic live in `vkp_domain`; this crate wires them to the outside world.

pub mod application;
pub mod infrastructure;

pub use application::{Puller, TickReport};

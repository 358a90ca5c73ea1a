// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # System Signal Handling
//!
//! Cross-platform signal handling for graceful shutdown of a long-lived
//! puller process (one started as a daemon rather than invoked per-tick by
//! cron).
//!
//! ## Supported Signals
//!
//! - **SIGTERM** (15) - graceful shutdown request
//! - **SIGINT** (2) - user interrupt (Ctrl+C)
//! - **SIGHUP** (1) - hangup (terminal closed), Unix only

use std::future::Future;
use std::pin::Pin;

/// Callback type for shutdown notification.
pub type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

/// System signal handling trait: abstracts platform-specific signal
/// handling behind a single async wait.
pub trait SystemSignals: Send + Sync {
    /// Waits for a shutdown signal and invokes the callback.
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Unix signal handler: SIGTERM, SIGINT, SIGHUP via `tokio::signal::unix`.
#[cfg(unix)]
#[derive(Default)]
pub struct UnixSignalHandler;

#[cfg(unix)]
impl UnixSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl SystemSignals for UnixSignalHandler {
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
                tracing::warn!("failed to register SIGTERM handler");
                return;
            };
            let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
                tracing::warn!("failed to register SIGINT handler");
                return;
            };
            let Ok(mut sighup) = signal(SignalKind::hangup()) else {
                tracing::warn!("failed to register SIGHUP handler");
                return;
            };

            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, initiating graceful shutdown");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT (Ctrl+C), initiating graceful shutdown");
                }
                _ = sighup.recv() => {
                    tracing::info!("received SIGHUP, initiating graceful shutdown");
                }
            }

            on_shutdown();
        })
    }
}

/// Windows signal handler: Ctrl+C via `tokio::signal::ctrl_c`.
#[cfg(windows)]
#[derive(Default)]
pub struct WindowsSignalHandler;

#[cfg(windows)]
impl WindowsSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl SystemSignals for WindowsSignalHandler {
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("failed to register Ctrl+C handler");
                return;
            }
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
            on_shutdown();
        })
    }
}

/// No-op signal handler for tests: never completes, letting tests drive
/// shutdown explicitly instead of waiting on a real signal.
#[derive(Default)]
pub struct NoOpSignalHandler;

impl NoOpSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

impl SystemSignals for NoOpSignalHandler {
    fn wait_for_signal(&self, _on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            std::future::pending::<()>().await;
        })
    }
}

/// Returns the platform-appropriate signal handler.
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    #[cfg(unix)]
    {
        Box::new(UnixSignalHandler::new())
    }

    #[cfg(windows)]
    {
        Box::new(WindowsSignalHandler::new())
    }

    #[cfg(not(any(unix, windows)))]
    {
        compile_error!("unsupported platform for signal handling");
    }
}

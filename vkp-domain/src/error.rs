// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single, hierarchical error type for the VKP distribution core. Errors
//! are categorized so callers can decide whether to retry, fall back, or
//! give up without inspecting message strings.

use thiserror::Error;

/// Domain-specific errors for the VKP distribution system.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    // --- Format / validation (fatal, not retried) ---
    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Malformed checksum: {0}")]
    MalformedChecksum(String),

    #[error("Invalid triple: {0}")]
    InvalidTriple(String),

    #[error("Empty chunk field: {0}")]
    EmptyChunkField(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // --- Integrity ---
    #[error("Seal mismatch: {0}")]
    SealMismatch(String),

    // --- Compatibility ---
    #[error("Incompatible diff: {0}")]
    IncompatibleDiff(String),

    #[error("Delta base mismatch: {0}")]
    DeltaBaseMismatch(String),

    // --- Transport ---
    #[error("Unreachable: {0}")]
    Unreachable(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network gave up: {0}")]
    NetworkGaveUp(String),

    // --- Access ---
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // --- Storage ---
    #[error("Registry conflict: {0}")]
    RegistryConflict(String),

    #[error("Vector index failure: {0}")]
    VectorIndexFailure(String),

    #[error("Cache failure: {0}")]
    CacheFailure(String),

    // --- System ---
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn seal_mismatch(msg: impl Into<String>) -> Self {
        Self::SealMismatch(msg.into())
    }

    pub fn incompatible_diff(msg: impl Into<String>) -> Self {
        Self::IncompatibleDiff(msg.into())
    }

    pub fn delta_base_mismatch(msg: impl Into<String>) -> Self {
        Self::DeltaBaseMismatch(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether the failure represents a transient condition worth retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Timeout(_) | PipelineError::ServerError(_) | PipelineError::IoError(_)
        )
    }

    /// Whether the failure is a data-integrity problem (package must be discarded).
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, PipelineError::SealMismatch(_))
    }

    /// Coarse category, useful for metrics labels and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::MalformedVersion(_)
            | PipelineError::MalformedChecksum(_)
            | PipelineError::InvalidTriple(_)
            | PipelineError::EmptyChunkField(_)
            | PipelineError::ValidationError(_) => "validation",
            PipelineError::SealMismatch(_) => "integrity",
            PipelineError::IncompatibleDiff(_) | PipelineError::DeltaBaseMismatch(_) => "compatibility",
            PipelineError::Unreachable(_)
            | PipelineError::Timeout(_)
            | PipelineError::ServerError(_)
            | PipelineError::NetworkGaveUp(_) => "transport",
            PipelineError::Unauthorized(_) | PipelineError::NotFound(_) => "access",
            PipelineError::RegistryConflict(_)
            | PipelineError::VectorIndexFailure(_)
            | PipelineError::CacheFailure(_) => "storage",
            PipelineError::IoError(_) => "io",
            PipelineError::SerializationError(_) => "serialization",
            PipelineError::InternalError(_) => "internal",
            PipelineError::Cancelled(_) => "cancellation",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

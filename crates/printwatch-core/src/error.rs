// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printwatch.

use thiserror::Error;

/// Top-level error type for all Printwatch operations.
#[derive(Debug, Error)]
pub enum PrintwatchError {
    // -- Job lifecycle --
    #[error("device resolution failed: {0}")]
    Resolution(String),

    #[error("job submission failed: {0}")]
    Submission(String),

    #[error("no printer selected")]
    NoPrinterSelected,

    // -- Realtime channel --
    #[error("realtime channel error: {0}")]
    Channel(String),

    // -- Storage / persistence --
    #[error("key-value store error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrintwatchError {
    /// Whether the same call may succeed if repeated later.
    ///
    /// Resolution, submission and channel failures depend on remote state;
    /// everything else needs a change on the caller's side first.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Resolution(_) | Self::Submission(_) | Self::Channel(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintwatchError>;

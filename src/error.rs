// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for stampsort

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stampsort operations
pub type Result<T> = std::result::Result<T, StampsortError>;

/// stampsort error types
#[derive(Error, Debug)]
pub enum StampsortError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path:?}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free collision suffix left for {path:?}")]
    CollisionExhausted { path: PathBuf },

    #[error("{path:?} is not under the classification root {root:?}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Cannot move {from:?} to {to:?}: source and destination are on different devices")]
    CrossDevice { from: PathBuf, to: PathBuf },
}

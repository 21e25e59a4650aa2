// Dweve perfmerge - Benchmark Result Aggregation
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured error types for the perfmerge CLI.
//!
//! All CLI operations return `Result<T, CliError>`. Errors coming out of the
//! aggregation core are wrapped unchanged in [`CliError::Core`].

use perfmerge_core::PerfError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for perfmerge CLI operations.
///
/// Implements `Clone` so per-file failures can be collected from parallel
/// workers.
///
/// # Examples
///
/// ```rust,no_run
/// use perfmerge_cli::error::CliError;
///
/// fn read(path: &str) -> Result<Vec<u8>, CliError> {
///     std::fs::read(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// I/O operation failed (file read, write, or metadata access).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// A result document exceeds the configured size limit.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        /// The file path that exceeded the limit
        path: PathBuf,
        /// The actual file size in bytes
        actual: u64,
        /// The maximum allowed file size in bytes
        max: u64,
        /// The maximum allowed file size in MB (for display)
        max_mb: u64,
    },

    /// Error raised by the aggregation core.
    #[error(transparent)]
    Core(#[from] PerfError),

    /// Invalid input provided by the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    pub fn file_too_large(path: impl AsRef<Path>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.as_ref().to_path_buf(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true when no group produced any benchmark data.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Core(PerfError::NoData))
    }

    /// Converts a per-file failure into the error recorded by the pipeline.
    ///
    /// Core errors pass through; read failures become [`PerfError::Io`].
    pub fn into_document_error(self) -> PerfError {
        match self {
            Self::Core(err) => err,
            other => PerfError::Io(other.to_string()),
        }
    }
}

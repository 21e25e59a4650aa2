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

//! Error types for the aggregation pipeline.
//!
//! Only [`PerfError::NoData`] is terminal for a run. Parse failures are
//! attached to the document that caused them and reported as warnings while
//! the remaining documents are still processed.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PerfError>;

/// Errors produced while decoding documents or building reports.
///
/// # Examples
///
/// ```
/// use perfmerge_core::PerfError;
///
/// let err = PerfError::parse("run-1_perfresult.json", "expected value at line 1 column 1");
/// assert_eq!(
///     err.to_string(),
///     "Failed to parse 'run-1_perfresult.json': expected value at line 1 column 1"
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerfError {
    /// A raw document could not be decoded.
    #[error("Failed to parse '{provenance}': {message}")]
    Parse {
        /// Identifier of the offending document (usually a file name).
        provenance: String,
        /// Decoder message.
        message: String,
    },

    /// A document decoded but has no benchmark container.
    #[error("Document '{provenance}' has no '{container}' field")]
    MissingContainer {
        /// Identifier of the offending document.
        provenance: String,
        /// Name of the expected container field.
        container: String,
    },

    /// Neither source group produced a single canonical operation.
    #[error("No benchmark data found in either source group")]
    NoData,

    /// Writing or reading the tabular report failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// A previously written report does not have the expected layout.
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// I/O error while writing an artifact.
    #[error("I/O error: {0}")]
    Io(String),

    /// A chart could not be drawn.
    #[error("Chart error: {0}")]
    Chart(String),
}

impl PerfError {
    /// Create a parse error for the given document.
    pub fn parse(provenance: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            provenance: provenance.into(),
            message: message.into(),
        }
    }

    /// Create a missing-container error for the given document.
    pub fn missing_container(provenance: impl Into<String>, container: impl Into<String>) -> Self {
        Self::MissingContainer {
            provenance: provenance.into(),
            container: container.into(),
        }
    }

    /// Create a chart drawing error.
    pub fn chart(msg: impl ToString) -> Self {
        Self::Chart(msg.to_string())
    }

    /// Create an invalid-report error.
    pub fn invalid_report(msg: impl Into<String>) -> Self {
        Self::InvalidReport(msg.into())
    }

    /// Returns true for failures scoped to a single document.
    pub fn is_document_failure(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingContainer { .. })
    }
}

impl From<csv::Error> for PerfError {
    fn from(source: csv::Error) -> Self {
        Self::Csv(source.to_string())
    }
}

impl From<std::io::Error> for PerfError {
    fn from(source: std::io::Error) -> Self {
        Self::Io(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = PerfError::parse("a_perfresult.json", "EOF while parsing");
        let msg = err.to_string();
        assert!(msg.contains("a_perfresult.json"));
        assert!(msg.contains("EOF while parsing"));
    }

    #[test]
    fn test_missing_container_display() {
        let err = PerfError::missing_container("b.json", "benchmarks");
        assert_eq!(
            err.to_string(),
            "Document 'b.json' has no 'benchmarks' field"
        );
    }

    #[test]
    fn test_document_failure_classification() {
        assert!(PerfError::parse("x", "y").is_document_failure());
        assert!(PerfError::missing_container("x", "benchmarks").is_document_failure());
        assert!(!PerfError::NoData.is_document_failure());
        assert!(!PerfError::Csv("boom".into()).is_document_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PerfError = io_err.into();
        assert!(matches!(err, PerfError::Io(ref m) if m.contains("denied")));
    }
}

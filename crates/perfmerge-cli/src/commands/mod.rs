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

//! CLI command implementations

mod chart;
mod inspect;
mod report;

pub use chart::{chart, ChartArgs};
pub use inspect::{inspect, InspectArgs};
pub use report::{report, ReportArgs};

use crate::batch::{BatchProcessor, ExtractOperation};
use crate::discovery::discover;
use crate::error::CliError;
use perfmerge_core::{Extraction, RecordExtractor, SourceGroup};
use std::fs;
use std::path::{Path, PathBuf};

/// Default maximum size of a single result document (100 MB).
/// Can be overridden via the PERFMERGE_MAX_FILE_SIZE environment variable.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Environment variable overriding [`DEFAULT_MAX_FILE_SIZE`].
pub const MAX_FILE_SIZE_ENV: &str = "PERFMERGE_MAX_FILE_SIZE";

/// Get the maximum file size from environment or use default.
///
/// Invalid values fall back to [`DEFAULT_MAX_FILE_SIZE`].
pub fn max_file_size() -> u64 {
    std::env::var(MAX_FILE_SIZE_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file from disk with size validation.
///
/// The size is checked through `fs::metadata()` before anything is
/// allocated, so oversized documents are rejected without being read.
///
/// # Errors
///
/// Returns [`CliError::FileTooLarge`] if the file exceeds `max_size`, and
/// [`CliError::Io`] if the metadata or contents cannot be read.
pub fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    if metadata.len() > max_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_size));
    }

    fs::read(path).map_err(|e| CliError::io_error(path, e))
}

/// Parses a single-byte CSV delimiter.
///
/// Accepts one ASCII character or the escape `\t`.
pub fn parse_delimiter(value: &str) -> Result<u8, CliError> {
    match value {
        "\\t" | "\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() && v != "\n" && v != "\r" && v != "\"" => {
            Ok(v.as_bytes()[0])
        }
        other => Err(CliError::invalid_input(format!(
            "delimiter must be a single ASCII character, got '{}'",
            other
        ))),
    }
}

/// Directory holding the result documents of one source group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSource {
    pub group: SourceGroup,
    pub dir: PathBuf,
}

impl GroupSource {
    pub fn new(group: SourceGroup, dir: impl Into<PathBuf>) -> Self {
        Self {
            group,
            dir: dir.into(),
        }
    }
}

/// Discovers and extracts the documents of every source group.
///
/// `limit` caps the number of files taken from each group, after sorting.
/// Per-file failures are returned as failed extractions.
///
/// # Errors
///
/// Only fails if the batch processor cannot start.
pub fn extract_sources(
    sources: &[GroupSource],
    suffix: &str,
    limit: Option<usize>,
    processor: &BatchProcessor,
    extractor: &RecordExtractor,
    show_progress: bool,
) -> Result<Vec<Extraction>, CliError> {
    let mut extractions = Vec::new();
    for source in sources {
        let mut files = discover(&source.dir, suffix);
        if let Some(limit) = limit {
            files.truncate(limit);
        }
        let results = processor.process(
            &files,
            ExtractOperation::new(source.group, extractor),
            show_progress,
        )?;
        extractions.extend(
            results
                .results
                .into_iter()
                .map(|r| r.into_extraction(source.group)),
        );
    }
    Ok(extractions)
}

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

//! Batch extraction of result documents with parallel execution.
//!
//! Every document is an independent task: it is read, decoded and turned
//! into records on its own, serially for small batches and on the Rayon
//! pool above [`BatchConfig::parallel_threshold`]. Per-file results are
//! collected in input order and folded into the aggregator afterwards by a
//! single thread, so no accumulator is ever shared between workers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use perfmerge_cli::batch::{BatchConfig, BatchProcessor, ExtractOperation};
//! use perfmerge_core::{RecordExtractor, SourceGroup};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = BatchProcessor::new(BatchConfig::default());
//! let extractor = RecordExtractor::new();
//! let files = vec![PathBuf::from("shared_matrix_memory/run1_perfresult.json")];
//!
//! let operation = ExtractOperation::new(SourceGroup::A, &extractor);
//! let results = processor.process(&files, operation, false)?;
//! println!("{} of {} files extracted", results.success_count(), results.total_files());
//! # Ok(())
//! # }
//! ```

use crate::commands::{max_file_size, read_file};
use crate::error::CliError;
use colored::Colorize;
use perfmerge_core::{Extraction, MetricRecord, RecordExtractor, SourceGroup};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::debug;

/// Configuration for batch processing operations.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Minimum number of files to trigger parallel processing.
    ///
    /// Default: 10
    pub parallel_threshold: usize,

    /// Maximum number of threads to use for parallel processing.
    ///
    /// None means use Rayon's default (typically number of CPU cores).
    pub max_threads: Option<usize>,

    /// Number of files between progress updates. Set to 0 to disable.
    pub progress_interval: usize,

    /// Show one line per processed file.
    pub verbose: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 10,
            max_threads: None,
            progress_interval: 0,
            verbose: false,
        }
    }
}

/// Result of processing a single file in a batch operation.
#[derive(Debug, Clone)]
pub struct FileResult<T> {
    /// The file path that was processed
    pub path: PathBuf,
    /// The result of processing (Ok or Err)
    pub result: Result<T, CliError>,
}

impl<T> FileResult<T> {
    /// Create a successful file result.
    pub fn success(path: PathBuf, value: T) -> Self {
        Self {
            path,
            result: Ok(value),
        }
    }

    /// Create a failed file result.
    pub fn failure(path: PathBuf, error: CliError) -> Self {
        Self {
            path,
            result: Err(error),
        }
    }

    /// Check if the result is successful.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Check if the result is a failure.
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

impl FileResult<Vec<MetricRecord>> {
    /// Converts the outcome of an extraction into a pipeline input.
    pub fn into_extraction(self, source_group: SourceGroup) -> Extraction {
        let provenance = self.path.display().to_string();
        match self.result {
            Ok(records) => Extraction::succeeded(source_group, provenance, records),
            Err(error) => Extraction::failed(source_group, provenance, error.into_document_error()),
        }
    }
}

/// Aggregated results from a batch processing operation.
#[derive(Debug, Clone)]
pub struct BatchResults<T> {
    /// Individual results in input order
    pub results: Vec<FileResult<T>>,
    /// Total processing time in milliseconds
    pub elapsed_ms: u128,
}

impl<T> BatchResults<T> {
    /// Create new batch results from a vector of file results.
    pub fn new(results: Vec<FileResult<T>>, elapsed_ms: u128) -> Self {
        Self { results, elapsed_ms }
    }

    /// Get the total number of files processed.
    pub fn total_files(&self) -> usize {
        self.results.len()
    }

    /// Get the number of successfully processed files.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Get the number of failed files.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Check if any files failed.
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.is_failure())
    }

    /// Get an iterator over failed results.
    pub fn failures(&self) -> impl Iterator<Item = &FileResult<T>> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Get processing throughput in files per second.
    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            (self.total_files() as f64) / (self.elapsed_ms as f64 / 1000.0)
        }
    }
}

/// Trait for batch operations on result files.
///
/// The operation must be `Send + Sync` to support parallel processing.
pub trait BatchOperation: Send + Sync {
    /// The output type for successful processing
    type Output: Send;

    /// Process a single file and return the result.
    ///
    /// # Errors
    ///
    /// Returns the per-file failure; the batch itself keeps going.
    fn process_file(&self, path: &Path) -> Result<Self::Output, CliError>;

    /// Get a human-readable name for this operation.
    fn name(&self) -> &str;
}

/// Reads one result document and extracts its metric records.
#[derive(Debug, Clone)]
pub struct ExtractOperation<'a> {
    source_group: SourceGroup,
    extractor: &'a RecordExtractor,
    max_size: u64,
}

impl<'a> ExtractOperation<'a> {
    /// Creates an extraction for one source group, honouring
    /// `PERFMERGE_MAX_FILE_SIZE`.
    pub fn new(source_group: SourceGroup, extractor: &'a RecordExtractor) -> Self {
        Self {
            source_group,
            extractor,
            max_size: max_file_size(),
        }
    }

    /// Overrides the per-file size limit.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }
}

impl BatchOperation for ExtractOperation<'_> {
    type Output = Vec<MetricRecord>;

    fn process_file(&self, path: &Path) -> Result<Self::Output, CliError> {
        let payload = read_file(path, self.max_size)?;
        let provenance = path.display().to_string();
        let records = self
            .extractor
            .extract_json(&payload, self.source_group, &provenance)?;
        Ok(records)
    }

    fn name(&self) -> &str {
        match self.source_group {
            SourceGroup::A => "extract group A",
            SourceGroup::B => "extract group B",
        }
    }
}

/// Progress tracker for batch operations.
///
/// Uses atomic counters for lock-free concurrent progress tracking.
#[derive(Debug)]
struct ProgressTracker {
    total: usize,
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    interval: usize,
    verbose: bool,
    start_time: Instant,
}

impl ProgressTracker {
    fn new(total: usize, interval: usize, verbose: bool) -> Self {
        Self {
            total,
            processed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            interval,
            verbose,
            start_time: Instant::now(),
        }
    }

    fn record<T>(&self, path: &Path, result: &Result<T, CliError>) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        match result {
            Ok(_) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if self.verbose {
                    eprintln!("{} {} - {}", "✗".red().bold(), path.display(), e);
                }
            }
        }

        if self.should_report(processed) {
            self.report_progress(path, result.is_ok());
        }
    }

    fn should_report(&self, processed: usize) -> bool {
        self.interval > 0 && (processed % self.interval == 0 || processed == self.total)
    }

    /// Report current progress to stderr.
    fn report_progress(&self, current_file: &Path, success: bool) {
        let processed = self.processed.load(Ordering::Relaxed);
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed().as_secs_f64().max(f64::EPSILON);
        let rate = processed as f64 / elapsed;

        if self.verbose {
            let status = if success {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            eprintln!(
                "{} [{}/{}] {} ({:.1} files/s)",
                status,
                processed,
                self.total,
                current_file.display(),
                rate
            );
        } else {
            eprintln!(
                "Progress: [{}/{}] {} succeeded, {} failed ({:.1} files/s)",
                processed, self.total, succeeded, failed, rate
            );
        }
    }
}

/// Batch processor for result documents.
///
/// Chooses serial or parallel processing from the configuration and the
/// number of files. Results always come back in input order.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor with the given configuration.
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Create a batch processor with default configuration.
    pub fn default_config() -> Self {
        Self::new(BatchConfig::default())
    }

    /// Process multiple files with the given operation.
    ///
    /// # Errors
    ///
    /// Only fails when a dedicated thread pool cannot be built. Per-file
    /// failures are returned inside [`BatchResults`].
    pub fn process<O>(
        &self,
        files: &[PathBuf],
        operation: O,
        show_progress: bool,
    ) -> Result<BatchResults<O::Output>, CliError>
    where
        O: BatchOperation,
    {
        let start_time = Instant::now();

        if files.is_empty() {
            return Ok(BatchResults::new(vec![], 0));
        }

        let tracker = show_progress.then(|| {
            ProgressTracker::new(
                files.len(),
                self.config.progress_interval,
                self.config.verbose,
            )
        });

        let results = if files.len() < self.config.parallel_threshold {
            debug!(operation = operation.name(), files = files.len(), "processing serially");
            self.process_serial(files, &operation, tracker.as_ref())
        } else if let Some(threads) = self.config.max_threads {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| CliError::invalid_input(format!("thread pool: {}", e)))?;
            debug!(operation = operation.name(), files = files.len(), threads, "processing in parallel");
            pool.install(|| self.process_parallel(files, &operation, tracker.as_ref()))
        } else {
            debug!(operation = operation.name(), files = files.len(), "processing in parallel");
            self.process_parallel(files, &operation, tracker.as_ref())
        };

        Ok(BatchResults::new(results, start_time.elapsed().as_millis()))
    }

    fn process_serial<O>(
        &self,
        files: &[PathBuf],
        operation: &O,
        tracker: Option<&ProgressTracker>,
    ) -> Vec<FileResult<O::Output>>
    where
        O: BatchOperation,
    {
        files
            .iter()
            .map(|path| Self::process_one(path, operation, tracker))
            .collect()
    }

    fn process_parallel<O>(
        &self,
        files: &[PathBuf],
        operation: &O,
        tracker: Option<&ProgressTracker>,
    ) -> Vec<FileResult<O::Output>>
    where
        O: BatchOperation,
    {
        files
            .par_iter()
            .map(|path| Self::process_one(path, operation, tracker))
            .collect()
    }

    fn process_one<O>(
        path: &Path,
        operation: &O,
        tracker: Option<&ProgressTracker>,
    ) -> FileResult<O::Output>
    where
        O: BatchOperation,
    {
        let result = operation.process_file(path);
        if let Some(t) = tracker {
            t.record(path, &result);
        }
        FileResult {
            path: path.to_path_buf(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfmerge_core::PerfError;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"{"benchmarks": [
        {"benchmarkName": "Insert a row 10 times", "customData": {"Heap Used Avg": 1000}}
    ]}"#;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.parallel_threshold, 10);
        assert!(config.max_threads.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_batch_results_statistics() {
        let results = BatchResults::new(
            vec![
                FileResult::success(PathBuf::from("a.json"), 1),
                FileResult::failure(PathBuf::from("b.json"), CliError::invalid_input("bad")),
                FileResult::success(PathBuf::from("c.json"), 3),
            ],
            1000,
        );
        assert_eq!(results.total_files(), 3);
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert!(results.has_failures());
        assert_eq!(results.failures().count(), 1);
        assert!((results.throughput() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_tracker_should_report() {
        let tracker = ProgressTracker::new(10, 3, false);
        assert!(!tracker.should_report(1));
        assert!(tracker.should_report(3));
        assert!(tracker.should_report(10));

        let silent = ProgressTracker::new(10, 0, false);
        assert!(!silent.should_report(10));
    }

    struct LengthOperation;

    impl BatchOperation for LengthOperation {
        type Output = usize;

        fn process_file(&self, path: &Path) -> Result<Self::Output, CliError> {
            let name = path.to_string_lossy();
            if name.contains("fail") {
                Err(CliError::invalid_input("simulated failure"))
            } else {
                Ok(name.len())
            }
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    #[test]
    fn test_batch_processor_empty() {
        let processor = BatchProcessor::default_config();
        let results = processor.process(&[], LengthOperation, false).unwrap();
        assert_eq!(results.total_files(), 0);
    }

    #[test]
    fn test_batch_processor_serial_keeps_order() {
        let processor = BatchProcessor::default_config();
        let files = vec![PathBuf::from("a"), PathBuf::from("fail"), PathBuf::from("ccc")];
        let results = processor.process(&files, LengthOperation, false).unwrap();

        let paths: Vec<_> = results.results.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, files);
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_batch_processor_parallel_keeps_order() {
        let processor = BatchProcessor::new(BatchConfig {
            parallel_threshold: 2,
            max_threads: Some(2),
            ..Default::default()
        });
        let files: Vec<PathBuf> = (0..50).map(|i| PathBuf::from(format!("file{}", i))).collect();
        let results = processor.process(&files, LengthOperation, false).unwrap();

        assert_eq!(results.total_files(), 50);
        for (result, path) in results.results.iter().zip(&files) {
            assert_eq!(&result.path, path);
        }
    }

    #[test]
    fn test_extract_operation() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good_perfresult.json");
        let bad = dir.path().join("bad_perfresult.json");
        fs::write(&good, VALID).unwrap();
        fs::write(&bad, "{ not json").unwrap();

        let extractor = RecordExtractor::new();
        let operation = ExtractOperation::new(SourceGroup::A, &extractor);

        let records = operation.process_file(&good).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].canonical_operation, "Insert row");
        assert_eq!(records[0].heap_avg, Some(1000.0));

        let err = operation.process_file(&bad).unwrap_err();
        assert!(matches!(err, CliError::Core(PerfError::Parse { .. })));
    }

    #[test]
    fn test_extract_operation_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run_perfresult.json");
        fs::write(&path, VALID).unwrap();

        let extractor = RecordExtractor::new();
        let operation = ExtractOperation::new(SourceGroup::B, &extractor).with_max_size(8);
        let err = operation.process_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileTooLarge { .. }));
    }

    #[test]
    fn test_into_extraction() {
        let ok: FileResult<Vec<MetricRecord>> = FileResult::success(PathBuf::from("a.json"), Vec::new());
        let extraction = ok.into_extraction(SourceGroup::A);
        assert_eq!(extraction.provenance, "a.json");
        assert_eq!(extraction.result, Ok(Vec::new()));

        let failed: FileResult<Vec<MetricRecord>> = FileResult::failure(
            PathBuf::from("b.json"),
            CliError::Core(PerfError::parse("b.json", "EOF")),
        );
        let extraction = failed.into_extraction(SourceGroup::B);
        assert_eq!(extraction.source_group, SourceGroup::B);
        assert_eq!(extraction.result, Err(PerfError::parse("b.json", "EOF")));
    }
}

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

//! perfmerge core
//!
//! Normalization and aggregation of per-run benchmark result documents for
//! two competing implementations.
//!
//! ## Pipeline
//!
//! 1. [`RawBenchmarkDocument`]: one decoded result document
//! 2. [`RecordExtractor`]: flattens entries into [`MetricRecord`]s, naming
//!    each with [`OperationClassifier`]
//! 3. [`Aggregator`]: averages every metric per `(group, operation)`
//! 4. [`ReportTable`]: merges both groups side by side and writes CSV
//! 5. [`chart`]: renders comparison charts back from a written report
//!
//! ## Usage
//!
//! ```
//! use perfmerge_core::{DocumentInput, GroupLabels, Pipeline, ReportConfig, SourceGroup};
//!
//! let pipeline = Pipeline::new(GroupLabels::default());
//! let report = pipeline.run(&[
//!     DocumentInput::new(
//!         SourceGroup::A,
//!         "matrix_perfresult.json",
//!         r#"{"benchmarks": [{"benchmarkName": "Insert a row", "elapsedSeconds": 0.5}]}"#,
//!     ),
//!     DocumentInput::new(
//!         SourceGroup::B,
//!         "tree_perfresult.json",
//!         r#"{"benchmarks": [{"benchmarkName": "Insert a row", "elapsedSeconds": 0.25}]}"#,
//!     ),
//! ])?;
//!
//! let csv = report.table.to_csv_string(&ReportConfig::default())?;
//! assert!(csv.contains("Insert row,\"SM: 0.5\nST: 0.25\""));
//! # Ok::<(), perfmerge_core::PerfError>(())
//! ```

pub mod aggregator;
pub mod chart;
pub mod classifier;
pub mod document;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod record;
pub mod report;

pub use aggregator::{
    aggregate, breakdown, split_by_group, summaries_for, Aggregator, GroupSummaries,
    MeanAccumulator, MetricBreakdown, OperationBreakdown, OperationSummary, SummaryKey,
    SummaryMap, Totals,
};
pub use chart::{
    chart_points, export_html, heap_error_bars, render_html, ChartConfig, ChartPoint,
    ErrorBarPoint,
};
pub use classifier::{classify, fallback_label, ClassificationRule, OperationClassifier};
pub use document::{parse_document, BenchmarkEntry, RawBenchmarkDocument, BENCHMARKS_FIELD};
pub use error::{PerfError, Result};
pub use extractor::{extract, RecordExtractor};
pub use pipeline::{
    DocumentFailure, DocumentInput, Extraction, GroupStats, Pipeline, PipelineReport,
};
pub use record::{Metric, MetricRecord, SourceGroup};
pub use report::{
    format_cell, format_value, merge, parse_cell, GroupLabels, MergedRow, ParsedReport,
    ParsedRow, ReportConfig, ReportTable,
};

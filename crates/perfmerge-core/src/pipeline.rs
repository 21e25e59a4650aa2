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

//! End-to-end pipeline from loaded documents to the merged report.
//!
//! The pipeline never touches the filesystem. Callers hand it an explicit
//! collection of documents; each document is extracted independently and the
//! resulting records are folded into one [`Aggregator`] in a single reduction
//! pass, so extraction may run in parallel while aggregation stays
//! single-writer.

use crate::aggregator::{split_by_group, Aggregator};
use crate::error::{PerfError, Result};
use crate::extractor::RecordExtractor;
use crate::record::{MetricRecord, SourceGroup};
use crate::report::{GroupLabels, ReportTable};
use tracing::{info, warn};

/// A loaded document waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub source_group: SourceGroup,
    /// Identifier used in warnings and on every record (usually a file name).
    pub provenance: String,
    /// Raw JSON payload.
    pub payload: Vec<u8>,
}

impl DocumentInput {
    /// Creates a document input.
    pub fn new(
        source_group: SourceGroup,
        provenance: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            source_group,
            provenance: provenance.into(),
            payload: payload.into(),
        }
    }
}

/// Outcome of extracting a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub source_group: SourceGroup,
    pub provenance: String,
    pub result: Result<Vec<MetricRecord>>,
}

impl Extraction {
    /// A document that produced records (possibly none).
    pub fn succeeded(
        source_group: SourceGroup,
        provenance: impl Into<String>,
        records: Vec<MetricRecord>,
    ) -> Self {
        Self {
            source_group,
            provenance: provenance.into(),
            result: Ok(records),
        }
    }

    /// A document that could not be read or decoded.
    pub fn failed(source_group: SourceGroup, provenance: impl Into<String>, error: PerfError) -> Self {
        Self {
            source_group,
            provenance: provenance.into(),
            result: Err(error),
        }
    }
}

/// A document skipped because of a per-document failure.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFailure {
    pub source_group: SourceGroup,
    pub provenance: String,
    pub error: PerfError,
}

/// Counters for one source group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Documents handed to the pipeline.
    pub documents: usize,
    /// Documents skipped because of a failure.
    pub failed: usize,
    /// Records extracted from the successful documents.
    pub records: usize,
    /// Distinct canonical operations with a summary.
    pub operations: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub table: ReportTable,
    pub failures: Vec<DocumentFailure>,
    stats: [GroupStats; 2],
}

impl PipelineReport {
    /// Counters of one source group.
    pub fn stats(&self, group: SourceGroup) -> &GroupStats {
        &self.stats[group as usize]
    }

    /// Returns true if any document was skipped.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Extraction, aggregation and merge with fixed group labels.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    extractor: RecordExtractor,
    labels: GroupLabels,
}

impl Pipeline {
    /// Creates a pipeline with the default classifier.
    pub fn new(labels: GroupLabels) -> Self {
        Self {
            extractor: RecordExtractor::new(),
            labels,
        }
    }

    /// The extractor used for documents.
    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    /// The labels used for report cells.
    pub fn labels(&self) -> &GroupLabels {
        &self.labels
    }

    /// Decodes and extracts one document.
    pub fn extract(&self, input: &DocumentInput) -> Extraction {
        Extraction {
            source_group: input.source_group,
            provenance: input.provenance.clone(),
            result: self
                .extractor
                .extract_json(&input.payload, input.source_group, &input.provenance),
        }
    }

    /// Runs the whole pipeline serially over a document collection.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::NoData`] if no document produced any record.
    /// Per-document failures never abort the run; they are listed in
    /// [`PipelineReport::failures`].
    pub fn run(&self, inputs: &[DocumentInput]) -> Result<PipelineReport> {
        self.reduce(inputs.iter().map(|input| self.extract(input)))
    }

    /// Folds already extracted documents into the merged report.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::NoData`] if the union of operations is empty.
    pub fn reduce<I>(&self, extractions: I) -> Result<PipelineReport>
    where
        I: IntoIterator<Item = Extraction>,
    {
        let mut aggregator = Aggregator::new();
        let mut failures = Vec::new();
        let mut stats: [GroupStats; 2] = Default::default();

        for extraction in extractions {
            let group_stats = &mut stats[extraction.source_group as usize];
            group_stats.documents += 1;
            match extraction.result {
                Ok(records) => {
                    group_stats.records += records.len();
                    aggregator.push_all(&records);
                }
                Err(error) => {
                    warn!(
                        file = %extraction.provenance,
                        group = %extraction.source_group,
                        error = %error,
                        "skipping unreadable document"
                    );
                    group_stats.failed += 1;
                    failures.push(DocumentFailure {
                        source_group: extraction.source_group,
                        provenance: extraction.provenance,
                        error,
                    });
                }
            }
        }

        let (summaries_a, summaries_b) = split_by_group(aggregator.finish());
        if summaries_a.is_empty() && summaries_b.is_empty() {
            return Err(PerfError::NoData);
        }
        stats[SourceGroup::A as usize].operations = summaries_a.len();
        stats[SourceGroup::B as usize].operations = summaries_b.len();

        let table = ReportTable::build(&summaries_a, &summaries_b, self.labels.clone());
        info!(
            operations = table.len(),
            failed = failures.len(),
            "built merged report"
        );

        Ok(PipelineReport {
            table,
            failures,
            stats,
        })
    }
}

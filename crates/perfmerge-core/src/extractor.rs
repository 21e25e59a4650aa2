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

//! Flattening of result documents into metric records.

use crate::classifier::OperationClassifier;
use crate::document::{custom_keys, BenchmarkEntry, RawBenchmarkDocument};
use crate::error::Result;
use crate::record::{MetricRecord, SourceGroup};
use tracing::debug;

/// Turns benchmark entries into [`MetricRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    classifier: OperationClassifier,
}

impl RecordExtractor {
    /// Creates an extractor using the default classification rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with a custom classifier.
    pub fn with_classifier(classifier: OperationClassifier) -> Self {
        Self { classifier }
    }

    /// The classifier used for labels.
    pub fn classifier(&self) -> &OperationClassifier {
        &self.classifier
    }

    /// Extracts one record per entry that carries at least one numeric field.
    ///
    /// Entries without any usable number are dropped so they do not count
    /// towards a group's run count.
    pub fn extract(
        &self,
        document: &RawBenchmarkDocument,
        source_group: SourceGroup,
        provenance: &str,
    ) -> Vec<MetricRecord> {
        let records: Vec<MetricRecord> = document
            .benchmarks
            .iter()
            .filter_map(|entry| self.extract_entry(entry, source_group, provenance))
            .collect();

        debug!(
            file = provenance,
            group = %source_group,
            entries = document.len(),
            records = records.len(),
            "extracted records"
        );
        records
    }

    /// Decodes a JSON payload and extracts its records.
    ///
    /// # Errors
    ///
    /// Returns the decoding error for malformed documents; see
    /// [`RawBenchmarkDocument::from_slice`].
    pub fn extract_json(
        &self,
        payload: &[u8],
        source_group: SourceGroup,
        provenance: &str,
    ) -> Result<Vec<MetricRecord>> {
        let document = RawBenchmarkDocument::from_slice(payload, provenance)?;
        Ok(self.extract(&document, source_group, provenance))
    }

    fn extract_entry(
        &self,
        entry: &BenchmarkEntry,
        source_group: SourceGroup,
        provenance: &str,
    ) -> Option<MetricRecord> {
        let record = MetricRecord {
            canonical_operation: self.classifier.classify(&entry.benchmark_name),
            source_group,
            elapsed_time: entry.elapsed_seconds,
            heap_avg: entry.custom_metric(custom_keys::HEAP_USED_AVG),
            heap_stddev: entry.custom_metric(custom_keys::HEAP_USED_STDDEV),
            margin_of_error: entry.custom_metric(custom_keys::MARGIN_OF_ERROR),
            relative_margin_of_error: entry.custom_metric(custom_keys::RELATIVE_MARGIN_OF_ERROR),
            iterations: entry.custom_metric(custom_keys::ITERATIONS),
            provenance: provenance.to_string(),
        };

        record.has_data().then_some(record)
    }
}

/// Extracts records with the default classifier.
pub fn extract(
    document: &RawBenchmarkDocument,
    source_group: SourceGroup,
    provenance: &str,
) -> Vec<MetricRecord> {
    RecordExtractor::new().extract(document, source_group, provenance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PerfError;

    fn sample_document() -> RawBenchmarkDocument {
        RawBenchmarkDocument::new(vec![
            BenchmarkEntry::new("Insert a row in the middle 10 times")
                .with_elapsed(0.5)
                .with_custom(custom_keys::HEAP_USED_AVG, 1000.0)
                .with_custom(custom_keys::ITERATIONS, 10.0),
            BenchmarkEntry::new("Undo insert a row 10 times")
                .with_custom(custom_keys::HEAP_USED_STDDEV, 3.0),
            BenchmarkEntry::new("Remove a column"),
        ])
    }

    #[test]
    fn test_extract_classifies_and_reads_fields() {
        let records = extract(&sample_document(), SourceGroup::A, "run1_perfresult.json");
        assert_eq!(records.len(), 2);

        let insert = &records[0];
        assert_eq!(insert.canonical_operation, "Insert row");
        assert_eq!(insert.source_group, SourceGroup::A);
        assert_eq!(insert.elapsed_time, Some(0.5));
        assert_eq!(insert.heap_avg, Some(1000.0));
        assert_eq!(insert.iterations, Some(10.0));
        assert_eq!(insert.heap_stddev, None);
        assert_eq!(insert.provenance, "run1_perfresult.json");

        let undo = &records[1];
        assert_eq!(undo.canonical_operation, "Undo insert row");
        assert_eq!(undo.heap_stddev, Some(3.0));
        assert_eq!(undo.elapsed_time, None);
    }

    #[test]
    fn test_entry_without_numbers_is_dropped() {
        let doc = RawBenchmarkDocument::new(vec![BenchmarkEntry::new("Set a cell value")]);
        assert!(extract(&doc, SourceGroup::B, "x").is_empty());
    }

    #[test]
    fn test_iterations_alone_is_usable() {
        let doc = RawBenchmarkDocument::new(vec![
            BenchmarkEntry::new("Set a cell value").with_custom(custom_keys::ITERATIONS, 4.0)
        ]);
        let records = extract(&doc, SourceGroup::B, "x");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].iterations, Some(4.0));
    }

    #[test]
    fn test_zero_is_present_not_absent() {
        let doc = RawBenchmarkDocument::new(vec![
            BenchmarkEntry::new("Remove a row").with_elapsed(0.0)
        ]);
        let records = extract(&doc, SourceGroup::A, "x");
        assert_eq!(records[0].elapsed_time, Some(0.0));
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let records = extract(&RawBenchmarkDocument::default(), SourceGroup::A, "empty");
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_json_reports_parse_failures() {
        let extractor = RecordExtractor::new();
        let err = extractor
            .extract_json(b"{\"benchmarks\": [", SourceGroup::A, "broken.json")
            .unwrap_err();
        assert!(matches!(err, PerfError::Parse { ref provenance, .. } if provenance == "broken.json"));

        let ok = extractor
            .extract_json(br#"{"benchmarks": []}"#, SourceGroup::A, "empty.json")
            .unwrap();
        assert!(ok.is_empty());
    }
}

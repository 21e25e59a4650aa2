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

//! Raw benchmark result documents.
//!
//! A result document is produced once per test execution and looks like:
//!
//! ```json
//! {
//!   "benchmarks": [
//!     {
//!       "benchmarkName": "SharedMatrix Insert a row in the middle 10 times",
//!       "elapsedSeconds": 0.0123,
//!       "customData": { "Heap Used Avg": 1024.5, "Iterations": 10 }
//!     }
//!   ]
//! }
//! ```
//!
//! Producers are not validated beyond the container and the entry name: any
//! numeric field that is missing, `null` or not a number decodes as absent.

use crate::error::{PerfError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the container field holding the benchmark entries.
pub const BENCHMARKS_FIELD: &str = "benchmarks";

/// Keys of the custom metrics bag.
pub mod custom_keys {
    /// Average heap usage in bytes.
    pub const HEAP_USED_AVG: &str = "Heap Used Avg";
    /// Standard deviation of heap usage.
    pub const HEAP_USED_STDDEV: &str = "Heap Used StdDev";
    /// Absolute margin of error.
    pub const MARGIN_OF_ERROR: &str = "Margin of Error";
    /// Margin of error relative to the mean, in percent.
    pub const RELATIVE_MARGIN_OF_ERROR: &str = "Relative Margin of Error";
    /// Number of iterations the benchmark executed.
    pub const ITERATIONS: &str = "Iterations";
}

/// One per-run result document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBenchmarkDocument {
    /// Benchmark entries, in producer order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub benchmarks: Vec<BenchmarkEntry>,
}

/// A single benchmark entry inside a result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkEntry {
    /// Free-text benchmark label.
    pub benchmark_name: String,
    /// Elapsed wall time in seconds.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub elapsed_seconds: Option<f64>,
    /// Named custom metrics.
    #[serde(
        default,
        deserialize_with = "lenient_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_data: BTreeMap<String, Value>,
}

impl BenchmarkEntry {
    /// Creates an entry with no metrics.
    pub fn new(benchmark_name: impl Into<String>) -> Self {
        Self {
            benchmark_name: benchmark_name.into(),
            elapsed_seconds: None,
            custom_data: BTreeMap::new(),
        }
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, seconds: f64) -> Self {
        self.elapsed_seconds = Some(seconds);
        self
    }

    /// Adds a numeric custom metric.
    pub fn with_custom(mut self, key: impl Into<String>, value: f64) -> Self {
        self.custom_data.insert(key.into(), Value::from(value));
        self
    }

    /// Reads a custom metric, treating non-numeric values as absent.
    pub fn custom_metric(&self, key: &str) -> Option<f64> {
        self.custom_data.get(key).and_then(Value::as_f64)
    }
}

impl RawBenchmarkDocument {
    /// Creates a document from a list of entries.
    pub fn new(benchmarks: Vec<BenchmarkEntry>) -> Self {
        Self { benchmarks }
    }

    /// Decodes a document from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Parse`] if the payload is not valid JSON or an
    /// entry cannot be decoded, and [`PerfError::MissingContainer`] if the
    /// top-level object has no `benchmarks` field.
    pub fn from_slice(bytes: &[u8], provenance: &str) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| PerfError::parse(provenance, e.to_string()))?;
        Self::from_value(value, provenance)
    }

    /// Decodes a document from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`RawBenchmarkDocument::from_slice`].
    pub fn from_json_str(json: &str, provenance: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes(), provenance)
    }

    /// Decodes a document from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`RawBenchmarkDocument::from_slice`].
    pub fn from_value(value: Value, provenance: &str) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(PerfError::parse(provenance, "expected a JSON object"));
        };
        if !object.contains_key(BENCHMARKS_FIELD) {
            return Err(PerfError::missing_container(provenance, BENCHMARKS_FIELD));
        }
        serde_json::from_value(value).map_err(|e| PerfError::parse(provenance, e.to_string()))
    }

    /// Number of benchmark entries.
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Returns true if the document holds no entries.
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

/// Decodes a raw payload into a document.
///
/// # Errors
///
/// See [`RawBenchmarkDocument::from_slice`].
pub fn parse_document(payload: &[u8], provenance: &str) -> Result<RawBenchmarkDocument> {
    RawBenchmarkDocument::from_slice(payload, provenance)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn lenient_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        _ => Ok(BTreeMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_reports_provenance() {
        let doc = parse_document(br#"{"benchmarks": null}"#, "a.json").unwrap();
        assert!(doc.is_empty());

        match parse_document(b"[1, 2]", "b.json").unwrap_err() {
            PerfError::Parse { provenance, .. } => assert_eq!(provenance, "b.json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_full_entry() {
        let json = r#"{
            "benchmarks": [{
                "benchmarkName": "Insert a row 10 times",
                "elapsedSeconds": 0.5,
                "customData": {
                    "Heap Used Avg": 1000,
                    "Heap Used StdDev": 12.5,
                    "Iterations": 10
                }
            }]
        }"#;
        let doc = RawBenchmarkDocument::from_json_str(json, "doc").unwrap();
        assert_eq!(doc.len(), 1);
        let entry = &doc.benchmarks[0];
        assert_eq!(entry.benchmark_name, "Insert a row 10 times");
        assert_eq!(entry.elapsed_seconds, Some(0.5));
        assert_eq!(entry.custom_metric(custom_keys::HEAP_USED_AVG), Some(1000.0));
        assert_eq!(entry.custom_metric(custom_keys::HEAP_USED_STDDEV), Some(12.5));
        assert_eq!(entry.custom_metric(custom_keys::ITERATIONS), Some(10.0));
        assert_eq!(entry.custom_metric(custom_keys::MARGIN_OF_ERROR), None);
    }

    #[test]
    fn test_non_numeric_values_are_absent() {
        let json = r#"{"benchmarks": [{
            "benchmarkName": "x",
            "elapsedSeconds": "",
            "customData": {"Heap Used Avg": null, "Margin of Error": "n/a"}
        }]}"#;
        let doc = RawBenchmarkDocument::from_json_str(json, "doc").unwrap();
        let entry = &doc.benchmarks[0];
        assert_eq!(entry.elapsed_seconds, None);
        assert_eq!(entry.custom_metric(custom_keys::HEAP_USED_AVG), None);
        assert_eq!(entry.custom_metric(custom_keys::MARGIN_OF_ERROR), None);
    }

    #[test]
    fn test_custom_data_not_an_object() {
        let json = r#"{"benchmarks": [{"benchmarkName": "x", "customData": 3}]}"#;
        let doc = RawBenchmarkDocument::from_json_str(json, "doc").unwrap();
        assert!(doc.benchmarks[0].custom_data.is_empty());
    }

    #[test]
    fn test_empty_and_null_container() {
        let doc = RawBenchmarkDocument::from_json_str(r#"{"benchmarks": []}"#, "a").unwrap();
        assert!(doc.is_empty());
        let doc = RawBenchmarkDocument::from_json_str(r#"{"benchmarks": null}"#, "b").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_missing_container() {
        let err = RawBenchmarkDocument::from_json_str(r#"{"suite": "x"}"#, "c.json").unwrap_err();
        assert_eq!(err, PerfError::missing_container("c.json", BENCHMARKS_FIELD));
    }

    #[test]
    fn test_invalid_json() {
        let err = RawBenchmarkDocument::from_json_str("{not json", "d.json").unwrap_err();
        assert!(matches!(err, PerfError::Parse { ref provenance, .. } if provenance == "d.json"));
    }

    #[test]
    fn test_top_level_array_rejected() {
        let err = RawBenchmarkDocument::from_json_str("[]", "e.json").unwrap_err();
        assert!(matches!(err, PerfError::Parse { .. }));
    }

    #[test]
    fn test_entry_without_name_rejected() {
        let err =
            RawBenchmarkDocument::from_json_str(r#"{"benchmarks": [{"elapsedSeconds": 1}]}"#, "f")
                .unwrap_err();
        assert!(matches!(err, PerfError::Parse { .. }));
    }

    #[test]
    fn test_builder_helpers() {
        let entry = BenchmarkEntry::new("Remove a column")
            .with_elapsed(2.0)
            .with_custom(custom_keys::MARGIN_OF_ERROR, 0.25);
        assert_eq!(entry.elapsed_seconds, Some(2.0));
        assert_eq!(entry.custom_metric(custom_keys::MARGIN_OF_ERROR), Some(0.25));
    }
}

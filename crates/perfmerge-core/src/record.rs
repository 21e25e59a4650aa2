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

//! Flat metric records and the vocabulary shared by every pipeline stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two implementations being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceGroup {
    /// First implementation (rendered first in every cell).
    A,
    /// Second implementation.
    B,
}

impl SourceGroup {
    /// Both groups in rendering order.
    pub const ALL: [SourceGroup; 2] = [SourceGroup::A, SourceGroup::B];

    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceGroup::A => "a",
            SourceGroup::B => "b",
        }
    }
}

impl fmt::Display for SourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceGroup::A => write!(f, "GroupA"),
            SourceGroup::B => write!(f, "GroupB"),
        }
    }
}

/// The averaged metric columns of the report, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    ElapsedTime,
    HeapAvg,
    HeapStdDev,
    MarginOfError,
    RelativeMarginOfError,
}

impl Metric {
    /// All metrics in report column order.
    pub const ALL: [Metric; 5] = [
        Metric::ElapsedTime,
        Metric::HeapAvg,
        Metric::HeapStdDev,
        Metric::MarginOfError,
        Metric::RelativeMarginOfError,
    ];

    /// Column header used in the tabular report.
    pub fn column_header(self) -> &'static str {
        match self {
            Metric::ElapsedTime => "Elapsed Time (s)",
            Metric::HeapAvg => "Heap Used Avg",
            Metric::HeapStdDev => "Heap Used StdDev",
            Metric::MarginOfError => "Margin of Error",
            Metric::RelativeMarginOfError => "Relative Margin of Error",
        }
    }

    /// Looks a metric up by its column header.
    pub fn from_column_header(header: &str) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column_header() == header.trim())
    }

    /// Position of this metric in [`Metric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_header())
    }
}

/// One reduced observation taken from a single benchmark entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub canonical_operation: String,
    pub source_group: SourceGroup,
    pub elapsed_time: Option<f64>,
    pub heap_avg: Option<f64>,
    pub heap_stddev: Option<f64>,
    pub margin_of_error: Option<f64>,
    pub relative_margin_of_error: Option<f64>,
    pub iterations: Option<f64>,
    /// Identifier of the document the record came from.
    pub provenance: String,
}

impl MetricRecord {
    /// Creates a record with every numeric field absent.
    pub fn empty(
        canonical_operation: impl Into<String>,
        source_group: SourceGroup,
        provenance: impl Into<String>,
    ) -> Self {
        Self {
            canonical_operation: canonical_operation.into(),
            source_group,
            elapsed_time: None,
            heap_avg: None,
            heap_stddev: None,
            margin_of_error: None,
            relative_margin_of_error: None,
            iterations: None,
            provenance: provenance.into(),
        }
    }

    /// Returns a copy with the given metric set.
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        *self.metric_slot(metric) = Some(value);
        self
    }

    /// Returns a copy with the iteration count set.
    pub fn with_iterations(mut self, iterations: f64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Value of an averaged metric.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ElapsedTime => self.elapsed_time,
            Metric::HeapAvg => self.heap_avg,
            Metric::HeapStdDev => self.heap_stddev,
            Metric::MarginOfError => self.margin_of_error,
            Metric::RelativeMarginOfError => self.relative_margin_of_error,
        }
    }

    /// True if at least one of the six numeric fields is present.
    pub fn has_data(&self) -> bool {
        self.iterations.is_some() || Metric::ALL.iter().any(|m| self.metric(*m).is_some())
    }

    fn metric_slot(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::ElapsedTime => &mut self.elapsed_time,
            Metric::HeapAvg => &mut self.heap_avg,
            Metric::HeapStdDev => &mut self.heap_stddev,
            Metric::MarginOfError => &mut self.margin_of_error,
            Metric::RelativeMarginOfError => &mut self.relative_margin_of_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_column_order() {
        let headers: Vec<_> = Metric::ALL.iter().map(|m| m.column_header()).collect();
        assert_eq!(
            headers,
            vec![
                "Elapsed Time (s)",
                "Heap Used Avg",
                "Heap Used StdDev",
                "Margin of Error",
                "Relative Margin of Error",
            ]
        );
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
    }

    #[test]
    fn test_metric_from_header() {
        assert_eq!(Metric::from_column_header("Heap Used Avg"), Some(Metric::HeapAvg));
        assert_eq!(
            Metric::from_column_header(" Margin of Error "),
            Some(Metric::MarginOfError)
        );
        assert_eq!(Metric::from_column_header("Operation"), None);
    }

    #[test]
    fn test_has_data() {
        let record = MetricRecord::empty("Insert row", SourceGroup::A, "f");
        assert!(!record.has_data());
        assert!(record.clone().with_iterations(3.0).has_data());
        assert!(record.with_metric(Metric::HeapStdDev, 0.0).has_data());
    }

    #[test]
    fn test_with_metric_sets_only_that_field() {
        let record =
            MetricRecord::empty("Remove row", SourceGroup::B, "f").with_metric(Metric::HeapAvg, 7.0);
        assert_eq!(record.heap_avg, Some(7.0));
        assert_eq!(record.elapsed_time, None);
        assert_eq!(record.metric(Metric::HeapAvg), Some(7.0));
    }

    #[test]
    fn test_group_display() {
        assert_eq!(SourceGroup::A.to_string(), "GroupA");
        assert_eq!(SourceGroup::B.as_str(), "b");
    }
}

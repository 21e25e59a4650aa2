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

//! Aggregation of metric records into per-operation summaries.
//!
//! Records are grouped by `(source group, canonical operation)`. Inside a
//! group every metric is averaged on its own: a metric that only two of five
//! runs reported is the mean of those two values, while `run_count` still
//! counts all five records.
//!
//! The reduction is order-independent down to the last bit. Each metric keeps
//! its contributing values and sums them in sorted order, so two aggregators
//! fed the same records in different orders (or built in parallel and merged)
//! produce identical summaries.

use crate::record::{Metric, MetricRecord, SourceGroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Key of an aggregation group.
pub type SummaryKey = (SourceGroup, String);

/// All summaries of a run, keyed by group and operation.
pub type SummaryMap = BTreeMap<SummaryKey, OperationSummary>;

/// Summaries of a single source group, keyed by canonical operation.
pub type GroupSummaries = BTreeMap<String, OperationSummary>;

/// Sum/count accumulator for one metric with its own denominator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanAccumulator {
    values: Vec<f64>,
}

impl MeanAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value; absent values are ignored.
    pub fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.values.push(v);
        }
    }

    /// Number of contributing values.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Contributing values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Reduces the accumulator to its sum and mean, or `None` if no value
    /// contributed.
    ///
    /// Values are sorted in place and summed once.
    pub fn totals(mut self) -> Option<Totals> {
        if self.values.is_empty() {
            return None;
        }
        self.values.sort_by(f64::total_cmp);
        let sum: f64 = self.values.iter().sum();
        Some(Totals {
            sum,
            mean: sum / self.values.len() as f64,
        })
    }

    /// Absorbs the values of another accumulator.
    pub fn merge(&mut self, other: MeanAccumulator) {
        self.values.extend(other.values);
    }
}

/// Sum and mean of a finished [`MeanAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub sum: f64,
    pub mean: f64,
}

/// Averaged metrics for one `(source group, canonical operation)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub canonical_operation: String,
    pub source_group: SourceGroup,
    pub elapsed_time: Option<f64>,
    pub heap_avg: Option<f64>,
    pub heap_stddev: Option<f64>,
    pub margin_of_error: Option<f64>,
    pub relative_margin_of_error: Option<f64>,
    /// Number of records in the group. Always at least 1.
    pub run_count: usize,
    /// Sum of the reported iteration counts, absent if none were reported.
    pub total_iterations: Option<f64>,
}

impl OperationSummary {
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
}

#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    run_count: usize,
    metrics: [MeanAccumulator; 5],
    iterations: MeanAccumulator,
}

impl GroupAccumulator {
    fn push(&mut self, record: &MetricRecord) {
        self.run_count += 1;
        for metric in Metric::ALL {
            self.metrics[metric.index()].add(record.metric(metric));
        }
        self.iterations.add(record.iterations);
    }

    fn merge(&mut self, other: GroupAccumulator) {
        self.run_count += other.run_count;
        for (mine, theirs) in self.metrics.iter_mut().zip(other.metrics) {
            mine.merge(theirs);
        }
        self.iterations.merge(other.iterations);
    }

    fn finish(self, source_group: SourceGroup, canonical_operation: String) -> OperationSummary {
        let means = self.metrics.map(|acc| acc.totals().map(|t| t.mean));
        let mean = |metric: Metric| means[metric.index()];
        OperationSummary {
            canonical_operation,
            source_group,
            elapsed_time: mean(Metric::ElapsedTime),
            heap_avg: mean(Metric::HeapAvg),
            heap_stddev: mean(Metric::HeapStdDev),
            margin_of_error: mean(Metric::MarginOfError),
            relative_margin_of_error: mean(Metric::RelativeMarginOfError),
            run_count: self.run_count,
            total_iterations: self.iterations.totals().map(|t| t.sum),
        }
    }
}

/// Incremental aggregation of metric records.
///
/// # Examples
///
/// ```
/// use perfmerge_core::{Aggregator, Metric, MetricRecord, SourceGroup};
///
/// let mut aggregator = Aggregator::new();
/// aggregator.push(&MetricRecord::empty("Insert row", SourceGroup::A, "r1")
///     .with_metric(Metric::ElapsedTime, 10.0));
/// aggregator.push(&MetricRecord::empty("Insert row", SourceGroup::A, "r2")
///     .with_metric(Metric::ElapsedTime, 20.0)
///     .with_metric(Metric::HeapAvg, 100.0));
///
/// let summaries = aggregator.finish();
/// let summary = &summaries[&(SourceGroup::A, "Insert row".to_string())];
/// assert_eq!(summary.elapsed_time, Some(15.0));
/// assert_eq!(summary.heap_avg, Some(100.0));
/// assert_eq!(summary.run_count, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    groups: HashMap<SummaryKey, GroupAccumulator>,
    records: usize,
}

impl Aggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single record to its group.
    pub fn push(&mut self, record: &MetricRecord) {
        self.records += 1;
        self.groups
            .entry((record.source_group, record.canonical_operation.clone()))
            .or_default()
            .push(record);
    }

    /// Adds every record of a slice.
    pub fn push_all(&mut self, records: &[MetricRecord]) {
        for record in records {
            self.push(record);
        }
    }

    /// Absorbs a partial aggregation built elsewhere.
    pub fn merge(&mut self, other: Aggregator) {
        self.records += other.records;
        for (key, group) in other.groups {
            self.groups.entry(key).or_default().merge(group);
        }
    }

    /// Number of records pushed so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of distinct groups seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no record has been pushed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Reduces every group to its summary.
    pub fn finish(self) -> SummaryMap {
        self.groups
            .into_iter()
            .map(|((group, operation), acc)| {
                let summary = acc.finish(group, operation.clone());
                ((group, operation), summary)
            })
            .collect()
    }
}

impl<'a> Extend<&'a MetricRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a MetricRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Aggregates a slice of records in one go.
pub fn aggregate(records: &[MetricRecord]) -> SummaryMap {
    let mut aggregator = Aggregator::new();
    aggregator.push_all(records);
    aggregator.finish()
}

/// Extracts the summaries of one source group.
pub fn summaries_for(summaries: &SummaryMap, group: SourceGroup) -> GroupSummaries {
    summaries
        .iter()
        .filter(|((g, _), _)| *g == group)
        .map(|((_, operation), summary)| (operation.clone(), summary.clone()))
        .collect()
}

/// Splits a summary map into the per-group mappings of groups A and B.
pub fn split_by_group(summaries: SummaryMap) -> (GroupSummaries, GroupSummaries) {
    let mut a = GroupSummaries::new();
    let mut b = GroupSummaries::new();
    for ((group, operation), summary) in summaries {
        match group {
            SourceGroup::A => a.insert(operation, summary),
            SourceGroup::B => b.insert(operation, summary),
        };
    }
    (a, b)
}

/// Individual values of one metric and their mean.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBreakdown {
    pub metric: Metric,
    pub values: Vec<f64>,
    pub mean: Option<f64>,
}

/// Every contributing value of one operation in one source group.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationBreakdown {
    pub canonical_operation: String,
    pub source_group: SourceGroup,
    pub run_count: usize,
    /// Documents the records came from, in encounter order.
    pub provenance: Vec<String>,
    pub metrics: Vec<MetricBreakdown>,
    pub iterations: Vec<f64>,
}

/// Shows how an operation's summary is built from individual records.
///
/// Returns one breakdown per source group that has records for `operation`.
pub fn breakdown(records: &[MetricRecord], operation: &str) -> Vec<OperationBreakdown> {
    SourceGroup::ALL
        .into_iter()
        .filter_map(|group| {
            let mut acc = GroupAccumulator::default();
            let mut provenance = Vec::new();
            for record in records
                .iter()
                .filter(|r| r.source_group == group && r.canonical_operation == operation)
            {
                acc.push(record);
                provenance.push(record.provenance.clone());
            }
            if acc.run_count == 0 {
                return None;
            }

            let GroupAccumulator {
                run_count,
                metrics,
                iterations,
            } = acc;
            let metrics = Metric::ALL
                .into_iter()
                .zip(metrics)
                .map(|(metric, values)| MetricBreakdown {
                    metric,
                    values: values.values().to_vec(),
                    mean: values.totals().map(|t| t.mean),
                })
                .collect();

            Some(OperationBreakdown {
                canonical_operation: operation.to_string(),
                source_group: group,
                run_count,
                provenance,
                metrics,
                iterations: iterations.values,
            })
        })
        .collect()
}

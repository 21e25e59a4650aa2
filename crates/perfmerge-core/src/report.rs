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

//! Merged side-by-side report.
//!
//! Each row pairs the summaries of both source groups for one canonical
//! operation. A metric cell lists the present values as `"<Label>: <value>"`
//! lines, group A first:
//!
//! ```text
//! Operation,Elapsed Time (s),Heap Used Avg,...
//! Insert row,"SM: 0.25
//! ST: 0.5","SM: 2000
//! ST: 500",...
//! ```
//!
//! Chart tooling reads the cells back with [`parse_cell`], so the column
//! order and the label convention are part of the output contract.

use crate::aggregator::{GroupSummaries, OperationSummary};
use crate::error::{PerfError, Result};
use crate::record::{Metric, SourceGroup};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

/// Header of the operation column.
pub const OPERATION_HEADER: &str = "Operation";

/// Display labels of the two source groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLabels {
    a: String,
    b: String,
}

impl GroupLabels {
    /// Creates a label pair.
    ///
    /// # Errors
    ///
    /// Labels must be non-empty, distinct, free of `:` and line breaks, and
    /// carry no leading or trailing whitespace, otherwise cells could not be
    /// parsed back.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Result<Self> {
        let (a, b) = (a.into(), b.into());
        for label in [&a, &b] {
            if label.trim().is_empty() {
                return Err(PerfError::invalid_report("group label must not be empty"));
            }
            if label.trim() != label.as_str() {
                return Err(PerfError::invalid_report(format!(
                    "group label '{}' must not start or end with whitespace",
                    label.escape_debug()
                )));
            }
            if label.contains(&[':', '\n', '\r'][..]) {
                return Err(PerfError::invalid_report(format!(
                    "group label '{}' must not contain ':' or line breaks",
                    label.escape_debug()
                )));
            }
        }
        if a == b {
            return Err(PerfError::invalid_report(format!(
                "group labels must differ, both are '{}'",
                a
            )));
        }
        Ok(Self { a, b })
    }

    /// Label of a source group.
    pub fn label(&self, group: SourceGroup) -> &str {
        match group {
            SourceGroup::A => &self.a,
            SourceGroup::B => &self.b,
        }
    }
}

impl Default for GroupLabels {
    fn default() -> Self {
        Self {
            a: "SM".to_string(),
            b: "ST".to_string(),
        }
    }
}

/// One output row: both groups' summaries for one canonical operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub canonical_operation: String,
    pub group_a: Option<OperationSummary>,
    pub group_b: Option<OperationSummary>,
}

impl MergedRow {
    /// Summary of a source group, if it has one for this operation.
    pub fn summary(&self, group: SourceGroup) -> Option<&OperationSummary> {
        match group {
            SourceGroup::A => self.group_a.as_ref(),
            SourceGroup::B => self.group_b.as_ref(),
        }
    }

    /// Averaged value of a metric for a source group.
    pub fn value(&self, group: SourceGroup, metric: Metric) -> Option<f64> {
        self.summary(group).and_then(|s| s.metric(metric))
    }

    /// Run count of a source group, zero if it has no summary.
    pub fn run_count(&self, group: SourceGroup) -> usize {
        self.summary(group).map_or(0, |s| s.run_count)
    }

    /// Formatted display cell of one metric.
    pub fn cell(&self, metric: Metric, labels: &GroupLabels) -> String {
        format_cell(
            SourceGroup::ALL
                .into_iter()
                .map(|group| (labels.label(group), self.value(group, metric))),
        )
    }

    /// Operation name followed by every metric cell, in column order.
    pub fn to_record(&self, labels: &GroupLabels) -> Vec<String> {
        std::iter::once(self.canonical_operation.clone())
            .chain(Metric::ALL.into_iter().map(|m| self.cell(m, labels)))
            .collect()
    }
}

/// Pairs the summaries of both groups, one row per operation in either.
///
/// Rows are sorted ascending by operation name, independent of input order.
pub fn merge(summaries_a: &GroupSummaries, summaries_b: &GroupSummaries) -> Vec<MergedRow> {
    let operations: BTreeSet<&String> = summaries_a.keys().chain(summaries_b.keys()).collect();

    operations
        .into_iter()
        .map(|operation| MergedRow {
            canonical_operation: operation.clone(),
            group_a: summaries_a.get(operation).cloned(),
            group_b: summaries_b.get(operation).cloned(),
        })
        .collect()
}

/// Renders a value with the shortest representation that parses back exactly.
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

/// Joins `"<Label>: <value>"` lines for every present value.
///
/// Returns an empty string if no value is present.
pub fn format_cell<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    values
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{}: {}", label, format_value(v))))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recovers the value a cell holds for `label`.
///
/// # Examples
///
/// ```
/// use perfmerge_core::report::parse_cell;
///
/// let cell = "SM: 2000\nST: 500";
/// assert_eq!(parse_cell(cell, "SM"), Some(2000.0));
/// assert_eq!(parse_cell(cell, "ST"), Some(500.0));
/// assert_eq!(parse_cell("", "SM"), None);
/// ```
pub fn parse_cell(cell: &str, label: &str) -> Option<f64> {
    cell.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(label)?.strip_prefix(':')?;
        rest.trim().parse::<f64>().ok()
    })
}

/// Delimited output options.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Include header row (default: true)
    pub include_headers: bool,
    /// Quote style for fields (default: necessary)
    pub quote_style: csv::QuoteStyle,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_headers: true,
            quote_style: csv::QuoteStyle::Necessary,
        }
    }
}

/// The merged table together with the labels used to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    labels: GroupLabels,
    rows: Vec<MergedRow>,
}

impl ReportTable {
    /// Merges both groups' summaries into a table.
    pub fn build(
        summaries_a: &GroupSummaries,
        summaries_b: &GroupSummaries,
        labels: GroupLabels,
    ) -> Self {
        Self {
            labels,
            rows: merge(summaries_a, summaries_b),
        }
    }

    /// Merged rows in operation order.
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// Labels used for cell prefixes.
    pub fn labels(&self) -> &GroupLabels {
        &self.labels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row in fixed column order.
    pub fn headers() -> Vec<&'static str> {
        std::iter::once(OPERATION_HEADER)
            .chain(Metric::ALL.into_iter().map(Metric::column_header))
            .collect()
    }

    /// Writes the table as delimited text.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Csv`] if the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W, config: &ReportConfig) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(config.delimiter)
            .quote_style(config.quote_style)
            .from_writer(writer);

        if config.include_headers {
            wtr.write_record(Self::headers())?;
        }
        for row in &self.rows {
            wtr.write_record(row.to_record(&self.labels)).map_err(|e| {
                PerfError::Csv(format!(
                    "Failed to write row for operation '{}': {}",
                    row.canonical_operation, e
                ))
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Renders the table into a string.
    ///
    /// # Errors
    ///
    /// See [`ReportTable::write_csv`].
    pub fn to_csv_string(&self, config: &ReportConfig) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, config)?;
        String::from_utf8(buffer).map_err(|e| PerfError::Csv(e.to_string()))
    }
}

/// A row read back from a written report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub operation: String,
    /// Raw cell text per metric column present in the file.
    pub cells: BTreeMap<Metric, String>,
}

impl ParsedRow {
    /// Parses the value a metric cell holds for `label`.
    pub fn value(&self, metric: Metric, label: &str) -> Option<f64> {
        self.cells.get(&metric).and_then(|cell| parse_cell(cell, label))
    }
}

/// A previously written report, read back for chart rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedReport {
    pub metrics: Vec<Metric>,
    pub rows: Vec<ParsedRow>,
}

impl ParsedReport {
    /// Reads a report with a header row.
    ///
    /// Unknown columns are ignored; metric columns may appear in any order.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidReport`] if the first column is not the
    /// operation column or no metric column is present, and
    /// [`PerfError::Csv`] for malformed input.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.get(0).map(str::trim) != Some(OPERATION_HEADER) {
            return Err(PerfError::invalid_report(format!(
                "first column must be '{}'",
                OPERATION_HEADER
            )));
        }

        let columns: Vec<(usize, Metric)> = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, h)| Metric::from_column_header(h).map(|m| (i, m)))
            .collect();
        if columns.is_empty() {
            return Err(PerfError::invalid_report("no metric columns found"));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let operation = record.get(0).unwrap_or_default().to_string();
            let cells = columns
                .iter()
                .filter_map(|(i, metric)| record.get(*i).map(|c| (*metric, c.to_string())))
                .collect();
            rows.push(ParsedRow { operation, cells });
        }

        Ok(Self {
            metrics: columns.into_iter().map(|(_, m)| m).collect(),
            rows,
        })
    }
}
